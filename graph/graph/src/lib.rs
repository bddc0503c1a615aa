//! Shared building blocks for the trellis graph connectors: the typed
//! property and record model, the error taxonomy, and connection
//! configuration. Database-specific statement synthesis and wire handling
//! live in the per-database connector crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::ConnectionConfig;
pub use error::GraphError;
pub use types::{
    Direction, NodeRecord, Projection, PropertySpec, PropertyValue, RelationshipRecord,
};
