//! Neo4j connector: translates typed graph-modification calls into Cypher
//! statement batches for the transactional HTTP endpoint and maps the
//! tabular response back into typed records.
//!
//! ```no_run
//! use trellis_graph::{ConnectionConfig, PropertySpec};
//! use trellis_graph_neo4j::Neo4jGraph;
//!
//! # fn main() -> Result<(), trellis_graph::GraphError> {
//! let graph = Neo4jGraph::connect(&ConnectionConfig::new(
//!     "localhost", 7474, "neo4j", "secret",
//! ))?;
//!
//! let created = graph.create_node(
//!     &["Person".to_string()],
//!     &PropertySpec::new().string("name", "Ada").integer("age", 36),
//! )?;
//! println!("created node {}", created[0].id);
//! # Ok(())
//! # }
//! ```

mod client;
mod conversions;
mod helpers;
pub mod statements;

pub use client::{
    decode_response, DataEntry, DecodeMode, Neo4jApi, Neo4jStatements, StatementResult,
    TransactionResponse, Transport,
};
pub use statements::{StatementBatch, ValueEncoding};
pub use trellis_graph::{
    ConnectionConfig, Direction, GraphError, NodeRecord, Projection, PropertySpec, PropertyValue,
    RelationshipRecord,
};

use log::debug;

/// Handle over one database endpoint. Holds no per-call state: every
/// operation returns its own results, so concurrent calls through clones of
/// the transport cannot overwrite each other's output.
pub struct Neo4jGraph {
    transport: Box<dyn Transport>,
    decode_mode: DecodeMode,
    encoding: ValueEncoding,
}

impl Neo4jGraph {
    /// Connects over HTTP using the given endpoint configuration.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, GraphError> {
        Ok(Self::with_transport(Box::new(Neo4jApi::new(config)?)))
    }

    /// Connects using the `NEO4J_*` environment keys.
    pub fn from_env() -> Result<Self, GraphError> {
        Self::connect(&ConnectionConfig::from_env()?)
    }

    /// Wraps an arbitrary transport; decode mode and value encoding start at
    /// their defaults (lenient, inline).
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            decode_mode: DecodeMode::default(),
            encoding: ValueEncoding::default(),
        }
    }

    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    pub fn with_value_encoding(mut self, encoding: ValueEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn run(&self, batch: StatementBatch) -> Result<Option<client::TransactionResponse>, GraphError> {
        if batch.is_empty() {
            debug!("empty batch, skipping transport call");
            return Ok(None);
        }
        let body = Neo4jStatements::from_batch(&batch).to_body()?;
        let raw = self.transport.submit(&body)?;
        decode_response(&raw, self.decode_mode).map(Some)
    }

    fn run_nodes(&self, batch: StatementBatch) -> Result<Vec<NodeRecord>, GraphError> {
        match self.run(batch)? {
            Some(response) => helpers::map_nodes(&response, self.decode_mode),
            None => Ok(Vec::new()),
        }
    }

    fn run_relationships(
        &self,
        batch: StatementBatch,
    ) -> Result<Vec<RelationshipRecord>, GraphError> {
        match self.run(batch)? {
            Some(response) => helpers::map_relationships(&response, self.decode_mode),
            None => Ok(Vec::new()),
        }
    }

    fn run_unit(&self, batch: StatementBatch) -> Result<(), GraphError> {
        self.run(batch).map(|_| ())
    }

    /// Creates one node with the given labels and properties and returns it.
    pub fn create_node(
        &self,
        labels: &[String],
        properties: &PropertySpec,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::create_node(labels, properties, self.encoding)?)
    }

    /// Idempotent upsert keyed by the full labels-plus-properties pattern.
    pub fn merge_node(
        &self,
        labels: &[String],
        properties: &PropertySpec,
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::merge_node(labels, properties, self.encoding)?)
    }

    /// Deletes every node matching the pattern, detaching incident
    /// relationships so none are left dangling.
    pub fn delete_nodes_by_properties(
        &self,
        labels: &[String],
        properties: &PropertySpec,
    ) -> Result<(), GraphError> {
        self.run_unit(statements::delete_nodes_by_properties(
            labels,
            properties,
            self.encoding,
        )?)
    }

    /// Fetches nodes by identity. An empty id list is a no-op returning no
    /// records and making no transport call.
    pub fn get_nodes_by_id(&self, ids: &[i64]) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::get_nodes_by_id(ids))
    }

    /// Merge-style property update: listed keys overwrite, others survive.
    pub fn add_properties_to_nodes(
        &self,
        ids: &[i64],
        properties: &PropertySpec,
    ) -> Result<(), GraphError> {
        self.run_unit(statements::add_properties_to_nodes(
            ids,
            properties,
            self.encoding,
        )?)
    }

    pub fn remove_properties_from_nodes(
        &self,
        ids: &[i64],
        properties: &[String],
    ) -> Result<(), GraphError> {
        self.run_unit(statements::remove_properties_from_nodes(ids, properties))
    }

    pub fn add_labels_to_nodes(&self, ids: &[i64], labels: &[String]) -> Result<(), GraphError> {
        self.run_unit(statements::add_labels_to_nodes(ids, labels))
    }

    pub fn remove_labels_from_nodes(
        &self,
        ids: &[i64],
        labels: &[String],
    ) -> Result<(), GraphError> {
        self.run_unit(statements::remove_labels_from_nodes(ids, labels))
    }

    pub fn delete_nodes_by_id(&self, ids: &[i64]) -> Result<(), GraphError> {
        self.run_unit(statements::delete_nodes_by_id(ids))
    }

    pub fn get_nodes_by_labels(&self, labels: &[String]) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::get_nodes_by_labels(labels))
    }

    /// Neighbors over any relationship, either direction.
    pub fn get_node_neighbors(&self, node_id: i64) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(node_id, Direction::Both, &[]))
    }

    /// Neighbors over relationships of the given types, either direction.
    pub fn get_node_neighbors_by_types(
        &self,
        node_id: i64,
        types: &[String],
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(node_id, Direction::Both, types))
    }

    pub fn get_incoming_neighbors(&self, node_id: i64) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(
            node_id,
            Direction::Incoming,
            &[],
        ))
    }

    pub fn get_outgoing_neighbors(&self, node_id: i64) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(
            node_id,
            Direction::Outgoing,
            &[],
        ))
    }

    pub fn get_incoming_neighbors_by_types(
        &self,
        node_id: i64,
        types: &[String],
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(
            node_id,
            Direction::Incoming,
            types,
        ))
    }

    pub fn get_outgoing_neighbors_by_types(
        &self,
        node_id: i64,
        types: &[String],
    ) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(statements::node_neighbors(
            node_id,
            Direction::Outgoing,
            types,
        ))
    }

    /// Creates one relationship per (type, target) pair, each directed from
    /// the anchor to the target, and returns the created relationships.
    pub fn create_relations(
        &self,
        anchor_id: i64,
        relationships: &[(String, i64)],
    ) -> Result<Vec<RelationshipRecord>, GraphError> {
        self.run_relationships(statements::create_relations(anchor_id, relationships))
    }

    /// Relationship upsert with the same shape and direction rule.
    pub fn merge_relations(
        &self,
        anchor_id: i64,
        relationships: &[(String, i64)],
    ) -> Result<Vec<RelationshipRecord>, GraphError> {
        self.run_relationships(statements::merge_relations(anchor_id, relationships))
    }

    /// Submits caller-supplied statements verbatim, newline-joined into one
    /// script, and maps the answer as node rows.
    pub fn run_statements(&self, raw: &[String]) -> Result<Vec<NodeRecord>, GraphError> {
        self.run_nodes(StatementBatch::raw(raw.to_vec()))
    }
}
