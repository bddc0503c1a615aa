//! Result mapping: turning the decoded `row`/`meta` entries into typed
//! records. The mapping is projection-aware because the same wire shape
//! carries node and relationship rows; the batch's tag decides which one a
//! data entry is read as.

use crate::client::{DataEntry, DecodeMode, TransactionResponse};
use crate::conversions::from_json_value;
use serde_json::Value;
use std::collections::HashMap;
use trellis_graph::{GraphError, NodeRecord, PropertyValue, RelationshipRecord};

/// Identity comes from the entry's own meta block, first element, `id`
/// field, never from the entry's position in the data array.
fn entry_id(entry: &DataEntry) -> Option<i64> {
    entry
        .meta
        .as_ref()?
        .first()?
        .as_object()?
        .get("id")?
        .as_i64()
}

fn decode_properties(
    value: &Value,
    mode: DecodeMode,
) -> Result<Option<HashMap<String, PropertyValue>>, GraphError> {
    let Some(object) = value.as_object() else {
        return Ok(None);
    };

    let mut properties = HashMap::with_capacity(object.len());
    for (name, raw) in object {
        let decoded = from_json_value(raw, mode == DecodeMode::Lenient)?;
        properties.insert(name.clone(), decoded);
    }
    Ok(Some(properties))
}

fn projected_labels(row: &[Value]) -> Vec<String> {
    let Some(Value::Array(entries)) = row.get(1) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Maps every data entry of every results block, in document order, as a
/// node row: properties from the first row value, id from the entry's meta,
/// labels from a second row value when the projection supplied one.
pub(crate) fn map_nodes(
    response: &TransactionResponse,
    mode: DecodeMode,
) -> Result<Vec<NodeRecord>, GraphError> {
    let mut records = Vec::new();

    for entry in data_entries(response, mode)? {
        let (Some(row), Some(id)) = (entry.row.as_deref(), entry_id(entry)) else {
            skip_or_fail(mode, "node entry without row or meta id")?;
            continue;
        };

        let properties = match row.first().map(|v| decode_properties(v, mode)).transpose()? {
            Some(Some(properties)) => properties,
            _ => {
                skip_or_fail(mode, "node entry whose first row value is not an object")?;
                continue;
            }
        };

        records.push(NodeRecord {
            id,
            labels: projected_labels(row),
            properties,
        });
    }

    Ok(records)
}

/// Maps relationship rows of the aliased shape
/// `[properties, kind, startId, endId]`, id again from the entry's meta.
pub(crate) fn map_relationships(
    response: &TransactionResponse,
    mode: DecodeMode,
) -> Result<Vec<RelationshipRecord>, GraphError> {
    let mut records = Vec::new();

    for entry in data_entries(response, mode)? {
        let (Some(row), Some(id)) = (entry.row.as_deref(), entry_id(entry)) else {
            skip_or_fail(mode, "relationship entry without row or meta id")?;
            continue;
        };

        let parsed = parse_relationship_row(row, mode)?;
        let Some((properties, kind, start_node_id, end_node_id)) = parsed else {
            skip_or_fail(mode, "relationship entry with an incomplete row")?;
            continue;
        };

        records.push(RelationshipRecord {
            id,
            relationship_type: kind,
            start_node_id,
            end_node_id,
            properties,
        });
    }

    Ok(records)
}

type RelationshipParts = (HashMap<String, PropertyValue>, String, i64, i64);

fn parse_relationship_row(
    row: &[Value],
    mode: DecodeMode,
) -> Result<Option<RelationshipParts>, GraphError> {
    let properties = match row.first().map(|v| decode_properties(v, mode)).transpose()? {
        Some(Some(properties)) => properties,
        _ => return Ok(None),
    };
    let Some(kind) = row.get(1).and_then(Value::as_str) else {
        return Ok(None);
    };
    let Some(start_node_id) = row.get(2).and_then(Value::as_i64) else {
        return Ok(None);
    };
    let Some(end_node_id) = row.get(3).and_then(Value::as_i64) else {
        return Ok(None);
    };
    Ok(Some((
        properties,
        kind.to_string(),
        start_node_id,
        end_node_id,
    )))
}

fn data_entries<'a>(
    response: &'a TransactionResponse,
    mode: DecodeMode,
) -> Result<Vec<&'a DataEntry>, GraphError> {
    let mut entries = Vec::new();
    for result in response.results() {
        match &result.data {
            Some(data) => entries.extend(data.iter()),
            None => skip_or_fail(mode, "results block without a data field")?,
        }
    }
    Ok(entries)
}

fn skip_or_fail(mode: DecodeMode, what: &str) -> Result<(), GraphError> {
    match mode {
        DecodeMode::Lenient => {
            log::warn!("skipping {what}");
            Ok(())
        }
        DecodeMode::Strict => Err(GraphError::DecodeFailed(what.to_string())),
    }
}
