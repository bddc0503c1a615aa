//! Statement synthesis: pure functions mapping typed graph operations to the
//! ordered Cypher statement sequences the transactional endpoint executes as
//! one script. Nothing here performs I/O; an empty batch is the no-op marker
//! and must never be submitted.

use crate::conversions::{id_list, label_pattern, serialize_properties, type_filter};
use serde_json::{Map, Value};
use trellis_graph::{Direction, GraphError, Projection, PropertySpec};

/// How literal values reach the statement text.
///
/// `Inline` reproduces the historical behavior: values are spliced into the
/// statement verbatim, with no escaping, which means a value containing a
/// quote or statement terminator can alter the statement. `Parameterized`
/// moves property values into the request's parameter map instead.
/// Identifier lists, labels and relationship types are inlined in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueEncoding {
    #[default]
    Inline,
    Parameterized,
}

/// An ordered sequence of statements plus the parameters the parameterized
/// encoding collected, tagged with the projection the result mapper needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementBatch {
    statements: Vec<String>,
    parameters: Map<String, Value>,
    projection: Projection,
}

impl StatementBatch {
    fn new(statements: Vec<String>, parameters: Map<String, Value>, projection: Projection) -> Self {
        Self {
            statements,
            parameters,
            projection,
        }
    }

    fn empty(projection: Projection) -> Self {
        Self::new(Vec::new(), Map::new(), projection)
    }

    /// A batch of caller-supplied raw statements, mapped as a node
    /// projection.
    pub fn raw(statements: Vec<String>) -> Self {
        Self::new(statements, Map::new(), Projection::Nodes)
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

fn node_pattern(
    labels: &[String],
    properties: &PropertySpec,
    encoding: ValueEncoding,
    parameters: &mut Map<String, Value>,
) -> String {
    let pattern = label_pattern("m", labels);
    let object = serialize_properties(properties, encoding, parameters);
    if object.is_empty() {
        pattern
    } else {
        format!("{pattern} {object}")
    }
}

/// `CREATE (m:A:B {k:"v"}) RETURN m`
pub fn create_node(
    labels: &[String],
    properties: &PropertySpec,
    encoding: ValueEncoding,
) -> Result<StatementBatch, GraphError> {
    properties.validate()?;
    let mut parameters = Map::new();
    let pattern = node_pattern(labels, properties, encoding, &mut parameters);
    Ok(StatementBatch::new(
        vec![format!("CREATE ({pattern}) RETURN m")],
        parameters,
        Projection::Nodes,
    ))
}

/// `MERGE (m:A:B {k:"v"}) RETURN m`: idempotent upsert keyed by the full
/// pattern; an existing match is returned unmodified.
pub fn merge_node(
    labels: &[String],
    properties: &PropertySpec,
    encoding: ValueEncoding,
) -> Result<StatementBatch, GraphError> {
    properties.validate()?;
    let mut parameters = Map::new();
    let pattern = node_pattern(labels, properties, encoding, &mut parameters);
    Ok(StatementBatch::new(
        vec![format!("MERGE ({pattern}) RETURN m")],
        parameters,
        Projection::Nodes,
    ))
}

/// Match on the full pattern, then `DETACH DELETE` so incident relationships
/// go with the nodes.
pub fn delete_nodes_by_properties(
    labels: &[String],
    properties: &PropertySpec,
    encoding: ValueEncoding,
) -> Result<StatementBatch, GraphError> {
    properties.validate()?;
    let mut parameters = Map::new();
    let pattern = node_pattern(labels, properties, encoding, &mut parameters);
    Ok(StatementBatch::new(
        vec![format!("MATCH ({pattern})"), "DETACH DELETE m".to_string()],
        parameters,
        Projection::Unit,
    ))
}

/// The shared multi-id idiom: bind the ids as a literal list, unwind it, and
/// match each node by identity. Callers append the operation-specific tail.
fn unwind_prelude(ids: &[i64]) -> Vec<String> {
    vec![
        format!("WITH [{}] AS range", id_list(ids)),
        "UNWIND range AS n".to_string(),
        "MATCH (m) WHERE id(m) = n".to_string(),
    ]
}

pub fn get_nodes_by_id(ids: &[i64]) -> StatementBatch {
    if ids.is_empty() {
        return StatementBatch::empty(Projection::Nodes);
    }
    let mut statements = unwind_prelude(ids);
    statements.push("RETURN m".to_string());
    StatementBatch::new(statements, Map::new(), Projection::Nodes)
}

/// `SET m += {..}`: keys in the object overwrite same-named properties,
/// everything else on the node is untouched.
pub fn add_properties_to_nodes(
    ids: &[i64],
    properties: &PropertySpec,
    encoding: ValueEncoding,
) -> Result<StatementBatch, GraphError> {
    properties.validate()?;
    if ids.is_empty() || properties.is_empty() {
        return Ok(StatementBatch::empty(Projection::Unit));
    }
    let mut parameters = Map::new();
    let object = serialize_properties(properties, encoding, &mut parameters);
    let mut statements = unwind_prelude(ids);
    statements.push(format!("SET m += {object}"));
    Ok(StatementBatch::new(statements, parameters, Projection::Unit))
}

/// One `REMOVE m.<name>` per property, in input order. Each removal is
/// independent, so the ordering has no observable effect.
pub fn remove_properties_from_nodes(ids: &[i64], properties: &[String]) -> StatementBatch {
    if ids.is_empty() || properties.is_empty() {
        return StatementBatch::empty(Projection::Unit);
    }
    let mut statements = unwind_prelude(ids);
    for name in properties {
        statements.push(format!("REMOVE m.{name}"));
    }
    StatementBatch::new(statements, Map::new(), Projection::Unit)
}

pub fn add_labels_to_nodes(ids: &[i64], labels: &[String]) -> StatementBatch {
    if ids.is_empty() || labels.is_empty() {
        return StatementBatch::empty(Projection::Unit);
    }
    let mut statements = unwind_prelude(ids);
    for label in labels {
        statements.push(format!("SET m:{label}"));
    }
    StatementBatch::new(statements, Map::new(), Projection::Unit)
}

pub fn remove_labels_from_nodes(ids: &[i64], labels: &[String]) -> StatementBatch {
    if ids.is_empty() || labels.is_empty() {
        return StatementBatch::empty(Projection::Unit);
    }
    let mut statements = unwind_prelude(ids);
    for label in labels {
        statements.push(format!("REMOVE m:{label}"));
    }
    StatementBatch::new(statements, Map::new(), Projection::Unit)
}

pub fn delete_nodes_by_id(ids: &[i64]) -> StatementBatch {
    if ids.is_empty() {
        return StatementBatch::empty(Projection::Unit);
    }
    let mut statements = unwind_prelude(ids);
    statements.push("DETACH DELETE m".to_string());
    StatementBatch::new(statements, Map::new(), Projection::Unit)
}

pub fn get_nodes_by_labels(labels: &[String]) -> StatementBatch {
    StatementBatch::new(
        vec![
            format!("MATCH ({})", label_pattern("m", labels)),
            "RETURN m".to_string(),
        ],
        Map::new(),
        Projection::Nodes,
    )
}

/// The single template behind all six neighbor variants: anchor bound by
/// identity, then one relationship pattern whose arrow and optional type
/// filter select the variant. An empty type list degrades to the untyped
/// arrow.
pub fn node_neighbors(node_id: i64, direction: Direction, types: &[String]) -> StatementBatch {
    let filter = type_filter(types);
    let arrow = if filter.is_empty() {
        match direction {
            Direction::Both => "--".to_string(),
            Direction::Outgoing => "-->".to_string(),
            Direction::Incoming => "<--".to_string(),
        }
    } else {
        match direction {
            Direction::Both => format!("-[{filter}]-"),
            Direction::Outgoing => format!("-[{filter}]->"),
            Direction::Incoming => format!("<-[{filter}]-"),
        }
    };

    StatementBatch::new(
        vec![
            format!("MATCH (p) WHERE id(p) = {node_id}"),
            format!("MATCH (p) {arrow} (n) RETURN n"),
        ],
        Map::new(),
        Projection::Nodes,
    )
}

fn relations(keyword: &str, anchor_id: i64, relationships: &[(String, i64)]) -> StatementBatch {
    if relationships.is_empty() {
        return StatementBatch::empty(Projection::Relationships);
    }

    let clauses: Vec<String> = relationships
        .iter()
        .enumerate()
        .map(|(i, (relationship_type, target_id))| {
            format!(
                "MATCH (n) WHERE id(n) = {anchor_id} \
                 MATCH (n{i}) WHERE id(n{i}) = {target_id} \
                 {keyword} (n)-[r:{relationship_type}]->(n{i}) \
                 RETURN r, type(r) AS kind, id(n) AS startId, id(n{i}) AS endId"
            )
        })
        .collect();

    StatementBatch::new(
        vec![clauses.join(" UNION ALL ")],
        Map::new(),
        Projection::Relationships,
    )
}

/// One creation clause per (type, target) pair, all joined with `UNION ALL`
/// into a single statement. The edge always runs anchor→target; the aliased
/// RETURN keeps the union's columns consistent and gives the mapper a
/// relationship projection.
pub fn create_relations(anchor_id: i64, relationships: &[(String, i64)]) -> StatementBatch {
    relations("CREATE", anchor_id, relationships)
}

/// Same statement shape with `MERGE`: existing anchor→target edges of the
/// given type are reused rather than duplicated.
pub fn merge_relations(anchor_id: i64, relationships: &[(String, i64)]) -> StatementBatch {
    relations("MERGE", anchor_id, relationships)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_node_single_statement() {
        let spec = PropertySpec::new().string("name", "Ada");
        let batch =
            create_node(&labels(&["Person", "Engineer"]), &spec, ValueEncoding::Inline).unwrap();
        assert_eq!(
            batch.statements(),
            ["CREATE (m:Person:Engineer {name:\"Ada\"}) RETURN m"]
        );
        assert_eq!(batch.projection(), Projection::Nodes);
    }

    #[test]
    fn test_create_node_without_labels_or_properties() {
        let batch = create_node(&[], &PropertySpec::new(), ValueEncoding::Inline).unwrap();
        assert_eq!(batch.statements(), ["CREATE (m) RETURN m"]);

        let sentinel = create_node(
            &labels(&[""]),
            &PropertySpec::new(),
            ValueEncoding::Inline,
        )
        .unwrap();
        assert_eq!(sentinel.statements(), ["CREATE (m) RETURN m"]);
    }

    #[test]
    fn test_create_node_rejects_colliding_properties() {
        let spec = PropertySpec::new().string("age", "36").integer("age", 36);
        let err = create_node(&labels(&["Person"]), &spec, ValueEncoding::Inline).unwrap_err();
        assert!(matches!(err, GraphError::ValidationFailed(_)));
    }

    #[test]
    fn test_create_node_parameterized() {
        let spec = PropertySpec::new().string("name", "Ada");
        let batch =
            create_node(&labels(&["Person"]), &spec, ValueEncoding::Parameterized).unwrap();
        assert_eq!(
            batch.statements(),
            ["CREATE (m:Person {name:$p0}) RETURN m"]
        );
        assert_eq!(
            batch.parameters().get("p0"),
            Some(&serde_json::Value::from("Ada"))
        );
    }

    #[test]
    fn test_merge_node_uses_merge_keyword() {
        let spec = PropertySpec::new().integer("age", 36);
        let batch = merge_node(&labels(&["Person"]), &spec, ValueEncoding::Inline).unwrap();
        assert_eq!(batch.statements(), ["MERGE (m:Person {age:36}) RETURN m"]);
    }

    #[test]
    fn test_delete_nodes_by_properties_detaches() {
        let spec = PropertySpec::new().boolean("stale", true);
        let batch =
            delete_nodes_by_properties(&labels(&["Cache"]), &spec, ValueEncoding::Inline).unwrap();
        assert_eq!(
            batch.statements(),
            ["MATCH (m:Cache {stale:true})", "DETACH DELETE m"]
        );
        assert_eq!(batch.projection(), Projection::Unit);
    }

    #[test]
    fn test_get_nodes_by_id_idiom() {
        let batch = get_nodes_by_id(&[3, 1, 2]);
        assert_eq!(
            batch.statements(),
            [
                "WITH [3,1,2] AS range",
                "UNWIND range AS n",
                "MATCH (m) WHERE id(m) = n",
                "RETURN m",
            ]
        );
    }

    #[test]
    fn test_get_nodes_by_id_empty_is_noop() {
        let batch = get_nodes_by_id(&[]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_add_properties_to_nodes() {
        let spec = PropertySpec::new().string("name", "Ada").integer("age", 36);
        let batch = add_properties_to_nodes(&[5], &spec, ValueEncoding::Inline).unwrap();
        assert_eq!(batch.statements().len(), 4);
        assert_eq!(
            batch.statements()[3],
            "SET m += {name:\"Ada\",age:36}"
        );
    }

    #[test]
    fn test_add_properties_noop_cases() {
        let spec = PropertySpec::new().string("name", "Ada");
        assert!(add_properties_to_nodes(&[], &spec, ValueEncoding::Inline)
            .unwrap()
            .is_empty());
        assert!(
            add_properties_to_nodes(&[5], &PropertySpec::new(), ValueEncoding::Inline)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_remove_properties_from_nodes() {
        let batch = remove_properties_from_nodes(&[5], &labels(&["name", "age"]));
        assert_eq!(batch.statements()[3], "REMOVE m.name");
        assert_eq!(batch.statements()[4], "REMOVE m.age");
    }

    #[test]
    fn test_add_labels_order() {
        let batch = add_labels_to_nodes(&[5], &labels(&["Foo", "Bar"]));
        let tail: Vec<&str> = batch.statements()[3..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(tail, vec!["SET m:Foo", "SET m:Bar"]);
    }

    #[test]
    fn test_remove_labels() {
        let batch = remove_labels_from_nodes(&[5, 6], &labels(&["Foo"]));
        assert_eq!(batch.statements()[0], "WITH [5,6] AS range");
        assert_eq!(batch.statements()[3], "REMOVE m:Foo");
    }

    #[test]
    fn test_delete_nodes_by_id() {
        let batch = delete_nodes_by_id(&[7]);
        assert_eq!(batch.statements()[3], "DETACH DELETE m");
        assert_eq!(batch.projection(), Projection::Unit);
        assert!(delete_nodes_by_id(&[]).is_empty());
    }

    #[test]
    fn test_get_nodes_by_labels() {
        let batch = get_nodes_by_labels(&labels(&["Person", "Actor"]));
        assert_eq!(
            batch.statements(),
            ["MATCH (m:Person:Actor)", "RETURN m"]
        );
    }

    #[test]
    fn test_neighbor_variants_share_template() {
        let untyped_any = node_neighbors(5, Direction::Both, &[]);
        assert_eq!(
            untyped_any.statements(),
            ["MATCH (p) WHERE id(p) = 5", "MATCH (p) -- (n) RETURN n"]
        );

        let untyped_out = node_neighbors(5, Direction::Outgoing, &[]);
        assert_eq!(untyped_out.statements()[1], "MATCH (p) --> (n) RETURN n");

        let untyped_in = node_neighbors(5, Direction::Incoming, &[]);
        assert_eq!(untyped_in.statements()[1], "MATCH (p) <-- (n) RETURN n");

        let types = labels(&["KNOWS", "LIKES"]);
        let typed_any = node_neighbors(5, Direction::Both, &types);
        assert_eq!(
            typed_any.statements()[1],
            "MATCH (p) -[:KNOWS:LIKES]- (n) RETURN n"
        );

        let typed_out = node_neighbors(5, Direction::Outgoing, &types);
        assert_eq!(
            typed_out.statements()[1],
            "MATCH (p) -[:KNOWS:LIKES]-> (n) RETURN n"
        );

        let typed_in = node_neighbors(5, Direction::Incoming, &types);
        assert_eq!(
            typed_in.statements()[1],
            "MATCH (p) <-[:KNOWS:LIKES]- (n) RETURN n"
        );
    }

    #[test]
    fn test_neighbor_empty_types_degrade_to_untyped() {
        let batch = node_neighbors(5, Direction::Outgoing, &[]);
        assert!(!batch.statements()[1].contains('['));
    }

    #[test]
    fn test_create_relations_union_all() {
        let pairs = vec![("KNOWS".to_string(), 2), ("LIKES".to_string(), 3)];
        let batch = create_relations(1, &pairs);
        assert_eq!(batch.statements().len(), 1);
        let statement = &batch.statements()[0];

        assert!(statement.contains("CREATE (n)-[r:KNOWS]->(n0)"));
        assert!(statement.contains("CREATE (n)-[r:LIKES]->(n1)"));
        assert!(statement.contains(" UNION ALL "));
        assert!(statement.contains("MATCH (n) WHERE id(n) = 1"));
        assert!(statement.contains("MATCH (n0) WHERE id(n0) = 2"));
        assert!(statement.contains("MATCH (n1) WHERE id(n1) = 3"));
        assert_eq!(batch.projection(), Projection::Relationships);
    }

    #[test]
    fn test_merge_relations_uses_merge_keyword() {
        let pairs = vec![("KNOWS".to_string(), 2)];
        let batch = merge_relations(1, &pairs);
        assert!(batch.statements()[0].contains("MERGE (n)-[r:KNOWS]->(n0)"));
        assert!(merge_relations(1, &[]).is_empty());
    }
}
