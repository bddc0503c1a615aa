use crate::statements::ValueEncoding;
use serde_json::{Map, Value};
use trellis_graph::{GraphError, PropertySpec, PropertyValue};

/// Node/relationship pattern interior: the identifier followed by `:label`
/// for each label, in input order. An empty label set, or the single
/// empty-string sentinel some callers pass for "no labels", yields the bare
/// identifier.
pub(crate) fn label_pattern(identifier: &str, labels: &[String]) -> String {
    let mut out = identifier.to_string();

    if labels.len() == 1 && labels[0].is_empty() {
        return out;
    }

    for label in labels {
        out.push(':');
        out.push_str(label);
    }

    out
}

/// Relationship type filter for neighbor traversals: `:A:B`, or empty when
/// no types were requested.
pub(crate) fn type_filter(types: &[String]) -> String {
    label_pattern("", types)
}

/// Comma-separated literal id list, no trailing comma.
pub(crate) fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders a property spec as a Cypher object literal, `{name:value,..}` with
/// string, then integer, then boolean entries in insertion order. All three
/// lists empty yields the empty string, not `{}`: a bare pattern matches
/// anything, while `{}` would filter on an empty object.
///
/// The encoding argument is the single seam deciding how values reach the
/// statement. [`ValueEncoding::Inline`] splices them into the text verbatim;
/// strings are double-quoted with NO escaping, so a value containing a quote
/// can break out of the literal and callers must guard against that
/// themselves. [`ValueEncoding::Parameterized`] replaces each value with a
/// `$p<i>` placeholder and records it in `parameters`.
pub(crate) fn serialize_properties(
    spec: &PropertySpec,
    encoding: ValueEncoding,
    parameters: &mut Map<String, Value>,
) -> String {
    if spec.is_empty() {
        return String::new();
    }

    let mut pairs = Vec::new();

    for (name, value) in spec.strings() {
        let rendered = match encoding {
            ValueEncoding::Inline => format!("\"{value}\""),
            ValueEncoding::Parameterized => bind_parameter(parameters, Value::from(value.clone())),
        };
        pairs.push(format!("{name}:{rendered}"));
    }

    for (name, value) in spec.integers() {
        let rendered = match encoding {
            ValueEncoding::Inline => value.to_string(),
            ValueEncoding::Parameterized => bind_parameter(parameters, Value::from(*value)),
        };
        pairs.push(format!("{name}:{rendered}"));
    }

    for (name, value) in spec.booleans() {
        let rendered = match encoding {
            ValueEncoding::Inline => value.to_string(),
            ValueEncoding::Parameterized => bind_parameter(parameters, Value::from(*value)),
        };
        pairs.push(format!("{name}:{rendered}"));
    }

    format!("{{{}}}", pairs.join(","))
}

fn bind_parameter(parameters: &mut Map<String, Value>, value: Value) -> String {
    let key = format!("p{}", parameters.len());
    parameters.insert(key.clone(), value);
    format!("${key}")
}

/// Decodes one JSON property value into the supported tagged set. Floats and
/// nested structures are outside it; `lenient` maps them to null, strict
/// reports them.
pub(crate) fn from_json_value(value: &Value, lenient: bool) -> Result<PropertyValue, GraphError> {
    match value {
        Value::Null => Ok(PropertyValue::Null),
        Value::Bool(b) => Ok(PropertyValue::Boolean(*b)),
        Value::String(s) => Ok(PropertyValue::StringValue(s.clone())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(PropertyValue::Int64(i)),
            None if lenient => Ok(PropertyValue::Null),
            None => Err(GraphError::DecodeFailed(format!(
                "unsupported numeric property value: {n}"
            ))),
        },
        other => {
            if lenient {
                Ok(PropertyValue::Null)
            } else {
                Err(GraphError::DecodeFailed(format!(
                    "unsupported property value shape: {other}"
                )))
            }
        }
    }
}
