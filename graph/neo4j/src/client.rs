//! Wire handling for the transactional HTTP endpoint: the request envelope,
//! the response shape, and the reqwest-backed transport.

use crate::statements::StatementBatch;
use base64::{engine::general_purpose, Engine as _};
use log::{trace, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trellis_graph::error::{decode_failed, transport_failed};
use trellis_graph::{ConnectionConfig, GraphError};

/// The transport boundary: hand over an encoded request body, get back the
/// raw response body or a transport failure. Header, auth and URL handling
/// live behind this seam; retries and cancellation are the implementor's
/// business, not the connector's.
pub trait Transport {
    fn submit(&self, body: &str) -> Result<String, GraphError>;
}

/// Request envelope, `{"statements":[{"statement":"..."}]}`.
#[derive(Debug, Serialize)]
pub struct Neo4jStatements {
    statements: Vec<Neo4jStatement>,
}

#[derive(Debug, Serialize)]
pub struct Neo4jStatement {
    statement: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,
}

impl Neo4jStatements {
    /// Joins the batch's statements with newlines into the sole statement
    /// entry. The multi-line idioms share variable bindings (`range`, `n`)
    /// across lines, so they must reach the server as one parsed script, not
    /// as independently-scoped statement objects.
    pub fn from_batch(batch: &StatementBatch) -> Self {
        Self {
            statements: vec![Neo4jStatement {
                statement: batch.statements().join("\n"),
                parameters: batch.parameters().clone(),
            }],
        }
    }

    pub fn to_body(&self) -> Result<String, GraphError> {
        serde_json::to_string(self)
            .map_err(|e| GraphError::ValidationFailed(format!("unencodable request: {e}")))
    }
}

/// How to treat response bodies that do not match the expected shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Historical behavior: an unparseable body or a missing `results` field
    /// decodes to an empty record sequence, and data entries without a
    /// usable row or meta block are skipped.
    #[default]
    Lenient,
    /// Shape problems surface as [`GraphError::DecodeFailed`]. A present but
    /// empty `data` array is still a valid empty result, not an error.
    Strict,
}

/// Response envelope of the transactional endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionResponse {
    results: Option<Vec<StatementResult>>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub columns: Vec<String>,
    pub data: Option<Vec<DataEntry>>,
}

/// One returned row: `row` holds the projected values, `meta` the
/// positionally-aligned identity metadata.
#[derive(Debug, Deserialize)]
pub struct DataEntry {
    pub row: Option<Vec<Value>>,
    pub meta: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl TransactionResponse {
    pub fn results(&self) -> &[StatementResult] {
        self.results.as_deref().unwrap_or(&[])
    }

    pub fn has_results_field(&self) -> bool {
        self.results.is_some()
    }

    fn check_errors(&self) -> Result<(), GraphError> {
        match self.errors.first() {
            Some(error) => Err(GraphError::ServerError {
                code: error.code.clone(),
                message: error.message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Parses a raw response body. Server-reported errors surface in both modes;
/// shape problems follow the mode.
pub fn decode_response(body: &str, mode: DecodeMode) -> Result<TransactionResponse, GraphError> {
    let response = match serde_json::from_str::<TransactionResponse>(body) {
        Ok(response) => response,
        Err(e) => match mode {
            DecodeMode::Lenient => {
                warn!("discarding unparseable transaction response: {e}");
                return Ok(TransactionResponse::default());
            }
            DecodeMode::Strict => {
                return Err(decode_failed(format!("response body is not valid JSON: {e}")))
            }
        },
    };

    response.check_errors()?;

    if !response.has_results_field() && mode == DecodeMode::Strict {
        return Err(decode_failed("response lacks a results field"));
    }

    Ok(response)
}

/// Blocking HTTP transport against `/db/{database}/tx/commit`.
///
/// Each submitted batch runs as one implicitly-committed transaction; the
/// server applies all statements or none. Neither retries nor timeouts
/// beyond the client defaults are added here.
pub struct Neo4jApi {
    client: Client,
    commit_url: String,
    auth_header: String,
}

impl Neo4jApi {
    pub fn new(config: &ConnectionConfig) -> Result<Self, GraphError> {
        let client = Client::builder()
            .build()
            .map_err(|e| transport_failed(format!("building HTTP client: {e}")))?;

        let commit_url = format!(
            "http://{}:{}/db/{}/tx/commit",
            config.host, config.port, config.database
        );

        let credentials = general_purpose::STANDARD.encode(format!(
            "{}:{}",
            config.user, config.password
        ));

        Ok(Self {
            client,
            commit_url,
            auth_header: format!("Basic {credentials}"),
        })
    }
}

impl Transport for Neo4jApi {
    fn submit(&self, body: &str) -> Result<String, GraphError> {
        trace!("POST {}: {body}", self.commit_url);

        let response = self
            .client
            .post(&self.commit_url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json;charset=UTF-8")
            .body(body.to_string())
            .send()
            .map_err(|e| from_reqwest_error("transaction request", e))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| from_reqwest_error("reading transaction response", e))?;

        if !status.is_success() {
            warn!("transaction endpoint answered {status}");
            return Err(transport_failed(format!("status {status}: {text}")));
        }

        trace!("transaction response: {text}");
        Ok(text)
    }
}

fn from_reqwest_error(details: &str, err: reqwest::Error) -> GraphError {
    if err.is_timeout() {
        transport_failed(format!("{details}: timeout"))
    } else if err.is_connect() {
        transport_failed(format!("{details}: connection failed"))
    } else {
        transport_failed(format!("{details}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::StatementBatch;

    #[test]
    fn test_envelope_round_trip() {
        let batch = StatementBatch::raw(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ]);
        let body = Neo4jStatements::from_batch(&batch).to_body().unwrap();

        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["statements"][0]["statement"], "A\nB\nC");
        assert!(parsed["statements"][0].get("parameters").is_none());
        assert_eq!(parsed["statements"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_envelope_carries_parameters() {
        let batch = crate::statements::create_node(
            &["Person".to_string()],
            &trellis_graph::PropertySpec::new().string("name", "Ada"),
            crate::statements::ValueEncoding::Parameterized,
        )
        .unwrap();
        let body = Neo4jStatements::from_batch(&batch).to_body().unwrap();

        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["statements"][0]["parameters"]["p0"], "Ada");
    }

    #[test]
    fn test_decode_two_rows() {
        let body = r#"{"results":[{"columns":["m"],"data":[
            {"row":[{"a":1}],"meta":[{"id":10,"type":"node"}]},
            {"row":[{"a":2}],"meta":[{"id":11,"type":"node"}]}
        ]}]}"#;
        let response = decode_response(body, DecodeMode::Strict).unwrap();
        let data = response.results()[0].data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_decode_missing_results_lenient_vs_strict() {
        let body = r#"{"unexpected": true}"#;

        let lenient = decode_response(body, DecodeMode::Lenient).unwrap();
        assert!(lenient.results().is_empty());

        let strict = decode_response(body, DecodeMode::Strict).unwrap_err();
        assert!(matches!(strict, GraphError::DecodeFailed(_)));
    }

    #[test]
    fn test_decode_invalid_json_lenient_vs_strict() {
        let body = "not json at all";

        let lenient = decode_response(body, DecodeMode::Lenient).unwrap();
        assert!(lenient.results().is_empty());

        assert!(decode_response(body, DecodeMode::Strict).is_err());
    }

    #[test]
    fn test_decode_surfaces_server_errors_in_both_modes() {
        let body = r#"{"results":[],"errors":[{
            "code":"Neo.ClientError.Statement.SyntaxError",
            "message":"Invalid input 'X'"
        }]}"#;

        for mode in [DecodeMode::Lenient, DecodeMode::Strict] {
            let err = decode_response(body, mode).unwrap_err();
            match err {
                GraphError::ServerError { code, .. } => {
                    assert_eq!(code, "Neo.ClientError.Statement.SyntaxError")
                }
                other => panic!("expected ServerError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_empty_data_is_valid_in_strict_mode() {
        let body = r#"{"results":[{"columns":["m"],"data":[]}],"errors":[]}"#;
        let response = decode_response(body, DecodeMode::Strict).unwrap();
        assert!(response.results()[0].data.as_ref().unwrap().is_empty());
    }
}
