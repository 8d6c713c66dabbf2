// handlers/mod.rs - two-tier handler layout
//
// Public (no token) and protected (AdminUser / SelfOrAdmin extractors).
// Admin checks run in the extractor. Self-or-admin checks run in the handler
// once the request is validated, always ahead of store lookups.

pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::schemas::Schema;

/// Request body as received; malformed JSON becomes `INVALID_JSON`.
pub type JsonBody = Result<Json<Value>, JsonRejection>;

/// Checks the body against `schema`, reporting every violation at once.
pub(crate) fn validated(body: JsonBody, schema: &Schema) -> Result<Map<String, Value>, ApiError> {
    let Json(body) = body?;
    Ok(schema.validate(&body)?)
}

/// Validated fields into a typed record.
pub(crate) fn into_model<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| ApiError::bad_request(e.to_string()))
}

pub(crate) fn parse_job_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {}", raw)))
}
