//! JSON schema validation for request bodies

use serde_json::Value;

use crate::errors::{Error, Result};

const CREATE_GROUP_SCHEMA: &str = include_str!("../schemas/create-group-request.json");
const CREATE_IMAGE_SCHEMA: &str = include_str!("../schemas/create-image-request.json");

/// Request bodies with a published schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSchema {
    CreateGroup,
    CreateImage,
}

impl RequestSchema {
    fn source(&self) -> &'static str {
        match self {
            RequestSchema::CreateGroup => CREATE_GROUP_SCHEMA,
            RequestSchema::CreateImage => CREATE_IMAGE_SCHEMA,
        }
    }
}

/// Validate `instance` against `schema`, collecting every violation into a
/// single [`Error::Validation`]
pub fn validate(schema: RequestSchema, instance: &Value) -> Result<()> {
    let schema_value: Value = serde_json::from_str(schema.source())?;
    let validator = jsonschema::validator_for(&schema_value)
        .map_err(|e| Error::Internal(format!("invalid {:?} schema: {}", schema, e)))?;

    let errors: Vec<String> = validator.iter_errors(instance).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors.join("; ")))
    }
}

/// Parse a request body as JSON. An empty body parses as an empty object.
pub fn parse_body(body: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(body)
        .map_err(|_| Error::Validation("Invalid UTF-8 in body".to_string()))?;

    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    Ok(serde_json::from_str(text)?)
}
