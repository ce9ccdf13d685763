use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

use super::contracts::{CapabilityInvocation, CapabilityKind, argument_schema};

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("arguments for {capability:?} are not valid json: {message}")]
    InvalidJson {
        capability: CapabilityKind,
        message: String,
    },
    #[error("argument schema for {capability:?} failed to compile: {message}")]
    SchemaCompile {
        capability: CapabilityKind,
        message: String,
    },
    #[error("arguments for {capability:?} failed schema validation: {errors:?}")]
    SchemaViolation {
        capability: CapabilityKind,
        errors: Vec<String>,
    },
    #[error("arguments for {capability:?} could not be decoded: {message}")]
    Decode {
        capability: CapabilityKind,
        message: String,
    },
}

/// Parses provider-extracted arguments for one capability. A failure here
/// invalidates that single invocation only.
pub fn parse_invocation(
    capability: CapabilityKind,
    raw_arguments: &str,
) -> Result<CapabilityInvocation, ArgumentError> {
    let payload: Value =
        serde_json::from_str(raw_arguments).map_err(|err| ArgumentError::InvalidJson {
            capability,
            message: err.to_string(),
        })?;

    validate_arguments(capability, &payload)?;

    let decode_error = |err: serde_json::Error| ArgumentError::Decode {
        capability,
        message: err.to_string(),
    };
    match capability {
        CapabilityKind::AnswerText => serde_json::from_value(payload)
            .map(CapabilityInvocation::AnswerText)
            .map_err(decode_error),
        CapabilityKind::GenerateVisual => serde_json::from_value(payload)
            .map(CapabilityInvocation::GenerateVisual)
            .map_err(decode_error),
    }
}

pub fn validate_arguments(capability: CapabilityKind, payload: &Value) -> Result<(), ArgumentError> {
    let validator = validator_for_capability(capability)?;

    if let Err(validation_errors) = validator.validate(payload) {
        let errors = validation_errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(ArgumentError::SchemaViolation { capability, errors });
    }

    Ok(())
}

static ANSWER_TEXT_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&argument_schema(CapabilityKind::AnswerText))
        .map_err(|err| err.to_string())
});

static GENERATE_VISUAL_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    JSONSchema::compile(&argument_schema(CapabilityKind::GenerateVisual))
        .map_err(|err| err.to_string())
});

fn validator_for_capability(
    capability: CapabilityKind,
) -> Result<&'static JSONSchema, ArgumentError> {
    let validator_result = match capability {
        CapabilityKind::AnswerText => &*ANSWER_TEXT_VALIDATOR,
        CapabilityKind::GenerateVisual => &*GENERATE_VISUAL_VALIDATOR,
    };

    validator_result
        .as_ref()
        .map_err(|message| ArgumentError::SchemaCompile {
            capability,
            message: message.clone(),
        })
}
