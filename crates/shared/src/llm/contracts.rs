use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::gateway::ToolDeclaration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    AnswerText,
    GenerateVisual,
}

impl CapabilityKind {
    /// Declaration order presented to the provider.
    pub const DECLARED: [Self; 2] = [Self::GenerateVisual, Self::AnswerText];

    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::AnswerText => "get_answer",
            Self::GenerateVisual => "generate_image",
        }
    }

    pub const fn tool_description(self) -> &'static str {
        match self {
            Self::AnswerText => "Get the text response for the query from the user.",
            Self::GenerateVisual => "Generate an image related to description.",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::DECLARED
            .into_iter()
            .find(|kind| kind.tool_name() == name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AnswerTextArgs {
    /// The query from the user that needs to be answered
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GenerateVisualArgs {
    /// The description of image which needs to be generated
    pub description: String,
}

/// A capability selected for one query, carrying its validated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityInvocation {
    AnswerText(AnswerTextArgs),
    GenerateVisual(GenerateVisualArgs),
}

impl CapabilityInvocation {
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Self::AnswerText(_) => CapabilityKind::AnswerText,
            Self::GenerateVisual(_) => CapabilityKind::GenerateVisual,
        }
    }
}

pub fn argument_schema(kind: CapabilityKind) -> Value {
    let schema = match kind {
        CapabilityKind::AnswerText => serde_json::to_value(schema_for!(AnswerTextArgs))
            .expect("answer text argument schema should be serializable"),
        CapabilityKind::GenerateVisual => serde_json::to_value(schema_for!(GenerateVisualArgs))
            .expect("generate visual argument schema should be serializable"),
    };

    strip_schema_metadata(schema)
}

pub fn declared_tools() -> Vec<ToolDeclaration> {
    CapabilityKind::DECLARED
        .into_iter()
        .map(|kind| ToolDeclaration {
            name: kind.tool_name(),
            description: kind.tool_description(),
            parameters: argument_schema(kind),
        })
        .collect()
}

// Function-calling providers expect a bare object schema.
fn strip_schema_metadata(schema: Value) -> Value {
    match schema {
        Value::Object(mut map) => {
            map.remove("$schema");
            map.remove("title");
            Value::Object(map)
        }
        other => other,
    }
}
