//! Query routing and multi-source answer aggregation.
//!
//! A query is classified by the text-completion provider into a set of
//! capabilities, each selected capability is dispatched to its adapter, and
//! whatever subset succeeds is merged into one [`AnswerResult`].
//!
//! [`AnswerResult`]: crate::models::AnswerResult

use thiserror::Error;
use uuid::Uuid;

use crate::llm::{ArgumentError, CapabilityKind, LlmGatewayError};
use crate::recorder::RecordError;
use crate::repos::StoreError;

pub mod classifier;
pub mod engine;
pub mod text;
pub mod visual;

pub use classifier::{Classification, QueryClassifier};
pub use engine::AnswerEngine;
pub use text::TextAnswerer;
pub use visual::{VisualGenerator, VisualResult, VisualSource};

/// Failure of one optional capability or one of its sources. Always logged
/// and downgraded to an absent field; never escalated.
#[derive(Debug, Error)]
pub enum CapabilityInvocationError {
    #[error("provider selected unknown capability '{0}'")]
    UnknownCapability(String),
    #[error("provider selected unsupported call type '{kind}' for '{name}'")]
    UnsupportedCallType { kind: String, name: String },
    #[error(transparent)]
    Arguments(#[from] ArgumentError),
    #[error("{capability:?} failed: {message}")]
    Capability {
        capability: CapabilityKind,
        message: String,
    },
    #[error("{source_name} lookup failed: {message}")]
    Source {
        source_name: VisualSource,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classification request failed: {0}")]
    Provider(#[from] LlmGatewayError),
    #[error("classification response is invalid: {0}")]
    InvalidProviderResponse(String),
}

#[derive(Debug, Error)]
pub enum TextAnswerError {
    #[error("text answer request failed: {0}")]
    Provider(#[from] LlmGatewayError),
    #[error("text answer provider returned no message")]
    EmptyResponse,
}

impl TextAnswerError {
    /// Structurally empty or malformed provider replies fail the whole call;
    /// transport failures only drop the text field.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyResponse | Self::Provider(LlmGatewayError::InvalidProviderPayload(_))
        )
    }
}

/// The single structured error surfaced to the boundary for one call.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("upstream provider protocol error: {0}")]
    UpstreamProtocol(String),
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("conversation thread {0} not found")]
    ThreadNotFound(Uuid),
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl From<ClassificationError> for AnswerError {
    fn from(err: ClassificationError) -> Self {
        match err {
            ClassificationError::Provider(LlmGatewayError::InvalidProviderPayload(message))
            | ClassificationError::InvalidProviderResponse(message) => {
                Self::UpstreamProtocol(message)
            }
            ClassificationError::Provider(other) => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<RecordError> for AnswerError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::ThreadNotFound(thread_id) => Self::ThreadNotFound(thread_id),
            RecordError::Persistence(store_err) => Self::Persistence(store_err),
        }
    }
}
