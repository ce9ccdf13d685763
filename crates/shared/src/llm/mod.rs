pub mod contracts;
pub mod gateway;
pub mod observability;
pub mod openai;
pub mod prompts;
pub mod validation;

pub use contracts::{
    AnswerTextArgs, CapabilityInvocation, CapabilityKind, GenerateVisualArgs, argument_schema,
    declared_tools,
};
pub use gateway::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmMessage, LlmTokenUsage, LlmToolCall, ToolChoice, ToolDeclaration,
};
pub use observability::{
    LlmExecutionSource, LlmTelemetryEvent, generate_with_telemetry, log_llm_telemetry,
};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use prompts::{
    ANSWER_SYSTEM_PROMPT, PromptTemplate, ROUTING_SYSTEM_PROMPT, ROUTING_TEMPERATURE,
    answer_template, routing_template,
};
pub use validation::{ArgumentError, parse_invocation, validate_arguments};
