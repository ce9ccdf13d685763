use std::sync::Arc;

use tracing::{debug, warn};

use super::{CapabilityInvocationError, ClassificationError};
use crate::llm::{
    AnswerTextArgs, CapabilityInvocation, CapabilityKind, GenerateVisualArgs,
    LlmExecutionSource, LlmGateway, LlmGatewayRequest, LlmToolCall, ToolChoice, declared_tools,
    generate_with_telemetry, log_llm_telemetry, parse_invocation, routing_template,
};

const FUNCTION_CALL_KIND: &str = "function";

/// Capabilities selected for one query, at most one invocation per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub invocations: Vec<CapabilityInvocation>,
    /// True when the provider selected nothing and `AnswerText` was forced.
    pub used_fallback: bool,
}

impl Classification {
    pub fn fallback(query: &str) -> Self {
        Self {
            invocations: vec![CapabilityInvocation::AnswerText(AnswerTextArgs {
                query: query.to_string(),
            })],
            used_fallback: true,
        }
    }

    pub fn capabilities(&self) -> Vec<CapabilityKind> {
        self.invocations
            .iter()
            .map(CapabilityInvocation::kind)
            .collect()
    }

    pub fn answer_text(&self) -> Option<&AnswerTextArgs> {
        self.invocations.iter().find_map(|invocation| match invocation {
            CapabilityInvocation::AnswerText(args) => Some(args),
            CapabilityInvocation::GenerateVisual(_) => None,
        })
    }

    pub fn generate_visual(&self) -> Option<&GenerateVisualArgs> {
        self.invocations.iter().find_map(|invocation| match invocation {
            CapabilityInvocation::GenerateVisual(args) => Some(args),
            CapabilityInvocation::AnswerText(_) => None,
        })
    }
}

/// Delegates the routing decision to the text-completion provider through
/// function selection; no local heuristics.
#[derive(Clone)]
pub struct QueryClassifier {
    gateway: Arc<dyn LlmGateway>,
}

impl QueryClassifier {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    pub async fn classify(&self, query: &str) -> Result<Classification, ClassificationError> {
        let template = routing_template();
        let mut request = LlmGatewayRequest::new(template.system_prompt, query)
            .with_tools(declared_tools(), ToolChoice::Auto);
        if let Some(temperature) = template.temperature {
            request = request.with_temperature(temperature);
        }

        let (result, telemetry) = generate_with_telemetry(
            self.gateway.as_ref(),
            LlmExecutionSource::QueryClassification,
            request,
        )
        .await;
        log_llm_telemetry(&telemetry);

        let response = result?;
        let Some(message) = response.message else {
            return Err(ClassificationError::InvalidProviderResponse(
                "missing_choice_message".to_string(),
            ));
        };

        if message.tool_calls.is_empty() {
            debug!("provider selected no capability; falling back to text answer");
            return Ok(Classification::fallback(query));
        }

        Ok(Classification {
            invocations: select_invocations(&message.tool_calls),
            used_fallback: false,
        })
    }
}

/// Resolves provider selections into typed invocations. Invalid selections
/// are logged and skipped without affecting the others; repeated selections
/// of one capability keep the first valid one.
pub fn select_invocations(tool_calls: &[LlmToolCall]) -> Vec<CapabilityInvocation> {
    let mut invocations: Vec<CapabilityInvocation> = Vec::new();

    for call in tool_calls {
        match resolve_tool_call(call) {
            Ok(invocation) => {
                let kind = invocation.kind();
                if invocations.iter().any(|existing| existing.kind() == kind) {
                    warn!(
                        capability = kind.tool_name(),
                        "dropping repeated capability selection"
                    );
                    continue;
                }
                invocations.push(invocation);
            }
            Err(err) => {
                warn!(
                    tool = %call.name,
                    arguments = %call.arguments,
                    "skipping capability selection: {err}"
                );
            }
        }
    }

    invocations
}

fn resolve_tool_call(call: &LlmToolCall) -> Result<CapabilityInvocation, CapabilityInvocationError> {
    if call.kind != FUNCTION_CALL_KIND {
        return Err(CapabilityInvocationError::UnsupportedCallType {
            kind: call.kind.clone(),
            name: call.name.clone(),
        });
    }

    let kind = CapabilityKind::from_tool_name(&call.name)
        .ok_or_else(|| CapabilityInvocationError::UnknownCapability(call.name.clone()))?;

    parse_invocation(kind, &call.arguments).map_err(CapabilityInvocationError::from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Classification, QueryClassifier, select_invocations};
    use crate::answer::ClassificationError;
    use crate::llm::{
        AnswerTextArgs, CapabilityInvocation, CapabilityKind, GenerateVisualArgs, LlmGatewayError,
        LlmToolCall, ToolChoice,
    };
    use crate::test_support::{
        ScriptedGateway, empty_response, text_response, tool_call, tool_call_response,
    };

    #[tokio::test]
    async fn sends_routing_policy_with_both_declared_capabilities() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(tool_call_response(vec![
            tool_call("get_answer", r#"{"query":"Hi"}"#),
        ]))]));
        let classifier = QueryClassifier::new(gateway.clone());

        classifier
            .classify("Hi")
            .await
            .expect("classification should succeed");

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.user_prompt, "Hi");
        assert!(request.system_prompt.contains("get_answer"));
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
        assert_eq!(request.temperature, Some(0.3));
        let names = request.tools.iter().map(|tool| tool.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["generate_image", "get_answer"]);
    }

    #[tokio::test]
    async fn no_selection_falls_back_to_text_answer_for_the_query() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(text_response(
            "Hello! How can I help?",
        ))]));
        let classifier = QueryClassifier::new(gateway);

        let classification = classifier
            .classify("Hi")
            .await
            .expect("classification should succeed");

        assert_eq!(classification, Classification::fallback("Hi"));
        assert!(classification.used_fallback);
        assert_eq!(classification.capabilities(), vec![CapabilityKind::AnswerText]);
    }

    #[tokio::test]
    async fn missing_message_is_an_invalid_provider_response() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(empty_response())]));
        let classifier = QueryClassifier::new(gateway);

        let err = classifier
            .classify("What is a heart?")
            .await
            .expect_err("empty choices should fail");

        assert!(matches!(err, ClassificationError::InvalidProviderResponse(_)));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(LlmGatewayError::Timeout)]));
        let classifier = QueryClassifier::new(gateway);

        let err = classifier
            .classify("What is a heart?")
            .await
            .expect_err("timeout should fail");

        assert!(matches!(
            err,
            ClassificationError::Provider(LlmGatewayError::Timeout)
        ));
    }

    #[tokio::test]
    async fn both_selections_are_extracted_with_arguments() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(tool_call_response(vec![
            tool_call("generate_image", r#"{"description":"Eiffel Tower at night"}"#),
            tool_call(
                "get_answer",
                r#"{"query":"What does the Eiffel Tower look like at night?"}"#,
            ),
        ]))]));
        let classifier = QueryClassifier::new(gateway);

        let classification = classifier
            .classify("What does the Eiffel Tower look like at night?")
            .await
            .expect("classification should succeed");

        assert!(!classification.used_fallback);
        assert_eq!(
            classification.generate_visual(),
            Some(&GenerateVisualArgs {
                description: "Eiffel Tower at night".to_string()
            })
        );
        assert_eq!(
            classification.answer_text(),
            Some(&AnswerTextArgs {
                query: "What does the Eiffel Tower look like at night?".to_string()
            })
        );
    }

    #[test]
    fn unparseable_arguments_skip_only_that_capability() {
        let invocations = select_invocations(&[
            tool_call("generate_image", r#"{"description": "#),
            tool_call("get_answer", r#"{"query":"What is a stop sign?"}"#),
        ]);

        assert_eq!(
            invocations,
            vec![CapabilityInvocation::AnswerText(AnswerTextArgs {
                query: "What is a stop sign?".to_string()
            })]
        );
    }

    #[test]
    fn unknown_and_non_function_selections_are_ignored() {
        let invocations = select_invocations(&[
            tool_call("search_web", r#"{"query":"x"}"#),
            LlmToolCall {
                id: None,
                kind: "retrieval".to_string(),
                name: "get_answer".to_string(),
                arguments: r#"{"query":"x"}"#.to_string(),
            },
        ]);

        assert!(invocations.is_empty());
    }

    #[test]
    fn repeated_selection_keeps_first_valid_one() {
        let invocations = select_invocations(&[
            tool_call("get_answer", r#"{"query":"first"}"#),
            tool_call("get_answer", r#"{"query":"second"}"#),
        ]);

        assert_eq!(
            invocations,
            vec![CapabilityInvocation::AnswerText(AnswerTextArgs {
                query: "first".to_string()
            })]
        );
    }

    #[tokio::test]
    async fn all_invalid_selections_do_not_trigger_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(tool_call_response(vec![
            tool_call("generate_image", r#"{"prompt":"cat"}"#),
        ]))]));
        let classifier = QueryClassifier::new(gateway);

        let classification = classifier
            .classify("Show me a cat")
            .await
            .expect("classification should succeed");

        assert!(classification.invocations.is_empty());
        assert!(!classification.used_fallback);
    }
}
