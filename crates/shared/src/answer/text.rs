use std::sync::Arc;

use super::TextAnswerError;
use crate::llm::{
    LlmExecutionSource, LlmGateway, LlmGatewayRequest, answer_template, generate_with_telemetry,
    log_llm_telemetry,
};

#[derive(Clone)]
pub struct TextAnswerer {
    gateway: Arc<dyn LlmGateway>,
}

impl TextAnswerer {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Produces a free-form answer using the default completion parameters.
    pub async fn answer_text(&self, query: &str) -> Result<String, TextAnswerError> {
        let template = answer_template();
        let mut request = LlmGatewayRequest::new(template.system_prompt, query);
        if let Some(temperature) = template.temperature {
            request = request.with_temperature(temperature);
        }

        let (result, telemetry) = generate_with_telemetry(
            self.gateway.as_ref(),
            LlmExecutionSource::TextAnswer,
            request,
        )
        .await;
        log_llm_telemetry(&telemetry);

        result?
            .message
            .and_then(|message| message.content)
            .ok_or(TextAnswerError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::TextAnswerer;
    use crate::answer::TextAnswerError;
    use crate::llm::{ANSWER_SYSTEM_PROMPT, LlmGatewayError};
    use crate::test_support::{ScriptedGateway, empty_response, text_response};

    #[tokio::test]
    async fn returns_message_content_without_tools() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(text_response(
            "A stop sign is a red octagonal traffic sign.",
        ))]));
        let answerer = TextAnswerer::new(gateway.clone());

        let text = answerer
            .answer_text("What is a stop sign?")
            .await
            .expect("text answer should succeed");

        assert_eq!(text, "A stop sign is a red octagonal traffic sign.");
        let requests = gateway.requests();
        assert_eq!(requests[0].system_prompt, ANSWER_SYSTEM_PROMPT);
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].tool_choice, None);
        assert_eq!(requests[0].temperature, None);
    }

    #[tokio::test]
    async fn missing_choices_is_a_protocol_violation() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(empty_response())]));
        let answerer = TextAnswerer::new(gateway);

        let err = answerer
            .answer_text("What is a heart?")
            .await
            .expect_err("empty reply should fail");

        assert!(matches!(err, TextAnswerError::EmptyResponse));
        assert!(err.is_protocol_violation());
    }

    #[tokio::test]
    async fn transport_failure_is_not_a_protocol_violation() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(
            LlmGatewayError::ProviderFailure("status=503 code=unknown".to_string()),
        )]));
        let answerer = TextAnswerer::new(gateway);

        let err = answerer
            .answer_text("What is a heart?")
            .await
            .expect_err("provider failure should fail");

        assert!(!err.is_protocol_violation());
    }
}
