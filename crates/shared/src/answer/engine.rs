use std::sync::Arc;

use tracing::{info, warn};

use super::{
    AnswerError, CapabilityInvocationError, QueryClassifier, TextAnswerError, TextAnswerer,
    VisualGenerator, VisualResult,
};
use crate::llm::{CapabilityKind, LlmGateway};
use crate::media::{ImageGenerator, StockMediaSearch};
use crate::models::AnswerResult;

/// Classifies a query, dispatches the selected capabilities concurrently and
/// merges whatever subset succeeded.
#[derive(Clone)]
pub struct AnswerEngine {
    classifier: QueryClassifier,
    text: TextAnswerer,
    visual: VisualGenerator,
}

impl AnswerEngine {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        images: Arc<dyn ImageGenerator>,
        stock: Arc<dyn StockMediaSearch>,
    ) -> Self {
        Self {
            classifier: QueryClassifier::new(gateway.clone()),
            text: TextAnswerer::new(gateway),
            visual: VisualGenerator::new(images, stock),
        }
    }

    pub async fn answer(&self, query: &str) -> Result<AnswerResult, AnswerError> {
        let classification = self.classifier.classify(query).await?;
        info!(
            capabilities = ?classification.capabilities(),
            used_fallback = classification.used_fallback,
            "query classified"
        );

        let text_query = classification.answer_text().map(|args| args.query.as_str());
        let description = classification
            .generate_visual()
            .map(|args| args.description.as_str());

        let (text, visual) = tokio::join!(
            async {
                match text_query {
                    Some(text_query) => Some(self.text.answer_text(text_query).await),
                    None => None,
                }
            },
            async {
                match description {
                    Some(description) => Some(self.visual.generate_visual(description).await),
                    None => None,
                }
            },
        );

        let text = contain_text_failure(text, visual.is_some())?;
        Ok(merge(text, visual.unwrap_or_default()))
    }
}

/// A text transport failure is only contained when a visual answer was
/// produced alongside it; otherwise the call has nothing to return.
fn contain_text_failure(
    outcome: Option<Result<String, TextAnswerError>>,
    visual_selected: bool,
) -> Result<Option<String>, AnswerError> {
    match outcome {
        None => Ok(None),
        Some(Ok(text)) => Ok(Some(text)),
        Some(Err(err)) if err.is_protocol_violation() => {
            Err(AnswerError::UpstreamProtocol(err.to_string()))
        }
        Some(Err(err)) if !visual_selected => {
            Err(AnswerError::UpstreamUnavailable(err.to_string()))
        }
        Some(Err(err)) => {
            let err = CapabilityInvocationError::Capability {
                capability: CapabilityKind::AnswerText,
                message: err.to_string(),
            };
            warn!(capability = CapabilityKind::AnswerText.tool_name(), "{err}");
            Ok(None)
        }
    }
}

fn merge(text: Option<String>, visual: VisualResult) -> AnswerResult {
    AnswerResult {
        text,
        generated_image_url: visual.generated_image_url,
        stock_image_url: visual.stock_image_url,
        stock_video_url: visual.stock_video_url,
    }
}
