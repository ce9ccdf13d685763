use serde::Deserialize;
use serde_json::json;

use super::{ImageGenerator, MediaError, MediaFuture};
use crate::llm::OpenAiClient;
use crate::llm::openai::parse_provider_error_code;

pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_QUALITY: &str = "standard";

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl OpenAiClient {
    async fn request_image(&self, prompt: &str) -> Result<Option<String>, MediaError> {
        let request_body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "size": IMAGE_SIZE,
            "n": IMAGE_COUNT,
            "quality": IMAGE_QUALITY,
        });

        let response = self
            .client
            .post(self.config.endpoint("images/generations"))
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| MediaError::from_transport(&err))?;

        let status = response.status();
        let body = response.text().await.map_err(|_| {
            MediaError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(MediaError::ProviderFailure(format!(
                "status={} code={}",
                status.as_u16(),
                parse_provider_error_code(&body)
            )));
        }

        let parsed: ImageGenerationResponse = serde_json::from_str(&body).map_err(|_| {
            MediaError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        Ok(parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.trim().is_empty()))
    }
}

impl ImageGenerator for OpenAiClient {
    fn generate_image<'a>(&'a self, prompt: &'a str) -> MediaFuture<'a> {
        Box::pin(self.request_image(prompt))
    }
}
