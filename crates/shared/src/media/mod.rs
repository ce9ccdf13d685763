use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub mod openai_images;
pub mod pixabay;

pub use openai_images::{IMAGE_COUNT, IMAGE_QUALITY, IMAGE_SIZE};
pub use pixabay::{PixabayClient, PixabayConfig};

/// Resolves to the URL of the first usable result, or `None` when the source
/// found nothing.
pub type MediaFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, MediaError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media provider request timed out")]
    Timeout,
    #[error("media provider request failed: {0}")]
    ProviderFailure(String),
    #[error("media provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

impl MediaError {
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::ProviderFailure("request_unavailable".to_string())
        }
    }
}

pub trait ImageGenerator: Send + Sync {
    fn generate_image<'a>(&'a self, prompt: &'a str) -> MediaFuture<'a>;
}

pub trait StockMediaSearch: Send + Sync {
    fn search_photo<'a>(&'a self, query: &'a str) -> MediaFuture<'a>;
    fn search_video<'a>(&'a self, query: &'a str) -> MediaFuture<'a>;
}
