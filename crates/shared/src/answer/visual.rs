use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::CapabilityInvocationError;
use crate::media::{ImageGenerator, MediaError, StockMediaSearch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualSource {
    GeneratedImage,
    StockPhoto,
    StockVideo,
}

impl VisualSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneratedImage => "generated_image",
            Self::StockPhoto => "stock_photo",
            Self::StockVideo => "stock_video",
        }
    }
}

impl fmt::Display for VisualSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the three visual lookups. Each field is independent; a failed
/// or empty source leaves only its own field absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualResult {
    pub generated_image_url: Option<String>,
    pub stock_image_url: Option<String>,
    pub stock_video_url: Option<String>,
}

#[derive(Clone)]
pub struct VisualGenerator {
    images: Arc<dyn ImageGenerator>,
    stock: Arc<dyn StockMediaSearch>,
}

impl VisualGenerator {
    pub fn new(images: Arc<dyn ImageGenerator>, stock: Arc<dyn StockMediaSearch>) -> Self {
        Self { images, stock }
    }

    /// Runs image generation, photo search and video search concurrently
    /// with the same description. Never fails.
    pub async fn generate_visual(&self, description: &str) -> VisualResult {
        let (generated, photo, video) = tokio::join!(
            self.images.generate_image(description),
            self.stock.search_photo(description),
            self.stock.search_video(description),
        );

        VisualResult {
            generated_image_url: settle(VisualSource::GeneratedImage, generated),
            stock_image_url: settle(VisualSource::StockPhoto, photo),
            stock_video_url: settle(VisualSource::StockVideo, video),
        }
    }
}

fn settle(source: VisualSource, outcome: Result<Option<String>, MediaError>) -> Option<String> {
    match outcome {
        Ok(Some(url)) => Some(url),
        Ok(None) => {
            debug!(source = source.as_str(), "visual source returned no result");
            None
        }
        Err(err) => {
            let err = CapabilityInvocationError::Source {
                source_name: source,
                message: err.to_string(),
            };
            warn!(source = source.as_str(), "{err}");
            None
        }
    }
}
