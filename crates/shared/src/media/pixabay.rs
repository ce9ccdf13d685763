use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{MediaError, MediaFuture, StockMediaSearch};
use crate::config::ConfigError;
use crate::config_env::{http_base_url_env, parse_u64_env, require_env};

const DEFAULT_BASE_URL: &str = "https://pixabay.com/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const PHOTO_IMAGE_TYPE: &str = "photo";

#[derive(Debug, Clone)]
pub struct PixabayConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl PixabayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: http_base_url_env("PIXABAY_BASE_URL", DEFAULT_BASE_URL)?,
            api_key: require_env("PIXABAY_API_KEY")?,
            timeout_ms: parse_u64_env("PIXABAY_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
        })
    }
}

/// Stock photo and video search. Only the first hit of each search is used.
#[derive(Clone)]
pub struct PixabayClient {
    client: reqwest::Client,
    config: PixabayConfig,
}

impl PixabayClient {
    pub fn new(config: PixabayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn first_photo_url(&self, query: &str) -> Result<Option<String>, MediaError> {
        let url = format!("{}/", self.config.base_url);
        let response: SearchResponse<PhotoHit> = self
            .search(&url, &[("q", query), ("image_type", PHOTO_IMAGE_TYPE)])
            .await?;

        Ok(response.hits.into_iter().next().and_then(PhotoHit::best_url))
    }

    async fn first_video_url(&self, query: &str) -> Result<Option<String>, MediaError> {
        let url = format!("{}/videos/", self.config.base_url);
        let response: SearchResponse<VideoHit> = self.search(&url, &[("q", query)]).await?;

        Ok(response.hits.into_iter().next().and_then(VideoHit::medium_url))
    }

    async fn search<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<SearchResponse<T>, MediaError> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|err| MediaError::from_transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::ProviderFailure(format!(
                "status={}",
                status.as_u16()
            )));
        }

        response.json::<SearchResponse<T>>().await.map_err(|_| {
            MediaError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })
    }
}

impl StockMediaSearch for PixabayClient {
    fn search_photo<'a>(&'a self, query: &'a str) -> MediaFuture<'a> {
        Box::pin(self.first_photo_url(query))
    }

    fn search_video<'a>(&'a self, query: &'a str) -> MediaFuture<'a> {
        Box::pin(self.first_video_url(query))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PhotoHit {
    #[serde(rename = "largeImageURL")]
    large_image_url: Option<String>,
    #[serde(rename = "imageURL")]
    image_url: Option<String>,
}

impl PhotoHit {
    fn best_url(self) -> Option<String> {
        non_empty(self.large_image_url).or_else(|| non_empty(self.image_url))
    }
}

#[derive(Debug, Deserialize)]
struct VideoHit {
    videos: Option<VideoRenditions>,
}

#[derive(Debug, Deserialize)]
struct VideoRenditions {
    medium: Option<VideoRendition>,
}

#[derive(Debug, Deserialize)]
struct VideoRendition {
    url: Option<String>,
}

impl VideoHit {
    fn medium_url(self) -> Option<String> {
        non_empty(self.videos?.medium?.url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|url| !url.trim().is_empty())
}
