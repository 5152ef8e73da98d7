//! Image retrieval for vision requests
//!
//! Downloads caller-supplied photo URLs and turns them into base64 inline
//! parts for the generation API.

pub mod fetcher;
pub mod mime;
pub mod mock;

pub use fetcher::HttpImageFetcher;
pub use mock::MockImageFetcher;

use crate::ai::InlineData;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> Result<InlineData>;
}

/// Encode raw image bytes as an inline part payload.
pub fn to_inline_data(bytes: &[u8]) -> InlineData {
    use base64::Engine as _;

    InlineData {
        mime_type: mime::detect_image_mime(bytes).to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    }
}
