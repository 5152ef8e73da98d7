//! Generative-language integration
//!
//! Provides the Gemini REST client, the ordered model fallback used by every
//! proxy action, and a scripted mock for tests.

pub mod fallback;
pub mod gemini;
pub mod mock;

pub use fallback::{generate_with_fallback, FALLBACK_MODELS};
pub use gemini::{Content, GeminiHttpClient, GenerateContentResponse, InlineData, Part};
pub use mock::MockGenerationClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// One `generateContent` call against a single model.
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        contents: &[Content],
    ) -> Result<GenerateContentResponse>;
}
