pub mod client;
pub mod types;

pub use client::GeminiHttpClient;
pub use types::{Content, GenerateContentResponse, InlineData, Part};
