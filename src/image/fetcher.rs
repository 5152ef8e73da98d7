use super::{to_inline_data, ImageFetcher};
use crate::ai::InlineData;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Plain `GET` image downloader.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::new_with_client(Client::new())
    }

    pub fn new_with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<InlineData> {
        tracing::debug!("Fetching image for analysis: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::ImageFetch(format!(
                "Failed to fetch image: {} - {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(to_inline_data(&bytes))
    }
}
