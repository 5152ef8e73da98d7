use super::{to_inline_data, ImageFetcher};
use crate::ai::InlineData;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory image source. Unknown URLs fail like a 404.
pub struct MockImageFetcher {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fetch_count: Arc<Mutex<usize>>,
}

impl MockImageFetcher {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            fetch_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.lock().unwrap().insert(url.to_string(), bytes);
        self
    }

    pub fn get_fetch_count(&self) -> usize {
        *self.fetch_count.lock().unwrap()
    }
}

impl Default for MockImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for MockImageFetcher {
    async fn fetch_image(&self, url: &str) -> Result<InlineData> {
        *self.fetch_count.lock().unwrap() += 1;

        self.images
            .lock()
            .unwrap()
            .get(url)
            .map(|bytes| to_inline_data(bytes))
            .ok_or_else(|| Error::ImageFetch(format!("Failed to fetch image: {} - 404", url)))
    }
}
