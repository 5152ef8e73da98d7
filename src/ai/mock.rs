use super::{Content, GenerateContentResponse, GenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockOutcome {
    Text(String),
    Failure {
        status: u16,
        details: serde_json::Value,
    },
}

/// A recorded `generate_content` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub api_key: String,
    pub model: String,
    pub contents: Vec<Content>,
}

/// Scripted generation service keyed by model id.
///
/// Models without a scripted outcome answer like Gemini does for an unknown
/// model: a 404 `NOT_FOUND`.
pub struct MockGenerationClient {
    outcomes: Arc<Mutex<HashMap<String, MockOutcome>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text(self, model: &str, text: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(model.to_string(), MockOutcome::Text(text.to_string()));
        self
    }

    pub fn with_failure(self, model: &str, status: u16, details: serde_json::Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(model.to_string(), MockOutcome::Failure { status, details });
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn attempted_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.model.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        contents: &[Content],
    ) -> Result<GenerateContentResponse> {
        self.calls.lock().unwrap().push(MockCall {
            api_key: api_key.to_string(),
            model: model.to_string(),
            contents: contents.to_vec(),
        });

        let outcome = self.outcomes.lock().unwrap().get(model).cloned();
        match outcome {
            Some(MockOutcome::Text(text)) => Ok(serde_json::from_value(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            }))?),
            Some(MockOutcome::Failure { status, details }) => {
                Err(Error::Upstream { status, details })
            }
            None => Err(Error::Upstream {
                status: 404,
                details: serde_json::json!({
                    "error": {
                        "code": 404,
                        "message": format!("models/{} is not found", model),
                        "status": "NOT_FOUND"
                    }
                }),
            }),
        }
    }
}
