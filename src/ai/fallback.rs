use super::{Content, GenerateContentResponse, GenerationService};
use crate::error::upstream_message;
use crate::{Error, Result};
use tracing::{info, warn};

/// Model priority list, most reliable first.
pub const FALLBACK_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.0-flash-001",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
];

/// Try each model once, in order, and return the first success.
///
/// Every failure moves on to the next model, whatever its status. When all
/// models fail the last error is returned as-is.
pub async fn generate_with_fallback<S, M>(
    service: &S,
    api_key: &str,
    models: &[M],
    contents: &[Content],
) -> Result<GenerateContentResponse>
where
    S: GenerationService + ?Sized,
    M: AsRef<str>,
{
    let mut last_error = None;

    for model in models {
        let model = model.as_ref();
        info!("Trying model: {}", model);
        match service.generate_content(api_key, model, contents).await {
            Ok(response) => {
                info!("Success with model: {}", model);
                return Ok(response);
            }
            Err(e) => {
                warn!("Model {} failed: {}", model, failure_message(&e));
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| Error::Configuration("No generation models configured".to_string())))
}

fn failure_message(err: &Error) -> String {
    match err {
        Error::Upstream { details, .. } => upstream_message(details),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockGenerationClient, Part};
    use serde_json::json;

    fn contents() -> Vec<Content> {
        vec![Content::user(vec![Part::text("hello")])]
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mock = MockGenerationClient::new()
            .with_failure("a", 404, json!({"error": {"message": "not found"}}))
            .with_failure("b", 400, json!({"error": {"message": "bad request"}}))
            .with_text("c", "from c")
            .with_text("d", "from d");

        let response = generate_with_fallback(&mock, "key", &["a", "b", "c", "d"], &contents())
            .await
            .unwrap();

        assert_eq!(response.text(), "from c");
        assert_eq!(mock.attempted_models(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_first_model_success_tries_nothing_else() {
        let mock = MockGenerationClient::new()
            .with_text("a", "from a")
            .with_text("b", "from b");

        let response = generate_with_fallback(&mock, "key", &["a", "b"], &contents())
            .await
            .unwrap();

        assert_eq!(response.text(), "from a");
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_returns_last_error() {
        let mock = MockGenerationClient::new()
            .with_failure("a", 404, json!({"error": {"message": "first"}}))
            .with_failure("b", 429, json!({"error": {"message": "last"}}));

        let err = generate_with_fallback(&mock, "key", &["a", "b"], &contents())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(err.details()["error"]["message"], "last");
        assert_eq!(mock.attempted_models(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_passes_key_and_contents_through() {
        let mock = MockGenerationClient::new().with_text("a", "ok");

        generate_with_fallback(&mock, "secret", &["a"], &contents())
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].api_key, "secret");
        assert_eq!(calls[0].contents, contents());
    }

    #[tokio::test]
    async fn test_empty_model_list_is_configuration_error() {
        let mock = MockGenerationClient::new();
        let models: [&str; 0] = [];

        let err = generate_with_fallback(&mock, "key", &models, &contents())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_default_models_order() {
        assert_eq!(FALLBACK_MODELS[0], "gemini-2.0-flash");
        assert_eq!(FALLBACK_MODELS.last(), Some(&"gemini-1.5-pro-latest"));
    }
}
