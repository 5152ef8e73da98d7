//! Action dispatch for the Gemini proxy.
//!
//! Turns an action-tagged request into Gemini content turns, runs them
//! through the model fallback list and shapes the reply text into the small
//! JSON envelopes the app expects.

use crate::ai::{generate_with_fallback, Content, GenerationService, InlineData, Part};
use crate::ai::{GeminiHttpClient, FALLBACK_MODELS};
use crate::extract::{extract_json_array, extract_json_object};
use crate::image::{HttpImageFetcher, ImageFetcher};
use crate::models::{
    ActionRequest, ApiKeySource, ChatPayload, ChatReply, Config, MissionSuggestions,
    SuggestionsPayload, Verification, VerifyMissionPayload,
};
use crate::{prompts, Result};
use std::sync::Arc;
use tracing::{error, info};

pub const DEFAULT_SUGGESTION_COUNT: u32 = 3;
pub const DEFAULT_MISSIONS: [&str; 3] = [
    "Complete a daily task",
    "Practice a new skill",
    "Help someone today",
];
const DEGRADED_STARS: u64 = 3;
const DEGRADED_FEEDBACK_CHARS: usize = 100;

pub struct GeminiProxy {
    generator: Arc<dyn GenerationService>,
    images: Arc<dyn ImageFetcher>,
    api_key: ApiKeySource,
    models: Vec<String>,
}

impl GeminiProxy {
    pub fn new(
        generator: Arc<dyn GenerationService>,
        images: Arc<dyn ImageFetcher>,
        api_key: ApiKeySource,
    ) -> Self {
        Self {
            generator,
            images,
            api_key,
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Build the production proxy from environment configuration.
    pub fn from_config(config: &Config) -> Self {
        // One connection pool for both Gemini and image downloads.
        let http_client = reqwest::Client::new();

        Self::new(
            Arc::new(
                GeminiHttpClient::new_with_client(http_client.clone())
                    .with_base_url(config.gemini_base_url.clone()),
            ),
            Arc::new(HttpImageFetcher::new_with_client(http_client)),
            config.api_key.clone(),
        )
    }

    /// Replace the model priority list.
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Parse, authorize and dispatch a raw request body.
    pub async fn handle(&self, body: &[u8]) -> Result<serde_json::Value> {
        // The action is validated before the credential, so a bad action
        // is reported even when the key is missing.
        let request = ActionRequest::from_slice(body)?;
        let api_key = self.api_key.resolve()?;

        info!("Handling action: {}", request.name());

        let value = match &request {
            ActionRequest::VerifyMission(payload) => {
                serde_json::to_value(self.verify_mission(&api_key, payload).await?)?
            }
            ActionRequest::ChatWithHandler(payload) => {
                serde_json::to_value(self.chat_with_handler(&api_key, payload).await?)?
            }
            ActionRequest::GenerateMissionSuggestions(payload) => serde_json::to_value(
                self.generate_mission_suggestions(&api_key, payload).await?,
            )?,
        };

        Ok(value)
    }

    async fn generate_text(&self, api_key: &str, contents: &[Content]) -> Result<String> {
        let response = generate_with_fallback(
            self.generator.as_ref(),
            api_key,
            self.models.as_slice(),
            contents,
        )
        .await?;
        Ok(response.text())
    }

    pub async fn verify_mission(
        &self,
        api_key: &str,
        payload: &VerifyMissionPayload,
    ) -> Result<Verification> {
        let mut images = Vec::new();
        for url in [&payload.before_photo_url, &payload.after_photo_url]
            .into_iter()
            .flatten()
        {
            if let Some(image) = self.fetch_optional_image(url).await {
                images.push(image);
            }
        }

        let contents = verification_contents(payload, images);
        let text = self.generate_text(api_key, &contents).await?;
        Ok(parse_verification(&text))
    }

    async fn fetch_optional_image(&self, url: &str) -> Option<InlineData> {
        if url.is_empty() {
            return None;
        }
        match self.images.fetch_image(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                error!("Error fetching image for AI analysis ({}): {}", url, e);
                None
            }
        }
    }

    pub async fn chat_with_handler(&self, api_key: &str, payload: &ChatPayload) -> Result<ChatReply> {
        let contents = chat_contents(payload);
        let text = self.generate_text(api_key, &contents).await?;
        Ok(ChatReply { text })
    }

    pub async fn generate_mission_suggestions(
        &self,
        api_key: &str,
        payload: &SuggestionsPayload,
    ) -> Result<MissionSuggestions> {
        let contents = suggestion_contents(payload);
        let text = self.generate_text(api_key, &contents).await?;
        Ok(MissionSuggestions {
            missions: parse_suggestions(&text),
        })
    }
}

/// Single user turn: the scoring prompt followed by any fetched photos.
pub fn verification_contents(
    payload: &VerifyMissionPayload,
    images: Vec<InlineData>,
) -> Vec<Content> {
    let prompt = prompts::render(
        prompts::VERIFY_MISSION,
        &[
            ("name", &payload.handler.name),
            ("personality", &payload.handler.personality_style),
            ("title", &payload.mission_title),
            ("description", &payload.mission_description),
            ("completed_state", &payload.completed_state),
        ],
    );

    let mut parts = vec![Part::text(prompt)];
    parts.extend(
        images
            .into_iter()
            .map(|inline_data| Part::InlineData { inline_data }),
    );

    vec![Content::user(parts)]
}

/// Persona preamble, replayed history, then the new message.
pub fn chat_contents(payload: &ChatPayload) -> Vec<Content> {
    let system_prompt = prompts::render(
        prompts::CHAT_SYSTEM,
        &[
            ("name", &payload.handler.name),
            ("description", &payload.handler.description),
            ("personality", &payload.handler.personality_style),
        ],
    );

    let mut contents = Vec::with_capacity(payload.history.len() + 3);
    contents.push(Content::user(vec![Part::text(system_prompt)]));
    contents.push(Content::model(vec![Part::text(
        prompts::CHAT_ACKNOWLEDGEMENT,
    )]));

    for turn in &payload.history {
        let parts = vec![Part::text(turn.content.clone())];
        contents.push(if turn.role == "user" {
            Content::user(parts)
        } else {
            Content::model(parts)
        });
    }

    contents.push(Content::user(vec![Part::text(payload.user_message.clone())]));
    contents
}

pub fn suggestion_contents(payload: &SuggestionsPayload) -> Vec<Content> {
    let count = payload
        .count
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_SUGGESTION_COUNT)
        .to_string();

    let prompt = prompts::render(
        prompts::MISSION_SUGGESTIONS,
        &[
            ("name", &payload.handler.name),
            ("description", &payload.handler.description),
            ("goals", &payload.user_goals),
            ("count", &count),
        ],
    );

    vec![Content::user(vec![Part::text(prompt)])]
}

/// First JSON object in the reply, passed through as-is. Only when none
/// parses does this fall back to a middle score with a text excerpt.
pub fn parse_verification(text: &str) -> Verification {
    extract_json_object(text).map(Verification).unwrap_or_else(|| {
        let excerpt: String = text.chars().take(DEGRADED_FEEDBACK_CHARS).collect();
        Verification::new(DEGRADED_STARS, format!("{}...", excerpt))
    })
}

/// Suggested mission titles from the reply, or the default list.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    extract_json_array(text)
        .unwrap_or_else(|| DEFAULT_MISSIONS.iter().map(|m| m.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockGenerationClient;
    use crate::image::MockImageFetcher;
    use crate::models::{ChatTurn, Persona};
    use crate::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn persona() -> Persona {
        Persona {
            name: "Agent K".to_string(),
            description: "a stern handler".to_string(),
            personality_style: "dry and precise".to_string(),
            avatar: None,
        }
    }

    fn make_proxy(generator: MockGenerationClient, images: MockImageFetcher) -> GeminiProxy {
        GeminiProxy::new(
            Arc::new(generator),
            Arc::new(images),
            ApiKeySource::Fixed(Some("test-key".to_string())),
        )
    }

    fn verify_payload(before: Option<&str>, after: Option<&str>) -> VerifyMissionPayload {
        VerifyMissionPayload {
            mission_title: "Clean the desk".to_string(),
            mission_description: "Remove all clutter".to_string(),
            completed_state: "Empty desk".to_string(),
            handler: persona(),
            before_photo_url: before.map(str::to_string),
            after_photo_url: after.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_verification_takes_object_verbatim() {
        let verification =
            parse_verification("Result: {\"stars\": 4, \"feedback\": \"Solid work, agent.\"}");
        assert_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({"stars": 4, "feedback": "Solid work, agent."})
        );
    }

    #[test]
    fn test_parse_verification_keeps_fractional_stars() {
        let verification = parse_verification("{\"stars\": 4.5, \"feedback\": \"ok\"}");
        assert_eq!(verification.stars(), Some(&json!(4.5)));
    }

    #[test]
    fn test_parse_verification_keeps_string_stars_and_extra_keys() {
        let verification = parse_verification("{\"stars\": \"5\", \"feedback\": \"Great work\"}");
        assert_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({"stars": "5", "feedback": "Great work"})
        );

        let verification =
            parse_verification("{\"stars\":5,\"feedback\":\"Great\",\"reason\":\"clean\"}");
        assert_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({"stars": 5, "feedback": "Great", "reason": "clean"})
        );
    }

    #[test]
    fn test_parse_verification_degrades_without_object() {
        let text = "a".repeat(150);
        let verification = parse_verification(&text);

        assert_eq!(verification.stars(), Some(&json!(3)));
        assert_eq!(
            verification.feedback(),
            Some(format!("{}...", "a".repeat(100)).as_str())
        );
    }

    #[test]
    fn test_parse_verification_passes_other_shapes_through() {
        let verification = parse_verification("{\"score\": 5}");
        assert_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({"score": 5})
        );
    }

    #[test]
    fn test_parse_verification_degrades_on_broken_object() {
        let verification = parse_verification("{stars: five}");
        assert_eq!(verification.stars(), Some(&json!(3)));
        assert_eq!(verification.feedback(), Some("{stars: five}..."));
    }

    #[test]
    fn test_parse_verification_truncates_on_char_boundary() {
        let text = "é".repeat(120);
        let verification = parse_verification(&text);
        assert_eq!(verification.feedback().unwrap().chars().count(), 103);
    }

    #[test]
    fn test_parse_suggestions() {
        assert_eq!(parse_suggestions("[\"A\",\"B\"]"), vec!["A", "B"]);
        assert_eq!(parse_suggestions("I cannot help with that"), DEFAULT_MISSIONS);
    }

    #[test]
    fn test_chat_contents_order() {
        let payload = ChatPayload {
            handler: persona(),
            history: vec![ChatTurn {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            user_message: "bye".to_string(),
        };

        let contents = chat_contents(&payload);
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(
            contents[1],
            Content::model(vec![Part::text("Understood. I am ready to chat.")])
        );
        assert_eq!(contents[2], Content::user(vec![Part::text("hi")]));
        assert_eq!(contents[3], Content::user(vec![Part::text("bye")]));

        match &contents[0].parts[0] {
            Part::Text { text } => {
                assert!(text.starts_with("You are Agent K, a stern handler"));
                assert!(text.contains("Personality: dry and precise"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn test_chat_contents_maps_other_roles_to_model() {
        let payload = ChatPayload {
            handler: persona(),
            history: vec![
                ChatTurn {
                    role: "assistant".to_string(),
                    content: "hello agent".to_string(),
                },
                ChatTurn {
                    role: "handler".to_string(),
                    content: "report".to_string(),
                },
            ],
            user_message: "done".to_string(),
        };

        let contents = chat_contents(&payload);
        assert_eq!(contents[2].role.as_deref(), Some("model"));
        assert_eq!(contents[3].role.as_deref(), Some("model"));
        assert_eq!(contents[4].role.as_deref(), Some("user"));
    }

    #[test]
    fn test_suggestion_contents_defaults_count() {
        let payload = SuggestionsPayload {
            user_goals: "get fit".to_string(),
            handler: persona(),
            count: None,
        };

        match &suggestion_contents(&payload)[0].parts[0] {
            Part::Text { text } => {
                assert!(text.contains("Suggest 3 realistic"));
                assert!(text.contains("User's life goals: get fit"));
            }
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_mission_attaches_fetched_images() {
        let generator = MockGenerationClient::new()
            .with_text("gemini-2.0-flash", "{\"stars\": 5, \"feedback\": \"Spotless.\"}");
        let images = MockImageFetcher::new()
            .with_image("before", JPEG.to_vec())
            .with_image("after", JPEG.to_vec());
        let proxy = make_proxy(generator, images);

        let verification = proxy
            .verify_mission("test-key", &verify_payload(Some("before"), Some("after")))
            .await
            .unwrap();

        assert_eq!(verification.stars(), Some(&json!(5)));
        assert_eq!(verification.feedback(), Some("Spotless."));
    }

    #[tokio::test]
    async fn test_verify_mission_skips_unreachable_images() {
        let generator = Arc::new(
            MockGenerationClient::new()
                .with_text("gemini-2.0-flash", "{\"stars\": 2, \"feedback\": \"Still messy.\"}"),
        );
        let images = MockImageFetcher::new().with_image("after", JPEG.to_vec());
        let proxy = GeminiProxy::new(
            generator.clone(),
            Arc::new(images),
            ApiKeySource::Fixed(Some("k".to_string())),
        );

        let verification = proxy
            .verify_mission("k", &verify_payload(Some("gone"), Some("after")))
            .await
            .unwrap();
        assert_eq!(verification.feedback(), Some("Still messy."));

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        let parts = &calls[0].contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[1], Part::InlineData { .. }));
    }

    #[tokio::test]
    async fn test_verify_mission_all_images_unreachable_still_answers() {
        let generator = MockGenerationClient::new().with_text("gemini-2.0-flash", "Looks fine to me");
        let proxy = make_proxy(generator, MockImageFetcher::new());

        let verification = proxy
            .verify_mission("k", &verify_payload(Some("x"), Some("y")))
            .await
            .unwrap();

        assert_eq!(verification.stars(), Some(&json!(3)));
        assert_eq!(verification.feedback(), Some("Looks fine to me..."));
    }

    #[tokio::test]
    async fn test_handle_falls_back_across_default_models() {
        let generator = Arc::new(
            MockGenerationClient::new()
                .with_failure("gemini-2.0-flash", 404, json!({"error": {"status": "NOT_FOUND"}}))
                .with_failure("gemini-2.0-flash-001", 500, json!({"error": {"message": "boom"}}))
                .with_text("gemini-1.5-flash-latest", "[\"Walk the dog\"]"),
        );
        let proxy = GeminiProxy::new(
            generator.clone(),
            Arc::new(MockImageFetcher::new()),
            ApiKeySource::Fixed(Some("k".to_string())),
        );

        let body = json!({
            "action": "generateMissionSuggestions",
            "userGoals": "be kind",
            "handler": {"name": "Agent K"},
            "count": 1
        });
        let value = proxy.handle(body.to_string().as_bytes()).await.unwrap();

        assert_eq!(value, json!({"missions": ["Walk the dog"]}));
        assert_eq!(
            generator.attempted_models(),
            vec!["gemini-2.0-flash", "gemini-2.0-flash-001", "gemini-1.5-flash-latest"]
        );
    }

    #[tokio::test]
    async fn test_handle_chat_returns_raw_text() {
        let generator = MockGenerationClient::new().with_text("m", "Report back by noon. {not json");
        let proxy = make_proxy(generator, MockImageFetcher::new()).with_models(["m"]);

        let body = json!({
            "action": "chatWithHandler",
            "handler": {"name": "Agent K"},
            "history": [{"role": "user", "content": "hi"}],
            "userMessage": "bye"
        });
        let value = proxy.handle(body.to_string().as_bytes()).await.unwrap();

        assert_eq!(value, json!({"text": "Report back by noon. {not json"}));
    }

    #[tokio::test]
    async fn test_handle_missing_key_is_configuration_error() {
        let generator = Arc::new(MockGenerationClient::new().with_text("m", "hi"));
        let proxy = GeminiProxy::new(
            generator.clone(),
            Arc::new(MockImageFetcher::new()),
            ApiKeySource::Fixed(None),
        );

        let body = json!({"action": "chatWithHandler", "handler": {"name": "K"}, "userMessage": "hi"});
        let err = proxy.handle(body.to_string().as_bytes()).await.unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(generator.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_reports_unknown_action_before_missing_key() {
        let proxy = GeminiProxy::new(
            Arc::new(MockGenerationClient::new()),
            Arc::new(MockImageFetcher::new()),
            ApiKeySource::Fixed(None),
        );

        let err = proxy
            .handle(br#"{"action":"launchRocket"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_handle_chat_accepts_null_history_and_persona_fields() {
        let generator = Arc::new(MockGenerationClient::new().with_text("m", "On it."));
        let proxy = GeminiProxy::new(
            generator.clone(),
            Arc::new(MockImageFetcher::new()),
            ApiKeySource::Fixed(Some("k".to_string())),
        )
        .with_models(["m"]);

        let body = json!({
            "action": "chatWithHandler",
            "handler": {"name": "K", "description": null, "personalityStyle": null},
            "history": null,
            "userMessage": "hi"
        });
        let value = proxy.handle(body.to_string().as_bytes()).await.unwrap();

        assert_eq!(value, json!({"text": "On it."}));
        assert_eq!(generator.calls()[0].contents.len(), 3);
    }

    #[tokio::test]
    async fn test_handle_exhausted_surfaces_last_error() {
        let generator = MockGenerationClient::new()
            .with_failure("a", 404, json!({"error": {"message": "first"}}))
            .with_failure("b", 403, json!({"error": {"message": "API key not valid"}}));
        let proxy = make_proxy(generator, MockImageFetcher::new()).with_models(["a", "b"]);

        let body = json!({"action": "chatWithHandler", "handler": {"name": "K"}, "userMessage": "hi"});
        let err = proxy.handle(body.to_string().as_bytes()).await.unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.details()["error"]["message"], "API key not valid");
    }
}
