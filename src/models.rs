//! Data models and structures
//!
//! Defines the action-tagged request envelope accepted by the proxy, the
//! small JSON envelopes it answers with, and the runtime configuration.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Personality profile ("handler") supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personality_style: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyMissionPayload {
    pub mission_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mission_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_state: String,
    pub handler: Persona,
    #[serde(default)]
    pub before_photo_url: Option<String>,
    #[serde(default)]
    pub after_photo_url: Option<String>,
}

/// One prior turn of a persona conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub handler: Persona,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ChatTurn>,
    pub user_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_goals: String,
    pub handler: Persona,
    #[serde(default)]
    pub count: Option<u32>,
}

/// Request envelope, discriminated by its `action` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum ActionRequest {
    #[serde(rename = "verifyMission")]
    VerifyMission(VerifyMissionPayload),
    #[serde(rename = "chatWithHandler")]
    ChatWithHandler(ChatPayload),
    #[serde(rename = "generateMissionSuggestions")]
    GenerateMissionSuggestions(SuggestionsPayload),
}

impl ActionRequest {
    pub const ACTIONS: [&'static str; 3] = [
        "verifyMission",
        "chatWithHandler",
        "generateMissionSuggestions",
    ];

    /// Parse a raw request body into a typed action.
    ///
    /// The `action` tag is validated before the payload so an unknown action
    /// is reported as such rather than as a shape mismatch.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| crate::Error::MalformedRequest(format!("Invalid JSON body: {}", e)))?;

        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or_else(|| crate::Error::MalformedRequest("Missing action".to_string()))?;

        if !Self::ACTIONS.contains(&action) {
            return Err(crate::Error::MalformedRequest(format!(
                "Unknown action: {}",
                action
            )));
        }

        let action = action.to_string();
        serde_json::from_value(value).map_err(|e| {
            crate::Error::MalformedRequest(format!("Invalid payload for {}: {}", action, e))
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::VerifyMission(_) => "verifyMission",
            ActionRequest::ChatWithHandler(_) => "chatWithHandler",
            ActionRequest::GenerateMissionSuggestions(_) => "generateMissionSuggestions",
        }
    }
}

/// Score and in-character feedback for a completed mission.
///
/// Holds the object the model replied with, unchanged. It is normally
/// `{stars, feedback}` but neither key nor type is enforced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Verification(pub serde_json::Map<String, serde_json::Value>);

impl Verification {
    pub fn new(stars: u64, feedback: String) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stars".to_string(), stars.into());
        fields.insert("feedback".to_string(), feedback.into());
        Self(fields)
    }

    pub fn stars(&self) -> Option<&serde_json::Value> {
        self.0.get("stars")
    }

    pub fn feedback(&self) -> Option<&str> {
        self.0.get("feedback").and_then(|f| f.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionSuggestions {
    pub missions: Vec<String>,
}

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Where the generation API credential comes from.
///
/// The environment is consulted on every request, so rotating the secret
/// does not need a restart.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    Env(String),
    Fixed(Option<String>),
}

impl ApiKeySource {
    pub fn resolve(&self) -> crate::Result<String> {
        let key = match self {
            ApiKeySource::Env(var) => std::env::var(var).ok(),
            ApiKeySource::Fixed(key) => key.clone(),
        };

        match key {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(crate::Error::Configuration(format!(
                "{} is not set in the execution environment",
                self.var_name()
            ))),
        }
    }

    fn var_name(&self) -> &str {
        match self {
            ApiKeySource::Env(var) => var,
            ApiKeySource::Fixed(_) => API_KEY_VAR,
        }
    }
}

impl Default for ApiKeySource {
    fn default() -> Self {
        ApiKeySource::Env(API_KEY_VAR.to_string())
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_base_url: String,
    pub api_key: ApiKeySource,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        load_dotenv(dotenvy::dotenv())?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                crate::Error::Configuration(format!("PORT must be a valid port, got '{}'", raw))
            })?,
            Err(_) => 8000,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            api_key: ApiKeySource::default(),
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn load_dotenv(result: dotenvy::Result<std::path::PathBuf>) -> crate::Result<()> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
