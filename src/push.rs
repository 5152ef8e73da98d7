//! Background push notification contract.
//!
//! The web client's messaging worker receives provider payloads, shows a
//! local notification and focuses (or opens) the app on click. These types
//! pin down that payload shape and the decisions the worker makes, so the
//! backend can produce payloads the worker renders as intended.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "TaskAssassin";
pub const DEFAULT_BODY: &str = "You have a new notification";
pub const NOTIFICATION_ICON: &str = "/icons/Icon-192.png";
pub const APP_ROOT: &str = "/";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PushNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Provider push message: `{notification: {title, body}, data}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PushPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<PushNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            notification: Some(PushNotification {
                title: Some(title.into()),
                body: Some(body.into()),
            }),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// What the worker shows for a payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl LocalNotification {
    pub fn from_payload(payload: &PushPayload) -> Self {
        let notification = payload.notification.clone().unwrap_or_default();

        Self {
            title: notification
                .title
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: notification.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            data: payload.data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    /// Focus the already open window at this index.
    Focus(usize),
    /// Open a new window at this URL.
    Open(String),
}

/// Decide how a notification click brings the app forward.
pub fn click_target<S: AsRef<str>>(open_window_urls: &[S]) -> ClickTarget {
    open_window_urls
        .iter()
        .position(|url| url.as_ref() == APP_ROOT)
        .map(ClickTarget::Focus)
        .unwrap_or_else(|| ClickTarget::Open(APP_ROOT.to_string()))
}
