//! Row shapes for the managed relational store.
//!
//! The store owns persistence; this module only fixes the JSON contract of
//! each table for selects (`*Row`), inserts (`*Insert`) and partial updates
//! (`*Update`). Insert and update structs omit unset fields when serialized
//! so server-side defaults apply. In updates a nullable column is an
//! `Option<Option<T>>`: `None` leaves it alone, `Some(None)` clears it.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Timestamp = DateTime<Utc>;

/// Binds a table name to its row contract.
pub trait Table {
    const NAME: &'static str;
    type Row: DeserializeOwned;
    type Insert: Serialize;
    type Update: Serialize;
}

macro_rules! table {
    ($table:ident, $name:literal, $row:ty, $insert:ty, $update:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $table;

        impl Table for $table {
            const NAME: &'static str = $name;
            type Row = $row;
            type Insert = $insert;
            type Update = $update;
        }
    };
}

table!(Achievements, "achievements", AchievementRow, AchievementInsert, AchievementUpdate);
table!(BugReports, "bug_reports", BugReportRow, BugReportInsert, BugReportUpdate);
table!(ChatMessages, "chat_messages", ChatMessageRow, ChatMessageInsert, ChatMessageUpdate);
table!(Friends, "friends", FriendRow, FriendInsert, FriendUpdate);
table!(Handlers, "handlers", HandlerRow, HandlerInsert, HandlerUpdate);
table!(Messages, "messages", MessageRow, MessageInsert, MessageUpdate);
table!(Missions, "missions", MissionRow, MissionInsert, MissionUpdate);
table!(Notifications, "notifications", NotificationRow, NotificationInsert, NotificationUpdate);
table!(
    UserAchievements,
    "user_achievements",
    UserAchievementRow,
    UserAchievementInsert,
    UserAchievementUpdate
);
table!(Users, "users", UserRow, UserInsert, UserUpdate);

// achievements

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub criteria: String,
    pub icon: String,
    pub stars_required: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AchievementInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub criteria: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars_required: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AchievementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars_required: Option<i32>,
}

// bug_reports

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BugReportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub app_version: Option<String>,
    pub device_info: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BugReportInsert {
    pub user_id: Uuid,
    pub user_email: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BugReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

// chat_messages

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageInsert {
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChatMessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// friends

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_user_id: Uuid,
    pub status: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FriendInsert {
    pub user_id: Uuid,
    pub friend_user_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FriendUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// handlers

/// Persona catalog entry. Its name, description and style feed the proxy's
/// prompts via [`crate::models::Persona`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub avatar: String,
    pub greeting_message: String,
    pub personality_style: String,
}

impl From<&HandlerRow> for crate::models::Persona {
    fn from(row: &HandlerRow) -> Self {
        Self {
            name: row.name.clone(),
            description: row.description.clone(),
            personality_style: row.personality_style.clone(),
            avatar: Some(row.avatar.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HandlerInsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub category: String,
    pub avatar: String,
    pub greeting_message: String,
    pub personality_style: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HandlerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_style: Option<String>,
}

// messages

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageInsert {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
}

// missions

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed_state: String,
    #[serde(rename = "type")]
    pub mission_type: String,
    pub status: String,
    pub stars_earned: i32,
    pub ai_feedback: Option<String>,
    pub before_photo_url: Option<String>,
    pub after_photo_url: Option<String>,
    pub assigned_by_user_id: Option<Uuid>,
    pub assigned_to_user_id: Option<Uuid>,
    pub recurrence_pattern: Option<String>,
    pub deadline: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MissionInsert {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub completed_state: String,
    #[serde(rename = "type")]
    pub mission_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars_earned: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_by_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MissionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_state: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mission_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars_earned: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_photo_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_photo_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<Timestamp>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<Timestamp>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

// notifications

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationInsert {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NotificationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Option<serde_json::Value>>,
}

// user_achievements

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAchievementRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub earned_at: Timestamp,
    pub unlocked_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserAchievementInsert {
    pub user_id: Uuid,
    pub achievement_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserAchievementUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<Timestamp>,
}

// users

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub codename: String,
    pub avatar_url: Option<String>,
    pub selected_handler_id: Uuid,
    pub life_goals: String,
    pub level: i32,
    pub total_stars: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserInsert {
    pub id: Uuid,
    pub email: String,
    pub codename: String,
    pub selected_handler_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_goals: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_handler_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_stars: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
