use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::default_true;

/// An unconverted prospect. `process_type` names the account's Process by
/// name; while it is unset no automation runs for the lead.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default)]
    pub id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,
    /// 1-based index into the named process's stage list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stage_change: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_share_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_visibility_config: Option<Value>,
}

impl Lead {
    /// Split `full_name` into the first/last pair a Client record carries.
    pub fn split_name(&self) -> (String, String) {
        let full = self.full_name.as_deref().unwrap_or_default().trim();
        match full.split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (full.to_string(), String::new()),
        }
    }
}
