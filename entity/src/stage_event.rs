use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stage transition, appended on every advance. Keeps the full movement
/// history even though the prospect record only remembers its latest
/// `current_stage`/`last_stage_change` pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    #[serde(default)]
    pub id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_stage: Option<u32>,
    pub to_stage: u32,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
