use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process::StageCategory;

/// A pending-or-resolved human task the engine opens when an entity enters a
/// stage. Exactly one of `client_id`/`lead_id` is set. Rows are append-only:
/// a resolved status never moves back to pending.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessAction {
    #[serde(default)]
    pub id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_stage_id: Option<String>,
    pub action_type: ActionType,
    pub title: String,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_category: Option<StageCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    StageApproval,
    PhoneCallCompletion,
    DocumentsRequestApproval,
    MeetingFollowup,
    QuotePreparationApproval,
    DocumentsVerifyReceipt,
    QuoteAcceptanceApproval,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::StageApproval => "stage_approval",
            ActionType::PhoneCallCompletion => "phone_call_completion",
            ActionType::DocumentsRequestApproval => "documents_request_approval",
            ActionType::MeetingFollowup => "meeting_followup",
            ActionType::QuotePreparationApproval => "quote_preparation_approval",
            ActionType::DocumentsVerifyReceipt => "documents_verify_receipt",
            ActionType::QuoteAcceptanceApproval => "quote_acceptance_approval",
        }
    }
}

/// Action lifecycle, serialized with the production Hebrew wire strings.
///
/// Skip and deferral are distinct variants even though the original store
/// overloaded `נדחה` for both; one advances the process, the other does not,
/// and reporting must be able to tell them apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    #[default]
    #[serde(rename = "ממתין לאישור")]
    Pending,
    #[serde(rename = "אושר")]
    Approved,
    #[serde(rename = "נדחה")]
    Deferred,
    #[serde(rename = "דלג")]
    Skipped,
    #[serde(rename = "הושלם")]
    Completed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "ממתין לאישור",
            ActionStatus::Approved => "אושר",
            ActionStatus::Deferred => "נדחה",
            ActionStatus::Skipped => "דלג",
            ActionStatus::Completed => "הושלם",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ActionStatus::Pending)
    }
}

impl ProcessAction {
    /// The prospect this action targets, derived from whichever reference
    /// field is set.
    pub fn target(&self) -> Option<crate::ProspectRef> {
        if let Some(client_id) = &self.client_id {
            Some(crate::ProspectRef::client(client_id))
        } else {
            self.lead_id.as_deref().map(crate::ProspectRef::lead)
        }
    }
}
