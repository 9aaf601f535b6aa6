use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::default_true;

/// A named, ordered stage sequence owned by an account. Stage order is
/// significant: index + 1 is the 1-based `current_stage` an entity carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub id: String,
    pub account_id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Process {
    /// The onboarding default: a plain sales sequence every new account gets.
    pub fn default_for_account(account_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            account_id: account_id.into(),
            name: name.into(),
            is_active: true,
            color: Some("#4f6ef7".to_string()),
            stages: vec![
                Stage::new("ליד חדש", StageCategory::NewLead),
                Stage::new("קביעת פגישה", StageCategory::ScheduleMeeting),
                Stage::new("פגישה", StageCategory::Meeting),
                Stage::new("הצעת מחיר", StageCategory::PriceQuote),
                Stage::new("סגירת עסקה", StageCategory::DealClosure),
            ],
        }
    }

    pub fn stage_by_id(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }
}

/// One step of a [`Process`]. Identity is positional plus a generated id;
/// the id survives reordering and is what `ProcessAction.process_stage_id`
/// points at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: StageCategory,
    #[serde(default)]
    pub visibility: StageVisibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_config: Option<DocumentsConfig>,
}

impl Stage {
    pub fn new(name: impl Into<String>, category: StageCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            client_display_name: None,
            description: None,
            category,
            visibility: StageVisibility::default(),
            documents_config: None,
        }
    }

    /// Whether responding "request sent" on this stage should also open a
    /// receipt-verification follow-up.
    pub fn wants_documents_followup(&self) -> bool {
        self.documents_config
            .as_ref()
            .map(|config| config.request_config.create_followup_task)
            .unwrap_or(false)
    }
}

/// Closed stage taxonomy. The category decides which action type the factory
/// emits and which side effects apply; `deal-closure` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageCategory {
    NewLead,
    ScheduleMeeting,
    Meeting,
    SendMessage,
    Documents,
    PriceQuote,
    PhoneCall,
    DealClosure,
}

impl StageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageCategory::NewLead => "new-lead",
            StageCategory::ScheduleMeeting => "schedule-meeting",
            StageCategory::Meeting => "meeting",
            StageCategory::SendMessage => "send-message",
            StageCategory::Documents => "documents",
            StageCategory::PriceQuote => "price-quote",
            StageCategory::PhoneCall => "phone-call",
            StageCategory::DealClosure => "deal-closure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StageCategory::DealClosure)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageVisibility {
    #[default]
    Internal,
    External,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default)]
    pub request_config: RequestConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub create_followup_task: bool,
}
