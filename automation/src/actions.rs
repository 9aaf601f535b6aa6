use std::sync::Arc;

use entity::{ActionStatus, ActionType, ProcessAction, Prospect, Stage, StageCategory};
use platform_store::EntityStore;
use serde_json::{Value, json};

use crate::error::AutomationResult;

/// Category → action type. Pure and total; `deal-closure` maps to nothing
/// because reaching it ends the process.
pub fn action_type_for(category: StageCategory) -> Option<ActionType> {
    match category {
        StageCategory::ScheduleMeeting => Some(ActionType::StageApproval),
        StageCategory::PhoneCall => Some(ActionType::PhoneCallCompletion),
        StageCategory::Documents => Some(ActionType::DocumentsRequestApproval),
        StageCategory::Meeting => Some(ActionType::MeetingFollowup),
        StageCategory::PriceQuote => Some(ActionType::QuotePreparationApproval),
        StageCategory::DealClosure => None,
        StageCategory::NewLead | StageCategory::SendMessage => Some(ActionType::StageApproval),
    }
}

pub fn action_title(stage: &Stage, prospect: &Prospect) -> String {
    match stage.category {
        StageCategory::ScheduleMeeting => {
            format!("need to schedule a meeting with {}", prospect.display_name())
        }
        _ => format!("complete stage: {}", stage.name),
    }
}

/// Secondary tasks opened by "sent" responses, after the primary action has
/// already been resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowupKind {
    DocumentsReceipt,
    QuoteAcceptance,
}

impl FollowupKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            FollowupKind::DocumentsReceipt => ActionType::DocumentsVerifyReceipt,
            FollowupKind::QuoteAcceptance => ActionType::QuoteAcceptanceApproval,
        }
    }

    fn title(&self, prospect: &Prospect) -> String {
        match self {
            FollowupKind::DocumentsReceipt => {
                format!("verify documents were received from {}", prospect.display_name())
            }
            FollowupKind::QuoteAcceptance => {
                format!("follow up on the quote sent to {}", prospect.display_name())
            }
        }
    }
}

/// Builds and persists ProcessAction rows for resolved stages.
#[derive(Clone)]
pub struct ActionFactory {
    store: Arc<dyn EntityStore>,
}

impl ActionFactory {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Open the pending action for a stage the entity just entered. Returns
    /// `None` for terminal stages, which get no action.
    pub async fn create_action(
        &self,
        prospect: &Prospect,
        stage: &Stage,
    ) -> AutomationResult<Option<ProcessAction>> {
        let Some(action_type) = action_type_for(stage.category) else {
            return Ok(None);
        };
        let payload = self.action_payload(
            prospect,
            stage,
            action_type,
            action_title(stage, prospect),
        );
        let record = self.store.create("ProcessAction", payload).await?;
        Ok(Some(serde_json::from_value(record)?))
    }

    /// Open a follow-up task next to (not instead of) the stage's primary
    /// action.
    pub async fn create_followup(
        &self,
        prospect: &Prospect,
        stage: &Stage,
        kind: FollowupKind,
    ) -> AutomationResult<ProcessAction> {
        let payload =
            self.action_payload(prospect, stage, kind.action_type(), kind.title(prospect));
        let record = self.store.create("ProcessAction", payload).await?;
        Ok(serde_json::from_value(record)?)
    }

    fn action_payload(
        &self,
        prospect: &Prospect,
        stage: &Stage,
        action_type: ActionType,
        title: String,
    ) -> Value {
        let mut payload = json!({
            "account_id": prospect.account_id(),
            "process_stage_id": stage.id,
            "action_type": action_type,
            "title": title,
            "status": ActionStatus::Pending,
            "stage_name": stage.name,
            "stage_category": stage.category,
        });
        payload[prospect.kind().action_ref_field()] = json!(prospect.id());
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::Lead;

    #[test]
    fn mapping_is_deterministic_and_total() {
        use StageCategory::*;
        for category in [
            NewLead,
            ScheduleMeeting,
            Meeting,
            SendMessage,
            Documents,
            PriceQuote,
            PhoneCall,
            DealClosure,
        ] {
            assert_eq!(action_type_for(category), action_type_for(category));
        }
        assert_eq!(
            action_type_for(ScheduleMeeting),
            Some(ActionType::StageApproval)
        );
        assert_eq!(
            action_type_for(PhoneCall),
            Some(ActionType::PhoneCallCompletion)
        );
        assert_eq!(
            action_type_for(Documents),
            Some(ActionType::DocumentsRequestApproval)
        );
        assert_eq!(
            action_type_for(PriceQuote),
            Some(ActionType::QuotePreparationApproval)
        );
        assert_eq!(action_type_for(DealClosure), None);
        assert_eq!(action_type_for(SendMessage), Some(ActionType::StageApproval));
    }

    #[test]
    fn schedule_meeting_title_names_the_prospect() {
        let stage = Stage::new("קביעת פגישה", StageCategory::ScheduleMeeting);
        let prospect = Prospect::Lead(Lead {
            full_name: Some("דנה לוי".into()),
            account_id: "acc".into(),
            ..Lead::default()
        });
        assert_eq!(
            action_title(&stage, &prospect),
            "need to schedule a meeting with דנה לוי"
        );

        let other = Stage::new("מסמכים", StageCategory::Documents);
        assert_eq!(action_title(&other, &prospect), "complete stage: מסמכים");
    }
}
