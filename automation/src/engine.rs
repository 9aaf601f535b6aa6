use std::sync::Arc;

use chrono::{DateTime, Utc};
use entity::{
    ActionStatus, Client, Lead, Process, ProcessAction, Prospect, ProspectKind, ProspectRef,
    ResponseOutcome, Stage, response::responses, status,
};
use platform_store::{EntityStore, StoreError};
use serde_json::{Value, from_value, json};
use tracing::{debug, info, warn};

use crate::actions::{ActionFactory, FollowupKind};
use crate::error::{AutomationError, AutomationResult};
use crate::resolver::{self, StageResolver};
use crate::rooms::RoomProvisioner;
use crate::settings::AutomationSettings;

/// Everything the undo controller captures at selection time. The commit
/// runs against this snapshot, not against re-read server state, so it
/// reflects what the operator saw when they decided.
#[derive(Clone, Debug)]
pub struct ResponseCommit {
    pub account_id: String,
    pub action_id: String,
    pub target: ProspectRef,
    pub response: String,
    pub update_text: Option<String>,
    /// Stage configuration at selection time; when absent the engine
    /// recovers it from the action's `process_stage_id`.
    pub stage: Option<Stage>,
}

/// What a committed response did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Advanced { to_stage: u32 },
    ProcessComplete,
    MarkedIrrelevant,
    Converted { client_id: String },
    Deferred,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced { to_stage: u32 },
    ProcessComplete,
}

impl From<AdvanceOutcome> for CommitOutcome {
    fn from(outcome: AdvanceOutcome) -> Self {
        match outcome {
            AdvanceOutcome::Advanced { to_stage } => CommitOutcome::Advanced { to_stage },
            AdvanceOutcome::ProcessComplete => CommitOutcome::ProcessComplete,
        }
    }
}

/// The state machine driving leads and clients through their process.
///
/// Operations are at-least-once: there is no idempotency key, so a retried
/// commit advances again and opens a second action. Single-operator usage
/// makes that acceptable; see DESIGN.md.
pub struct AutomationEngine {
    store: Arc<dyn EntityStore>,
    resolver: StageResolver,
    actions: ActionFactory,
    rooms: RoomProvisioner,
    settings: AutomationSettings,
}

impl AutomationEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self::with_settings(store, AutomationSettings::default())
    }

    pub fn with_settings(store: Arc<dyn EntityStore>, settings: AutomationSettings) -> Self {
        Self {
            resolver: StageResolver::new(store.clone()),
            actions: ActionFactory::new(store.clone()),
            rooms: RoomProvisioner::new(store.clone()),
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &AutomationSettings {
        &self.settings
    }

    /// Intake trigger. Never fails the caller: lead creation must succeed
    /// even when automation setup cannot, so errors are logged and dropped.
    pub async fn on_lead_created(&self, lead: &Lead) {
        if let Err(err) = self.start_lead_automation(lead).await {
            warn!(
                lead_id = %lead.id,
                code = err.code(),
                error = %err,
                "lead automation setup failed; lead creation proceeds"
            );
        }
    }

    /// Bulk intake (e.g. an imported lead list) with the same
    /// log-and-continue policy per lead.
    pub async fn on_leads_created(&self, leads: &[Lead]) {
        for lead in leads {
            self.on_lead_created(lead).await;
        }
    }

    async fn start_lead_automation(&self, lead: &Lead) -> AutomationResult<()> {
        let Some(process_type) = lead.process_type.as_deref() else {
            debug!(lead_id = %lead.id, "lead has no process_type; skipping automation");
            return Ok(());
        };
        let process = self
            .resolver
            .find_process(&lead.account_id, process_type)
            .await?;
        if process.stages.len() < 2 {
            return Err(AutomationError::ProcessTooShort {
                name: process.name,
                stages: process.stages.len(),
            });
        }
        // Stage 1 is the new-lead placeholder and needs no human task; the
        // first action belongs to the stage after it. The stage pointer
        // moves with the action so the two stay in sync for every advance
        // that follows.
        let stage = &process.stages[1];
        let prospect = Prospect::Lead(lead.clone());
        if self.actions.create_action(&prospect, stage).await?.is_some() {
            let now = Utc::now();
            self.store
                .update(
                    ProspectKind::Lead.collection(),
                    &lead.id,
                    json!({ "current_stage": 2, "last_stage_change": now }),
                )
                .await?;
            self.append_stage_event(&prospect, 2, now).await?;
            info!(lead_id = %lead.id, stage = %stage.name, "opened first process action");
        }
        Ok(())
    }

    /// Commit a selected response. The action's status update is persisted
    /// before any side effect runs, so the audit trail records the response
    /// even when a later step fails; nothing is rolled back.
    pub async fn commit_response(&self, commit: &ResponseCommit) -> AutomationResult<CommitOutcome> {
        if commit.response.trim().is_empty() {
            return Err(AutomationError::MissingResponse);
        }
        let outcome_class = ResponseOutcome::classify(&commit.response);
        let action = self.load_action(commit).await?;

        let mut patch = json!({
            "status": resolved_status(outcome_class),
            "user_response": commit.response,
        });
        if let Some(text) = &commit.update_text {
            patch["update_text"] = json!(text);
        }
        self.store
            .update("ProcessAction", &commit.action_id, patch)
            .await?;

        let prospect = self.load_prospect(&commit.account_id, &commit.target).await?;
        let outcome = match outcome_class {
            ResponseOutcome::MarkIrrelevant => {
                self.mark_irrelevant(&prospect).await?;
                CommitOutcome::MarkedIrrelevant
            }
            ResponseOutcome::ConvertToClient => {
                let client = self.convert_lead(&prospect).await?;
                CommitOutcome::Converted {
                    client_id: client.id,
                }
            }
            ResponseOutcome::Postpone => {
                info!(entity = prospect.id(), "response deferred; stage unchanged");
                CommitOutcome::Deferred
            }
            ResponseOutcome::Affirm | ResponseOutcome::Skip => {
                self.advance(&prospect).await?.into()
            }
        };

        self.run_followup_triggers(commit, &action, &prospect).await?;
        Ok(outcome)
    }

    /// Move the entity one stage forward and open the next action, unless
    /// the reached stage is terminal or the process is already complete.
    pub async fn advance(&self, prospect: &Prospect) -> AutomationResult<AdvanceOutcome> {
        let process_type = prospect
            .process_type()
            .ok_or(AutomationError::MissingProcessType)?;
        let process = self
            .resolver
            .find_process(prospect.account_id(), process_type)
            .await?;

        let next_index = prospect.current_stage() as usize;
        if next_index >= process.stages.len() {
            info!(
                entity = prospect.id(),
                current_stage = prospect.current_stage(),
                "process already complete; nothing to advance"
            );
            return Ok(AdvanceOutcome::ProcessComplete);
        }

        let reached = (next_index + 1) as u32;
        let now = Utc::now();
        self.store
            .update(
                prospect.kind().collection(),
                prospect.id(),
                json!({ "current_stage": reached, "last_stage_change": now }),
            )
            .await?;
        self.append_stage_event(prospect, reached, now).await?;

        let stage = &process.stages[next_index];
        if !stage.category.is_terminal() {
            self.actions.create_action(prospect, stage).await?;
        }
        info!(
            entity = prospect.id(),
            to_stage = reached,
            stage = %stage.name,
            terminal = stage.category.is_terminal(),
            "advanced stage"
        );
        Ok(AdvanceOutcome::Advanced { to_stage: reached })
    }

    /// Terminal: stop pursuing the entity. Stage position is left as-is for
    /// the record.
    pub async fn mark_irrelevant(&self, prospect: &Prospect) -> AutomationResult<()> {
        self.store
            .update(
                prospect.kind().collection(),
                prospect.id(),
                json!({ "status": status::IRRELEVANT, "is_active": false }),
            )
            .await?;
        info!(entity = prospect.id(), "marked irrelevant");
        Ok(())
    }

    /// Lead → Client conversion: copy the core fields onto a fresh Client
    /// starting at stage 1, provision its digital room, drop the lead.
    pub async fn convert_lead(&self, prospect: &Prospect) -> AutomationResult<Client> {
        let Prospect::Lead(lead) = prospect else {
            return Err(AutomationError::ConversionTargetNotLead);
        };
        let (first_name, last_name) = lead.split_name();
        let record = self
            .store
            .create(
                ProspectKind::Client.collection(),
                json!({
                    "account_id": lead.account_id,
                    "first_name": first_name,
                    "last_name": last_name,
                    "email": lead.email,
                    "phone": lead.phone,
                    "referral_source": lead.source,
                    "notes": lead.notes,
                    "process_type": lead.process_type,
                    "current_stage": 1,
                    "is_active": true,
                    "status": status::CLIENT,
                    "original_lead_id": lead.id,
                }),
            )
            .await?;
        let mut client: Client = from_value(record)?;

        let credentials = self
            .rooms
            .provision(ProspectKind::Client.collection(), &client.id)
            .await?;
        client.room_id = Some(credentials.room_id);
        client.room_password = Some(credentials.room_password);
        client.room_share_token = Some(credentials.room_share_token);

        self.store
            .delete(ProspectKind::Lead.collection(), &lead.id)
            .await?;
        info!(lead_id = %lead.id, client_id = %client.id, "converted lead to client");
        Ok(client)
    }

    /// Create the account's default process if it does not exist yet.
    /// Called once from onboarding; safe to repeat.
    pub async fn ensure_default_process(&self, account_id: &str) -> AutomationResult<Process> {
        let name = self.settings.default_process_name.clone();
        match self.resolver.find_process(account_id, &name).await {
            Ok(process) => Ok(process),
            Err(AutomationError::ProcessNotFound { .. }) => {
                let process = Process::default_for_account(account_id, &name);
                let record = self
                    .store
                    .create("Process", serde_json::to_value(&process)?)
                    .await?;
                info!(account_id, process = %name, "created default process");
                Ok(from_value(record)?)
            }
            Err(err) => Err(err),
        }
    }

    async fn load_action(&self, commit: &ResponseCommit) -> AutomationResult<ProcessAction> {
        let record = match self.store.get("ProcessAction", &commit.action_id).await {
            Ok(record) => record,
            Err(err) if err.is_not_found() => {
                return Err(AutomationError::ActionNotFound {
                    action_id: commit.action_id.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let action: ProcessAction = from_value(record)?;
        if action.account_id != commit.account_id {
            return Err(AutomationError::ActionNotFound {
                action_id: commit.action_id.clone(),
            });
        }
        Ok(action)
    }

    async fn load_prospect(
        &self,
        account_id: &str,
        target: &ProspectRef,
    ) -> AutomationResult<Prospect> {
        let collection = target.kind.collection();
        let record = match self.store.get(collection, &target.id).await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => {
                return Err(AutomationError::EntityNotFound {
                    collection: collection.to_string(),
                    id: target.id.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        if record.get("account_id").and_then(Value::as_str) != Some(account_id) {
            return Err(AutomationError::EntityNotFound {
                collection: collection.to_string(),
                id: target.id.clone(),
            });
        }
        Ok(Prospect::from_record(target.kind, record)?)
    }

    async fn append_stage_event(
        &self,
        prospect: &Prospect,
        reached: u32,
        at: DateTime<Utc>,
    ) -> AutomationResult<()> {
        let mut payload = json!({
            "account_id": prospect.account_id(),
            "from_stage": prospect.current_stage(),
            "to_stage": reached,
            "changed_at": at,
        });
        payload[prospect.kind().action_ref_field()] = json!(prospect.id());
        self.store.create("StageEvent", payload).await?;
        Ok(())
    }

    /// "Sent" responses open follow-up tasks on top of whatever the primary
    /// outcome did. The documents variant is gated by stage configuration;
    /// the quote variant always fires.
    async fn run_followup_triggers(
        &self,
        commit: &ResponseCommit,
        action: &ProcessAction,
        prospect: &Prospect,
    ) -> AutomationResult<()> {
        let kind = match commit.response.as_str() {
            responses::DOCUMENTS_REQUEST_SENT => FollowupKind::DocumentsReceipt,
            responses::QUOTE_SENT => FollowupKind::QuoteAcceptance,
            _ => return Ok(()),
        };

        let stage = match &commit.stage {
            Some(stage) => Some(stage.clone()),
            None => self.recover_stage(commit, action).await?,
        };
        let Some(stage) = stage else {
            warn!(
                action_id = %commit.action_id,
                "cannot resolve stage configuration; skipping follow-up"
            );
            return Ok(());
        };

        if kind == FollowupKind::DocumentsReceipt && !stage.wants_documents_followup() {
            debug!(stage = %stage.name, "stage does not ask for a receipt follow-up");
            return Ok(());
        }
        self.actions.create_followup(prospect, &stage, kind).await?;
        info!(entity = prospect.id(), followup = ?kind, "opened follow-up action");
        Ok(())
    }

    async fn recover_stage(
        &self,
        commit: &ResponseCommit,
        action: &ProcessAction,
    ) -> AutomationResult<Option<Stage>> {
        let Some(stage_id) = action.process_stage_id.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .resolver
            .find_stage_by_id(&commit.account_id, stage_id)
            .await?
            .map(|(_, stage)| stage))
    }

    /// Stage the entity currently displays, resolved against its process.
    pub async fn display_stage(&self, prospect: &Prospect) -> AutomationResult<Option<Stage>> {
        let Some(process_type) = prospect.process_type() else {
            return Ok(None);
        };
        let process = self
            .resolver
            .find_process(prospect.account_id(), process_type)
            .await?;
        Ok(resolver::current_stage(&process, prospect).cloned())
    }
}

/// Status recorded on the action for each outcome class. Approve and skip
/// stay distinguishable in reporting; closing outcomes complete the action.
fn resolved_status(outcome: ResponseOutcome) -> ActionStatus {
    match outcome {
        ResponseOutcome::Affirm => ActionStatus::Approved,
        ResponseOutcome::Skip => ActionStatus::Skipped,
        ResponseOutcome::Postpone => ActionStatus::Deferred,
        ResponseOutcome::MarkIrrelevant | ResponseOutcome::ConvertToClient => {
            ActionStatus::Completed
        }
    }
}
