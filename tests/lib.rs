//! Shared scaffolding for the end-to-end automation tests: an in-memory
//! store, an engine wired to it, and seed helpers for processes and leads.

use std::sync::Arc;

use automation::{AutomationEngine, ResponseCommit};
use entity::{Client, Lead, Process, ProcessAction, Stage, StageCategory};
use platform_store::{EntityStore, MemoryStore, Query};
use serde_json::{from_value, json};

pub const ACCOUNT: &str = "acc-1";

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<AutomationEngine>,
}

impl TestHarness {
    pub fn new() -> Self {
        platform_obs::init_for_tests();
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(AutomationEngine::new(store.clone()));
        Self { store, engine }
    }

    pub async fn seed_process(&self, name: &str, stages: Vec<Stage>) -> Process {
        self.seed_process_for(ACCOUNT, name, stages).await
    }

    pub async fn seed_process_for(
        &self,
        account_id: &str,
        name: &str,
        stages: Vec<Stage>,
    ) -> Process {
        let process = Process {
            id: String::new(),
            account_id: account_id.to_string(),
            name: name.to_string(),
            is_active: true,
            color: None,
            stages,
        };
        let record = self
            .store
            .create("Process", serde_json::to_value(&process).unwrap())
            .await
            .unwrap();
        from_value(record).unwrap()
    }

    /// Create a lead and fire the intake trigger, the way the application
    /// layer does after a form submission.
    pub async fn create_lead(&self, full_name: &str, process_type: Option<&str>) -> Lead {
        self.create_lead_for(ACCOUNT, full_name, process_type).await
    }

    pub async fn create_lead_for(
        &self,
        account_id: &str,
        full_name: &str,
        process_type: Option<&str>,
    ) -> Lead {
        let record = self
            .store
            .create(
                "Lead",
                json!({
                    "account_id": account_id,
                    "full_name": full_name,
                    "email": "lead@example.com",
                    "phone": "050-0000000",
                    "source": "facebook",
                    "process_type": process_type,
                    "is_active": true,
                }),
            )
            .await
            .unwrap();
        let lead: Lead = from_value(record).unwrap();
        self.engine.on_lead_created(&lead).await;
        lead
    }

    pub async fn reload_lead(&self, id: &str) -> Lead {
        from_value(self.store.get("Lead", id).await.unwrap()).unwrap()
    }

    pub async fn lead_actions(&self, lead_id: &str) -> Vec<ProcessAction> {
        self.actions(Query::new().eq("lead_id", lead_id)).await
    }

    pub async fn client_actions(&self, client_id: &str) -> Vec<ProcessAction> {
        self.actions(Query::new().eq("client_id", client_id)).await
    }

    async fn actions(&self, query: Query) -> Vec<ProcessAction> {
        self.store
            .filter("ProcessAction", query.order_by("created_date"))
            .await
            .unwrap()
            .into_iter()
            .map(|record| from_value(record).unwrap())
            .collect()
    }

    /// The single pending action a lead should have; panics when the
    /// invariant does not hold.
    pub async fn sole_pending_action(&self, lead_id: &str) -> ProcessAction {
        let pending: Vec<ProcessAction> = self
            .lead_actions(lead_id)
            .await
            .into_iter()
            .filter(|action| action.status.is_pending())
            .collect();
        assert_eq!(pending.len(), 1, "expected exactly one pending action");
        pending.into_iter().next().unwrap()
    }

    pub async fn clients(&self) -> Vec<Client> {
        self.store
            .filter("Client", Query::new().eq("account_id", ACCOUNT))
            .await
            .unwrap()
            .into_iter()
            .map(|record| from_value(record).unwrap())
            .collect()
    }

    pub async fn lead_stage_events(&self, lead_id: &str) -> Vec<serde_json::Value> {
        self.store
            .filter(
                "StageEvent",
                Query::new().eq("lead_id", lead_id).order_by("to_stage"),
            )
            .await
            .unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The default four-step sales sequence most tests run against.
pub fn sales_stages() -> Vec<Stage> {
    vec![
        Stage::new("ליד חדש", StageCategory::NewLead),
        Stage::new("קביעת פגישה", StageCategory::ScheduleMeeting),
        Stage::new("פגישה", StageCategory::Meeting),
        Stage::new("סגירת עסקה", StageCategory::DealClosure),
    ]
}

/// A commit tuple as the undo controller would capture it at selection time.
pub fn commit_for(action: &ProcessAction, response: &str) -> ResponseCommit {
    ResponseCommit {
        account_id: action.account_id.clone(),
        action_id: action.id.clone(),
        target: action.target().expect("action must reference a prospect"),
        response: response.to_string(),
        update_text: None,
        stage: None,
    }
}
