use std::sync::Arc;

use entity::{Process, Prospect, Stage};
use platform_store::{EntityStore, Query};
use serde_json::from_value;

use crate::error::{AutomationError, AutomationResult};

/// The stage an entity currently sits on: `stages[current_stage - 1]`.
/// `None` means the entity has completed (or outrun) the defined stages —
/// never an index panic.
pub fn current_stage<'a>(process: &'a Process, prospect: &Prospect) -> Option<&'a Stage> {
    let index = (prospect.current_stage() - 1) as usize;
    process.stages.get(index)
}

/// The stage an advance would move the entity onto: `stages[current_stage]`.
/// `None` when the entity already sits on the last defined stage.
pub fn next_stage<'a>(process: &'a Process, prospect: &Prospect) -> Option<&'a Stage> {
    process.stages.get(prospect.current_stage() as usize)
}

/// Process/stage lookup over the entity store, always scoped to one account
/// and to active processes.
#[derive(Clone)]
pub struct StageResolver {
    store: Arc<dyn EntityStore>,
}

impl StageResolver {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Resolve the active process an entity's `process_type` names. Zero
    /// matches is a configuration error: the process was deleted or
    /// deactivated after entities started referencing it.
    pub async fn find_process(
        &self,
        account_id: &str,
        process_type: &str,
    ) -> AutomationResult<Process> {
        let records = self
            .store
            .filter(
                "Process",
                Query::new()
                    .eq("account_id", account_id)
                    .eq("name", process_type)
                    .eq("is_active", true)
                    .limit(1),
            )
            .await?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| AutomationError::ProcessNotFound {
                account_id: account_id.to_string(),
                process_type: process_type.to_string(),
            })?;
        Ok(from_value(record)?)
    }

    /// Scan every active process of the account for a stage id. Recovers
    /// stage configuration (e.g. `documents_config`) from a ProcessAction's
    /// `process_stage_id`. Linear in processes × stages, which is fine at
    /// the tens-by-tens scale accounts actually have.
    pub async fn find_stage_by_id(
        &self,
        account_id: &str,
        stage_id: &str,
    ) -> AutomationResult<Option<(Process, Stage)>> {
        let records = self
            .store
            .filter(
                "Process",
                Query::new()
                    .eq("account_id", account_id)
                    .eq("is_active", true),
            )
            .await?;
        for record in records {
            let process: Process = from_value(record)?;
            if let Some(stage) = process.stage_by_id(stage_id).cloned() {
                return Ok(Some((process, stage)));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::{Lead, Process, Stage, StageCategory};

    fn process_with(stage_count: usize) -> Process {
        Process {
            id: "p1".into(),
            account_id: "acc".into(),
            name: "תהליך מכירה".into(),
            is_active: true,
            color: None,
            stages: (0..stage_count)
                .map(|n| Stage::new(format!("stage-{n}"), StageCategory::SendMessage))
                .collect(),
        }
    }

    fn lead_at(stage: Option<u32>) -> Prospect {
        Prospect::Lead(Lead {
            id: "l1".into(),
            account_id: "acc".into(),
            current_stage: stage,
            ..Lead::default()
        })
    }

    #[test]
    fn unset_current_stage_defaults_to_first() {
        let process = process_with(3);
        let stage = current_stage(&process, &lead_at(None)).unwrap();
        assert_eq!(stage.name, "stage-0");
    }

    #[test]
    fn out_of_range_resolves_to_none_not_panic() {
        let process = process_with(3);
        assert!(current_stage(&process, &lead_at(Some(4))).is_none());
        assert!(next_stage(&process, &lead_at(Some(3))).is_none());
    }

    #[test]
    fn next_stage_is_zero_based_current() {
        let process = process_with(3);
        let stage = next_stage(&process, &lead_at(Some(1))).unwrap();
        assert_eq!(stage.name, "stage-1");
    }
}
