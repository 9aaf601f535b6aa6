//! Deferred-commit layer: a chosen response is staged, a short countdown
//! gives the operator a chance to undo, then the commit goes through the
//! engine. Cancellation only ever applies before the commit starts; an
//! in-flight store write is never interrupted.

use std::sync::Arc;
use std::time::Duration;

use entity::response::is_critical;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::engine::{AutomationEngine, CommitOutcome, ResponseCommit};
use crate::error::{AutomationError, AutomationResult};
use crate::settings::AutomationSettings;

/// `secondary ?? primary`: a secondary disambiguation (e.g. "stopped" vs.
/// "not relevant" after "not done") wins over the primary choice.
pub fn effective_response(primary: &str, secondary: Option<&str>) -> String {
    secondary
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(primary)
        .to_string()
}

/// How a pending commit ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitResolution {
    Committed(CommitOutcome),
    Cancelled,
}

/// A validated selection, ready for its countdown.
#[derive(Clone, Debug)]
pub struct StagedResponse {
    commit: ResponseCommit,
}

impl StagedResponse {
    pub fn commit(&self) -> &ResponseCommit {
        &self.commit
    }
}

#[derive(Debug)]
enum Command {
    Undo,
    CommitNow,
}

/// Entry point the UI drives: select, then begin, then either wait out the
/// countdown or undo / commit-now.
pub struct ResponseController {
    engine: Arc<AutomationEngine>,
    undo_window_secs: u64,
}

impl ResponseController {
    pub fn new(engine: Arc<AutomationEngine>, settings: &AutomationSettings) -> Self {
        Self {
            engine,
            undo_window_secs: settings.undo_window_secs,
        }
    }

    /// Validate a selection. Critical responses (irrelevant, convert) must
    /// arrive pre-confirmed by an explicit yes/no; everything else passes
    /// straight through.
    pub fn select(
        &self,
        commit: ResponseCommit,
        confirmed: bool,
    ) -> AutomationResult<StagedResponse> {
        if commit.response.trim().is_empty() {
            return Err(AutomationError::MissingResponse);
        }
        if is_critical(&commit.response) && !confirmed {
            return Err(AutomationError::ConfirmationRequired {
                response: commit.response,
            });
        }
        Ok(StagedResponse { commit })
    }

    /// Start the countdown. The returned handle is the only way to reach
    /// the pending commit; dropping it leaves the countdown running to
    /// completion.
    pub fn begin(&self, staged: StagedResponse) -> PendingCommit {
        let engine = self.engine.clone();
        let window = self.undo_window_secs;
        let commit = staged.commit;
        let (tick_tx, tick_rx) = watch::channel(window);
        let (command_tx, mut command_rx) = mpsc::channel::<Command>(4);

        let handle = tokio::spawn(async move {
            if window == 0 {
                let outcome = engine.commit_response(&commit).await?;
                return Ok(CommitResolution::Committed(outcome));
            }
            let mut remaining = window;
            let mut commands_open = true;
            loop {
                tokio::select! {
                    _ = sleep(Duration::from_secs(1)) => {
                        remaining -= 1;
                        let _ = tick_tx.send(remaining);
                        if remaining == 0 {
                            let outcome = engine.commit_response(&commit).await?;
                            return Ok(CommitResolution::Committed(outcome));
                        }
                    }
                    command = command_rx.recv(), if commands_open => {
                        match command {
                            Some(Command::Undo) => {
                                info!(action_id = %commit.action_id, "staged response undone");
                                return Ok(CommitResolution::Cancelled);
                            }
                            Some(Command::CommitNow) => {
                                let outcome = engine.commit_response(&commit).await?;
                                return Ok(CommitResolution::Committed(outcome));
                            }
                            // UI dropped its handle: the countdown keeps
                            // running and auto-commits.
                            None => commands_open = false,
                        }
                    }
                }
            }
        });

        PendingCommit {
            remaining: tick_rx,
            commands: command_tx,
            handle,
        }
    }
}

/// A countdown in flight.
pub struct PendingCommit {
    remaining: watch::Receiver<u64>,
    commands: mpsc::Sender<Command>,
    handle: JoinHandle<AutomationResult<CommitResolution>>,
}

impl PendingCommit {
    /// Seconds left before auto-commit, as of the latest tick.
    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// A receiver ticking once per second down to zero, for display.
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.remaining.clone()
    }

    /// Cancel if the commit has not started yet. Returns `Committed` when
    /// the request arrived too late.
    pub async fn undo(self) -> AutomationResult<CommitResolution> {
        let _ = self.commands.send(Command::Undo).await;
        self.join().await
    }

    /// Skip the rest of the countdown and commit immediately.
    pub async fn commit_now(self) -> AutomationResult<CommitResolution> {
        let _ = self.commands.send(Command::CommitNow).await;
        self.join().await
    }

    /// Wait for the countdown to resolve on its own.
    pub async fn wait(self) -> AutomationResult<CommitResolution> {
        self.join().await
    }

    async fn join(self) -> AutomationResult<CommitResolution> {
        self.handle
            .await
            .map_err(|err| AutomationError::Internal(err.to_string()))?
    }
}
