//! Typed serde views over the document-store collections the automation
//! core reads and writes: `Process`, `Lead`, `Client`, `ProcessAction`,
//! `StageEvent`.

pub mod client;
pub mod lead;
pub mod process;
pub mod process_action;
pub mod prospect;
pub mod response;
pub mod stage_event;

pub use client::Client;
pub use lead::Lead;
pub use process::{DocumentsConfig, Process, RequestConfig, Stage, StageCategory, StageVisibility};
pub use process_action::{ActionStatus, ActionType, ProcessAction};
pub use prospect::{Prospect, ProspectKind, ProspectRef};
pub use response::ResponseOutcome;
pub use stage_event::StageEvent;

/// Prospect status strings as the production store records them.
pub mod status {
    /// Terminal: the lead/client is no longer pursued.
    pub const IRRELEVANT: &str = "לא רלוונטי";
    /// Assigned to a Client created by lead conversion.
    pub const CLIENT: &str = "לקוח";
}

pub(crate) fn default_true() -> bool {
    true
}
