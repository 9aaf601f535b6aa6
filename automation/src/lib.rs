//! Process automation core for Brizzi: resolves stages from per-account
//! process definitions, opens ProcessAction tasks as entities move, commits
//! operator responses (with an undo window) and applies their side effects.
//!
//! Persistence is the abstract [`platform_store::EntityStore`]; everything
//! here is plain in-process library code.

pub mod actions;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod response;
pub mod rooms;
pub mod settings;

pub use actions::{ActionFactory, FollowupKind, action_title, action_type_for};
pub use engine::{AdvanceOutcome, AutomationEngine, CommitOutcome, ResponseCommit};
pub use error::{AutomationError, AutomationResult, ErrorKind};
pub use resolver::{StageResolver, current_stage, next_stage};
pub use response::{
    CommitResolution, PendingCommit, ResponseController, StagedResponse, effective_response,
};
pub use rooms::{RoomCredentials, RoomProvisioner, generate_credentials};
pub use settings::AutomationSettings;
