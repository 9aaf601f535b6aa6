use platform_store::StoreError;
use thiserror::Error;

/// Failure taxonomy of the automation core.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("no active process named {process_type:?} for account {account_id}")]
    ProcessNotFound {
        account_id: String,
        process_type: String,
    },
    #[error("process {name:?} defines {stages} stage(s); automation needs at least 2")]
    ProcessTooShort { name: String, stages: usize },
    #[error("stage {stage_id} not found in any active process")]
    StageNotFound { stage_id: String },
    #[error("entity carries no process_type; automation is disabled for it")]
    MissingProcessType,
    #[error("a response must be selected before commit")]
    MissingResponse,
    #[error("response {response:?} requires explicit confirmation")]
    ConfirmationRequired { response: String },
    #[error("process action {action_id} not found")]
    ActionNotFound { action_id: String },
    #[error("{collection} record {id} not found for this account")]
    EntityNotFound { collection: String, id: String },
    #[error("conversion applies to leads only")]
    ConversionTargetNotLead,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("record decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("deferred commit task failed: {0}")]
    Internal(String),
}

/// Coarse classification, mirroring how the UI layer reacts: configuration
/// errors get a toast and no retry, validation errors are caller bugs,
/// persistence errors may be retried by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Persistence,
    Internal,
}

impl AutomationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutomationError::ProcessNotFound { .. }
            | AutomationError::ProcessTooShort { .. }
            | AutomationError::StageNotFound { .. } => ErrorKind::Configuration,
            AutomationError::MissingProcessType
            | AutomationError::MissingResponse
            | AutomationError::ConfirmationRequired { .. }
            | AutomationError::ActionNotFound { .. }
            | AutomationError::EntityNotFound { .. }
            | AutomationError::ConversionTargetNotLead => ErrorKind::Validation,
            AutomationError::Store(_) | AutomationError::Decode(_) => ErrorKind::Persistence,
            AutomationError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AutomationError::ProcessNotFound { .. } => "PROCESS_NOT_FOUND",
            AutomationError::ProcessTooShort { .. } => "PROCESS_TOO_SHORT",
            AutomationError::StageNotFound { .. } => "STAGE_NOT_FOUND",
            AutomationError::MissingProcessType => "MISSING_PROCESS_TYPE",
            AutomationError::MissingResponse => "MISSING_RESPONSE",
            AutomationError::ConfirmationRequired { .. } => "CONFIRMATION_REQUIRED",
            AutomationError::ActionNotFound { .. } => "ACTION_NOT_FOUND",
            AutomationError::EntityNotFound { .. } => "ENTITY_NOT_FOUND",
            AutomationError::ConversionTargetNotLead => "NOT_A_LEAD",
            AutomationError::Store(_) => "STORE",
            AutomationError::Decode(_) => "DECODE",
            AutomationError::Internal(_) => "INTERNAL",
        }
    }
}

pub type AutomationResult<T> = Result<T, AutomationError>;
