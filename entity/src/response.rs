//! Response vocabulary and outcome classification.
//!
//! Responses are free-form strings chosen by the operator; a closed subset
//! carries special semantics. Anything unrecognized is an affirmative and
//! advances the stage.

/// The response strings the engine gives special treatment.
pub mod responses {
    /// Affirmative used when a meeting got scheduled.
    pub const SCHEDULED: &str = "נקבע";
    /// Terminal: the lead is not worth pursuing.
    pub const LEAD_IRRELEVANT: &str = "ליד לא רלוונטי";
    /// Terminal: the quote went nowhere.
    pub const QUOTE_IRRELEVANT: &str = "הצעה לא רלוונטית";
    /// Converts the lead into a client.
    pub const LEAD_CONVERTED: &str = "הליד הפך ללקוח";
    /// Advances without approving.
    pub const SKIP: &str = "דלג";
    /// Records a deferral; the stage stays put until a human reschedules.
    pub const MEETING_POSTPONED: &str = "הפגישה נדחתה למועד אחר";
    /// Affirmative that may also open a receipt-verification follow-up.
    pub const DOCUMENTS_REQUEST_SENT: &str = "בקשת חומרים נשלחה";
    /// Affirmative that always opens a quote-acceptance follow-up.
    pub const QUOTE_SENT: &str = "הצעה נשלחה";
}

/// What a committed response does to the entity's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Approve the action and advance one stage.
    Affirm,
    /// Mark the entity irrelevant; terminal, no advancement.
    MarkIrrelevant,
    /// Convert the lead to a client; terminal for the lead.
    ConvertToClient,
    /// Record a skip and advance anyway.
    Skip,
    /// Record a deferral and stay on the current stage.
    Postpone,
}

impl ResponseOutcome {
    pub fn classify(response: &str) -> Self {
        match response {
            responses::LEAD_IRRELEVANT | responses::QUOTE_IRRELEVANT => {
                ResponseOutcome::MarkIrrelevant
            }
            responses::LEAD_CONVERTED => ResponseOutcome::ConvertToClient,
            responses::SKIP => ResponseOutcome::Skip,
            responses::MEETING_POSTPONED => ResponseOutcome::Postpone,
            _ => ResponseOutcome::Affirm,
        }
    }

    /// Whether the outcome moves `current_stage` forward.
    pub fn advances(&self) -> bool {
        matches!(self, ResponseOutcome::Affirm | ResponseOutcome::Skip)
    }
}

/// Responses that destroy or transform the entity; the undo controller
/// demands an explicit confirmation before it even starts the countdown.
pub fn is_critical(response: &str) -> bool {
    matches!(
        response,
        responses::LEAD_IRRELEVANT | responses::QUOTE_IRRELEVANT | responses::LEAD_CONVERTED
    )
}
