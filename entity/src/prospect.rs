use serde_json::Value;

use crate::{Client, Lead};

/// Which of the two prospect collections a record lives in.
///
/// The original system told leads and clients apart by sniffing for a
/// `first_name` field; the tag makes the dispatch explicit everywhere a
/// `client_id`/`lead_id` discriminant is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProspectKind {
    Lead,
    Client,
}

impl ProspectKind {
    pub fn collection(&self) -> &'static str {
        match self {
            ProspectKind::Lead => "Lead",
            ProspectKind::Client => "Client",
        }
    }

    /// The ProcessAction field that references this kind of prospect.
    pub fn action_ref_field(&self) -> &'static str {
        match self {
            ProspectKind::Lead => "lead_id",
            ProspectKind::Client => "client_id",
        }
    }
}

/// A `(kind, id)` pointer to a prospect record, small enough to capture at
/// response-selection time and carry through a deferred commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProspectRef {
    pub kind: ProspectKind,
    pub id: String,
}

impl ProspectRef {
    pub fn lead(id: impl Into<String>) -> Self {
        Self {
            kind: ProspectKind::Lead,
            id: id.into(),
        }
    }

    pub fn client(id: impl Into<String>) -> Self {
        Self {
            kind: ProspectKind::Client,
            id: id.into(),
        }
    }
}

/// Tagged union over the two entity shapes automation drives.
#[derive(Clone, Debug, PartialEq)]
pub enum Prospect {
    Lead(Lead),
    Client(Client),
}

impl Prospect {
    pub fn from_record(kind: ProspectKind, record: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ProspectKind::Lead => Prospect::Lead(serde_json::from_value(record)?),
            ProspectKind::Client => Prospect::Client(serde_json::from_value(record)?),
        })
    }

    pub fn kind(&self) -> ProspectKind {
        match self {
            Prospect::Lead(_) => ProspectKind::Lead,
            Prospect::Client(_) => ProspectKind::Client,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Prospect::Lead(lead) => &lead.id,
            Prospect::Client(client) => &client.id,
        }
    }

    pub fn account_id(&self) -> &str {
        match self {
            Prospect::Lead(lead) => &lead.account_id,
            Prospect::Client(client) => &client.account_id,
        }
    }

    pub fn to_ref(&self) -> ProspectRef {
        ProspectRef {
            kind: self.kind(),
            id: self.id().to_string(),
        }
    }

    pub fn process_type(&self) -> Option<&str> {
        match self {
            Prospect::Lead(lead) => lead.process_type.as_deref(),
            Prospect::Client(client) => client.process_type.as_deref(),
        }
    }

    /// 1-based stage position, defaulting to 1 for records that never set it.
    pub fn current_stage(&self) -> u32 {
        let raw = match self {
            Prospect::Lead(lead) => lead.current_stage,
            Prospect::Client(client) => client.current_stage,
        };
        raw.unwrap_or(1).max(1)
    }

    pub fn display_name(&self) -> String {
        match self {
            Prospect::Lead(lead) => lead.full_name.clone().unwrap_or_default(),
            Prospect::Client(client) => client.display_name(),
        }
    }
}
