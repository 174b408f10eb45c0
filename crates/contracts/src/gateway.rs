//! Wire contract between the engine and the external decision gateway.
//!
//! Requests carry role-tagged messages plus a schema id naming the JSON shape
//! the caller expects back. Responses are parsed leniently: anything that
//! fails shape validation is treated as an absent decision by the engine,
//! never as a fault.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleMessage {
    pub role: Role,
    pub content: String,
}

impl RoleMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Which response shape the engine expects for a given request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SchemaId {
    ActionDecision,
    DailyPlan,
    Reflection,
    ImportanceRating,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayRequest {
    pub messages: Vec<RoleMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub schema: Option<SchemaId>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Action tags on the wire. Unrecognized tags deserialize as `Stay` so a
/// creative gateway cannot wedge an agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    Move,
    Interact,
    #[serde(other)]
    Stay,
}

/// A decision about what an agent does this tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionDecisionWire {
    #[serde(default)]
    pub thought: String,
    pub action: ActionTag,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub utterance: Option<String>,
    #[serde(default)]
    pub memories: Vec<MemoryProposalWire>,
}

/// A memory the gateway proposes to store. `kind` and `importance` are
/// loosely typed on the wire; the engine coerces them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryProposalWire {
    pub text: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub importance: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeBlockWire {
    pub start: String,
    pub end: String,
    pub location: String,
    #[serde(default)]
    pub activity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPlanWire {
    #[serde(default)]
    pub date: String,
    pub blocks: Vec<TimeBlockWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReflectionWire {
    pub insights: Vec<String>,
    #[serde(default)]
    pub summary_update: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImportanceRatingWire {
    pub importance: i64,
}
