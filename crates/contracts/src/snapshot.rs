//! Read-only introspection views. All fields are owned clones of engine
//! state; holding a snapshot never aliases live data.

use serde::{Deserialize, Serialize};

use crate::time::SimTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMemoryView {
    pub id: u64,
    pub time: SimTime,
    pub text: String,
    pub kind: String,
    pub importance: i64,
    pub relevance: f64,
    pub recency: f64,
    pub importance_score: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    pub state: String,
    pub x: f32,
    pub y: f32,
    pub destination: Option<(f32, f32)>,
    pub energy: i64,
    /// Resolved place name, or `None` while in the street.
    pub place: Option<String>,
    pub current_activity: Option<String>,
    pub self_summary: Option<String>,
    pub plan_text: Option<String>,
    pub last_thought: Option<String>,
    pub last_retrieved: Vec<ScoredMemoryView>,
    pub last_transcript: Option<String>,
    pub reflection_accumulator: i64,
    pub memory_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageView {
    pub speaker: String,
    pub text: String,
    pub time: SimTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventView {
    pub time: SimTime,
    /// Resolved place name, empty when the event is not tied to a place.
    pub place: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub sim_time: SimTime,
    pub events: Vec<EventView>,
    pub agents: Vec<AgentSnapshot>,
}
