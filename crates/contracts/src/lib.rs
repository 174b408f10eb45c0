//! Cross-boundary contracts for the townlet engine, API, and CLI.
//!
//! Everything that crosses a crate seam lives here: simulated time, run
//! configuration and status, scenario definitions, the decision-gateway wire
//! schemas, and the read-only introspection snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

mod api;
mod gateway;
mod scenario;
mod snapshot;
mod time;

pub use api::{ApiError, ErrorCode};
pub use gateway::{
    ActionDecisionWire, ActionTag, DailyPlanWire, GatewayRequest, ImportanceRatingWire,
    MemoryProposalWire, ReflectionWire, Role, RoleMessage, SchemaId, TimeBlockWire,
};
pub use scenario::{PersonaSpec, PlaceSpec, Scenario, ScenarioError, WorldBounds};
pub use snapshot::{AgentSnapshot, ChatMessageView, EventView, ScoredMemoryView, WorldSnapshot};
pub use time::{SimTime, MINUTES_PER_DAY, TICK_MINUTES};

pub const SCHEMA_VERSION_V1: &str = "1.0";

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for a simulation run.
///
/// Defaults match the reference behavior: 10-minute ticks, top-8 retrieval,
/// reflection at accumulated importance 26.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub schema_version: String,
    pub run_id: String,
    pub duration_days: u32,
    /// Simulated minutes advanced per tick.
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u64,
    /// Chat entries older than this (minutes) are pruned after each tick.
    #[serde(default = "default_chat_keep_minutes")]
    pub chat_keep_minutes: u64,
    /// Number of memories retrieved per decision.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
    /// Accumulated importance that triggers a reflection attempt.
    #[serde(default = "default_reflection_threshold")]
    pub reflection_threshold: i64,
    /// How many recent records feed a reflection.
    #[serde(default = "default_reflection_window")]
    pub reflection_window: usize,
    /// Importance assigned to stored reflection insights.
    #[serde(default = "default_reflection_importance")]
    pub reflection_importance: i64,
    /// Maximum stored length of a decision-proposed memory text.
    #[serde(default = "default_memory_text_max_chars")]
    pub memory_text_max_chars: usize,
    /// Importance used when a proposal omits or mangles its rating.
    #[serde(default = "default_importance")]
    pub default_importance: i64,
    /// At most this many memory proposals are stored per decision.
    #[serde(default = "default_max_decision_memories")]
    pub max_decision_memories: usize,
    /// Movement per tick, world units.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    /// Distance below which a traveler snaps onto its destination.
    #[serde(default = "default_arrival_epsilon")]
    pub arrival_epsilon: f32,
    /// When set, each stored memory is re-rated by a dedicated gateway call.
    #[serde(default)]
    pub strict_importance: bool,
    #[serde(default = "default_gateway_temperature")]
    pub gateway_temperature: f32,
    #[serde(default = "default_gateway_max_tokens")]
    pub gateway_max_tokens: u32,
    pub notes: Option<String>,
}

fn default_tick_minutes() -> u64 {
    TICK_MINUTES
}

fn default_chat_keep_minutes() -> u64 {
    30
}

fn default_retrieval_k() -> usize {
    8
}

fn default_reflection_threshold() -> i64 {
    26
}

fn default_reflection_window() -> usize {
    12
}

fn default_reflection_importance() -> i64 {
    8
}

fn default_memory_text_max_chars() -> usize {
    240
}

fn default_importance() -> i64 {
    3
}

fn default_max_decision_memories() -> usize {
    3
}

fn default_walk_speed() -> f32 {
    30.0
}

fn default_arrival_epsilon() -> f32 {
    0.5
}

fn default_gateway_temperature() -> f32 {
    0.7
}

fn default_gateway_max_tokens() -> u32 {
    512
}

impl RunConfig {
    pub fn max_ticks(&self) -> u64 {
        let minutes = u64::from(self.duration_days) * MINUTES_PER_DAY;
        minutes / self.tick_minutes.max(1)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "run_local_001".to_string(),
            duration_days: 2,
            tick_minutes: default_tick_minutes(),
            chat_keep_minutes: default_chat_keep_minutes(),
            retrieval_k: default_retrieval_k(),
            reflection_threshold: default_reflection_threshold(),
            reflection_window: default_reflection_window(),
            reflection_importance: default_reflection_importance(),
            memory_text_max_chars: default_memory_text_max_chars(),
            default_importance: default_importance(),
            max_decision_memories: default_max_decision_memories(),
            walk_speed: default_walk_speed(),
            arrival_epsilon: default_arrival_epsilon(),
            strict_importance: false,
            gateway_temperature: default_gateway_temperature(),
            gateway_max_tokens: default_gateway_max_tokens(),
            notes: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStatus {
    pub schema_version: String,
    pub run_id: String,
    pub current_tick: u64,
    pub max_ticks: u64,
    pub mode: RunMode,
    pub sim_time: SimTime,
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_ticks
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} tick={}/{} time={} mode={:?}",
            self.run_id,
            self.current_tick,
            self.max_ticks,
            self.sim_time.hhmm(),
            self.mode
        )
    }
}
