//! The townlet cognitive simulation engine.
//!
//! A small roster of agents lives in a bounded 2D world of named places.
//! Each tick every agent perceives its surroundings, retrieves relevant
//! memories, asks the decision gateway what to do, acts on the shared world,
//! records new memories, and occasionally reflects. The engine itself is
//! deterministic; all open-ended judgement is delegated to the gateway, and
//! every gateway failure degrades to a safe scripted fallback.

pub mod agent;
pub mod gateway;
pub mod memory;
pub mod plan;
pub mod sim;
pub mod world;

pub use agent::{Agent, AgentState};
pub use gateway::{
    DecisionGateway, GatewayError, GatewayOutcome, HttpGateway, NullGateway, ScriptedGateway,
    SerialGateway,
};
pub use memory::{MemoryKind, MemoryRecord, MemoryStream, ScoredMemory};
pub use plan::{DailyPlan, TimeBlock};
pub use sim::Simulation;
pub use world::{ChatMessage, Perception, Place, World, WorldEvent};
