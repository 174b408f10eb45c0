//! In-process API facade and HTTP server for a single active run.

mod server;

use std::sync::Arc;

use contracts::{
    AgentSnapshot, ChatMessageView, EventView, RunConfig, RunStatus, Scenario, ScenarioError,
    SimTime, WorldSnapshot,
};
use townlet_core::{SerialGateway, Simulation};

pub use server::{serve, serve_shared, ServerError};

/// Thin facade over [`Simulation`] exposing exactly what the HTTP layer and
/// the CLI need.
pub struct EngineApi {
    engine: Simulation,
}

impl EngineApi {
    pub fn new(
        config: RunConfig,
        scenario: &Scenario,
        gateway: Arc<SerialGateway>,
    ) -> Result<Self, ScenarioError> {
        Ok(Self {
            engine: Simulation::new(config, scenario, gateway)?,
        })
    }

    /// Generates initial daily plans. Call once before stepping.
    pub async fn init(&mut self) {
        self.engine.init().await;
    }

    pub fn run_id(&self) -> String {
        self.engine.config().run_id.clone()
    }

    pub fn config(&self) -> &RunConfig {
        self.engine.config()
    }

    pub fn status(&self) -> RunStatus {
        self.engine.status()
    }

    pub fn start(&mut self) -> RunStatus {
        self.engine.start();
        self.engine.status()
    }

    pub fn pause(&mut self) -> RunStatus {
        self.engine.pause();
        self.engine.status()
    }

    /// Runs up to `steps` ticks; returns the new status and how many ticks
    /// actually executed.
    pub async fn step(&mut self, steps: u64) -> (RunStatus, u64) {
        let ran = self.engine.step_n(steps).await;
        (self.engine.status(), ran)
    }

    pub async fn run_to_tick(&mut self, target_tick: u64) -> (RunStatus, u64) {
        let ran = self.engine.run_to_tick(target_tick).await;
        (self.engine.status(), ran)
    }

    pub fn agents(&self) -> Vec<AgentSnapshot> {
        self.engine.world_snapshot().agents
    }

    pub fn agent(&self, id: &str) -> Option<AgentSnapshot> {
        self.engine.agent_snapshot(id)
    }

    pub fn events_since(&self, since: SimTime) -> Vec<EventView> {
        self.engine.events_since(since)
    }

    pub fn has_place(&self, place_id: &str) -> bool {
        self.engine.world().place(place_id).is_some()
    }

    pub fn chat(&self, place_id: &str) -> Vec<ChatMessageView> {
        self.engine.chat(place_id)
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        self.engine.world_snapshot()
    }
}
