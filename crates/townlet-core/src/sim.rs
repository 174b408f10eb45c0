//! Tick orchestrator: owns the clock, the world, the roster, and the shared
//! serialized gateway.
//!
//! Agents act strictly one after another within a tick; there is a single
//! logical thread of control and each gateway call is awaited to completion
//! before the next agent moves. Pause requests take effect between ticks.

use std::sync::Arc;

use tracing::{debug, info};

use contracts::{
    ChatMessageView, EventView, RunConfig, RunMode, RunStatus, Scenario, ScenarioError, SimTime,
    WorldSnapshot,
};

use crate::agent::Agent;
use crate::gateway::SerialGateway;
use crate::world::World;

pub struct Simulation {
    config: RunConfig,
    mode: RunMode,
    current_tick: u64,
    clock: SimTime,
    world: World,
    agents: Vec<Agent>,
    gateway: Arc<SerialGateway>,
}

impl Simulation {
    pub fn new(
        config: RunConfig,
        scenario: &Scenario,
        gateway: Arc<SerialGateway>,
    ) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let world = World::from_scenario(scenario);
        let agents = scenario
            .roster
            .iter()
            .map(|persona| Agent::from_persona(persona, &world))
            .collect();
        Ok(Self {
            config,
            mode: RunMode::Paused,
            current_tick: 0,
            clock: SimTime::from_minutes(0),
            world,
            agents,
            gateway,
        })
    }

    /// Generates each agent's first daily plan, one at a time.
    pub async fn init(&mut self) {
        for agent in &mut self.agents {
            agent
                .ensure_plan(&self.gateway, &self.world, &self.config, self.clock)
                .await;
        }
        info!(agents = self.agents.len(), "simulation initialized");
    }

    pub fn start(&mut self) {
        self.mode = RunMode::Running;
    }

    pub fn pause(&mut self) {
        self.mode = RunMode::Paused;
    }

    pub fn status(&self) -> RunStatus {
        RunStatus {
            schema_version: self.config.schema_version.clone(),
            run_id: self.config.run_id.clone(),
            current_tick: self.current_tick,
            max_ticks: self.config.max_ticks(),
            mode: self.mode,
            sim_time: self.clock,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.config.max_ticks()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Runs one tick. Returns `false` without acting when paused or
    /// complete.
    pub async fn step(&mut self) -> bool {
        if self.mode != RunMode::Running || self.is_complete() {
            return false;
        }
        self.current_tick += 1;
        self.clock = self.clock.plus_minutes(self.config.tick_minutes);
        debug!(tick = self.current_tick, time = %self.clock, "tick");

        // A fresh day means fresh plans.
        if self.clock.time_of_day() < self.config.tick_minutes {
            for agent in &mut self.agents {
                agent
                    .ensure_plan(&self.gateway, &self.world, &self.config, self.clock)
                    .await;
            }
        }

        for index in 0..self.agents.len() {
            // Roster positions reflect agents that already acted this tick.
            let roster: Vec<_> = self.agents.iter().map(Agent::roster_entry).collect();
            let agent = &mut self.agents[index];
            agent
                .run_cycle(
                    &mut self.world,
                    &roster,
                    &self.gateway,
                    &self.config,
                    self.clock,
                )
                .await;
        }

        self.world
            .prune_chat(self.clock, self.config.chat_keep_minutes);

        if self.is_complete() {
            info!(run_id = %self.config.run_id, "run complete");
            self.mode = RunMode::Paused;
        }
        true
    }

    /// Runs up to `n` ticks; returns how many actually ran.
    pub async fn step_n(&mut self, n: u64) -> u64 {
        let mut ran = 0;
        for _ in 0..n {
            if !self.step().await {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Advances until `tick` (or pause/completion); returns ticks run.
    pub async fn run_to_tick(&mut self, tick: u64) -> u64 {
        let mut ran = 0;
        while self.current_tick < tick {
            if !self.step().await {
                break;
            }
            ran += 1;
        }
        ran
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn agent_snapshot(&self, id: &str) -> Option<contracts::AgentSnapshot> {
        self.agents
            .iter()
            .find(|agent| agent.id == id)
            .map(|agent| agent.snapshot(&self.world))
    }

    pub fn events_since(&self, since: SimTime) -> Vec<EventView> {
        self.world
            .events()
            .iter()
            .filter(|event| event.time >= since)
            .map(|event| event.view())
            .collect()
    }

    pub fn chat(&self, place_id: &str) -> Vec<ChatMessageView> {
        self.world
            .chat_log(place_id)
            .iter()
            .map(|message| message.view())
            .collect()
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            sim_time: self.clock,
            events: self.world.events().iter().map(|e| e.view()).collect(),
            agents: self
                .agents
                .iter()
                .map(|agent| agent.snapshot(&self.world))
                .collect(),
        }
    }
}
