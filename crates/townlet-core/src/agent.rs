//! The agent: persona, position, memory, plan, and the per-tick cognitive
//! cycle.
//!
//! Each tick an agent resolves pending movement, perceives its surroundings,
//! retrieves relevant memories, asks the gateway for a decision, applies it
//! to the shared world, stores proposed memories, and reflects once enough
//! importance has accumulated. Every gateway absence degrades to a scripted
//! fallback; the cycle itself never fails.

use tracing::debug;

use contracts::{
    ActionDecisionWire, ActionTag, AgentSnapshot, MemoryProposalWire, PersonaSpec, RoleMessage,
    RunConfig, SimTime,
};

use crate::gateway::{GatewayOutcome, SerialGateway};
use crate::memory::{MemoryKind, MemoryStream, ScoredMemory};
use crate::plan::{self, DailyPlan};
use crate::world::{Perception, World};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Walking,
    /// Talking to the agent with this id.
    Talking(String),
    Staying,
}

impl AgentState {
    pub fn label(&self) -> String {
        match self {
            AgentState::Idle => "idle".to_string(),
            AgentState::Walking => "walking".to_string(),
            AgentState::Talking(target) => format!("talking to {target}"),
            AgentState::Staying => "staying".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub x: f32,
    pub y: f32,
    pub place_id: String,
}

/// Roster info other agents' perception needs: id, name, activity label,
/// position.
pub type RosterEntry = (String, String, String, f32, f32);

#[derive(Debug)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub traits: Vec<String>,
    pub goals: Vec<String>,
    pub bio: String,
    pub home_place: String,
    pub x: f32,
    pub y: f32,
    /// `Some` exactly while traveling.
    pub destination: Option<Destination>,
    pub state: AgentState,
    /// Placeholder stat, decremented each tick; nothing reads it yet.
    pub energy: i64,
    pub memory: MemoryStream,
    pub plan: Option<DailyPlan>,
    pub self_summary: Option<String>,
    pub reflection_accumulator: i64,
    // Introspection only; core logic never reads these.
    pub last_thought: Option<String>,
    pub last_retrieved: Vec<ScoredMemory>,
    pub last_transcript: Option<String>,
}

impl Agent {
    pub fn from_persona(spec: &PersonaSpec, world: &World) -> Self {
        let (x, y) = world.clamp_to_bounds(spec.x, spec.y);
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            age: spec.age,
            traits: spec.traits.clone(),
            goals: spec.goals.clone(),
            bio: spec.bio.clone(),
            home_place: spec.home_place.clone(),
            x,
            y,
            destination: None,
            state: AgentState::Idle,
            energy: 100,
            memory: MemoryStream::new(),
            plan: None,
            self_summary: None,
            reflection_accumulator: 0,
            last_thought: None,
            last_retrieved: Vec::new(),
            last_transcript: None,
        }
    }

    pub fn roster_entry(&self) -> RosterEntry {
        (
            self.id.clone(),
            self.name.clone(),
            self.state.label(),
            self.x,
            self.y,
        )
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Advances toward the destination by at most `speed`, snapping onto it
    /// and clearing it once within `epsilon`. Distance to the destination
    /// never increases and the agent never overshoots.
    pub fn step_movement(&mut self, speed: f32, epsilon: f32) {
        let Some(dest) = self.destination.clone() else {
            return;
        };
        let dx = dest.x - self.x;
        let dy = dest.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= epsilon || dist <= speed {
            self.x = dest.x;
            self.y = dest.y;
            self.destination = None;
            self.state = AgentState::Idle;
            return;
        }
        self.x += dx / dist * speed;
        self.y += dy / dist * speed;
        self.state = AgentState::Walking;
    }

    // -----------------------------------------------------------------------
    // Cognitive cycle
    // -----------------------------------------------------------------------

    /// The full perceive -> retrieve -> decide -> act -> record -> reflect
    /// tick. Strictly sequential: one gateway call at a time, awaited to
    /// completion.
    pub async fn run_cycle(
        &mut self,
        world: &mut World,
        others: &[RosterEntry],
        gateway: &SerialGateway,
        config: &RunConfig,
        now: SimTime,
    ) {
        self.step_movement(config.walk_speed, config.arrival_epsilon);
        let (x, y) = world.clamp_to_bounds(self.x, self.y);
        self.x = x;
        self.y = y;

        let perception = world.perceive(&self.id, self.x, self.y, others);
        let query = self.build_query(&perception, now);
        self.last_retrieved = self
            .memory
            .retrieve(&query, now, config.retrieval_k, None);

        let messages = self.decision_messages(&perception, now);
        match gateway.decide_action(messages, config).await {
            GatewayOutcome::Valid(decision) => {
                self.last_thought = Some(decision.thought.clone());
                self.apply_decision(&decision, &perception, world, now);
                self.record_memories(&decision.memories, gateway, config, now)
                    .await;
            }
            GatewayOutcome::Absent => {
                debug!(agent = %self.id, "no decision this tick, idling");
                self.last_thought = Some("unsure what to do".to_string());
                self.state = AgentState::Idle;
            }
        }

        self.energy = (self.energy - 1).clamp(0, 100);

        if self.reflection_accumulator >= config.reflection_threshold {
            self.reflect(gateway, config, now).await;
        }
    }

    fn apply_decision(
        &mut self,
        decision: &ActionDecisionWire,
        perception: &Perception,
        world: &mut World,
        now: SimTime,
    ) {
        match decision.action {
            ActionTag::Move => {
                let target = decision.target.as_deref().unwrap_or_default();
                let place = world
                    .place_by_name(target)
                    .or_else(|| world.places().first());
                let Some(place) = place else {
                    self.state = AgentState::Staying;
                    return;
                };
                let (px, py, pid, pname) =
                    (place.x, place.y, place.id.clone(), place.name.clone());
                self.destination = Some(Destination {
                    x: px,
                    y: py,
                    place_id: pid.clone(),
                });
                self.state = AgentState::Walking;
                world.log_event(now, &format!("{} heads to {}", self.name, pname), Some(&pid));
            }
            ActionTag::Interact => {
                let target = decision.target.as_deref().unwrap_or_default().trim();
                let utterance = decision.utterance.as_deref().unwrap_or_default().trim();
                let target_id = perception
                    .nearby
                    .iter()
                    .find(|other| {
                        other.id.eq_ignore_ascii_case(target)
                            || other.name.eq_ignore_ascii_case(target)
                    })
                    .map(|other| other.id.clone());
                match (target_id, perception.place_id.as_deref()) {
                    (Some(target_id), Some(place_id)) if !utterance.is_empty() => {
                        world.post_chat(place_id, &self.name, utterance, now);
                        self.last_transcript = Some(format!("{}: {}", self.name, utterance));
                        self.state = AgentState::Talking(target_id);
                    }
                    _ => {
                        debug!(agent = %self.id, target, "interact target unavailable, idling");
                        self.state = AgentState::Idle;
                    }
                }
            }
            ActionTag::Stay => {
                self.state = AgentState::Staying;
            }
        }
    }

    async fn record_memories(
        &mut self,
        proposals: &[MemoryProposalWire],
        gateway: &SerialGateway,
        config: &RunConfig,
        now: SimTime,
    ) {
        for proposal in proposals.iter().take(config.max_decision_memories) {
            let text: String = proposal
                .text
                .trim()
                .chars()
                .take(config.memory_text_max_chars)
                .collect();
            if text.is_empty() {
                continue;
            }
            let kind = match proposal.kind.as_deref().map(str::trim) {
                Some(k) if k.eq_ignore_ascii_case("action") => MemoryKind::Action,
                _ => MemoryKind::Observation,
            };
            let mut importance = proposal
                .importance
                .unwrap_or(config.default_importance)
                .clamp(1, 10);
            if config.strict_importance {
                let messages = vec![
                    RoleMessage::system(
                        "Rate the importance of this memory from 1 to 10. Respond as JSON: {\"importance\": n}",
                    ),
                    RoleMessage::user(text.clone()),
                ];
                if let GatewayOutcome::Valid(rated) =
                    gateway.rate_importance(messages, config).await
                {
                    importance = rated.clamp(1, 10);
                }
            }
            self.memory.append(now, &text, kind, importance);
            self.reflection_accumulator += importance;
        }
    }

    async fn reflect(&mut self, gateway: &SerialGateway, config: &RunConfig, now: SimTime) {
        let recent: Vec<String> = self
            .memory
            .recent(config.reflection_window)
            .iter()
            .map(|record| format!("- {}", record.text))
            .collect();
        let messages = vec![
            RoleMessage::system(
                "Given these recent memories, produce 2-4 high-level insights and an updated one-paragraph self summary. \
                 Respond as JSON: {\"insights\": [...], \"summary_update\": \"...\"}",
            ),
            RoleMessage::user(recent.join("\n")),
        ];
        match gateway.reflect(messages, config).await {
            GatewayOutcome::Valid(wire) => {
                for insight in &wire.insights {
                    self.memory.append(
                        now,
                        insight,
                        MemoryKind::Reflection,
                        config.reflection_importance,
                    );
                }
                if !wire.summary_update.trim().is_empty() {
                    self.self_summary = Some(wire.summary_update.clone());
                }
            }
            GatewayOutcome::Absent => {
                debug!(agent = %self.id, "reflection yielded nothing");
            }
        }
        // Reset either way; the next reflection needs a fresh crossing.
        self.reflection_accumulator = 0;
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    /// Asks the gateway for a daily plan, falling back to the deterministic
    /// keyword plan when it yields nothing usable.
    pub async fn ensure_plan(
        &mut self,
        gateway: &SerialGateway,
        world: &World,
        config: &RunConfig,
        now: SimTime,
    ) {
        let places = world
            .places()
            .iter()
            .map(|p| format!("{} ({})", p.name, p.id))
            .collect::<Vec<_>>()
            .join(", ");
        let messages = vec![
            RoleMessage::system(format!(
                "Plan {}'s day as up to 10 time blocks. Places: {}. \
                 Respond as JSON: {{\"date\": \"{}\", \"blocks\": [{{\"start\": \"HH:MM\", \"end\": \"HH:MM\", \"location\": \"place id\", \"activity\": \"...\"}}]}}",
                self.name,
                places,
                now.date_string(),
            )),
            RoleMessage::user(self.persona_text()),
        ];
        let planned = match gateway.plan_day(messages, config).await {
            GatewayOutcome::Valid(wire) => plan::parse_wire(&wire),
            GatewayOutcome::Absent => None,
        };
        self.plan = Some(planned.unwrap_or_else(|| {
            debug!(agent = %self.id, "using fallback daily plan");
            plan::fallback_plan(&self.home_place, world.places(), &now.date_string())
        }));
    }

    // -----------------------------------------------------------------------
    // Prompt assembly
    // -----------------------------------------------------------------------

    fn persona_text(&self) -> String {
        format!(
            "{}, age {}. Traits: {}. Goals: {}. {}",
            self.name,
            self.age,
            self.traits.join(", "),
            self.goals.join(", "),
            self.bio,
        )
    }

    /// The retrieval query: where the agent is, what it planned, who is
    /// around, and what was just said.
    fn build_query(&self, perception: &Perception, now: SimTime) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = &perception.place_name {
            parts.push(name.clone());
        }
        if let Some(plan) = &self.plan {
            for block in plan::snippet_for(plan, now) {
                parts.push(format!("{} {}", block.activity, block.location));
            }
        }
        for other in &perception.nearby {
            parts.push(other.name.clone());
        }
        for message in &perception.chat {
            parts.push(message.text.clone());
        }
        parts.join(" ")
    }

    fn decision_messages(&self, perception: &Perception, now: SimTime) -> Vec<RoleMessage> {
        let place = perception.place_name.as_deref().unwrap_or("the street");
        let nearby = if perception.nearby.is_empty() {
            "nobody".to_string()
        } else {
            perception
                .nearby
                .iter()
                .map(|other| format!("{} ({})", other.name, other.activity))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let chat = perception
            .chat
            .iter()
            .map(|message| format!("{}: {}", message.speaker, message.text))
            .collect::<Vec<_>>()
            .join("\n");
        let memories = self
            .last_retrieved
            .iter()
            .map(|scored| format!("- {}", scored.record.text))
            .collect::<Vec<_>>()
            .join("\n");
        let plan_snippet = self
            .plan
            .as_ref()
            .map(|plan| {
                plan::snippet_for(plan, now)
                    .iter()
                    .map(|block| format!("{} at {}", block.activity, block.location))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();
        let summary = self.self_summary.as_deref().unwrap_or("");
        vec![
            RoleMessage::system(format!(
                "You are {}. {} Decide the next action. \
                 Respond as JSON: {{\"thought\": \"...\", \"action\": \"move|interact|stay\", \
                 \"target\": \"place or person\", \"utterance\": \"...\", \
                 \"memories\": [{{\"text\": \"...\", \"kind\": \"observation|action\", \"importance\": 1}}]}}",
                self.persona_text(),
                summary,
            )),
            RoleMessage::user(format!(
                "Time: {}. You are at {}. Nearby: {}.\nRecent chat:\n{}\nRelevant memories:\n{}\nPlan: {}",
                now, place, nearby, chat, memories, plan_snippet,
            )),
        ]
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn snapshot(&self, world: &World) -> AgentSnapshot {
        let place = world
            .resolve_place(self.x, self.y)
            .map(|(p, _)| p.name.clone());
        AgentSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            state: self.state.label(),
            x: self.x,
            y: self.y,
            destination: self.destination.as_ref().map(|d| (d.x, d.y)),
            energy: self.energy,
            place,
            current_activity: Some(self.state.label()),
            self_summary: self.self_summary.clone(),
            plan_text: self.plan.as_ref().map(plan::plan_text),
            last_thought: self.last_thought.clone(),
            last_retrieved: self.last_retrieved.iter().map(ScoredMemory::view).collect(),
            last_transcript: self.last_transcript.clone(),
            reflection_accumulator: self.reflection_accumulator,
            memory_count: self.memory.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{NullGateway, ScriptedGateway};
    use contracts::{PlaceSpec, Scenario, SchemaId, WorldBounds};

    fn t(minutes: u64) -> SimTime {
        SimTime::from_minutes(minutes)
    }

    fn test_world() -> World {
        World::from_scenario(&Scenario {
            bounds: WorldBounds {
                width: 200.0,
                height: 200.0,
            },
            places: vec![
                PlaceSpec {
                    id: "home".to_string(),
                    name: "Home".to_string(),
                    x: 10.0,
                    y: 10.0,
                    radius: 5.0,
                    description: String::new(),
                },
                PlaceSpec {
                    id: "cafe".to_string(),
                    name: "Corner Cafe".to_string(),
                    x: 150.0,
                    y: 10.0,
                    radius: 5.0,
                    description: String::new(),
                },
            ],
            roster: Vec::new(),
        })
    }

    fn test_agent(world: &World) -> Agent {
        Agent::from_persona(
            &PersonaSpec {
                id: "ada".to_string(),
                name: "Ada".to_string(),
                age: 31,
                traits: vec!["curious".to_string()],
                goals: vec!["meet people".to_string()],
                bio: "A surveyor new in town.".to_string(),
                home_place: "home".to_string(),
                x: 10.0,
                y: 10.0,
            },
            world,
        )
    }

    #[test]
    fn movement_converges_without_overshoot() {
        let world = test_world();
        let mut agent = test_agent(&world);
        agent.destination = Some(Destination {
            x: 150.0,
            y: 10.0,
            place_id: "cafe".to_string(),
        });
        let mut last_dist = f32::MAX;
        for _ in 0..10 {
            agent.step_movement(30.0, 0.5);
            let dx = 150.0 - agent.x;
            let dist = dx.abs();
            assert!(dist <= last_dist);
            last_dist = dist;
            if agent.destination.is_none() {
                break;
            }
            assert_eq!(agent.state, AgentState::Walking);
        }
        assert!(agent.destination.is_none());
        assert_eq!(agent.x, 150.0);
        assert_eq!(agent.state, AgentState::Idle);
    }

    #[test]
    fn movement_is_noop_without_destination() {
        let world = test_world();
        let mut agent = test_agent(&world);
        agent.step_movement(30.0, 0.5);
        assert_eq!((agent.x, agent.y), (10.0, 10.0));
        assert_eq!(agent.state, AgentState::Idle);
    }

    #[tokio::test]
    async fn absent_decision_leaves_agent_idle_and_unrecorded() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let gateway = SerialGateway::new(Box::new(NullGateway));
        let config = RunConfig::default();
        agent
            .run_cycle(&mut world, &[], &gateway, &config, t(10))
            .await;
        assert_eq!(agent.state, AgentState::Idle);
        assert_eq!(agent.last_thought.as_deref(), Some("unsure what to do"));
        assert!(agent.memory.is_empty());
        assert_eq!(agent.energy, 99);
    }

    #[tokio::test]
    async fn move_decision_sets_destination_and_logs_event() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"coffee","action":"move","target":"Corner Cafe"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        let config = RunConfig::default();
        agent
            .run_cycle(&mut world, &[], &gateway, &config, t(10))
            .await;
        assert_eq!(agent.state, AgentState::Walking);
        let dest = agent.destination.as_ref().expect("destination set");
        assert_eq!(dest.place_id, "cafe");
        assert!(world
            .events()
            .iter()
            .any(|e| e.text == "Ada heads to Corner Cafe"));
    }

    #[tokio::test]
    async fn move_to_unknown_place_falls_back_to_first_place() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"","action":"move","target":"the moon"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        agent
            .run_cycle(&mut world, &[], &gateway, &RunConfig::default(), t(10))
            .await;
        assert_eq!(
            agent.destination.as_ref().map(|d| d.place_id.as_str()),
            Some("home")
        );
    }

    #[tokio::test]
    async fn interact_without_colocated_target_idles_silently() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"","action":"interact","target":"Ben","utterance":"hello!"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        // Ben is far away at the cafe.
        let others = vec![(
            "ben".to_string(),
            "Ben".to_string(),
            "idle".to_string(),
            150.0,
            10.0,
        )];
        agent
            .run_cycle(&mut world, &others, &gateway, &RunConfig::default(), t(10))
            .await;
        assert_eq!(agent.state, AgentState::Idle);
        assert!(world.chat_log("home").is_empty());
    }

    #[tokio::test]
    async fn interact_with_colocated_target_posts_chat() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"","action":"interact","target":"Ben","utterance":"morning, Ben"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        let others = vec![(
            "ben".to_string(),
            "Ben".to_string(),
            "idle".to_string(),
            11.0,
            10.0,
        )];
        agent
            .run_cycle(&mut world, &others, &gateway, &RunConfig::default(), t(10))
            .await;
        assert_eq!(agent.state, AgentState::Talking("ben".to_string()));
        let chat = world.chat_log("home");
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].speaker, "Ada");
        assert_eq!(chat[0].text, "morning, Ben");
    }

    #[tokio::test]
    async fn memories_are_truncated_coerced_and_accumulated() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let long_text = "x".repeat(500);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            format!(
                r#"{{"thought":"","action":"stay","memories":[
                    {{"text":"{long_text}","kind":"reflection","importance":99}},
                    {{"text":"a normal note","kind":"action"}},
                    {{"text":"   "}},
                    {{"text":"one too many","importance":5}}
                ]}}"#
            ),
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        let config = RunConfig::default();
        agent
            .run_cycle(&mut world, &[], &gateway, &config, t(10))
            .await;
        assert_eq!(agent.state, AgentState::Staying);
        // Blank proposal skipped, fourth proposal past the cap dropped.
        assert_eq!(agent.memory.len(), 2);
        let records = agent.memory.records();
        assert_eq!(records[0].text.chars().count(), 240);
        // "reflection" is not a kind decisions may store.
        assert_eq!(records[0].kind, MemoryKind::Observation);
        assert_eq!(records[0].importance, 10);
        assert_eq!(records[1].kind, MemoryKind::Action);
        assert_eq!(records[1].importance, 3);
        assert_eq!(agent.reflection_accumulator, 13);
    }

    #[tokio::test]
    async fn strict_importance_rerates_each_memory() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"","action":"stay","memories":[{"text":"met the mayor","importance":2}]}"#,
        );
        scripted.push(SchemaId::ImportanceRating, r#"{"importance":9}"#);
        let gateway = SerialGateway::new(Box::new(scripted));
        let config = RunConfig {
            strict_importance: true,
            ..RunConfig::default()
        };
        agent
            .run_cycle(&mut world, &[], &gateway, &config, t(10))
            .await;
        assert_eq!(agent.memory.records()[0].importance, 9);
    }

    #[tokio::test]
    async fn reflection_triggers_at_threshold_and_resets() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        agent.reflection_accumulator = 24;
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"","action":"stay","memories":[{"text":"a big moment","importance":8}]}"#,
        );
        scripted.push(
            SchemaId::Reflection,
            r#"{"insights":["I like mornings","Ben is a good friend"],"summary_update":"Ada is settling in."}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        agent
            .run_cycle(&mut world, &[], &gateway, &RunConfig::default(), t(10))
            .await;
        assert_eq!(agent.reflection_accumulator, 0);
        assert_eq!(agent.self_summary.as_deref(), Some("Ada is settling in."));
        let reflections: Vec<_> = agent
            .memory
            .records()
            .iter()
            .filter(|r| r.kind == MemoryKind::Reflection)
            .collect();
        assert_eq!(reflections.len(), 2);
        assert!(reflections.iter().all(|r| r.importance == 8));
    }

    #[tokio::test]
    async fn failed_reflection_still_resets_accumulator() {
        let mut world = test_world();
        let mut agent = test_agent(&world);
        agent.reflection_accumulator = 30;
        let gateway = SerialGateway::new(Box::new(NullGateway));
        agent
            .run_cycle(&mut world, &[], &gateway, &RunConfig::default(), t(10))
            .await;
        assert_eq!(agent.reflection_accumulator, 0);
        assert!(agent.self_summary.is_none());
    }

    #[tokio::test]
    async fn plan_falls_back_deterministically() {
        let world = test_world();
        let mut agent = test_agent(&world);
        let gateway = SerialGateway::new(Box::new(NullGateway));
        agent
            .ensure_plan(&gateway, &world, &RunConfig::default(), t(0))
            .await;
        let plan = agent.plan.as_ref().expect("plan set");
        assert_eq!(plan.date, "day 0");
        assert_eq!(plan.blocks[0].location, "home");
        // Cafe keyword matches the registered cafe.
        assert_eq!(plan.blocks[1].location, "cafe");
    }
}
