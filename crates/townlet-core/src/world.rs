//! Shared spatial world: named circular places, per-place chat logs, and a
//! global event log.
//!
//! The place registry is fixed once a run is built. Agents mutate the world
//! only through `post_chat` and `log_event`; positions live on the agents
//! themselves.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use contracts::{ChatMessageView, EventView, PlaceSpec, Scenario, SimTime, WorldBounds};

/// How many chat entries perception surfaces per place.
pub const CHAT_WINDOW: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub description: String,
}

impl Place {
    fn from_spec(spec: &PlaceSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            x: spec.x,
            y: spec.y,
            radius: spec.radius,
            description: spec.description.clone(),
        }
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub speaker: String,
    pub text: String,
    pub time: SimTime,
}

impl ChatMessage {
    pub fn view(&self) -> ChatMessageView {
        ChatMessageView {
            speaker: self.speaker.clone(),
            text: self.text.clone(),
            time: self.time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldEvent {
    pub time: SimTime,
    /// Resolved place name; empty when not tied to a place.
    pub place: String,
    pub text: String,
}

impl WorldEvent {
    pub fn view(&self) -> EventView {
        EventView {
            time: self.time,
            place: self.place.clone(),
            text: self.text.clone(),
        }
    }
}

/// Another agent seen at the same place this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyAgent {
    pub id: String,
    pub name: String,
    pub activity: String,
}

/// What one agent sees at the start of its turn.
#[derive(Debug, Clone, Default)]
pub struct Perception {
    pub place_id: Option<String>,
    pub place_name: Option<String>,
    pub nearby: Vec<NearbyAgent>,
    pub chat: Vec<ChatMessage>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct World {
    pub bounds: WorldBounds,
    places: Vec<Place>,
    chat_by_place: BTreeMap<String, VecDeque<ChatMessage>>,
    event_log: Vec<WorldEvent>,
}

impl World {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            bounds: scenario.bounds,
            places: scenario.places.iter().map(Place::from_spec).collect(),
            chat_by_place: BTreeMap::new(),
            event_log: Vec::new(),
        }
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn place_by_name(&self, name: &str) -> Option<&Place> {
        let needle = name.trim().to_lowercase();
        self.places
            .iter()
            .find(|p| p.id.to_lowercase() == needle || p.name.to_lowercase() == needle)
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    pub fn chat_log(&self, place_id: &str) -> Vec<ChatMessage> {
        self.chat_by_place
            .get(place_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clamp_to_bounds(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.bounds.width), y.clamp(0.0, self.bounds.height))
    }

    /// The nearest place and its distance. The position counts as inside only
    /// when the distance is within the place radius; otherwise the agent is
    /// in the street and belongs to no place.
    pub fn resolve_place(&self, x: f32, y: f32) -> Option<(&Place, f32)> {
        self.places
            .iter()
            .map(|p| (p, p.distance_to(x, y)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .filter(|(place, dist)| *dist <= place.radius)
    }

    /// Builds the perception for `agent_id` standing at `(x, y)`.
    ///
    /// `others` carries `(id, name, activity, x, y)` for the whole roster;
    /// the perceiving agent is excluded by id. Agents in the street see
    /// nobody and no chat.
    pub fn perceive(
        &self,
        agent_id: &str,
        x: f32,
        y: f32,
        others: &[(String, String, String, f32, f32)],
    ) -> Perception {
        let Some((place, _)) = self.resolve_place(x, y) else {
            return Perception::default();
        };
        let nearby = others
            .iter()
            .filter(|(id, ..)| id != agent_id)
            .filter(|(_, _, _, ox, oy)| {
                self.resolve_place(*ox, *oy)
                    .is_some_and(|(other_place, _)| other_place.id == place.id)
            })
            .map(|(id, name, activity, ..)| NearbyAgent {
                id: id.clone(),
                name: name.clone(),
                activity: activity.clone(),
            })
            .collect();
        let chat = self
            .chat_by_place
            .get(&place.id)
            .map(|log| {
                log.iter()
                    .rev()
                    .take(CHAT_WINDOW)
                    .rev()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Perception {
            place_id: Some(place.id.clone()),
            place_name: Some(place.name.clone()),
            nearby,
            chat,
        }
    }

    /// Appends a chat line to a place's log and mirrors it into the global
    /// event log. Unknown place ids are ignored.
    pub fn post_chat(&mut self, place_id: &str, speaker: &str, text: &str, time: SimTime) {
        let Some(place_name) = self.place(place_id).map(|p| p.name.clone()) else {
            debug!(place_id, "chat to unknown place dropped");
            return;
        };
        self.chat_by_place
            .entry(place_id.to_string())
            .or_default()
            .push_back(ChatMessage {
                speaker: speaker.to_string(),
                text: text.to_string(),
                time,
            });
        self.event_log.push(WorldEvent {
            time,
            place: place_name,
            text: format!("{speaker}: {text}"),
        });
    }

    pub fn log_event(&mut self, time: SimTime, text: &str, place_id: Option<&str>) {
        let place = place_id
            .and_then(|id| self.place(id))
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.event_log.push(WorldEvent {
            time,
            place,
            text: text.to_string(),
        });
    }

    /// Drops chat entries older than `keep_minutes`. The global event log is
    /// the permanent record and is never pruned.
    pub fn prune_chat(&mut self, now: SimTime, keep_minutes: u64) {
        for log in self.chat_by_place.values_mut() {
            while let Some(front) = log.front() {
                if now.minutes_between(front.time) > keep_minutes {
                    log.pop_front();
                } else {
                    break;
                }
            }
        }
    }
}
