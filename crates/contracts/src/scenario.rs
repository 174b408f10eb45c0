//! Scenario definitions: world bounds, named places, and the agent roster.
//!
//! A scenario is authored as JSON and validated once at load. Places are
//! immutable for the lifetime of a run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceSpec {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonaSpec {
    pub id: String,
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub home_place: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub bounds: WorldBounds,
    pub places: Vec<PlaceSpec>,
    pub roster: Vec<PersonaSpec>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("scenario must define at least one place")]
    NoPlaces,
    #[error("duplicate place id `{0}`")]
    DuplicatePlaceId(String),
    #[error("duplicate persona id `{0}`")]
    DuplicatePersonaId(String),
    #[error("place `{0}` lies outside world bounds")]
    PlaceOutOfBounds(String),
    #[error("persona `{0}` references unknown home place `{1}`")]
    UnknownHomePlace(String, String),
    #[error("world bounds must be positive")]
    BadBounds,
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.bounds.width <= 0.0 || self.bounds.height <= 0.0 {
            return Err(ScenarioError::BadBounds);
        }
        if self.places.is_empty() {
            return Err(ScenarioError::NoPlaces);
        }
        let mut place_ids = BTreeSet::new();
        for place in &self.places {
            if !place_ids.insert(place.id.as_str()) {
                return Err(ScenarioError::DuplicatePlaceId(place.id.clone()));
            }
            if place.x < 0.0
                || place.y < 0.0
                || place.x > self.bounds.width
                || place.y > self.bounds.height
            {
                return Err(ScenarioError::PlaceOutOfBounds(place.id.clone()));
            }
        }
        let mut persona_ids = BTreeSet::new();
        for persona in &self.roster {
            if !persona_ids.insert(persona.id.as_str()) {
                return Err(ScenarioError::DuplicatePersonaId(persona.id.clone()));
            }
            if !place_ids.contains(persona.home_place.as_str()) {
                return Err(ScenarioError::UnknownHomePlace(
                    persona.id.clone(),
                    persona.home_place.clone(),
                ));
            }
        }
        Ok(())
    }
}
