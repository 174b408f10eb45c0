//! The decision gateway: every open-ended judgement call leaves the engine
//! through this seam.
//!
//! Backends implement [`DecisionGateway`]; the engine only ever talks to a
//! [`SerialGateway`] wrapper, which forces strict FIFO single-flight ordering
//! and folds every transport or parse failure into
//! [`GatewayOutcome::Absent`]. An absent outcome is a normal result the
//! caller handles with a scripted fallback, never an error that stops a run.

use std::collections::{BTreeMap, VecDeque};
use std::env;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use contracts::{
    ActionDecisionWire, DailyPlanWire, GatewayRequest, ImportanceRatingWire, ReflectionWire,
    RoleMessage, RunConfig, SchemaId,
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway returned http status {0}")]
    HttpStatus(u16),
    #[error("gateway returned an empty response")]
    EmptyResponse,
}

/// A completion backend. Implementations must be shareable across the
/// engine's async tasks.
#[async_trait]
pub trait DecisionGateway: Send + Sync {
    async fn complete(&self, request: GatewayRequest) -> Result<String, GatewayError>;
}

/// Result of a typed gateway call. `Absent` covers transport failure, empty
/// output, and shape-invalid payloads alike.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome<T> {
    Valid(T),
    Absent,
}

impl<T> GatewayOutcome<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, GatewayOutcome::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            GatewayOutcome::Valid(value) => Some(value),
            GatewayOutcome::Absent => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serialized wrapper
// ---------------------------------------------------------------------------

/// Wraps a backend behind an async mutex so that at most one request is in
/// flight at any time, in strict call order. The whole engine shares one.
pub struct SerialGateway {
    inner: tokio::sync::Mutex<Box<dyn DecisionGateway>>,
}

impl SerialGateway {
    pub fn new(backend: Box<dyn DecisionGateway>) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(backend),
        }
    }

    async fn complete_raw(&self, request: GatewayRequest) -> GatewayOutcome<String> {
        let schema = request.schema;
        let backend = self.inner.lock().await;
        match backend.complete(request).await {
            Ok(text) if !text.trim().is_empty() => GatewayOutcome::Valid(text),
            Ok(_) => {
                debug!(?schema, "gateway returned empty text");
                GatewayOutcome::Absent
            }
            Err(err) => {
                warn!(?schema, error = %err, "gateway call failed, treating as absent");
                GatewayOutcome::Absent
            }
        }
    }

    async fn complete_typed<T: DeserializeOwned>(
        &self,
        schema: SchemaId,
        messages: Vec<RoleMessage>,
        config: &RunConfig,
    ) -> GatewayOutcome<T> {
        let request = GatewayRequest {
            messages,
            temperature: config.gateway_temperature,
            max_tokens: config.gateway_max_tokens,
            schema: Some(schema),
        };
        match self.complete_raw(request).await {
            GatewayOutcome::Valid(text) => match serde_json::from_str(extract_json(&text)) {
                Ok(value) => GatewayOutcome::Valid(value),
                Err(err) => {
                    warn!(?schema, error = %err, "gateway payload failed validation");
                    GatewayOutcome::Absent
                }
            },
            GatewayOutcome::Absent => GatewayOutcome::Absent,
        }
    }

    pub async fn decide_action(
        &self,
        messages: Vec<RoleMessage>,
        config: &RunConfig,
    ) -> GatewayOutcome<ActionDecisionWire> {
        self.complete_typed(SchemaId::ActionDecision, messages, config)
            .await
    }

    pub async fn plan_day(
        &self,
        messages: Vec<RoleMessage>,
        config: &RunConfig,
    ) -> GatewayOutcome<DailyPlanWire> {
        self.complete_typed(SchemaId::DailyPlan, messages, config)
            .await
    }

    /// A reflection must carry between 2 and 4 insights to count as valid.
    pub async fn reflect(
        &self,
        messages: Vec<RoleMessage>,
        config: &RunConfig,
    ) -> GatewayOutcome<ReflectionWire> {
        match self
            .complete_typed::<ReflectionWire>(SchemaId::Reflection, messages, config)
            .await
        {
            GatewayOutcome::Valid(wire) if (2..=4).contains(&wire.insights.len()) => {
                GatewayOutcome::Valid(wire)
            }
            GatewayOutcome::Valid(wire) => {
                debug!(
                    insights = wire.insights.len(),
                    "reflection outside 2-4 insight range, treating as absent"
                );
                GatewayOutcome::Absent
            }
            GatewayOutcome::Absent => GatewayOutcome::Absent,
        }
    }

    pub async fn rate_importance(
        &self,
        messages: Vec<RoleMessage>,
        config: &RunConfig,
    ) -> GatewayOutcome<i64> {
        match self
            .complete_typed::<ImportanceRatingWire>(SchemaId::ImportanceRating, messages, config)
            .await
        {
            GatewayOutcome::Valid(wire) => GatewayOutcome::Valid(wire.importance),
            GatewayOutcome::Absent => GatewayOutcome::Absent,
        }
    }
}

/// Trims markdown code fences and surrounding prose so a JSON object buried
/// in chatty output still parses.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => &inner[start..=end],
        _ => inner,
    }
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [RoleMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-format chat-completions client. No retries; failures surface as
/// errors that the serial wrapper folds to absent.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Reads `TOWNLET_LLM_URL`, `TOWNLET_LLM_KEY`, and `TOWNLET_LLM_MODEL`.
    /// Returns `None` unless the url and model are both present.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("TOWNLET_LLM_URL").ok()?;
        let model = env::var("TOWNLET_LLM_MODEL").ok()?;
        let api_key = env::var("TOWNLET_LLM_KEY").unwrap_or_default();
        Some(Self::new(base_url, api_key, model))
    }
}

#[async_trait]
impl DecisionGateway for HttpGateway {
    async fn complete(&self, request: GatewayRequest) -> Result<String, GatewayError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::HttpStatus(status.as_u16()));
        }
        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(GatewayError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Offline backends
// ---------------------------------------------------------------------------

/// Deterministic backend for tests and offline runs: responses are queued
/// per schema id and popped in order. A drained queue yields empty output,
/// which the serial wrapper reports as absent.
#[derive(Default)]
pub struct ScriptedGateway {
    responses: std::sync::Mutex<BTreeMap<Option<SchemaId>, VecDeque<String>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, schema: SchemaId, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(Some(schema))
            .or_default()
            .push_back(response.into());
    }
}

#[async_trait]
impl DecisionGateway for ScriptedGateway {
    async fn complete(&self, request: GatewayRequest) -> Result<String, GatewayError> {
        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(responses
            .get_mut(&request.schema)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_default())
    }
}

/// Always absent. Exercises every fallback path in the engine.
#[derive(Default)]
pub struct NullGateway;

#[async_trait]
impl DecisionGateway for NullGateway {
    async fn complete(&self, _request: GatewayRequest) -> Result<String, GatewayError> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ActionTag;

    fn config() -> RunConfig {
        RunConfig::default()
    }

    fn user(text: &str) -> Vec<RoleMessage> {
        vec![RoleMessage::user(text)]
    }

    #[test]
    fn extract_json_handles_fences_and_prose() {
        assert_eq!(extract_json(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), r#"{"a":1}"#);
        assert_eq!(extract_json("Sure! Here you go: {\"a\":1} hope that helps"), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn null_gateway_yields_absent_decision() {
        let gateway = SerialGateway::new(Box::new(NullGateway));
        let outcome = gateway.decide_action(user("what now"), &config()).await;
        assert!(outcome.is_absent());
    }

    #[tokio::test]
    async fn scripted_gateway_pops_per_schema_in_order() {
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::ActionDecision,
            r#"{"thought":"t","action":"stay"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        let first = gateway.decide_action(user("turn 1"), &config()).await;
        match first {
            GatewayOutcome::Valid(decision) => assert_eq!(decision.action, ActionTag::Stay),
            GatewayOutcome::Absent => panic!("expected a scripted decision"),
        }
        // Queue drained: second call is absent.
        assert!(gateway.decide_action(user("turn 2"), &config()).await.is_absent());
    }

    #[tokio::test]
    async fn malformed_payload_folds_to_absent() {
        let scripted = ScriptedGateway::new();
        scripted.push(SchemaId::ActionDecision, "definitely not json");
        let gateway = SerialGateway::new(Box::new(scripted));
        assert!(gateway.decide_action(user("turn"), &config()).await.is_absent());
    }

    #[tokio::test]
    async fn reflection_requires_two_to_four_insights() {
        let scripted = ScriptedGateway::new();
        scripted.push(
            SchemaId::Reflection,
            r#"{"insights":["only one"],"summary_update":"s"}"#,
        );
        scripted.push(
            SchemaId::Reflection,
            r#"{"insights":["a","b"],"summary_update":"I keep busy"}"#,
        );
        let gateway = SerialGateway::new(Box::new(scripted));
        assert!(gateway.reflect(user("r1"), &config()).await.is_absent());
        match gateway.reflect(user("r2"), &config()).await {
            GatewayOutcome::Valid(wire) => assert_eq!(wire.summary_update, "I keep busy"),
            GatewayOutcome::Absent => panic!("expected a valid reflection"),
        }
    }
}
