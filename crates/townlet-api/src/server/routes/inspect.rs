#[derive(Debug, Serialize)]
struct AgentListResponse {
    schema_version: String,
    agents: Vec<AgentSnapshot>,
}

async fn list_agents(State(state): State<AppState>) -> Json<AgentListResponse> {
    let engine = state.inner.lock().await;
    Json(AgentListResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        agents: engine.agents(),
    })
}

async fn get_agent(
    Path(agent_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AgentSnapshot>, HttpApiError> {
    let engine = state.inner.lock().await;
    engine
        .agent(&agent_id)
        .map(Json)
        .ok_or_else(|| HttpApiError::agent_not_found(&agent_id))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    /// Minutes-since-epoch lower bound, inclusive.
    since: Option<u64>,
}

#[derive(Debug, Serialize)]
struct EventsResponse {
    schema_version: String,
    events: Vec<EventView>,
}

async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<EventsResponse> {
    let since = SimTime::from_minutes(query.since.unwrap_or(0));
    let engine = state.inner.lock().await;
    Json(EventsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        events: engine.events_since(since),
    })
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    schema_version: String,
    place_id: String,
    messages: Vec<ChatMessageView>,
}

async fn get_chat(
    Path(place_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ChatResponse>, HttpApiError> {
    let engine = state.inner.lock().await;
    if !engine.has_place(&place_id) {
        return Err(HttpApiError::place_not_found(&place_id));
    }
    Ok(Json(ChatResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        messages: engine.chat(&place_id),
        place_id,
    }))
}

async fn get_world(State(state): State<AppState>) -> Json<WorldSnapshot> {
    let engine = state.inner.lock().await;
    Json(engine.world_snapshot())
}
