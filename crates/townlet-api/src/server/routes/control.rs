#[derive(Debug, Serialize)]
struct RunControlResponse {
    schema_version: String,
    run_id: String,
    status: RunStatus,
    advanced_ticks: Option<u64>,
}

impl RunControlResponse {
    fn from_status(status: RunStatus, advanced_ticks: Option<u64>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: status.run_id.clone(),
            status,
            advanced_ticks,
        }
    }
}

async fn get_status(State(state): State<AppState>) -> Json<RunControlResponse> {
    let engine = state.inner.lock().await;
    Json(RunControlResponse::from_status(engine.status(), None))
}

async fn start_run(State(state): State<AppState>) -> Json<RunControlResponse> {
    let mut engine = state.inner.lock().await;
    let status = engine.start();
    Json(RunControlResponse::from_status(status, None))
}

async fn pause_run(State(state): State<AppState>) -> Json<RunControlResponse> {
    let mut engine = state.inner.lock().await;
    let status = engine.pause();
    Json(RunControlResponse::from_status(status, None))
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    steps: Option<u64>,
}

async fn step_run(
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Result<Json<RunControlResponse>, HttpApiError> {
    let steps = request.steps.unwrap_or(1);
    if steps == 0 {
        return Err(HttpApiError::invalid_query(
            "steps must be >= 1",
            Some("steps=0".to_string()),
        ));
    }

    let mut engine = state.inner.lock().await;
    let (status, ran) = engine.step(steps).await;
    Ok(Json(RunControlResponse::from_status(status, Some(ran))))
}

#[derive(Debug, Deserialize)]
struct RunToTickRequest {
    target_tick: u64,
}

async fn run_to_tick(
    State(state): State<AppState>,
    Json(request): Json<RunToTickRequest>,
) -> Json<RunControlResponse> {
    let mut engine = state.inner.lock().await;
    let (status, ran) = engine.run_to_tick(request.target_tick).await;
    Json(RunControlResponse::from_status(status, Some(ran)))
}
