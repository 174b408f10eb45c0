#[derive(Clone)]
struct AppState {
    inner: Arc<Mutex<EngineApi>>,
}

impl AppState {
    fn new(engine: EngineApi) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }
}
