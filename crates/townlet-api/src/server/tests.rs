use std::sync::Arc;

use super::*;
use contracts::{PersonaSpec, PlaceSpec, RunConfig, RunMode, Scenario, WorldBounds};
use townlet_core::{NullGateway, SerialGateway};

fn test_engine() -> EngineApi {
    let scenario = Scenario {
        bounds: WorldBounds {
            width: 100.0,
            height: 100.0,
        },
        places: vec![PlaceSpec {
            id: "square".to_string(),
            name: "Town Square".to_string(),
            x: 50.0,
            y: 50.0,
            radius: 10.0,
            description: String::new(),
        }],
        roster: vec![PersonaSpec {
            id: "ada".to_string(),
            name: "Ada".to_string(),
            age: 31,
            traits: Vec::new(),
            goals: Vec::new(),
            bio: String::new(),
            home_place: "square".to_string(),
            x: 50.0,
            y: 50.0,
        }],
    };
    let gateway = Arc::new(SerialGateway::new(Box::new(NullGateway)));
    EngineApi::new(RunConfig::default(), &scenario, gateway).expect("valid scenario")
}

#[tokio::test]
async fn control_endpoints_drive_the_run() {
    let mut engine = test_engine();
    engine.init().await;
    assert_eq!(engine.status().mode, RunMode::Paused);

    engine.start();
    let (status, ran) = engine.step(3).await;
    assert_eq!(ran, 3);
    assert_eq!(status.current_tick, 3);

    engine.pause();
    let (_, ran) = engine.step(3).await;
    assert_eq!(ran, 0);
}

#[tokio::test]
async fn inspect_endpoints_report_roster_and_places() {
    let mut engine = test_engine();
    engine.init().await;
    engine.start();
    engine.step(1).await;

    assert_eq!(engine.agents().len(), 1);
    assert!(engine.agent("ada").is_some());
    assert!(engine.agent("nobody").is_none());
    assert!(engine.has_place("square"));
    assert!(!engine.has_place("mall"));
    assert!(engine.chat("square").is_empty());
}

#[tokio::test]
async fn run_to_tick_reports_executed_ticks() {
    let mut engine = test_engine();
    engine.init().await;
    engine.start();
    let (status, ran) = engine.run_to_tick(5).await;
    assert_eq!(ran, 5);
    assert_eq!(status.current_tick, 5);
    // Already there: nothing more to do.
    let (_, ran) = engine.run_to_tick(5).await;
    assert_eq!(ran, 0);
}

#[test]
fn error_bodies_carry_machine_readable_codes() {
    let err = HttpApiError::agent_not_found("ghost");
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.error.code, ErrorCode::AgentNotFound);
    assert_eq!(err.error.details.as_deref(), Some("agent_id=ghost"));
}
