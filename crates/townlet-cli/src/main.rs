use std::env;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use contracts::{RunConfig, Scenario};
use townlet_api::{serve, EngineApi};
use townlet_core::{DecisionGateway, HttpGateway, NullGateway, SerialGateway};
use tracing::info;

fn print_usage() {
    println!("townlet-cli <command>");
    println!("commands:");
    println!("  simulate <scenario.json> [ticks]");
    println!("    runs offline to the target tick and prints the final status");
    println!("  serve <scenario.json> [addr] [tick_delay_ms]");
    println!("    default addr: 127.0.0.1:8080");
    println!("env:");
    println!("  TOWNLET_LLM_URL / TOWNLET_LLM_MODEL / TOWNLET_LLM_KEY  gateway endpoint");
    println!("  TOWNLET_CONFIG  optional RunConfig json path");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn load_scenario(args: &[String]) -> Result<Scenario, String> {
    let path = args
        .get(2)
        .ok_or_else(|| "missing scenario path".to_string())?;
    let raw = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).map_err(|err| format!("invalid scenario {path}: {err}"))?;
    scenario
        .validate()
        .map_err(|err| format!("invalid scenario {path}: {err}"))?;
    Ok(scenario)
}

fn load_config() -> Result<RunConfig, String> {
    let Some(path) = env::var("TOWNLET_CONFIG")
        .ok()
        .filter(|value| !value.trim().is_empty())
    else {
        return Ok(RunConfig::default());
    };
    let raw = fs::read_to_string(&path).map_err(|err| format!("cannot read {path}: {err}"))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid config {path}: {err}"))
}

fn build_gateway() -> Arc<SerialGateway> {
    let backend: Box<dyn DecisionGateway> = match HttpGateway::from_env() {
        Some(gateway) => {
            info!("using http decision gateway from environment");
            Box::new(gateway)
        }
        None => {
            info!("no gateway endpoint configured, agents run on fallbacks only");
            Box::new(NullGateway)
        }
    };
    Arc::new(SerialGateway::new(backend))
}

async fn build_engine(args: &[String]) -> Result<EngineApi, String> {
    let scenario = load_scenario(args)?;
    let config = load_config()?;
    let mut engine = EngineApi::new(config, &scenario, build_gateway())
        .map_err(|err| format!("scenario rejected: {err}"))?;
    engine.init().await;
    Ok(engine)
}

async fn run_simulate(args: &[String]) -> Result<(), String> {
    let mut engine = build_engine(args).await?;
    let target_tick = args
        .get(3)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid ticks: {value}"))
        })
        .transpose()?
        .unwrap_or_else(|| engine.status().max_ticks);

    engine.start();
    let (status, ran) = engine.run_to_tick(target_tick).await;
    println!("simulated ticks={ran} {status}");
    for event in engine.events_since(contracts::SimTime::from_minutes(0)) {
        println!("[{}] {} {}", event.time.hhmm(), event.place, event.text);
    }
    Ok(())
}

async fn run_serve(args: &[String]) -> Result<(), String> {
    let engine = build_engine(args).await?;
    let addr = parse_socket_addr(args.get(3))?;
    let tick_delay_ms = args
        .get(4)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| format!("invalid tick_delay_ms: {value}"))
        })
        .transpose()?;

    // Wall-clock pacing is a CLI concern: with a delay configured the run
    // advances itself while started, instead of waiting for step requests.
    if let Some(delay_ms) = tick_delay_ms {
        info!(delay_ms, "serving with self-paced ticks");
        let engine = Arc::new(tokio::sync::Mutex::new(engine));
        let pacer = Arc::clone(&engine);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                let mut engine = pacer.lock().await;
                engine.step(1).await;
            }
        });
        println!("serving api on http://{addr}");
        return townlet_api::serve_shared(addr, engine)
            .await
            .map_err(|err| format!("server error: {err}"));
    }

    println!("serving api on http://{addr}");
    serve(addr, engine)
        .await
        .map_err(|err| format!("server error: {err}"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("simulate") => {
            if let Err(err) = run_simulate(&args).await {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        Some("serve") => {
            if let Err(err) = run_serve(&args).await {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
        _ => {
            print_usage();
        }
    }
}
