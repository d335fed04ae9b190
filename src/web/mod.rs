mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::Result;
use axum::body::Body;
use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    commands::PointerEvent,
    engine::{EngineBuilder, EngineSettings},
    rules::{AirImprovementRule, DegradationRule, FactoryRule, GrowthRule, SeedGenerationRule},
    scenario::{GrowthMode, Scenario},
    world::{GameStatus, WorldEvent, WorldSnapshot},
};

/// Real-time slice the simulation thread advances per iteration.
const STEP_MS: u64 = 100;

#[derive(Clone, Serialize)]
pub struct UiFrame {
    pub snapshot: WorldSnapshot,
    pub events: Vec<WorldEvent>,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub frame: Option<UiFrame>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<UiFrame>>>,
    pointer_tx: mpsc::UnboundedSender<PointerEvent>,
    scenario_name: String,
    game_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub snapshot_interval_ms: u64,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        snapshot_interval_ms,
        snapshot_dir,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let mut world = scenario.build_world();
    let settings = EngineSettings {
        scenario_name: scenario_name.clone(),
        seed: scenario.seed,
        planting: scenario.planting.clone(),
        growth: scenario.growth.clone(),
        snapshot_interval_ms,
        snapshot_dir,
    };

    let mut builder = EngineBuilder::new(settings)
        .with_rule(SeedGenerationRule::new(
            scenario.rules.seed_generation_ms,
            scenario.rules.one_shot,
            scenario.growth.duration_ms,
        ))
        .with_rule(AirImprovementRule::new(scenario.rules.air_improvement_ms))
        .with_rule(DegradationRule::new(scenario.rules.degradation_ms));
    if scenario.growth.mode == GrowthMode::Ramp {
        builder.push_rule(GrowthRule::new(scenario.growth.step_ms));
    }
    if let Some(factory) = &scenario.rules.factory {
        builder.push_rule(FactoryRule::new(factory.clone()));
    }
    let mut engine = builder.build();

    let (pointer_tx, mut pointer_rx) = mpsc::unbounded_channel::<PointerEvent>();
    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<UiFrame>>> = Arc::new(Mutex::new(None));
    let game_done = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let done_for_sim = game_done.clone();
    let stop_for_sim = stop.clone();
    let tx_for_sim = tx.clone();
    let scenario_label = scenario_name.clone();

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        loop {
            if stop_for_sim.load(Ordering::SeqCst) {
                break;
            }
            while let Ok(event) = pointer_rx.try_recv() {
                engine.pointer(&mut world, &event);
            }
            engine.run_for(&mut world, STEP_MS)?;

            let completed = world.status() == GameStatus::GameOver;
            let frame = UiFrame {
                snapshot: world.snapshot(&scenario_label, engine.clock_ms()),
                events: world.drain_events(),
                completed,
            };
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
            if completed {
                done_for_sim.store(true, Ordering::SeqCst);
                info!("game over, simulation loop stopped");
                break;
            }
            std::thread::sleep(Duration::from_millis(STEP_MS));
        }
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        latest_frame: latest_frame.clone(),
        pointer_tx,
        scenario_name: scenario_name.clone(),
        game_done: game_done.clone(),
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(latest_state))
        .route("/api/pointer", post(pointer))
        .route("/api/events", get(stream_events))
        .route("/sprites/:name", get(sprite))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("invalid address");

    println!(
        "Urban harvest live at http://{}:{} (Ctrl+C to stop)",
        host, port
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    stop.store(true, Ordering::SeqCst);
    match sim_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!("simulation error: {err:?}"),
        Err(err) => error!("simulation task failed: {err:?}"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("Shutting down web UI...");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/css; charset=utf-8")
        .body(assets::STYLES_CSS.to_string())
        .unwrap()
}

async fn script() -> impl IntoResponse {
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )
        .body(assets::APP_JS.to_string())
        .unwrap()
}

async fn sprite(Path(name): Path<String>) -> Response {
    match assets::sprite(&name) {
        Some(bytes) => Response::builder()
            .header(header::CONTENT_TYPE, "image/svg+xml")
            .body(Body::from(Bytes::from_static(bytes)))
            .unwrap(),
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from(Bytes::from_static(b"")))
            .unwrap(),
    }
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = state
        .latest_frame
        .lock()
        .expect("latest frame lock poisoned")
        .clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        frame,
        completed: state.game_done.load(Ordering::SeqCst),
    })
}

async fn pointer(State(state): State<Arc<AppState>>, Json(event): Json<PointerEvent>) -> StatusCode {
    // Input into a finished game is a documented no-op, and the command
    // handler drops stale entity ids on its own; accept either way.
    if state.game_done.load(Ordering::SeqCst) {
        return StatusCode::ACCEPTED;
    }
    if state.pointer_tx.send(event).is_err() {
        warn!("simulation loop gone, dropping pointer event");
    }
    StatusCode::ACCEPTED
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
