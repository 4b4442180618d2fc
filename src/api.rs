// API module for headless mode - HTTP endpoints an external renderer uses
// to read the colony and drive the tick.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::colony::{Obstacle, ScarcityZone};
use crate::config::SimulationConfig;
use crate::simulation::{Simulation, Stats};
use crate::types::Color;

// Serializable mirrors of the colony state for API responses.
#[derive(Serialize, Clone)]
pub struct HyphaData {
    pub id: u64,
    pub origin_x: f32,
    pub origin_y: f32,
    pub tip_x: f32,
    pub tip_y: f32,
    pub angle: f32,
    pub breed_id: usize,
    pub color: Color,
    pub alive: bool,
    pub branch_length: f32,
    /// The render geometry: every grid point the tip has passed through.
    pub drain_points: Vec<(i32, i32)>,
}

#[derive(Serialize, Clone)]
pub struct SporeData {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub breed_id: usize,
    pub color: Color,
    pub alive: bool,
    pub from_hypha: bool,
}

#[derive(Serialize, Clone)]
pub struct ColonyStateResponse {
    pub hyphae: Vec<HyphaData>,
    pub spores: Vec<SporeData>,
    pub obstacles: Vec<Obstacle>,
    pub scarcities: Vec<ScarcityZone>,
    pub stats: Stats,
}

#[derive(Deserialize)]
pub struct StepQuery {
    pub steps: Option<usize>,
}

#[derive(Deserialize)]
pub struct SpawnRequest {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub breed: usize,
}

// Shared state for the API server
#[derive(Clone)]
pub struct ApiState {
    pub simulation: Arc<Mutex<Simulation>>,
    pub rng: Arc<Mutex<StdRng>>,
}

impl ApiState {
    pub fn new(sim: Simulation) -> Self {
        Self::with_rng(sim, StdRng::from_entropy())
    }

    pub fn with_rng(sim: Simulation, rng: StdRng) -> Self {
        Self {
            simulation: Arc::new(Mutex::new(sim)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

fn colony_to_response(sim: &Simulation) -> ColonyStateResponse {
    ColonyStateResponse {
        hyphae: sim
            .fungi
            .hyphae()
            .iter()
            .map(|h| HyphaData {
                id: h.id,
                origin_x: h.origin_x,
                origin_y: h.origin_y,
                tip_x: h.tip_x,
                tip_y: h.tip_y,
                angle: h.angle,
                breed_id: h.breed_id,
                color: h.color,
                alive: h.alive,
                branch_length: h.branch_length(),
                drain_points: h.drain_points.clone(),
            })
            .collect(),
        spores: sim
            .fungi
            .spores()
            .iter()
            .map(|s| SporeData {
                id: s.id,
                x: s.origin_x,
                y: s.origin_y,
                breed_id: s.breed_id,
                color: s.color,
                alive: s.alive,
                from_hypha: s.from_hypha,
            })
            .collect(),
        obstacles: sim.fungi.obstacles().to_vec(),
        scarcities: sim.fungi.scarcities().to_vec(),
        stats: sim.stats(),
    }
}

// GET /state - Get current colony state
async fn get_state(
    State(api_state): State<ApiState>,
) -> Result<Json<ColonyStateResponse>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(colony_to_response(&sim)))
}

// GET /stats - Get colony statistics
async fn get_stats(State(api_state): State<ApiState>) -> Result<Json<Stats>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(sim.stats()))
}

// POST /step - Step the simulation forward
async fn step_simulation(
    Query(params): Query<StepQuery>,
    State(api_state): State<ApiState>,
) -> Result<Json<ColonyStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let steps = params.steps.unwrap_or(1);
    for _ in 0..steps {
        sim.step(&mut *rng)
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    Ok(Json(colony_to_response(&sim)))
}

// POST /reset - Reset the simulation
async fn reset_simulation(
    State(api_state): State<ApiState>,
) -> Result<Json<ColonyStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    sim.reset(&mut *rng)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(colony_to_response(&sim)))
}

// POST /pause - Toggle pause
async fn pause_simulation(
    State(api_state): State<ApiState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    sim.toggle_pause();
    Ok(Json(serde_json::json!({ "paused": sim.paused })))
}

// GET /config - Get simulation configuration
async fn get_config(
    State(api_state): State<ApiState>,
) -> Result<Json<SimulationConfig>, StatusCode> {
    let sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(sim.config.clone()))
}

// POST /spawn/spore - Seed a root spore at a position
async fn spawn_spore(
    State(api_state): State<ApiState>,
    Json(req): Json<SpawnRequest>,
) -> Result<Json<ColonyStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    sim.spawn_spore_at(req.x, req.y, req.breed)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(colony_to_response(&sim)))
}

// POST /spawn/hypha - Start a hypha at a position
async fn spawn_hypha(
    State(api_state): State<ApiState>,
    Json(req): Json<SpawnRequest>,
) -> Result<Json<ColonyStateResponse>, StatusCode> {
    let mut sim = api_state
        .simulation
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let mut rng = api_state
        .rng
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    sim.spawn_hypha_at(&mut *rng, req.x, req.y, req.breed)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok(Json(colony_to_response(&sim)))
}

// Create the API router
pub fn create_router(api_state: ApiState) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/stats", get(get_stats))
        .route("/step", post(step_simulation))
        .route("/reset", post(reset_simulation))
        .route("/pause", post(pause_simulation))
        .route("/config", get(get_config))
        .route("/spawn/spore", post(spawn_spore))
        .route("/spawn/hypha", post(spawn_hypha))
        .layer(CorsLayer::permissive())
        .with_state(api_state)
}

// Run the API server with automatic simulation stepping
pub async fn run_server(
    api_state: ApiState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(api_state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!(port, "mycelia headless API server running");
    tracing::info!("GET /state, GET /stats, POST /step?steps=N, POST /reset, POST /pause, GET /config, POST /spawn/spore, POST /spawn/hypha");

    // Background task that continuously steps the colony
    let simulation_task = tokio::spawn(simulation_loop(api_state.clone()));

    let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    tokio::select! {
        result = server_handle => {
            result??;
        }
        _ = simulation_task => {
            tracing::error!("simulation loop ended unexpectedly");
        }
    }

    Ok(())
}

// Steps the colony at a fixed cadence while the server handles requests.
async fn simulation_loop(api_state: ApiState) {
    const TARGET_FPS: f32 = 60.0;
    let frame_duration = std::time::Duration::from_secs_f32(1.0 / TARGET_FPS);

    loop {
        let start = std::time::Instant::now();

        {
            let mut sim = match api_state.simulation.lock() {
                Ok(sim) => sim,
                Err(_) => break,
            };

            if !sim.paused {
                let mut rng = match api_state.rng.lock() {
                    Ok(rng) => rng,
                    Err(_) => break,
                };
                if let Err(e) = sim.step(&mut *rng) {
                    tracing::error!(error = %e, "tick failed");
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        if elapsed < frame_duration {
            tokio::time::sleep(frame_duration - elapsed).await;
        }
    }
}
