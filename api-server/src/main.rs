use std::sync::{Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use maze_core::{
    Action, EnvConfig, EnvironmentController, EpisodeState, MazeError, Observation, Transition,
};
use serde::{Deserialize, Serialize};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// One controller per process; handlers take turns through the mutex.
struct AppState {
    controller: Mutex<EnvironmentController>,
}

impl AppState {
    fn lock(&self) -> Result<MutexGuard<'_, EnvironmentController>, HttpResponse> {
        self.controller.lock().map_err(|_| {
            tracing::error!("Environment lock poisoned");
            HttpResponse::InternalServerError().json(ErrorResponse::new("environment unavailable"))
        })
    }
}

// Request/Response types

#[derive(Debug, Default, Deserialize)]
struct ResetRequest {
    #[serde(default)]
    seed: Option<u32>,
}

/// An action given either by name ("up") or by index (0).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActionInput {
    Index(u8),
    Name(String),
}

impl ActionInput {
    fn resolve(&self) -> Result<Action, String> {
        match self {
            ActionInput::Index(i) => Action::try_from(*i).map_err(|e| e.to_string()),
            ActionInput::Name(name) => name.parse(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MazeQuery {
    seed: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    action: ActionInput,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    success: bool,
    observation: Observation,
    state: EpisodeState,
}

#[derive(Debug, Serialize)]
struct StepResponse {
    success: bool,
    transition: Transition,
    state: EpisodeState,
}

#[derive(Debug, Serialize)]
struct MazeResponse {
    success: bool,
    seed: u32,
    matrix: Vec<Vec<u8>>,
}

fn error_response(e: &MazeError) -> HttpResponse {
    match e {
        MazeError::InvalidStateTransition { .. } => {
            HttpResponse::Conflict().json(ErrorResponse::new(e.to_string()))
        }
        _ => HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())),
    }
}

// API Handlers

/// POST /api/reset
/// Start a new episode, optionally from a fixed seed
async fn reset(state: web::Data<AppState>, req: web::Json<ResetRequest>) -> impl Responder {
    tracing::info!("Received reset request (seed: {:?})", req.seed);

    let mut controller = match state.lock() {
        Ok(controller) => controller,
        Err(response) => return response,
    };

    match controller.reset(req.seed) {
        Ok(observation) => HttpResponse::Ok().json(ResetResponse {
            success: true,
            observation,
            state: *controller.state(),
        }),
        Err(e) => {
            tracing::warn!("Reset failed: {}", e);
            error_response(&e)
        }
    }
}

/// POST /api/step
/// Apply one action to the current episode
async fn step(state: web::Data<AppState>, req: web::Json<StepRequest>) -> impl Responder {
    let action = match req.action.resolve() {
        Ok(action) => action,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(e)),
    };

    let mut controller = match state.lock() {
        Ok(controller) => controller,
        Err(response) => return response,
    };

    match controller.step(action) {
        Ok(transition) => HttpResponse::Ok().json(StepResponse {
            success: true,
            transition,
            state: *controller.state(),
        }),
        Err(e) => {
            tracing::warn!("Step rejected: {}", e);
            error_response(&e)
        }
    }
}

/// GET /api/render
/// Snapshot of the current grid and agent
async fn render(state: web::Data<AppState>) -> impl Responder {
    match state.lock() {
        Ok(controller) => HttpResponse::Ok().json(controller.render()),
        Err(response) => response,
    }
}

/// GET /maze/{size}?seed=
/// Fresh maze matrix for the browser canvas; does not touch the running episode
async fn maze(
    state: web::Data<AppState>,
    path: web::Path<usize>,
    query: web::Query<MazeQuery>,
) -> impl Responder {
    let size = path.into_inner();
    let config = match state.lock() {
        Ok(controller) => EnvConfig {
            size,
            seed: None,
            ..controller.config().clone()
        },
        Err(response) => return response,
    };

    if let Err(e) = config.validate() {
        return error_response(&e);
    }

    match host::generate_maze(&config, query.seed) {
        Ok(snapshot) => {
            tracing::info!("Generated {}x{} maze (seed: {})", size, size, snapshot.seed);
            HttpResponse::Ok().json(MazeResponse {
                success: true,
                seed: snapshot.seed,
                matrix: snapshot.matrix,
            })
        }
        Err(e) => {
            tracing::warn!("Maze generation failed: {:#}", e);
            HttpResponse::BadRequest().json(ErrorResponse::new(format!("{:#}", e)))
        }
    }
}

/// GET /health
/// Health check endpoint
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "coin-maze-api"
    }))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/reset", web::post().to(reset))
        .route("/api/step", web::post().to(step))
        .route("/api/render", web::get().to(render))
        .route("/maze/{size}", web::get().to(maze));
}

fn load_env_config() -> std::io::Result<EnvConfig> {
    match std::env::var("COIN_MAZE_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading environment config from {}", path);
            host::load_config(&path).map_err(|e| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{:#}", e))
            })
        }
        Err(_) => Ok(EnvConfig::default()),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Coin Maze API Server");

    let config = load_env_config()?;
    let controller = EnvironmentController::new(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let state = web::Data::new(AppState {
        controller: Mutex::new(controller),
    });

    let bind_address =
        std::env::var("COIN_MAZE_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
    tracing::info!("Binding to {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(65_536))
            .configure(routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
