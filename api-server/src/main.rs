//! Rockfall Prediction API Server
//!
//! Demo prediction service plus the monitoring dashboard aggregator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ROCKFALL API                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │ Predict   │  │ Sensor        │  │ Dashboard           │ │
//! │  │ (binary + │  │ Simulation    │  │ (/api/latest,       │ │
//! │  │  multi)   │  │               │  │  /api/history)      │ │
//! │  └─────┬─────┘  └───────┬───────┘  └──────────┬──────────┘ │
//! │        └────────────────┼─────────────────────┘             │
//! │                         ▼                                   │
//! │                ┌─────────────────┐                          │
//! │                │ ModelRegistry   │                          │
//! │                └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod history;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use rockfall_core::logic::model::{ConfidenceOverride, ModelRegistry, RiskClassifier};
use rockfall_core::logic::response::{PredictionResponseBuilder, ResponseProfile};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use history::HistoryBuffer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "rockfall_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Rockfall API starting ({})...", config.environment);
    tracing::info!("Model directory: {}", config.model_dir.display());

    // Load model artifacts; missing ones leave their slot empty
    let registry = Arc::new(ModelRegistry::load_from_dir(&config.model_dir));
    let status = registry.status();
    tracing::info!(
        binary = status.binary_model.loaded,
        multiclass = status.multiclass_model.loaded,
        label_encoder = status.label_encoder.loaded,
        "Model registry initialised"
    );
    if !status.binary_model.loaded {
        tracing::warn!(
            "Binary model not loaded: {}",
            status.binary_model.reason.as_deref().unwrap_or("unknown")
        );
    }

    let state = AppState::new(config.clone(), Arc::clone(&registry))?;
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.unload();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down...");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub registry: Arc<ModelRegistry>,
    pub classifier: Arc<RiskClassifier>,
    pub sensitive: Arc<PredictionResponseBuilder>,
    pub conservative: Arc<PredictionResponseBuilder>,
    pub history: Arc<HistoryBuffer>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: config::Config, registry: Arc<ModelRegistry>) -> anyhow::Result<Self> {
        let classifier = RiskClassifier::new(Arc::clone(&registry)).with_override(ConfidenceOverride::from_env());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self {
            history: Arc::new(HistoryBuffer::new(config.history_capacity)),
            config,
            registry,
            classifier: Arc::new(classifier),
            sensitive: Arc::new(PredictionResponseBuilder::new(ResponseProfile::sensitive())),
            conservative: Arc::new(PredictionResponseBuilder::new(ResponseProfile::conservative())),
            http,
        })
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Prediction service
    let prediction_routes = Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/simulate-sensor-data", get(handlers::sensors::simulate))
        .route("/predict-rockfall", post(handlers::predict::predict_rockfall))
        .route("/predict", post(handlers::predict::predict))
        .route("/simulate-and-predict", get(handlers::predict::simulate_and_predict));

    // Dashboard aggregator
    let dashboard_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::page))
        .route("/api/latest", get(handlers::dashboard::latest))
        .route("/api/history", get(handlers::dashboard::history));

    // Combine all routes
    Router::new()
        .merge(prediction_routes)
        .merge(dashboard_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
