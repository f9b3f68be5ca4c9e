//! HTTP server for lesion classification.

use crate::config::ServerConfig;
use crate::predict::{
    ErrorResponse, GENERIC_FAILURE, PredictResponse, SharedPredictor, build_predictor,
    public_message, source_from_upload,
};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use lesion_classifier::core::{ErrorKind, ValidationError};
use lesion_classifier::utils::unique_upload_name;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// URL prefix stored uploads are served under.
const UPLOAD_URL_PREFIX: &str = "static/uploads";

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Application state shared across handlers
struct AppState {
    predictor: SharedPredictor,
    upload_dir: PathBuf,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    info!("Loading classifier from {}...", config.classifier.model.display());
    let predictor = Arc::new(build_predictor(&config.classifier)?);
    info!(
        classifier = predictor.classifier().name(),
        "Classifier loaded successfully"
    );

    let app = build_router(predictor, config.upload_dir.clone(), config.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                - Service banner");
    info!("  POST /predict         - Classify an uploaded image");
    info!("  POST /api/v1/predict  - Classify an uploaded image (versioned API)");
    info!("  GET  /api/health      - Health check");
    info!("  GET  /static/uploads/ - Stored uploads");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn build_router(predictor: SharedPredictor, upload_dir: PathBuf, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState {
        predictor,
        upload_dir: upload_dir.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/predict", post(predict_handler))
        .route("/api/v1/predict", post(predict_handler))
        .route("/api/health", get(health_handler))
        .nest_service(&format!("/{UPLOAD_URL_PREFIX}"), ServeDir::new(upload_dir))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler() -> &'static str {
    "Skin lesion classifier. POST an image as multipart field 'image' to /predict."
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Page not found")
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Upload and classification endpoint
async fn predict_handler(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    // (declared filename, contents) of the first part named `image` that is a file
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Malformed multipart body");
                return error_response(e.status(), e.body_text());
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some((filename, bytes.to_vec()));
                break;
            }
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "Failed to read upload");
                return error_response(e.status(), e.body_text());
            }
        }
    }

    let source = match upload {
        Some((filename, bytes)) => source_from_upload(Some(&filename), bytes),
        None => Err(ValidationError::MissingFile),
    };
    let source = match source {
        Ok(source) => source,
        Err(e) => {
            info!(request_id = %request_id, reason = %e, "Rejected upload");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let stored_name = unique_upload_name(source.filename());
    let stored_path = state.upload_dir.join(&stored_name);
    if let Err(e) = tokio::fs::write(&stored_path, source.bytes()).await {
        error!(request_id = %request_id, error = %e, "Failed to store upload");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE);
    }
    debug!(
        request_id = %request_id,
        path = %stored_path.display(),
        bytes = source.bytes().len(),
        "Stored upload"
    );

    let predictor = state.predictor.clone();
    let inference_start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || predictor.predict(&source)).await;
    let processing_ms = inference_start.elapsed().as_secs_f64() * 1000.0;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            let status = match e.kind() {
                ErrorKind::Client => StatusCode::BAD_REQUEST,
                ErrorKind::Server => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!(request_id = %request_id, error = %e, "Classification failed");
            return error_response(status, public_message(&e));
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Classification task panicked");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE);
        }
    };

    info!(
        request_id = %request_id,
        label = %result.label,
        confidence = %result.confidence,
        inference_ms = processing_ms,
        total_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Classification completed"
    );

    let image = format!("{UPLOAD_URL_PREFIX}/{stored_name}");
    let response = PredictResponse::from_result(&result, Some(image), processing_ms);
    (StatusCode::OK, Json(response)).into_response()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
