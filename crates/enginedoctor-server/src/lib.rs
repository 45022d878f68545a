//! HTTP diagnosis server.
//!
//! Clients that already hold decoded audio (a phone app, a browser page)
//! POST the samples as JSON and get the turbulence scores and health label
//! back. Decoding stays on the client; the server only runs the pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use enginedoctor_core::presentation::{DEFAULT_DECIMATION, WaveformPreview};
use enginedoctor_core::{
    ChunkScore, DiagnosticParams, DiagnosticResult, Waveform, compute_breakdown,
};

/// Largest accepted request, in interleaved samples.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000_000;

/// Sample rate assumed when a request does not name one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Bytes of JSON budgeted per sample when sizing the body limit.
const BYTES_PER_SAMPLE: usize = 24;

/// Server settings fixed at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Parameters used when a request does not bring its own.
    pub params: DiagnosticParams,
    pub max_samples: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            params: DiagnosticParams::default(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Shared server state.
struct AppState {
    config: ServerConfig,
    diagnoses: AtomicU64,
}

#[derive(Deserialize)]
struct DiagnoseRequest {
    /// Interleaved samples, roughly in `[-1, 1]`.
    samples: Vec<f64>,
    channels: Option<usize>,
    sample_rate: Option<u32>,
    /// Replaces the server's parameters for this request.
    params: Option<DiagnosticParams>,
    /// Include the per-chunk scores.
    #[serde(default)]
    detailed: bool,
    /// Include a decimated waveform for plotting.
    #[serde(default)]
    preview: bool,
}

#[derive(Serialize)]
struct DiagnoseResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<DiagnosticResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headline: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnosis: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BreakdownSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<Vec<ChunkScore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<WaveformPreview>,
    /// Error message if request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DiagnoseResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            headline: None,
            diagnosis: None,
            summary: None,
            chunks: None,
            preview: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct BreakdownSummary {
    sample_count: usize,
    sample_rate: u32,
    duration_secs: f64,
    chunk_size: usize,
    scored_chunks: usize,
    discarded_samples: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: &'static str,
    diagnoses: u64,
}

trait JsonWithStatus<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>);
}

impl<T> JsonWithStatus<T> for Json<T> {
    fn with_status(self, status: StatusCode) -> (StatusCode, Json<T>) {
        (status, self)
    }
}

async fn handle_diagnose(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> (StatusCode, Json<DiagnoseResponse>) {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => {
            return Json(DiagnoseResponse::failure(rejection.body_text()))
                .with_status(rejection.status());
        }
    };

    if req.samples.len() > state.config.max_samples {
        let msg = format!(
            "{} samples exceeds the limit of {}",
            req.samples.len(),
            state.config.max_samples
        );
        return Json(DiagnoseResponse::failure(msg)).with_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    let params = req.params.unwrap_or_else(|| state.config.params.clone());
    if let Err(e) = params.validate() {
        return Json(DiagnoseResponse::failure(e.to_string())).with_status(StatusCode::BAD_REQUEST);
    }

    let channels = req.channels.unwrap_or(1).max(1);
    let sample_rate = req.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
    let samples = req.samples;
    let (detailed, preview) = (req.detailed, req.preview);

    // The FFT work is CPU-bound; keep it off the async workers.
    let job = tokio::task::spawn_blocking(move || {
        let waveform = Waveform::from_interleaved(&samples, channels, sample_rate);
        let breakdown = compute_breakdown(&waveform, &params);
        let preview = preview.then(|| WaveformPreview::new(&waveform, DEFAULT_DECIMATION));
        (waveform.duration_secs(), breakdown, preview)
    });
    let (duration_secs, breakdown, preview) = match job.await {
        Ok(out) => out,
        Err(e) => {
            log::error!("diagnosis task failed: {e}");
            return Json(DiagnoseResponse::failure("diagnosis failed"))
                .with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    state.diagnoses.fetch_add(1, Ordering::Relaxed);
    let result = breakdown.result;
    log::info!(
        "diagnosed {} samples @ {sample_rate} Hz: {} (turbulence {:.3})",
        breakdown.sample_count,
        result.label,
        result.turbulence_variance
    );

    let summary = BreakdownSummary {
        sample_count: breakdown.sample_count,
        sample_rate,
        duration_secs,
        chunk_size: breakdown.chunk_size,
        scored_chunks: breakdown.scored_chunks(),
        discarded_samples: breakdown.discarded_samples,
    };

    (
        StatusCode::OK,
        Json(DiagnoseResponse {
            success: true,
            result: Some(result),
            headline: Some(result.label.headline()),
            diagnosis: Some(result.label.diagnosis()),
            summary: Some(summary),
            chunks: detailed.then_some(breakdown.chunks),
            preview,
            error: None,
        }),
    )
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: enginedoctor_core::VERSION,
        diagnoses: state.diagnoses.load(Ordering::Relaxed),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let params = &state.config.params;
    Json(serde_json::json!({
        "name": "Engine Doctor Server",
        "version": enginedoctor_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/api/v1/diagnose": {
                "method": "POST",
                "description": "Score a recording for rhythmic turbulence",
                "body": {
                    "samples": "Interleaved samples in [-1, 1] (required)",
                    "channels": "Interleaved channel count (default: 1)",
                    "sample_rate": format!("Hz (default: {DEFAULT_SAMPLE_RATE})"),
                    "params": "Override diagnostic parameters for this request",
                    "detailed": "Include per-chunk scores (default: false)",
                    "preview": "Include a decimated waveform (default: false)",
                },
                "max_samples": state.config.max_samples,
            },
            "/health": "Health check",
        },
        "params": params,
    }))
}

/// Build the axum router.
pub fn build_router(config: ServerConfig) -> Router {
    let body_limit = config.max_samples.saturating_mul(BYTES_PER_SAMPLE);
    let state = Arc::new(AppState {
        config,
        diagnoses: AtomicU64::new(0),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/diagnose", post(handle_diagnose))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the HTTP diagnosis server until the process exits.
pub async fn run_server(config: ServerConfig, host: &str, port: u16) -> std::io::Result<()> {
    config.params.validate()?;
    let app = build_router(config);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/diagnose")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn steady_tone() -> Vec<f64> {
        enginedoctor_core::synth::sine(44100, 44100, 440.0, 0.5).samples
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, json) = get_json(build_router(ServerConfig::default()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["diagnoses"], 0);
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let (status, json) = get_json(build_router(ServerConfig::default()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["endpoints"]["/api/v1/diagnose"].is_object());
        assert_eq!(json["params"]["chunk_count"], 20);
    }

    #[tokio::test]
    async fn test_diagnose_steady_tone() {
        let app = build_router(ServerConfig::default());
        let (status, json) = post_json(
            app,
            serde_json::json!({ "samples": steady_tone(), "sample_rate": 44100 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["label"], "HEALTHY");
        assert_eq!(json["headline"], "HEALTHY ENGINE");
        assert_eq!(json["summary"]["scored_chunks"], 20);
        assert!(json.get("chunks").is_none());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_diagnose_detailed_with_preview() {
        let app = build_router(ServerConfig::default());
        let (status, json) = post_json(
            app,
            serde_json::json!({ "samples": steady_tone(), "detailed": true, "preview": true }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["chunks"].as_array().unwrap().len(), 20);
        assert_eq!(json["preview"]["points"].as_array().unwrap().len(), 882);
    }

    #[tokio::test]
    async fn test_empty_recording_is_sentinel() {
        let app = build_router(ServerConfig::default());
        let (status, json) = post_json(app, serde_json::json!({ "samples": [] })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"]["turbulence_variance"], 0.0);
        assert_eq!(json["result"]["average_intensity"], 0.0);
        assert_eq!(json["result"]["label"], "HEALTHY");
        assert_eq!(json["summary"]["scored_chunks"], 0);
    }

    #[tokio::test]
    async fn test_stereo_is_folded() {
        let stereo: Vec<f64> = steady_tone().into_iter().flat_map(|s| [s, s]).collect();
        let app = build_router(ServerConfig::default());
        let (status, json) =
            post_json(app, serde_json::json!({ "samples": stereo, "channels": 2 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["sample_count"], 44100);
    }

    #[tokio::test]
    async fn test_request_params_override() {
        let app = build_router(ServerConfig::default());
        let noise = enginedoctor_core::synth::noise(44100, 44100, 0.5, 4).samples;
        let (status, json) = post_json(
            app,
            serde_json::json!({
                "samples": noise,
                "params": { "thresholds": { "warning": 0.0, "critical": 0.0 } },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"]["label"], "CRITICAL");
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        let app = build_router(ServerConfig::default());
        let (status, json) = post_json(
            app,
            serde_json::json!({
                "samples": [0.0, 0.1],
                "params": { "thresholds": { "warning": 0.5, "critical": 0.1 } },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_too_many_samples() {
        let app = build_router(ServerConfig {
            max_samples: 100,
            ..ServerConfig::default()
        });
        let (status, json) =
            post_json(app, serde_json::json!({ "samples": vec![0.0; 101] })).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = build_router(ServerConfig::default());
        let (status, json) = post_json(app, serde_json::json!({ "channels": 2 })).await;

        assert!(status.is_client_error());
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }
}
