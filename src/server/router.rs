use axum::extract::{Query, State};
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use capture_plan::CapturePlan;

use crate::errors::CaptureError;
use crate::metrics;

use super::state::ServeState;

pub fn build_router(state: ServeState) -> Router {
    Router::new()
        .route("/", get(capture_handler))
        .route("/capture", get(capture_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct CaptureQuery {
    url: Option<String>,
}

async fn capture_handler(
    State(state): State<ServeState>,
    Query(query): Query<CaptureQuery>,
) -> Result<&'static str, CaptureError> {
    let raw_url = query.url.unwrap_or_default();
    let plan = CapturePlan::build(&raw_url, Utc::now())?;

    info!(url = %plan.canonical_url, prefix = %plan.storage_key_prefix, "capture requested");
    let subject = capture_plan::sanitize_url(&plan.canonical_url);
    let actor = state.registry.get_or_spawn(&subject);
    actor.capture(plan).await?;

    Ok("success")
}

async fn health_handler(State(state): State<ServeState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "actors": state.registry.len(),
    }))
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::register_metrics();
    let registry = metrics::global_registry();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&registry.gather(), &mut buffer) {
        error!(?err, "failed to encode prometheus metrics");
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "metric encode error",
        )
            .into_response();
    }

    match String::from_utf8(buffer) {
        Ok(body) => match axum::http::HeaderValue::from_str(encoder.format_type()) {
            Ok(content_type) => {
                ([(axum::http::header::CONTENT_TYPE, content_type)], body).into_response()
            }
            Err(err) => {
                error!(?err, "failed to build content-type header for metrics");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "metric header error",
                )
                    .into_response()
            }
        },
        Err(err) => {
            error!(?err, "prometheus metrics were not valid utf-8");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "metric encode error",
            )
                .into_response()
        }
    }
}
