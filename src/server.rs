//! HTTP surface — Axum server exposing the auction report.
//!
//! One read endpoint plus a health probe. CORS is enabled for GETs so
//! browser dashboards can consume the report directly. Failures reach
//! the caller as a generic 500; full detail goes to the log only.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::report::AuctionReportService;
use crate::types::ScoutError;

const DEFAULT_LIMIT: u32 = 20;

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub service: AuctionReportService,
}

pub type AppState = Arc<ServerState>;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/auctions", get(get_auctions))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> Result<(), ScoutError> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ScoutError::Upstream(format!("bind {addr}: {e}")))?;
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| ScoutError::Upstream(format!("server: {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuctionQuery {
    /// How many open auctions to retrieve upstream — not a cap on the
    /// filtered result count.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Minimum profitability margin in percent.
    #[serde(rename = "minMargin", default)]
    pub min_margin: Decimal,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// GET /auctions?limit=<N>&minMargin=<pct>
pub async fn get_auctions(
    State(state): State<AppState>,
    Query(query): Query<AuctionQuery>,
) -> Response {
    if query.limit == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "limit must be a positive integer",
            }),
        )
            .into_response();
    }
    if query.min_margin < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "minMargin must be non-negative",
            }),
        )
            .into_response();
    }

    match state
        .service
        .build_report(query.limit, query.min_margin)
        .await
    {
        Ok(records) => {
            info!(results = records.len(), limit = query.limit, "report served");
            Json(records).into_response()
        }
        Err(e) => {
            // Never leak internal detail to the caller.
            error!(error = %e, "auction report failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal server error",
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
