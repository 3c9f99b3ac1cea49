//! Health check endpoints
//!
//! - /health, /healthz - Liveness check with the active store backend
//! - /version - Build information for deployment verification

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::{json_response, FullBody};
use crate::server::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always true while the process is serving
    pub healthy: bool,
    /// 'online' with MongoDB, 'degraded' on the in-memory store
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    /// Store backend (`mongodb` or `memory`)
    pub store: &'static str,
    pub mode: &'static str,
    pub region: String,
    pub timestamp: String,
}

pub fn build_health_response(state: &AppState) -> HealthResponse {
    let store = state.store.kind();
    HealthResponse {
        healthy: true,
        status: if store == "mongodb" { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        store,
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        region: state.args.region_name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle liveness check (/health, /healthz)
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, &build_health_response(state))
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    version: &'static str,
    commit: &'static str,
    commit_full: &'static str,
    build_time: &'static str,
    service: &'static str,
}

/// Handle version info (/version)
pub fn version_info() -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
            commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
            build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            service: "healthbot",
        },
    )
}
