//! Liveness endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::HttpState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

pub async fn healthcheck(State(state): State<HttpState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "up".to_string(),
        version: state.version.to_string(),
    })
}
