use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::error;

use crate::models::{PlatformInfo, VisitCountResponse, VisitErrorResponse};
use crate::visit::{extract_client_identity, VisitService};

pub struct AppState {
    pub visits: VisitService,
    pub platform_name: String,
}

/// Count this page load (once per identity per window) and classify the device
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<VisitCountResponse>, (StatusCode, Json<VisitErrorResponse>)> {
    let identity = extract_client_identity(&headers);

    match state.visits.handle_visit(&identity).await {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(e) => {
            // Details stay in the log; the page just shows a zero count
            error!(ip = %identity.ip, error = %e, "Database error while counting visit");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VisitErrorResponse {
                    count: 0,
                    error: "Database error".to_string(),
                }),
            ))
        }
    }
}

/// Liveness probe naming the hosting platform
pub async fn platform_info(State(state): State<Arc<AppState>>) -> Json<PlatformInfo> {
    Json(PlatformInfo {
        name: state.platform_name.clone(),
    })
}
