//! API routes for the cfseeker server

use super::response::{ApiError, ApiResponse, ServerInfo};
use crate::error::{SeekerError, SeekerResult};
use crate::seeker::{
    CachedDeployment, ConvertOutput, ConvertRequest, FindOutput, FindRequest, Seeker,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Application state
pub struct AppState {
    pub seeker: Arc<Seeker>,
}

/// Query parameters for `GET /v1/apps`
#[derive(Debug, Default, Deserialize)]
pub struct FindQuery {
    pub app_guid: Option<String>,
    pub org_name: Option<String>,
    pub space_name: Option<String>,
    pub app_name: Option<String>,
}

/// Query parameters for `GET /v1/convert`
#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    pub guid: Option<String>,
    pub org_name: Option<String>,
    pub space_name: Option<String>,
    pub app_name: Option<String>,
}

pub(crate) const NO_BOSH_WARNING: &str = "BOSH is not configured; instances are not mapped to VMs";

/// Seeker calls block on HTTP, so they run off the async workers
async fn blocking<T, F>(seeker: &Arc<Seeker>, call: F) -> SeekerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Seeker) -> SeekerResult<T> + Send + 'static,
{
    let seeker = Arc::clone(seeker);
    tokio::task::spawn_blocking(move || call(&seeker))
        .await
        .map_err(|e| SeekerError::Internal(format!("worker task failed: {}", e)))?
}

/// Malformed query strings are input errors reported in the envelope
fn bad_query(rejection: QueryRejection) -> SeekerError {
    SeekerError::input(rejection.body_text())
}

/// `GET /v1/apps`
pub async fn find_apps(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FindQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<FindOutput>>, ApiError> {
    let Query(params) = query.map_err(bad_query)?;
    let request = FindRequest::from_parts(
        params.app_guid.as_deref(),
        params.org_name.as_deref(),
        params.space_name.as_deref(),
        params.app_name.as_deref(),
    )?;

    let output = blocking(&state.seeker, move |seeker| seeker.find(&request)).await?;
    let mut response = ApiResponse::contents(output);
    if !state.seeker.bosh_configured() {
        response = response.with_warning(NO_BOSH_WARNING);
    }
    Ok(Json(response))
}

/// `GET /v1/convert`
pub async fn convert(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ConvertOutput>>, ApiError> {
    let Query(params) = query.map_err(bad_query)?;
    let request = ConvertRequest::from_parts(
        params.guid.as_deref(),
        params.org_name.as_deref(),
        params.space_name.as_deref(),
        params.app_name.as_deref(),
    )?;

    let output = blocking(&state.seeker, move |seeker| seeker.convert(&request)).await?;
    Ok(Json(ApiResponse::contents(output)))
}

/// `DELETE /v1/cache/bosh`
pub async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    // Waits on the cache lock, which may be held across a director fetch
    blocking(&state.seeker, |seeker| {
        seeker.invalidate_all();
        Ok(())
    })
    .await?;
    info!("BOSH VM cache invalidated");
    Ok(Json(ApiResponse::message(
        "The BOSH VM cache has been invalidated",
    )))
}

/// `GET /v1/cache/bosh`
pub async fn cache_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CachedDeployment>>>, ApiError> {
    let status = blocking(&state.seeker, |seeker| Ok(seeker.cache_status())).await?;
    let mut response = ApiResponse::contents(status);
    if !state.seeker.bosh_configured() {
        response = response.with_warning(NO_BOSH_WARNING);
    }
    Ok(Json(response))
}

/// `GET /v1/meta`
pub async fn meta(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ServerInfo>> {
    Json(ApiResponse::contents(ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        bosh_configured: state.seeker.bosh_configured(),
    }))
}

/// Anything not routed
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("endpoint not found")),
    )
}
