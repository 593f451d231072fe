use crate::{
    AppState,
    models::{Decision, NavigateRequest, NavigateResponse, RouteInfo},
    store::MemoryStore,
};
use axum::{Json, extract::State, http::StatusCode};

// --- Handlers ---

/// list_routes
///
/// [Public Route] Describes the route table: every pattern with its access rule, or its
/// redirect target for redirect-only entries.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Route table", body = [RouteInfo]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    Json(state.navigator.routes().describe())
}

/// navigate
///
/// [Public Route] Evaluates the navigation guard for one path against the caller's store
/// snapshot.
///
/// The response carries the decision and the store after the navigation. The store only
/// changes when a role mismatch triggered an identity refresh: fresh identity fields on
/// success, `access_token` removed on failure. The front end replaces its local copy with
/// the returned one.
#[utoipa::path(
    post,
    path = "/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Decision", body = NavigateResponse),
        (status = 400, description = "Path is not absolute")
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, StatusCode> {
    if !payload.path.starts_with('/') {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut store = MemoryStore::from(payload.store);
    let decision: Decision = state.navigator.navigate(&payload.path, &mut store).await;

    Ok(Json(NavigateResponse {
        decision,
        store: store.into_map(),
    }))
}
