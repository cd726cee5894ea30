use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    app::AppState,
    error::{AppResult, ParseError},
    fetch::PageFetcher,
    models::ResolutionResult,
};

#[derive(Deserialize)]
pub struct ResolveReq {
    pub reference: String,
}

/// `GET /resolve?reference=...`
///
/// # Errors
/// 400 when the reference is blank. Resolution failures are still 200.
pub async fn get<F: PageFetcher + 'static>(
    State(state): State<AppState<F>>,
    Query(req): Query<ResolveReq>,
) -> AppResult<Json<ResolutionResult>> {
    run(&state, &req.reference).await
}

/// `POST /resolve` with `{"reference": ...}`
///
/// # Errors
/// 400 when the reference is blank. Resolution failures are still 200.
pub async fn post<F: PageFetcher + 'static>(
    State(state): State<AppState<F>>,
    Json(req): Json<ResolveReq>,
) -> AppResult<Json<ResolutionResult>> {
    run(&state, &req.reference).await
}

async fn run<F: PageFetcher>(
    state: &AppState<F>,
    reference: &str,
) -> AppResult<Json<ResolutionResult>> {
    if reference.trim().is_empty() {
        return Err(ParseError::InvalidReference(reference.to_string()).into());
    }
    Ok(Json(state.resolver.resolve(reference).await))
}
