//! Catalog home page endpoint

use axum::extract::State;

use crate::{
    error::AppResult,
    views::Outcome,
    AppState,
};

/// Catalog home page with document counts
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page view", body = crate::views::View)
    )
)]
pub async fn index(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.catalog.index().await
}
