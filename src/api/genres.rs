//! Genre endpoints

use axum::extract::{Path, State};
use axum_extra::extract::Form;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::GenreForm,
    views::Outcome,
    AppState,
};

/// List genres
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses(
        (status = 200, description = "Genre list view", body = crate::views::View)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.genres.list().await
}

/// Genre detail
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre detail view", body = crate::views::View),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.genres.detail(id).await
}

/// Empty genre form
#[utoipa::path(
    get,
    path = "/catalog/genre/create",
    tag = "genres",
    responses(
        (status = 200, description = "Genre form view", body = crate::views::View)
    )
)]
pub async fn create_genre_form(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.genres.create_form().await
}

/// Create a genre, or redirect to the existing genre with the same name
#[utoipa::path(
    post,
    path = "/catalog/genre/create",
    tag = "genres",
    request_body(content = GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the created or existing genre")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Form(form): Form<GenreForm>,
) -> AppResult<Outcome> {
    state.services.genres.create(form).await
}

/// Genre delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Delete confirmation view", body = crate::views::View),
        (status = 303, description = "Genre not found, redirect to the list")
    )
)]
pub async fn delete_genre_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.genres.delete_form(id).await
}

/// Delete a genre no book uses
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Delete refused, confirmation re-rendered", body = crate::views::View),
        (status = 303, description = "Redirect to the list")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.genres.delete(id).await
}

/// Genre form pre-filled for editing
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre form view", body = crate::views::View),
        (status = 303, description = "Genre not found, redirect to the list")
    )
)]
pub async fn update_genre_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.genres.update_form(id).await
}

/// Update a genre
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre ID")),
    request_body(content = GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the updated genre")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<GenreForm>,
) -> AppResult<Outcome> {
    state.services.genres.update(id, form).await
}
