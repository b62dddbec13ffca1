//! Author endpoints

use axum::extract::{Path, State};
use axum_extra::extract::Form;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::AuthorForm,
    views::Outcome,
    AppState,
};

/// List authors
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Author list view", body = crate::views::View)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.authors.list().await
}

/// Author detail
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author detail view", body = crate::views::View),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.authors.detail(id).await
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "authors",
    responses(
        (status = 200, description = "Author form view", body = crate::views::View)
    )
)]
pub async fn create_author_form(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.authors.create_form().await
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "authors",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the created author")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Outcome> {
    state.services.authors.create(form).await
}

/// Author delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Delete confirmation view", body = crate::views::View),
        (status = 303, description = "Author not found, redirect to the list")
    )
)]
pub async fn delete_author_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.authors.delete_form(id).await
}

/// Delete an author with no books
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Delete refused, confirmation re-rendered", body = crate::views::View),
        (status = 303, description = "Redirect to the list")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.authors.delete(id).await
}

/// Author form pre-filled for editing
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author form view", body = crate::views::View),
        (status = 303, description = "Author not found, redirect to the list")
    )
)]
pub async fn update_author_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.authors.update_form(id).await
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author ID")),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the updated author")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Outcome> {
    state.services.authors.update(id, form).await
}
