//! Book copy endpoints

use axum::extract::{Path, State};
use axum_extra::extract::Form;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::BookInstanceForm,
    views::Outcome,
    AppState,
};

/// List book copies
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "book_instances",
    responses(
        (status = 200, description = "Book copy list view", body = crate::views::View)
    )
)]
pub async fn list_book_instances(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.book_instances.list().await
}

/// Book copy detail
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "book_instances",
    params(("id" = Uuid, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Book copy detail view", body = crate::views::View),
        (status = 404, description = "Book copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_instance_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.book_instances.detail(id).await
}

/// Empty book copy form
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "book_instances",
    responses(
        (status = 200, description = "Book copy form view", body = crate::views::View)
    )
)]
pub async fn create_book_instance_form(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.book_instances.create_form().await
}

/// Create a book copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/create",
    tag = "book_instances",
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the created book copy")
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    Form(form): Form<BookInstanceForm>,
) -> AppResult<Outcome> {
    state.services.book_instances.create(form).await
}

/// Book copy delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "book_instances",
    params(("id" = Uuid, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Delete confirmation view", body = crate::views::View),
        (status = 303, description = "Book copy not found, redirect to the list")
    )
)]
pub async fn delete_book_instance_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.book_instances.delete_form(id).await
}

/// Delete a book copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "book_instances",
    params(("id" = Uuid, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Delete refused, confirmation re-rendered", body = crate::views::View),
        (status = 303, description = "Redirect to the list")
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.book_instances.delete(id).await
}

/// Book copy form pre-filled for editing
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "book_instances",
    params(("id" = Uuid, Path, description = "Book copy ID")),
    responses(
        (status = 200, description = "Book copy form view", body = crate::views::View),
        (status = 303, description = "Book copy not found, redirect to the list")
    )
)]
pub async fn update_book_instance_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.book_instances.update_form(id).await
}

/// Update a book copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update",
    tag = "book_instances",
    params(("id" = Uuid, Path, description = "Book copy ID")),
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the updated book copy")
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<BookInstanceForm>,
) -> AppResult<Outcome> {
    state.services.book_instances.update(id, form).await
}
