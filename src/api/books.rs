//! Book endpoints

use axum::extract::{Path, State};
use axum_extra::extract::Form;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::BookForm,
    views::Outcome,
    AppState,
};

/// List books
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "Book list view", body = crate::views::View)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.books.list().await
}

/// Book detail
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book detail view", body = crate::views::View),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.books.detail(id).await
}

/// Empty book form
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 200, description = "Book form view", body = crate::views::View)
    )
)]
pub async fn create_book_form(State(state): State<AppState>) -> AppResult<Outcome> {
    state.services.books.create_form().await
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the created book")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> AppResult<Outcome> {
    state.services.books.create(form).await
}

/// Book delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Delete confirmation view", body = crate::views::View),
        (status = 303, description = "Book not found, redirect to the list")
    )
)]
pub async fn delete_book_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.books.delete_form(id).await
}

/// Delete a book with no copies
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Delete refused, confirmation re-rendered", body = crate::views::View),
        (status = 303, description = "Redirect to the list")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.books.delete(id).await
}

/// Book form pre-filled for editing
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book form view", body = crate::views::View),
        (status = 303, description = "Book not found, redirect to the list")
    )
)]
pub async fn update_book_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Outcome> {
    state.services.books.update_form(id).await
}

/// Update a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form re-rendered with validation errors", body = crate::views::View),
        (status = 303, description = "Redirect to the updated book")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<BookForm>,
) -> AppResult<Outcome> {
    state.services.books.update(id, form).await
}
