//! Handler outcomes: a named view with its context, or a redirect

use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// A view to render, identified by template name.
///
/// Templates live outside this crate; the view is sent as JSON so any
/// renderer can pick it up.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct View {
    pub view: String,
    #[schema(value_type = Object)]
    pub context: Value,
}

impl View {
    pub fn new(view: impl Into<String>, context: Value) -> Self {
        Self {
            view: view.into(),
            context,
        }
    }
}

/// Terminal state of a controller operation
#[derive(Debug, Clone)]
pub enum Outcome {
    Render(View),
    /// See-other redirect to a canonical path
    Redirect(String),
}

impl Outcome {
    pub fn render(view: impl Into<String>, context: Value) -> Self {
        Outcome::Render(View::new(view, context))
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Outcome::Redirect(location.into())
    }

    pub fn view(&self) -> Option<&View> {
        match self {
            Outcome::Render(view) => Some(view),
            Outcome::Redirect(_) => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Outcome::Render(_) => None,
            Outcome::Redirect(location) => Some(location),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render(view) => Json(view).into_response(),
            Outcome::Redirect(location) => Redirect::to(&location).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};
    use serde_json::json;

    #[test]
    fn test_redirect_is_see_other_with_location() {
        let response = Outcome::redirect("/catalog/books").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/catalog/books");
    }

    #[test]
    fn test_render_is_ok() {
        let outcome = Outcome::render("genre_form", json!({ "title": "Create Genre" }));
        assert_eq!(outcome.view().unwrap().context["title"], "Create Genre");
        assert!(outcome.location().is_none());
        assert_eq!(outcome.into_response().status(), StatusCode::OK);
    }
}
