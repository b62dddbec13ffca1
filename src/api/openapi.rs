//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, catalog, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library",
        version = "0.1.0",
        description = "Library catalog: books, copies, authors and genres",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        catalog::index,
        // Authors
        authors::list_authors,
        authors::author_detail,
        authors::create_author_form,
        authors::create_author,
        authors::delete_author_form,
        authors::delete_author,
        authors::update_author_form,
        authors::update_author,
        // Genres
        genres::list_genres,
        genres::genre_detail,
        genres::create_genre_form,
        genres::create_genre,
        genres::delete_genre_form,
        genres::delete_genre,
        genres::update_genre_form,
        genres::update_genre,
        // Books
        books::list_books,
        books::book_detail,
        books::create_book_form,
        books::create_book,
        books::delete_book_form,
        books::delete_book,
        books::update_book_form,
        books::update_book,
        // Book instances
        book_instances::list_book_instances,
        book_instances::book_instance_detail,
        book_instances::create_book_instance_form,
        book_instances::create_book_instance,
        book_instances::delete_book_instance_form,
        book_instances::delete_book_instance,
        book_instances::update_book_instance_form,
        book_instances::update_book_instance,
    ),
    components(
        schemas(
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::views::View,
            crate::validation::FieldError,
            // Documents
            crate::models::Author,
            crate::models::Genre,
            crate::models::GenreOption,
            crate::models::Book,
            crate::models::BookSummary,
            crate::models::BookTitle,
            crate::models::BookDetail,
            crate::models::BookInstance,
            crate::models::BookInstanceDetail,
            crate::models::BookInstanceStatus,
            // Forms
            crate::models::AuthorForm,
            crate::models::GenreForm,
            crate::models::BookForm,
            crate::models::BookInstanceForm,
        )
    ),
    tags(
        (name = "health", description = "Health checks"),
        (name = "catalog", description = "Catalog home"),
        (name = "authors", description = "Authors"),
        (name = "genres", description = "Genres"),
        (name = "books", description = "Books"),
        (name = "book_instances", description = "Book copies")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
