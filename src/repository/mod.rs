//! Document store contract and its backends

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookInstance, BookInstanceDetail, BookInstanceStatus,
        BookSummary, BookTitle, Genre, NewAuthor, NewBook, NewBookInstance, NewGenre,
    },
};

pub use memory::MemoryStore;
pub use postgres::Repository;

/// Catalog persistence.
///
/// Lookups by id resolve to `None` when nothing matches; only a failing
/// backend produces an error. Updates replace the whole document and return
/// `None` for an unknown id. Deletes of unknown ids succeed. References
/// between documents are not checked on write or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Authors, sorted by family name
    async fn list_authors(&self) -> AppResult<Vec<Author>>;
    async fn find_author(&self, id: Uuid) -> AppResult<Option<Author>>;
    async fn save_author(&self, author: &NewAuthor) -> AppResult<Author>;
    async fn update_author(&self, id: Uuid, author: &NewAuthor) -> AppResult<Option<Author>>;
    async fn delete_author(&self, id: Uuid) -> AppResult<()>;
    async fn count_authors(&self) -> AppResult<i64>;

    // Genres, sorted by name
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
    async fn find_genre(&self, id: Uuid) -> AppResult<Option<Genre>>;
    async fn find_genre_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
    async fn save_genre(&self, genre: &NewGenre) -> AppResult<Genre>;
    async fn update_genre(&self, id: Uuid, genre: &NewGenre) -> AppResult<Option<Genre>>;
    async fn delete_genre(&self, id: Uuid) -> AppResult<()>;
    async fn count_genres(&self) -> AppResult<i64>;

    // Books, sorted by title
    async fn list_books(&self) -> AppResult<Vec<BookSummary>>;
    async fn list_book_titles(&self) -> AppResult<Vec<BookTitle>>;
    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>>;
    async fn find_book_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>>;
    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>>;
    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>>;
    async fn save_book(&self, book: &NewBook) -> AppResult<Book>;
    async fn update_book(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>>;
    async fn delete_book(&self, id: Uuid) -> AppResult<()>;
    async fn count_books(&self) -> AppResult<i64>;

    // Book instances, in insertion order
    async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceDetail>>;
    async fn find_book_instance(&self, id: Uuid) -> AppResult<Option<BookInstance>>;
    async fn find_book_instance_detail(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>>;
    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;
    async fn save_book_instance(&self, instance: &NewBookInstance) -> AppResult<BookInstance>;
    async fn update_book_instance(
        &self,
        id: Uuid,
        instance: &NewBookInstance,
    ) -> AppResult<Option<BookInstance>>;
    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()>;
    /// Counts every copy, or only those in `status`
    async fn count_book_instances(&self, status: Option<BookInstanceStatus>) -> AppResult<i64>;
}
