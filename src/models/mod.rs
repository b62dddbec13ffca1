//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorForm, NewAuthor};
pub use book::{Book, BookDetail, BookForm, BookSummary, BookTitle, NewBook};
pub use book_instance::{
    BookInstance, BookInstanceDetail, BookInstanceForm, BookInstanceStatus, NewBookInstance,
};
pub use genre::{Genre, GenreForm, GenreOption, NewGenre};
