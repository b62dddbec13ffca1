//! Resource controllers: each one orchestrates store calls and validation
//! and ends in a rendered view or a redirect

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use std::sync::Arc;

use crate::repository::CatalogStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            authors: authors::AuthorsService::new(store.clone()),
            genres: genres::GenresService::new(store.clone()),
            books: books::BooksService::new(store.clone()),
            book_instances: book_instances::BookInstancesService::new(store),
        }
    }
}
