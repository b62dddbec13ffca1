//! Catalog home page

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::{
    error::AppResult,
    models::BookInstanceStatus,
    repository::CatalogStore,
    views::Outcome,
};

/// Document counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let (books, copies, available, authors, genres) = tokio::try_join!(
            self.store.count_books(),
            self.store.count_book_instances(None),
            self.store.count_book_instances(Some(BookInstanceStatus::Available)),
            self.store.count_authors(),
            self.store.count_genres(),
        )?;

        Ok(CatalogCounts {
            book_count: books,
            book_instance_count: copies,
            book_instance_available_count: available,
            author_count: authors,
            genre_count: genres,
        })
    }

    pub async fn index(&self) -> AppResult<Outcome> {
        let counts = self.counts().await?;
        Ok(Outcome::render(
            "index",
            json!({ "title": "Local Library Home", "data": counts }),
        ))
    }
}
