//! Genre pipelines

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        genre::{Genre, GenreForm, NewGenre, GENRE_LIST_PATH},
        Book,
    },
    repository::CatalogStore,
    validation::{self, FieldError},
    views::Outcome,
};

#[derive(Clone)]
pub struct GenresService {
    store: Arc<dyn CatalogStore>,
}

impl GenresService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Outcome> {
        let genres = self.store.list_genres().await?;
        Ok(Outcome::render(
            "genre_list",
            json!({ "title": "Genre List", "genre_list": genres }),
        ))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(self.store.find_genre(id), self.store.books_by_genre(id))?;
        let genre = genre.ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        Ok(Outcome::render(
            "genre_detail",
            json!({ "title": "Genre Detail", "genre": genre, "genre_books": books }),
        ))
    }

    pub async fn create_form(&self) -> AppResult<Outcome> {
        Ok(form_view("Create Genre", None, &GenreForm::default(), &[]))
    }

    /// Creates the genre unless one with the same name exists, in which case
    /// the caller is sent to the existing one.
    pub async fn create(&self, form: GenreForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            tracing::debug!(errors = checked.errors.len(), "Genre form rejected");
            return Ok(form_view("Create Genre", None, &checked.form, &checked.errors));
        }

        if let Some(existing) = self.store.find_genre_by_name(&checked.form.name).await? {
            tracing::info!(genre_id = %existing.id, "Genre already exists");
            return Ok(Outcome::redirect(existing.url()));
        }

        let genre = self.store.save_genre(&NewGenre::from(&checked.form)).await?;
        tracing::info!(genre_id = %genre.id, "Genre created");
        Ok(Outcome::redirect(genre.url()))
    }

    pub async fn delete_form(&self, id: Uuid) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(self.store.find_genre(id), self.store.books_by_genre(id))?;
        let Some(genre) = genre else {
            return Ok(Outcome::redirect(GENRE_LIST_PATH));
        };

        Ok(delete_view(&genre, &books, None))
    }

    /// Deletes the genre only when no book uses it
    pub async fn delete(&self, id: Uuid) -> AppResult<Outcome> {
        let (genre, books) = tokio::try_join!(self.store.find_genre(id), self.store.books_by_genre(id))?;
        let Some(genre) = genre else {
            return Ok(Outcome::redirect(GENRE_LIST_PATH));
        };

        if !books.is_empty() {
            tracing::warn!(genre_id = %id, books = books.len(), "Genre delete refused, still in use");
            return Ok(delete_view(
                &genre,
                &books,
                Some("Remove this genre from the following books before deleting it."),
            ));
        }

        self.store.delete_genre(id).await?;
        tracing::info!(genre_id = %id, "Genre deleted");
        Ok(Outcome::redirect(GENRE_LIST_PATH))
    }

    pub async fn update_form(&self, id: Uuid) -> AppResult<Outcome> {
        let Some(genre) = self.store.find_genre(id).await? else {
            return Ok(Outcome::redirect(GENRE_LIST_PATH));
        };

        Ok(form_view("Update Genre", Some(id), &GenreForm::from(&genre), &[]))
    }

    pub async fn update(&self, id: Uuid, form: GenreForm) -> AppResult<Outcome> {
        let mut checked = validation::check(form);

        if !checked.has_errors() {
            if let Some(other) = self.store.find_genre_by_name(&checked.form.name).await? {
                if other.id != id {
                    checked.errors.push(FieldError {
                        field: "name".to_string(),
                        message: "A genre with this name already exists.".to_string(),
                    });
                }
            }
        }

        if checked.has_errors() {
            tracing::debug!(genre_id = %id, errors = checked.errors.len(), "Genre form rejected");
            return Ok(form_view("Update Genre", Some(id), &checked.form, &checked.errors));
        }

        match self.store.update_genre(id, &NewGenre::from(&checked.form)).await? {
            Some(genre) => {
                tracing::info!(genre_id = %id, "Genre updated");
                Ok(Outcome::redirect(genre.url()))
            }
            None => Ok(Outcome::redirect(GENRE_LIST_PATH)),
        }
    }
}

fn form_view(title: &str, id: Option<Uuid>, form: &GenreForm, errors: &[FieldError]) -> Outcome {
    Outcome::render(
        "genre_form",
        json!({ "title": title, "genre_id": id, "genre": form, "errors": errors }),
    )
}

fn delete_view(genre: &Genre, books: &[Book], message: Option<&str>) -> Outcome {
    Outcome::render(
        "genre_delete",
        json!({
            "title": "Delete Genre",
            "genre": genre,
            "genre_books": books,
            "error": message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, MockCatalogStore};

    fn service_with_memory() -> (GenresService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (GenresService::new(store.clone()), store)
    }

    fn named(name: &str) -> GenreForm {
        GenreForm { name: name.into() }
    }

    #[tokio::test]
    async fn test_create_blank_name_never_saves() {
        let mut store = MockCatalogStore::new();
        store.expect_find_genre_by_name().never();
        store.expect_save_genre().never();
        let service = GenresService::new(Arc::new(store));

        let outcome = service.create(named("   ")).await.unwrap();

        let view = outcome.view().expect("form re-rendered");
        assert_eq!(view.view, "genre_form");
        assert_eq!(view.context["errors"][0]["field"], "name");
        assert_eq!(view.context["errors"][0]["message"], "Genre name required");
    }

    #[tokio::test]
    async fn test_create_duplicate_redirects_to_existing() {
        let (service, store) = service_with_memory();
        let existing = store.save_genre(&NewGenre { name: "Poetry".into() }).await.unwrap();

        let outcome = service.create(named(" Poetry ")).await.unwrap();

        assert_eq!(outcome.location(), Some(existing.url().as_str()));
        assert_eq!(store.count_genres().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_new_redirects_to_new_genre() {
        let (service, store) = service_with_memory();

        let outcome = service.create(named("Fantasy")).await.unwrap();

        let genres = store.list_genres().await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(outcome.location(), Some(genres[0].url().as_str()));
    }

    #[tokio::test]
    async fn test_detail_missing_is_not_found() {
        let (service, _) = service_with_memory();

        let err = service.detail(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_store_failure_propagates() {
        let mut store = MockCatalogStore::new();
        store.expect_find_genre().returning(|id| {
            Ok(Some(Genre {
                id,
                name: "Poetry".into(),
            }))
        });
        store
            .expect_books_by_genre()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let service = GenresService::new(Arc::new(store));

        let err = service.detail(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_update_onto_other_genre_name_is_rejected() {
        let (service, store) = service_with_memory();
        store.save_genre(&NewGenre { name: "Poetry".into() }).await.unwrap();
        let fantasy = store.save_genre(&NewGenre { name: "Fantasy".into() }).await.unwrap();

        let outcome = service.update(fantasy.id, named("Poetry")).await.unwrap();

        let view = outcome.view().expect("form re-rendered");
        assert_eq!(view.context["errors"][0]["field"], "name");
        assert_eq!(store.find_genre(fantasy.id).await.unwrap().unwrap().name, "Fantasy");
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_succeeds() {
        let (service, store) = service_with_memory();
        let fantasy = store.save_genre(&NewGenre { name: "Fantasy".into() }).await.unwrap();

        let outcome = service.update(fantasy.id, named("Fantasy")).await.unwrap();

        assert_eq!(outcome.location(), Some(fantasy.url().as_str()));
    }

    #[tokio::test]
    async fn test_update_missing_redirects_to_list() {
        let (service, _) = service_with_memory();

        let outcome = service.update(Uuid::new_v4(), named("Fantasy")).await.unwrap();

        assert_eq!(outcome.location(), Some(GENRE_LIST_PATH));
    }

    #[tokio::test]
    async fn test_resubmitting_update_form_keeps_stored_name() {
        let (service, store) = service_with_memory();
        service.create(named("Sword & Sorcery")).await.unwrap();
        let genre = store.list_genres().await.unwrap().remove(0);
        assert_eq!(genre.name, "Sword &amp; Sorcery");

        let shown = service.update_form(genre.id).await.unwrap();
        let name = shown.view().unwrap().context["genre"]["name"].clone();
        assert_eq!(name, "Sword & Sorcery");

        let outcome = service
            .update(genre.id, named(name.as_str().unwrap()))
            .await
            .unwrap();

        assert_eq!(outcome.location(), Some(genre.url().as_str()));
        assert_eq!(store.find_genre(genre.id).await.unwrap(), Some(genre));
    }
}
