//! Author pipelines

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorForm, NewAuthor, AUTHOR_LIST_PATH},
        Book,
    },
    repository::CatalogStore,
    validation::{self, FieldError},
    views::Outcome,
};

#[derive(Clone)]
pub struct AuthorsService {
    store: Arc<dyn CatalogStore>,
}

impl AuthorsService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Outcome> {
        let authors = self.store.list_authors().await?;
        Ok(Outcome::render(
            "author_list",
            json!({ "title": "Author List", "author_list": authors }),
        ))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<Outcome> {
        let (author, books) =
            tokio::try_join!(self.store.find_author(id), self.store.books_by_author(id))?;
        let author = author.ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        Ok(Outcome::render(
            "author_detail",
            json!({
                "title": "Author Detail",
                "name": author.name(),
                "author": author,
                "author_books": books,
            }),
        ))
    }

    pub async fn create_form(&self) -> AppResult<Outcome> {
        Ok(form_view("Create Author", None, &AuthorForm::default(), &[]))
    }

    pub async fn create(&self, form: AuthorForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            tracing::debug!(errors = checked.errors.len(), "Author form rejected");
            return Ok(form_view("Create Author", None, &checked.form, &checked.errors));
        }

        let author = self.store.save_author(&NewAuthor::try_from(&checked.form)?).await?;
        tracing::info!(author_id = %author.id, "Author created");
        Ok(Outcome::redirect(author.url()))
    }

    pub async fn delete_form(&self, id: Uuid) -> AppResult<Outcome> {
        let (author, books) =
            tokio::try_join!(self.store.find_author(id), self.store.books_by_author(id))?;
        let Some(author) = author else {
            return Ok(Outcome::redirect(AUTHOR_LIST_PATH));
        };

        Ok(delete_view(&author, &books, None))
    }

    /// Deletes the author only when no book references them
    pub async fn delete(&self, id: Uuid) -> AppResult<Outcome> {
        let (author, books) =
            tokio::try_join!(self.store.find_author(id), self.store.books_by_author(id))?;
        let Some(author) = author else {
            return Ok(Outcome::redirect(AUTHOR_LIST_PATH));
        };

        if !books.is_empty() {
            tracing::warn!(author_id = %id, books = books.len(), "Author delete refused, books remain");
            return Ok(delete_view(
                &author,
                &books,
                Some("Delete the following books before deleting this author."),
            ));
        }

        self.store.delete_author(id).await?;
        tracing::info!(author_id = %id, "Author deleted");
        Ok(Outcome::redirect(AUTHOR_LIST_PATH))
    }

    pub async fn update_form(&self, id: Uuid) -> AppResult<Outcome> {
        let Some(author) = self.store.find_author(id).await? else {
            return Ok(Outcome::redirect(AUTHOR_LIST_PATH));
        };

        Ok(form_view("Update Author", Some(id), &AuthorForm::from(&author), &[]))
    }

    pub async fn update(&self, id: Uuid, form: AuthorForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            tracing::debug!(author_id = %id, errors = checked.errors.len(), "Author form rejected");
            return Ok(form_view("Update Author", Some(id), &checked.form, &checked.errors));
        }

        match self
            .store
            .update_author(id, &NewAuthor::try_from(&checked.form)?)
            .await?
        {
            Some(author) => {
                tracing::info!(author_id = %id, "Author updated");
                Ok(Outcome::redirect(author.url()))
            }
            None => Ok(Outcome::redirect(AUTHOR_LIST_PATH)),
        }
    }
}

fn form_view(title: &str, id: Option<Uuid>, form: &AuthorForm, errors: &[FieldError]) -> Outcome {
    Outcome::render(
        "author_form",
        json!({ "title": title, "author_id": id, "author": form, "errors": errors }),
    )
}

fn delete_view(author: &Author, books: &[Book], message: Option<&str>) -> Outcome {
    Outcome::render(
        "author_delete",
        json!({
            "title": "Delete Author",
            "author": author,
            "author_books": books,
            "error": message,
        }),
    )
}
