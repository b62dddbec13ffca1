//! Book instance (copy) pipelines

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstanceForm, NewBookInstance, BOOK_INSTANCE_LIST_PATH},
        BookInstanceStatus, BookTitle,
    },
    repository::CatalogStore,
    validation::{self, Checked, FieldError},
    views::Outcome,
};

#[derive(Clone)]
pub struct BookInstancesService {
    store: Arc<dyn CatalogStore>,
}

impl BookInstancesService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Outcome> {
        let instances = self.store.list_book_instances().await?;
        Ok(Outcome::render(
            "bookinstance_list",
            json!({ "title": "Book Instance List", "bookinstance_list": instances }),
        ))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<Outcome> {
        let instance = self
            .store
            .find_book_instance_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;

        let title = match &instance.book {
            Some(book) => format!("Copy: {}", book.title),
            None => "Copy".to_string(),
        };

        Ok(Outcome::render(
            "bookinstance_detail",
            json!({ "title": title, "bookinstance": instance }),
        ))
    }

    pub async fn create_form(&self) -> AppResult<Outcome> {
        let books = self.store.list_book_titles().await?;
        Ok(form_view(
            "Create BookInstance",
            None,
            &books,
            &BookInstanceForm::default(),
            &[],
        ))
    }

    pub async fn create(&self, form: BookInstanceForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            return self.reshow("Create BookInstance", None, checked).await;
        }

        let instance = self
            .store
            .save_book_instance(&NewBookInstance::try_from(&checked.form)?)
            .await?;
        tracing::info!(book_instance_id = %instance.id, book_id = %instance.book, "Book copy created");
        Ok(Outcome::redirect(instance.url()))
    }

    pub async fn delete_form(&self, id: Uuid) -> AppResult<Outcome> {
        let Some(instance) = self.store.find_book_instance_detail(id).await? else {
            return Ok(Outcome::redirect(BOOK_INSTANCE_LIST_PATH));
        };

        Ok(Outcome::render(
            "bookinstance_delete",
            json!({ "title": "Delete BookInstance", "bookinstance": instance }),
        ))
    }

    /// Copies have no dependents, so a found copy is always deleted
    pub async fn delete(&self, id: Uuid) -> AppResult<Outcome> {
        if self.store.find_book_instance(id).await?.is_none() {
            return Ok(Outcome::redirect(BOOK_INSTANCE_LIST_PATH));
        }

        self.store.delete_book_instance(id).await?;
        tracing::info!(book_instance_id = %id, "Book copy deleted");
        Ok(Outcome::redirect(BOOK_INSTANCE_LIST_PATH))
    }

    pub async fn update_form(&self, id: Uuid) -> AppResult<Outcome> {
        let (instance, books) = tokio::try_join!(
            self.store.find_book_instance(id),
            self.store.list_book_titles(),
        )?;
        let Some(instance) = instance else {
            return Ok(Outcome::redirect(BOOK_INSTANCE_LIST_PATH));
        };

        Ok(form_view(
            "Update BookInstance",
            Some(id),
            &books,
            &BookInstanceForm::from(&instance),
            &[],
        ))
    }

    pub async fn update(&self, id: Uuid, form: BookInstanceForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            return self.reshow("Update BookInstance", Some(id), checked).await;
        }

        match self
            .store
            .update_book_instance(id, &NewBookInstance::try_from(&checked.form)?)
            .await?
        {
            Some(instance) => {
                tracing::info!(book_instance_id = %id, "Book copy updated");
                Ok(Outcome::redirect(instance.url()))
            }
            None => Ok(Outcome::redirect(BOOK_INSTANCE_LIST_PATH)),
        }
    }

    async fn reshow(
        &self,
        title: &str,
        id: Option<Uuid>,
        checked: Checked<BookInstanceForm>,
    ) -> AppResult<Outcome> {
        tracing::debug!(errors = checked.errors.len(), "Book copy form rejected");
        let books = self.store.list_book_titles().await?;
        Ok(form_view(title, id, &books, &checked.form, &checked.errors))
    }
}

fn form_view(
    title: &str,
    id: Option<Uuid>,
    books: &[BookTitle],
    form: &BookInstanceForm,
    errors: &[FieldError],
) -> Outcome {
    let selected_book = Uuid::parse_str(&form.book).ok();
    Outcome::render(
        "bookinstance_form",
        json!({
            "title": title,
            "bookinstance_id": id,
            "book_list": books,
            "selected_book": selected_book,
            "statuses": BookInstanceStatus::ALL,
            "bookinstance": form,
            "errors": errors,
        }),
    )
}
