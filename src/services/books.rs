//! Book pipelines: list, detail and the create / update / delete form flows

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookForm, NewBook, BOOK_LIST_PATH},
        genre::genre_options,
        Author, Book, BookInstance, Genre,
    },
    repository::CatalogStore,
    validation::{self, Checked, FieldError},
    views::Outcome,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn CatalogStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Outcome> {
        let books = self.store.list_books().await?;
        Ok(Outcome::render(
            "book_list",
            json!({ "title": "Book List", "book_list": books }),
        ))
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<Outcome> {
        let (book, copies) =
            tokio::try_join!(self.store.find_book_detail(id), self.store.instances_by_book(id))?;
        let book = book.ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        Ok(Outcome::render(
            "book_detail",
            json!({ "title": book.title, "book": book, "book_instances": copies }),
        ))
    }

    pub async fn create_form(&self) -> AppResult<Outcome> {
        let (authors, genres) = self.form_choices().await?;
        Ok(form_view(
            "Create Book",
            None,
            &authors,
            &genres,
            &BookForm::default(),
            &[],
        ))
    }

    pub async fn create(&self, form: BookForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            return self.reshow("Create Book", None, checked).await;
        }

        let book = self.store.save_book(&NewBook::try_from(&checked.form)?).await?;
        tracing::info!(book_id = %book.id, "Book created");
        Ok(Outcome::redirect(book.url()))
    }

    pub async fn delete_form(&self, id: Uuid) -> AppResult<Outcome> {
        let (book, copies) =
            tokio::try_join!(self.store.find_book(id), self.store.instances_by_book(id))?;
        let Some(book) = book else {
            return Ok(Outcome::redirect(BOOK_LIST_PATH));
        };

        Ok(delete_view(&book, &copies, None))
    }

    /// Deletes the book only when it has no copies
    pub async fn delete(&self, id: Uuid) -> AppResult<Outcome> {
        let (book, copies) =
            tokio::try_join!(self.store.find_book(id), self.store.instances_by_book(id))?;
        let Some(book) = book else {
            return Ok(Outcome::redirect(BOOK_LIST_PATH));
        };

        if !copies.is_empty() {
            tracing::warn!(book_id = %id, copies = copies.len(), "Book delete refused, copies remain");
            return Ok(delete_view(
                &book,
                &copies,
                Some("Delete the following copies before deleting this book."),
            ));
        }

        self.store.delete_book(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(Outcome::redirect(BOOK_LIST_PATH))
    }

    pub async fn update_form(&self, id: Uuid) -> AppResult<Outcome> {
        let (book, authors, genres) = tokio::try_join!(
            self.store.find_book(id),
            self.store.list_authors(),
            self.store.list_genres(),
        )?;
        let Some(book) = book else {
            return Ok(Outcome::redirect(BOOK_LIST_PATH));
        };

        Ok(form_view(
            "Update Book",
            Some(id),
            &authors,
            &genres,
            &BookForm::from(&book),
            &[],
        ))
    }

    pub async fn update(&self, id: Uuid, form: BookForm) -> AppResult<Outcome> {
        let checked = validation::check(form);
        if checked.has_errors() {
            return self.reshow("Update Book", Some(id), checked).await;
        }

        match self
            .store
            .update_book(id, &NewBook::try_from(&checked.form)?)
            .await?
        {
            Some(book) => {
                tracing::info!(book_id = %id, "Book updated");
                Ok(Outcome::redirect(book.url()))
            }
            None => Ok(Outcome::redirect(BOOK_LIST_PATH)),
        }
    }

    /// Authors and genres offered by the book form
    async fn form_choices(&self) -> AppResult<(Vec<Author>, Vec<Genre>)> {
        tokio::try_join!(self.store.list_authors(), self.store.list_genres())
    }

    async fn reshow(
        &self,
        title: &str,
        id: Option<Uuid>,
        checked: Checked<BookForm>,
    ) -> AppResult<Outcome> {
        tracing::debug!(errors = checked.errors.len(), "Book form rejected");
        let (authors, genres) = self.form_choices().await?;
        Ok(form_view(
            title,
            id,
            &authors,
            &genres,
            &checked.form,
            &checked.errors,
        ))
    }
}

fn form_view(
    title: &str,
    id: Option<Uuid>,
    authors: &[Author],
    genres: &[Genre],
    form: &BookForm,
    errors: &[FieldError],
) -> Outcome {
    let selected: HashSet<Uuid> = form.selected_genres();
    Outcome::render(
        "book_form",
        json!({
            "title": title,
            "book_id": id,
            "authors": authors,
            "genres": genre_options(genres, &selected),
            "book": form,
            "errors": errors,
        }),
    )
}

fn delete_view(book: &Book, copies: &[BookInstance], message: Option<&str>) -> Outcome {
    Outcome::render(
        "book_delete",
        json!({
            "title": "Delete Book",
            "book": book,
            "book_instances": copies,
            "error": message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookDetail, BookInstanceStatus, NewAuthor, NewBookInstance, NewGenre};
    use crate::repository::{MemoryStore, MockCatalogStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        service: BooksService,
        author: Author,
        genres: Vec<Genre>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let author = store
            .save_author(&NewAuthor {
                first_name: "Frank".into(),
                family_name: "Herbert".into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let mut genres = Vec::new();
        for name in ["Fantasy", "Science Fiction"] {
            genres.push(store.save_genre(&NewGenre { name: name.into() }).await.unwrap());
        }
        Fixture {
            service: BooksService::new(store.clone()),
            store,
            author,
            genres,
        }
    }

    fn dune(author: &Author, genres: &[&Genre]) -> BookForm {
        BookForm {
            title: "Dune".into(),
            author: author.id.to_string(),
            summary: "Spice and sandworms.".into(),
            isbn: "9780441013593".into(),
            genre: genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_valid_book_redirects_to_it() {
        let fx = fixture().await;

        let outcome = fx.service.create(dune(&fx.author, &[&fx.genres[1]])).await.unwrap();

        let books = fx.store.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(outcome.location(), Some(format!("/catalog/book/{}", books[0].id).as_str()));
    }

    #[tokio::test]
    async fn test_create_with_blank_title_reshows_checked_genres() {
        let fx = fixture().await;
        let form = BookForm {
            title: " \t ".into(),
            ..dune(&fx.author, &[&fx.genres[1]])
        };

        let outcome = fx.service.create(form).await.unwrap();

        let view = outcome.view().expect("form re-rendered");
        assert_eq!(view.view, "book_form");
        assert_eq!(view.context["errors"][0]["field"], "title");
        assert_eq!(view.context["book"]["isbn"], "9780441013593");
        assert_eq!(view.context["genres"][0]["checked"], false);
        assert_eq!(view.context["genres"][1]["checked"], true);
        assert_eq!(view.context["authors"].as_array().unwrap().len(), 1);
        assert_eq!(fx.store.count_books().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_submission_never_touches_save() {
        let mut store = MockCatalogStore::new();
        store.expect_list_authors().returning(|| Ok(vec![]));
        store.expect_list_genres().returning(|| Ok(vec![]));
        store.expect_save_book().never();
        let service = BooksService::new(Arc::new(store));

        let outcome = service.create(BookForm::default()).await.unwrap();

        assert_eq!(outcome.view().unwrap().context["errors"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_detail_of_missing_book_is_not_found() {
        let fx = fixture().await;

        let err = fx.service.detail(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_fails_when_any_branch_fails() {
        let mut store = MockCatalogStore::new();
        store.expect_find_book_detail().returning(|id| {
            Ok(Some(BookDetail {
                id,
                title: "Dune".into(),
                author: None,
                summary: "s".into(),
                isbn: "i".into(),
                genre: vec![],
            }))
        });
        store
            .expect_instances_by_book()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let service = BooksService::new(Arc::new(store));

        let err = service.detail(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_delete_with_copies_is_refused() {
        let fx = fixture().await;
        fx.service.create(dune(&fx.author, &[])).await.unwrap();
        let book_id = fx.store.list_books().await.unwrap()[0].id;
        fx.store
            .save_book_instance(&NewBookInstance {
                book: book_id,
                imprint: "Ace".into(),
                status: BookInstanceStatus::Available,
                due_back: None,
            })
            .await
            .unwrap();

        let outcome = fx.service.delete(book_id).await.unwrap();

        let view = outcome.view().expect("confirmation re-rendered");
        assert_eq!(view.view, "book_delete");
        assert!(view.context["error"].is_string());
        assert!(fx.store.find_book(book_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_book_redirects_without_deleting() {
        let mut store = MockCatalogStore::new();
        store.expect_find_book().returning(|_| Ok(None));
        store.expect_instances_by_book().returning(|_| Ok(vec![]));
        store.expect_delete_book().never();
        let service = BooksService::new(Arc::new(store));

        let outcome = service.delete(Uuid::new_v4()).await.unwrap();

        assert_eq!(outcome.location(), Some(BOOK_LIST_PATH));
    }

    #[tokio::test]
    async fn test_update_twice_is_idempotent() {
        let fx = fixture().await;
        fx.service.create(dune(&fx.author, &[&fx.genres[0]])).await.unwrap();
        let book_id = fx.store.list_books().await.unwrap()[0].id;
        let edit = BookForm {
            title: "Dune (40th anniversary)".into(),
            ..dune(&fx.author, &[&fx.genres[0], &fx.genres[1]])
        };

        let first = fx.service.update(book_id, edit.clone()).await.unwrap();
        let after_first = fx.store.find_book(book_id).await.unwrap();
        let second = fx.service.update(book_id, edit).await.unwrap();
        let after_second = fx.store.find_book(book_id).await.unwrap();

        assert_eq!(first.location(), Some(format!("/catalog/book/{}", book_id).as_str()));
        assert_eq!(first.location(), second.location());
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.unwrap().genre.len(), 2);
        assert_eq!(fx.store.count_books().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_form_marks_current_genres() {
        let fx = fixture().await;
        fx.service.create(dune(&fx.author, &[&fx.genres[0]])).await.unwrap();
        let book_id = fx.store.list_books().await.unwrap()[0].id;

        let outcome = fx.service.update_form(book_id).await.unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.context["title"], "Update Book");
        assert_eq!(view.context["genres"][0]["checked"], true);
        assert_eq!(view.context["genres"][1]["checked"], false);
    }

    #[tokio::test]
    async fn test_update_with_blank_summary_reshows_form_for_that_book() {
        let fx = fixture().await;
        fx.service.create(dune(&fx.author, &[&fx.genres[0]])).await.unwrap();
        let book_id = fx.store.list_books().await.unwrap()[0].id;
        let before = fx.store.find_book(book_id).await.unwrap();
        let edit = BookForm {
            summary: "   ".into(),
            ..dune(&fx.author, &[&fx.genres[1]])
        };

        let outcome = fx.service.update(book_id, edit).await.unwrap();

        let view = outcome.view().expect("form re-rendered");
        assert_eq!(view.view, "book_form");
        assert_eq!(view.context["title"], "Update Book");
        assert_eq!(view.context["book_id"], book_id.to_string());
        assert_eq!(view.context["errors"][0]["field"], "summary");
        assert_eq!(view.context["genres"][0]["checked"], false);
        assert_eq!(view.context["genres"][1]["checked"], true);
        assert_eq!(fx.store.find_book(book_id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_resubmitting_update_form_keeps_stored_book() {
        let fx = fixture().await;
        let form = BookForm {
            title: "Tom & Jerry: <Part 1>".into(),
            summary: r#"It's "great""#.into(),
            ..dune(&fx.author, &[&fx.genres[0]])
        };
        fx.service.create(form).await.unwrap();
        let stored = fx.store.list_books().await.unwrap().remove(0);
        let before = fx.store.find_book(stored.id).await.unwrap();

        let shown = fx.service.update_form(stored.id).await.unwrap();
        let shown: BookForm =
            serde_json::from_value(shown.view().unwrap().context["book"].clone()).unwrap();
        assert_eq!(shown.title, "Tom & Jerry: <Part 1>");
        fx.service.update(stored.id, shown).await.unwrap();

        assert_eq!(fx.store.find_book(stored.id).await.unwrap(), before);
    }
}
