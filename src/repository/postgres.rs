//! PostgreSQL document store

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookInstance, BookInstanceDetail, BookInstanceStatus,
        BookSummary, BookTitle, Genre, NewAuthor, NewBook, NewBookInstance, NewGenre,
    },
};

const AUTHOR_COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death";
const BOOK_COLUMNS: &str = "id, title, author, summary, isbn, genre";
const INSTANCE_COLUMNS: &str = "id, book, imprint, status, due_back";

/// Catalog store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn authors_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Author>> {
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = ANY($1)",
            AUTHOR_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|a| (a.id, a)).collect())
    }

    async fn books_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = ANY($1)",
            BOOK_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|b| (b.id, b)).collect())
    }

    async fn books_where(&self, filter: &str, id: Uuid) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE {} ORDER BY title",
            BOOK_COLUMNS, filter
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_from(&self, table: &str, id: Uuid) -> AppResult<()> {
        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self, table: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY family_name, first_name",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_author(&self, id: Uuid) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_author(&self, author: &NewAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(&format!(
            r#"
            INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_author(&self, id: Uuid, author: &NewAuthor) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(&format!(
            r#"
            UPDATE authors
            SET first_name = $2, family_name = $3, date_of_birth = $4, date_of_death = $5
            WHERE id = $1
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        self.delete_from("authors", id).await
    }

    async fn count_authors(&self) -> AppResult<i64> {
        self.count("authors").await
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_genre(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_genre_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save_genre(&self, genre: &NewGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(&genre.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_genre(&self, id: Uuid, genre: &NewGenre) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(&genre.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_genre(&self, id: Uuid) -> AppResult<()> {
        self.delete_from("genres", id).await
    }

    async fn count_genres(&self) -> AppResult<i64> {
        self.count("genres").await
    }

    async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY title",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let author_ids: Vec<Uuid> = books.iter().map(|b| b.author).collect();
        let authors = self.authors_by_ids(&author_ids).await?;

        Ok(books
            .into_iter()
            .map(|book| BookSummary {
                id: book.id,
                title: book.title,
                author: authors.get(&book.author).cloned(),
            })
            .collect())
    }

    async fn list_book_titles(&self) -> AppResult<Vec<BookTitle>> {
        let rows = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_book(&self, id: Uuid) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_book_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let Some(book) = self.find_book(id).await? else {
            return Ok(None);
        };

        let author = self.find_author(book.author).await?;
        let genres: HashMap<Uuid, Genre> =
            sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ANY($1)")
                .bind(&book.genre)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect();

        Ok(Some(BookDetail {
            id: book.id,
            title: book.title,
            author,
            summary: book.summary,
            isbn: book.isbn,
            genre: book.genre.iter().filter_map(|g| genres.get(g).cloned()).collect(),
        }))
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<Book>> {
        self.books_where("author = $1", author_id).await
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<Book>> {
        self.books_where("$1 = ANY(genre)", genre_id).await
    }

    async fn save_book(&self, book: &NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (id, title, author, summary, isbn, genre)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&book.title)
        .bind(book.author)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genre)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_book(&self, id: Uuid, book: &NewBook) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, summary = $4, isbn = $5, genre = $6
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&book.title)
        .bind(book.author)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(&book.genre)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.delete_from("books", id).await
    }

    async fn count_books(&self) -> AppResult<i64> {
        self.count("books").await
    }

    async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let instances = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances ORDER BY created_at",
            INSTANCE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let book_ids: Vec<Uuid> = instances.iter().map(|i| i.book).collect();
        let books = self.books_by_ids(&book_ids).await?;

        Ok(instances
            .into_iter()
            .map(|instance| {
                let book = books.get(&instance.book).cloned();
                BookInstanceDetail::populate(instance, book)
            })
            .collect())
    }

    async fn find_book_instance(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_book_instance_detail(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let Some(instance) = self.find_book_instance(id).await? else {
            return Ok(None);
        };
        let book = self.find_book(instance.book).await?;
        Ok(Some(BookInstanceDetail::populate(instance, book)))
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE book = $1 ORDER BY created_at",
            INSTANCE_COLUMNS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn save_book_instance(&self, instance: &NewBookInstance) -> AppResult<BookInstance> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            INSERT INTO book_instances (id, book, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(instance.book)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_book_instance(
        &self,
        id: Uuid,
        instance: &NewBookInstance,
    ) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET book = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .bind(instance.book)
        .bind(&instance.imprint)
        .bind(instance.status)
        .bind(instance.due_back)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        self.delete_from("book_instances", id).await
    }

    async fn count_book_instances(&self, status: Option<BookInstanceStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE $1::book_instance_status IS NULL OR status = $1",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
