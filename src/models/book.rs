//! Book model, its populated read shapes and the book form

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{author::Author, genre::Genre};
use crate::{
    error::{AppError, AppResult},
    validation::{self, escape_field, trim_field, unescape_html, FormInput},
};

pub const BOOK_LIST_PATH: &str = "/catalog/books";

/// Book document as stored: author and genres are references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

impl Book {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

pub fn book_url(id: Uuid) -> String {
    format!("/catalog/book/{}", id)
}

/// Book list entry: title with the author populated
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    /// `None` when the referenced author no longer exists
    pub author: Option<Author>,
}

/// Book id and title, for selection lists
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

/// Book with author and genres populated
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookDetail {
    pub id: Uuid,
    pub title: String,
    pub author: Option<Author>,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

impl NewBook {
    pub fn with_id(self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            summary: self.summary,
            isbn: self.isbn,
            genre: self.genre,
        }
    }
}

/// Book create / update form.
///
/// `genre` is a multi-select: the form extractor lifts a single value to a
/// one-element list and an absent field to an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[validate(
        length(min = 1, message = "Author must not be empty."),
        custom(function = "validation::identifier")
    )]
    pub author: String,
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[validate(length(min = 1, message = "ISBN must not be empty."))]
    pub isbn: String,
    #[validate(custom(function = "validation::identifiers"))]
    pub genre: Vec<String>,
}

impl BookForm {
    /// Genre ids currently selected on the form
    pub fn selected_genres(&self) -> HashSet<Uuid> {
        self.genre
            .iter()
            .filter_map(|g| Uuid::parse_str(g).ok())
            .collect()
    }
}

impl FormInput for BookForm {
    const FIELDS: &'static [&'static str] = &["title", "author", "summary", "isbn", "genre"];

    fn trim(&mut self) {
        trim_field(&mut self.title);
        trim_field(&mut self.author);
        trim_field(&mut self.summary);
        trim_field(&mut self.isbn);
        self.genre.iter_mut().for_each(trim_field);
    }

    fn escape(&mut self) {
        escape_field(&mut self.title);
        escape_field(&mut self.author);
        escape_field(&mut self.summary);
        escape_field(&mut self.isbn);
        self.genre.iter_mut().for_each(escape_field);
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: unescape_html(&book.title),
            author: book.author.to_string(),
            summary: unescape_html(&book.summary),
            isbn: unescape_html(&book.isbn),
            genre: book.genre.iter().map(Uuid::to_string).collect(),
        }
    }
}

impl TryFrom<&BookForm> for NewBook {
    type Error = AppError;

    fn try_from(form: &BookForm) -> AppResult<Self> {
        let author = parse_reference(&form.author)?;
        let genre = form
            .genre
            .iter()
            .map(|g| parse_reference(g))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            title: form.title.clone(),
            author,
            summary: form.summary.clone(),
            isbn: form.isbn.clone(),
            genre,
        })
    }
}

pub(crate) fn parse_reference(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| AppError::BadRequest(format!("Invalid reference: {}", value)))
}
