//! Book instance (physical copy) model and related types

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{
    author::{format_date, optional_date},
    book::{parse_reference, Book},
};
use crate::{
    error::{AppError, AppResult},
    validation::{self, escape_field, trim_field, unescape_html, FormInput},
};

pub const BOOK_INSTANCE_LIST_PATH: &str = "/catalog/bookinstances";

/// Circulation status of a copy
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "book_instance_status")]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Available,
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookInstanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {}", s)))
    }
}

/// Book instance document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }
}

/// Book instance with its book populated
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookInstanceDetail {
    pub id: Uuid,
    /// `None` when the referenced book no longer exists
    pub book: Option<Book>,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceDetail {
    pub fn populate(instance: BookInstance, book: Option<Book>) -> Self {
        Self {
            id: instance.id,
            book,
            imprint: instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBookInstance {
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl NewBookInstance {
    pub fn with_id(self, id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book: self.book,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}

/// Book instance create / update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookInstanceForm {
    #[validate(
        length(min = 1, message = "Book must be specified"),
        custom(function = "validation::identifier")
    )]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    #[validate(custom(function = "instance_status"))]
    pub status: String,
    #[validate(custom(function = "validation::iso_date"))]
    pub due_back: String,
}

/// Empty selects the default status
fn instance_status(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.parse::<BookInstanceStatus>().is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("status");
    err.message = Some("Invalid status".into());
    Err(err)
}

impl FormInput for BookInstanceForm {
    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn trim(&mut self) {
        trim_field(&mut self.book);
        trim_field(&mut self.imprint);
        trim_field(&mut self.status);
        trim_field(&mut self.due_back);
    }

    fn escape(&mut self) {
        escape_field(&mut self.book);
        escape_field(&mut self.imprint);
        escape_field(&mut self.status);
    }
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            book: instance.book.to_string(),
            imprint: unescape_html(&instance.imprint),
            status: instance.status.to_string(),
            due_back: format_date(instance.due_back),
        }
    }
}

impl TryFrom<&BookInstanceForm> for NewBookInstance {
    type Error = AppError;

    fn try_from(form: &BookInstanceForm) -> AppResult<Self> {
        let status = if form.status.is_empty() {
            BookInstanceStatus::default()
        } else {
            form.status.parse()?
        };

        Ok(Self {
            book: parse_reference(&form.book)?,
            imprint: form.imprint.clone(),
            status,
            due_back: optional_date(&form.due_back)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;

    fn form(status: &str, due_back: &str) -> BookInstanceForm {
        BookInstanceForm {
            book: Uuid::new_v4().to_string(),
            imprint: "Ace, 1990".into(),
            status: status.into(),
            due_back: due_back.into(),
        }
    }

    #[test]
    fn test_status_parses_known_values_only() {
        assert_eq!("Loaned".parse::<BookInstanceStatus>().unwrap(), BookInstanceStatus::Loaned);
        assert!("loaned".parse::<BookInstanceStatus>().is_err());
        assert!("Lost".parse::<BookInstanceStatus>().is_err());
    }

    #[test]
    fn test_blank_status_defaults_to_maintenance() {
        let checked = check(form("", ""));
        assert!(!checked.has_errors());

        let instance = NewBookInstance::try_from(&checked.form).unwrap();
        assert_eq!(instance.status, BookInstanceStatus::Maintenance);
        assert_eq!(instance.due_back, None);
    }

    #[test]
    fn test_invalid_due_back_and_status_are_reported() {
        let checked = check(form("Lost", "next week"));

        let fields: Vec<_> = checked.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "due_back"]);
        assert_eq!(checked.errors[1].message, "Invalid date");
    }

    #[test]
    fn test_missing_book_and_imprint() {
        let checked = check(BookInstanceForm::default());

        let messages: Vec<_> = checked.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Book must be specified", "Imprint must be specified"]);
    }
}
