//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    validation::{self, escape_field, trim_field, unescape_html, FormInput},
};

pub const AUTHOR_LIST_PATH: &str = "/catalog/authors";

/// Full author document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name, family name first
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

/// Author fields as written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthor {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn with_id(self, id: Uuid) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

/// Author create / update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(min = 1, message = "First name must be specified."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Family name must be specified."))]
    pub family_name: String,
    #[validate(custom(function = "validation::iso_date"))]
    pub date_of_birth: String,
    #[validate(custom(function = "validation::iso_date"))]
    pub date_of_death: String,
}

impl FormInput for AuthorForm {
    const FIELDS: &'static [&'static str] =
        &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn trim(&mut self) {
        trim_field(&mut self.first_name);
        trim_field(&mut self.family_name);
        trim_field(&mut self.date_of_birth);
        trim_field(&mut self.date_of_death);
    }

    fn escape(&mut self) {
        escape_field(&mut self.first_name);
        escape_field(&mut self.family_name);
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: unescape_html(&author.first_name),
            family_name: unescape_html(&author.family_name),
            date_of_birth: format_date(author.date_of_birth),
            date_of_death: format_date(author.date_of_death),
        }
    }
}

impl TryFrom<&AuthorForm> for NewAuthor {
    type Error = AppError;

    fn try_from(form: &AuthorForm) -> AppResult<Self> {
        Ok(Self {
            first_name: form.first_name.clone(),
            family_name: form.family_name.clone(),
            date_of_birth: optional_date(&form.date_of_birth)?,
            date_of_death: optional_date(&form.date_of_death)?,
        })
    }
}

pub(crate) fn optional_date(value: &str) -> AppResult<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }
    validation::parse_iso_date(value)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", value)))
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check;

    #[test]
    fn test_missing_names_are_reported_in_order() {
        let checked = check(AuthorForm {
            first_name: " ".into(),
            date_of_birth: "1920-13-01".into(),
            ..Default::default()
        });

        let fields: Vec<_> = checked.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["first_name", "family_name", "date_of_birth"]);
    }

    #[test]
    fn test_form_converts_blank_dates_to_none() {
        let checked = check(AuthorForm {
            first_name: "Frank".into(),
            family_name: "Herbert".into(),
            date_of_birth: "1920-10-08".into(),
            date_of_death: "".into(),
        });
        assert!(!checked.has_errors());

        let author = NewAuthor::try_from(&checked.form).unwrap();
        assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1920, 10, 8));
        assert_eq!(author.date_of_death, None);
    }

    #[test]
    fn test_name_and_url() {
        let id = Uuid::new_v4();
        let author = Author {
            id,
            first_name: "Ursula".into(),
            family_name: "Le Guin".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.name(), "Le Guin, Ursula");
        assert_eq!(author.url(), format!("/catalog/author/{}", id));
        assert_eq!(AuthorForm::from(&author).date_of_birth, "");
    }
}
