//! Genre model and related types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{escape_field, trim_field, unescape_html, FormInput};

pub const GENRE_LIST_PATH: &str = "/catalog/genres";

/// Genre document. Names are unique by value, checked before insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGenre {
    pub name: String,
}

/// A genre as offered in a multi-select, flagged when part of the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenreOption {
    pub id: Uuid,
    pub name: String,
    pub checked: bool,
}

/// Annotate every genre with whether it belongs to `selected`.
pub fn genre_options(genres: &[Genre], selected: &HashSet<Uuid>) -> Vec<GenreOption> {
    genres
        .iter()
        .map(|genre| GenreOption {
            id: genre.id,
            name: genre.name.clone(),
            checked: selected.contains(&genre.id),
        })
        .collect()
}

/// Genre create / update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GenreForm {
    #[validate(length(min = 1, message = "Genre name required"))]
    pub name: String,
}

impl FormInput for GenreForm {
    const FIELDS: &'static [&'static str] = &["name"];

    fn trim(&mut self) {
        trim_field(&mut self.name);
    }

    fn escape(&mut self) {
        escape_field(&mut self.name);
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            name: unescape_html(&genre.name),
        }
    }
}

impl From<&GenreForm> for NewGenre {
    fn from(form: &GenreForm) -> Self {
        Self {
            name: form.name.clone(),
        }
    }
}
