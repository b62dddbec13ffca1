//! Form validation pipeline.
//!
//! Every submitted form goes through the same ordered steps: trim each field,
//! run the field rules declared on the form type (`validator` attributes),
//! escape the values for safe output, and collect the failures as an ordered
//! list of `{field, message}` pairs. Running the pipeline never fails; the
//! caller branches on [`Checked::has_errors`].

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// A single failed field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A submitted form whose field rules are declared with `validator` attributes
pub trait FormInput: Validate {
    /// Field names in form order, used to order reported errors
    const FIELDS: &'static [&'static str];

    /// Strip leading and trailing whitespace from every field
    fn trim(&mut self);

    /// Escape every field for safe output
    fn escape(&mut self);
}

/// Outcome of running a form through the pipeline
#[derive(Debug, Clone)]
pub struct Checked<T> {
    /// Trimmed and escaped values, kept for re-rendering the form
    pub form: T,
    pub errors: Vec<FieldError>,
}

impl<T> Checked<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Run a form through trim, validate, escape and collect
pub fn check<T: FormInput>(mut form: T) -> Checked<T> {
    form.trim();
    let errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect(&errors, T::FIELDS),
    };
    form.escape();
    Checked { form, errors }
}

fn collect(errors: &ValidationErrors, fields: &[&str]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| by_field.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            })
        })
        .collect()
}

pub fn trim_field(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Escape the characters that are unsafe to echo into markup
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`], for putting stored text back into a form
pub fn unescape_html(value: &str) -> String {
    const ENTITIES: [(&str, &str); 7] = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#x27;", "'"),
        ("&#x2F;", "/"),
        ("&#x5C;", "\\"),
        ("&#96;", "`"),
    ];
    let unescaped = ENTITIES
        .iter()
        .fold(value.to_string(), |text, (entity, c)| text.replace(entity, c));
    // Last, so an escaped entity such as `&amp;lt;` comes back as `&lt;`
    unescaped.replace("&amp;", "&")
}

pub fn escape_field(value: &mut String) {
    *value = escape_html(value);
}

/// Parse an ISO-8601 date or date-time, keeping the date part.
///
/// Accepts calendar (extended and basic), ordinal and week dates, reduced
/// precision (`2024`, `2024-03`) and an optional time of day with fraction
/// and offset.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let (date, time) = match value.find(|c: char| c == 'T' || c == ' ') {
        Some(i) => (&value[..i], Some(&value[i + 1..])),
        None => (value, None),
    };
    if let Some(time) = time {
        parse_iso_time(time)?;
    }
    parse_date_part(date)
}

fn parse_date_part(date: &str) -> Option<NaiveDate> {
    let all_digits = date.bytes().all(|b| b.is_ascii_digit());
    match date.len() {
        4 if all_digits => return NaiveDate::from_ymd_opt(date.parse().ok()?, 1, 1),
        7 if date.as_bytes()[4] == b'-' => {
            return NaiveDate::from_ymd_opt(date[..4].parse().ok()?, date[5..].parse().ok()?, 1)
        }
        8 if all_digits => {
            return NaiveDate::from_ymd_opt(
                date[..4].parse().ok()?,
                date[4..6].parse().ok()?,
                date[6..].parse().ok()?,
            )
        }
        _ => {}
    }
    ["%Y-%m-%d", "%Y-%j", "%G-W%V-%u"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
}

fn parse_iso_time(time: &str) -> Option<NaiveTime> {
    let time = strip_offset(time)?;
    ["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
}

/// Drop a trailing `Z` or `±hh[:mm]` offset; `None` when the offset is malformed
fn strip_offset(time: &str) -> Option<&str> {
    if let Some(local) = time.strip_suffix('Z') {
        return Some(local);
    }
    let Some(sign) = time.rfind(|c: char| c == '+' || c == '-') else {
        return Some(time);
    };
    let offset = &time[sign + 1..];
    let hhmm = match offset.len() {
        2 => format!("{}00", offset),
        4 => offset.to_string(),
        5 if offset.as_bytes()[2] == b':' => offset.replace(':', ""),
        _ => return None,
    };
    NaiveTime::parse_from_str(&hhmm, "%H%M")
        .ok()
        .map(|_| &time[..sign])
}

/// Empty means "not provided" and is accepted
pub fn iso_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || parse_iso_date(value).is_some() {
        return Ok(());
    }
    Err(rule_error("iso_date", "Invalid date"))
}

/// Empty is left to the length rule so a blank reference reports a single error
pub fn identifier(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        return Ok(());
    }
    Err(rule_error("identifier", "Invalid reference"))
}

pub fn identifiers(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().all(|v| Uuid::parse_str(v).is_ok()) {
        return Ok(());
    }
    Err(rule_error("identifiers", "Invalid selection"))
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, Validate)]
    struct NoteForm {
        #[validate(length(min = 1, message = "Heading must not be empty."))]
        heading: String,
        #[validate(length(min = 1, message = "Body must not be empty."))]
        body: String,
        #[validate(custom(function = "iso_date"))]
        date: String,
    }

    impl FormInput for NoteForm {
        const FIELDS: &'static [&'static str] = &["heading", "body", "date"];

        fn trim(&mut self) {
            trim_field(&mut self.heading);
            trim_field(&mut self.body);
            trim_field(&mut self.date);
        }

        fn escape(&mut self) {
            escape_field(&mut self.heading);
            escape_field(&mut self.body);
        }
    }

    #[test]
    fn test_whitespace_only_field_fails_after_trim() {
        let checked = check(NoteForm {
            heading: "   ".into(),
            body: "text".into(),
            ..Default::default()
        });

        assert!(checked.has_errors());
        assert_eq!(
            checked.errors,
            vec![FieldError {
                field: "heading".into(),
                message: "Heading must not be empty.".into(),
            }]
        );
        assert_eq!(checked.form.heading, "");
    }

    #[test]
    fn test_errors_follow_declared_field_order() {
        let checked = check(NoteForm {
            date: "yesterday".into(),
            ..Default::default()
        });

        let fields: Vec<_> = checked.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["heading", "body", "date"]);
    }

    #[test]
    fn test_valid_form_is_trimmed_and_escaped() {
        let checked = check(NoteForm {
            heading: "  <b>Dune</b> ".into(),
            body: "Tom & Jerry".into(),
            date: "2024-02-29".into(),
        });

        assert!(!checked.has_errors());
        assert_eq!(checked.form.heading, "&lt;b&gt;Dune&lt;&#x2F;b&gt;");
        assert_eq!(checked.form.body, "Tom &amp; Jerry");
    }

    #[test]
    fn test_escape_covers_quotes_and_backslash() {
        assert_eq!(escape_html(r#"'a' "b" \c `d`"#), "&#x27;a&#x27; &quot;b&quot; &#x5C;c &#96;d&#96;");
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_iso_dates() {
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1);
        for value in [
            "2024-03-01",
            "20240301",
            "2024-061",
            "2024-W09-5",
            "2024-03-01T10:00:00Z",
            "2024-03-01T10:00:00",
            "2024-03-01T10:00:00.000",
            "2024-03-01T10:00Z",
            "2024-03-01T10:00",
            "2024-03-01T10:00:00.123+02:00",
            "2024-03-01T100000-0500",
            "2024-03-01 10:00:00+01",
        ] {
            assert_eq!(parse_iso_date(value), march_first, "{}", value);
        }
        assert_eq!(parse_iso_date("2024-03"), march_first);
        assert_eq!(parse_iso_date("2024"), NaiveDate::from_ymd_opt(2024, 1, 1));

        for value in [
            "2023-02-30",
            "01/03/2024",
            "2024-13",
            "20241301",
            "2024-03-01T25:00",
            "2024-03-01T10:00+2",
            "2024-03-01T",
        ] {
            assert_eq!(parse_iso_date(value), None, "{}", value);
        }
        assert!(iso_date("").is_ok());
        assert!(iso_date("2024-03-01T10:00:00.000").is_ok());
        assert!(iso_date("soon").is_err());
    }

    #[test]
    fn test_unescape_reverses_escape() {
        for text in ["Sword & Sorcery", r#"<a href="x">'q'</a> \ `t`"#, "&lt; already", "plain"] {
            assert_eq!(unescape_html(&escape_html(text)), text);
        }
    }

    #[test]
    fn test_identifier_rules() {
        let id = Uuid::new_v4().to_string();
        assert!(identifier("").is_ok());
        assert!(identifier(&id).is_ok());
        assert!(identifier("sci-fi").is_err());
        assert!(identifiers(&[]).is_ok());
        assert!(identifiers(&[id.clone(), id]).is_ok());
        assert!(identifiers(&["not-an-id".to_string()]).is_err());
    }
}
