//! Form inputs as typed by the user, validated before anything is sent to the API.

pub mod auth;
pub mod comment;
pub mod project;
pub mod task;
pub mod user;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validation code of an empty required field. It wins over any other failure on the same field.
const REQUIRED: &str = "required";

/// First failing rule's message for each invalid field, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: &str, message: impl Into<String>) -> FieldErrors {
        FieldErrors(BTreeMap::from([(field.to_owned(), message.into())]))
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(value: ValidationErrors) -> Self {
        let messages = value
            .field_errors()
            .into_iter()
            .filter_map(|(field, errors)| {
                let shown = errors
                    .iter()
                    .find(|err| err.code == REQUIRED)
                    .or_else(|| errors.first())?;
                let message = shown
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                Some((field.to_owned(), message))
            })
            .collect();

        FieldErrors(messages)
    }
}

/// Runs a form's validation rules, reporting failures per field
pub fn check(form: &impl Validate) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}

/// Rejects values that are empty once surrounding whitespace is dropped
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

pub(crate) fn parse_due_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Due dates must be present and written as `YYYY-MM-DD`
pub(crate) fn due_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new(REQUIRED);
        err.message = Some("Due date is required".into());
        return Err(err);
    }
    if parse_due_date(value).is_none() {
        let mut err = ValidationError::new("date");
        err.message = Some("Due date must be a date in YYYY-MM-DD form".into());
        return Err(err);
    }
    Ok(())
}
