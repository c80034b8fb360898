//! Inbound payload rules for bookmarks.
//!
//! Checks run in a fixed order and stop at the first failure, so a payload
//! missing both `title` and `url` reports `title`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::types::{BookmarkPatch, BookmarkPayload, NewBookmark};

pub const MIN_RATING: i64 = 0;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Url,
    Description,
    Rating,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Url => "url",
            Field::Description => "description",
            Field::Rating => "rating",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    Required(Field),
    #[error("'rating' must be a number between 0 and 5")]
    RatingOutOfRange,
    #[error("'{0}' must be a string")]
    NotText(Field),
    #[error("Request body must contain either title, url, description or rating")]
    EmptyPatch,
}

const REQUIRED_ON_CREATE: [Field; 3] = [Field::Title, Field::Url, Field::Rating];
const UPDATABLE: [Field; 4] = [Field::Title, Field::Url, Field::Description, Field::Rating];

/// Returns the value for `field` if the client actually supplied one.
/// `null` and the empty string count as absent. `0` is a supplied value:
/// it is a valid rating, so it must not be read as missing.
fn supplied(payload: &BookmarkPayload, field: Field) -> Option<&Value> {
    let value = match field {
        Field::Title => payload.title.as_ref(),
        Field::Url => payload.url.as_ref(),
        Field::Description => payload.description.as_ref(),
        Field::Rating => payload.rating.as_ref(),
    }?;
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other),
    }
}

fn text(field: Field, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::NotText(field)),
    }
}

/// Coerces numbers and numeric strings; anything else, fractional values and
/// values outside 0..=5 are rejected.
fn rating(value: &Value) -> Result<i64, ValidationError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.fract() == 0.0 && n >= MIN_RATING as f64 && n <= MAX_RATING as f64 => {
            Ok(n as i64)
        }
        _ => Err(ValidationError::RatingOutOfRange),
    }
}

fn optional<T>(
    payload: &BookmarkPayload,
    field: Field,
    convert: impl Fn(&Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    supplied(payload, field).map(convert).transpose()
}

pub fn validate_new(payload: &BookmarkPayload) -> Result<NewBookmark, ValidationError> {
    if let Some(missing) = REQUIRED_ON_CREATE
        .into_iter()
        .find(|field| supplied(payload, *field).is_none())
    {
        return Err(ValidationError::Required(missing));
    }

    let required = |field: Field| supplied(payload, field).ok_or(ValidationError::Required(field));

    Ok(NewBookmark {
        title: text(Field::Title, required(Field::Title)?)?,
        url: text(Field::Url, required(Field::Url)?)?,
        rating: rating(required(Field::Rating)?)?,
        description: optional(payload, Field::Description, |v| text(Field::Description, v))?
            .unwrap_or_default(),
    })
}

pub fn validate_patch(payload: &BookmarkPayload) -> Result<BookmarkPatch, ValidationError> {
    if UPDATABLE
        .into_iter()
        .all(|field| supplied(payload, field).is_none())
    {
        return Err(ValidationError::EmptyPatch);
    }

    Ok(BookmarkPatch {
        title: optional(payload, Field::Title, |v| text(Field::Title, v))?,
        url: optional(payload, Field::Url, |v| text(Field::Url, v))?,
        description: optional(payload, Field::Description, |v| text(Field::Description, v))?,
        rating: optional(payload, Field::Rating, rating)?,
    })
}
