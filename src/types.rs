use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::services::Services;
use crate::store::BookmarkStore;

#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<Dependencies>,
    pub services: Services,
}

impl AppState {
    pub fn new(deps: Dependencies) -> Self {
        let deps = Arc::new(deps);
        let services = Services::new(deps.clone());
        Self { deps, services }
    }
}

pub struct Dependencies {
    pub store: Arc<dyn BookmarkStore>,
    pub api_token: String,
}

/// A stored bookmark row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<i64>,
}

/// Raw request body for create and update. Values stay untyped until
/// validation; unknown keys are dropped by serde.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookmarkPayload {
    pub title: Option<Value>,
    pub url: Option<Value>,
    pub description: Option<Value>,
    pub rating: Option<Value>,
}

/// Outbound representation. Free-text fields are sanitized on conversion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkResponse {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: i64,
}

impl From<Bookmark> for BookmarkResponse {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: sanitize(&bookmark.title).into_owned(),
            url: bookmark.url,
            description: sanitize(&bookmark.description).into_owned(),
            rating: bookmark.rating,
        }
    }
}

/// A browser only opens a tag on `<` followed by a letter, `/`, `!` or `?`.
/// Text without one cannot carry markup and is returned untouched, so `&`
/// and a bare `<` survive a round trip without being entity-encoded.
fn has_markup(text: &str) -> bool {
    text.as_bytes().windows(2).any(|pair| {
        pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || b"/!?".contains(&pair[1]))
    })
}

pub fn sanitize(text: &str) -> Cow<'_, str> {
    if has_markup(text) {
        Cow::Owned(ammonia::clean(text))
    } else {
        Cow::Borrowed(text)
    }
}
