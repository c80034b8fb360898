use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::types::{Bookmark, BookmarkPayload, BookmarkResponse, Dependencies};
use crate::validation::{validate_new, validate_patch};

#[derive(Clone)]
pub struct BookmarkService {
    deps: Arc<Dependencies>,
}

impl BookmarkService {
    pub fn new(deps: Arc<Dependencies>) -> Self {
        Self { deps }
    }

    pub async fn list(&self) -> Result<Vec<BookmarkResponse>, AppError> {
        let bookmarks = self.deps.store.list().await?;
        info!("bookmarks listed: {}", bookmarks.len());
        Ok(bookmarks.into_iter().map(BookmarkResponse::from).collect())
    }

    /// Looks up a bookmark or fails with the canonical not-found error.
    /// Shared by every id-scoped operation.
    pub async fn resolve(&self, id: i64) -> Result<Bookmark, AppError> {
        match self.deps.store.get(id).await? {
            Some(bookmark) => Ok(bookmark),
            None => {
                info!("bookmark not found: id={}", id);
                Err(AppError::not_found())
            }
        }
    }

    pub async fn get(&self, id: i64) -> Result<BookmarkResponse, AppError> {
        let bookmark = self.resolve(id).await?;
        Ok(bookmark.into())
    }

    pub async fn create(&self, payload: BookmarkPayload) -> Result<BookmarkResponse, AppError> {
        let new = validate_new(&payload).inspect_err(|err| {
            info!("bookmark create rejected: {}", err);
        })?;

        let bookmark = self.deps.store.insert(new).await?;
        info!("bookmark created: id={}", bookmark.id);
        Ok(bookmark.into())
    }

    /// The body is checked only after the id resolves, so an unknown id is
    /// a 404 even when the body is unreadable.
    pub async fn update(
        &self,
        id: i64,
        payload: Result<BookmarkPayload, AppError>,
    ) -> Result<(), AppError> {
        self.resolve(id).await?;
        let payload = payload?;

        let patch = validate_patch(&payload).inspect_err(|err| {
            info!("bookmark update rejected: id={} reason={}", id, err);
        })?;

        if self.deps.store.update(id, patch).await? == 0 {
            info!("bookmark update missing row after lookup: id={}", id);
            return Err(AppError::not_found());
        }

        info!("bookmark updated: id={}", id);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        info!("bookmark delete requested: id={}", id);
        self.resolve(id).await?;

        if self.deps.store.delete(id).await? == 0 {
            info!("bookmark delete missing row after lookup: id={}", id);
            return Err(AppError::not_found());
        }

        info!("bookmark deleted: id={}", id);
        Ok(())
    }
}
