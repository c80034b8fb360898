#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use bookmarks::controllers::build_router;
use bookmarks::store::{BookmarkStore, SqliteStore};
use bookmarks::types::{AppState, Bookmark, BookmarkPatch, Dependencies, NewBookmark};

pub const TOKEN: &str = "test-token";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Wraps a real store and counts every call that reaches it.
pub struct CountingStore {
    inner: SqliteStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookmarkStore for CountingStore {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        self.hit();
        self.inner.list().await
    }

    async fn get(&self, id: i64) -> Result<Option<Bookmark>> {
        self.hit();
        self.inner.get(id).await
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark> {
        self.hit();
        self.inner.insert(bookmark).await
    }

    async fn update(&self, id: i64, patch: BookmarkPatch) -> Result<u64> {
        self.hit();
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        self.hit();
        self.inner.delete(id).await
    }
}

/// Every call fails, standing in for an unreachable database.
pub struct FailingStore;

#[async_trait]
impl BookmarkStore for FailingStore {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        anyhow::bail!("connection refused")
    }

    async fn get(&self, _id: i64) -> Result<Option<Bookmark>> {
        anyhow::bail!("connection refused")
    }

    async fn insert(&self, _bookmark: NewBookmark) -> Result<Bookmark> {
        anyhow::bail!("connection refused")
    }

    async fn update(&self, _id: i64, _patch: BookmarkPatch) -> Result<u64> {
        anyhow::bail!("connection refused")
    }

    async fn delete(&self, _id: i64) -> Result<u64> {
        anyhow::bail!("connection refused")
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<CountingStore>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let inner = SqliteStore::connect("sqlite::memory:", 1).await?;
        inner.migrate().await?;
        let store = Arc::new(CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        });
        let router = router_with(store.clone());
        Ok(Self { router, store })
    }

    /// Inserts directly through the store, bypassing validation and the
    /// outbound sanitizer.
    pub async fn seed(
        &self,
        title: &str,
        url: &str,
        description: &str,
        rating: i64,
    ) -> Result<i64> {
        let bookmark = self
            .store
            .inner
            .insert(NewBookmark {
                title: title.to_string(),
                url: url.to_string(),
                description: description.to_string(),
                rating,
            })
            .await?;
        Ok(bookmark.id)
    }

    pub async fn row_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM bookmarks")
            .fetch_one(self.store.inner.pool())
            .await?;
        Ok(count)
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        send(&self.router, method, path, Some(TOKEN), body).await
    }

    pub async fn send_as(
        &self,
        token: Option<&str>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        send(&self.router, method, path, token, body).await
    }

    /// Sends `body` verbatim with a JSON content type, for bodies that are
    /// not valid JSON.
    pub async fn send_raw(&self, method: Method, path: &str, body: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(AUTHORIZATION, format!("Bearer {}", TOKEN))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        dispatch(&self.router, request).await
    }
}

pub fn router_with(store: Arc<dyn BookmarkStore>) -> Router {
    build_router(AppState::new(Dependencies {
        store,
        api_token: TOKEN.to_string(),
    }))
}

pub async fn send(
    router: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<TestResponse> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    dispatch(router, request).await
}

async fn dispatch(router: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(TestResponse {
        status,
        headers,
        body,
    })
}
