use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::types::{Bookmark, BookmarkPatch, NewBookmark};

/// Persistence collaborator for bookmarks. Owns every durable row; the
/// services above it hold no state of their own.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Bookmark>>;

    async fn get(&self, id: i64) -> anyhow::Result<Option<Bookmark>>;

    /// Inserts the row and returns it with its assigned id.
    async fn insert(&self, bookmark: NewBookmark) -> anyhow::Result<Bookmark>;

    /// Writes the supplied fields only. Returns the number of rows touched.
    async fn update(&self, id: i64, patch: BookmarkPatch) -> anyhow::Result<u64>;

    async fn delete(&self, id: i64) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("parse database url {}", database_url))?
            .create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("connect sqlite")?;

        Ok(Self::new(db))
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL CHECK (title <> ''),
                url TEXT NOT NULL CHECK (url <> ''),
                description TEXT NOT NULL DEFAULT '',
                rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5)
            );
            "#,
        )
        .execute(&self.db)
        .await
        .context("create bookmarks table")?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl BookmarkStore for SqliteStore {
    async fn list(&self) -> anyhow::Result<Vec<Bookmark>> {
        let rows = sqlx::query_as(
            r#"
            SELECT id, title, url, description, rating
            FROM bookmarks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Bookmark>> {
        let row = sqlx::query_as(
            "SELECT id, title, url, description, rating FROM bookmarks WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, bookmark: NewBookmark) -> anyhow::Result<Bookmark> {
        let result = sqlx::query(
            "INSERT INTO bookmarks (title, url, description, rating) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&bookmark.title)
        .bind(&bookmark.url)
        .bind(&bookmark.description)
        .bind(bookmark.rating)
        .execute(&self.db)
        .await?;

        Ok(Bookmark {
            id: result.last_insert_rowid(),
            title: bookmark.title,
            url: bookmark.url,
            description: bookmark.description,
            rating: bookmark.rating,
        })
    }

    async fn update(&self, id: i64, patch: BookmarkPatch) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE bookmarks
            SET title = COALESCE(?1, title),
                url = COALESCE(?2, url),
                description = COALESCE(?3, description),
                rating = COALESCE(?4, rating)
            WHERE id = ?5
            "#,
        )
        .bind(patch.title)
        .bind(patch.url)
        .bind(patch.description)
        .bind(patch.rating)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
