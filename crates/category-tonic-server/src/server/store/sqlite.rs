use super::{CategoryStore, cancellable};
use category_tonic_core::{
    Error, Result,
    types::{Category, CategoryId, NewCategory},
};
use core::str::FromStr;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio_util::sync::CancellationToken;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
)";

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

/// SQLite-backed category store.
///
/// Ids come from SQLite's `AUTOINCREMENT`, so they are never reused even if
/// rows are removed out of band.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url`, creating the database file if the URL allows it,
    /// and ensures the `categories` table exists.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        use anyhow::Context;

        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid DATABASE_URL `{url}`"))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open `{url}`"))?;

        Self::with_pool(pool)
            .await
            .context("failed to initialise the categories table")
    }

    /// Wraps an existing pool, creating the schema if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(Error::store)?;
        tracing::debug!("categories table ready");
        Ok(Self { pool })
    }
}

#[tonic::async_trait]
impl CategoryStore for SqliteStore {
    #[tracing::instrument(level = "debug", skip_all, fields(name = %new.name))]
    async fn create(&self, new: NewCategory, token: &CancellationToken) -> Result<Category> {
        cancellable(token, async {
            sqlx::query_as::<_, CategoryRow>(
                "INSERT INTO categories (name, description) VALUES (?, ?)
                 RETURNING id, name, description",
            )
            .bind(&new.name)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await
            .map(Category::from)
            .map_err(Error::store)
        })
        .await
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn find_all(&self, token: &CancellationToken) -> Result<Vec<Category>> {
        cancellable(token, async {
            let rows = sqlx::query_as::<_, CategoryRow>(
                "SELECT id, name, description FROM categories ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(Error::store)?;
            Ok(rows.into_iter().map(Category::from).collect())
        })
        .await
    }

    #[tracing::instrument(level = "debug", skip(self, token))]
    async fn find(&self, id: CategoryId, token: &CancellationToken) -> Result<Category> {
        cancellable(token, async {
            sqlx::query_as::<_, CategoryRow>(
                "SELECT id, name, description FROM categories WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::store)?
            .map(Category::from)
            .ok_or(Error::NotFound { id })
        })
        .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
