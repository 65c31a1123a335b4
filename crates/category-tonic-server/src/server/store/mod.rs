//! Persistence backends for categories.
//!
//! The service talks to storage exclusively through [`CategoryStore`]. Every
//! operation receives the per-call [`CancellationToken`]; implementations
//! must stop waiting and return [`Error::RequestCancelled`] once it fires, so
//! a slow or hung backend never outlives the call that issued it.
//!
//! ## Backends
//!
//! - [`memory::MemoryStore`] - process-local, ids assigned sequentially from 1.
//! - [`sqlite::SqliteStore`] - SQLite via a `sqlx` connection pool.

pub mod memory;
pub mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use crate::server::config::{ServerConfig, StoreKind};
use category_tonic_core::{
    Error, Result,
    types::{Category, CategoryId, NewCategory},
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Create/read access to persisted categories.
///
/// Implementations must be safe to call concurrently from many in-flight
/// calls.
#[tonic::async_trait]
pub trait CategoryStore: Send + Sync + 'static {
    /// Persists a new category and returns it with its assigned id.
    async fn create(&self, new: NewCategory, token: &CancellationToken) -> Result<Category>;

    /// Returns every category in id order.
    async fn find_all(&self, token: &CancellationToken) -> Result<Vec<Category>>;

    /// Returns the category with `id`, or [`Error::NotFound`].
    async fn find(&self, id: CategoryId, token: &CancellationToken) -> Result<Category>;

    /// Releases backend resources. Called once during shutdown.
    async fn close(&self) {}
}

/// Opens the store selected by `config`.
pub async fn open(config: &ServerConfig) -> anyhow::Result<Arc<dyn CategoryStore>> {
    let store: Arc<dyn CategoryStore> = match config.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Sqlite => Arc::new(
            SqliteStore::connect(&config.database_url, config.database_max_connections).await?,
        ),
    };
    Ok(store)
}

/// Races `fut` against `token`.
///
/// Returns [`Error::RequestCancelled`] without polling `fut` if the token has
/// already fired; the future is dropped as soon as cancellation is observed.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(Error::RequestCancelled);
    }

    tokio::select! {
        biased;
        () = token.cancelled() => Err(Error::RequestCancelled),
        res = fut => res,
    }
}
