//! Store doubles for handler and streaming tests.

use super::{CategoryStore, MemoryStore, cancellable};
use category_tonic_core::{
    Error, Result,
    types::{Category, CategoryId, NewCategory},
};
use portable_atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Delegates to a [`MemoryStore`] but fails the `fail_on`-th create (1-based)
/// and, optionally, every read.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_on: Option<usize>,
    pub fail_reads: bool,
    creates: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_create(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Number of create calls observed, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[tonic::async_trait]
impl CategoryStore for FlakyStore {
    async fn create(&self, new: NewCategory, token: &CancellationToken) -> Result<Category> {
        let call = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(Error::store("disk I/O error"));
        }
        self.inner.create(new, token).await
    }

    async fn find_all(&self, token: &CancellationToken) -> Result<Vec<Category>> {
        if self.fail_reads {
            return Err(Error::store("database is locked"));
        }
        self.inner.find_all(token).await
    }

    async fn find(&self, id: CategoryId, token: &CancellationToken) -> Result<Category> {
        if self.fail_reads {
            return Err(Error::store("database is locked"));
        }
        self.inner.find(id, token).await
    }
}

/// Never completes an operation unless the token fires.
#[derive(Debug, Default)]
pub struct HangingStore;

#[tonic::async_trait]
impl CategoryStore for HangingStore {
    async fn create(&self, _new: NewCategory, token: &CancellationToken) -> Result<Category> {
        cancellable(token, futures::future::pending()).await
    }

    async fn find_all(&self, token: &CancellationToken) -> Result<Vec<Category>> {
        cancellable(token, futures::future::pending()).await
    }

    async fn find(&self, _id: CategoryId, token: &CancellationToken) -> Result<Category> {
        cancellable(token, futures::future::pending()).await
    }
}
