use super::{CategoryStore, cancellable};
use category_tonic_core::{
    Error, Result,
    types::{Category, CategoryId, NewCategory},
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// In-process category store.
///
/// Records live in a `Vec` kept in id order; ids start at 1 and increase by
/// one per successful create. A single [`Mutex`] serialises all access, which
/// is what makes concurrent calls safe.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: CategoryId,
    rows: Vec<Category>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[tonic::async_trait]
impl CategoryStore for MemoryStore {
    async fn create(&self, new: NewCategory, token: &CancellationToken) -> Result<Category> {
        cancellable(token, async {
            let mut inner = self.inner.lock();
            inner.last_id += 1;
            let category = Category::from_new(inner.last_id, new);
            inner.rows.push(category.clone());
            Ok(category)
        })
        .await
    }

    async fn find_all(&self, token: &CancellationToken) -> Result<Vec<Category>> {
        cancellable(token, async { Ok(self.inner.lock().rows.clone()) }).await
    }

    async fn find(&self, id: CategoryId, token: &CancellationToken) -> Result<Category> {
        cancellable(token, async {
            let inner = self.inner.lock();
            inner
                .rows
                .binary_search_by_key(&id, |c| c.id)
                .map(|idx| inner.rows[idx].clone())
                .map_err(|_| Error::NotFound { id })
        })
        .await
    }
}
