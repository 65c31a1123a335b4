use crate::server::store::CategoryStore;
use category_tonic_core::{
    Error,
    proto::{CategoryList, CreateCategoryRequest},
    types::Category,
};
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// States of a client-streaming bulk create.
#[derive(Debug)]
pub enum BatchState {
    /// Waiting for the next request. Holds every category created so far, in
    /// arrival order.
    Receiving(Vec<Category>),
    /// The client half-closed; the accumulator becomes the single reply.
    Closing(Vec<Category>),
    /// Terminal. On error the accumulator has been discarded.
    Closed(Result<CategoryList, Status>),
}

/// Drives a client-streaming create to completion.
///
/// Each inbound request is created in the store before the next one is read.
/// After the client half-closes, every created category is returned in a
/// single [`CategoryList`]. The first store or read failure ends the stream
/// with that error: nothing else is read and no partial list is returned.
#[allow(clippy::result_large_err)]
pub async fn collect_created<S, I>(
    store: &S,
    inbound: &mut I,
    token: &CancellationToken,
) -> Result<CategoryList, Status>
where
    S: CategoryStore + ?Sized,
    I: Stream<Item = Result<CreateCategoryRequest, Status>> + Unpin,
{
    let mut state = BatchState::Receiving(Vec::new());

    loop {
        state = match state {
            BatchState::Receiving(mut created) => {
                let next = tokio::select! {
                    biased;
                    () = token.cancelled() => Some(Err(Status::from(Error::RequestCancelled))),
                    next = inbound.next() => next,
                };

                match next {
                    Some(Ok(req)) => match store.create(req.into(), token).await {
                        Ok(category) => {
                            tracing::trace!(id = category.id, "created category from stream");
                            created.push(category);
                            BatchState::Receiving(created)
                        }
                        Err(e) => {
                            tracing::debug!(
                                received = created.len() + 1,
                                "store failed, discarding {} created categories",
                                created.len()
                            );
                            BatchState::Closed(Err(e.into_internal("create category")))
                        }
                    },
                    Some(Err(status)) => BatchState::Closed(Err(status)),
                    None => BatchState::Closing(created),
                }
            }
            BatchState::Closing(created) => {
                tracing::debug!(count = created.len(), "client half-closed, replying");
                BatchState::Closed(Ok(created.into_iter().collect()))
            }
            BatchState::Closed(outcome) => return outcome,
        };
    }
}
