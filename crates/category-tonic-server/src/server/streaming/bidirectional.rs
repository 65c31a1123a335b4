use crate::server::store::CategoryStore;
use category_tonic_core::{
    Error,
    proto::{Category, CreateCategoryRequest},
};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;

/// States of a bidirectional create stream.
#[derive(Debug)]
pub enum BidiState {
    /// Ready to read the next request. `sent` counts replies handed to the
    /// transport so far.
    Open { sent: usize },
    /// Terminal. `Ok` carries the number of categories created.
    Closed(Result<usize, Status>),
}

/// Drives a bidirectional create stream to completion.
///
/// For each inbound request the category is created and sent on `outbound`
/// before the next request is read, so the n-th reply always answers the n-th
/// request. The stream ends cleanly when the client half-closes.
///
/// On failure (store, inbound read, or `outbound` closed) the error is sent
/// on `outbound` as the terminal item when possible, and returned.
#[allow(clippy::result_large_err)]
pub async fn create_each<S, I>(
    store: &S,
    inbound: &mut I,
    outbound: &mpsc::Sender<Result<Category, Status>>,
    token: &CancellationToken,
) -> Result<usize, Status>
where
    S: CategoryStore + ?Sized,
    I: Stream<Item = Result<CreateCategoryRequest, Status>> + Unpin,
{
    let mut state = BidiState::Open { sent: 0 };

    loop {
        state = match state {
            BidiState::Open { sent } => {
                let next = tokio::select! {
                    biased;
                    () = token.cancelled() => Some(Err(Status::from(Error::RequestCancelled))),
                    () = outbound.closed() => Some(Err(Status::from(Error::ChannelError {
                        context: "client stopped receiving".to_string(),
                    }))),
                    next = inbound.next() => next,
                };

                match next {
                    Some(Ok(req)) => {
                        // Stop waiting on the store as soon as nobody can
                        // receive the reply.
                        let created = tokio::select! {
                            biased;
                            () = outbound.closed() => Err(Error::RequestCancelled),
                            res = store.create(req.into(), token) => res,
                        };

                        match created {
                            Ok(category) => match outbound.send(Ok(category.into())).await {
                                Ok(()) => BidiState::Open { sent: sent + 1 },
                                Err(e) => BidiState::Closed(Err(Error::ChannelError {
                                    context: format!("Failed to forward category: {e}"),
                                }
                                .into())),
                            },
                            Err(e) => BidiState::Closed(Err(e.into_internal("create category"))),
                        }
                    }
                    Some(Err(status)) => BidiState::Closed(Err(status)),
                    None => BidiState::Closed(Ok(sent)),
                }
            }
            BidiState::Closed(Ok(sent)) => {
                tracing::debug!(sent, "client half-closed bidirectional stream");
                return Ok(sent);
            }
            BidiState::Closed(Err(status)) => {
                // Best effort: the client may already be gone.
                if let Err(_e) = outbound.send(Err(status.clone())).await {
                    tracing::debug!("Failed to forward terminal error: {}", status.message());
                }
                return Err(status);
            }
        };
    }
}
