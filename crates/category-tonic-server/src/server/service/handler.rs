//! gRPC service implementation for categories.
//!
//! This module defines [`CategoryHandler`], the concrete implementation of the
//! generated [`CategoryService`] trait. Unary calls go straight to the store;
//! the two streaming calls delegate to the drivers in
//! [`crate::server::streaming`].
//!
//! ## Responsibilities
//!
//! - Admit each call through the [`Lifecycle`] and thread its per-call
//!   cancellation token into every store operation.
//! - Map store errors to statuses: create and list fail with `INTERNAL`,
//!   lookups fail with `NOT_FOUND`.
//! - Run the bidirectional driver on its own task, feeding a bounded response
//!   channel.
//! - Refuse new calls and cancel leftover work on shutdown.

use super::lifecycle::{CallGuard, Lifecycle};
use crate::server::{
    config::ServerConfig,
    store::CategoryStore,
    streaming::{collect_created, create_each},
    telemetry::{
        decrement_streams_inflight, increment_categories_created, increment_errors,
        increment_requests, increment_streams_inflight, record_stream_duration,
    },
};
use category_tonic_core::proto::{
    Blank, Category, CategoryList, CreateCategoryRequest, GetCategoryRequest,
    category_service_server::CategoryService,
};
use core::pin::Pin;
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

/// Category gRPC service backed by a [`CategoryStore`].
///
/// Cloning is cheap; clones share the store and the lifecycle.
#[derive(Clone)]
pub struct CategoryHandler {
    store: Arc<dyn CategoryStore>,
    lifecycle: Arc<Lifecycle>,
    stream_buffer_size: usize,
}

impl CategoryHandler {
    pub fn new(store: Arc<dyn CategoryStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            lifecycle: Arc::new(Lifecycle::new(config.shutdown_timeout)),
            stream_buffer_size: config.stream_buffer_size,
        }
    }

    /// Stops admitting calls, drains or cancels in-flight ones, then closes
    /// the store.
    pub async fn shutdown(&self) {
        self.lifecycle.shutdown().await;
        self.store.close().await;
    }

    #[allow(clippy::result_large_err)]
    fn admit(&self, method: &'static str) -> Result<CallGuard, Status> {
        let call = self.lifecycle.admit().map_err(|e| {
            tracing::debug!("Refusing {method}: {e}");
            Status::from(e)
        })?;
        increment_requests(method);
        Ok(call)
    }
}

/// Streaming call bookkeeping; records duration and in-flight count even
/// when the call future is dropped early.
struct StreamTimer {
    start: Instant,
}

impl StreamTimer {
    fn start() -> Self {
        increment_streams_inflight();
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for StreamTimer {
    fn drop(&mut self) {
        decrement_streams_inflight();
        record_stream_duration(self.start.elapsed().as_secs_f64() * 1000.0);
    }
}

type CategoryStream = Pin<Box<dyn Stream<Item = Result<Category, Status>> + Send>>;

#[tonic::async_trait]
impl CategoryService for CategoryHandler {
    type CreateCategoryStreamBidirectionalStream = CategoryStream;

    #[tracing::instrument(skip_all, fields(name = %req.get_ref().name))]
    async fn create_category(
        &self,
        req: Request<CreateCategoryRequest>,
    ) -> Result<Response<Category>, Status> {
        let call = self.admit("CreateCategory")?;

        let category = self
            .store
            .create(req.into_inner().into(), call.token())
            .await
            .map_err(|e| {
                tracing::warn!("CreateCategory failed: {e}");
                increment_errors("CreateCategory");
                e.into_internal("create category")
            })?;

        increment_categories_created(1);
        tracing::debug!(id = category.id, "created category");
        Ok(Response::new(category.into()))
    }

    #[tracing::instrument(skip_all)]
    async fn list_categories(
        &self,
        _req: Request<Blank>,
    ) -> Result<Response<CategoryList>, Status> {
        let call = self.admit("ListCategories")?;

        let categories = self.store.find_all(call.token()).await.map_err(|e| {
            tracing::warn!("ListCategories failed: {e}");
            increment_errors("ListCategories");
            e.into_internal("list categories")
        })?;

        tracing::debug!(count = categories.len(), "listed categories");
        Ok(Response::new(categories.into_iter().collect()))
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn get_category(
        &self,
        req: Request<GetCategoryRequest>,
    ) -> Result<Response<Category>, Status> {
        let call = self.admit("GetCategory")?;
        let id = req.into_inner().id;

        let category = self.store.find(id, call.token()).await.map_err(|e| {
            tracing::debug!("GetCategory({id}) failed: {e}");
            increment_errors("GetCategory");
            e.into_not_found()
        })?;

        Ok(Response::new(category.into()))
    }

    #[tracing::instrument(skip_all)]
    async fn create_category_stream(
        &self,
        req: Request<Streaming<CreateCategoryRequest>>,
    ) -> Result<Response<CategoryList>, Status> {
        let call = self.admit("CreateCategoryStream")?;
        let _timer = StreamTimer::start();
        let mut inbound = req.into_inner();

        match collect_created(self.store.as_ref(), &mut inbound, call.token()).await {
            Ok(list) => {
                increment_categories_created(list.categories.len() as u64);
                Ok(Response::new(list))
            }
            Err(status) => {
                tracing::warn!("CreateCategoryStream failed: {}", status.message());
                increment_errors("CreateCategoryStream");
                Err(status)
            }
        }
    }

    /// Spawns the bidirectional driver and returns the receiving half of its
    /// response channel.
    ///
    /// The driver owns the [`CallGuard`], so the per-call token stays live
    /// until the stream ends and is cancelled as soon as it does.
    #[tracing::instrument(skip_all)]
    async fn create_category_stream_bidirectional(
        &self,
        req: Request<Streaming<CreateCategoryRequest>>,
    ) -> Result<Response<Self::CreateCategoryStreamBidirectionalStream>, Status> {
        let call = self.admit("CreateCategoryStreamBidirectional")?;
        let (resp_tx, resp_rx) = mpsc::channel(self.stream_buffer_size);
        let store = Arc::clone(&self.store);
        let mut inbound = req.into_inner();

        let fut = async move {
            let _timer = StreamTimer::start();
            match create_each(store.as_ref(), &mut inbound, &resp_tx, call.token()).await {
                Ok(sent) => increment_categories_created(sent as u64),
                Err(status) => {
                    tracing::warn!(
                        "CreateCategoryStreamBidirectional failed: {}",
                        status.message()
                    );
                    increment_errors("CreateCategoryStreamBidirectional");
                }
            }
            drop(call);
        };
        tokio::spawn(fut.instrument(tracing::info_span!("bidirectional")));

        Ok(Response::new(
            Box::pin(ReceiverStream::new(resp_rx)) as Self::CreateCategoryStreamBidirectionalStream
        ))
    }
}
