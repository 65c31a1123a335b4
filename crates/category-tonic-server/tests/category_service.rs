//! End-to-end tests against a real tonic server on an ephemeral localhost
//! port, using the generated client.

#![allow(clippy::unwrap_used)]

use category_tonic_core::{
    Result as StoreResult,
    proto::{
        Blank, CreateCategoryRequest, GetCategoryRequest,
        category_service_client::CategoryServiceClient,
    },
    types::{Category, CategoryId, NewCategory},
};
use category_tonic_server::server::{
    config::{CliArgs, ServerConfig},
    service::{CategoryHandler, build_category_service},
    store::{CategoryStore, MemoryStore, SqliteStore},
};
use clap::Parser;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream, wrappers::TcpListenerStream};
use tokio_util::sync::CancellationToken;
use tonic::{Code, transport::Channel};

fn config() -> ServerConfig {
    let args = CliArgs::parse_from([
        "category-tonic-server",
        "--store",
        "memory",
        "--stream-buffer-size",
        "1",
        "--shutdown-timeout",
        "1",
    ]);
    ServerConfig::try_from(args).unwrap()
}

async fn spawn_server(store: Arc<dyn CategoryStore>) -> CategoryServiceClient<Channel> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = CategoryHandler::new(store, &config());

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(build_category_service(handler))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    let endpoint = format!("http://{addr}");
    for _ in 0..50 {
        if let Ok(client) = CategoryServiceClient::connect(endpoint.clone()).await {
            return client;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {endpoint} never became reachable");
}

fn create_req(name: &str, description: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// Delegates to a [`MemoryStore`] but fails the `fail_on`-th create.
struct FailingNthCreate {
    inner: MemoryStore,
    fail_on: usize,
    calls: AtomicUsize,
}

#[tonic::async_trait]
impl CategoryStore for FailingNthCreate {
    async fn create(&self, new: NewCategory, token: &CancellationToken) -> StoreResult<Category> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            return Err(category_tonic_core::Error::store("constraint failed"));
        }
        self.inner.create(new, token).await
    }

    async fn find_all(&self, token: &CancellationToken) -> StoreResult<Vec<Category>> {
        self.inner.find_all(token).await
    }

    async fn find(&self, id: CategoryId, token: &CancellationToken) -> StoreResult<Category> {
        self.inner.find(id, token).await
    }
}

#[tokio::test]
async fn unary_create_get_and_list() {
    let mut client = spawn_server(Arc::new(MemoryStore::new())).await;

    let empty = client.list_categories(Blank {}).await.unwrap().into_inner();
    assert!(empty.categories.is_empty());

    let created = client
        .create_category(create_req("Electronics", "Gadgets and devices"))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "Electronics");
    assert_eq!(created.description, "Gadgets and devices");

    let fetched = client
        .get_category(GetCategoryRequest { id: 1 })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(fetched, created);

    let missing = client
        .get_category(GetCategoryRequest { id: 999 })
        .await
        .unwrap_err();
    assert_eq!(missing.code(), Code::NotFound);

    let list = client.list_categories(Blank {}).await.unwrap().into_inner();
    assert_eq!(list.categories, vec![created]);
}

#[tokio::test]
async fn client_stream_replies_once_in_request_order() {
    let mut client = spawn_server(Arc::new(MemoryStore::new())).await;
    client
        .create_category(create_req("Electronics", "Gadgets and devices"))
        .await
        .unwrap();

    let requests = tokio_stream::iter(vec![create_req("A", ""), create_req("B", "")]);
    let list = client
        .create_category_stream(requests)
        .await
        .unwrap()
        .into_inner();

    let got: Vec<_> = list
        .categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    assert_eq!(got, [(2, "A"), (3, "B")]);

    let all = client.list_categories(Blank {}).await.unwrap().into_inner();
    assert_eq!(all.categories.len(), 3);
}

#[tokio::test]
async fn client_stream_failure_returns_no_partial_results() {
    let store = Arc::new(FailingNthCreate {
        inner: MemoryStore::new(),
        fail_on: 2,
        calls: AtomicUsize::new(0),
    });
    let mut client = spawn_server(store.clone()).await;

    let requests = tokio_stream::iter(vec![
        create_req("A", ""),
        create_req("B", ""),
        create_req("C", ""),
    ]);
    let status = client.create_category_stream(requests).await.unwrap_err();
    assert_eq!(status.code(), Code::Internal);

    // "A" stays committed; "C" was never read.
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    let all = client.list_categories(Blank {}).await.unwrap().into_inner();
    let names: Vec<_> = all.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["A"]);
}

#[tokio::test]
async fn bidirectional_replies_to_each_request_before_the_next() {
    let mut client = spawn_server(Arc::new(MemoryStore::new())).await;
    let (req_tx, req_rx) = mpsc::channel(1);

    // Queue the first request so the call has something to answer before we
    // wait on the response headers.
    req_tx.send(create_req("A", "desc")).await.unwrap();
    let mut replies = client
        .create_category_stream_bidirectional(ReceiverStream::new(req_rx))
        .await
        .unwrap()
        .into_inner();

    for (i, name) in ["A", "B", "C"].into_iter().enumerate() {
        if i > 0 {
            req_tx.send(create_req(name, "desc")).await.unwrap();
        }
        let reply = replies.next().await.unwrap().unwrap();
        assert_eq!(reply.id, i as i64 + 1);
        assert_eq!(reply.name, name);
        assert_eq!(reply.description, "desc");
    }

    drop(req_tx);
    assert!(replies.next().await.is_none());
}

#[tokio::test]
async fn bidirectional_store_failure_terminates_the_stream() {
    let store = Arc::new(FailingNthCreate {
        inner: MemoryStore::new(),
        fail_on: 2,
        calls: AtomicUsize::new(0),
    });
    let mut client = spawn_server(store.clone()).await;

    let requests = tokio_stream::iter(vec![
        create_req("A", ""),
        create_req("B", ""),
        create_req("C", ""),
    ]);
    let mut replies = client
        .create_category_stream_bidirectional(requests)
        .await
        .unwrap()
        .into_inner();

    assert_eq!(replies.next().await.unwrap().unwrap().name, "A");
    let status = replies.next().await.unwrap().unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert!(replies.next().await.is_none());
    assert_eq!(store.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sqlite_backed_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("data.db").display());
    let store = SqliteStore::connect(&url, 2).await.unwrap();
    let mut client = spawn_server(Arc::new(store)).await;

    let requests = tokio_stream::iter(vec![create_req("A", "first"), create_req("B", "")]);
    let list = client
        .create_category_stream(requests)
        .await
        .unwrap()
        .into_inner();
    assert_eq!(list.categories.len(), 2);

    let first = client
        .get_category(GetCategoryRequest {
            id: list.categories[0].id,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(first.description, "first");
}
