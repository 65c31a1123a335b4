//! gRPC service implementation and call lifecycle.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`CategoryHandler`).
//! - [`lifecycle`] - call admission, per-call cancellation tokens and
//!   graceful shutdown.

pub mod handler;
pub mod lifecycle;

pub use handler::CategoryHandler;

use category_tonic_core::proto::category_service_server::CategoryServiceServer;
use tonic::codec::CompressionEncoding;

/// Wraps `handler` in the generated tonic server with zstd, gzip and deflate
/// enabled in both directions.
pub fn build_category_service(handler: CategoryHandler) -> CategoryServiceServer<CategoryHandler> {
    CategoryServiceServer::new(handler)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}
