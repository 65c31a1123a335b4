//! # `category-tonic-core`
//!
//! Shared protocol definitions for the category gRPC service: the generated
//! `tonic`/`prost` bindings for `proto/category.proto`, the domain types the
//! server and its stores exchange, and the unified [`Error`] type together
//! with its mapping onto [`tonic::Status`].
//!
//! ## Module Overview
//!
//! - [`proto`] - Generated message types, the `CategoryService` server trait
//!   and client, plus the encoded descriptor set used for reflection.
//! - [`types`] - [`types::Category`], [`types::NewCategory`] and conversions
//!   to and from the wire messages.
//! - [`error`] - [`Error`] and the per-operation status mapping.

mod common;
pub use common::*;

/// gRPC service and message definitions generated from
/// `proto/category.proto`.
///
/// ## Service
///
/// - `CreateCategory` - unary create.
/// - `ListCategories` - unary list of every category.
/// - `GetCategory` - unary lookup by id.
/// - `CreateCategoryStream` - client-streaming bulk create, one reply after
///   the client half-closes.
/// - `CreateCategoryStreamBidirectional` - one reply per request, in order.
pub mod proto {
    #![allow(missing_docs)]
    #![allow(clippy::doc_markdown)]
    tonic::include_proto!("category");

    /// Encoded `FileDescriptorSet` for `category.proto`, registered with the
    /// reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("category_descriptor");
}
