//! Error types for the category service.
//!
//! This module defines the central `Error` enum shared by the stores and the
//! gRPC handlers. It implements `From<Error>` for `tonic::Status` for the
//! generic mapping and exposes the per-operation mappings the handlers use:
//!
//! - create and list failures surface as `INTERNAL`
//!   ([`Error::into_internal`]).
//! - lookup failures always surface as `NOT_FOUND`
//!   ([`Error::into_not_found`]); absence and backend failure are not
//!   distinguished.
//!
//! ## Error Cases
//! - `Store`: The backing store failed to complete the operation.
//! - `NotFound`: No category exists for the requested id.
//! - `RequestCancelled`: The call was cancelled before the store finished.
//! - `ServiceShutdown`: The service is shutting down.
//! - `ChannelError`: A response could not be handed to the transport.

use crate::types::CategoryId;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the category service.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The backing store rejected or failed the operation.
    #[error("Store error: {context}")]
    Store { context: String },

    /// No category with the requested id exists.
    #[error("no category with id {id}")]
    NotFound { id: CategoryId },

    /// The call was cancelled (client disconnect or deadline) before the
    /// store completed.
    #[error("Request cancelled by client")]
    RequestCancelled,

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,

    /// A response message could not be forwarded to the client.
    #[error("Channel error: {context}")]
    ChannelError { context: String },
}

impl Error {
    /// Wraps any displayable backend failure as [`Error::Store`].
    pub fn store(err: impl core::fmt::Display) -> Self {
        Self::Store {
            context: err.to_string(),
        }
    }

    /// Maps a failed create or list call to `INTERNAL`.
    ///
    /// `action` completes the sentence "failed to ..." in the status message.
    /// Cancellation and shutdown keep their own codes.
    pub fn into_internal(self, action: &str) -> Status {
        match self {
            Self::RequestCancelled | Self::ServiceShutdown => self.into(),
            err => Status::internal(format!("failed to {action}: {err}")),
        }
    }

    /// Maps a failed lookup to `NOT_FOUND`, whatever the underlying cause.
    pub fn into_not_found(self) -> Status {
        Status::not_found(format!("category not found: {self}"))
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Store { context } => Status::internal(format!("Store error: {context}")),
            Error::NotFound { id } => Status::not_found(format!("no category with id {id}")),
            Error::RequestCancelled => Status::cancelled("Request was cancelled"),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
            Error::ChannelError { context } => {
                Status::internal(format!("Channel error: {context}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn internal_mapping_wraps_store_failures() {
        let status = Error::store("disk full").into_internal("create category");
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(
            status.message(),
            "failed to create category: Store error: disk full"
        );
    }

    #[test]
    fn internal_mapping_keeps_cancellation_and_shutdown_codes() {
        assert_eq!(
            Error::RequestCancelled
                .into_internal("list categories")
                .code(),
            Code::Cancelled
        );
        assert_eq!(
            Error::ServiceShutdown.into_internal("list categories").code(),
            Code::Unavailable
        );
    }

    #[test]
    fn lookup_failures_collapse_to_not_found() {
        let missing = Error::NotFound { id: 999 }.into_not_found();
        assert_eq!(missing.code(), Code::NotFound);
        assert_eq!(missing.message(), "category not found: no category with id 999");

        let broken = Error::store("connection reset").into_not_found();
        assert_eq!(broken.code(), Code::NotFound);
    }

    #[test]
    fn generic_status_codes() {
        assert_eq!(Status::from(Error::store("x")).code(), Code::Internal);
        assert_eq!(Status::from(Error::NotFound { id: 1 }).code(), Code::NotFound);
        assert_eq!(Status::from(Error::RequestCancelled).code(), Code::Cancelled);
        assert_eq!(Status::from(Error::ServiceShutdown).code(), Code::Unavailable);
        assert_eq!(
            Status::from(Error::ChannelError {
                context: "closed".to_string()
            })
            .code(),
            Code::Internal
        );
    }
}
