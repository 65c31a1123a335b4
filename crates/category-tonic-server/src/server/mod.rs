//! Server-side components of the category service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI / environment configuration.
//! - [`store`] - the [`store::CategoryStore`] trait and its memory and
//!   SQLite backends.
//! - [`streaming`] - state machines for the two streaming create RPCs.
//! - [`service`] - the tonic service implementation and call lifecycle.
//! - [`telemetry`] - logging and optional OpenTelemetry export.
//!
//! These components are wired together in the binary's `main.rs`.

pub mod config;
pub mod service;
pub mod store;
pub mod streaming;
pub mod telemetry;
