//! # `category-tonic-server`
//!
//! A gRPC service that creates and reads categories. It exposes three unary
//! calls (create, list, get) and two streaming creates: a client-streaming
//! bulk create that replies once after the client half-closes, and a
//! bidirectional create that replies to each request before reading the next.
//!
//! Categories are persisted in SQLite by default; an in-memory store is
//! available for local runs and tests.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin category-tonic-server --release
//! ```
//!
//! Then connect via gRPC on `0.0.0.0:50051`. Server reflection and the
//! standard health service are registered on the same port.

pub mod server;
