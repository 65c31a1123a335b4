//! Transport-independent drivers for the two streaming create RPCs.
//!
//! Both drivers are written as explicit state machines over a generic inbound
//! [`Stream`](futures::Stream) of requests, so they run the same way against
//! a live `tonic::Streaming` or an in-memory stream in tests.
//!
//! - [`batch`] - client streaming: accumulate, reply once after half-close.
//! - [`bidirectional`] - one reply per request, strictly in order.
//!
//! In both, a store failure maps to `INTERNAL` exactly as the unary create
//! does, and an inbound read failure is propagated unchanged. Creates that
//! already reached the store before a failure are not rolled back.

pub mod batch;
pub mod bidirectional;

pub use batch::collect_created;
pub use bidirectional::create_each;
