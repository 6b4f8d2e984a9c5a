//! Element traits for hosting the conversion stage in a pipeline.
//!
//! - [`Element`]: one buffer in, at most one buffer out
//! - [`BaseTransform`]: the negotiation and per-buffer hooks of a
//!   one-in, one-out transform
//!
//! # Design
//!
//! Elements follow the "sync processing, async orchestration" principle:
//! every hook is **synchronous** and never blocks. Scheduling, buffer
//! allocation and backpressure belong to the host.

mod pad;
mod traits;

pub use pad::{PadDirection, PadTemplate};
pub use traits::{BaseTransform, Element};
