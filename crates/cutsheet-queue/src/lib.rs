//! Redis Streams job queue.
//!
//! The upload/API side enqueues a [`ProcessVideoJob`] and returns
//! immediately; the worker consumes jobs through a consumer group and
//! acknowledges them once the orchestrator has recorded a terminal video
//! status. There is no retry bookkeeping: a failed run is terminal, and
//! only jobs whose worker died are re-delivered via pending claim.

pub mod error;
pub mod job;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use job::ProcessVideoJob;
pub use queue::{JobQueue, QueueConfig};
