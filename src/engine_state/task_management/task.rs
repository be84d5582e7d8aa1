//! # Worker Job Trait
//!
//! A [`WorkerJob`] is the state a long-lived worker thread owns and the function it applies to
//! each request. The job is moved onto the worker thread when the worker starts, so anything it
//! holds (a registry duplicate, a store handle, a noise generator) is private to that thread.
//!
//! ## Lifecycle
//! 1. The main thread validates a request with [`WorkerJob::validate`] and queues it
//! 2. The worker thread dequeues it and calls [`WorkerJob::process`]
//! 3. The output is queued back to the main thread in request order

use crate::engine_state::error::{EngineError, WorkerError};

/// Work performed by a background worker, one request at a time.
pub trait WorkerJob: Send + 'static {
    /// What the main thread asks for.
    type Request: Send + 'static;

    /// What the worker hands back.
    type Output: Send + 'static;

    /// Name used in logs and errors.
    const NAME: &'static str;

    /// Line logged at `info` by the worker thread once it is up.
    fn startup_message(&self) -> String {
        format!("{} started", Self::NAME)
    }

    /// Checks a request on the calling thread before it is queued.
    fn validate(_request: &Self::Request) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Produces the output for one request.
    ///
    /// An error here is fatal to the worker: it is logged, the thread exits, and the error is
    /// returned from the next health check on the main thread.
    fn process(&mut self, request: Self::Request) -> Result<Self::Output, EngineError>;
}
