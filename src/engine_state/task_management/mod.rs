//! # Task Management System
//!
//! Long-lived background workers that exchange values with the main thread through FIFO
//! channels.
//!
//! ## Architecture Overview
//!
//! - [`Worker`]: owns one OS thread, a request sender and a result receiver
//! - [`WorkerJob`]: the state and per-request function that runs on that thread
//!
//! ## Worker Loop
//!
//! While running, the thread waits on its request channel for at most one poll interval. As
//! soon as a request arrives it drains every queued request before waiting again. Requests are
//! processed strictly in order and each output is sent back as soon as it is ready.
//!
//! ```text
//!  Stopped --start()--> Running --stop()--> Stopped
//!                          |
//!                          +-- job error / panic --> Dead
//! ```
//!
//! ## Shutdown
//!
//! [`Worker::stop`] clears the shared run flag, closes the request channel and joins the
//! thread. A request already dequeued finishes; requests still queued are discarded. Outputs
//! produced before the join stay available through [`Worker::take_update`]. Dropping a running
//! worker stops it.
//!
//! ## Main Thread Discipline
//!
//! Nothing on the main thread blocks on a worker except `stop`. [`Worker::has_update`] moves
//! whatever results are ready into a local queue and returns immediately.

pub mod task;

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, error, info, warn};

use crate::engine_state::error::{EngineError, WorkerError};

pub use task::WorkerJob;

/// Handles held while the worker thread is alive.
struct RunningWorker<J: WorkerJob> {
    request_sender: Sender<J::Request>,
    result_receiver: Receiver<J::Output>,
    should_run: Arc<AtomicBool>,
    handle: JoinHandle<Result<(), EngineError>>,
}

/// A background thread running one [`WorkerJob`].
pub struct Worker<J: WorkerJob> {
    poll_interval: Duration,
    job: Option<J>,
    running: Option<RunningWorker<J>>,
    ready: VecDeque<J::Output>,
}

impl<J: WorkerJob> Worker<J> {
    /// Creates a stopped worker that will run `job` once started.
    ///
    /// # Arguments
    /// * `job` - State and request handler, moved onto the worker thread by [`start`](Self::start)
    /// * `poll_interval` - Longest time the thread sleeps on an empty queue before re-checking
    ///   its run flag
    pub fn new(job: J, poll_interval: Duration) -> Self {
        Worker {
            poll_interval,
            job: Some(job),
            running: None,
            ready: VecDeque::new(),
        }
    }

    /// Spawns the worker thread.
    ///
    /// # Errors
    /// [`WorkerError::AlreadyStarted`] if the worker was started before, even if it has since
    /// stopped. [`WorkerError::Spawn`] if the thread cannot be created.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        let job = self.job.take().ok_or(WorkerError::AlreadyStarted(J::NAME))?;

        let (request_sender, request_receiver) = channel::<J::Request>();
        let (result_sender, result_receiver) = channel::<J::Output>();
        let should_run = Arc::new(AtomicBool::new(true));

        let thread_flag = should_run.clone();
        let poll_interval = self.poll_interval;
        let handle = thread::Builder::new()
            .name(J::NAME.to_string())
            .spawn(move || {
                run_job(job, request_receiver, result_sender, thread_flag, poll_interval)
            })
            .map_err(|source| WorkerError::Spawn {
                name: J::NAME,
                source,
            })?;

        self.running = Some(RunningWorker {
            request_sender,
            result_receiver,
            should_run,
            handle,
        });
        Ok(())
    }

    /// `true` while the thread is alive and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Queues a request for the worker thread.
    ///
    /// # Errors
    /// The job's own validation error, [`WorkerError::NotRunning`] before start or after stop,
    /// or [`WorkerError::ThreadDied`] if the thread has exited.
    pub fn push_request(&self, request: J::Request) -> Result<(), WorkerError> {
        J::validate(&request)?;
        let running = self
            .running
            .as_ref()
            .ok_or(WorkerError::NotRunning(J::NAME))?;
        if running.handle.is_finished() {
            return Err(WorkerError::ThreadDied(J::NAME));
        }
        running
            .request_sender
            .send(request)
            .map_err(|_| WorkerError::ThreadDied(J::NAME))
    }

    /// `true` if at least one output is waiting. Never blocks.
    pub fn has_update(&mut self) -> bool {
        if let Some(running) = &self.running {
            self.ready.extend(running.result_receiver.try_iter());
        }
        !self.ready.is_empty()
    }

    /// Removes the oldest waiting output.
    ///
    /// # Errors
    /// [`WorkerError::NoUpdate`] if nothing is waiting; check [`has_update`](Self::has_update)
    /// first.
    pub fn take_update(&mut self) -> Result<J::Output, WorkerError> {
        self.has_update();
        self.ready
            .pop_front()
            .ok_or(WorkerError::NoUpdate(J::NAME))
    }

    /// Returns the error that killed the thread, if it died on its own.
    ///
    /// A worker that was never started, or was stopped, is reported as
    /// [`WorkerError::NotRunning`].
    pub fn ensure_running(&mut self) -> Result<(), EngineError> {
        let finished = match &self.running {
            None => return Err(WorkerError::NotRunning(J::NAME).into()),
            Some(running) => running.handle.is_finished(),
        };
        if finished {
            self.stop()?;
            return Err(WorkerError::ThreadDied(J::NAME).into());
        }
        Ok(())
    }

    /// Stops the thread and waits for it to exit.
    ///
    /// Returns the job error or panic that ended the thread, if any. Stopping a worker that is
    /// not running does nothing.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.should_run.store(false, Ordering::Release);
        drop(running.request_sender);

        let joined = running.handle.join();
        self.ready.extend(running.result_receiver.try_iter());
        match joined {
            Ok(result) => result,
            Err(_) => Err(WorkerError::Panicked(J::NAME).into()),
        }
    }
}

impl<J: WorkerJob> Drop for Worker<J> {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!("{} stopped with an error while dropping: {error}", J::NAME);
        }
    }
}

fn run_job<J: WorkerJob>(
    mut job: J,
    requests: Receiver<J::Request>,
    results: Sender<J::Output>,
    should_run: Arc<AtomicBool>,
    poll_interval: Duration,
) -> Result<(), EngineError> {
    info!("{}", job.startup_message());

    while should_run.load(Ordering::Acquire) {
        let mut next = match requests.recv_timeout(poll_interval) {
            Ok(request) => Some(request),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut drained = 0usize;
        while let Some(request) = next {
            let output = job.process(request).inspect_err(|error| {
                error!("{} failed: {error}", J::NAME);
            })?;
            drained += 1;
            if results.send(output).is_err() {
                debug!("{} result channel closed", J::NAME);
                return Ok(());
            }

            next = if should_run.load(Ordering::Acquire) {
                requests.try_recv().ok()
            } else {
                None
            };
        }
        debug!("{} drained {drained} requests", J::NAME);
    }

    info!("{} stopped", J::NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::engine_state::error::ChunkError;

    struct Doubler;

    impl WorkerJob for Doubler {
        type Request = u32;
        type Output = u32;
        const NAME: &'static str = "doubler";

        fn validate(request: &u32) -> Result<(), WorkerError> {
            if *request > 1000 {
                return Err(WorkerError::InvalidStack(0));
            }
            Ok(())
        }

        fn process(&mut self, request: u32) -> Result<u32, EngineError> {
            if request == 999 {
                return Err(ChunkError::IndexOutOfBounds(999).into());
            }
            Ok(request * 2)
        }
    }

    /// Sleeps on every request and holds a token so tests can see when the job is dropped.
    struct Sleeper {
        delay: Duration,
        _alive: Arc<()>,
    }

    impl WorkerJob for Sleeper {
        type Request = u32;
        type Output = u32;
        const NAME: &'static str = "sleeper";

        fn process(&mut self, request: u32) -> Result<u32, EngineError> {
            thread::sleep(self.delay);
            Ok(request)
        }
    }

    fn wait_for_updates(worker: &mut Worker<Doubler>, count: usize) -> Vec<u32> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outputs = Vec::new();
        while outputs.len() < count && Instant::now() < deadline {
            while worker.has_update() {
                outputs.push(worker.take_update().unwrap());
            }
            thread::sleep(Duration::from_millis(1));
        }
        outputs
    }

    #[test]
    fn requests_before_start_are_rejected() {
        let mut worker = Worker::new(Doubler, Duration::from_millis(10));
        assert!(matches!(
            worker.push_request(1),
            Err(WorkerError::NotRunning("doubler"))
        ));
        assert!(!worker.has_update());
        assert!(matches!(worker.take_update(), Err(WorkerError::NoUpdate(_))));
    }

    #[test]
    fn outputs_come_back_in_request_order() {
        let mut worker = Worker::new(Doubler, Duration::from_millis(10));
        worker.start().unwrap();
        for request in 0..100 {
            worker.push_request(request).unwrap();
        }

        let outputs = wait_for_updates(&mut worker, 100);
        assert_eq!(outputs, (0..100).map(|n| n * 2).collect::<Vec<_>>());
        worker.stop().unwrap();
    }

    #[test]
    fn validation_runs_before_queueing() {
        let mut worker = Worker::new(Doubler, Duration::from_millis(10));
        worker.start().unwrap();
        assert!(worker.push_request(5000).is_err());
        worker.stop().unwrap();
    }

    #[test]
    fn stopped_workers_cannot_restart_or_accept_requests() {
        let mut worker = Worker::new(Doubler, Duration::from_millis(10));
        worker.start().unwrap();
        worker.stop().unwrap();

        assert!(!worker.is_running());
        assert!(matches!(worker.push_request(1), Err(WorkerError::NotRunning(_))));
        assert!(matches!(worker.start(), Err(WorkerError::AlreadyStarted(_))));
        worker.stop().unwrap();
    }

    #[test]
    fn a_failing_job_kills_the_thread_and_reports_its_error() {
        let mut worker = Worker::new(Doubler, Duration::from_millis(10));
        worker.start().unwrap();
        worker.push_request(999).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        assert!(matches!(worker.push_request(1), Err(WorkerError::ThreadDied(_))));
        assert!(matches!(
            worker.ensure_running(),
            Err(EngineError::Chunk(ChunkError::IndexOutOfBounds(999)))
        ));
    }

    #[test]
    fn stop_finishes_the_current_request_and_discards_the_queue() {
        let alive = Arc::new(());
        let job = Sleeper {
            delay: Duration::from_millis(50),
            _alive: alive.clone(),
        };
        let mut worker = Worker::new(job, Duration::from_millis(5));
        worker.start().unwrap();
        for request in 0..20 {
            worker.push_request(request).unwrap();
        }

        thread::sleep(Duration::from_millis(75));
        worker.stop().unwrap();

        let mut outputs = Vec::new();
        while worker.has_update() {
            outputs.push(worker.take_update().unwrap());
        }
        assert!(!outputs.is_empty(), "the request in progress was lost");
        assert!(outputs.len() < 20, "queued requests ran after stop");
        assert_eq!(outputs, (0..outputs.len() as u32).collect::<Vec<_>>());
        assert_eq!(Arc::strong_count(&alive), 1);
    }

    #[test]
    fn dropping_a_running_worker_joins_its_thread() {
        let alive = Arc::new(());
        let job = Sleeper {
            delay: Duration::from_millis(1),
            _alive: alive.clone(),
        };
        let mut worker = Worker::new(job, Duration::from_millis(5));
        worker.start().unwrap();
        worker.push_request(1).unwrap();
        assert_eq!(Arc::strong_count(&alive), 2);

        drop(worker);
        assert_eq!(Arc::strong_count(&alive), 1);
    }
}
