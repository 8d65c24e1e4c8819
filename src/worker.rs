//! Queue-fed writer task.
//!
//! `OverwriteSink` does no locking, and interleaved truncate/seek/write
//! sequences from two callers can leave a store empty or mixed. `SinkWriter`
//! moves the sink onto one owning thread and feeds it through a bounded
//! queue, so any number of producers can persist state safely.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{RewindResult, SinkError, WorkerError};
use crate::sink::OverwriteSink;
use crate::store::ByteStore;

struct WriteRequest {
    payload: Vec<u8>,
    reply: Sender<Result<usize, SinkError>>,
}

/// Handle returned by `SinkWriter::submit`.
#[derive(Debug)]
pub struct WriteTicket {
    rx: Receiver<Result<usize, SinkError>>,
}

impl WriteTicket {
    /// Waits for the write to be applied.
    pub fn wait(self) -> RewindResult<usize> {
        let result = self.rx.recv().map_err(|_| WorkerError::Disconnected)?;
        Ok(result?)
    }

    /// Waits for the write to be applied, up to `timeout`.
    ///
    /// The request stays queued after a timeout and is still applied.
    pub fn wait_timeout(self, timeout: Duration) -> RewindResult<usize> {
        let result = self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => WorkerError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => WorkerError::Disconnected,
        })?;
        Ok(result?)
    }
}

/// Single owner of an `OverwriteSink`, fed by a bounded queue.
pub struct SinkWriter<S> {
    tx: Sender<WriteRequest>,
    handle: JoinHandle<S>,
    queue_capacity: usize,
}

impl<S: ByteStore + Send + 'static> SinkWriter<S> {
    /// Moves `sink` onto a dedicated thread.
    ///
    /// # Errors
    /// - `ConfigError` if `config` is invalid
    /// - `WorkerError::Spawn` if the thread cannot be started
    pub fn spawn(sink: OverwriteSink<S>, config: WorkerConfig) -> RewindResult<Self> {
        let config = config.validate()?;
        let (tx, rx) = bounded::<WriteRequest>(config.queue_capacity);

        let thread_name = config.thread_name.clone();
        let handle = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || run(sink, &rx))
            .map_err(|source| WorkerError::Spawn { source })?;

        info!(thread = %thread_name, capacity = config.queue_capacity, "sink writer started");

        Ok(Self {
            tx,
            handle,
            queue_capacity: config.queue_capacity,
        })
    }

    /// Queues `payload` without blocking.
    ///
    /// # Errors
    /// - `QueueFull` if `queue_capacity` requests are already pending
    /// - `Disconnected` if the writer thread has exited
    pub fn submit(&self, payload: Vec<u8>) -> Result<WriteTicket, WorkerError> {
        let (reply, rx) = bounded(1);
        match self.tx.try_send(WriteRequest { payload, reply }) {
            Ok(()) => Ok(WriteTicket { rx }),
            Err(TrySendError::Full(_)) => Err(WorkerError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Disconnected),
        }
    }

    /// Queues `payload`, blocking while the queue is full, and waits for the result.
    pub fn write(&self, payload: Vec<u8>) -> RewindResult<usize> {
        let (reply, rx) = bounded(1);
        self.tx
            .send(WriteRequest { payload, reply })
            .map_err(|_| WorkerError::Disconnected)?;
        WriteTicket { rx }.wait()
    }

    /// Maximum number of queued requests.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Number of requests waiting to be applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tx.len()
    }

    /// Stops accepting requests, applies everything already queued, and
    /// returns the store.
    pub fn shutdown(self) -> Result<S, WorkerError> {
        // Closing the channel lets the thread drain the queue and exit.
        drop(self.tx);
        let store = self.handle.join().map_err(|_| WorkerError::Panicked)?;
        info!("sink writer stopped");
        Ok(store)
    }
}

fn run<S: ByteStore>(mut sink: OverwriteSink<S>, rx: &Receiver<WriteRequest>) -> S {
    while let Ok(WriteRequest { payload, reply }) = rx.recv() {
        let result = sink.write(&payload);
        match &result {
            Ok(written) => debug!(bytes = written, "overwrite applied"),
            Err(err) => warn!(error = %err, state = ?err.store_state(), "overwrite failed"),
        }
        // The submitter may have dropped its ticket.
        let _ = reply.send(result);
    }
    sink.into_inner()
}
