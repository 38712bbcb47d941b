//! Compute worker abstraction.
//!
//! A worker runs out of line, in its own dispatcher task, and is reached only
//! through messages: each request carries a ticket and a one-shot reply
//! channel. Requests are served in the order they were sent.

use annokit_core::WorkerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Monotonic request identifier within one session
pub type Ticket = u64;

/// An out-of-line computation, e.g. a native vision library
#[async_trait]
pub trait ComputeWorker: Send + Sync + 'static {
    /// Request message
    type Request: Send + 'static;
    /// Response message
    type Response: Send + 'static;

    /// Serve one request
    async fn compute(&self, request: Self::Request) -> Result<Self::Response, WorkerError>;

    /// Release resources held by the worker
    fn dispose(&self) {}
}

/// Creates the worker for one session
#[async_trait]
pub trait WorkerFactory: Send + Sync + 'static {
    /// The worker type produced
    type Worker: ComputeWorker;

    /// Create a worker instance
    async fn create(&self) -> Result<Self::Worker, WorkerError>;
}

type Reply<W> = oneshot::Sender<Result<<W as ComputeWorker>::Response, WorkerError>>;

struct WorkerMessage<W: ComputeWorker> {
    ticket: Ticket,
    request: W::Request,
    reply: Reply<W>,
}

/// Message-passing handle to a running worker
pub struct WorkerHandle<W: ComputeWorker> {
    sender: mpsc::UnboundedSender<WorkerMessage<W>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    worker: Arc<W>,
    disposed: AtomicBool,
}

impl<W: ComputeWorker> WorkerHandle<W> {
    /// Start the dispatcher task for `worker`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(worker: W) -> Self {
        let worker = Arc::new(worker);
        let (sender, mut receiver) = mpsc::unbounded_channel::<WorkerMessage<W>>();

        let dispatch_worker = worker.clone();
        let dispatcher = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                let result = dispatch_worker.compute(message.request).await;
                if message.reply.send(result).is_err() {
                    tracing::trace!("Reply for request #{} had no receiver", message.ticket);
                }
            }
            tracing::debug!("Worker dispatcher stopped");
        });

        Self {
            sender,
            dispatcher: Mutex::new(Some(dispatcher)),
            worker,
            disposed: AtomicBool::new(false),
        }
    }

    /// Send a request and wait for its reply
    pub async fn call(&self, ticket: Ticket, request: W::Request) -> Result<W::Response, WorkerError> {
        if self.is_disposed() {
            return Err(WorkerError::Disposed);
        }

        let (reply, response) = oneshot::channel();
        self.sender
            .send(WorkerMessage {
                ticket,
                request,
                reply,
            })
            .map_err(|_| WorkerError::Disconnected)?;

        response.await.map_err(|_| WorkerError::Disconnected)?
    }

    /// Stop the dispatcher and release the worker
    ///
    /// Idempotent. Pending callers receive [`WorkerError::Disconnected`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(dispatcher) = self.dispatcher.lock().take() {
            dispatcher.abort();
        }
        self.worker.dispose();
        tracing::debug!("Worker disposed");
    }

    /// Whether [`WorkerHandle::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl<W: ComputeWorker> std::fmt::Debug for WorkerHandle<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl<W: ComputeWorker> Drop for WorkerHandle<W> {
    fn drop(&mut self) {
        self.dispose();
    }
}
