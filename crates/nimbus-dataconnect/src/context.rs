//! The main context: a single serial executor for observer-visible mutations.
//!
//! Publishes are submitted as jobs and the submitter awaits their completion,
//! so a query operation is only finished once its publish has run. Jobs run
//! one at a time, in submission order, on one dedicated task.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

use nimbus_protocol::{DataConnectError, DataConnectResult};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub const DEFAULT_CONTEXT_BUFFER: usize = 64;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Shutdown,
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static CURRENT_CONTEXT: u64;
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> DataConnectError {
    let message = panic_message(&*payload);
    warn!(panic = %message, "main context job panicked");
    DataConnectError::PublisherPanicked(message)
}

#[derive(Clone)]
enum ContextKind {
    Inline,
    Serial { id: u64, sender: mpsc::Sender<Message> },
}

/// Handle to the serial execution context used for publishing.
#[derive(Clone)]
pub struct MainContext {
    kind: ContextKind,
}

impl std::fmt::Debug for MainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ContextKind::Inline => f.write_str("MainContext::Inline"),
            ContextKind::Serial { id, sender } => f
                .debug_struct("MainContext::Serial")
                .field("id", id)
                .field("closed", &sender.is_closed())
                .finish(),
        }
    }
}

impl MainContext {
    /// Start a dedicated serial context on the current tokio runtime.
    pub fn spawn(buffer: usize) -> DataConnectResult<Self> {
        let handle = Handle::try_current().map_err(|_| {
            DataConnectError::InvalidConfig("main context requires a tokio runtime".to_owned())
        })?;
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, mut receiver) = mpsc::channel::<Message>(buffer.max(1));

        let _worker = handle.spawn(CURRENT_CONTEXT.scope(id, async move {
            while let Some(message) = receiver.recv().await {
                match message {
                    Message::Run(job) => job(),
                    Message::Shutdown => break,
                }
            }
            debug!(context_id = id, "main context stopped");
        }));

        debug!(context_id = id, "main context started");
        Ok(Self {
            kind: ContextKind::Serial { id, sender },
        })
    }

    /// A context that runs jobs directly on the submitting task.
    ///
    /// For hosts that place no constraint on where observer state changes.
    pub fn inline() -> Self {
        Self {
            kind: ContextKind::Inline,
        }
    }

    /// Run `job` on this context and wait for its result.
    ///
    /// A panicking job fails only its own call with
    /// [`DataConnectError::PublisherPanicked`]; the context keeps running.
    pub async fn run<F, R>(&self, job: F) -> DataConnectResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        match &self.kind {
            ContextKind::Inline => catch_unwind(AssertUnwindSafe(job)).map_err(panicked),
            ContextKind::Serial { sender, .. } => {
                let (reply, result) = oneshot::channel();
                let boxed: Job = Box::new(move || {
                    let _ = reply.send(catch_unwind(AssertUnwindSafe(job)));
                });
                sender
                    .send(Message::Run(boxed))
                    .await
                    .map_err(|_| DataConnectError::MainContextClosed)?;
                match result.await {
                    Ok(outcome) => outcome.map_err(panicked),
                    // A dropped reply means the context stopped before running the job.
                    Err(_) => Err(DataConnectError::MainContextClosed),
                }
            }
        }
    }

    /// Whether the caller is currently executing on this context.
    pub fn is_current(&self) -> bool {
        match &self.kind {
            ContextKind::Inline => true,
            ContextKind::Serial { id, .. } => CURRENT_CONTEXT
                .try_with(|current| current == id)
                .unwrap_or(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        match &self.kind {
            ContextKind::Inline => false,
            ContextKind::Serial { sender, .. } => sender.is_closed(),
        }
    }

    /// Stop the context after the jobs already queued ahead of the request.
    ///
    /// Jobs submitted afterwards fail with [`DataConnectError::MainContextClosed`].
    pub async fn shutdown(&self) {
        if let ContextKind::Serial { sender, .. } = &self.kind
            && sender.send(Message::Shutdown).await.is_ok()
        {
            sender.closed().await;
        }
    }
}
