//! Background model loading
//!
//! Reading and parsing a model runs on a small tokio runtime so the window
//! stays responsive. Each request carries a [`LoadTicket`]; only the most
//! recently issued ticket is current, so when loads overlap the last one the
//! user asked for wins regardless of which finishes first.

use meshview_core::{Error, Model, Result};
use meshview_io::ModelSource;
use std::time::Duration;
use tracing::{debug, error};

/// Generation number identifying one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Issues load tickets and remembers which one is current
///
/// A current ticket can be finished once; a second delivery of the same
/// result is treated like a superseded one.
#[derive(Debug, Default)]
pub struct LoadTracker {
    latest: u64,
    finished: bool,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding all earlier ones
    pub fn begin(&mut self) -> LoadTicket {
        self.latest += 1;
        self.finished = false;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Claim the result for `ticket`
    ///
    /// Returns false if the ticket was superseded or already finished.
    pub fn finish(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) || self.finished {
            return false;
        }
        self.finished = true;
        true
    }
}

/// State of the most recent load request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading {
        label: String,
    },
    Loaded {
        label: String,
    },
    Failed {
        label: String,
        message: String,
    },
}

/// A finished load, delivered back to the UI thread
#[derive(Debug)]
pub struct LoadResult {
    pub ticket: LoadTicket,
    pub label: String,
    pub result: Result<Model>,
}

/// Runs model reads off the UI thread
pub struct ModelLoader {
    runtime: tokio::runtime::Runtime,
    sender: flume::Sender<LoadResult>,
    receiver: flume::Receiver<LoadResult>,
}

impl ModelLoader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("meshview-loader")
            .build()
            .map_err(Error::Io)?;
        let (sender, receiver) = flume::unbounded();
        Ok(Self {
            runtime,
            sender,
            receiver,
        })
    }

    /// Read `source` in the background; the result arrives via [`poll`](Self::poll)
    pub fn spawn(&self, ticket: LoadTicket, source: ModelSource) {
        let sender = self.sender.clone();
        let label = source.label();
        debug!(generation = ticket.generation(), %source, "spawning load");

        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || source.load())
                .await
                .unwrap_or_else(|e| Err(Error::Visualization(format!("Load task failed: {}", e))));
            if sender
                .send(LoadResult {
                    ticket,
                    label,
                    result,
                })
                .is_err()
            {
                error!(generation = ticket.generation(), "load finished after the viewer closed");
            }
        });
    }

    /// All loads finished since the last call, without blocking
    pub fn poll(&self) -> Vec<LoadResult> {
        self.receiver.try_iter().collect()
    }

    /// Block until the next load finishes or `timeout` elapses
    pub fn wait(&self, timeout: Duration) -> Option<LoadResult> {
        self.receiver.recv_timeout(timeout).ok()
    }
}
