//! Fan-out of show changes to live viewers
//!
//! Viewers receive [`ShowSnapshot`]s through bounded channels. A single
//! fan-out task delivers each snapshot with a per-viewer timeout; viewers
//! that are gone or too slow are dropped from the set.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::animation::ShowValue;
use crate::color::Rgb;
use crate::show::{Show, PLACEHOLDER_COLOR};

/// Snapshots buffered per viewer
pub const VIEWER_BUFFER: usize = 8;
/// Snapshots waiting for the fan-out task
const OUTBOX_BUFFER: usize = 16;

/// The current show as sent to viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberView {
    pub description: String,
    pub initial: ShowValue,
    pub now: ShowValue,
    pub color: Rgb,
    pub increment: f64,
    pub t0: DateTime<Utc>,
}

/// A queued show in the "coming up" list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComingUpView {
    pub initial: ShowValue,
    pub description: String,
    pub color: Rgb,
}

impl ComingUpView {
    pub fn placeholder() -> Self {
        Self {
            initial: ShowValue::Text("???".to_string()),
            description: "A random fact".to_string(),
            color: PLACEHOLDER_COLOR,
        }
    }
}

impl From<&Show> for ComingUpView {
    fn from(show: &Show) -> Self {
        Self {
            initial: show.initial.clone(),
            description: show.description.clone(),
            color: show.color,
        }
    }
}

/// Everything a viewer page needs to redraw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSnapshot {
    pub number: NumberView,
    pub coming_up: Vec<ComingUpView>,
}

impl ShowSnapshot {
    /// Capture `current` and the pending queue.
    ///
    /// An empty queue is shown as a single placeholder entry.
    pub fn capture(current: &Show, coming_up: &[Arc<Show>]) -> Self {
        let coming_up = if coming_up.is_empty() {
            vec![ComingUpView::placeholder()]
        } else {
            coming_up.iter().map(|show| ComingUpView::from(&**show)).collect()
        };

        Self {
            number: NumberView {
                description: current.description.clone(),
                initial: current.initial.clone(),
                now: current.now(),
                color: current.color,
                increment: current.increment,
                t0: current.t0,
            },
            coming_up,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

type ViewerList = Arc<Mutex<Vec<mpsc::Sender<ShowSnapshot>>>>;

/// Set of subscribed viewers
pub struct ViewerHub {
    viewers: ViewerList,
    outbox: mpsc::Sender<ShowSnapshot>,
}

impl ViewerHub {
    /// Create the hub and spawn its fan-out task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(viewer_timeout: Duration) -> Self {
        let viewers: ViewerList = Arc::new(Mutex::new(Vec::new()));
        let (outbox, outbox_rx) = mpsc::channel(OUTBOX_BUFFER);
        tokio::spawn(fan_out(outbox_rx, viewers.clone(), viewer_timeout));

        Self { viewers, outbox }
    }

    /// Register a viewer, optionally priming it with the current snapshot
    pub fn subscribe(&self, initial: Option<ShowSnapshot>) -> mpsc::Receiver<ShowSnapshot> {
        let (tx, rx) = mpsc::channel(VIEWER_BUFFER);
        if let Some(snapshot) = initial {
            // Fresh channel, cannot be full
            let _ = tx.try_send(snapshot);
        }
        self.viewers.lock().push(tx);
        debug!("Viewer subscribed ({} total)", self.viewer_count());
        rx
    }

    /// Queue a snapshot for delivery without waiting
    pub fn publish(&self, snapshot: ShowSnapshot) {
        if let Err(e) = self.outbox.try_send(snapshot) {
            warn!("Dropping viewer update: {}", e);
        }
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.lock().len()
    }
}

async fn fan_out(
    mut outbox: mpsc::Receiver<ShowSnapshot>,
    viewers: ViewerList,
    timeout: Duration,
) {
    while let Some(snapshot) = outbox.recv().await {
        let targets = viewers.lock().clone();
        let mut failed = Vec::new();

        for viewer in targets {
            if let Err(e) = viewer.send_timeout(snapshot.clone(), timeout).await {
                debug!("Dropping viewer: {}", e);
                failed.push(viewer);
            }
        }

        if !failed.is_empty() {
            viewers
                .lock()
                .retain(|viewer| !failed.iter().any(|gone| gone.same_channel(viewer)));
        }
    }
}
