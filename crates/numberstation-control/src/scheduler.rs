//! Show scheduler
//!
//! Shows wait in two bounded FIFO queues. Once per interval the scheduler
//! promotes the next show to "current": priority first, then background,
//! and when both are empty a random ambient fact which is not consumed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use tracing::{debug, info};

use crate::error::QueueKind;
use crate::show::Show;
use crate::transmitter::Transmitter;
use crate::{Result, StationError};

/// Emitted once per scheduler tick
#[derive(Debug, Clone)]
pub struct ShowChanged {
    pub current: Arc<Show>,
    /// Priority shows followed by background shows
    pub coming_up: Vec<Arc<Show>>,
}

/// Callback invoked on every show change
pub type ShowCallback = Arc<dyn Fn(&ShowChanged) + Send + Sync>;

/// Receipt for an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitAck {
    pub queue: QueueKind,
    /// 1-based position counting every show served before this one
    pub position: usize,
    /// Estimated time until the show becomes current
    pub wait: Duration,
}

#[derive(Default)]
struct ShowQueues {
    priority: VecDeque<Arc<Show>>,
    background: VecDeque<Arc<Show>>,
}

/// Selects the current show and keeps the transmitter in sync with it
pub struct ShowScheduler {
    queues: Mutex<ShowQueues>,
    priority_capacity: usize,
    background_capacity: usize,
    interval: Duration,
    fallback: Vec<Arc<Show>>,
    current: ArcSwapOption<Show>,
    callbacks: RwLock<Vec<ShowCallback>>,
}

impl ShowScheduler {
    /// Create a scheduler.
    ///
    /// `fallback` are the ambient facts shown while both queues are empty and
    /// must not be empty.
    pub fn new(
        interval: Duration,
        priority_capacity: usize,
        background_capacity: usize,
        fallback: Vec<Show>,
    ) -> Result<Self> {
        if fallback.is_empty() {
            return Err(StationError::Config(
                "at least one fallback fact is required".to_string(),
            ));
        }

        Ok(Self {
            queues: Mutex::new(ShowQueues::default()),
            priority_capacity,
            background_capacity,
            interval,
            fallback: fallback.into_iter().map(Arc::new).collect(),
            current: ArcSwapOption::empty(),
            callbacks: RwLock::new(Vec::new()),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Queue a show without blocking
    pub fn submit(&self, show: Show, priority: bool) -> Result<SubmitAck> {
        let mut queues = self.queues.lock();

        let (queue, kind, capacity) = if priority {
            (&mut queues.priority, QueueKind::Priority, self.priority_capacity)
        } else {
            (&mut queues.background, QueueKind::Background, self.background_capacity)
        };

        if queue.len() >= capacity {
            debug!("Rejecting show '{}': {} queue full", show.description, kind);
            return Err(StationError::QueueFull {
                queue: kind,
                capacity,
            });
        }

        info!("Queued show '{}' ({})", show.description, kind);
        queue.push_back(Arc::new(show));

        let position = match kind {
            QueueKind::Priority => queues.priority.len(),
            QueueKind::Background => queues.priority.len() + queues.background.len(),
        };

        Ok(SubmitAck {
            queue: kind,
            position,
            wait: self
                .interval
                .checked_mul(u32::try_from(position).unwrap_or(u32::MAX))
                .unwrap_or(Duration::MAX),
        })
    }

    /// Pop the next show and make it current
    pub fn select_next(&self) -> Arc<Show> {
        let next = {
            let mut queues = self.queues.lock();
            queues
                .priority
                .pop_front()
                .or_else(|| queues.background.pop_front())
        };

        let show = next.unwrap_or_else(|| {
            let index = rand::rng().random_range(0..self.fallback.len());
            self.fallback[index].clone()
        });

        self.current.store(Some(show.clone()));
        show
    }

    /// The show currently on display, `None` before the first tick
    pub fn current_show(&self) -> Option<Arc<Show>> {
        self.current.load_full()
    }

    /// Pending shows in the order they will be served
    pub fn pending_shows(&self) -> Vec<Arc<Show>> {
        let queues = self.queues.lock();
        queues
            .priority
            .iter()
            .chain(queues.background.iter())
            .cloned()
            .collect()
    }

    /// Register a show change callback
    pub fn on_show_changed<F>(&self, callback: F)
    where
        F: Fn(&ShowChanged) + Send + Sync + 'static,
    {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// One selection step: pick, install, notify
    pub async fn tick(&self, transmitter: &Transmitter) {
        let current = self.select_next();
        info!("Now showing '{}'", current.description);

        transmitter.set_animation(current.animation().clone()).await;

        let event = ShowChanged {
            current,
            coming_up: self.pending_shows(),
        };
        let callbacks = self.callbacks.read().clone();
        for callback in callbacks {
            callback(&event);
        }
    }

    /// Run the selection loop for the lifetime of the process
    pub async fn run(self: Arc<Self>, transmitter: Arc<Transmitter>) {
        loop {
            self.tick(&transmitter).await;
            tokio::time::sleep(self.interval).await;
        }
    }
}
