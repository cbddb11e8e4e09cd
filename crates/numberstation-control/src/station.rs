//! Station context
//!
//! Owns the transmitter, the show scheduler and the viewer hub, and exposes
//! the operations an outer layer (web handlers, operator console) needs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::animation::{Animation, DisplayLayout, ShowValue};
use crate::color::Rgb;
use crate::config::StationConfig;
use crate::scheduler::{ShowChanged, ShowScheduler, SubmitAck};
use crate::show::Show;
use crate::transmitter::Transmitter;
use crate::viewers::{ShowSnapshot, ViewerHub};
use crate::Result;

const DEFAULT_DESCRIPTION: &str = "unknown number";

/// A show submission as received from a form or query string
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowRequest {
    pub description: Option<String>,
    /// Value; anything that is not an integer is shown as text
    pub number: Option<String>,
    pub r: Option<u8>,
    pub g: Option<u8>,
    pub b: Option<u8>,
    /// Growth per second
    pub increment: Option<i64>,
    #[serde(default)]
    pub priority: bool,
}

impl ShowRequest {
    /// Requested color; black or missing picks a random hue
    fn color(&self) -> Rgb {
        let color = Rgb::new(
            self.r.unwrap_or(0),
            self.g.unwrap_or(0),
            self.b.unwrap_or(0),
        );
        if color == Rgb::BLACK {
            Rgb::random_hue()
        } else {
            color
        }
    }
}

/// The running lighting station
pub struct Station {
    config: StationConfig,
    layout: Arc<DisplayLayout>,
    transmitter: Arc<Transmitter>,
    scheduler: Arc<ShowScheduler>,
    hub: Arc<ViewerHub>,
    scheduler_task: Mutex<Option<JoinHandle<()>>>,
}

impl Station {
    /// Build the station from a validated config.
    ///
    /// Binds the Art-Net socket and spawns the viewer fan-out task, so this
    /// must be called from within a tokio runtime. Nothing is transmitted
    /// until [`Station::start`].
    pub fn new(config: StationConfig) -> Result<Self> {
        config.validate()?;

        let layout = Arc::new(config.display.layout());

        let transmitter = Transmitter::new(&config.artnet)?;
        for fixture in config.all_fixtures()? {
            transmitter.add_fixture(fixture);
        }

        let facts = config
            .facts
            .iter()
            .map(|fact| {
                Show::new(
                    fact.description.clone(),
                    fact.initial.clone(),
                    fact.color,
                    fact.increment,
                    fact.t0,
                    layout.clone(),
                )
            })
            .collect();
        let scheduler = ShowScheduler::new(
            Duration::from_secs(config.scheduler.interval_secs),
            config.scheduler.priority_capacity,
            config.scheduler.background_capacity,
            facts,
        )?;

        let hub = Arc::new(ViewerHub::new(Duration::from_millis(
            config.scheduler.viewer_timeout_ms,
        )));
        let publisher = hub.clone();
        scheduler.on_show_changed(move |event| {
            publisher.publish(ShowSnapshot::capture(&event.current, &event.coming_up));
        });

        info!(
            "Station ready: {} fixtures on universe {} -> {}:{}",
            transmitter.fixture_count(),
            config.artnet.universe,
            config.artnet.host,
            config.artnet.port
        );

        Ok(Self {
            config,
            layout,
            transmitter: Arc::new(transmitter),
            scheduler: Arc::new(scheduler),
            hub,
            scheduler_task: Mutex::new(None),
        })
    }

    /// Start the render loop and the scheduler loop; no-op when running
    pub fn start(&self) {
        self.transmitter.start();

        let mut task = self.scheduler_task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        *task = Some(tokio::spawn(
            self.scheduler.clone().run(self.transmitter.clone()),
        ));
    }

    /// Stop scheduling and black out the universe
    pub async fn shutdown(&self) {
        let task = self.scheduler_task.lock().take();
        if let Some(handle) = task {
            handle.abort();
            let _ = handle.await;
        }
        self.transmitter.set_animation(Animation::Off).await;
        info!("Station shut down");
    }

    /// Queue a show for the display
    pub fn submit_show(
        &self,
        description: impl Into<String>,
        initial: ShowValue,
        color: Rgb,
        increment: f64,
        t0: DateTime<Utc>,
        priority: bool,
    ) -> Result<SubmitAck> {
        let show = Show::new(description, initial, color, increment, t0, self.layout.clone());
        self.scheduler.submit(show, priority)
    }

    /// Queue a show from raw request fields, starting it now
    pub fn submit_request(&self, request: ShowRequest) -> Result<SubmitAck> {
        let initial = request
            .number
            .as_deref()
            .map(ShowValue::parse)
            .unwrap_or(ShowValue::Number(0));
        let description = request
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let increment = request.increment.unwrap_or(0) as f64;

        let result = self.submit_show(
            description,
            initial,
            request.color(),
            increment,
            Utc::now(),
            request.priority,
        );
        if let Err(e) = &result {
            warn!("Show request rejected: {}", e);
        }
        result
    }

    pub fn current_show(&self) -> Option<Arc<Show>> {
        self.scheduler.current_show()
    }

    /// Priority shows followed by background shows
    pub fn pending_shows(&self) -> Vec<Arc<Show>> {
        self.scheduler.pending_shows()
    }

    pub fn on_show_changed<F>(&self, callback: F)
    where
        F: Fn(&ShowChanged) + Send + Sync + 'static,
    {
        self.scheduler.on_show_changed(callback);
    }

    /// Current state for a newly connected viewer
    pub fn snapshot(&self) -> Option<ShowSnapshot> {
        self.current_show()
            .map(|current| ShowSnapshot::capture(&current, &self.pending_shows()))
    }

    /// Subscribe to show changes, starting with the current state
    pub fn subscribe_viewer(&self) -> mpsc::Receiver<ShowSnapshot> {
        self.hub.subscribe(self.snapshot())
    }

    pub async fn set_animation_by_name(&self, name: &str) -> Result<()> {
        self.transmitter.set_animation_by_name(name).await
    }

    pub async fn set_color(&self, color: Rgb) -> Result<()> {
        self.transmitter.set_color(color).await
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn layout(&self) -> &Arc<DisplayLayout> {
        &self.layout
    }

    pub fn transmitter(&self) -> &Arc<Transmitter> {
        &self.transmitter
    }

    pub fn scheduler(&self) -> &Arc<ShowScheduler> {
        &self.scheduler
    }

    pub fn hub(&self) -> &Arc<ViewerHub> {
        &self.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtNetConfig;
    use crate::transmitter::TransmitterState;
    use crate::StationError;

    fn config() -> StationConfig {
        StationConfig {
            artnet: ArtNetConfig {
                // Nothing listens here; sends are dropped silently
                port: 46_454,
                universe_size: 264,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_new_patches_display() {
        let station = Station::new(config()).unwrap();
        assert_eq!(station.transmitter().fixture_count(), 88);
        assert!(station.current_show().is_none());
        assert!(station.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_submit_request_defaults() {
        let station = Station::new(config()).unwrap();
        let ack = station
            .submit_request(ShowRequest {
                number: Some("forty two".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ack.position, 1);

        let pending = station.pending_shows();
        assert_eq!(pending[0].description, "unknown number");
        assert_eq!(pending[0].initial, ShowValue::Text("forty two".to_string()));
        assert_ne!(pending[0].color, Rgb::BLACK);
    }

    #[tokio::test]
    async fn test_submit_request_explicit_fields() {
        let station = Station::new(config()).unwrap();
        station
            .submit_request(ShowRequest {
                description: Some("Coffees".to_string()),
                number: Some(" 12 ".to_string()),
                r: Some(10),
                increment: Some(3),
                priority: true,
                ..Default::default()
            })
            .unwrap();

        let show = &station.pending_shows()[0];
        assert_eq!(show.initial, ShowValue::Number(12));
        assert_eq!(show.color, Rgb::new(10, 0, 0));
        assert_eq!(show.increment, 3.0);
    }

    #[tokio::test]
    async fn test_queue_full_is_reported() {
        let mut config = config();
        config.scheduler.priority_capacity = 1;
        let station = Station::new(config).unwrap();

        let request = ShowRequest {
            priority: true,
            ..Default::default()
        };
        station.submit_request(request.clone()).unwrap();
        assert!(matches!(
            station.submit_request(request),
            Err(StationError::QueueFull { capacity: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_tick_publishes_to_viewers() {
        let station = Station::new(config()).unwrap();
        let mut viewer = station.subscribe_viewer();
        station
            .submit_show("Bikes", ShowValue::Number(5), Rgb::WHITE, 0.0, Utc::now(), false)
            .unwrap();

        station.scheduler().tick(station.transmitter()).await;

        let snapshot = viewer.recv().await.unwrap();
        assert_eq!(snapshot.number.description, "Bikes");
        assert_eq!(snapshot.number.now, ShowValue::Number(5));
        assert_eq!(snapshot.coming_up[0].description, "A random fact");

        station.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_blacks_out() {
        let station = Station::new(config()).unwrap();
        station.start();
        station.shutdown().await;

        assert_eq!(station.transmitter().state(), TransmitterState::Off);
        assert!(station
            .transmitter()
            .frame_snapshot()
            .as_slice()
            .iter()
            .all(|&value| value == 0));
    }
}
