//! Fixed-rate Art-Net frame transmitter
//!
//! The transmitter owns the universe buffer, the patched fixtures and the
//! active [`Animation`]. A tokio task renders and sends one frame per tick.
//! Animations are swapped atomically through [`ArcSwap`], so a swap never
//! waits for a tick in flight. Installing [`Animation::Off`] stops the task,
//! sends one black frame and leaves the transmitter idle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use crate::animation::{Animation, ANIMATION_NAMES};
use crate::color::Rgb;
use crate::config::ArtNetConfig;
use crate::dmx::{ArtDmxEncoder, ArtNetSender, Fixture, FrameBuffer};
use crate::{Result, StationError};

/// Lifecycle of the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitterState {
    Stopped,
    Running,
    /// Blacked out by an explicit `Off`
    Off,
}

struct RenderState {
    frame: FrameBuffer,
    fixtures: Vec<Fixture>,
    encoder: ArtDmxEncoder,
}

struct Shared {
    render: Mutex<RenderState>,
    animation: ArcSwap<Animation>,
    sender: ArtNetSender,
    running: AtomicBool,
    stop: Notify,
    frames_sent: AtomicU64,
}

impl Shared {
    /// Render the current animation into the buffer and encode one packet.
    ///
    /// The lock is released before the packet is returned for sending.
    fn render_tick(&self) -> Vec<u8> {
        let animation = self.animation.load_full();
        let now = Utc::now();

        let mut guard = self.render.lock();
        let RenderState {
            frame,
            fixtures,
            encoder,
        } = &mut *guard;

        let total = fixtures.len();
        for (index, fixture) in fixtures.iter().enumerate() {
            fixture.write_color(frame, animation.color_at_time(index, total, now));
        }

        encoder.encode(frame.as_slice())
    }

    fn transmit(&self, packet: &[u8]) {
        match self.sender.send(packet) {
            Ok(()) => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
                trace!("Sent Art-Net frame ({} bytes)", packet.len());
            }
            Err(e) => debug!("Dropping Art-Net frame: {}", e),
        }
    }
}

async fn render_loop(shared: Arc<Shared>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shared.stop.notified() => {}
        }
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        if shared.animation.load().is_off() {
            continue;
        }

        let packet = shared.render_tick();
        shared.transmit(&packet);
    }

    debug!("Render loop stopped");
}

/// Art-Net transmitter driving one universe
pub struct Transmitter {
    shared: Arc<Shared>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
    /// Serializes animation transitions, held across the Off shutdown
    lifecycle: AsyncMutex<()>,
    state: Mutex<TransmitterState>,
    color: Mutex<Rgb>,
}

impl Transmitter {
    /// Create a stopped transmitter. The initial animation fades up to white.
    pub fn new(config: &ArtNetConfig) -> Result<Self> {
        if config.refresh_rate_hz == 0 {
            return Err(StationError::Config(
                "refresh rate must be at least 1 Hz".to_string(),
            ));
        }
        let sender = ArtNetSender::new(&config.host, config.port)?;

        let shared = Shared {
            render: Mutex::new(RenderState {
                frame: FrameBuffer::new(config.universe_size),
                fixtures: Vec::new(),
                encoder: ArtDmxEncoder::new(config.universe),
            }),
            animation: ArcSwap::from_pointee(Animation::fade(Rgb::BLACK, Rgb::WHITE)),
            sender,
            running: AtomicBool::new(false),
            stop: Notify::new(),
            frames_sent: AtomicU64::new(0),
        };

        Ok(Self {
            shared: Arc::new(shared),
            period: Duration::from_secs_f64(1.0 / config.refresh_rate_hz as f64),
            task: Mutex::new(None),
            lifecycle: AsyncMutex::new(()),
            state: Mutex::new(TransmitterState::Stopped),
            color: Mutex::new(Rgb::WHITE),
        })
    }

    /// Patch a fixture and write its control channels
    pub fn add_fixture(&self, fixture: Fixture) {
        let mut render = self.shared.render.lock();
        fixture.write_controls(&mut render.frame);
        render.fixtures.push(fixture);
    }

    pub fn fixture_count(&self) -> usize {
        self.shared.render.lock().fixtures.len()
    }

    /// Start the render loop; no-op when it is already running or while
    /// an animation transition is in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        match self.lifecycle.try_lock() {
            Ok(_transition) => self.spawn_loop(),
            Err(_) => debug!("Animation transition in progress, not starting"),
        }
    }

    /// Caller holds `lifecycle`
    fn spawn_loop(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        self.shared.running.store(true, Ordering::Release);
        *task = Some(tokio::spawn(render_loop(self.shared.clone(), self.period)));
        *self.state.lock() = TransmitterState::Running;
        info!("Render loop started at {:?} per frame", self.period);
    }

    /// Stop the render loop and wait until it has exited
    async fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.stop.notify_one();

        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        *self.state.lock() = TransmitterState::Stopped;
    }

    /// Install an animation.
    ///
    /// Any animation but `Off` is swapped in without interrupting the loop
    /// (and starts it if needed). `Off` returns only after the loop has
    /// exited and a final black frame has been sent.
    pub async fn set_animation(&self, animation: Animation) {
        let _transition = self.lifecycle.lock().await;
        info!("Animation: {}", animation);

        if animation.is_off() {
            self.stop().await;
            self.shared.animation.store(Arc::new(Animation::Off));
            let packet = self.shared.render_tick();
            self.shared.transmit(&packet);
            *self.state.lock() = TransmitterState::Off;
        } else {
            self.shared.animation.store(Arc::new(animation));
            self.spawn_loop();
        }
    }

    /// Install an animation by operator name using the current base color
    pub async fn set_animation_by_name(&self, name: &str) -> Result<()> {
        let previous = self.animation().color_at(0, self.fixture_count().max(1));
        let color = *self.color.lock();
        let animation = Animation::from_name(name, color, previous)?;
        self.set_animation(animation).await;
        Ok(())
    }

    /// Change the base color, re-applying a named color animation
    pub async fn set_color(&self, color: Rgb) -> Result<()> {
        {
            let mut current = self.color.lock();
            if *current == color {
                return Ok(());
            }
            *current = color;
        }

        let name = self.animation().name();
        if name != "off" && ANIMATION_NAMES.contains(&name) {
            self.set_animation_by_name(name).await?;
        }
        Ok(())
    }

    pub fn color(&self) -> Rgb {
        *self.color.lock()
    }

    /// The active animation
    pub fn animation(&self) -> Arc<Animation> {
        self.shared.animation.load_full()
    }

    pub fn state(&self) -> TransmitterState {
        *self.state.lock()
    }

    /// Render one frame without sending it
    pub fn render_frame(&self) -> Vec<u8> {
        self.shared.render_tick()
    }

    /// Copy of the current universe
    pub fn frame_snapshot(&self) -> FrameBuffer {
        self.shared.render.lock().frame.clone()
    }

    /// Sequence number of the next frame
    pub fn sequence(&self) -> u8 {
        self.shared.render.lock().encoder.sequence()
    }

    /// Frames handed to the socket so far
    pub fn frames_sent(&self) -> u64 {
        self.shared.frames_sent.load(Ordering::Relaxed)
    }
}
