//! Numberstation Control - Art-Net lighting output engine
//!
//! This crate drives a segment display and a few stage fixtures over Art-Net:
//! - **DMX**: Universe buffer, fixture profiles and ArtDmx encoding
//! - **Animations**: Steady, fade, chase, rainbow and friends, plus the
//!   growing-number display
//! - **Transmitter**: Fixed-rate render loop with atomic animation swaps
//! - **Scheduler**: Priority and background show queues with ambient facts
//! - **Viewers**: Fan-out of show changes to live viewers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use numberstation_control::{Rgb, ShowValue, Station, StationConfig};
//! use chrono::Utc;
//!
//! # async fn run() -> numberstation_control::Result<()> {
//! let station = Station::new(StationConfig::default())?;
//! station.start();
//! station.submit_show("Cups of coffee", ShowValue::Number(42), Rgb::new(255, 0, 255), 0.5, Utc::now(), true)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dmx`] - Frame buffer, fixtures and Art-Net
//! - [`animation`] - Per-fixture color functions
//! - [`transmitter`] - Render loop
//! - [`scheduler`] - Show queues
//! - [`viewers`] - Viewer fan-out
//! - [`station`] - The assembled station
//! - [`config`] - Configuration files
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Error types
pub mod error;
/// RGB colors
pub mod color;
/// Configuration
pub mod config;

/// DMX output (Art-Net)
pub mod dmx;
/// Animations
pub mod animation;
/// Render loop
pub mod transmitter;

/// Show model
pub mod show;
/// Show queues
pub mod scheduler;
/// Viewer fan-out
pub mod viewers;
/// Station context
pub mod station;

// Re-exports
pub use error::{QueueKind, Result, StationError};

pub use animation::{Animation, DisplayLayout, GlyphTable, ShowValue, ANIMATION_NAMES};
pub use color::Rgb;
pub use config::{
    ArtNetConfig, DisplayConfig, FactConfig, FixtureConfig, LogConfig, SchedulerConfig,
    StationConfig,
};
pub use dmx::{ArtDmxEncoder, ArtNetSender, Fixture, FixtureProfile, FrameBuffer};
pub use scheduler::{ShowChanged, ShowScheduler, SubmitAck};
pub use show::Show;
pub use station::{ShowRequest, Station};
pub use transmitter::{Transmitter, TransmitterState};
pub use viewers::{ShowSnapshot, ViewerHub};
