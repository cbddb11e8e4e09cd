//! DMX output system
//!
//! This module provides the universe buffer, fixture patching and Art-Net
//! encoding used by the [`Transmitter`](crate::Transmitter).
//!
//! ## Art-Net
//!
//! Art-Net is a fire-and-forget UDP protocol for DMX transmission over Ethernet.
//! - Default port 6454 (0x1936)
//! - Sequence numbers 1-255, 0 disables sequencing
//! - Lost frames are superseded by the next tick
//!
//! ## Fixtures
//!
//! ```rust
//! use numberstation_control::dmx::{Fixture, FixtureProfile, FrameBuffer};
//! use numberstation_control::Rgb;
//!
//! let fixture = Fixture::new(FixtureProfile::bar252(), 1);
//! let mut frame = FrameBuffer::new(512);
//! fixture.write_controls(&mut frame);
//! fixture.write_color(&mut frame, Rgb::new(255, 128, 64));
//! ```

pub mod artnet;
pub mod fixtures;
pub mod frame;

pub use artnet::{ArtDmxEncoder, ArtNetSender, ARTNET_PORT};
pub use fixtures::{correct, FixedChannel, Fixture, FixtureProfile};
pub use frame::{FrameBuffer, MAX_UNIVERSE_SIZE};
