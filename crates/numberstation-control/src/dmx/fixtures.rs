//! DMX fixture profiles

use serde::{Deserialize, Serialize};

use super::frame::FrameBuffer;
use crate::color::Rgb;

/// Map a linear 0-255 value onto the 0-64 brightness scale of the LED drivers.
///
/// `floor((v / 255)^2 * 64)`
pub fn correct(value: u8) -> u8 {
    let normalized = value as f64 / 255.0;
    (normalized * normalized * 64.0).floor() as u8
}

/// A channel with a value that never changes after patching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedChannel {
    /// Offset from the fixture's base channel
    pub offset: u16,
    pub value: u8,
}

/// DMX fixture profile defining channel layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureProfile {
    pub name: String,
    /// Offset of the red channel; green and blue follow it
    pub rgb_offset: u16,
    /// Mode, strobe and dimmer channels written once when patched
    pub fixed_channels: Vec<FixedChannel>,
}

impl FixtureProfile {
    /// Bare three channel RGB fixture, also used for display segments
    pub fn rgb() -> Self {
        Self {
            name: "RGB".to_string(),
            rgb_offset: 0,
            fixed_channels: Vec::new(),
        }
    }

    /// LED bar 252 in 5 channel mode
    pub fn bar252() -> Self {
        Self {
            name: "Bar 252".to_string(),
            rgb_offset: 2,
            fixed_channels: vec![
                FixedChannel { offset: 0, value: 81 },
                FixedChannel { offset: 1, value: 0 },
            ],
        }
    }

    /// RED Spot 18 RGB
    pub fn red_spot_18_rgb() -> Self {
        Self {
            name: "RED Spot 18 RGB".to_string(),
            rgb_offset: 1,
            fixed_channels: vec![FixedChannel { offset: 0, value: 0 }],
        }
    }

    /// Stairville LED Par56, 7 channel mode
    pub fn stairville_led_par56() -> Self {
        Self {
            name: "Stairville LED Par56".to_string(),
            rgb_offset: 0,
            fixed_channels: vec![
                FixedChannel { offset: 3, value: 0 },
                FixedChannel { offset: 4, value: 0 },
                FixedChannel { offset: 5, value: 0 },
                FixedChannel { offset: 6, value: 255 },
            ],
        }
    }

    /// Look up a built-in profile by its config key
    pub fn by_key(key: &str) -> Option<Self> {
        match key {
            "rgb" => Some(Self::rgb()),
            "bar252" => Some(Self::bar252()),
            "red_spot_18_rgb" => Some(Self::red_spot_18_rgb()),
            "stairville_led_par56" => Some(Self::stairville_led_par56()),
            _ => None,
        }
    }

    /// Get the number of channels this fixture uses
    pub fn channel_count(&self) -> u16 {
        self.fixed_channels
            .iter()
            .map(|fixed| fixed.offset + 1)
            .chain(std::iter::once(self.rgb_offset + 3))
            .max()
            .unwrap_or(3)
    }
}

/// A patched fixture instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub profile: FixtureProfile,
    pub base_channel: u16, // 1-512
}

impl Fixture {
    /// Create a new fixture instance
    pub fn new(profile: FixtureProfile, base_channel: u16) -> Self {
        Self {
            profile,
            base_channel,
        }
    }

    /// Get the end address of this fixture
    pub fn end_channel(&self) -> u16 {
        self.base_channel
            .saturating_add(self.profile.channel_count().saturating_sub(1))
    }

    /// Absolute channel at `offset`, `None` past the end of the address space
    fn channel(&self, offset: u16) -> Option<u16> {
        self.base_channel.checked_add(offset)
    }

    /// Write the fixed control channels
    pub fn write_controls(&self, frame: &mut FrameBuffer) {
        for fixed in &self.profile.fixed_channels {
            if let Some(channel) = self.channel(fixed.offset) {
                frame.set(channel, fixed.value);
            }
        }
    }

    /// Write a color to the RGB triple after perceptual correction
    pub fn write_color(&self, frame: &mut FrameBuffer, color: Rgb) {
        let values = [color.r, color.g, color.b];
        for (step, value) in (0u16..).zip(values) {
            let channel = self
                .profile
                .rgb_offset
                .checked_add(step)
                .and_then(|offset| self.channel(offset));
            if let Some(channel) = channel {
                frame.set(channel, correct(value));
            }
        }
    }
}
