//! Animations computing per-fixture colors
//!
//! An [`Animation`] is a pure function of fixture index, fixture count and
//! time. The transmitter evaluates it once per fixture per tick; indices are
//! independent, so evaluation order does not matter.

pub mod numbers;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use numbers::{DisplayLayout, GlyphTable, GrowingNumbers, ShowValue};

use crate::color::Rgb;
use crate::{Result, StationError};

/// Length of a fade
pub const FADE_DURATION: Duration = Duration::from_secs(2);
/// Chase step time
pub const CHASE_STEP: Duration = Duration::from_millis(150);
/// Time each color of a two-color alternation is held
pub const TWO_COLOR_PERIOD: Duration = Duration::from_secs(1);
/// Time a random single fixture stays lit
pub const RANDOM_STEP: Duration = Duration::from_millis(250);
/// Rainbow rotations per second
pub const RAINBOW_SPEED: f64 = 0.1;
/// Caramelldansen tempo
pub const CARAMELLDANSEN_BPM: f64 = 165.0;

/// Names accepted by [`Animation::from_name`]
pub const ANIMATION_NAMES: [&str; 8] = [
    "off",
    "chase",
    "fade",
    "rainbow",
    "steady",
    "twocolor",
    "caramelldansen",
    "randomsingle",
];

/// Seconds between `start` and `now`, never negative
pub(crate) fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(start);
    (elapsed.num_milliseconds() as f64 / 1000.0).max(0.0)
}

/// Index of the time quantum `now` falls into
fn quantum(start: DateTime<Utc>, now: DateTime<Utc>, step: Duration) -> u64 {
    (elapsed_seconds(start, now) / step.as_secs_f64()).floor() as u64
}

/// All animation variants
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Blackout; stops the render loop after one black frame
    Off,
    Steady {
        color: Rgb,
    },
    FadeTo {
        from: Rgb,
        to: Rgb,
        started_at: DateTime<Utc>,
    },
    RotatingRainbow {
        started_at: DateTime<Utc>,
    },
    Chase {
        color: Rgb,
        started_at: DateTime<Utc>,
    },
    /// `color` and its complement alternate on all fixtures at once
    TwoColor {
        color: Rgb,
        started_at: DateTime<Utc>,
    },
    Caramelldansen {
        color: Rgb,
        started_at: DateTime<Utc>,
    },
    RandomSingle {
        color: Rgb,
        seed: u64,
        started_at: DateTime<Utc>,
    },
    GrowingNumbers(GrowingNumbers),
}

impl Animation {
    pub fn steady(color: Rgb) -> Self {
        Animation::Steady { color }
    }

    pub fn fade(from: Rgb, to: Rgb) -> Self {
        Animation::FadeTo {
            from,
            to,
            started_at: Utc::now(),
        }
    }

    pub fn rainbow() -> Self {
        Animation::RotatingRainbow {
            started_at: Utc::now(),
        }
    }

    pub fn chase(color: Rgb) -> Self {
        Animation::Chase {
            color,
            started_at: Utc::now(),
        }
    }

    pub fn two_color(color: Rgb) -> Self {
        Animation::TwoColor {
            color,
            started_at: Utc::now(),
        }
    }

    pub fn caramelldansen(color: Rgb) -> Self {
        Animation::Caramelldansen {
            color,
            started_at: Utc::now(),
        }
    }

    pub fn random_single(color: Rgb) -> Self {
        Animation::RandomSingle {
            color,
            seed: rand::random(),
            started_at: Utc::now(),
        }
    }

    /// Resolve an operator animation name.
    ///
    /// `color` is the base color of color animations, `previous` the color a
    /// fade starts from.
    pub fn from_name(name: &str, color: Rgb, previous: Rgb) -> Result<Self> {
        let animation = match name {
            "off" => Animation::Off,
            "chase" => Animation::chase(color),
            "fade" => Animation::fade(previous, color),
            "rainbow" => Animation::rainbow(),
            "steady" => Animation::steady(color),
            "twocolor" => Animation::two_color(color),
            "caramelldansen" => Animation::caramelldansen(color),
            "randomsingle" => Animation::random_single(color),
            _ => return Err(StationError::InvalidAnimation(name.to_string())),
        };
        Ok(animation)
    }

    /// Operator name of this animation
    pub fn name(&self) -> &'static str {
        match self {
            Animation::Off => "off",
            Animation::Steady { .. } => "steady",
            Animation::FadeTo { .. } => "fade",
            Animation::RotatingRainbow { .. } => "rainbow",
            Animation::Chase { .. } => "chase",
            Animation::TwoColor { .. } => "twocolor",
            Animation::Caramelldansen { .. } => "caramelldansen",
            Animation::RandomSingle { .. } => "randomsingle",
            Animation::GrowingNumbers(_) => "numbers",
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, Animation::Off)
    }

    /// Color of fixture `index` out of `total` right now
    pub fn color_at(&self, index: usize, total: usize) -> Rgb {
        self.color_at_time(index, total, Utc::now())
    }

    /// Color of fixture `index` out of `total` at `now`
    pub fn color_at_time(&self, index: usize, total: usize, now: DateTime<Utc>) -> Rgb {
        if index >= total {
            return Rgb::BLACK;
        }

        match self {
            Animation::Off => Rgb::BLACK,
            Animation::Steady { color } => *color,
            Animation::FadeTo {
                from,
                to,
                started_at,
            } => {
                let progress = elapsed_seconds(*started_at, now) / FADE_DURATION.as_secs_f64();
                from.lerp(*to, progress as f32)
            }
            Animation::RotatingRainbow { started_at } => {
                let elapsed = elapsed_seconds(*started_at, now);
                let hue = (elapsed * RAINBOW_SPEED + index as f64 / total as f64).rem_euclid(1.0);
                Rgb::from_hsv(hue as f32, 1.0, 1.0)
            }
            Animation::Chase { color, started_at } => {
                let lit = quantum(*started_at, now, CHASE_STEP) % total as u64;
                if lit == index as u64 {
                    *color
                } else {
                    Rgb::BLACK
                }
            }
            Animation::TwoColor { color, started_at } => {
                if quantum(*started_at, now, TWO_COLOR_PERIOD) % 2 == 0 {
                    *color
                } else {
                    color.complement()
                }
            }
            Animation::Caramelldansen { color, started_at } => {
                let beat = Duration::from_secs_f64(60.0 / CARAMELLDANSEN_BPM);
                let beat_index = quantum(*started_at, now, beat);
                if beat_index % 4 == 3 {
                    *color
                } else {
                    let step = (beat_index + index as u64) % 6;
                    Rgb::from_hsv(step as f32 / 6.0, 1.0, 1.0)
                }
            }
            Animation::RandomSingle {
                color,
                seed,
                started_at,
            } => {
                let step = quantum(*started_at, now, RANDOM_STEP);
                // Same seed for every index within one quantum
                let mut rng = StdRng::seed_from_u64(seed ^ step.wrapping_mul(0x9E37_79B9_7F4A_7C15));
                if rng.random_range(0..total) == index {
                    *color
                } else {
                    Rgb::BLACK
                }
            }
            Animation::GrowingNumbers(numbers) => numbers.color_at_time(index, now),
        }
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Animation::GrowingNumbers(numbers) => write!(f, "numbers({})", numbers.value),
            other => f.write_str(other.name()),
        }
    }
}
