//! Station configuration
//!
//! Loaded from JSON or RON depending on the file extension. Every field has a
//! default, so an empty file (or no file at all) gives the stock installation:
//! an 11 digit, 8 segment display on universe 1 of a local Art-Net node.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::animation::{DisplayLayout, GlyphTable, ShowValue};
use crate::color::Rgb;
use crate::dmx::{Fixture, FixtureProfile, ARTNET_PORT, MAX_UNIVERSE_SIZE};
use crate::{Result, StationError};

/// Maximum accepted config file size (1 MB)
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Longest accepted show interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Art-Net output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtNetConfig {
    /// Node or broadcast IP address
    pub host: String,
    pub port: u16,
    pub universe: u16,
    /// Channels per frame (1-512)
    pub universe_size: usize,
    pub refresh_rate_hz: u32,
}

impl Default for ArtNetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: ARTNET_PORT,
            universe: 1,
            universe_size: MAX_UNIVERSE_SIZE,
            refresh_rate_hz: 30,
        }
    }
}

/// Show queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds each show stays current
    pub interval_secs: u64,
    pub priority_capacity: usize,
    pub background_capacity: usize,
    /// Per-viewer delivery timeout
    pub viewer_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            priority_capacity: 250,
            background_capacity: 500,
            viewer_timeout_ms: 250,
        }
    }
}

/// Segment display wiring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// First channel of the first segment
    pub base_channel: u16,
    pub digits: usize,
    pub segments_per_digit: usize,
    /// Channels per segment; each segment is one RGB fixture
    pub channels_per_segment: u16,
    /// Glyph overrides, character to segment bitmask
    pub glyphs: BTreeMap<String, u32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            base_channel: 1,
            digits: 11,
            segments_per_digit: 8,
            channels_per_segment: 3,
            glyphs: BTreeMap::new(),
        }
    }
}

impl DisplayConfig {
    pub fn layout(&self) -> DisplayLayout {
        let mut glyphs = GlyphTable::default();
        for (key, mask) in &self.glyphs {
            if let Some(c) = key.chars().next() {
                glyphs.insert(c, *mask);
            }
        }

        DisplayLayout {
            digits: self.digits,
            segments_per_digit: self.segments_per_digit,
            glyphs,
        }
    }

    /// One RGB fixture per segment, digit-major order
    pub fn fixtures(&self) -> Vec<Fixture> {
        (0..self.digits * self.segments_per_digit)
            .map(|index| {
                let base = self
                    .base_channel
                    .saturating_add(self.channels_per_segment.saturating_mul(index as u16));
                Fixture::new(FixtureProfile::rgb(), base)
            })
            .collect()
    }
}

/// An extra fixture patched after the display segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Built-in profile key, e.g. `bar252`
    pub profile: String,
    pub base_channel: u16,
}

/// An ambient fact shown when no show is queued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactConfig {
    pub description: String,
    pub initial: ShowValue,
    pub color: Rgb,
    pub increment: f64,
    pub t0: DateTime<Utc>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level, overridden by `RUST_LOG`
    pub level: String,
    pub console_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::INFO)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub artnet: ArtNetConfig,
    pub scheduler: SchedulerConfig,
    pub display: DisplayConfig,
    pub fixtures: Vec<FixtureConfig>,
    pub facts: Vec<FactConfig>,
    pub log: LogConfig,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            artnet: ArtNetConfig::default(),
            scheduler: SchedulerConfig::default(),
            display: DisplayConfig::default(),
            fixtures: Vec::new(),
            facts: default_facts(),
            log: LogConfig::default(),
        }
    }
}

impl StationConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_limit(path, MAX_CONFIG_FILE_SIZE)
    }

    fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > limit {
            return Err(StationError::FileTooLarge { size, limit });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("json");

        let mut content = String::new();
        File::open(path)?.read_to_string(&mut content)?;

        let config: StationConfig = match extension {
            "json" => serde_json::from_str(&content)?,
            "ron" => ron::from_str(&content)?,
            _ => return Err(StationError::UnsupportedFormat(extension.to_string())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(StationError::Config(msg));

        if !(1..=MAX_UNIVERSE_SIZE).contains(&self.artnet.universe_size) {
            return invalid(format!(
                "universe_size must be 1-{}, got {}",
                MAX_UNIVERSE_SIZE, self.artnet.universe_size
            ));
        }
        if self.artnet.refresh_rate_hz == 0 {
            return invalid("refresh_rate_hz must be positive".to_string());
        }
        if !(1..=MAX_INTERVAL_SECS).contains(&self.scheduler.interval_secs) {
            return invalid(format!(
                "interval_secs must be 1-{}, got {}",
                MAX_INTERVAL_SECS, self.scheduler.interval_secs
            ));
        }
        if self.scheduler.priority_capacity == 0 || self.scheduler.background_capacity == 0 {
            return invalid("queue capacities must be positive".to_string());
        }
        if self.display.segments_per_digit > 32 {
            return invalid("at most 32 segments per digit are supported".to_string());
        }
        let last_channel = (self.display.base_channel as usize).saturating_add(
            (self.display.channels_per_segment as usize)
                .saturating_mul(self.display.digits)
                .saturating_mul(self.display.segments_per_digit),
        );
        if last_channel > MAX_UNIVERSE_SIZE + 1 {
            return invalid(format!(
                "display needs channels up to {}, past the end of the universe",
                last_channel - 1
            ));
        }
        for fixture in &self.fixtures {
            let Some(profile) = FixtureProfile::by_key(&fixture.profile) else {
                return invalid(format!("unknown fixture profile '{}'", fixture.profile));
            };
            let patched = Fixture::new(profile, fixture.base_channel);
            if fixture.base_channel == 0
                || patched.end_channel() as usize > self.artnet.universe_size
            {
                return invalid(format!(
                    "fixture '{}' at channel {} does not fit in {} channels",
                    fixture.profile, fixture.base_channel, self.artnet.universe_size
                ));
            }
        }
        if self.facts.is_empty() {
            return invalid("at least one fact is required".to_string());
        }
        Ok(())
    }

    /// Display segments followed by the extra fixtures
    pub fn all_fixtures(&self) -> Result<Vec<Fixture>> {
        let mut fixtures = self.display.fixtures();
        for extra in &self.fixtures {
            let profile = FixtureProfile::by_key(&extra.profile).ok_or_else(|| {
                StationError::Config(format!("unknown fixture profile '{}'", extra.profile))
            })?;
            fixtures.push(Fixture::new(profile, extra.base_channel));
        }
        Ok(fixtures)
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Per second rate of a yearly total
fn per_year(total: f64) -> f64 {
    total / 365.0 / 24.0 / 60.0 / 60.0
}

/// The stock set of ambient facts
pub fn default_facts() -> Vec<FactConfig> {
    let fact = |description: &str,
                initial: i64,
                color: Rgb,
                increment: f64,
                t0: Option<DateTime<Utc>>| {
        t0.map(|t0| FactConfig {
            description: description.to_string(),
            initial: ShowValue::Number(initial),
            color,
            increment,
            t0,
        })
    };

    let yellow = Rgb::new(255, 255, 0);
    let magenta = Rgb::new(255, 0, 255);
    let blue = Rgb::new(0, 0, 255);
    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc());

    [
        fact("World Population", 8_195_809_906, yellow, 2.2, at(2024, 12, 24, 12)),
        fact("Computers produced in 2024", 225_315_180, magenta, 5.1, at(2024, 12, 24, 12)),
        fact("Newspapers circulated", 0, blue, per_year(200_873_303.0), at(2024, 1, 1, 0)),
        fact("CO2 emissions this year", 0, yellow, per_year(38_675_262_757.0), at(2024, 1, 1, 0)),
        fact("Google searches", 8_500_000_000, magenta, 8_500_000_000.0 / 86_400.0, midnight),
        fact("Water used next year", 0, blue, per_year(4_000_000_000.0), at(2024, 1, 1, 0)),
        fact("Seconds after Robots annihilated humans", 0, magenta, 1.0, at(2024, 12, 27, 11)),
        fact("All your base are belong to us", 0, magenta, 1.0, at(2025, 12, 27, 11)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = StationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.facts.len(), 8);
        assert_eq!(config.artnet.port, 6454);
    }

    #[test]
    fn test_display_fixtures_addressing() {
        let display = DisplayConfig::default();
        let fixtures = display.fixtures();

        assert_eq!(fixtures.len(), 88);
        assert_eq!(fixtures[0].base_channel, 1);
        assert_eq!(fixtures[1].base_channel, 4);
        // digit 1, segment 0
        assert_eq!(fixtures[8].base_channel, 8 * 3 + 1);
        assert_eq!(fixtures[87].end_channel(), 264);
    }

    #[test]
    fn test_glyph_overrides() {
        let mut display = DisplayConfig::default();
        display.glyphs.insert("7".to_string(), 0x27);
        display.glyphs.insert("E".to_string(), 0x79);

        let layout = display.layout();
        assert_eq!(layout.glyphs.mask('7'), 0x27);
        assert_eq!(layout.glyphs.mask('E'), 0x79);
        assert_eq!(layout.glyphs.mask('1'), 0x06);
    }

    #[test]
    fn test_validate_rejects_oversized_universe() {
        let mut config = StationConfig::default();
        config.artnet.universe_size = 600;
        assert!(matches!(config.validate(), Err(StationError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_display_past_universe_end() {
        let mut config = StationConfig::default();
        config.display.base_channel = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_profile() {
        let mut config = StationConfig::default();
        config.fixtures.push(FixtureConfig {
            profile: "fog_machine".to_string(),
            base_channel: 300,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_fixture_past_universe_end() {
        let mut config = StationConfig::default();
        config.fixtures.push(FixtureConfig {
            profile: "rgb".to_string(),
            base_channel: u16::MAX - 1,
        });
        assert!(matches!(config.validate(), Err(StationError::Config(_))));

        config.fixtures[0].base_channel = 510;
        config.validate().unwrap();
        config.fixtures[0].base_channel = 511;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_interval() {
        let mut config = StationConfig::default();
        config.scheduler.interval_secs = u64::MAX / 2;
        assert!(matches!(config.validate(), Err(StationError::Config(_))));
    }

    #[test]
    fn test_all_fixtures_appends_extras() {
        let mut config = StationConfig::default();
        config.fixtures.push(FixtureConfig {
            profile: "bar252".to_string(),
            base_channel: 300,
        });

        let fixtures = config.all_fixtures().unwrap();
        assert_eq!(fixtures.len(), 89);
        assert_eq!(fixtures[88].profile, FixtureProfile::bar252());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"artnet": {{"host": "10.0.0.5", "universe_size": 264}}, "log": {{"level": "debug"}}}}"#
        )
        .unwrap();

        let config = StationConfig::load(file.path()).unwrap();
        assert_eq!(config.artnet.host, "10.0.0.5");
        assert_eq!(config.artnet.universe_size, 264);
        assert_eq!(config.artnet.refresh_rate_hz, 30);
        assert_eq!(config.log.parse_level(), LevelFilter::DEBUG);
        assert_eq!(config.facts.len(), 8);
    }

    #[test]
    fn test_load_ron() {
        let mut file = Builder::new().suffix(".ron").tempfile().unwrap();
        write!(file, "(scheduler: (interval_secs: 5))").unwrap();

        let config = StationConfig::load(file.path()).unwrap();
        assert_eq!(config.scheduler.interval_secs, 5);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            StationConfig::load(file.path()),
            Err(StationError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_rejects_large_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(matches!(
            StationConfig::load_with_limit(file.path(), 1),
            Err(StationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_unparseable_level_falls_back_to_info() {
        let log = LogConfig {
            level: "chatty".to_string(),
            console_output: true,
        };
        assert_eq!(log.parse_level(), LevelFilter::INFO);
    }
}
