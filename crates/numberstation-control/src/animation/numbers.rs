//! Segment display rendering for growing numbers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::elapsed_seconds;
use crate::color::Rgb;

/// Value shown by a show: a growing integer or a fixed string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShowValue {
    Number(i64),
    Text(String),
}

impl ShowValue {
    /// Parse user input. Anything that is not an integer is kept as text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(number) => ShowValue::Number(number),
            Err(_) => ShowValue::Text(trimmed.to_string()),
        }
    }

    /// Value after growing at `increment` per second since `t0`
    pub fn grown(&self, increment: f64, t0: DateTime<Utc>, now: DateTime<Utc>) -> ShowValue {
        match self {
            ShowValue::Number(initial) => {
                let growth = (elapsed_seconds(t0, now) * increment).trunc();
                ShowValue::Number(initial.saturating_add(growth as i64))
            }
            ShowValue::Text(text) => ShowValue::Text(text.clone()),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ShowValue::Number(_))
    }
}

impl fmt::Display for ShowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowValue::Number(number) => write!(f, "{}", number),
            ShowValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for ShowValue {
    fn from(number: i64) -> Self {
        ShowValue::Number(number)
    }
}

impl From<&str> for ShowValue {
    fn from(input: &str) -> Self {
        ShowValue::parse(input)
    }
}

/// Character to lit-segment bitmask table.
///
/// Bit `n` set means segment `n` of the digit is lit. The default table uses
/// the usual a-g order followed by the decimal point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    glyphs: HashMap<char, u32>,
}

impl GlyphTable {
    pub fn new(glyphs: HashMap<char, u32>) -> Self {
        Self { glyphs }
    }

    /// Segment mask for `c`, blank for unknown characters
    pub fn mask(&self, c: char) -> u32 {
        self.glyphs.get(&c).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, c: char, mask: u32) {
        self.glyphs.insert(c, mask);
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        let glyphs = [
            ('0', 0x3F),
            ('1', 0x06),
            ('2', 0x5B),
            ('3', 0x4F),
            ('4', 0x66),
            ('5', 0x6D),
            ('6', 0x7D),
            ('7', 0x07),
            ('8', 0x7F),
            ('9', 0x6F),
            (' ', 0x00),
            ('-', 0x40),
            ('?', 0x53),
        ];
        Self::new(glyphs.into_iter().collect())
    }
}

/// Geometry of the segment display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLayout {
    pub digits: usize,
    pub segments_per_digit: usize,
    pub glyphs: GlyphTable,
}

impl DisplayLayout {
    /// Number of addressable segment fixtures
    pub fn fixture_count(&self) -> usize {
        self.digits * self.segments_per_digit
    }

    /// Right-align `text` in the available digits.
    ///
    /// Short values are padded with blanks on the left; long values keep
    /// their least significant characters.
    pub fn fit(&self, text: &str) -> Vec<char> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() >= self.digits {
            chars[chars.len() - self.digits..].to_vec()
        } else {
            let mut padded = vec![' '; self.digits - chars.len()];
            padded.extend(chars);
            padded
        }
    }

    /// Whether fixture `index` is lit when showing `text`
    pub fn is_lit(&self, text: &[char], index: usize) -> bool {
        if self.segments_per_digit == 0 {
            return false;
        }
        let digit = index / self.segments_per_digit;
        let segment = index % self.segments_per_digit;

        match text.get(digit) {
            Some(&c) if segment < 32 => self.glyphs.mask(c) & (1 << segment) != 0,
            _ => false,
        }
    }
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            digits: 11,
            segments_per_digit: 8,
            glyphs: GlyphTable::default(),
        }
    }
}

/// Renders a show's value onto the segment display
#[derive(Debug, Clone, PartialEq)]
pub struct GrowingNumbers {
    pub value: ShowValue,
    pub color: Rgb,
    pub increment: f64,
    pub t0: DateTime<Utc>,
    pub layout: Arc<DisplayLayout>,
}

impl GrowingNumbers {
    pub fn new(
        value: ShowValue,
        color: Rgb,
        increment: f64,
        t0: DateTime<Utc>,
        layout: Arc<DisplayLayout>,
    ) -> Self {
        Self {
            value,
            color,
            increment,
            t0,
            layout,
        }
    }

    /// The digit string shown at `now`
    pub fn text_at(&self, now: DateTime<Utc>) -> Vec<char> {
        let value = self.value.grown(self.increment, self.t0, now);
        self.layout.fit(&value.to_string())
    }

    pub fn color_at_time(&self, index: usize, now: DateTime<Utc>) -> Rgb {
        if index >= self.layout.fixture_count() {
            return Rgb::BLACK;
        }
        if self.layout.is_lit(&self.text_at(now), index) {
            self.color
        } else {
            Rgb::BLACK
        }
    }
}
