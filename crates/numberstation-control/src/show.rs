//! Shows: numeric facts queued for the segment display

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::animation::{Animation, DisplayLayout, GrowingNumbers, ShowValue};
use crate::color::Rgb;

/// Grey used for the "random fact" placeholder
pub const PLACEHOLDER_COLOR: Rgb = Rgb::new(128, 128, 128);

/// One fact to display, growing at a fixed rate from its start time
#[derive(Debug, Clone, PartialEq)]
pub struct Show {
    pub description: String,
    pub initial: ShowValue,
    pub color: Rgb,
    /// Growth per second
    pub increment: f64,
    pub t0: DateTime<Utc>,
    animation: Animation,
}

impl Show {
    pub fn new(
        description: impl Into<String>,
        initial: ShowValue,
        color: Rgb,
        increment: f64,
        t0: DateTime<Utc>,
        layout: Arc<DisplayLayout>,
    ) -> Self {
        let animation = Animation::GrowingNumbers(GrowingNumbers::new(
            initial.clone(),
            color,
            increment,
            t0,
            layout,
        ));

        Self {
            description: description.into(),
            initial,
            color,
            increment,
            t0,
            animation,
        }
    }

    /// The "A random fact / ???" show
    pub fn placeholder(layout: Arc<DisplayLayout>) -> Self {
        Self::new(
            "A random fact",
            ShowValue::Text("???".to_string()),
            PLACEHOLDER_COLOR,
            0.0,
            Utc::now(),
            layout,
        )
    }

    /// Current value
    pub fn now(&self) -> ShowValue {
        self.now_at(Utc::now())
    }

    pub fn now_at(&self, now: DateTime<Utc>) -> ShowValue {
        self.initial.grown(self.increment, self.t0, now)
    }

    /// The display animation built for this show
    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}
