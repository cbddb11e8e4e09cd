use std::sync::Arc;

use chrono::{Duration, Utc};
use numberstation_control::animation::{Animation, DisplayLayout, GrowingNumbers, ShowValue};
use numberstation_control::dmx::correct;
use numberstation_control::Rgb;
use proptest::prelude::*;

fn animations(color: Rgb) -> Vec<Animation> {
    vec![
        Animation::Off,
        Animation::steady(color),
        Animation::fade(Rgb::BLACK, color),
        Animation::rainbow(),
        Animation::chase(color),
        Animation::two_color(color),
        Animation::caramelldansen(color),
        Animation::random_single(color),
        Animation::GrowingNumbers(GrowingNumbers::new(
            ShowValue::Number(1234),
            color,
            3.0,
            Utc::now(),
            Arc::new(DisplayLayout::default()),
        )),
    ]
}

proptest! {
    #[test]
    fn out_of_range_indices_are_black(
        r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
        total in 0usize..200,
        extra in 0usize..50,
        offset_ms in 0i64..600_000,
    ) {
        let now = Utc::now() + Duration::milliseconds(offset_ms);
        for animation in animations(Rgb::new(r, g, b)) {
            prop_assert_eq!(animation.color_at_time(total + extra, total, now), Rgb::BLACK);
        }
    }

    #[test]
    fn in_range_colors_stay_in_palette(
        r in any::<u8>(), g in any::<u8>(), b in any::<u8>(),
        total in 1usize..200,
        index_seed in any::<usize>(),
        offset_ms in 0i64..600_000,
    ) {
        let color = Rgb::new(r, g, b);
        let index = index_seed % total;
        let now = Utc::now() + Duration::milliseconds(offset_ms);

        for animation in animations(color) {
            let out = animation.color_at_time(index, total, now);
            match &animation {
                Animation::Off => {
                    prop_assert_eq!(out, Rgb::BLACK);
                }
                Animation::Steady { .. } => {
                    prop_assert_eq!(out, color);
                }
                Animation::Chase { .. }
                | Animation::RandomSingle { .. }
                | Animation::GrowingNumbers(_) => {
                    prop_assert!(out == color || out == Rgb::BLACK);
                }
                Animation::TwoColor { .. } => {
                    prop_assert!(out == color || out == color.complement());
                }
                Animation::FadeTo { .. } => {
                    prop_assert!(out.r <= color.r && out.g <= color.g && out.b <= color.b);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn correction_is_monotonic(a in any::<u8>(), b in any::<u8>()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(correct(low) <= correct(high));
        prop_assert!(correct(high) <= 64);
    }
}

#[test]
fn test_correction_endpoints() {
    assert_eq!(correct(0), 0);
    assert_eq!(correct(255), 64);
}

#[test]
fn test_random_single_lights_exactly_one_fixture() {
    let animation = Animation::random_single(Rgb::WHITE);
    let now = Utc::now() + Duration::milliseconds(1_100);

    let lit = (0..40)
        .filter(|&index| animation.color_at_time(index, 40, now) == Rgb::WHITE)
        .count();
    assert_eq!(lit, 1);
}
