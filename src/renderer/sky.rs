//! Day/night cycle
//!
//! The cycle is split into four equal bands. Each band holds its own
//! gradient for the first three quarters of its span and blends into the
//! next band over the last quarter. The sun crosses the sky during the
//! three day bands; the moon crosses during the night band.

use std::f32::consts::PI;

use glam::Vec2;

use crate::{lerp_color, rgb};

pub type Color = [f32; 4];

/// Fraction of a band spent blending into the next one
const BLEND_FRACTION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBand {
    Morning,
    Midday,
    Evening,
    Night,
}

impl DayBand {
    pub const ALL: [DayBand; 4] = [
        DayBand::Morning,
        DayBand::Midday,
        DayBand::Evening,
        DayBand::Night,
    ];

    pub fn next(self) -> DayBand {
        match self {
            DayBand::Morning => DayBand::Midday,
            DayBand::Midday => DayBand::Evening,
            DayBand::Evening => DayBand::Night,
            DayBand::Night => DayBand::Morning,
        }
    }

    /// Gradient stops: top, middle, horizon
    pub fn gradient(self) -> [Color; 3] {
        match self {
            DayBand::Morning => [rgb(255, 183, 132), rgb(255, 214, 170), rgb(255, 236, 210)],
            DayBand::Midday => [rgb(78, 160, 235), rgb(126, 192, 238), rgb(196, 228, 250)],
            DayBand::Evening => [rgb(74, 52, 110), rgb(214, 96, 96), rgb(255, 170, 100)],
            DayBand::Night => [rgb(8, 12, 40), rgb(20, 28, 70), rgb(40, 50, 100)],
        }
    }
}

/// Band and progress through it (0.0 - 1.0)
pub fn band_progress(clock: u64, cycle: u64) -> (DayBand, f32) {
    let cycle = cycle.max(1);
    let pos = (clock % cycle) as f32 / cycle as f32 * 4.0;
    let index = (pos.floor() as usize).min(3);
    (DayBand::ALL[index], pos - index as f32)
}

pub fn band_at(clock: u64, cycle: u64) -> DayBand {
    band_progress(clock, cycle).0
}

/// Sky gradient stops for this point of the cycle
pub fn sky_gradient(clock: u64, cycle: u64) -> [Color; 3] {
    let (band, progress) = band_progress(clock, cycle);
    let from = band.gradient();
    let hold = 1.0 - BLEND_FRACTION;
    if progress < hold {
        return from;
    }
    let t = (progress - hold) / BLEND_FRACTION;
    let to = band.next().gradient();
    [
        lerp_color(from[0], to[0], t),
        lerp_color(from[1], to[1], t),
        lerp_color(from[2], to[2], t),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Sun,
    Moon,
}

/// Sun or moon placement for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celestial {
    pub kind: BodyKind,
    pub center: Vec2,
    pub radius: f32,
}

/// Where the sun or moon sits. Both rise at the left edge of the sky and set
/// at the right edge on a half-sine arc above `horizon`.
pub fn celestial_body(clock: u64, cycle: u64, width: f32, horizon: f32) -> Celestial {
    let cycle = cycle.max(1);
    let frac = (clock % cycle) as f32 / cycle as f32;
    let day_span = 0.75;
    let (kind, t, radius) = if frac < day_span {
        (BodyKind::Sun, frac / day_span, 26.0)
    } else {
        (BodyKind::Moon, (frac - day_span) / (1.0 - day_span), 20.0)
    };
    let x = -radius + t * (width + 2.0 * radius);
    let y = horizon - (t * PI).sin() * horizon * 0.8;
    Celestial {
        kind,
        center: Vec2::new(x, y),
        radius,
    }
}

/// Night only
pub fn stars_visible(clock: u64, cycle: u64) -> bool {
    band_at(clock, cycle) == DayBand::Night
}

/// Star opacity; twinkles between 0.3 and 1.0
pub fn star_alpha(clock_ticks: u64, twinkle_phase: f32) -> f32 {
    let wave = (clock_ticks as f32 * 0.05 + twinkle_phase).sin();
    0.65 + 0.35 * wave
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: u64 = 3600;

    #[test]
    fn bands_follow_the_clock() {
        assert_eq!(band_at(0, CYCLE), DayBand::Morning);
        assert_eq!(band_at(900, CYCLE), DayBand::Midday);
        assert_eq!(band_at(1800, CYCLE), DayBand::Evening);
        assert_eq!(band_at(2700, CYCLE), DayBand::Night);
        assert_eq!(band_at(3599, CYCLE), DayBand::Night);
        assert_eq!(band_at(3600, CYCLE), DayBand::Morning);
    }

    #[test]
    fn gradient_holds_then_blends() {
        assert_eq!(sky_gradient(100, CYCLE), DayBand::Morning.gradient());
        assert_eq!(sky_gradient(600, CYCLE), DayBand::Morning.gradient());

        let mid_blend = sky_gradient(787, CYCLE);
        assert_ne!(mid_blend, DayBand::Morning.gradient());
        assert_ne!(mid_blend, DayBand::Midday.gradient());

        // End of the blend meets the next band
        let end = sky_gradient(899, CYCLE);
        let next = DayBand::Midday.gradient();
        for (a, b) in end.iter().zip(next.iter()) {
            for c in 0..4 {
                assert!((a[c] - b[c]).abs() < 0.02);
            }
        }
    }

    #[test]
    fn night_wraps_into_morning() {
        let end = sky_gradient(CYCLE - 1, CYCLE);
        let morning = DayBand::Morning.gradient();
        assert!((end[0][0] - morning[0][0]).abs() < 0.02);
    }

    #[test]
    fn sun_by_day_moon_by_night() {
        assert_eq!(celestial_body(0, CYCLE, 400.0, 520.0).kind, BodyKind::Sun);
        assert_eq!(celestial_body(2000, CYCLE, 400.0, 520.0).kind, BodyKind::Sun);
        assert_eq!(celestial_body(3000, CYCLE, 400.0, 520.0).kind, BodyKind::Moon);
    }

    #[test]
    fn sun_peaks_mid_day() {
        let rise = celestial_body(0, CYCLE, 400.0, 520.0);
        let noon = celestial_body(1350, CYCLE, 400.0, 520.0);
        assert!(noon.center.y < rise.center.y);
        assert!(noon.center.x > rise.center.x);
    }

    #[test]
    fn stars_only_at_night() {
        assert!(!stars_visible(0, CYCLE));
        assert!(!stars_visible(2000, CYCLE));
        assert!(stars_visible(2800, CYCLE));
    }

    #[test]
    fn star_alpha_in_range() {
        for tick in 0..500 {
            let a = star_alpha(tick, 1.3);
            assert!((0.3 - 1e-5..=1.0 + 1e-5).contains(&a));
        }
    }

    #[test]
    fn zero_cycle_does_not_panic() {
        assert_eq!(band_at(5, 0), DayBand::Morning);
        let _ = celestial_body(5, 0, 400.0, 520.0);
    }
}
