//! Functions for smoothing out the various trajectories of the feet.

use std::f32::consts::{FRAC_PI_2, PI};

/// Returns a value between 0 and 1 that rises and falls back, where `t` runs from 0 to 1.
///
/// The path is a raised sine, it peaks at `t = 0.5` and ends at the same height it started.
///
/// # Examples
/// ```
/// use sleipnir::walk::smoothing::parabolic_return;
///
/// assert!(parabolic_return(0.0).abs() < 1e-6);
/// assert!((parabolic_return(0.5) - 1.0).abs() < 1e-6);
/// assert!(parabolic_return(1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn parabolic_return(t: f32) -> f32 {
    0.5 * (2.0 * PI * t - FRAC_PI_2).sin() + 0.5
}

/// Returns a value between 0 and 1 that moves from 0 to 1 as `t` runs from 0 to 1.
///
/// The path accelerates during the first half and decelerates during the second half, passing
/// 0.5 at the halfway point.
///
/// # Examples
/// ```
/// use sleipnir::walk::smoothing::parabolic_step;
///
/// assert_eq!(parabolic_step(0.0), 0.0);
/// assert_eq!(parabolic_step(0.5), 0.5);
/// assert_eq!(parabolic_step(1.0), 1.0);
/// ```
#[must_use]
pub fn parabolic_step(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t.powi(2)
    } else {
        4.0 * t - 2.0 * t.powi(2) - 1.0
    }
}

/// Linear interpolation between `from` and `to`.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
