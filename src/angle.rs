//! Wheel geometry.
//!
//! Wedge `i` spans `[i·θ, (i+1)·θ)` in the wheel's own frame, with
//! `θ = 2π / n`. The wheel is drawn rotated by the accumulated rotation, so a
//! point at screen angle `φ` sits over wheel-local angle `φ - rotation`. The
//! pointer is fixed at screen angle 0.

use std::f64::consts::TAU;

/// Reduce an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Angular width of a single wedge.
pub fn wedge_angle(segment_count: usize) -> f64 {
    TAU / segment_count.max(1) as f64
}

/// Wheel-local angle of the middle of wedge `index`.
pub fn wedge_center(index: usize, segment_count: usize) -> f64 {
    let theta = wedge_angle(segment_count);
    index as f64 * theta + theta / 2.0
}

/// Index of the wedge drawn at `screen_angle` when the wheel is rotated by `rotation`.
pub fn index_at_screen_angle(screen_angle: f64, rotation: f64, segment_count: usize) -> usize {
    let last = segment_count.max(1) - 1;
    let local = wrap_angle(screen_angle - rotation);
    let index = (local / wedge_angle(segment_count)).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(last)
    }
}

/// Index of the wedge currently under the pointer.
pub fn index_under_pointer(rotation: f64, segment_count: usize) -> usize {
    index_at_screen_angle(0.0, rotation, segment_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn wrap_angle_stays_in_range() {
        assert_relative_eq!(wrap_angle(0.0), 0.0);
        assert_relative_eq!(wrap_angle(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-PI / 2.0), 3.0 * PI / 2.0, epsilon = 1e-12);
        assert!(wrap_angle(-1e-18) < TAU);
        assert!(wrap_angle(-50.0 * TAU - 0.25) >= 0.0);
    }

    #[test]
    fn wedge_centers_split_the_circle() {
        assert_relative_eq!(wedge_angle(4), PI / 2.0);
        assert_relative_eq!(wedge_center(0, 4), PI / 4.0);
        assert_relative_eq!(wedge_center(3, 4), 7.0 * PI / 4.0);
        assert_relative_eq!(wedge_angle(1), TAU);
    }

    #[test]
    fn pointer_reads_wedge_rotated_onto_it() {
        // rotating by -center(i) brings wedge i under the pointer
        for n in 1..12 {
            for i in 0..n {
                let rotation = -wedge_center(i, n) - 3.0 * TAU;
                assert_eq!(index_under_pointer(rotation, n), i);
            }
        }
    }

    #[test]
    fn unrotated_wheel_has_first_wedge_under_pointer() {
        assert_eq!(index_under_pointer(0.0, 8), 0);
        // a small positive rotation moves the last wedge under the pointer
        assert_eq!(index_under_pointer(0.01, 8), 7);
    }

    #[test]
    fn single_segment_is_always_index_zero() {
        for k in -20..20 {
            assert_eq!(index_under_pointer(k as f64 * 0.37, 1), 0);
        }
    }

    #[test]
    fn screen_angle_mapping_matches_pointer_at_zero() {
        let rotation = 1.234;
        assert_eq!(
            index_at_screen_angle(0.0, rotation, 7),
            index_under_pointer(rotation, 7)
        );
        // a quarter turn clockwise on screen is a quarter of a 4-wedge wheel further on
        assert_eq!(index_at_screen_angle(PI / 2.0 + 0.1, 0.0, 4), 1);
    }
}
