//! Attenuation and panning math for the binding model.
//!
//! Pure functions: geometry in, audio parameters out. The per-frame driver in
//! [`binding`](crate::binding) feeds these with poses resolved from the scene
//! graph.

use crate::math::{Pose, Vec3};

/// Reference-distance rolloff.
///
/// `ref_distance / max(d, ref_distance)`: unity gain anywhere inside the
/// reference radius (no amplification near the source), inverse falloff
/// beyond it. Monotonically non-increasing in `distance`.
pub fn distance_attenuation(distance: f32, ref_distance: f32) -> f32 {
    ref_distance / distance.max(ref_distance)
}

/// Transforms a world position into the listener's coordinate frame
/// (x = right, y = up, z = forward).
pub fn world_to_listener_space(world_pos: Vec3, listener: &Pose) -> Vec3 {
    let relative = world_pos - listener.position;
    Vec3::new(
        relative.dot(listener.right()),
        relative.dot(listener.up()),
        relative.dot(listener.forward()),
    )
}

/// Stereo pan toward a source position: -1.0 full left, 0.0 center,
/// 1.0 full right. A source at (or numerically on top of) the listener
/// pans center.
pub fn pan_toward(source_pos: Vec3, listener: &Pose) -> f32 {
    let to_source = source_pos - listener.position;
    if to_source.length_squared() < 1e-3 {
        return 0.0;
    }
    to_source.normalize().dot(listener.right()).clamp(-1.0, 1.0)
}

/// Equal-power pan law: returns `(left_gain, right_gain)` for a pan in
/// [-1, 1]. Total power is constant across the sweep.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    let angle = ((pan + 1.0) / 2.0) * std::f32::consts::FRAC_PI_2;
    (angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn attenuation_is_unity_inside_reference_radius() {
        for d in [0.0, 1.0, 5.0, 19.9, 20.0] {
            assert_eq!(distance_attenuation(d, 20.0), 1.0);
        }
    }

    #[test]
    fn attenuation_is_monotonically_non_increasing_beyond_reference() {
        let ref_distance = 20.0;
        let mut previous = 1.0;
        for step in 0..200 {
            let d = ref_distance + step as f32 * 5.0;
            let a = distance_attenuation(d, ref_distance);
            assert!(a <= previous, "attenuation rose at d = {}", d);
            assert!(a <= 1.0);
            previous = a;
        }
    }

    #[test]
    fn attenuation_matches_inverse_law() {
        assert_eq!(distance_attenuation(40.0, 20.0), 0.5);
        assert_eq!(distance_attenuation(80.0, 20.0), 0.25);
        assert!((distance_attenuation(30.0, 20.0) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn pan_is_centered_for_coincident_source() {
        let listener = Pose::identity();
        assert_eq!(pan_toward(Vec3::ZERO, &listener), 0.0);
    }

    #[test]
    fn pan_follows_listener_right_axis() {
        let listener = Pose::identity();
        // Default listener faces -Z, right is +X.
        assert!((pan_toward(Vec3::new(10.0, 0.0, 0.0), &listener) - 1.0).abs() < 1e-6);
        assert!((pan_toward(Vec3::new(-10.0, 0.0, 0.0), &listener) + 1.0).abs() < 1e-6);
        assert!(pan_toward(Vec3::new(0.0, 0.0, -10.0), &listener).abs() < 1e-6);
    }

    #[test]
    fn pan_respects_listener_orientation() {
        // Turned 180 degrees: what was right is now left.
        let listener = Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        assert!((pan_toward(Vec3::new(10.0, 0.0, 0.0), &listener) + 1.0).abs() < 1e-5);
    }

    #[test]
    fn listener_space_projection() {
        let listener = Pose::from_position(Vec3::new(1.0, 0.0, 0.0));
        let local = world_to_listener_space(Vec3::new(1.0, 2.0, -3.0), &listener);
        assert!((local - Vec3::new(0.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn equal_power_pan_conserves_power() {
        for pan in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            let (left, right) = pan_gains(pan);
            assert!((left * left + right * right - 1.0).abs() < 1e-5);
        }

        let (left, right) = pan_gains(0.0);
        assert!((left - 0.707).abs() < 0.01);
        assert!((right - 0.707).abs() < 0.01);

        let (left, right) = pan_gains(-1.0);
        assert!((left - 1.0).abs() < 1e-5);
        assert!(right.abs() < 1e-5);
    }

    #[test]
    fn pan_gains_clamp_out_of_range_input() {
        assert_eq!(pan_gains(2.0), pan_gains(1.0));
        assert_eq!(pan_gains(-2.0), pan_gains(-1.0));
    }
}
