//! Spherical coordinates for orbit camera placement
//!
//! `phi` is the polar angle measured from the +Y axis, `theta` the
//! azimuth around it. The orbit controller keeps the camera offset from
//! its target in this representation so angular constraints clamp
//! directly.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Keeps `phi` off the exact poles where look-at degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Spherical coordinates relative to an orbit target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spherical {
    /// Distance from the target.
    pub radius: f32,
    /// Polar angle from the +Y axis, in `[0, π]`.
    pub phi: f32,
    /// Azimuth angle around the +Y axis.
    pub theta: f32,
}

impl Spherical {
    /// Recompute the coordinates from a cartesian offset.
    pub fn set_from_vec3(&mut self, v: Vec3) {
        self.radius = v.length();
        if self.radius == 0.0 {
            self.theta = 0.0;
            self.phi = 0.0;
        } else {
            self.theta = v.x.atan2(v.z);
            self.phi = (v.y / self.radius).clamp(-1.0, 1.0).acos();
        }
    }

    /// Convert back to a cartesian offset.
    pub fn to_vec3(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.radius * self.phi.cos(),
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Pull `phi` away from the poles to avoid the gimbal singularity.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(POLE_EPSILON, PI - POLE_EPSILON);
    }
}

/// Wrap an angle into `(-π, π]`.
fn wrap_angle(angle: f32) -> f32 {
    if angle < -PI {
        angle + TAU
    } else if angle > PI {
        angle - TAU
    } else {
        angle
    }
}

/// Clamp an azimuth into a possibly seam-wrapping `[min, max]` range.
///
/// Both bounds and the value are normalized into `(-π, π]` first. A range
/// with `min > max` wraps across the ±π seam; values outside it snap to
/// whichever bound is nearer, decided by the bound midpoint.
pub fn clamp_azimuth(theta: f32, min: f32, max: f32) -> f32 {
    if !(min.is_finite() && max.is_finite()) {
        return theta;
    }

    let min = wrap_angle(min);
    let max = wrap_angle(max);
    let theta = wrap_angle(theta);

    if min <= max {
        theta.clamp(min, max)
    } else if theta > (min + max) / 2.0 {
        theta.max(min)
    } else {
        theta.min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_roundtrip() {
        let mut s = Spherical::default();
        let v = Vec3::new(3.0, 4.0, 5.0);
        s.set_from_vec3(v);
        assert!((s.to_vec3() - v).length() < 1e-5);
    }

    #[test]
    fn test_zero_offset() {
        let mut s = Spherical::default();
        s.set_from_vec3(Vec3::ZERO);
        assert_eq!(s.radius, 0.0);
        assert_eq!(s.theta, 0.0);
        assert_eq!(s.phi, 0.0);
    }

    #[test]
    fn test_make_safe_clamps_poles() {
        let mut s = Spherical {
            radius: 1.0,
            phi: 0.0,
            theta: 0.0,
        };
        s.make_safe();
        assert!(s.phi > 0.0);

        s.phi = PI;
        s.make_safe();
        assert!(s.phi < PI);
    }

    #[test]
    fn test_clamp_azimuth_simple_range() {
        let min = -FRAC_PI_2;
        let max = FRAC_PI_2;
        assert_eq!(clamp_azimuth(0.3, min, max), 0.3);
        assert_eq!(clamp_azimuth(2.0, min, max), max);
        assert_eq!(clamp_azimuth(-2.0, min, max), min);
    }

    #[test]
    fn test_clamp_azimuth_unbounded() {
        assert_eq!(clamp_azimuth(5.0, f32::NEG_INFINITY, f32::INFINITY), 5.0);
    }

    #[test]
    fn test_clamp_azimuth_wrapped_range() {
        // Allowed wedge runs from 170° through ±180° to -170°.
        let min = 170f32.to_radians();
        let max = (-170f32).to_radians();

        // Inside the wedge: untouched.
        let inside = 175f32.to_radians();
        assert!((clamp_azimuth(inside, min, max) - inside).abs() < 1e-6);
        let inside = (-175f32).to_radians();
        assert!((clamp_azimuth(inside, min, max) - inside).abs() < 1e-6);

        // Outside: snaps to the nearer bound.
        assert_eq!(clamp_azimuth(100f32.to_radians(), min, max), min);
        assert_eq!(clamp_azimuth((-100f32).to_radians(), min, max), max);
    }
}
