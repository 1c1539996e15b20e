//! Deterministic interpolation capability for snapshot values.
//!
//! The interpolator is generic over any value that can supply its own lerp;
//! geometry decides the blend (linear for scalars and vectors, shortest-arc
//! spherical for orientations).

use nalgebra::{UnitQuaternion, Vector3};

/// A value the `SnapshotInterpolator` can blend between two samples.
pub trait Interpolate: Copy {
    /// Blend from `a` (t = 0) to `b` (t = 1). Must be deterministic.
    fn lerp(a: Self, b: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Interpolate for f32 {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t as f32
    }
}

impl Interpolate for Vector3<f64> {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a.lerp(&b, t)
    }
}

impl Interpolate for Vector3<f32> {
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a.lerp(&b, t as f32)
    }
}

impl Interpolate for UnitQuaternion<f64> {
    /// Shortest-arc slerp; falls back to the endpoint when the rotations are
    /// antipodal and no unique shortest arc exists.
    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a.try_slerp(&b, t, 1.0e-9).unwrap_or(b)
    }
}
