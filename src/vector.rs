//! Point and vector types.
//!
//! Points and vectors are both `glam::DVec3`; the aliases only document
//! intent at call sites.

use glam::DVec3;

use crate::consts::ZERO_EPSILON;

pub type Point3D = DVec3;
pub type Vector = DVec3;

/// Checks whether a number is close enough to zero to be treated as zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() < ZERO_EPSILON
}

/// Snaps values that are within `ZERO_EPSILON` of zero to exactly zero.
pub fn align_zero(value: f64) -> f64 {
    if is_zero(value) { 0.0 } else { value }
}

/// Reflects a vector across a normal.
pub fn reflect(v: Vector, normal: Vector) -> Vector {
    v - normal * (2.0 * v.dot(normal))
}

/// Normalizes a vector, failing if it has no length.
pub fn try_normalize(v: Vector, what: &'static str) -> crate::Result<Vector> {
    v.try_normalize().ok_or(crate::Error::ZeroLengthVector(what))
}

#[test]
fn align_zero_snaps_small_values() {
    assert_eq!(align_zero(1e-12), 0.0);
    assert_eq!(align_zero(-1e-12), 0.0);
    assert_eq!(align_zero(0.5), 0.5);
}

#[test]
fn reflect_45() {
    let v = Vector::new(1.0, -1.0, 0.0);
    let n = Vector::new(0.0, 1.0, 0.0);

    assert_eq!(reflect(v, n), Vector::new(1.0, 1.0, 0.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Vector::new(0.0, -1.0, 0.0);
    let n = Vector::new(2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0, 0.0);
    let r = reflect(v, n);

    assert!(crate::feq(r.x, 1.0));
    assert!(crate::feq(r.y, 0.0));
    assert!(crate::feq(r.z, 0.0));
}

#[test]
fn zero_vector_cannot_be_normalized() {
    assert!(try_normalize(Vector::ZERO, "test").is_err());
    assert!(try_normalize(Vector::X * 3.0, "test").is_ok());
}
