use crate::consts::DELTA;
use crate::vector::{ Point3D, Vector };

/// A ray with an origin and a unit-length direction.
///
/// The same type is used for primary rays from the camera and for secondary
/// rays (shadow, reflection and refraction) spawned while shading.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    origin: Point3D,
    direction: Vector,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3D, direction: Vector) -> Ray {
        Ray { origin, direction: direction.normalize() }
    }

    /// Creates a secondary ray leaving a surface.
    ///
    /// The origin is pushed `DELTA` along the normal, towards the side of the
    /// surface that `direction` points to, so the ray does not hit the
    /// surface it starts on.
    pub fn offset(point: Point3D, direction: Vector, normal: Vector) -> Ray {
        let nd = normal.dot(direction);
        let delta = normal * if nd > 0.0 { DELTA } else { -DELTA };

        Ray::new(point + delta, direction)
    }

    pub fn origin(&self) -> Point3D {
        self.origin
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    pub fn point_at(&self, t: f64) -> Point3D {
        self.origin + self.direction * t
    }
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 5.0));

    assert_eq!(r.direction(), Vector::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_point_at() {
    let r = Ray::new(
        Point3D::new(2.0, 3.0, 4.0),
        Vector::new(1.0, 0.0, 0.0),
    );

    assert_eq!(r.point_at(0.0), Point3D::new(2.0, 3.0, 4.0));
    assert_eq!(r.point_at(1.0), Point3D::new(3.0, 3.0, 4.0));
    assert_eq!(r.point_at(-1.0), Point3D::new(1.0, 3.0, 4.0));
    assert_eq!(r.point_at(2.5), Point3D::new(4.5, 3.0, 4.0));
}

#[test]
fn offset_ray_moves_towards_direction_side() {
    let n = Vector::new(0.0, 0.0, -1.0);

    let out = Ray::offset(Point3D::ZERO, Vector::new(0.0, 0.0, -1.0), n);
    assert_eq!(out.origin(), Point3D::new(0.0, 0.0, -DELTA));

    let through = Ray::offset(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0), n);
    assert_eq!(through.origin(), Point3D::new(0.0, 0.0, DELTA));
}
