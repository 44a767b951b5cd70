use crate::ray::Ray;
use crate::shape::Shape;
use crate::vector::Point3D;

/// An intersection point, paired with the shape that produced it.
///
/// The shape reference is needed to look up the surface normal, emission and
/// material at the point while shading.
#[derive(Copy, Clone, Debug)]
pub struct GeoPoint<'a> {
    pub point: Point3D,
    pub geometry: &'a Shape,
}

/// Two `GeoPoint`s are equal if their points are equal and they refer to the
/// *same* shape (pointer equality).
impl<'a> PartialEq for GeoPoint<'a> {
    fn eq(&self, other: &GeoPoint<'a>) -> bool {
        self.point == other.point && std::ptr::eq(self.geometry, other.geometry)
    }
}

impl<'a> GeoPoint<'a> {
    pub fn new(point: Point3D, geometry: &'a Shape) -> GeoPoint<'a> {
        GeoPoint { point, geometry }
    }

    /// Whether every coordinate of the point is a finite number.
    pub fn is_finite(&self) -> bool {
        self.point.is_finite()
    }
}

/// Anything a ray can be intersected with.
///
/// An empty vector means the ray misses. Only points within `max_distance`
/// of the ray origin (and strictly in front of it) are returned. The order of
/// the returned points is not significant.
pub trait Intersectable: Send + Sync {
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>>;
}

/// Selects the point closest to the origin of `ray`.
///
/// Points with non-finite coordinates are ignored, so a degenerate
/// intersection result is treated as no intersection at all.
pub fn closest<'a>(ray: &Ray, points: Vec<GeoPoint<'a>>) -> Option<GeoPoint<'a>> {
    let origin = ray.origin();

    points.into_iter()
        .filter(|gp| gp.is_finite())
        .map(|gp| (gp.point.distance_squared(origin), gp))
        .min_by(|(a, _), (b, _)|
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        )
        .map(|(_, gp)| gp)
}

#[test]
fn closest_picks_nearest_point() {
    use crate::vector::Vector;

    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();
    let r = Ray::new(Point3D::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));

    let far = GeoPoint::new(Point3D::new(0.0, 0.0, 1.0), &s);
    let near = GeoPoint::new(Point3D::new(0.0, 0.0, -1.0), &s);

    assert_eq!(closest(&r, vec![far, near]), Some(near));
}

#[test]
fn closest_of_nothing_is_none() {
    use crate::vector::Vector;

    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0));

    assert_eq!(closest(&r, Vec::new()), None);
}

#[test]
fn closest_ignores_non_finite_points() {
    use crate::vector::Vector;

    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();
    let r = Ray::new(Point3D::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));

    let nan = GeoPoint::new(Point3D::new(f64::NAN, 0.0, 0.0), &s);
    assert_eq!(closest(&r, vec![nan]), None);

    let ok = GeoPoint::new(Point3D::new(0.0, 0.0, 1.0), &s);
    assert_eq!(closest(&r, vec![nan, ok]), Some(ok));
}
