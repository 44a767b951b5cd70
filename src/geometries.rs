use crate::intersect::{ GeoPoint, Intersectable };
use crate::ray::Ray;

/// A composite of intersectable objects.
///
/// Children may be primitive shapes or other `Geometries`. A query is
/// answered by asking every child in insertion order and concatenating what
/// they return; picking the closest point is left to the caller.
///
/// The collection only ever grows, and is meant to be built once before
/// rendering and then shared read-only between render workers.
#[derive(Default)]
pub struct Geometries {
    children: Vec<Box<dyn Intersectable>>,
}

impl std::fmt::Debug for Geometries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometries")
            .field("children", &self.children.len())
            .finish()
    }
}

impl Geometries {
    /// Creates an empty aggregate.
    pub fn new() -> Geometries {
        Default::default()
    }

    /// Creates an aggregate holding `children`, in order.
    pub fn with(children: Vec<Box<dyn Intersectable>>) -> Geometries {
        Geometries { children }
    }

    /// Adds a child.
    pub fn add<T: Intersectable + 'static>(&mut self, child: T) {
        self.children.push(Box::new(child));
    }

    /// Adds an already boxed child.
    pub fn add_boxed(&mut self, child: Box<dyn Intersectable>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Intersectable for Geometries {
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>> {
        let mut intersections = Vec::new();
        for child in self.children.iter() {
            let mut found = child.find_intersections(ray, max_distance);
            intersections.append(&mut found);
        }

        intersections
    }
}

#[cfg(test)]
fn three_spheres() -> Vec<crate::shape::Shape> {
    use crate::shape::Shape;
    use crate::vector::Point3D;

    vec![
        Shape::sphere(Point3D::new(0.0, 0.0, 0.0), 1.0).unwrap(),
        Shape::sphere(Point3D::new(0.0, 0.0, 5.0), 1.0).unwrap(),
        Shape::sphere(Point3D::new(0.0, 0.0, 10.0), 1.0).unwrap(),
    ]
}

#[cfg(test)]
fn points_of(xs: &[GeoPoint<'_>]) -> Vec<[u64; 3]> {
    let mut points: Vec<[u64; 3]> = xs.iter()
        .map(|gp| [gp.point.x.to_bits(), gp.point.y.to_bits(), gp.point.z.to_bits()])
        .collect();
    points.sort();
    points
}

#[test]
fn intersecting_ray_with_empty_aggregate() {
    use crate::vector::{ Point3D, Vector };

    let g = Geometries::new();
    let r = Ray::new(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0));

    assert!(g.is_empty());
    assert!(g.find_intersections(&r, f64::INFINITY).is_empty());
}

#[test]
fn intersecting_ray_with_nonempty_aggregate() {
    use crate::vector::{ Point3D, Vector };

    let mut g = Geometries::new();
    for s in three_spheres() {
        g.add(s);
    }

    let r = Ray::new(Point3D::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));
    let xs = g.find_intersections(&r, f64::INFINITY);

    assert_eq!(g.len(), 3);
    assert_eq!(xs.len(), 6);
}

#[test]
fn aggregate_respects_max_distance() {
    use crate::vector::{ Point3D, Vector };

    let mut g = Geometries::new();
    for s in three_spheres() {
        g.add(s);
    }

    // Only the first sphere is within reach.
    let r = Ray::new(Point3D::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));
    assert_eq!(g.find_intersections(&r, 7.0).len(), 2);
}

#[test]
fn aggregate_equals_union_of_any_partition() {
    use crate::vector::{ Point3D, Vector };

    let r = Ray::new(Point3D::new(0.0, 0.0, -5.0), Vector::new(0.0, 0.0, 1.0));

    let mut flat = Geometries::new();
    for s in three_spheres() {
        flat.add(s);
    }
    let expected = points_of(&flat.find_intersections(&r, f64::INFINITY));

    // Every way of splitting the children into two nested aggregates.
    for mask in 0..8u32 {
        let mut left = Geometries::new();
        let mut right = Geometries::new();
        for (i, s) in three_spheres().into_iter().enumerate() {
            if mask & (1 << i) != 0 {
                left.add(s);
            } else {
                right.add(s);
            }
        }

        let nested = Geometries::with(vec![Box::new(left), Box::new(right)]);
        let found = points_of(&nested.find_intersections(&r, f64::INFINITY));
        assert_eq!(found, expected);
    }
}
