use crate::color::Color;
use crate::intersect::{ GeoPoint, Intersectable };
use crate::material::Material;
use crate::ray::Ray;
use crate::vector::{ Point3D, Vector, align_zero, is_zero, try_normalize };
use crate::{ Error, Result };

/// Precomputed data for a triangle.
///
/// `e1` and `e2` are the edges from `p1`, used by the Möller–Trumbore test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Point3D,
    pub p2: Point3D,
    pub p3: Point3D,
    pub e1: Vector,
    pub e2: Vector,
    pub normal: Vector,
}

impl TriangleInfo {
    pub fn new(p1: Point3D, p2: Point3D, p3: Point3D) -> Result<TriangleInfo> {
        let e1 = p2 - p1;
        let e2 = p3 - p1;

        let normal = e1.cross(e2).try_normalize().ok_or_else(||
            Error::DegenerateGeometry("triangle has zero area".into())
        )?;

        Ok(TriangleInfo { p1, p2, p3, e1, e2, normal })
    }
}

/// Precomputed data for a convex, planar polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonInfo {
    pub vertices: Vec<Point3D>,
    pub normal: Vector,
}

impl PolygonInfo {
    /// Builds a polygon from vertices given in edge order.
    ///
    /// Fails on fewer than three vertices, collinear leading vertices, and
    /// polygons that are not planar or not convex.
    pub fn new(vertices: Vec<Point3D>) -> Result<PolygonInfo> {
        if vertices.len() < 3 {
            return Err(Error::DegenerateGeometry(
                format!("polygon needs at least 3 vertices, got {}", vertices.len())
            ));
        }

        let normal = (vertices[1] - vertices[0])
            .cross(vertices[2] - vertices[0])
            .try_normalize()
            .ok_or_else(|| Error::DegenerateGeometry(
                "polygon's first three vertices are collinear".into()
            ))?;

        let n = vertices.len();
        for i in 0..n {
            let v = vertices[i];
            if !is_zero((v - vertices[0]).dot(normal)) {
                return Err(Error::DegenerateGeometry(
                    "polygon vertices are not coplanar".into()
                ));
            }

            // Consecutive edges must always turn the same way as the normal.
            let edge = vertices[(i + 1) % n] - v;
            let next = vertices[(i + 2) % n] - vertices[(i + 1) % n];
            if align_zero(edge.cross(next).dot(normal)) <= 0.0 {
                return Err(Error::DegenerateGeometry(
                    "polygon is not convex".into()
                ));
            }
        }

        Ok(PolygonInfo { vertices, normal })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A sphere with a center and a positive radius.
    Sphere { center: Point3D, radius: f64 },

    /// An infinite plane through a point, with a unit normal.
    Plane { point: Point3D, normal: Vector },

    /// A triangle. See TriangleInfo for further explanation.
    Triangle(TriangleInfo),

    /// A convex planar polygon. See PolygonInfo for further explanation.
    Polygon(PolygonInfo),
}

/// A primitive shape.
///
/// Shapes carry their own emission color and material; both are read by the
/// tracer through the `GeoPoint`s a shape returns.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub emission: Color,
    pub material: Material,
}

impl Shape {
    fn with_type(ty: ShapeType) -> Shape {
        Shape { ty, emission: Color::black(), material: Default::default() }
    }

    /// Creates a sphere. The radius must be positive.
    pub fn sphere(center: Point3D, radius: f64) -> Result<Shape> {
        if !(radius > 0.0) || is_zero(radius) {
            return Err(Error::DegenerateGeometry(
                format!("sphere radius must be positive, got {}", radius)
            ));
        }

        Ok(Shape::with_type(ShapeType::Sphere { center, radius }))
    }

    /// Creates a plane through `point` with the given normal.
    pub fn plane(point: Point3D, normal: Vector) -> Result<Shape> {
        let normal = try_normalize(normal, "plane normal")?;
        Ok(Shape::with_type(ShapeType::Plane { point, normal }))
    }

    /// Creates a triangle, defined by three points in space.
    pub fn triangle(p1: Point3D, p2: Point3D, p3: Point3D) -> Result<Shape> {
        Ok(Shape::with_type(ShapeType::Triangle(TriangleInfo::new(p1, p2, p3)?)))
    }

    /// Creates a convex polygon from its vertices, in edge order.
    pub fn polygon(vertices: Vec<Point3D>) -> Result<Shape> {
        Ok(Shape::with_type(ShapeType::Polygon(PolygonInfo::new(vertices)?)))
    }

    pub fn with_emission(mut self, emission: Color) -> Shape {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// The outward unit normal at a point on the shape.
    pub fn normal_at(&self, at: Point3D) -> Vector {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            ShapeType::Plane { normal, .. } => normal,
            ShapeType::Triangle(ref ti) => ti.normal,
            ShapeType::Polygon(ref pi) => pi.normal,
        }
    }

    /// Collects the parameters `ts` that are in range into `GeoPoint`s.
    fn points_at(&self, ray: &Ray, ts: &[f64], max_distance: f64)
        -> Vec<GeoPoint<'_>> {
        ts.iter()
            .map(|&t| align_zero(t))
            .filter(|&t| t > 0.0 && align_zero(t - max_distance) <= 0.0)
            .map(|t| GeoPoint::new(ray.point_at(t), self))
            .collect()
    }

    fn intersect_sphere(&self, ray: &Ray, center: Point3D, radius: f64,
        max_distance: f64) -> Vec<GeoPoint<'_>> {
        let to_center = center - ray.origin();

        // A ray starting at the center leaves through exactly one point.
        if to_center == Vector::ZERO {
            return self.points_at(ray, &[radius], max_distance);
        }

        let tm = align_zero(ray.direction().dot(to_center));
        let d2 = to_center.length_squared() - tm * tm;
        let th2 = align_zero(radius * radius - d2);

        // A tangent ray or a miss.
        if th2 <= 0.0 {
            return Vec::new();
        }

        let th = th2.sqrt();
        self.points_at(ray, &[tm - th, tm + th], max_distance)
    }

    /// Intersects a ray with the plane through `point` with `normal`.
    fn plane_t(ray: &Ray, point: Point3D, normal: Vector) -> Option<f64> {
        let denominator = align_zero(normal.dot(ray.direction()));

        // Parallel to the plane.
        if denominator == 0.0 {
            return None;
        }

        let to_plane = point - ray.origin();
        if to_plane == Vector::ZERO {
            return None;
        }

        Some(normal.dot(to_plane) / denominator)
    }

    fn intersect_triangle(&self, ray: &Ray, ti: &TriangleInfo,
        max_distance: f64) -> Vec<GeoPoint<'_>> {
        let dir_cross_e2 = ray.direction().cross(ti.e2);
        let determinant = ti.e1.dot(dir_cross_e2);

        // If the ray is parallel to the triangle, return no intersections.
        if is_zero(determinant) {
            return Vec::new();
        }

        let f = 1.0 / determinant;
        let p1_to_origin = ray.origin() - ti.p1;
        let u = align_zero(f * p1_to_origin.dot(dir_cross_e2));
        if u <= 0.0 {
            return Vec::new();
        }

        let origin_cross_e1 = p1_to_origin.cross(ti.e1);
        let v = align_zero(f * ray.direction().dot(origin_cross_e1));
        if v <= 0.0 || align_zero(u + v - 1.0) >= 0.0 {
            return Vec::new();
        }

        let t = f * ti.e2.dot(origin_cross_e1);
        self.points_at(ray, &[t], max_distance)
    }

    fn intersect_polygon(&self, ray: &Ray, pi: &PolygonInfo,
        max_distance: f64) -> Vec<GeoPoint<'_>> {
        let t = match Shape::plane_t(ray, pi.vertices[0], pi.normal) {
            Some(t) => t,
            None => return Vec::new(),
        };

        let p = ray.point_at(t);
        let n = pi.vertices.len();

        // The point is inside if it lies strictly to the left of every edge.
        let inside = (0..n).all(|i| {
            let v = pi.vertices[i];
            let edge = pi.vertices[(i + 1) % n] - v;
            align_zero(edge.cross(p - v).dot(pi.normal)) > 0.0
        });

        if !inside {
            return Vec::new();
        }

        self.points_at(ray, &[t], max_distance)
    }
}

impl Intersectable for Shape {
    fn find_intersections(&self, ray: &Ray, max_distance: f64) -> Vec<GeoPoint<'_>> {
        match self.ty {
            ShapeType::Sphere { center, radius }
                => self.intersect_sphere(ray, center, radius, max_distance),
            ShapeType::Plane { point, normal } => {
                match Shape::plane_t(ray, point, normal) {
                    Some(t) => self.points_at(ray, &[t], max_distance),
                    None => Vec::new(),
                }
            },
            ShapeType::Triangle(ref ti)
                => self.intersect_triangle(ray, ti, max_distance),
            ShapeType::Polygon(ref pi)
                => self.intersect_polygon(ray, pi, max_distance),
        }
    }
}

#[cfg(test)]
fn z_ray(x: f64, y: f64, z: f64) -> Ray {
    Ray::new(Point3D::new(x, y, z), Vector::new(0.0, 0.0, 1.0))
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();
    let xs = s.find_intersections(&z_ray(0.0, 0.0, -5.0), f64::INFINITY);

    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0].point, Point3D::new(0.0, 0.0, -1.0));
    assert_eq!(xs[1].point, Point3D::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_is_tangent_to_sphere() {
    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();

    assert!(s.find_intersections(&z_ray(0.0, 1.0, -5.0), f64::INFINITY)
        .is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();
    let xs = s.find_intersections(&z_ray(0.0, 0.0, 0.5), f64::INFINITY);

    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_from_sphere_center() {
    let s = Shape::sphere(Point3D::ZERO, 2.0).unwrap();
    let xs = s.find_intersections(&z_ray(0.0, 0.0, 0.0), f64::INFINITY);

    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::new(0.0, 0.0, 2.0));
}

#[test]
fn sphere_is_behind_ray() {
    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();

    assert!(s.find_intersections(&z_ray(0.0, 0.0, 5.0), f64::INFINITY)
        .is_empty());
}

#[test]
fn max_distance_limits_sphere_hits() {
    let s = Shape::sphere(Point3D::ZERO, 1.0).unwrap();
    let xs = s.find_intersections(&z_ray(0.0, 0.0, -5.0), 5.0);

    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::new(0.0, 0.0, -1.0));
    assert!(s.find_intersections(&z_ray(0.0, 0.0, -5.0), 3.0).is_empty());
}

#[test]
fn degenerate_sphere_is_rejected() {
    assert!(Shape::sphere(Point3D::ZERO, 0.0).is_err());
    assert!(Shape::sphere(Point3D::ZERO, -1.0).is_err());
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Shape::sphere(Point3D::new(1.0, 1.0, 1.0), 1.0).unwrap();
    let k = 3.0f64.sqrt() / 3.0;
    let n = s.normal_at(Point3D::new(1.0 + k, 1.0 + k, 1.0 + k));

    assert!(crate::feq(n.x, k) && crate::feq(n.y, k) && crate::feq(n.z, k));
}

#[test]
fn ray_intersecting_plane_from_above() {
    let p = Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap();
    let r = Ray::new(Point3D::new(0.0, 1.0, 0.0), Vector::new(0.0, -1.0, 0.0));

    let xs = p.find_intersections(&r, f64::INFINITY);
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::ZERO);
}

#[test]
fn ray_parallel_to_plane() {
    let p = Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap();
    let r = Ray::new(Point3D::new(0.0, 1.0, 0.0), Vector::new(0.0, 0.0, 1.0));

    assert!(p.find_intersections(&r, f64::INFINITY).is_empty());
}

#[test]
fn zero_plane_normal_is_rejected() {
    assert!(Shape::plane(Point3D::ZERO, Vector::ZERO).is_err());
}

#[test]
fn a_ray_strikes_a_triangle() {
    let t = Shape::triangle(
        Point3D::new(0.0, 1.0, 0.0),
        Point3D::new(-1.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    let xs = t.find_intersections(&z_ray(0.0, 0.5, -2.0), f64::INFINITY);
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::new(0.0, 0.5, 0.0));
}

#[test]
fn a_ray_misses_the_triangle_edges() {
    let t = Shape::triangle(
        Point3D::new(0.0, 1.0, 0.0),
        Point3D::new(-1.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
    ).unwrap();

    assert!(t.find_intersections(&z_ray(1.0, 1.0, -2.0), f64::INFINITY).is_empty());
    assert!(t.find_intersections(&z_ray(-1.0, 1.0, -2.0), f64::INFINITY).is_empty());
    assert!(t.find_intersections(&z_ray(0.0, -1.0, -2.0), f64::INFINITY).is_empty());
}

#[test]
fn zero_area_triangle_is_rejected() {
    let t = Shape::triangle(
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 1.0, 1.0),
        Point3D::new(2.0, 2.0, 2.0),
    );

    assert!(t.is_err());
}

#[test]
fn ray_strikes_a_square_polygon() {
    let square = Shape::polygon(vec![
        Point3D::new(-1.0, -1.0, 0.0),
        Point3D::new(1.0, -1.0, 0.0),
        Point3D::new(1.0, 1.0, 0.0),
        Point3D::new(-1.0, 1.0, 0.0),
    ]).unwrap();

    let xs = square.find_intersections(&z_ray(0.5, 0.5, -3.0), f64::INFINITY);
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].point, Point3D::new(0.5, 0.5, 0.0));

    assert!(square.find_intersections(&z_ray(1.5, 0.5, -3.0), f64::INFINITY)
        .is_empty());
}

#[test]
fn invalid_polygons_are_rejected() {
    // Too few vertices.
    assert!(Shape::polygon(vec![Point3D::ZERO, Point3D::X]).is_err());

    // Not planar.
    assert!(Shape::polygon(vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(1.0, 0.0, 0.0),
        Point3D::new(1.0, 1.0, 0.0),
        Point3D::new(0.0, 1.0, 1.0),
    ]).is_err());

    // Not convex.
    assert!(Shape::polygon(vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(2.0, 0.0, 0.0),
        Point3D::new(1.0, 0.5, 0.0),
        Point3D::new(2.0, 2.0, 0.0),
        Point3D::new(0.0, 2.0, 0.0),
    ]).is_err());
}
