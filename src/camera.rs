use crate::ray::Ray;
use crate::vector::{ Point3D, Vector, is_zero, try_normalize };
use crate::{ Error, Result };

/// A pinhole camera.
///
/// The camera sits at `position` and looks along `towards`. Together with
/// `up` and `right` (computed as `towards × up`) this forms an orthonormal
/// basis, fixed for the lifetime of the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    position: Point3D,
    towards: Vector,
    up: Vector,
    right: Vector,
}

impl Camera {
    /// Creates a camera.
    ///
    /// Fails if `towards` and `up` are not orthogonal, or if either has no
    /// length.
    pub fn new(position: Point3D, towards: Vector, up: Vector) -> Result<Camera> {
        let dot = towards.dot(up);
        if !is_zero(dot) {
            return Err(Error::NonOrthogonalCamera { dot });
        }

        let towards = try_normalize(towards, "camera towards")?;
        let up = try_normalize(up, "camera up")?;
        let right = towards.cross(up);

        Ok(Camera { position, towards, up, right })
    }

    pub fn position(&self) -> Point3D {
        self.position
    }

    pub fn towards(&self) -> Vector {
        self.towards
    }

    pub fn up(&self) -> Vector {
        self.up
    }

    pub fn right(&self) -> Vector {
        self.right
    }

    /// The ray through a point on the screen, given its offsets from the
    /// screen center along `right` and (downwards) along `up`.
    fn ray_through(&self, screen_distance: f64, x: f64, y: f64) -> Ray {
        let mut pij = self.position + self.towards * screen_distance;

        // Skip zero offsets rather than adding a scaled-by-zero vector.
        if !is_zero(x) {
            pij += self.right * x;
        }
        if !is_zero(y) {
            pij += self.up * -y;
        }

        Ray::new(self.position, pij - self.position)
    }

    /// Constructs the ray through the center of pixel (`col`, `row`).
    ///
    /// The screen is `screen_width` by `screen_height`, sits `screen_distance`
    /// in front of the camera, and is divided into `nx` by `ny` pixels. Rows
    /// grow downwards, columns grow to the right.
    #[allow(clippy::too_many_arguments)]
    pub fn primary_ray(&self, nx: usize, ny: usize, col: usize, row: usize,
        screen_distance: f64, screen_width: f64, screen_height: f64) -> Ray {
        let rx = screen_width / nx as f64;
        let ry = screen_height / ny as f64;

        let xj = (col as f64 - nx as f64 / 2.0) * rx + rx / 2.0;
        let yi = (row as f64 - ny as f64 / 2.0) * ry + ry / 2.0;

        self.ray_through(screen_distance, xj, yi)
    }

    /// Constructs a beam of rays through pixel (`col`, `row`).
    ///
    /// The pixel is split into a `num_samples` by `num_samples` grid, and one
    /// ray goes through the center of each cell, row by row. With
    /// `num_samples <= 1` this is exactly `primary_ray`.
    #[allow(clippy::too_many_arguments)]
    pub fn primary_rays(&self, nx: usize, ny: usize, col: usize, row: usize,
        screen_distance: f64, screen_width: f64, screen_height: f64,
        num_samples: usize) -> Vec<Ray> {
        if num_samples <= 1 {
            return vec![self.primary_ray(nx, ny, col, row,
                screen_distance, screen_width, screen_height)];
        }

        let rx = screen_width / nx as f64;
        let ry = screen_height / ny as f64;

        // The pixel's top-left corner.
        let x0 = (col as f64 - nx as f64 / 2.0) * rx;
        let y0 = (row as f64 - ny as f64 / 2.0) * ry;

        let sx = rx / num_samples as f64;
        let sy = ry / num_samples as f64;

        let mut rays = Vec::with_capacity(num_samples * num_samples);
        for i in 0..num_samples {
            for j in 0..num_samples {
                let x = x0 + j as f64 * sx + sx / 2.0;
                let y = y0 + i as f64 * sy + sy / 2.0;
                rays.push(self.ray_through(screen_distance, x, y));
            }
        }

        rays
    }
}

#[cfg(test)]
fn forward_camera() -> Camera {
    Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, 1.0),
        Vector::new(0.0, -1.0, 0.0),
    ).unwrap()
}

#[test]
fn camera_basis_is_orthonormal() {
    let c = Camera::new(
        Point3D::new(1.0, 2.0, 3.0),
        Vector::new(0.0, 3.0, 4.0),
        Vector::new(0.0, -4.0, 3.0),
    ).unwrap();

    assert!(crate::feq(c.right().length(), 1.0));
    assert!(crate::feq(c.right().dot(c.up()), 0.0));
    assert!(crate::feq(c.right().dot(c.towards()), 0.0));
    assert!(crate::feq(c.up().length(), 1.0));
    assert!(crate::feq(c.towards().length(), 1.0));
}

#[test]
fn non_orthogonal_camera_is_rejected() {
    let c = Camera::new(
        Point3D::ZERO,
        Vector::new(0.0, 0.0, 1.0),
        Vector::new(0.0, 1.0, 1.0),
    );

    match c {
        Err(Error::NonOrthogonalCamera { dot }) => assert_eq!(dot, 1.0),
        other => panic!("expected a non-orthogonal camera error, got {:?}", other),
    }
}

#[test]
fn zero_length_camera_vector_is_rejected() {
    let c = Camera::new(Point3D::ZERO, Vector::ZERO, Vector::new(0.0, 1.0, 0.0));

    assert!(c.is_err());
}

#[test]
fn ray_through_center_of_odd_screen() {
    let c = forward_camera();
    let r = c.primary_ray(3, 3, 1, 1, 1.0, 3.0, 3.0);

    assert_eq!(r.origin(), Point3D::ZERO);
    assert_eq!(r.direction(), Vector::new(0.0, 0.0, 1.0));
}

#[test]
fn ray_through_corner_pixels() {
    let c = forward_camera();

    // 3x3 pixels of size 2 on a screen at distance 10. Up is -y, so the
    // top row is on the negative y side.
    let top_left = c.primary_ray(3, 3, 0, 0, 10.0, 6.0, 6.0);
    let expected = Vector::new(-2.0, -2.0, 10.0).normalize();
    assert!((top_left.direction() - expected).length() < 1e-12);

    let side = c.primary_ray(3, 3, 2, 1, 10.0, 6.0, 6.0);
    let expected = Vector::new(2.0, 0.0, 10.0).normalize();
    assert!((side.direction() - expected).length() < 1e-12);
}

#[test]
fn single_sample_beam_equals_primary_ray() {
    let c = forward_camera();

    for &n in [0usize, 1].iter() {
        let beam = c.primary_rays(4, 4, 1, 2, 100.0, 400.0, 400.0, n);
        let single = c.primary_ray(4, 4, 1, 2, 100.0, 400.0, 400.0);

        assert_eq!(beam.len(), 1);
        assert_eq!(beam[0].origin(), single.origin());
        assert_eq!(beam[0].direction(), single.direction());
    }
}

#[test]
fn beam_has_n_squared_rays_centered_on_the_pixel() {
    let c = forward_camera();
    let single = c.primary_ray(5, 5, 3, 1, 100.0, 50.0, 50.0);

    for &n in [2usize, 3, 4].iter() {
        let beam = c.primary_rays(5, 5, 3, 1, 100.0, 50.0, 50.0, n);
        assert_eq!(beam.len(), n * n);

        let mean = beam.iter()
            .fold(Vector::ZERO, |acc, r| acc + r.direction())
            .normalize();
        assert!(mean.dot(single.direction()) > 0.9999);
    }
}
