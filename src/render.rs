use std::slice::ChunksMut;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::mpsc;
use std::sync::{ Arc, Mutex };
use std::thread;
use std::time::Instant;

use log::{ debug, info, trace, warn };

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::{ RenderConfig, Viewport };
use crate::consts::PROGRESS_STEP_PERCENT;
use crate::scene::Scene;
use crate::tracer::Tracer;
use crate::{ Error, Result };

/// Work handed to render workers.
///
/// A row is a mutable slice of the canvas; no two messages share one.
enum Message<'a> {
    Row(usize, &'a mut [Color]),
    Terminate,
}

/// Renders `scene` as seen from `camera` onto a new canvas.
///
/// Rows are the unit of work. With a single worker they are rendered on the
/// calling thread, otherwise they are handed to a fixed pool of
/// `config.worker_count` threads. The image is the same whatever the worker
/// count.
pub fn render(scene: &Scene, camera: &Camera, viewport: &Viewport,
    config: &RenderConfig) -> Result<Canvas> {
    let config = config.clone().validated()?;
    let viewport = viewport.validated()?;

    debug!(
        "rendering {:?}: {}x{} pixels, {} worker(s), {} sample(s) per axis",
        scene.name, viewport.width, viewport.height,
        config.worker_count, config.num_samples.max(1)
    );

    let start = Instant::now();
    let mut canvas = Canvas::new(viewport.width, viewport.height);

    let job = Job {
        scene,
        camera,
        viewport: &viewport,
        config: &config,
        progress: Progress::new(viewport.height, config.print_progress),
    };

    if config.worker_count == 1 {
        let mut tracer = Tracer::new(scene, &config);
        for (y, row) in canvas.rows_mut().enumerate() {
            job.render_row(&mut tracer, y, row);
        }
    } else {
        job.render_parallel(canvas.rows_mut())?;
    }

    info!("rendered {:?} in {:.2?}", scene.name, start.elapsed());

    Ok(canvas)
}

/// Computes the color of pixel (`x`, `y`).
///
/// The pixel's rays are traced with the full recursion budget and averaged
/// in the order the camera produced them. The tracer is reseeded from the
/// pixel index first, so the result does not depend on what the tracer
/// rendered before.
pub fn render_pixel(tracer: &mut Tracer<'_>, camera: &Camera, viewport: &Viewport,
    config: &RenderConfig, x: usize, y: usize) -> Color {
    tracer.reseed((y * viewport.width + x) as u64);

    let rays = camera.primary_rays(
        viewport.width, viewport.height, x, y,
        viewport.distance, viewport.screen_width, viewport.screen_height,
        config.num_samples,
    );

    let colors: Vec<Color> = rays.iter()
        .map(|ray| tracer.trace_ray(ray, config.max_recursion_depth, 1.0))
        .collect();

    Color::mean(&colors)
}

/// Counts finished rows and reports progress.
struct Progress {
    done: AtomicUsize,
    total: usize,
    step: usize,
    enabled: bool,
}

impl Progress {
    fn new(total: usize, enabled: bool) -> Progress {
        Progress {
            done: AtomicUsize::new(0),
            total,
            step: (total * PROGRESS_STEP_PERCENT / 100).max(1),
            enabled,
        }
    }

    fn row_done(&self, y: usize) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("row {} done", y);

        if self.enabled && (done % self.step == 0 || done == self.total) {
            info!("{}/{} rows ({}%)", done, self.total, done * 100 / self.total);
        }
    }
}

/// Everything a worker reads while rendering.
struct Job<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    viewport: &'a Viewport,
    config: &'a RenderConfig,
    progress: Progress,
}

impl<'a> Job<'a> {
    fn render_row(&self, tracer: &mut Tracer<'_>, y: usize, row: &mut [Color]) {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = render_pixel(tracer, self.camera, self.viewport, self.config, x, y);
        }

        self.progress.row_done(y);
    }

    /// Renders every row on a pool of scoped worker threads.
    fn render_parallel(&self, rows: ChunksMut<'_, Color>) -> Result<()> {
        let size = self.config.worker_count;
        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        thread::scope(|s| {
            let mut workers = Vec::with_capacity(size);
            for id in 0..size {
                let receiver = Arc::clone(&receiver);
                workers.push(s.spawn(move || self.work(id, receiver)));
            }

            // Once every worker is gone the channel closes and sends fail.
            drop(receiver);

            let mut result = Ok(());
            for (y, row) in rows.enumerate() {
                if sender.send(Message::Row(y, row)).is_err() {
                    result = Err(Error::WorkersDisconnected);
                    break;
                }
            }

            for _ in 0..size {
                if sender.send(Message::Terminate).is_err() {
                    break;
                }
            }

            for worker in workers {
                if worker.join().is_err() {
                    result = Err(Error::WorkerPanicked);
                }
            }

            result
        })
    }

    fn work(&self, id: usize, receiver: Arc<Mutex<mpsc::Receiver<Message<'_>>>>) {
        let mut tracer = Tracer::new(self.scene, self.config);

        loop {
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => {
                    warn!("worker {} exiting: row queue lock poisoned", id);
                    return;
                },
            };

            match message {
                Ok(Message::Row(y, row)) => self.render_row(&mut tracer, y, row),
                Ok(Message::Terminate) => break,
                Err(_) => {
                    warn!("worker {} exiting: row queue closed", id);
                    return;
                },
            }
        }
    }
}

#[cfg(test)]
mod fixtures {
    use super::*;
    use crate::light::{ AmbientLight, PointLight };
    use crate::material::Material;
    use crate::shape::Shape;
    use crate::vector::{ Point3D, Vector };

    pub const BACKGROUND: Color = Color { r: 0.1, g: 0.2, b: 0.3 };

    /// Looks down +z from the origin; screen rows grow towards -y.
    pub fn camera() -> Camera {
        Camera::new(
            Point3D::ZERO,
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(0.0, -1.0, 0.0),
        ).unwrap()
    }

    /// 5x5 pixels of size 40 at distance 100.
    pub fn viewport() -> Viewport {
        Viewport::new(5, 5, 100.0, 200.0, 200.0).unwrap()
    }

    /// A diffuse sphere of radius 50 centred 100 units in front of the camera.
    pub fn sphere_scene() -> Scene {
        let mut scene = Scene::new("sphere").with_background(BACKGROUND);
        scene.add_geometry(
            Shape::sphere(Point3D::new(0.0, 0.0, 100.0), 50.0).unwrap()
                .with_material(Material::phong(0.5, 0.0, 0.0).unwrap())
        );

        scene
    }

    pub fn lit_sphere() -> Scene {
        let mut scene = sphere_scene();
        scene.add_light(PointLight::unattenuated(
            Color::rgb(1.0, 0.8, 0.6), Point3D::new(0.0, 0.0, 10.0)
        ));

        scene
    }

    /// The sphere lit from above, behind an opaque triangle in the plane
    /// y = 50.
    pub fn shadowed_sphere() -> Scene {
        let mut scene = sphere_scene()
            .with_ambient_light(AmbientLight::new(Color::white(), 0.1));
        scene.add_geometry(
            Shape::triangle(
                Point3D::new(-30.0, 50.0, -30.0),
                Point3D::new(30.0, 50.0, -30.0),
                Point3D::new(0.0, 50.0, 30.0),
            ).unwrap()
        );
        scene.add_light(PointLight::unattenuated(
            Color::white(), Point3D::new(0.0, 100.0, -50.0)
        ));

        scene
    }

    /// A mixed scene exercising every secondary ray type.
    pub fn busy_scene() -> Scene {
        let mut scene = Scene::new("busy")
            .with_background(BACKGROUND)
            .with_ambient_light(AmbientLight::new(Color::white(), 0.05));

        scene.add_geometry(
            Shape::plane(Point3D::new(0.0, 60.0, 0.0), Vector::new(0.0, -1.0, 0.0))
                .unwrap()
                .with_material(
                    Material::new(0.4, 0.2, 20.0, 0.0, 0.5).unwrap()
                        .with_gloss_blur(0.2).unwrap()
                )
        );
        scene.add_geometry(
            Shape::sphere(Point3D::new(-30.0, 0.0, 120.0), 30.0).unwrap()
                .with_material(Material::new(0.3, 0.5, 50.0, 0.6, 0.2).unwrap())
                .with_emission(Color::rgb(0.1, 0.0, 0.0))
        );
        scene.add_geometry(
            Shape::sphere(Point3D::new(40.0, 10.0, 140.0), 25.0).unwrap()
                .with_material(Material::new(0.6, 0.3, 30.0, 0.0, 0.7).unwrap()
                    .with_gloss_blur(0.1).unwrap())
        );
        scene.add_light(PointLight::new(
            Color::gray(2.0), Point3D::new(0.0, -80.0, 40.0), 1.0, 0.001, 0.0001
        ).unwrap());

        scene
    }
}

#[test]
fn lit_sphere_center_pixel_is_light_times_kd() {
    let canvas = render(
        &fixtures::lit_sphere(), &fixtures::camera(),
        &fixtures::viewport(), &RenderConfig::default(),
    ).unwrap();

    assert_eq!(canvas.width(), 5);
    assert_eq!(canvas.height(), 5);
    assert_eq!(canvas.get(2, 2), Some(Color::rgb(0.5, 0.4, 0.3)));
}

#[test]
fn pixels_missing_the_sphere_are_background() {
    let canvas = render(
        &fixtures::lit_sphere(), &fixtures::camera(),
        &fixtures::viewport(), &RenderConfig::default(),
    ).unwrap();

    for &(x, y) in [(0, 0), (4, 0), (0, 4), (4, 4), (2, 0)].iter() {
        let pixel = canvas.get(x, y).unwrap();
        assert_eq!(pixel.bits(), fixtures::BACKGROUND.bits());
    }
}

#[test]
fn shadowed_sphere_gets_ambient_only() {
    let canvas = render(
        &fixtures::shadowed_sphere(), &fixtures::camera(),
        &fixtures::viewport(), &RenderConfig::default(),
    ).unwrap();

    assert_eq!(canvas.get(2, 2), Some(Color::gray(0.1)));
}

#[test]
fn facing_mirrors_render_a_finite_color() {
    use crate::material::Material;
    use crate::shape::Shape;
    use crate::vector::{ Point3D, Vector };

    let mut scene = Scene::new("mirrors");
    let mirror = Material::new(0.0, 0.0, 0.0, 0.0, 1.0).unwrap();
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0)).unwrap()
            .with_material(mirror)
            .with_emission(Color::gray(0.1))
    );
    scene.add_geometry(
        Shape::plane(Point3D::new(0.0, 0.0, 10.0), Vector::new(0.0, 0.0, -1.0))
            .unwrap()
            .with_material(mirror)
            .with_emission(Color::gray(0.1))
    );

    let camera = Camera::new(
        Point3D::new(0.0, 0.0, 5.0),
        Vector::new(0.0, 0.0, 1.0),
        Vector::new(0.0, -1.0, 0.0),
    ).unwrap();
    let viewport = Viewport::new(1, 1, 1.0, 1.0, 1.0).unwrap();
    let config = RenderConfig { max_recursion_depth: 5, ..Default::default() };

    let canvas = render(&scene, &camera, &viewport, &config).unwrap();
    let pixel = canvas.get(0, 0).unwrap();

    assert!(pixel.is_finite());
    assert_eq!(pixel, Color::gray(0.6));
}

#[test]
fn worker_count_does_not_change_the_image() {
    let scene = fixtures::busy_scene();
    let camera = fixtures::camera();
    let viewport = Viewport::new(12, 9, 100.0, 200.0, 150.0).unwrap();

    let single = RenderConfig {
        num_samples: 2,
        num_gloss_blur_rays: 4,
        seed: 17,
        ..Default::default()
    };
    let pooled = RenderConfig { worker_count: 4, ..single.clone() };

    let a = render(&scene, &camera, &viewport, &single).unwrap();
    let b = render(&scene, &camera, &viewport, &pooled).unwrap();

    assert_eq!(a.pixels().len(), b.pixels().len());
    for (pa, pb) in a.pixels().iter().zip(b.pixels().iter()) {
        assert_eq!(pa.bits(), pb.bits());
    }
}

#[test]
fn render_pixel_matches_rendered_canvas() {
    let scene = fixtures::busy_scene();
    let camera = fixtures::camera();
    let viewport = fixtures::viewport();
    let config = RenderConfig {
        num_samples: 3,
        num_gloss_blur_rays: 8,
        worker_count: 2,
        ..Default::default()
    };

    let canvas = render(&scene, &camera, &viewport, &config).unwrap();

    let mut tracer = Tracer::new(&scene, &config);
    for &(x, y) in [(4, 4), (0, 0), (2, 3)].iter() {
        let pixel = render_pixel(&mut tracer, &camera, &viewport, &config, x, y);
        assert_eq!(pixel.bits(), canvas.get(x, y).unwrap().bits());
    }
}

#[test]
fn progress_reporting_renders_every_row() {
    let config = RenderConfig {
        worker_count: 3,
        print_progress: true,
        ..Default::default()
    };

    let canvas = render(
        &fixtures::lit_sphere(), &fixtures::camera(), &fixtures::viewport(), &config,
    ).unwrap();

    assert_eq!(canvas.get(2, 2), Some(Color::rgb(0.5, 0.4, 0.3)));
    assert_eq!(canvas.get(0, 0), Some(fixtures::BACKGROUND));
}

#[test]
fn invalid_config_is_rejected_before_rendering() {
    let config = RenderConfig { worker_count: 0, ..Default::default() };

    match render(&fixtures::lit_sphere(), &fixtures::camera(),
        &fixtures::viewport(), &config) {
        Err(Error::InvalidConfig(_)) => (),
        other => panic!("expected an invalid config error, got {:?}", other),
    }
}

#[test]
fn panicking_worker_is_reported() {
    use crate::intersect::{ GeoPoint, Intersectable };
    use crate::ray::Ray;

    struct Exploding;

    impl Intersectable for Exploding {
        fn find_intersections(&self, _: &Ray, _: f64) -> Vec<GeoPoint<'_>> {
            panic!("intersection failed");
        }
    }

    let mut scene = Scene::new("exploding");
    scene.add_geometry(Exploding);
    let config = RenderConfig { worker_count: 2, ..Default::default() };

    match render(&scene, &fixtures::camera(), &fixtures::viewport(), &config) {
        Err(Error::WorkerPanicked) => (),
        other => panic!("expected a worker panic error, got {:?}", other),
    }
}
