//! The recursive shading core.
//!
//! A `Tracer` follows one ray into the scene, lights the closest hit, and
//! recurses along reflected and transmitted rays until the depth budget is
//! spent or the path's weight becomes negligible.

use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };

use crate::color::Color;
use crate::config::RenderConfig;
use crate::intersect::{ GeoPoint, Intersectable, closest };
use crate::light::Light;
use crate::material::Material;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::vector::{ Point3D, Vector, align_zero, reflect };

/// Traces rays through a scene.
///
/// A tracer borrows the scene and configuration and owns the random number
/// generator used for glossy reflections. It is cheap to create; each render
/// worker uses its own.
pub struct Tracer<'a> {
    scene: &'a Scene,
    config: &'a RenderConfig,
    rng: StdRng,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, config: &'a RenderConfig) -> Tracer<'a> {
        Tracer { scene, config, rng: StdRng::seed_from_u64(config.seed) }
    }

    /// Restarts the jitter sequence for an independent unit of work.
    ///
    /// Reseeding with the same `stream` always yields the same sequence, so
    /// a pixel's color does not depend on which worker rendered it.
    pub fn reseed(&mut self, stream: u64) {
        let seed = self.config.seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Finds the hit closest to the origin of `ray`.
    pub fn find_closest(&self, ray: &Ray) -> Option<GeoPoint<'a>> {
        let geometries = self.scene.geometries();
        closest(ray, geometries.find_intersections(ray, f64::INFINITY))
    }

    /// Computes the color seen along `ray`.
    ///
    /// `depth` is the number of further reflection/refraction levels that may
    /// be spawned, and `k` is the accumulated weight of the path so far.
    /// Rays that escape the scene return the background color.
    pub fn trace_ray(&mut self, ray: &Ray, depth: usize, k: f64) -> Color {
        if !self.contributes(k) {
            return Color::black();
        }

        match self.find_closest(ray) {
            None => self.scene.background(),
            Some(gp) => self.calc_color(&gp, ray, depth, k),
        }
    }

    fn contributes(&self, k: f64) -> bool {
        k > self.config.min_contribution
    }

    fn calc_color(&mut self, gp: &GeoPoint<'a>, ray: &Ray, depth: usize, k: f64)
        -> Color {
        let shape = gp.geometry;
        let material = shape.material;

        let n = shape.normal_at(gp.point);
        if !n.is_finite() {
            return self.scene.background();
        }

        let mut color = shape.emission
            + self.scene.ambient_intensity() * material.ka;

        // A ray grazing the surface sees neither its lit side nor anything
        // reflected in it.
        let v = ray.direction();
        let nv = align_zero(n.dot(v));
        if nv == 0.0 {
            return color;
        }

        color += self.local_effects(gp.point, n, v, nv, &material, k);

        if depth > 0 {
            color += self.global_effects(gp.point, n, v, &material, depth, k);
        }

        color
    }

    /// Diffuse and specular light from every light source that reaches `p`.
    fn local_effects(&self, p: Point3D, n: Vector, v: Vector, nv: f64,
        material: &Material, k: f64) -> Color {
        let mut color = Color::black();

        for light in self.scene.lights() {
            let l = match light.direction_from(p) {
                Some(l) => l,
                None => continue,
            };

            // Only light arriving on the side the eye sees counts.
            let nl = align_zero(n.dot(l));
            if nl * nv <= 0.0 {
                continue;
            }

            let ktr = self.transparency(light, l, n, p);
            if !self.contributes(ktr * k) {
                continue;
            }

            let intensity = light.intensity_at(p) * ktr;
            color += diffuse(material.kd, nl, intensity)
                + specular(material.ks, material.shininess, l, n, nl, v, intensity);
        }

        color
    }

    /// The fraction of `light` that reaches `p` past any occluders.
    ///
    /// Each distinct shape between the point and the light scales the light
    /// by its transparency `kt`; an opaque occluder blocks it entirely.
    pub fn transparency(&self, light: &Light, l: Vector, n: Vector, p: Point3D)
        -> f64 {
        let shadow_ray = Ray::offset(p, -l, n);
        let distance = light.distance_to(shadow_ray.origin());

        let intersections = self.scene.geometries()
            .find_intersections(&shadow_ray, distance);

        let mut occluders: Vec<&Shape> = Vec::new();
        let mut ktr = 1.0;

        for gp in intersections.iter().filter(|gp| gp.is_finite()) {
            // A shape crossed twice (in and out) only attenuates once.
            if occluders.iter().any(|&s| std::ptr::eq(s, gp.geometry)) {
                continue;
            }

            occluders.push(gp.geometry);
            ktr *= gp.geometry.material.kt;
            if ktr < self.config.min_contribution {
                return 0.0;
            }
        }

        ktr
    }

    /// Reflected and transmitted light at `p`.
    fn global_effects(&mut self, p: Point3D, n: Vector, v: Vector,
        material: &Material, depth: usize, k: f64) -> Color {
        let mut color = Color::black();

        let kkr = k * material.kr;
        if material.kr != 0.0 && self.contributes(kkr) {
            color += self.reflected(p, n, v, material, depth, kkr) * material.kr;
        }

        let kkt = k * material.kt;
        if material.kt != 0.0 && self.contributes(kkt) {
            let refracted = Ray::offset(p, v, n);
            color += self.trace_ray(&refracted, depth - 1, kkt) * material.kt;
        }

        color
    }

    fn reflected(&mut self, p: Point3D, n: Vector, v: Vector,
        material: &Material, depth: usize, kkr: f64) -> Color {
        let mirror = Ray::offset(p, reflect(v, n), n);

        let count = self.config.num_gloss_blur_rays;
        if count == 0 || material.gloss_blur <= 0.0 {
            return self.trace_ray(&mirror, depth - 1, kkr);
        }

        let rays = self.glossy_rays(&mirror, n, material.gloss_blur, count);
        let colors: Vec<Color> = rays.iter()
            .map(|ray| self.trace_ray(ray, depth - 1, kkr))
            .collect();

        Color::mean(&colors)
    }

    /// Jitters a mirror ray within a cone.
    ///
    /// Each ray points at a random sample of the disk of radius `blur`
    /// centred one unit along the mirror direction. Samples that would
    /// cross to the other side of the surface fall back to the mirror ray.
    pub fn glossy_rays(&mut self, mirror: &Ray, n: Vector, blur: f64, count: usize)
        -> Vec<Ray> {
        let r = mirror.direction();
        let (u, w) = r.any_orthonormal_pair();
        let side = n.dot(r);

        (0..count).map(|_| {
            let (dx, dy) = self.sample_disk();
            let direction = r + u * (dx * blur) + w * (dy * blur);

            if align_zero(n.dot(direction)) * side <= 0.0 {
                *mirror
            } else {
                Ray::new(mirror.origin(), direction)
            }
        }).collect()
    }

    /// A uniform sample of the unit disk.
    fn sample_disk(&mut self) -> (f64, f64) {
        loop {
            let x: f64 = self.rng.gen_range(-1.0..1.0);
            let y: f64 = self.rng.gen_range(-1.0..1.0);
            if x * x + y * y <= 1.0 {
                return (x, y);
            }
        }
    }
}

/// Lambertian reflection.
fn diffuse(kd: f64, nl: f64, intensity: Color) -> Color {
    intensity * (kd * nl.abs())
}

/// Phong specular highlight.
fn specular(ks: f64, shininess: f64, l: Vector, n: Vector, nl: f64, v: Vector,
    intensity: Color) -> Color {
    let r = l - n * (2.0 * nl);
    let minus_vr = -align_zero(r.dot(v));
    if minus_vr <= 0.0 {
        return Color::black();
    }

    intensity * (ks * minus_vr.powf(shininess))
}

#[cfg(test)]
mod fixtures {
    use super::*;
    use crate::light::PointLight;

    /// A diffuse floor at y = 0 lit by a white light at (0, 10, 0).
    pub fn lit_floor() -> Scene {
        let mut scene = Scene::new("lit floor");

        let floor = Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0))
            .unwrap()
            .with_material(Material::phong(1.0, 0.0, 0.0).unwrap());
        scene.add_geometry(floor);
        scene.add_light(PointLight::unattenuated(
            Color::white(), Point3D::new(0.0, 10.0, 0.0)
        ));

        scene
    }

    /// A horizontal occluding triangle at height `y`, straight above the
    /// origin.
    pub fn occluder(y: f64, kt: f64) -> Shape {
        Shape::triangle(
            Point3D::new(-1.0, y, -1.0),
            Point3D::new(1.0, y, -1.0),
            Point3D::new(0.0, y, 1.0),
        ).unwrap()
            .with_material(Material::new(0.0, 0.0, 0.0, kt, 0.0).unwrap())
    }

    pub fn down_ray() -> Ray {
        Ray::new(Point3D::new(0.0, 1.0, 0.0), Vector::new(0.0, -1.0, 0.0))
    }

    /// Two emissive mirrors facing each other across z = 0 and z = 10.
    pub fn facing_mirrors(kr: f64, emission: Color) -> Scene {
        let mut scene = Scene::new("mirrors");
        let mirror = Material::new(0.0, 0.0, 0.0, 0.0, kr).unwrap();

        scene.add_geometry(
            Shape::plane(Point3D::ZERO, Vector::new(0.0, 0.0, 1.0)).unwrap()
                .with_material(mirror)
                .with_emission(emission)
        );
        scene.add_geometry(
            Shape::plane(Point3D::new(0.0, 0.0, 10.0), Vector::new(0.0, 0.0, -1.0))
                .unwrap()
                .with_material(mirror)
                .with_emission(emission)
        );

        scene
    }

    pub fn between_mirrors() -> Ray {
        Ray::new(Point3D::new(0.0, 0.0, 5.0), Vector::new(0.0, 0.0, 1.0))
    }
}

#[test]
fn ray_miss_returns_background() {
    let scene = fixtures::lit_floor().with_background(Color::rgb(0.1, 0.2, 0.3));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    let up = Ray::new(Point3D::new(0.0, 1.0, 0.0), Vector::new(0.0, 1.0, 0.0));
    assert_eq!(tracer.trace_ray(&up, 5, 1.0), Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn empty_scene_is_background() {
    let scene = Scene::new("empty").with_background(Color::blue());
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 5, 1.0), Color::blue());
}

#[test]
fn unoccluded_diffuse_light() {
    let scene = fixtures::lit_floor();
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 5, 1.0), Color::white());
}

#[test]
fn opaque_occluder_blocks_light() {
    let mut scene = fixtures::lit_floor();
    scene.add_geometry(fixtures::occluder(5.0, 0.0));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 5, 1.0), Color::black());
}

#[test]
fn transparent_occluder_lets_light_through() {
    let mut scene = fixtures::lit_floor();
    scene.add_geometry(fixtures::occluder(5.0, 1.0));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0), Color::white());
}

#[test]
fn translucent_occluder_scales_light_linearly() {
    for &kt in [0.25, 0.5, 0.75].iter() {
        let mut scene = fixtures::lit_floor();
        scene.add_geometry(fixtures::occluder(5.0, kt));
        let config = RenderConfig::default();
        let mut tracer = Tracer::new(&scene, &config);

        assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0),
            Color::gray(kt));
    }
}

#[test]
fn stacked_occluders_multiply() {
    let mut scene = fixtures::lit_floor();
    scene.add_geometry(fixtures::occluder(5.0, 0.5));
    scene.add_geometry(fixtures::occluder(7.0, 0.5));

    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0),
        Color::gray(0.25));
}

#[test]
fn sphere_occluder_attenuates_once() {
    let mut scene = fixtures::lit_floor();
    scene.add_geometry(
        Shape::sphere(Point3D::new(0.0, 5.0, 0.0), 1.0).unwrap()
            .with_material(Material::new(0.0, 0.0, 0.0, 0.5, 0.0).unwrap())
    );
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0), Color::gray(0.5));
}

#[test]
fn occluder_beyond_light_casts_no_shadow() {
    let mut scene = fixtures::lit_floor();
    scene.add_geometry(fixtures::occluder(12.0, 0.0));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0), Color::white());
}

#[test]
fn light_on_far_side_does_not_contribute() {
    use crate::light::PointLight;

    let mut scene = Scene::new("underlit");
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(Material::phong(1.0, 1.0, 10.0).unwrap())
    );
    scene.add_light(PointLight::unattenuated(
        Color::white(), Point3D::new(0.0, -10.0, 0.0)
    ));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0), Color::black());
}

#[test]
fn light_at_hit_point_is_ignored() {
    use crate::light::PointLight;

    let mut scene = Scene::new("light on surface");
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(Material::phong(1.0, 0.0, 0.0).unwrap())
    );
    scene.add_light(PointLight::unattenuated(Color::white(), Point3D::ZERO));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    let c = tracer.trace_ray(&fixtures::down_ray(), 0, 1.0);
    assert!(c.is_finite());
    assert_eq!(c, Color::black());
}

#[test]
fn specular_highlight_towards_the_eye() {
    use crate::light::PointLight;

    let mut scene = Scene::new("specular");
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(Material::phong(0.0, 0.5, 100.0).unwrap())
    );
    scene.add_light(PointLight::unattenuated(
        Color::white(), Point3D::new(0.0, 10.0, 0.0)
    ));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    // Light, eye and normal all line up: the highlight is at full strength.
    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0), Color::gray(0.5));
}

#[test]
fn ambient_light_scaled_by_material() {
    use crate::light::AmbientLight;

    let mut scene = Scene::new("ambient")
        .with_ambient_light(AmbientLight::new(Color::white(), 0.2));
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(Material::default().with_ambient(0.5).unwrap())
            .with_emission(Color::rgb(0.0, 0.0, 0.3))
    );
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 0, 1.0),
        Color::rgb(0.1, 0.1, 0.4));
}

#[test]
fn facing_mirrors_stop_at_max_depth() {
    let scene = fixtures::facing_mirrors(0.5, Color::gray(1.0));
    let config = RenderConfig { min_contribution: 0.0, ..Default::default() };
    let mut tracer = Tracer::new(&scene, &config);

    // Depth 5 allows the first hit plus five reflections.
    let c = tracer.trace_ray(&fixtures::between_mirrors(), 5, 1.0);
    let expected: f64 = (0..=5).map(|i| 0.5f64.powi(i)).sum();
    assert_eq!(c, Color::gray(expected));
}

#[test]
fn perfect_mirrors_terminate_with_finite_color() {
    let scene = fixtures::facing_mirrors(1.0, Color::gray(0.1));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    let c = tracer.trace_ray(&fixtures::between_mirrors(), 5, 1.0);
    assert!(c.is_finite());
    assert_eq!(c, Color::gray(0.6));
}

#[test]
fn depth_zero_spawns_no_secondary_rays() {
    let scene = fixtures::facing_mirrors(1.0, Color::gray(0.1));
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::between_mirrors(), 0, 1.0),
        Color::gray(0.1));
}

#[test]
fn low_contribution_paths_are_cut_off() {
    let scene = fixtures::facing_mirrors(0.5, Color::gray(1.0));
    let config = RenderConfig { min_contribution: 0.1, ..Default::default() };
    let mut tracer = Tracer::new(&scene, &config);

    // Weights 0.5, 0.25 and 0.125 recurse; 0.0625 is below the cutoff.
    let c = tracer.trace_ray(&fixtures::between_mirrors(), 10, 1.0);
    assert_eq!(c, Color::gray(1.875));
}

#[test]
fn transparent_surface_shows_what_is_behind() {
    let mut scene = Scene::new("window").with_background(Color::red());
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(Material::new(0.0, 0.0, 0.0, 0.5, 0.0).unwrap())
    );
    let config = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &config);

    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 1, 1.0),
        Color::rgb(0.5, 0.0, 0.0));
}

#[test]
fn glossy_rays_stay_on_the_reflecting_side() {
    let scene = Scene::new("gloss");
    let config = RenderConfig { num_gloss_blur_rays: 64, ..Default::default() };
    let mut tracer = Tracer::new(&scene, &config);

    let n = Vector::new(0.0, 1.0, 0.0);
    let mirror = Ray::offset(Point3D::ZERO, Vector::new(1.0, 0.05, 0.0), n);
    let rays = tracer.glossy_rays(&mirror, n, 0.5, 64);

    assert_eq!(rays.len(), 64);
    for r in rays.iter() {
        assert!(r.direction().dot(n) > 0.0);
        assert_eq!(r.origin(), mirror.origin());
    }
}

#[test]
fn reseeding_repeats_glossy_rays() {
    let scene = Scene::new("gloss");
    let config = RenderConfig { num_gloss_blur_rays: 8, ..Default::default() };
    let mut tracer = Tracer::new(&scene, &config);

    let n = Vector::new(0.0, 1.0, 0.0);
    let mirror = Ray::offset(Point3D::ZERO, Vector::new(1.0, 1.0, 0.0), n);

    tracer.reseed(7);
    let first = tracer.glossy_rays(&mirror, n, 0.3, 8);
    tracer.reseed(7);
    let second = tracer.glossy_rays(&mirror, n, 0.3, 8);

    assert_eq!(first, second);
}

#[test]
fn glossy_mirror_blurs_reflection() {
    let mut scene = Scene::new("glossy floor");
    scene.add_geometry(
        Shape::plane(Point3D::ZERO, Vector::new(0.0, 1.0, 0.0)).unwrap()
            .with_material(
                Material::new(0.0, 0.0, 0.0, 0.0, 1.0).unwrap()
                    .with_gloss_blur(0.3).unwrap()
            )
    );
    // A small emissive sphere straight above the reflection point.
    scene.add_geometry(
        Shape::sphere(Point3D::new(0.0, 5.0, 0.0), 0.5).unwrap()
            .with_emission(Color::white())
    );

    let sharp = RenderConfig::default();
    let mut tracer = Tracer::new(&scene, &sharp);
    assert_eq!(tracer.trace_ray(&fixtures::down_ray(), 1, 1.0), Color::white());

    // Spread over a cone wider than the sphere, only part of the rays see it.
    let glossy = RenderConfig { num_gloss_blur_rays: 64, ..Default::default() };
    let mut tracer = Tracer::new(&scene, &glossy);
    let c = tracer.trace_ray(&fixtures::down_ray(), 1, 1.0);
    assert!(c.r > 0.0 && c.r < 1.0);
}
