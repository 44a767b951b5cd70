use crate::color::Color;
use crate::geometries::Geometries;
use crate::intersect::Intersectable;
use crate::light::{ AmbientLight, Light };

/// Everything the tracer reads while rendering.
///
/// A scene is assembled once, then handed to the renderer by shared
/// reference; it is never mutated while a render is running.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    geometries: Geometries,
    lights: Vec<Light>,
    background: Color,
    ambient_light: AmbientLight,
}

impl Scene {
    /// Creates an empty scene with a black background and no ambient light.
    pub fn new(name: &str) -> Scene {
        Scene {
            name: name.to_string(),
            geometries: Geometries::new(),
            lights: Vec::new(),
            background: Color::black(),
            ambient_light: Default::default(),
        }
    }

    pub fn with_background(mut self, background: Color) -> Scene {
        self.background = background;
        self
    }

    pub fn with_ambient_light(mut self, ambient_light: AmbientLight) -> Scene {
        self.ambient_light = ambient_light;
        self
    }

    pub fn add_geometry<T: Intersectable + 'static>(&mut self, geometry: T) {
        self.geometries.add(geometry);
    }

    pub fn add_light<L: Into<Light>>(&mut self, light: L) {
        self.lights.push(light.into());
    }

    pub fn geometries(&self) -> &Geometries {
        &self.geometries
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn ambient_light(&self) -> AmbientLight {
        self.ambient_light
    }

    /// The total ambient intensity: the scene's ambient light plus every
    /// ambient entry in the light list.
    pub fn ambient_intensity(&self) -> Color {
        self.lights.iter()
            .filter_map(|light| match light {
                Light::Ambient { intensity } => Some(*intensity),
                _ => None,
            })
            .fold(self.ambient_light.intensity(), |acc, i| acc + i)
    }
}

#[test]
fn new_scene_is_empty() {
    let scene = Scene::new("empty");

    assert!(scene.geometries().is_empty());
    assert!(scene.lights().is_empty());
    assert_eq!(scene.background(), Color::black());
    assert_eq!(scene.ambient_intensity(), Color::black());
}

#[test]
fn ambient_intensity_sums_ambient_lights() {
    use crate::light::PointLight;
    use crate::vector::Point3D;

    let mut scene = Scene::new("ambient")
        .with_ambient_light(AmbientLight::new(Color::white(), 0.1));
    scene.add_light(AmbientLight::new(Color::rgb(1.0, 0.0, 0.0), 0.5));
    scene.add_light(PointLight::unattenuated(Color::white(), Point3D::ZERO));

    assert_eq!(scene.lights().len(), 2);
    assert_eq!(scene.ambient_intensity(), Color::rgb(0.6, 0.1, 0.1));
}
