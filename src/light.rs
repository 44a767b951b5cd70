use crate::color::Color;
use crate::vector::{ Point3D, Vector, try_normalize };
use crate::{ Error, Result };

/// The ambient light of a scene.
///
/// A constant color scaled by an intensity factor `ka`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub ka: f64,
}

impl Default for AmbientLight {
    fn default() -> AmbientLight {
        AmbientLight { color: Color::black(), ka: 0.0 }
    }
}

impl AmbientLight {
    pub fn new(color: Color, ka: f64) -> AmbientLight {
        AmbientLight { color, ka }
    }

    pub fn intensity(&self) -> Color {
        self.color * self.ka
    }
}

/// A point light.
///
/// Emits in every direction from `position`. Intensity falls off with
/// distance as `1 / (kc + kl*d + kq*d^2)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Point3D,
    pub kc: f64,
    pub kl: f64,
    pub kq: f64,
}

impl PointLight {
    pub fn new(intensity: Color, position: Point3D, kc: f64, kl: f64, kq: f64)
        -> Result<PointLight> {
        if kc < 0.0 || kl < 0.0 || kq < 0.0 || kc + kl + kq <= 0.0 {
            return Err(Error::InvalidLight(format!(
                "attenuation factors must be non-negative and not all zero, \
                got ({}, {}, {})", kc, kl, kq
            )));
        }

        Ok(PointLight { intensity, position, kc, kl, kq })
    }

    /// A point light with no falloff.
    pub fn unattenuated(intensity: Color, position: Point3D) -> PointLight {
        PointLight { intensity, position, kc: 1.0, kl: 0.0, kq: 0.0 }
    }

    fn attenuated(&self, p: Point3D) -> Color {
        let d = p.distance(self.position);
        self.intensity.reduce(self.kc + self.kl * d + self.kq * d * d)
    }

    fn direction_from(&self, p: Point3D) -> Option<Vector> {
        (p - self.position).try_normalize()
    }
}

/// A spot light.
///
/// A point light whose intensity narrows around a fixed `axis`, scaled by
/// `max(0, cos(angle))^sharpness`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub point: PointLight,
    pub axis: Vector,
    pub sharpness: f64,
}

impl SpotLight {
    pub fn new(intensity: Color, axis: Vector, position: Point3D,
        kc: f64, kl: f64, kq: f64) -> Result<SpotLight> {
        Ok(SpotLight {
            point: PointLight::new(intensity, position, kc, kl, kq)?,
            axis: try_normalize(axis, "spot light axis")?,
            sharpness: 1.0,
        })
    }

    pub fn with_sharpness(mut self, sharpness: f64) -> Result<SpotLight> {
        if !(sharpness >= 1.0) {
            return Err(Error::InvalidLight(
                format!("spot light sharpness must be at least 1, got {}", sharpness)
            ));
        }

        self.sharpness = sharpness;
        Ok(self)
    }
}

/// A light source.
///
/// Lights expose the same three queries: intensity at a point, the direction
/// light travels to reach a point, and the distance from the light to a
/// point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient { intensity: Color },
    Point(PointLight),
    Directional { intensity: Color, direction: Vector },
    Spot(SpotLight),
}

impl From<AmbientLight> for Light {
    fn from(ambient: AmbientLight) -> Light {
        Light::Ambient { intensity: ambient.intensity() }
    }
}

impl From<PointLight> for Light {
    fn from(point: PointLight) -> Light {
        Light::Point(point)
    }
}

impl From<SpotLight> for Light {
    fn from(spot: SpotLight) -> Light {
        Light::Spot(spot)
    }
}

impl Light {
    /// Creates a directional light, such as sunlight.
    pub fn directional(intensity: Color, direction: Vector) -> Result<Light> {
        Ok(Light::Directional {
            intensity,
            direction: try_normalize(direction, "directional light")?,
        })
    }

    /// The light's intensity arriving at point `p`.
    pub fn intensity_at(&self, p: Point3D) -> Color {
        match self {
            Light::Ambient { intensity } => *intensity,
            Light::Directional { intensity, .. } => *intensity,
            Light::Point(point) => point.attenuated(p),
            Light::Spot(spot) => {
                let cos = match spot.point.direction_from(p) {
                    Some(l) => spot.axis.dot(l),
                    None => return spot.point.intensity.reduce(spot.point.kc),
                };

                // Points behind the spot light receive nothing.
                if cos <= 0.0 {
                    return Color::black();
                }

                spot.point.attenuated(p) * cos.powf(spot.sharpness)
            },
        }
    }

    /// The unit direction light travels from this light to point `p`.
    ///
    /// Returns `None` for ambient light, and for point and spot lights when
    /// `p` is exactly the light's position.
    pub fn direction_from(&self, p: Point3D) -> Option<Vector> {
        match self {
            Light::Ambient { .. } => None,
            Light::Directional { direction, .. } => Some(*direction),
            Light::Point(point) => point.direction_from(p),
            Light::Spot(spot) => spot.point.direction_from(p),
        }
    }

    /// The distance from this light to point `p`.
    ///
    /// Directional and ambient lights are infinitely far away.
    pub fn distance_to(&self, p: Point3D) -> f64 {
        match self {
            Light::Ambient { .. } | Light::Directional { .. } => f64::INFINITY,
            Light::Point(point) => point.position.distance(p),
            Light::Spot(spot) => spot.point.position.distance(p),
        }
    }
}

#[test]
fn point_light_attenuates_with_distance() {
    let light: Light = PointLight::new(
        Color::gray(100.0), Point3D::ZERO, 1.0, 1.0, 1.0,
    ).unwrap().into();

    // d = 2 => 1 + 2 + 4 = 7
    let at = Point3D::new(0.0, 2.0, 0.0);
    assert_eq!(light.intensity_at(at), Color::gray(100.0 / 7.0));
    assert_eq!(light.distance_to(at), 2.0);
}

#[test]
fn point_light_direction_points_away_from_light() {
    let light: Light = PointLight::unattenuated(
        Color::white(), Point3D::new(0.0, 10.0, 0.0),
    ).into();

    assert_eq!(light.direction_from(Point3D::ZERO),
        Some(Vector::new(0.0, -1.0, 0.0)));
}

#[test]
fn point_light_has_no_direction_at_its_position() {
    let position = Point3D::new(1.0, 2.0, 3.0);
    let light: Light = PointLight::unattenuated(Color::white(), position).into();

    assert_eq!(light.direction_from(position), None);
}

#[test]
fn point_light_rejects_zero_attenuation() {
    assert!(PointLight::new(Color::white(), Point3D::ZERO, 0.0, 0.0, 0.0)
        .is_err());
    assert!(PointLight::new(Color::white(), Point3D::ZERO, 1.0, -1.0, 0.0)
        .is_err());
}

#[test]
fn directional_light_is_unattenuated() {
    let light = Light::directional(
        Color::gray(0.5), Vector::new(0.0, -2.0, 0.0),
    ).unwrap();

    let far = Point3D::new(1000.0, 1000.0, 1000.0);
    assert_eq!(light.intensity_at(far), Color::gray(0.5));
    assert_eq!(light.direction_from(far), Some(Vector::new(0.0, -1.0, 0.0)));
    assert_eq!(light.distance_to(far), f64::INFINITY);
}

#[test]
fn spot_light_narrows_with_angle() {
    let spot = SpotLight::new(
        Color::white(), Vector::new(0.0, 0.0, 1.0), Point3D::ZERO,
        1.0, 0.0, 0.0,
    ).unwrap();
    let light: Light = spot.into();

    // On the axis the full intensity arrives.
    assert_eq!(light.intensity_at(Point3D::new(0.0, 0.0, 5.0)), Color::white());

    // At 45 degrees the intensity is scaled by the cosine.
    let c = light.intensity_at(Point3D::new(0.0, 5.0, 5.0));
    assert_eq!(c, Color::gray(2.0f64.sqrt() / 2.0));
}

#[test]
fn spot_light_sharpness_narrows_the_beam() {
    let spot = SpotLight::new(
        Color::white(), Vector::new(0.0, 0.0, 1.0), Point3D::ZERO,
        1.0, 0.0, 0.0,
    ).unwrap().with_sharpness(2.0).unwrap();
    let light: Light = spot.into();

    let c = light.intensity_at(Point3D::new(0.0, 5.0, 5.0));
    assert_eq!(c, Color::gray(0.5));
}

#[test]
fn spot_light_behind_is_black() {
    let light: Light = SpotLight::new(
        Color::white(), Vector::new(0.0, 0.0, 1.0), Point3D::ZERO,
        1.0, 0.0, 0.0,
    ).unwrap().into();

    assert_eq!(light.intensity_at(Point3D::new(0.0, 0.0, -5.0)), Color::black());
    assert_eq!(light.intensity_at(Point3D::new(0.0, 5.0, 0.0)), Color::black());
}

#[test]
fn ambient_light_has_no_direction() {
    let light: Light = AmbientLight::new(Color::white(), 0.15).into();

    assert_eq!(light.intensity_at(Point3D::ZERO), Color::gray(0.15));
    assert_eq!(light.direction_from(Point3D::ZERO), None);
}
