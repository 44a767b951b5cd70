use crate::{ Error, Result };

/// A material record.
///
/// Materials use the Phong reflection model (diffuse, specular, shininess)
/// extended with the coefficients that drive recursive tracing:
/// reflectivity `kr` and transparency `kt`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Diffuse coefficient.
    pub kd: f64,

    /// Specular coefficient.
    pub ks: f64,

    /// Specular exponent.
    pub shininess: f64,

    /// Reflectivity. Zero means no reflection rays are spawned.
    pub kr: f64,

    /// Transparency. Zero means no refraction rays are spawned and the
    /// material fully blocks light in shadow tests.
    pub kt: f64,

    /// How much of the ambient light this material picks up.
    pub ka: f64,

    /// Radius of the disk, one unit along the mirror direction, that glossy
    /// reflection rays are jittered within. Zero is a perfect mirror.
    pub gloss_blur: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            kd: 0.0,
            ks: 0.0,
            shininess: 0.0,
            kr: 0.0,
            kt: 0.0,
            ka: 1.0,
            gloss_blur: 0.0,
        }
    }
}

impl Material {
    /// Creates a validated material with diffuse, specular, shininess,
    /// transparency and reflectivity.
    pub fn new(kd: f64, ks: f64, shininess: f64, kt: f64, kr: f64)
        -> Result<Material> {
        Material { kd, ks, shininess, kt, kr, ..Default::default() }
            .validated()
    }

    /// Creates a validated purely-diffuse, purely-specular material.
    pub fn phong(kd: f64, ks: f64, shininess: f64) -> Result<Material> {
        Material::new(kd, ks, shininess, 0.0, 0.0)
    }

    pub fn with_ambient(mut self, ka: f64) -> Result<Material> {
        self.ka = ka;
        self.validated()
    }

    pub fn with_gloss_blur(mut self, gloss_blur: f64) -> Result<Material> {
        self.gloss_blur = gloss_blur;
        self.validated()
    }

    /// Checks the coefficient ranges.
    pub fn validated(self) -> Result<Material> {
        let unit = [
            ("kd", self.kd),
            ("ks", self.ks),
            ("kr", self.kr),
            ("kt", self.kt),
            ("ka", self.ka),
        ];

        for (name, value) in unit.iter() {
            if !(0.0..=1.0).contains(value) {
                return Err(Error::InvalidMaterial(
                    format!("{} must be in [0, 1], got {}", name, value)
                ));
            }
        }

        if !(self.shininess >= 0.0) {
            return Err(Error::InvalidMaterial(
                format!("shininess must be non-negative, got {}", self.shininess)
            ));
        }

        if !(self.gloss_blur >= 0.0) {
            return Err(Error::InvalidMaterial(
                format!("gloss blur must be non-negative, got {}", self.gloss_blur)
            ));
        }

        Ok(self)
    }

    /// Whether hitting this material spawns any secondary rays.
    pub fn is_recursive(&self) -> bool {
        self.kr != 0.0 || self.kt != 0.0
    }
}

#[test]
fn default_material_is_matte_black() {
    let m: Material = Default::default();

    assert_eq!(m.kd, 0.0);
    assert_eq!(m.ka, 1.0);
    assert!(!m.is_recursive());
}

#[test]
fn material_rejects_out_of_range_coefficients() {
    assert!(Material::new(1.5, 0.0, 0.0, 0.0, 0.0).is_err());
    assert!(Material::new(0.5, -0.1, 0.0, 0.0, 0.0).is_err());
    assert!(Material::new(0.5, 0.5, 10.0, 0.0, 2.0).is_err());
    assert!(Material::phong(0.5, 0.5, -1.0).is_err());
}

#[test]
fn material_with_reflection_is_recursive() {
    let m = Material::new(0.2, 0.2, 30.0, 0.0, 0.8).unwrap();

    assert!(m.is_recursive());
    assert_eq!(m.kr, 0.8);
    assert_eq!(m.kt, 0.0);
}

#[test]
fn gloss_blur_must_be_non_negative() {
    let m = Material::phong(0.2, 0.2, 10.0).unwrap();

    assert!(m.with_gloss_blur(0.2).is_ok());
    assert!(m.with_gloss_blur(-0.2).is_err());
}
