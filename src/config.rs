use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::consts::{ MAX_RECURSION_DEPTH, MIN_CONTRIBUTION, NUM_THREADS };
use crate::{ Error, Result };

/// Options consumed by the render scheduler and the tracer.
///
/// Every field has a default, so a JSON document only needs to name the
/// options it changes:
///
/// ```
/// # use recursive_ray_tracer::config::RenderConfig;
/// let config = RenderConfig::from_json(r#"{ "num_samples": 4 }"#).unwrap();
/// assert_eq!(config.num_samples, 4);
/// assert_eq!(config.worker_count, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Anti-aliasing grid size per pixel; 1 disables anti-aliasing.
    pub num_samples: usize,

    /// Rays averaged for a glossy reflection; 0 disables glossy blur.
    pub num_gloss_blur_rays: usize,

    /// Bound on reflection/refraction recursion.
    pub max_recursion_depth: usize,

    /// Paths whose accumulated weight drops below this stop recursing.
    pub min_contribution: f64,

    /// Number of parallel render workers.
    pub worker_count: usize,

    /// Seed for glossy-reflection jitter.
    pub seed: u64,

    /// Log progress while rendering.
    pub print_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            num_samples: 1,
            num_gloss_blur_rays: 0,
            max_recursion_depth: MAX_RECURSION_DEPTH,
            min_contribution: MIN_CONTRIBUTION,
            worker_count: NUM_THREADS,
            seed: 0,
            print_progress: false,
        }
    }
}

impl RenderConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<RenderConfig> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RenderConfig> {
        RenderConfig::from_json(&fs::read_to_string(path)?)
    }

    pub fn validated(self) -> Result<RenderConfig> {
        if self.worker_count == 0 {
            return Err(Error::InvalidConfig(
                "worker_count must be at least 1".into()
            ));
        }

        if !(0.0..1.0).contains(&self.min_contribution) {
            return Err(Error::InvalidConfig(format!(
                "min_contribution must be in [0, 1), got {}", self.min_contribution
            )));
        }

        Ok(self)
    }
}

/// The image raster and the screen it is projected onto.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Image width in pixels.
    pub width: usize,

    /// Image height in pixels.
    pub height: usize,

    /// Distance from the camera to the screen.
    pub distance: f64,

    /// Screen width, in scene units.
    pub screen_width: f64,

    /// Screen height, in scene units.
    pub screen_height: f64,
}

impl Viewport {
    pub fn new(width: usize, height: usize, distance: f64,
        screen_width: f64, screen_height: f64) -> Result<Viewport> {
        Viewport { width, height, distance, screen_width, screen_height }
            .validated()
    }

    pub fn validated(self) -> Result<Viewport> {
        let Viewport { width, height, distance, screen_width, screen_height } = self;

        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(format!(
                "image must have at least one pixel, got {}x{}", width, height
            )));
        }

        if !(distance > 0.0 && screen_width > 0.0 && screen_height > 0.0) {
            return Err(Error::InvalidConfig(
                "screen distance and size must be positive".into()
            ));
        }

        Ok(self)
    }
}

#[test]
fn empty_json_gives_defaults() {
    let config = RenderConfig::from_json("{}").unwrap();

    assert_eq!(config, RenderConfig::default());
    assert_eq!(config.num_samples, 1);
    assert_eq!(config.num_gloss_blur_rays, 0);
    assert_eq!(config.max_recursion_depth, MAX_RECURSION_DEPTH);
}

#[test]
fn full_json_overrides_everything() {
    let config = RenderConfig::from_json(r#"{
        "num_samples": 3,
        "num_gloss_blur_rays": 80,
        "max_recursion_depth": 5,
        "min_contribution": 0.01,
        "worker_count": 4,
        "seed": 42,
        "print_progress": true
    }"#).unwrap();

    assert_eq!(config.num_samples, 3);
    assert_eq!(config.num_gloss_blur_rays, 80);
    assert_eq!(config.max_recursion_depth, 5);
    assert_eq!(config.min_contribution, 0.01);
    assert_eq!(config.worker_count, 4);
    assert_eq!(config.seed, 42);
    assert!(config.print_progress);
}

#[test]
fn zero_workers_is_rejected() {
    match RenderConfig::from_json(r#"{ "worker_count": 0 }"#) {
        Err(Error::InvalidConfig(_)) => (),
        other => panic!("expected an invalid config error, got {:?}", other),
    }
}

#[test]
fn malformed_json_is_a_parse_error() {
    match RenderConfig::from_json(r#"{ "num_samples": "many" }"#) {
        Err(Error::ConfigParse(_)) => (),
        other => panic!("expected a parse error, got {:?}", other),
    }

    assert!(RenderConfig::from_json(r#"{ "bogus": 1 }"#).is_err());
}

#[test]
fn missing_config_file_is_an_io_error() {
    match RenderConfig::from_path("/nonexistent/render-config.json") {
        Err(Error::Io(_)) => (),
        other => panic!("expected an io error, got {:?}", other),
    }
}

#[test]
fn viewport_must_have_pixels() {
    assert!(Viewport::new(0, 10, 1.0, 1.0, 1.0).is_err());
    assert!(Viewport::new(10, 10, 0.0, 1.0, 1.0).is_err());
    assert!(Viewport::new(10, 10, 1.0, 1.0, 1.0).is_ok());
}
