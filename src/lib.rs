pub mod consts;
pub mod error;
pub mod vector;
pub mod ray;

pub mod color;
pub mod material;
pub mod light;

pub mod intersect;
pub mod shape;
pub mod geometries;
pub mod scene;
pub mod camera;

pub mod config;
pub mod tracer;
pub mod canvas;
pub mod render;

pub use error::{ Error, Result };

use consts::FEQ_EPSILON;

pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
