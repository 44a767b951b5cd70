use thiserror::Error;

/// Errors produced while building a scene or running a render.
///
/// Scene construction errors (cameras, shapes, materials, lights) are raised
/// eagerly, so that nothing invalid ever reaches the render loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("camera vectors up and towards are not orthogonal (dot = {dot})")]
    NonOrthogonalCamera { dot: f64 },

    #[error("{0} vector must have a non-zero length")]
    ZeroLengthVector(&'static str),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("invalid light: {0}")]
    InvalidLight(String),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse render configuration")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read render configuration")]
    Io(#[from] std::io::Error),

    #[error("a render worker panicked")]
    WorkerPanicked,

    #[error("all render workers exited before the image was finished")]
    WorkersDisconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
