use thiserror::Error;

use crate::camera::CameraUnit;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported by the camera service itself.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera unit {0} is not available")]
    Unavailable(CameraUnit),

    #[error("invalid camera handle")]
    InvalidHandle,

    #[error("camera is busy")]
    Busy,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation not permitted in the current open mode")]
    Mode,

    #[error("camera roll I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no camera unit supports video")]
    NoVideoCamera,

    #[error("{op}() failed: {source}")]
    Camera {
        op: &'static str,
        #[source]
        source: CameraError,
    },

    #[error("event property {0} unavailable")]
    MissingEventProperty(&'static str),

    #[error("compositor: {0}")]
    Screen(String),
}

impl Error {
    pub fn camera(op: &'static str) -> impl FnOnce(CameraError) -> Self {
        move |source| Self::Camera { op, source }
    }
}
