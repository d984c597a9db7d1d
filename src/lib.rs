//! Camera viewfinder demo: touch the screen to start recording video, touch
//! again to stop.
//!
//! The platform services (camera, compositor, sound player, event dispatch)
//! are traits; [`sim`] provides an in-process implementation of each.

pub mod app;
pub mod audio;
pub mod camera;
pub mod config;
pub mod error;
pub mod event;
pub mod machine;
pub mod screen;
pub mod sim;
pub mod state;

pub use app::{run, RunSummary};
pub use config::AppConfig;
pub use error::{CameraError, Error, Result};
pub use state::{AppContext, AppState};
