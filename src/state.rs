use crate::camera::{CameraHandle, RollVideo};
use crate::screen::WindowHandle;

// --- State Management ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Waiting for the camera service to hand us the viewfinder window.
    #[default]
    Startup,
    Viewfinder,
    Recording,
}

/// Everything the control loop owns. Only the loop mutates it.
#[derive(Debug, Default)]
pub struct AppContext {
    pub state: AppState,
    pub camera: Option<CameraHandle>,
    pub recording: Option<RollVideo>,
    pub viewfinder: Option<WindowHandle>,
    pub mirror: bool,
    touch: bool,
    shutdown: bool,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single slot: a second touch before `take_touch` is lost.
    pub fn latch_touch(&mut self) {
        self.touch = true;
    }

    pub fn take_touch(&mut self) -> bool {
        std::mem::take(&mut self.touch)
    }

    pub fn touch_pending(&self) -> bool {
        self.touch
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }
}
