use std::fmt;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowProperty {
    /// Relative to the parent window for child windows.
    ZOrder(i32),
    Mirror(bool),
    Visible(bool),
}

/// Compositor / window surface service.
pub trait Compositor {
    fn create_window(&mut self) -> Result<WindowHandle>;

    /// Lets windows created by other processes join `window` as children.
    fn create_window_group(&mut self, window: WindowHandle, group: &str) -> Result<()>;

    /// Fills a single render buffer with `color` (ARGB) and posts it.
    fn fill_and_post(&mut self, window: WindowHandle, color: u32) -> Result<()>;

    fn set_property(&mut self, window: WindowHandle, property: WindowProperty) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn stop_events(&mut self);

    fn destroy_window(&mut self, window: WindowHandle);
}

const BLACK: u32 = 0x0000_0000;

/// Creates the black application window the viewfinder sits on.
pub fn create_background<W>(screen: &mut W, config: &AppConfig) -> Result<WindowHandle>
where
    W: Compositor + ?Sized,
{
    let window = screen.create_window()?;
    screen.create_window_group(window, &config.window_group)?;
    screen.fill_and_post(window, BLACK)?;
    screen.set_property(window, WindowProperty::ZOrder(config.app_zorder))?;
    debug!(%window, group = %config.window_group, "background window posted");
    Ok(window)
}

/// One-shot setup of the viewfinder window the camera service created.
///
/// Best effort: a property that cannot be set is logged and skipped.
pub fn present_viewfinder<W>(screen: &mut W, window: WindowHandle, mirror: bool)
where
    W: Compositor + ?Sized,
{
    let properties = [
        WindowProperty::Mirror(mirror),
        // In front of the background window.
        WindowProperty::ZOrder(1),
        WindowProperty::Visible(true),
    ];
    for property in properties {
        if let Err(e) = screen.set_property(window, property) {
            warn!(%window, ?property, error = %e, "failed to set viewfinder property");
        }
    }
    if let Err(e) = screen.flush() {
        warn!(error = %e, "failed to flush compositor context");
    }
}
