use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{CameraError, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CameraUnit {
    Front,
    Rear,
}

impl fmt::Display for CameraUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Rear => f.write_str("rear"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFeature {
    Photo,
    Video,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const RW = Self::READ.bits() | Self::WRITE.bits();
        /// Grants access to the camera roll for output files.
        const ROLL = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VideoFormat {
    #[default]
    Default,
    Mp4,
}

impl VideoFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Default | Self::Mp4 => "mp4",
        }
    }
}

/// Opaque reference to an open camera. Only valid between `open` and `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewfinderProperty {
    WindowGroup(String),
    WindowId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// `extra` is 1 when the viewfinder started, 0 when it stopped.
    Viewfinder,
    RecordingStarted,
    RecordingStopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraStatus {
    pub status: DeviceStatus,
    pub extra: u16,
}

pub type StatusCallback = Box<dyn FnMut(CameraStatus) + Send>;

/// An open output file on the camera roll.
///
/// Consumed by `close` or `discard`, so it is released exactly once.
#[derive(Debug)]
pub struct RollVideo {
    file: File,
    path: PathBuf,
}

impl RollVideo {
    pub fn new(file: File, path: PathBuf) -> Self {
        Self { file, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the file and keeps it on the roll.
    pub fn close(self) -> PathBuf {
        let Self { file, path } = self;
        drop(file);
        path
    }

    /// Closes the file and removes it; used when recording never started.
    pub fn discard(self) -> io::Result<()> {
        let path = self.close();
        fs::remove_file(path)
    }
}

/// Camera device abstraction. Every call is synchronous.
pub trait CameraService {
    /// Units supporting `feature`, in the service's enumeration order.
    fn supported_units(&self, feature: CameraFeature) -> Result<Vec<CameraUnit>, CameraError>;

    fn open(&mut self, unit: CameraUnit, mode: OpenMode) -> Result<CameraHandle, CameraError>;

    fn set_viewfinder_properties(
        &mut self,
        handle: CameraHandle,
        properties: &[ViewfinderProperty],
    ) -> Result<(), CameraError>;

    /// The service creates the viewfinder window itself; it shows up later as a
    /// window-created screen event.
    fn start_viewfinder(
        &mut self,
        handle: CameraHandle,
        on_status: StatusCallback,
    ) -> Result<(), CameraError>;

    fn stop_viewfinder(&mut self, handle: CameraHandle) -> Result<(), CameraError>;

    fn close(&mut self, handle: CameraHandle) -> Result<(), CameraError>;

    /// Allocates a fresh file on the camera roll.
    fn roll_open_video(
        &mut self,
        handle: CameraHandle,
        format: VideoFormat,
    ) -> Result<RollVideo, CameraError>;

    fn start_video(&mut self, handle: CameraHandle, path: &Path) -> Result<(), CameraError>;

    fn stop_video(&mut self, handle: CameraHandle) -> Result<(), CameraError>;
}

/// A camera with a running viewfinder, ready for the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenCamera {
    pub handle: CameraHandle,
    pub unit: CameraUnit,
    /// Front-facing units get a mirrored viewfinder.
    pub mirror: bool,
}

/// Opens the first video-capable unit and starts its viewfinder.
///
/// On any failure after `open` the handle is closed again before returning.
pub fn init_camera<C>(
    camera: &mut C,
    config: &AppConfig,
    on_status: StatusCallback,
) -> Result<OpenCamera>
where
    C: CameraService + ?Sized,
{
    let units = camera
        .supported_units(CameraFeature::Video)
        .map_err(Error::camera("supported_units"))?;
    for unit in &units {
        debug!(%unit, "found video camera unit");
    }

    let unit = *units.first().ok_or(Error::NoVideoCamera)?;
    info!(%unit, "selecting camera unit");

    let handle = camera
        .open(unit, OpenMode::RW | OpenMode::ROLL)
        .map_err(Error::camera("open"))?;

    if let Err(e) = start_viewfinder(camera, handle, config, on_status) {
        if let Err(close_err) = camera.close(handle) {
            warn!(error = %close_err, "close() failed during cleanup");
        }
        return Err(e);
    }

    Ok(OpenCamera {
        handle,
        unit,
        mirror: unit == CameraUnit::Front,
    })
}

fn start_viewfinder<C>(
    camera: &mut C,
    handle: CameraHandle,
    config: &AppConfig,
    on_status: StatusCallback,
) -> Result<()>
where
    C: CameraService + ?Sized,
{
    // Minimal viewfinder configuration: where the service should put its window.
    let properties = [
        ViewfinderProperty::WindowGroup(config.window_group.clone()),
        ViewfinderProperty::WindowId(config.viewfinder_window_id.clone()),
    ];
    camera
        .set_viewfinder_properties(handle, &properties)
        .map_err(Error::camera("set_viewfinder_properties"))?;
    camera
        .start_viewfinder(handle, on_status)
        .map_err(Error::camera("start_viewfinder"))
}
