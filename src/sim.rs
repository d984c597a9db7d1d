//! In-process stand-ins for the platform services.
//!
//! The camera roll is a real directory; everything else is bookkeeping. Every
//! service call is appended to a shared [`Journal`] so a run can be inspected
//! afterwards.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};

use chrono::Local;
use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::audio::{Cue, SoundPlayer};
use crate::camera::{
    CameraFeature, CameraHandle, CameraService, CameraStatus, CameraUnit, DeviceStatus, OpenMode,
    RollVideo, StatusCallback, VideoFormat, ViewfinderProperty,
};
use crate::error::{CameraError, Error, Result};
use crate::event::{Event, EventSource, NavigatorEvent, ScreenEvent};
use crate::screen::{Compositor, WindowHandle, WindowProperty};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(CameraUnit),
    SetViewfinderProperties(Vec<ViewfinderProperty>),
    StartViewfinder,
    StopViewfinder,
    CloseCamera,
    RollOpenVideo,
    StartVideo(PathBuf),
    StopVideo,
    Play(Cue),
    CreateWindow(WindowHandle),
    CreateWindowGroup(String),
    FillAndPost(WindowHandle, u32),
    SetProperty(WindowHandle, WindowProperty),
    Flush,
    StopEvents,
    DestroyWindow(WindowHandle),
}

/// Ordered record of service calls, shared by all simulated services.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn record(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn sounds(&self) -> Vec<Cue> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Play(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn contains(&self, pred: impl Fn(&Call) -> bool) -> bool {
        self.count(pred) > 0
    }
}

/// Service step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Fault {
    Open,
    Configure,
    Viewfinder,
    RollOpen,
    StartVideo,
}

#[derive(Debug, Clone)]
pub struct SimCameraConfig {
    /// Units in enumeration order.
    pub units: Vec<CameraUnit>,
    /// Units that can take photos but not video.
    pub no_video: Vec<CameraUnit>,
    pub roll_dir: PathBuf,
    pub faults: Vec<Fault>,
}

impl Default for SimCameraConfig {
    fn default() -> Self {
        Self {
            units: vec![CameraUnit::Rear, CameraUnit::Front],
            no_video: Vec::new(),
            roll_dir: PathBuf::from("camera-roll"),
            faults: Vec::new(),
        }
    }
}

struct Device {
    unit: CameraUnit,
    mode: OpenMode,
    viewfinder_running: bool,
    recording: Option<PathBuf>,
    on_status: Option<StatusCallback>,
}

impl Device {
    fn notify(&mut self, status: DeviceStatus, extra: u16) {
        if let Some(cb) = self.on_status.as_mut() {
            cb(CameraStatus { status, extra });
        }
    }
}

// Viewfinder windows come from the camera process; keep their ids apart.
const FIRST_VIEWFINDER_WINDOW: u32 = 1000;

pub struct SimCamera {
    config: SimCameraConfig,
    events: Sender<Event>,
    journal: Journal,
    devices: HashMap<CameraHandle, Device>,
    next_handle: u32,
    next_window: u32,
    sequence: u32,
}

impl SimCamera {
    /// `events` receives the window-created notification for each viewfinder.
    pub fn new(config: SimCameraConfig, events: Sender<Event>, journal: Journal) -> Self {
        Self {
            config,
            events,
            journal,
            devices: HashMap::new(),
            next_handle: 1,
            next_window: FIRST_VIEWFINDER_WINDOW,
            sequence: 0,
        }
    }

    pub fn open_handles(&self) -> usize {
        self.devices.len()
    }

    fn faulty(&self, fault: Fault) -> bool {
        self.config.faults.contains(&fault)
    }

    fn device(&mut self, handle: CameraHandle) -> Result<&mut Device, CameraError> {
        self.devices.get_mut(&handle).ok_or(CameraError::InvalidHandle)
    }

    fn roll_path(&mut self, format: VideoFormat) -> PathBuf {
        self.sequence += 1;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let name = format!("VID_{}_{:03}.{}", timestamp, self.sequence, format.extension());
        self.config.roll_dir.join(name)
    }
}

impl CameraService for SimCamera {
    fn supported_units(&self, feature: CameraFeature) -> Result<Vec<CameraUnit>, CameraError> {
        let units = self
            .config
            .units
            .iter()
            .copied()
            .filter(|unit| feature != CameraFeature::Video || !self.config.no_video.contains(unit))
            .collect();
        Ok(units)
    }

    fn open(&mut self, unit: CameraUnit, mode: OpenMode) -> Result<CameraHandle, CameraError> {
        self.journal.record(Call::Open(unit));
        if self.faulty(Fault::Open) || !self.config.units.contains(&unit) {
            return Err(CameraError::Unavailable(unit));
        }
        if self.devices.values().any(|d| d.unit == unit) {
            return Err(CameraError::Busy);
        }

        let handle = CameraHandle(self.next_handle);
        self.next_handle += 1;
        self.devices.insert(
            handle,
            Device {
                unit,
                mode,
                viewfinder_running: false,
                recording: None,
                on_status: None,
            },
        );
        debug!(%unit, ?mode, ?handle, "camera opened");
        Ok(handle)
    }

    fn set_viewfinder_properties(
        &mut self,
        handle: CameraHandle,
        properties: &[ViewfinderProperty],
    ) -> Result<(), CameraError> {
        self.journal
            .record(Call::SetViewfinderProperties(properties.to_vec()));
        let faulty = self.faulty(Fault::Configure);
        self.device(handle)?;
        if faulty {
            return Err(CameraError::InvalidArgument(
                "viewfinder properties out of range".to_owned(),
            ));
        }
        Ok(())
    }

    fn start_viewfinder(
        &mut self,
        handle: CameraHandle,
        on_status: StatusCallback,
    ) -> Result<(), CameraError> {
        self.journal.record(Call::StartViewfinder);
        let faulty = self.faulty(Fault::Viewfinder);
        let device = self.device(handle)?;
        if faulty {
            return Err(CameraError::Busy);
        }
        device.viewfinder_running = true;
        device.on_status = Some(on_status);
        device.notify(DeviceStatus::Viewfinder, 1);

        let window = WindowHandle(self.next_window);
        self.next_window += 1;
        let event = Event::Screen(ScreenEvent::WindowCreated {
            window: Some(window),
        });
        if self.events.send(event).is_err() {
            debug!(%window, "nobody listening for the viewfinder window");
        }
        Ok(())
    }

    fn stop_viewfinder(&mut self, handle: CameraHandle) -> Result<(), CameraError> {
        self.journal.record(Call::StopViewfinder);
        let device = self.device(handle)?;
        device.viewfinder_running = false;
        device.notify(DeviceStatus::Viewfinder, 0);
        Ok(())
    }

    fn close(&mut self, handle: CameraHandle) -> Result<(), CameraError> {
        self.journal.record(Call::CloseCamera);
        let device = self
            .devices
            .remove(&handle)
            .ok_or(CameraError::InvalidHandle)?;
        if device.viewfinder_running || device.recording.is_some() {
            warn!(?handle, "camera closed while still streaming");
        }
        Ok(())
    }

    fn roll_open_video(
        &mut self,
        handle: CameraHandle,
        format: VideoFormat,
    ) -> Result<RollVideo, CameraError> {
        self.journal.record(Call::RollOpenVideo);
        let faulty = self.faulty(Fault::RollOpen);
        if !self.device(handle)?.mode.contains(OpenMode::ROLL) {
            return Err(CameraError::Mode);
        }
        if faulty {
            return Err(CameraError::Io(io::Error::other("camera roll is full")));
        }

        fs::create_dir_all(&self.config.roll_dir)?;
        let path = self.roll_path(format);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(RollVideo::new(file, path))
    }

    fn start_video(&mut self, handle: CameraHandle, path: &Path) -> Result<(), CameraError> {
        self.journal.record(Call::StartVideo(path.to_path_buf()));
        let faulty = self.faulty(Fault::StartVideo);
        let device = self.device(handle)?;
        if faulty || device.recording.is_some() {
            return Err(CameraError::Busy);
        }
        if !device.viewfinder_running {
            return Err(CameraError::InvalidArgument(
                "viewfinder is not running".to_owned(),
            ));
        }
        device.recording = Some(path.to_path_buf());
        device.notify(DeviceStatus::RecordingStarted, 0);
        Ok(())
    }

    fn stop_video(&mut self, handle: CameraHandle) -> Result<(), CameraError> {
        self.journal.record(Call::StopVideo);
        let device = self.device(handle)?;
        if device.recording.take().is_none() {
            return Err(CameraError::InvalidArgument("not recording".to_owned()));
        }
        device.notify(DeviceStatus::RecordingStopped, 0);
        Ok(())
    }
}

#[derive(Debug)]
pub struct SimSoundPlayer {
    journal: Journal,
}

impl SimSoundPlayer {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl SoundPlayer for SimSoundPlayer {
    fn play(&mut self, cue: Cue) {
        info!(%cue, "playing sound");
        self.journal.record(Call::Play(cue));
    }
}

/// Compositor step that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenFault {
    CreateWindow,
    SetProperty,
}

#[derive(Debug)]
pub struct SimCompositor {
    journal: Journal,
    windows: HashSet<WindowHandle>,
    next_window: u32,
    events_stopped: bool,
    faults: Vec<ScreenFault>,
}

impl SimCompositor {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            windows: HashSet::new(),
            next_window: 1,
            events_stopped: false,
            faults: Vec::new(),
        }
    }

    pub fn with_fault(mut self, fault: ScreenFault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Windows this compositor created that have not been destroyed.
    pub fn live_windows(&self) -> usize {
        self.windows.len()
    }

    pub fn events_stopped(&self) -> bool {
        self.events_stopped
    }
}

impl Compositor for SimCompositor {
    fn create_window(&mut self) -> Result<WindowHandle> {
        if self.faults.contains(&ScreenFault::CreateWindow) {
            return Err(Error::Screen("no display available".to_owned()));
        }
        let window = WindowHandle(self.next_window);
        self.next_window += 1;
        self.windows.insert(window);
        self.journal.record(Call::CreateWindow(window));
        Ok(window)
    }

    fn create_window_group(&mut self, _window: WindowHandle, group: &str) -> Result<()> {
        self.journal.record(Call::CreateWindowGroup(group.to_owned()));
        Ok(())
    }

    fn fill_and_post(&mut self, window: WindowHandle, color: u32) -> Result<()> {
        self.journal.record(Call::FillAndPost(window, color));
        Ok(())
    }

    fn set_property(&mut self, window: WindowHandle, property: WindowProperty) -> Result<()> {
        self.journal.record(Call::SetProperty(window, property));
        if self.faults.contains(&ScreenFault::SetProperty) {
            return Err(Error::Screen(format!("{window} property is immutable")));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.journal.record(Call::Flush);
        Ok(())
    }

    fn stop_events(&mut self) {
        self.events_stopped = true;
        self.journal.record(Call::StopEvents);
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        self.windows.remove(&window);
        self.journal.record(Call::DestroyWindow(window));
    }
}

/// Replays a fixed script, but lets service notifications already waiting on
/// `pending` go first. Once both run dry it reports exit.
#[derive(Debug)]
pub struct ScriptedEventSource {
    pending: Receiver<Event>,
    script: VecDeque<Event>,
}

impl ScriptedEventSource {
    pub fn new(pending: Receiver<Event>, script: impl IntoIterator<Item = Event>) -> Self {
        Self {
            pending,
            script: script.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEventSource {
    fn next_event(&mut self) -> Option<Event> {
        if let Ok(event) = self.pending.try_recv() {
            return Some(event);
        }
        Some(
            self.script
                .pop_front()
                .unwrap_or(Event::Navigator(NavigatorEvent::Exit)),
        )
    }
}
