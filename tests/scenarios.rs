use std::path::Path;
use std::sync::mpsc;

use recordvideo::audio::Cue;
use recordvideo::camera::{CameraStatus, CameraUnit, DeviceStatus};
use recordvideo::event::{Event, NavigatorEvent, ScreenEvent};
use recordvideo::screen::{WindowHandle, WindowProperty};
use recordvideo::sim::{
    Call, Fault, Journal, ScreenFault, ScriptedEventSource, SimCamera, SimCameraConfig,
    SimCompositor, SimSoundPlayer,
};
use recordvideo::{AppConfig, AppState, Error, RunSummary};

const TOUCH: Event = Event::Screen(ScreenEvent::Touch);
const EXIT: Event = Event::Navigator(NavigatorEvent::Exit);

struct Outcome {
    summary: RunSummary,
    journal: Journal,
    camera: SimCamera,
    screen: SimCompositor,
}

fn run_script(
    roll_dir: &Path,
    units: Vec<CameraUnit>,
    faults: Vec<Fault>,
    script: Vec<Event>,
) -> Outcome {
    let journal = Journal::default();
    let (tx, rx) = mpsc::channel();
    let config = SimCameraConfig {
        units,
        roll_dir: roll_dir.to_path_buf(),
        faults,
        ..SimCameraConfig::default()
    };
    let mut camera = SimCamera::new(config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal.clone());
    let mut events = ScriptedEventSource::new(rx, script);

    let summary = recordvideo::run(
        &AppConfig::default(),
        &mut camera,
        &mut sound,
        &mut screen,
        &mut events,
    )
    .unwrap();

    Outcome {
        summary,
        journal,
        camera,
        screen,
    }
}

fn roll_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn record_one_clip_then_exit() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        dir.path(),
        vec![CameraUnit::Rear],
        vec![],
        vec![TOUCH, TOUCH, EXIT],
    );

    assert!(out.summary.camera_ready);
    assert_eq!(out.summary.recordings, 1);
    assert_eq!(out.summary.final_state, AppState::Viewfinder);
    assert_eq!(out.journal.sounds(), vec![Cue::RecordingStart, Cue::RecordingStop]);

    let files = roll_files(dir.path());
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "mp4");

    assert_eq!(out.journal.count(|c| *c == Call::StopViewfinder), 1);
    assert_eq!(out.journal.count(|c| *c == Call::CloseCamera), 1);
    assert_eq!(out.camera.open_handles(), 0);
    assert_eq!(out.screen.live_windows(), 0);
    assert!(out.screen.events_stopped());
}

#[test]
fn viewfinder_is_layered_above_background() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), vec![CameraUnit::Rear], vec![], vec![EXIT]);

    let calls = out.journal.calls();
    assert_eq!(calls[0], Call::CreateWindow(WindowHandle(1)));
    assert!(calls.contains(&Call::CreateWindowGroup("viewfinder_window_group".to_owned())));
    assert!(calls.contains(&Call::SetProperty(WindowHandle(1), WindowProperty::ZOrder(100))));
    assert!(calls.contains(&Call::SetProperty(WindowHandle(1000), WindowProperty::ZOrder(1))));
    assert!(calls.contains(&Call::SetProperty(WindowHandle(1000), WindowProperty::Mirror(false))));
    assert!(calls.contains(&Call::SetProperty(WindowHandle(1000), WindowProperty::Visible(true))));
}

#[test]
fn front_camera_mirrors_viewfinder() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), vec![CameraUnit::Front], vec![], vec![EXIT]);
    assert!(out
        .journal
        .contains(|c| *c == Call::SetProperty(WindowHandle(1000), WindowProperty::Mirror(true))));
}

#[test]
fn each_touch_pair_records_a_separate_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        dir.path(),
        vec![CameraUnit::Rear],
        vec![],
        vec![TOUCH, TOUCH, TOUCH, TOUCH, TOUCH, TOUCH, EXIT],
    );
    assert_eq!(out.summary.recordings, 3);
    assert_eq!(roll_files(dir.path()).len(), 3);
    assert_eq!(out.journal.count(|c| matches!(c, Call::StartVideo(_))), 3);
    assert_eq!(out.journal.count(|c| *c == Call::StopVideo), 3);
}

#[test]
fn exit_while_recording_stops_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(dir.path(), vec![CameraUnit::Rear], vec![], vec![TOUCH, EXIT]);

    assert_eq!(out.summary.final_state, AppState::Recording);
    assert_eq!(out.journal.sounds(), vec![Cue::RecordingStart]);
    assert_eq!(roll_files(dir.path()).len(), 1);

    let calls = out.journal.calls();
    let stop_video = calls.iter().position(|c| *c == Call::StopVideo).unwrap();
    let stop_vf = calls.iter().position(|c| *c == Call::StopViewfinder).unwrap();
    let close = calls.iter().position(|c| *c == Call::CloseCamera).unwrap();
    assert!(stop_video < stop_vf && stop_vf < close);
    assert_eq!(out.camera.open_handles(), 0);
}

#[test]
fn roll_open_failure_never_records() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        dir.path(),
        vec![CameraUnit::Rear],
        vec![Fault::RollOpen],
        vec![TOUCH, TOUCH, EXIT],
    );
    assert_eq!(out.summary.recordings, 0);
    assert_eq!(out.summary.final_state, AppState::Viewfinder);
    assert!(out.journal.sounds().is_empty());
    assert!(roll_files(dir.path()).is_empty());
    assert!(!out.journal.contains(|c| matches!(c, Call::StartVideo(_))));
}

#[test]
fn start_failure_leaves_no_file_behind() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        dir.path(),
        vec![CameraUnit::Rear],
        vec![Fault::StartVideo],
        vec![TOUCH, EXIT],
    );
    assert_eq!(out.summary.final_state, AppState::Viewfinder);
    assert!(roll_files(dir.path()).is_empty());
    assert_eq!(out.journal.sounds(), vec![Cue::RecordingStart, Cue::RecordingStop]);
    assert!(!out.journal.contains(|c| *c == Call::StopVideo));
}

#[test]
fn camera_open_failure_skips_loop_but_cleans_up_window() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        dir.path(),
        vec![CameraUnit::Rear],
        vec![Fault::Open],
        vec![TOUCH, EXIT],
    );

    assert!(!out.summary.camera_ready);
    assert_eq!(out.summary.recordings, 0);
    assert!(out.journal.sounds().is_empty());
    assert!(!out.journal.contains(|c| *c == Call::StartViewfinder));
    assert!(out.journal.contains(|c| *c == Call::DestroyWindow(WindowHandle(1))));
    assert!(out.screen.events_stopped());
    assert_eq!(out.screen.live_windows(), 0);
}

#[test]
fn no_video_capable_unit_is_an_init_failure() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::default();
    let (tx, rx) = mpsc::channel();
    let config = SimCameraConfig {
        units: vec![CameraUnit::Rear],
        no_video: vec![CameraUnit::Rear],
        roll_dir: dir.path().to_path_buf(),
        faults: vec![],
    };
    let mut camera = SimCamera::new(config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal.clone());
    let mut events = ScriptedEventSource::new(rx, vec![EXIT]);

    let summary = recordvideo::run(
        &AppConfig::default(),
        &mut camera,
        &mut sound,
        &mut screen,
        &mut events,
    )
    .unwrap();

    assert!(!summary.camera_ready);
    assert!(!journal.contains(|c| matches!(c, Call::Open(_))));
    assert_eq!(screen.live_windows(), 0);
}

#[test]
fn touches_before_viewfinder_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::default();
    let (tx, rx) = mpsc::channel();
    let config = SimCameraConfig {
        units: vec![CameraUnit::Rear],
        roll_dir: dir.path().to_path_buf(),
        ..SimCameraConfig::default()
    };
    // The touch is queued ahead of the window-created notification.
    tx.send(TOUCH).unwrap();
    let mut camera = SimCamera::new(config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal.clone());
    let mut events = ScriptedEventSource::new(rx, vec![EXIT]);

    let summary = recordvideo::run(
        &AppConfig::default(),
        &mut camera,
        &mut sound,
        &mut screen,
        &mut events,
    )
    .unwrap();

    assert_eq!(summary.recordings, 0);
    assert_eq!(summary.final_state, AppState::Viewfinder);
    assert!(roll_files(dir.path()).is_empty());
}

#[test]
fn exit_before_viewfinder_still_closes_camera() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::default();
    // Drop the receiver side of the notification channel so the
    // window-created event never reaches the loop.
    let (tx, _) = mpsc::channel();
    let (_unused, rx) = mpsc::channel();
    let config = SimCameraConfig {
        units: vec![CameraUnit::Rear],
        roll_dir: dir.path().to_path_buf(),
        ..SimCameraConfig::default()
    };
    let mut camera = SimCamera::new(config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal.clone());
    let mut events = ScriptedEventSource::new(rx, vec![TOUCH, EXIT]);

    let summary = recordvideo::run(
        &AppConfig::default(),
        &mut camera,
        &mut sound,
        &mut screen,
        &mut events,
    )
    .unwrap();

    assert_eq!(summary.final_state, AppState::Startup);
    assert_eq!(summary.recordings, 0);
    assert!(journal.contains(|c| *c == Call::StopViewfinder));
    assert!(journal.contains(|c| *c == Call::CloseCamera));
    assert_eq!(camera.open_handles(), 0);
}

#[test]
fn status_callback_sees_recording_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (events_tx, _events_rx) = mpsc::channel();
    let (status_tx, status_rx) = mpsc::channel::<CameraStatus>();
    let config = SimCameraConfig {
        units: vec![CameraUnit::Rear],
        roll_dir: dir.path().to_path_buf(),
        ..SimCameraConfig::default()
    };
    let mut camera = SimCamera::new(config, events_tx, Journal::default());

    let open = recordvideo::camera::init_camera(
        &mut camera,
        &AppConfig::default(),
        Box::new(move |status| {
            let _ = status_tx.send(status);
        }),
    )
    .unwrap();

    let mut ctx = recordvideo::AppContext::new();
    ctx.camera = Some(open.handle);
    ctx.state = AppState::Viewfinder;
    let mut sound = SimSoundPlayer::new(Journal::default());
    for _ in 0..2 {
        ctx.latch_touch();
        recordvideo::machine::run_state_machine(
            &mut ctx,
            &mut camera,
            &mut sound,
            recordvideo::camera::VideoFormat::Mp4,
        );
    }

    let statuses: Vec<DeviceStatus> = status_rx.try_iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            DeviceStatus::Viewfinder,
            DeviceStatus::RecordingStarted,
            DeviceStatus::RecordingStopped,
        ]
    );
}

#[test]
fn background_window_failure_aborts_before_camera() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::default();
    let (tx, rx) = mpsc::channel();
    let config = SimCameraConfig {
        units: vec![CameraUnit::Rear],
        roll_dir: dir.path().to_path_buf(),
        ..SimCameraConfig::default()
    };
    let mut camera = SimCamera::new(config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal.clone()).with_fault(ScreenFault::CreateWindow);
    let mut events = ScriptedEventSource::new(rx, vec![TOUCH, EXIT]);

    let err = recordvideo::run(
        &AppConfig::default(),
        &mut camera,
        &mut sound,
        &mut screen,
        &mut events,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Screen(_)));
    assert!(!journal.contains(|c| matches!(c, Call::Open(_))));
    assert_eq!(camera.open_handles(), 0);
}
