use tracing::{error, info, warn};

use crate::audio::{Cue, SoundPlayer};
use crate::camera::{CameraHandle, CameraService, VideoFormat};
use crate::state::{AppContext, AppState};

/// One step of the control state machine. Consumes a pending touch, if any.
pub fn run_state_machine<C, S>(
    ctx: &mut AppContext,
    camera: &mut C,
    sound: &mut S,
    format: VideoFormat,
) where
    C: CameraService + ?Sized,
    S: SoundPlayer + ?Sized,
{
    let Some(handle) = ctx.camera else {
        return;
    };

    match ctx.state {
        // Waiting for the viewfinder window; event dispatch moves us on.
        AppState::Startup => {}
        AppState::Viewfinder => {
            if ctx.take_touch() {
                start_recording(ctx, handle, camera, sound, format);
            }
        }
        AppState::Recording => {
            if ctx.take_touch() {
                stop_recording(ctx, handle, camera);
                sound.play(Cue::RecordingStop);
                ctx.state = AppState::Viewfinder;
            }
        }
    }
}

fn start_recording<C, S>(
    ctx: &mut AppContext,
    handle: CameraHandle,
    camera: &mut C,
    sound: &mut S,
    format: VideoFormat,
) where
    C: CameraService + ?Sized,
    S: SoundPlayer + ?Sized,
{
    let video = match camera.roll_open_video(handle, format) {
        Ok(video) => video,
        Err(e) => {
            error!(error = %e, "roll_open_video() failed");
            return;
        }
    };

    // Played before recording starts so the cue does not end up in the video.
    sound.play(Cue::RecordingStart);

    if let Err(e) = camera.start_video(handle, video.path()) {
        error!(error = %e, path = %video.path().display(), "start_video() failed");
        // Never leave an empty file on the roll.
        if let Err(e) = video.discard() {
            warn!(error = %e, "failed to delete unused video file");
        }
        sound.play(Cue::RecordingStop);
        return;
    }

    info!(path = %video.path().display(), "recording started");
    ctx.recording = Some(video);
    ctx.state = AppState::Recording;
}

fn stop_recording<C>(ctx: &mut AppContext, handle: CameraHandle, camera: &mut C)
where
    C: CameraService + ?Sized,
{
    if let Err(e) = camera.stop_video(handle) {
        warn!(error = %e, "stop_video() failed");
    }
    if let Some(video) = ctx.recording.take() {
        let path = video.close();
        info!(path = %path.display(), "recording finished");
    }
}

/// Cleanup after the loop exits: stops any recording, then the viewfinder,
/// then closes the camera. No cues are played.
pub fn shutdown_camera<C>(ctx: &mut AppContext, camera: &mut C)
where
    C: CameraService + ?Sized,
{
    let Some(handle) = ctx.camera else {
        return;
    };

    if ctx.state == AppState::Recording {
        stop_recording(ctx, handle, camera);
        ctx.state = AppState::Viewfinder;
    }

    if let Err(e) = camera.stop_viewfinder(handle) {
        warn!(error = %e, "stop_viewfinder() failed");
    }
    if let Err(e) = camera.close(handle) {
        warn!(error = %e, "close() failed");
    }
    ctx.camera = None;
}
