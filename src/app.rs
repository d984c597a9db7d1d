use tracing::{error, info};

use crate::audio::SoundPlayer;
use crate::camera::{self, CameraService, CameraStatus};
use crate::config::AppConfig;
use crate::error::Result;
use crate::event::{self, EventSource};
use crate::machine;
use crate::screen::{self, Compositor};
use crate::state::{AppContext, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// False when camera initialization failed and the loop never ran.
    pub camera_ready: bool,
    /// State when the exit event was handled, before cleanup.
    pub final_state: AppState,
    pub recordings: u32,
}

fn log_status(status: CameraStatus) {
    info!(status = ?status.status, extra = status.extra, "status notification");
}

/// Runs the whole application: background window, camera, main loop, cleanup.
///
/// A camera that fails to initialize is not an error here; the window is
/// still torn down and the run ends normally.
pub fn run<C, S, W, E>(
    config: &AppConfig,
    camera: &mut C,
    sound: &mut S,
    screen: &mut W,
    events: &mut E,
) -> Result<RunSummary>
where
    C: CameraService + ?Sized,
    S: SoundPlayer + ?Sized,
    W: Compositor + ?Sized,
    E: EventSource + ?Sized,
{
    let background = screen::create_background(screen, config)?;
    let mut ctx = AppContext::new();
    let mut summary = RunSummary::default();

    match camera::init_camera(camera, config, Box::new(log_status)) {
        Ok(open) => {
            ctx.camera = Some(open.handle);
            ctx.mirror = open.mirror;
            summary.camera_ready = true;

            while !ctx.shutdown_requested() {
                let before = ctx.state;
                machine::run_state_machine(&mut ctx, camera, sound, config.video_format);
                if before != AppState::Recording && ctx.state == AppState::Recording {
                    summary.recordings += 1;
                }

                if let Some(event) = events.next_event() {
                    event::handle_event(&mut ctx, event, screen);
                }
            }

            summary.final_state = ctx.state;
            machine::shutdown_camera(&mut ctx, camera);
        }
        Err(e) => error!(error = %e, "camera initialization failed"),
    }

    screen.stop_events();
    screen.destroy_window(background);
    info!(recordings = summary.recordings, "shut down");
    Ok(summary)
}
