use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use recordvideo::camera::{CameraUnit, VideoFormat};
use recordvideo::config::{
    AppConfig, DEFAULT_APP_ZORDER, DEFAULT_VIEWFINDER_WINDOW_ID, DEFAULT_WINDOW_GROUP,
};
use recordvideo::event::{self, Event, NavigatorEvent};
use recordvideo::sim::{Fault, Journal, SimCamera, SimCameraConfig, SimCompositor, SimSoundPlayer};

/// Touch-to-record camera demo. Type `touch` to start or stop recording,
/// `exit` (or EOF) to quit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Camera units, in enumeration order
    #[arg(short, long, value_delimiter = ',', default_value = "rear,front")]
    units: Vec<CameraUnit>,

    /// Units that cannot record video
    #[arg(long, value_delimiter = ',')]
    no_video: Vec<CameraUnit>,

    /// Location of the camera roll
    #[arg(short, long, default_value = "camera-roll")]
    roll_dir: PathBuf,

    /// Make a camera service step fail (repeatable)
    #[arg(long)]
    fail: Vec<Fault>,

    /// Camera roll video format
    #[arg(long, value_enum, default_value_t = VideoFormat::Default)]
    format: VideoFormat,

    /// Window group shared with the viewfinder window
    #[arg(long, default_value = DEFAULT_WINDOW_GROUP)]
    window_group: String,

    /// Id the camera service gives its viewfinder window
    #[arg(long, default_value = DEFAULT_VIEWFINDER_WINDOW_ID)]
    window_id: String,

    /// Z-order of the background window
    #[arg(long, default_value_t = DEFAULT_APP_ZORDER)]
    zorder: i32,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = AppConfig {
        window_group: args.window_group,
        viewfinder_window_id: args.window_id,
        app_zorder: args.zorder,
        video_format: args.format,
    };

    let (tx, mut events) = event::channel();

    // Terminal input stands in for the touch screen.
    let input = tx.clone();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match event::parse_command(&line) {
                Some(event) => {
                    if input.send(event).is_err() {
                        return;
                    }
                }
                None => warn!(command = %line.trim(), "unknown command"),
            }
        }
        let _ = input.send(Event::Navigator(NavigatorEvent::Exit));
    });

    let journal = Journal::default();
    let camera_config = SimCameraConfig {
        units: args.units,
        no_video: args.no_video,
        roll_dir: args.roll_dir,
        faults: args.fail,
    };
    let mut camera = SimCamera::new(camera_config, tx, journal.clone());
    let mut sound = SimSoundPlayer::new(journal.clone());
    let mut screen = SimCompositor::new(journal);

    info!("Starting viewfinder...");
    let summary = recordvideo::run(&config, &mut camera, &mut sound, &mut screen, &mut events)
        .context("Failed to set up the application window")?;

    if !summary.camera_ready {
        warn!("No camera available, nothing was recorded");
    }
    Ok(())
}
