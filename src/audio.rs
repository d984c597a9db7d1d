use std::fmt;

// --- Sound Cues ---

// System sound names understood by the platform sound player.
const RECORDING_START: &str = "event_recording_start";
const RECORDING_STOP: &str = "event_recording_stop";

/// The camera service plays nothing on its own; the app has to signal
/// recording start and stop audibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    RecordingStart,
    RecordingStop,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Self::RecordingStart => RECORDING_START,
            Self::RecordingStop => RECORDING_STOP,
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fire-and-forget playback. There is no completion or error reporting.
pub trait SoundPlayer {
    fn play(&mut self, cue: Cue);
}
