use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::screen::{self, Compositor, WindowHandle};
use crate::state::{AppContext, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Touch,
    Move,
    Release,
    /// A window was created in our group. `window` is `None` when the
    /// property could not be read from the event.
    WindowCreated { window: Option<WindowHandle> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    SwipeDown,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Screen(ScreenEvent),
    Navigator(NavigatorEvent),
}

pub trait EventSource {
    /// Blocks until an event arrives. `None` is a wake-up with nothing to do.
    fn next_event(&mut self) -> Option<Event>;
}

/// Event source fed over an mpsc channel.
#[derive(Debug)]
pub struct ChannelEventSource {
    rx: Receiver<Event>,
    closed: bool,
}

pub fn channel() -> (Sender<Event>, ChannelEventSource) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelEventSource { rx, closed: false })
}

impl EventSource for ChannelEventSource {
    fn next_event(&mut self) -> Option<Event> {
        match self.rx.recv() {
            Ok(event) => Some(event),
            // Every producer is gone, nothing can ever arrive again.
            Err(_) if !self.closed => {
                warn!("event channel closed, requesting exit");
                self.closed = true;
                Some(Event::Navigator(NavigatorEvent::Exit))
            }
            Err(_) => None,
        }
    }
}

/// Maps a terminal command word to an event.
pub fn parse_command(line: &str) -> Option<Event> {
    let event = match line.trim().to_ascii_lowercase().as_str() {
        "touch" | "t" => Event::Screen(ScreenEvent::Touch),
        "move" => Event::Screen(ScreenEvent::Move),
        "release" => Event::Screen(ScreenEvent::Release),
        "swipe" | "swipe-down" => Event::Navigator(NavigatorEvent::SwipeDown),
        "exit" | "quit" | "q" => Event::Navigator(NavigatorEvent::Exit),
        _ => return None,
    };
    Some(event)
}

/// Routes one event by domain and updates the context.
pub fn handle_event<W>(ctx: &mut AppContext, event: Event, screen: &mut W)
where
    W: Compositor + ?Sized,
{
    match event {
        Event::Navigator(nav) => handle_navigator_event(ctx, nav),
        Event::Screen(scr) => handle_screen_event(ctx, scr, screen),
    }
}

fn handle_screen_event<W>(ctx: &mut AppContext, event: ScreenEvent, screen: &mut W)
where
    W: Compositor + ?Sized,
{
    match event {
        ScreenEvent::Touch => {
            debug!("touch event");
            ctx.latch_touch();
        }
        ScreenEvent::Move => debug!("move event"),
        ScreenEvent::Release => debug!("release event"),
        ScreenEvent::WindowCreated { window: None } => {
            warn!(error = %Error::MissingEventProperty("window"), "ignoring window-created event");
        }
        ScreenEvent::WindowCreated { window: Some(window) } => {
            if let Some(existing) = ctx.viewfinder {
                debug!(%window, %existing, "viewfinder already set up, ignoring window");
                return;
            }
            info!(%window, mirror = ctx.mirror, "viewfinder window found");
            screen::present_viewfinder(screen, window, ctx.mirror);
            ctx.viewfinder = Some(window);
            // Touches before the viewfinder was visible are stale.
            ctx.take_touch();
            ctx.state = AppState::Viewfinder;
        }
    }
}

fn handle_navigator_event(ctx: &mut AppContext, event: NavigatorEvent) {
    match event {
        NavigatorEvent::SwipeDown => debug!("swipe down event"),
        NavigatorEvent::Exit => {
            info!("exit event");
            ctx.request_shutdown();
        }
    }
}
