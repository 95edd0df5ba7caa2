use std::process::Command;

use anyhow::Result;

use crate::events::{CameraRequest, EventProducer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeKey {
    Up,
    Down,
    Mute,
}

/// Side-effect sink for dispatched commands. Keeping this behind a trait
/// keeps the dispatcher a pure match table and lets tests record instead of
/// poking at the desktop.
pub trait Actions: Send {
    /// One key press worth of volume change; the dispatcher decides how many
    /// presses a command is worth.
    fn press_volume(&mut self, key: VolumeKey) -> Result<()>;

    /// Positive scrolls up, negative scrolls down.
    fn scroll(&mut self, amount: i32) -> Result<()>;

    fn media_play_pause(&mut self) -> Result<()>;

    /// Launch an application by path.
    fn launch(&mut self, path: &str) -> Result<()>;

    /// Camera transitions go through the event queue so only the tick thread
    /// touches the device handle.
    fn request_camera(&mut self, request: CameraRequest);
}

/// Production sink: drives the desktop through OS utilities and forwards
/// camera requests onto the event queue.
pub struct DesktopActions {
    events: EventProducer,
}

impl DesktopActions {
    pub fn new(events: EventProducer) -> Self {
        Self { events }
    }

    fn run_tool(program: &str, args: &[&str]) -> Result<()> {
        let status = Command::new(program).args(args).status()?;
        anyhow::ensure!(status.success(), "{program} exited with {status}");
        Ok(())
    }
}

impl Actions for DesktopActions {
    fn press_volume(&mut self, key: VolumeKey) -> Result<()> {
        let step = match key {
            VolumeKey::Up => "3%+",
            VolumeKey::Down => "3%-",
            VolumeKey::Mute => "toggle",
        };
        Self::run_tool("amixer", &["-q", "set", "Master", step])
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        let button = if amount >= 0 { "4" } else { "5" };
        let repeat = amount.unsigned_abs().max(1).to_string();
        Self::run_tool("xdotool", &["click", "--repeat", &repeat, button])
    }

    fn media_play_pause(&mut self) -> Result<()> {
        Self::run_tool("playerctl", &["play-pause"])
    }

    fn launch(&mut self, path: &str) -> Result<()> {
        Command::new(path).spawn()?;
        Ok(())
    }

    fn request_camera(&mut self, request: CameraRequest) {
        self.events.camera(request);
    }
}
