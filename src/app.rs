use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use crate::{
    camera::{CameraFeed, StartOutcome},
    detect::HandDetector,
    dispatch::Dispatcher,
    events::{CameraRequest, EventDrain, EventProducer, LogEntry, UiEvent},
    motion::GestureDebounce,
    types::{CommandEvent, Frame},
};

/// Where drained events end up. The reference consumer is a terminal; a
/// windowed front end would implement the same two methods.
pub trait Console {
    fn line(&mut self, entry: &LogEntry);
    fn status(&mut self, status: &str);
}

pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn line(&mut self, entry: &LogEntry) {
        println!("{entry}");
    }

    fn status(&mut self, status: &str) {
        println!("-- {status} --");
    }
}

/// The UI-owning thread's state. One `tick()` per render interval: drain the
/// event queue, apply camera transitions, pull a frame, run the gesture
/// pass. Background threads never touch any of this directly; the camera
/// handle and the debounce state live here and only here.
pub struct App {
    camera: CameraFeed,
    detector: Option<Box<dyn HandDetector>>,
    debounce: GestureDebounce,
    dispatcher: Dispatcher,
    events: EventProducer,
    drain: EventDrain,
    console: Box<dyn Console>,
    motion_enabled: bool,
    picture_dir: PathBuf,
    tick_interval: Duration,
    latest_frame: Option<Frame>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        camera: CameraFeed,
        detector: Option<Box<dyn HandDetector>>,
        debounce: GestureDebounce,
        dispatcher: Dispatcher,
        events: EventProducer,
        drain: EventDrain,
        console: Box<dyn Console>,
        motion_enabled: bool,
        picture_dir: PathBuf,
        tick_interval: Duration,
    ) -> Self {
        let motion_enabled = if motion_enabled && detector.is_none() {
            // Capability resolved once at startup; the mode stays off until
            // a detector backend is present.
            events.log("Hand detector unavailable; motion control disabled");
            false
        } else {
            motion_enabled
        };

        Self {
            camera,
            detector,
            debounce,
            dispatcher,
            events,
            drain,
            console,
            motion_enabled,
            picture_dir,
            tick_interval,
            latest_frame: None,
        }
    }

    pub fn motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// One scheduler tick. Events pushed during a tick are applied on the
    /// next one, which keeps the console strictly FIFO across producers.
    pub fn tick(&mut self) {
        for event in self.drain.drain() {
            match event {
                UiEvent::Log(entry) => self.console.line(&entry),
                UiEvent::Status(status) => self.console.status(&status),
                UiEvent::Camera(request) => self.handle_camera_request(request),
            }
        }

        if !self.camera.is_active() {
            return;
        }
        match self.camera.read_frame() {
            Ok(frame) => {
                self.gesture_pass(&frame);
                self.latest_frame = Some(frame);
            }
            Err(err) => {
                // Read failures do not change camera state; the user decides
                // whether to stop or retry.
                log::warn!("camera read failed: {err}");
                self.events.log(format!("Camera read failed: {err}"));
            }
        }
    }

    /// Run ticks at a fixed cadence until the stop flag flips.
    pub fn run(&mut self, stop: Arc<AtomicBool>) {
        while !stop.load(Ordering::Relaxed) {
            self.tick();
            thread::sleep(self.tick_interval);
        }
        // Apply whatever the background threads logged on their way out.
        self.tick();
        self.camera.stop();
    }

    fn handle_camera_request(&mut self, request: CameraRequest) {
        match request {
            CameraRequest::Start => match self.camera.start() {
                Ok(StartOutcome::Started) => {
                    self.events.log("Camera started successfully");
                    self.events.status("Camera active");
                }
                Ok(StartOutcome::AlreadyActive) => {
                    self.events.log("Camera already started");
                }
                Err(err) => {
                    log::error!("camera start failed: {err}");
                    self.events.log(format!("Failed to start camera: {err}"));
                }
            },
            CameraRequest::Stop => {
                self.camera.stop();
                self.events.log("Camera stopped");
                self.events.status("Ready");
            }
            CameraRequest::Snapshot => {
                if !self.camera.is_active() {
                    self.events.log("Camera not active");
                    return;
                }
                match self.latest_frame.as_ref() {
                    Some(frame) => match save_picture(frame, &self.picture_dir) {
                        Ok(path) => self.events.log(format!(
                            "Picture saved as {}",
                            path.display()
                        )),
                        Err(err) => self.events.log(format!("Failed to save picture: {err}")),
                    },
                    None => self.events.log("No frame captured yet"),
                }
            }
        }
    }

    /// Per-frame gesture step: detect, debounce, dispatch. First detected
    /// hand only. Every failure here is recoverable and scoped to one frame.
    fn gesture_pass(&mut self, frame: &Frame) {
        if !self.motion_enabled {
            return;
        }
        let Some(detector) = self.detector.as_mut() else {
            return;
        };

        let hands = match detector.detect(frame) {
            Ok(hands) => hands,
            Err(err) => {
                log::warn!("hand detection failed: {err:?}");
                self.events.log(format!("Gesture detection failed: {err}"));
                return;
            }
        };

        if let Some(gesture) = self.debounce.advance(hands.first()) {
            let result = self.dispatcher.dispatch(CommandEvent::Gesture(gesture));
            self.events.log(format!(
                "Gesture {}: {}",
                gesture.display_name(),
                result.message
            ));
        }
    }
}

fn save_picture(frame: &Frame, dir: &Path) -> Result<PathBuf> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .context("frame buffer does not match its dimensions")?;
    let path = dir.join(format!("picture_{}.png", Local::now().format("%Y%m%d_%H%M%S")));
    image.save(&path)?;
    Ok(path)
}
