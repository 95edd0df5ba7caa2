use std::fmt;

use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Camera transitions requested by background threads. The device handle is
/// only ever touched from the tick thread, so voice commands route camera
/// work through the queue instead of calling the controller directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraRequest {
    Start,
    Stop,
    /// Save the most recent frame to disk.
    Snapshot,
}

/// One timestamped console line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl LogEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// Events delivered to the UI-owning thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Log(LogEntry),
    Status(String),
    Camera(CameraRequest),
}

/// Create the queue: a cloneable producer handle for background threads and
/// a single drain for the UI thread. Unbounded so producers never block.
pub fn channel() -> (EventProducer, EventDrain) {
    let (tx, rx) = unbounded();
    (EventProducer { tx }, EventDrain { rx })
}

#[derive(Clone)]
pub struct EventProducer {
    tx: Sender<UiEvent>,
}

impl EventProducer {
    pub fn push(&self, event: UiEvent) {
        // The channel is unbounded; a send only fails once the drain is gone,
        // which is worth a trace in the process log rather than silence.
        if self.tx.send(event).is_err() {
            log::warn!("ui event dropped: consumer disconnected");
        }
    }

    pub fn log(&self, text: impl Into<String>) {
        self.push(UiEvent::Log(LogEntry::new(text)));
    }

    pub fn status(&self, text: impl Into<String>) {
        self.push(UiEvent::Status(text.into()));
    }

    pub fn camera(&self, request: CameraRequest) {
        self.push(UiEvent::Camera(request));
    }
}

pub struct EventDrain {
    rx: Receiver<UiEvent>,
}

impl EventDrain {
    /// Take every pending event without blocking. FIFO across all producers.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.rx.try_iter().collect()
    }
}
