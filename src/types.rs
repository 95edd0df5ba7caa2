use std::time::Instant;

/// One captured camera frame. Never mutated after capture; colour-space
/// conversions happen in the capture backend before the frame is built.
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

/// A single hand keypoint in normalized [0,1] image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Landmark indices as produced by the hand detector (21-point hand model).
pub mod landmark_index {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;
    pub const PINKY_TIP: usize = 20;
    pub const COUNT: usize = 21;
}

/// Ordered landmark set for one detected hand.
#[derive(Clone, Debug)]
pub struct HandLandmarkSet {
    points: Vec<Landmark>,
}

impl HandLandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Thumb, index, middle, ring and pinky tips, in that order.
    /// `None` when the set is too short to carry all five.
    pub fn fingertips(&self) -> Option<[&Landmark; 5]> {
        Some([
            self.points.get(landmark_index::THUMB_TIP)?,
            self.points.get(landmark_index::INDEX_TIP)?,
            self.points.get(landmark_index::MIDDLE_TIP)?,
            self.points.get(landmark_index::RING_TIP)?,
            self.points.get(landmark_index::PINKY_TIP)?,
        ])
    }
}

/// Discrete gesture labels produced by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    ThumbsDown,
    PointingUp,
    OpenPalm,
    /// A hand was detected but matched no known posture.
    Unknown,
    /// No hand landmarks were available for this frame.
    None,
}

impl Gesture {
    pub fn display_name(&self) -> &'static str {
        match self {
            Gesture::ThumbsDown => "thumbs down",
            Gesture::PointingUp => "pointing up",
            Gesture::OpenPalm => "open palm",
            Gesture::Unknown => "unknown",
            Gesture::None => "none",
        }
    }
}

/// A unit of intent headed for the dispatcher, from either input channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandEvent {
    Voice(String),
    Gesture(Gesture),
}

/// Outcome of dispatching one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
