//! Shared fixtures and doubles for unit tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Instant;

use crate::actions::{Actions, VolumeKey};
use crate::events::CameraRequest;
use crate::types::{landmark_index, Frame, HandLandmarkSet, Landmark};

/// Build a 21-point hand with the five fingertips placed explicitly and
/// every other landmark at the origin.
pub fn hand_with_tips(tips: [(f32, f32); 5]) -> HandLandmarkSet {
    let mut points = vec![Landmark::new(0.0, 0.0, 0.0); landmark_index::COUNT];
    let indices = [
        landmark_index::THUMB_TIP,
        landmark_index::INDEX_TIP,
        landmark_index::MIDDLE_TIP,
        landmark_index::RING_TIP,
        landmark_index::PINKY_TIP,
    ];
    for (slot, (x, y)) in indices.into_iter().zip(tips) {
        points[slot] = Landmark::new(x, y, 0.0);
    }
    HandLandmarkSet::new(points)
}

pub fn open_palm_hand() -> HandLandmarkSet {
    hand_with_tips([(0.10, 0.42), (0.30, 0.20), (0.40, 0.30), (0.50, 0.40), (0.60, 0.45)])
}

pub fn thumbs_down_hand() -> HandLandmarkSet {
    hand_with_tips([(0.50, 0.90), (0.40, 0.30), (0.50, 0.20), (0.60, 0.30), (0.70, 0.40)])
}

pub fn pinch_hand() -> HandLandmarkSet {
    hand_with_tips([(0.30, 0.40), (0.32, 0.40), (0.40, 0.50), (0.50, 0.60), (0.60, 0.70)])
}

pub fn blank_frame(width: u32, height: u32) -> Frame {
    Frame {
        rgba: vec![0; (width * height * 4) as usize],
        width,
        height,
        timestamp: Instant::now(),
    }
}

/// `Actions` double that records every side effect. Cloning shares the
/// recording, so tests can hand one clone to a dispatcher and keep another
/// for assertions.
#[derive(Clone, Default)]
pub struct RecordingActions {
    inner: Arc<RecordingInner>,
}

#[derive(Default)]
struct RecordingInner {
    volume: Mutex<Vec<VolumeKey>>,
    scrolls: Mutex<Vec<i32>>,
    media_toggles: AtomicUsize,
    launches: Mutex<Vec<String>>,
    camera: Mutex<Vec<CameraRequest>>,
    fail_launch: AtomicBool,
}

impl RecordingActions {
    pub fn fail_launches(&self) {
        self.inner.fail_launch.store(true, Ordering::SeqCst);
    }

    pub fn volume_up_presses(&self) -> usize {
        self.presses(VolumeKey::Up)
    }

    pub fn volume_down_presses(&self) -> usize {
        self.presses(VolumeKey::Down)
    }

    pub fn mute_presses(&self) -> usize {
        self.presses(VolumeKey::Mute)
    }

    fn presses(&self, key: VolumeKey) -> usize {
        self.inner
            .volume
            .lock()
            .unwrap()
            .iter()
            .filter(|k| **k == key)
            .count()
    }

    pub fn media_toggles(&self) -> usize {
        self.inner.media_toggles.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> Vec<String> {
        self.inner.launches.lock().unwrap().clone()
    }

    pub fn camera_requests(&self) -> Vec<CameraRequest> {
        self.inner.camera.lock().unwrap().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.inner.volume.lock().unwrap().is_empty()
            && self.inner.scrolls.lock().unwrap().is_empty()
            && self.media_toggles() == 0
            && self.launches().is_empty()
            && self.camera_requests().is_empty()
    }
}

impl Actions for RecordingActions {
    fn press_volume(&mut self, key: VolumeKey) -> anyhow::Result<()> {
        self.inner.volume.lock().unwrap().push(key);
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> anyhow::Result<()> {
        self.inner.scrolls.lock().unwrap().push(amount);
        Ok(())
    }

    fn media_play_pause(&mut self) -> anyhow::Result<()> {
        self.inner.media_toggles.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn launch(&mut self, path: &str) -> anyhow::Result<()> {
        self.inner.launches.lock().unwrap().push(path.to_string());
        if self.inner.fail_launch.load(Ordering::SeqCst) {
            anyhow::bail!("No such file or directory");
        }
        Ok(())
    }

    fn request_camera(&mut self, request: CameraRequest) {
        self.inner.camera.lock().unwrap().push(request);
    }
}
