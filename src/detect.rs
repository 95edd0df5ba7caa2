use anyhow::{anyhow, Result};

use crate::types::{Frame, HandLandmarkSet};

/// Hand-landmark detector collaborator. The concrete engine is a black box;
/// the pipeline only cares about zero or more landmark sets per frame.
pub trait HandDetector: Send {
    fn name(&self) -> &'static str;

    /// Detect hands in a frame. Errors are per-frame and recoverable; the
    /// caller logs them and moves on to the next tick.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<HandLandmarkSet>>;
}

/// Resolve the detector capability once at startup from the configured
/// backend name. `Ok(None)` means motion control runs in its documented
/// disabled state; camera and voice modes are unaffected. An unrecognized
/// name is a configuration error, not a silent fallback.
pub fn resolve_detector(backend: &str) -> Result<Option<Box<dyn HandDetector>>> {
    match backend {
        "none" => Ok(None),
        "stub" => Ok(Some(Box::new(StubDetector))),
        other => Err(anyhow!("unknown detector backend: {other}")),
    }
}

/// Backend that never reports a hand. Keeps the whole camera/gesture path
/// live on machines without a landmark engine.
pub struct StubDetector;

impl HandDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<HandLandmarkSet>> {
        Ok(Vec::new())
    }
}

/// Replays a fixed per-frame script of detections. Used by tests and demos
/// in place of a real landmark engine.
pub struct ScriptedDetector {
    script: Vec<Vec<HandLandmarkSet>>,
    cursor: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<HandLandmarkSet>>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl HandDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<HandLandmarkSet>> {
        let hands = self.script.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        Ok(hands)
    }
}
