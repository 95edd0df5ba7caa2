use crate::classify::classify;
use crate::types::{Gesture, HandLandmarkSet};

/// Default cooldown, in processed frames, before another gesture may fire.
/// At camera cadence this is roughly a one-second window.
pub const DEFAULT_COOLDOWN_TICKS: u32 = 20;

/// Per-session debounce state for the gesture loop.
///
/// Driven once per rendered frame from the tick thread; nothing else touches
/// it, so it carries no lock. Classification only runs while the cooldown is
/// spent, an emission requires a label different from the last one (a held
/// pose never re-fires), and every frame decrements the countdown exactly
/// once, floored at zero. A fresh emission resets the countdown immediately
/// and the same-tick decrement then applies, so the window reopens after
/// `cooldown_ticks` further frames.
pub struct GestureDebounce {
    cooldown_ticks: u32,
    last_gesture: Gesture,
    cooldown: u32,
}

impl GestureDebounce {
    pub fn new(cooldown_ticks: u32) -> Self {
        Self {
            cooldown_ticks,
            last_gesture: Gesture::None,
            cooldown: 0,
        }
    }

    /// Process one frame's worth of detection output (first detected hand
    /// only; additional hands are ignored upstream). Returns the gesture to
    /// dispatch, if this frame fires one.
    pub fn advance(&mut self, hand: Option<&HandLandmarkSet>) -> Option<Gesture> {
        let mut fired = None;

        if self.cooldown == 0 {
            let gesture = classify(hand);
            if gesture != self.last_gesture
                && !matches!(gesture, Gesture::Unknown | Gesture::None)
            {
                self.last_gesture = gesture;
                self.cooldown = self.cooldown_ticks;
                fired = Some(gesture);
            }
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        fired
    }

    pub fn last_gesture(&self) -> Gesture {
        self.last_gesture
    }
}
