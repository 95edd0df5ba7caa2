use crate::types::{Gesture, HandLandmarkSet};

/// Thumb-to-index distance below this reads as a pinch/point posture.
const PINCH_THRESHOLD: f32 = 0.05;

/// Map one detected hand to a gesture label.
///
/// Pure and deterministic. Rules are evaluated in priority order and the
/// first match wins; loose geometric tests overlap, so the ordering is part
/// of the contract and must not be rearranged.
pub fn classify(hand: Option<&HandLandmarkSet>) -> Gesture {
    let Some(hand) = hand else {
        return Gesture::None;
    };
    let Some([thumb, index, middle, ring, pinky]) = hand.fingertips() else {
        return Gesture::Unknown;
    };

    // Thumbs down: the thumb tip sits below every other fingertip in image
    // space (y grows downward).
    if thumb.y > index.y && thumb.y > middle.y && thumb.y > ring.y && thumb.y > pinky.y {
        return Gesture::ThumbsDown;
    }

    // Pointing: thumb and index tips pinched together.
    if thumb.distance_2d(index) < PINCH_THRESHOLD {
        return Gesture::PointingUp;
    }

    // Open palm: fingertips splayed top-to-bottom with the thumb out to the
    // left of the index tip.
    if index.y < middle.y && middle.y < ring.y && ring.y < pinky.y && thumb.x < index.x {
        return Gesture::OpenPalm;
    }

    Gesture::Unknown
}
