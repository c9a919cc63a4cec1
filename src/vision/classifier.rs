//! Discrete gesture classification from finger up/down states.

use crate::types::{
    GestureSymbol, HandObservation, Side, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP,
    PINKY_TIP, RING_PIP, RING_TIP,
};

/// Up/down state of the four non-thumb fingers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub const fn new(index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            index,
            middle,
            ring,
            pinky,
        }
    }
}

/// Smaller y is higher in the image, so a finger is up when its tip sits
/// above its second joint by more than `margin`.
pub(crate) fn finger_up(hand: &HandObservation, tip: usize, pip: usize, margin: f32) -> bool {
    hand.keypoint(tip).y < hand.keypoint(pip).y - margin
}

pub(crate) fn finger_state(hand: &HandObservation, margin: f32) -> FingerState {
    FingerState {
        index: finger_up(hand, INDEX_TIP, INDEX_PIP, margin),
        middle: finger_up(hand, MIDDLE_TIP, MIDDLE_PIP, margin),
        ring: finger_up(hand, RING_TIP, RING_PIP, margin),
        pinky: finger_up(hand, PINKY_TIP, PINKY_PIP, margin),
    }
}

/// Map a side and finger state to a gesture. Arms are checked top to bottom;
/// the all-fingers arm must stay ahead of the index+middle arms.
pub fn gesture_for(side: Side, f: FingerState) -> GestureSymbol {
    use GestureSymbol::*;

    match (side, f.index, f.middle, f.ring, f.pinky) {
        (Side::Right, false, false, false, true) => Quit,
        (Side::Left, false, false, false, true) => Subtitle,
        (Side::Right, false, true, true, true) => Mute,
        (Side::Left, false, true, true, true) => Fullscreen,
        (_, true, true, true, true) => PlayPause,
        (Side::Right, true, true, false, false) => SeekFwd,
        (Side::Left, true, true, false, false) => SeekRev,
        (Side::Right, true, false, false, false) => VolDown,
        (Side::Left, true, false, false, false) => VolUp,
        _ => None,
    }
}

/// Classify a camera-facing hand. Malformed hands are `None`.
pub fn classify(hand: &HandObservation, side: Side, margin: f32) -> GestureSymbol {
    if hand.validate().is_err() {
        return GestureSymbol::None;
    }
    gesture_for(side, finger_state(hand, margin))
}
