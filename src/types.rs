//! Core data types for the gesture remote

use crate::error::ObservationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of keypoints the pose estimator reports per hand.
pub const KEYPOINT_COUNT: usize = 21;

// Keypoint indices (MediaPipe hand topology).
pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// A single hand keypoint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate (normalized 0.0-1.0, left to right)
    pub x: f32,
    /// Y coordinate (normalized 0.0-1.0, top to bottom)
    pub y: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn in_frame(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }
}

/// One detected hand for the current cycle.
///
/// The estimator's own handedness label is never carried here; side is
/// derived from position by the laterality resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub keypoints: Vec<Keypoint>,
}

impl HandObservation {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// Check keypoint count and that every coordinate lies inside the frame.
    pub fn validate(&self) -> Result<(), ObservationError> {
        if self.keypoints.len() != KEYPOINT_COUNT {
            return Err(ObservationError::KeypointCount {
                expected: KEYPOINT_COUNT,
                found: self.keypoints.len(),
            });
        }

        if let Some(index) = self.keypoints.iter().position(|kp| !kp.in_frame()) {
            let kp = self.keypoints[index];
            return Err(ObservationError::OutOfRange {
                index,
                x: kp.x,
                y: kp.y,
            });
        }

        Ok(())
    }

    /// Keypoint at a fixed semantic index. Callers validate first.
    pub(crate) fn keypoint(&self, index: usize) -> Keypoint {
        self.keypoints[index]
    }

    pub(crate) fn wrist(&self) -> Keypoint {
        self.keypoint(WRIST)
    }
}

/// Which side of the frame a hand was seen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// How the confirmation engine treats a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// No hand, or no recognised pose.
    Idle,
    /// Fires once on the entry edge.
    OneShot,
    /// Needs a double trigger before it acts.
    Repeatable,
}

/// The closed gesture vocabulary. Exactly one is authoritative per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureSymbol {
    #[default]
    None,
    Quit,
    Subtitle,
    Mute,
    Fullscreen,
    PlayPause,
    SeekFwd,
    SeekRev,
    VolUp,
    VolDown,
}

impl GestureSymbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Quit => "QUIT",
            Self::Subtitle => "SUBTITLE",
            Self::Mute => "MUTE",
            Self::Fullscreen => "FULLSCREEN",
            Self::PlayPause => "PLAY_PAUSE",
            Self::SeekFwd => "SEEK_FWD",
            Self::SeekRev => "SEEK_REV",
            Self::VolUp => "VOL_UP",
            Self::VolDown => "VOL_DOWN",
        }
    }

    pub fn kind(&self) -> GestureKind {
        match self {
            Self::None => GestureKind::Idle,
            Self::Quit | Self::Subtitle | Self::Mute | Self::Fullscreen => GestureKind::OneShot,
            Self::PlayPause | Self::SeekFwd | Self::SeekRev | Self::VolUp | Self::VolDown => {
                GestureKind::Repeatable
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Repeatable gestures that unlock throttled repeats once confirmed.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::SeekFwd | Self::SeekRev | Self::VolUp | Self::VolDown)
    }
}

impl fmt::Display for GestureSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key tap understood by every key sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable ASCII key (lowercase letter or digit).
    Char(char),
    Space,
    ArrowLeft,
    ArrowRight,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "'{}'", c),
            Key::Space => f.write_str("space"),
            Key::ArrowLeft => f.write_str("left-arrow"),
            Key::ArrowRight => f.write_str("right-arrow"),
        }
    }
}

/// Why the engine asked for a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// One-shot gesture entered.
    Edge,
    /// PLAY_PAUSE double trigger confirmed.
    Confirmed,
    /// Throttled repeat of an unlocked continuous gesture.
    Repeat,
}

/// A confirmed or throttled action for the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub gesture: GestureSymbol,
    pub trigger: Trigger,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand(x: f32, y: f32) -> HandObservation {
        HandObservation::new(vec![Keypoint::new(x, y); KEYPOINT_COUNT])
    }

    #[test]
    fn validate_accepts_in_frame_hand() {
        assert!(flat_hand(0.3, 0.7).validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_hand() {
        let hand = HandObservation::new(vec![Keypoint::new(0.5, 0.5); 5]);
        assert!(matches!(
            hand.validate(),
            Err(ObservationError::KeypointCount { expected: 21, found: 5 })
        ));
    }

    #[test]
    fn validate_rejects_nan_and_out_of_frame() {
        let mut hand = flat_hand(0.5, 0.5);
        hand.keypoints[7] = Keypoint::new(f32::NAN, 0.5);
        assert!(matches!(hand.validate(), Err(ObservationError::OutOfRange { index: 7, .. })));

        let mut hand = flat_hand(0.5, 0.5);
        hand.keypoints[20] = Keypoint::new(0.5, 1.2);
        assert!(matches!(hand.validate(), Err(ObservationError::OutOfRange { index: 20, .. })));
    }

    #[test]
    fn gesture_kinds() {
        assert_eq!(GestureSymbol::None.kind(), GestureKind::Idle);
        assert_eq!(GestureSymbol::Mute.kind(), GestureKind::OneShot);
        assert_eq!(GestureSymbol::PlayPause.kind(), GestureKind::Repeatable);
        assert!(!GestureSymbol::PlayPause.is_continuous());
        assert!(GestureSymbol::SeekRev.is_continuous());
    }

    #[test]
    fn gesture_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&GestureSymbol::PlayPause).unwrap();
        assert_eq!(json, "\"PLAY_PAUSE\"");
    }
}
