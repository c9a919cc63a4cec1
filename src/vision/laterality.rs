//! Side and palm orientation for one hand.
//!
//! Side comes from the wrist position, never from the estimator's handedness
//! guess: on a mirrored camera that guess flips between frames, while the
//! wrist position is stable in ordinary one- and two-hand use.

use crate::error::ObservationError;
use crate::types::{HandObservation, Side, INDEX_MCP, PINKY_MCP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Laterality {
    pub side: Side,
    pub facing_camera: bool,
}

pub(crate) fn side_of(hand: &HandObservation, split_x: f32) -> Side {
    if hand.wrist().x < split_x {
        Side::Left
    } else {
        Side::Right
    }
}

/// Palm faces the sensor when the index base is on the thumb side of the
/// pinky base: left of it for a Right hand, right of it for a Left hand.
pub(crate) fn palm_facing_camera(hand: &HandObservation, side: Side) -> bool {
    let index_x = hand.keypoint(INDEX_MCP).x;
    let pinky_x = hand.keypoint(PINKY_MCP).x;
    match side {
        Side::Right => index_x < pinky_x,
        Side::Left => index_x > pinky_x,
    }
}

pub fn resolve(hand: &HandObservation, split_x: f32) -> Result<Laterality, ObservationError> {
    hand.validate()?;
    let side = side_of(hand, split_x);
    Ok(Laterality {
        side,
        facing_camera: palm_facing_camera(hand, side),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Keypoint, KEYPOINT_COUNT, WRIST};

    fn hand(wrist_x: f32, index_base_x: f32, pinky_base_x: f32) -> HandObservation {
        let mut kps = vec![Keypoint::new(wrist_x, 0.8); KEYPOINT_COUNT];
        kps[WRIST] = Keypoint::new(wrist_x, 0.9);
        kps[INDEX_MCP] = Keypoint::new(index_base_x, 0.6);
        kps[PINKY_MCP] = Keypoint::new(pinky_base_x, 0.6);
        HandObservation::new(kps)
    }

    #[test]
    fn side_splits_at_half_frame() {
        assert_eq!(side_of(&hand(0.49, 0.5, 0.4), 0.5), Side::Left);
        assert_eq!(side_of(&hand(0.5, 0.5, 0.6), 0.5), Side::Right);
    }

    #[test]
    fn right_hand_faces_when_index_left_of_pinky() {
        let r = resolve(&hand(0.7, 0.65, 0.75), 0.5).unwrap();
        assert_eq!(r, Laterality { side: Side::Right, facing_camera: true });

        let r = resolve(&hand(0.7, 0.75, 0.65), 0.5).unwrap();
        assert!(!r.facing_camera);
    }

    #[test]
    fn left_hand_condition_is_mirrored() {
        let r = resolve(&hand(0.3, 0.35, 0.25), 0.5).unwrap();
        assert_eq!(r, Laterality { side: Side::Left, facing_camera: true });

        let r = resolve(&hand(0.3, 0.25, 0.35), 0.5).unwrap();
        assert!(!r.facing_camera);
    }

    #[test]
    fn malformed_hand_is_rejected() {
        let short = HandObservation::new(vec![Keypoint::new(0.5, 0.5); 3]);
        assert!(resolve(&short, 0.5).is_err());
    }
}
