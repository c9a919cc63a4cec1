//! The pose estimator seam, plus a scripted source for tests and demos.

use crate::types::{HandObservation, Keypoint, Side, KEYPOINT_COUNT};
use crate::vision::classifier::FingerState;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Anything that can turn the current frame into hand keypoints.
#[async_trait]
pub trait PoseSource: Send {
    /// Run inference for this cycle.
    ///
    /// `Ok(Some(hands))` is a fresh result (possibly with no hands).
    /// `Ok(None)` means no result was produced this cycle; the caller keeps
    /// its cached result, exactly as on an error.
    async fn detect(&mut self) -> Result<Option<Vec<HandObservation>>>;

    /// Release whatever the source holds.
    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One step of a scripted session
#[derive(Debug, Clone)]
pub enum ScriptFrame {
    Hands(Vec<HandObservation>),
    /// Estimator produced nothing this cycle.
    Missing,
    /// Estimator failed this cycle.
    Fault(String),
}

/// Replays a fixed list of frames, then reports empty scenes.
pub struct ScriptedPoseSource {
    frames: VecDeque<ScriptFrame>,
    looping: bool,
    played: Vec<ScriptFrame>,
}

impl ScriptedPoseSource {
    pub fn new(frames: impl IntoIterator<Item = ScriptFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            looping: false,
            played: Vec::new(),
        }
    }

    /// Start over from the first frame once the script runs out.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl PoseSource for ScriptedPoseSource {
    async fn detect(&mut self) -> Result<Option<Vec<HandObservation>>> {
        if self.frames.is_empty() && self.looping && !self.played.is_empty() {
            self.frames = std::mem::take(&mut self.played).into();
        }

        let Some(frame) = self.frames.pop_front() else {
            return Ok(Some(Vec::new()));
        };
        if self.looping {
            self.played.push(frame.clone());
        }

        match frame {
            ScriptFrame::Hands(hands) => Ok(Some(hands)),
            ScriptFrame::Missing => Ok(None),
            ScriptFrame::Fault(reason) => anyhow::bail!("scripted pose fault: {reason}"),
        }
    }
}

/// Builds plausible keypoints for a hand with the given fingers raised.
///
/// The hand sits in the frame half that matches its side, with its palm
/// toward the camera unless `facing_away` is set.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticHand {
    pub side: Side,
    pub fingers: FingerState,
    pub facing_away: bool,
}

impl SyntheticHand {
    pub fn new(side: Side, fingers: FingerState) -> Self {
        Self {
            side,
            fingers,
            facing_away: false,
        }
    }

    pub fn facing_away(mut self) -> Self {
        self.facing_away = true;
        self
    }

    pub fn build(&self) -> HandObservation {
        // Laid out for a Right hand facing the camera: thumb and index toward
        // the frame centre, pinky toward the edge. Mirrored for Left.
        let finger_x = if self.facing_away {
            [0.78, 0.72, 0.67, 0.62]
        } else {
            [0.62, 0.67, 0.72, 0.78]
        };
        let raised = [
            self.fingers.index,
            self.fingers.middle,
            self.fingers.ring,
            self.fingers.pinky,
        ];

        let mut kps = Vec::with_capacity(KEYPOINT_COUNT);
        kps.push(Keypoint::new(0.70, 0.90));
        // Thumb: cmc, mcp, ip, tip.
        let thumb_x = if self.facing_away { 0.82 } else { 0.58 };
        for (i, y) in [0.85, 0.80, 0.76, 0.72].into_iter().enumerate() {
            let step = if self.facing_away { 0.01 } else { -0.01 };
            kps.push(Keypoint::new(thumb_x + step * i as f32, y));
        }
        // Index, middle, ring, pinky: mcp, pip, dip, tip.
        for (x, up) in finger_x.into_iter().zip(raised) {
            let (dip_y, tip_y) = if up { (0.47, 0.40) } else { (0.60, 0.65) };
            for y in [0.70, 0.55, dip_y, tip_y] {
                kps.push(Keypoint::new(x, y));
            }
        }

        if self.side == Side::Left {
            for kp in &mut kps {
                kp.x = 1.0 - kp.x;
            }
        }
        HandObservation::new(kps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::laterality::resolve;

    #[test]
    fn synthetic_hands_resolve_to_their_side() {
        for side in [Side::Left, Side::Right] {
            let hand = SyntheticHand::new(side, FingerState::default()).build();
            let lat = resolve(&hand, 0.5).expect("well formed");
            assert_eq!(lat.side, side);
            assert!(lat.facing_camera);

            let away = SyntheticHand::new(side, FingerState::default()).facing_away().build();
            assert!(!resolve(&away, 0.5).expect("well formed").facing_camera);
        }
    }

    #[tokio::test]
    async fn script_plays_then_goes_quiet() {
        let hand = SyntheticHand::new(Side::Right, FingerState::default()).build();
        let mut src = ScriptedPoseSource::new([
            ScriptFrame::Hands(vec![hand]),
            ScriptFrame::Missing,
            ScriptFrame::Fault("camera unplugged".into()),
        ]);

        assert_eq!(src.detect().await.unwrap().map(|h| h.len()), Some(1));
        assert!(src.detect().await.unwrap().is_none());
        assert!(src.detect().await.is_err());
        assert_eq!(src.detect().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn looping_script_restarts() {
        let mut src = ScriptedPoseSource::new([ScriptFrame::Missing, ScriptFrame::Hands(vec![])])
            .looping();
        for _ in 0..3 {
            assert!(src.detect().await.unwrap().is_none());
            assert_eq!(src.detect().await.unwrap(), Some(Vec::new()));
        }
    }
}
