//! Vision pathway - frame gating, pose intake and per-cycle gesture reduction

use crate::config::RemoteConfig;
use crate::types::{GestureSymbol, HandObservation};

pub mod classifier;
pub mod frame_gate;
pub mod laterality;
pub mod pose_source;
pub mod reducer;
mod udp_pose;

pub use classifier::{classify, gesture_for, FingerState};
pub use frame_gate::{CycleCache, FrameGate, GateDecision};
pub use laterality::{resolve, Laterality};
pub use pose_source::{PoseSource, ScriptFrame, ScriptedPoseSource, SyntheticHand};
pub use reducer::reduce;
pub use udp_pose::{parse_pose_message, UdpPoseSource};

/// Where this cycle's gesture came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleSource {
    /// Pose inference ran and produced a result.
    Fresh,
    /// Decimated cycle; cached result replayed.
    Cached,
    /// Inference was due but produced nothing; cached result replayed.
    Fallback,
    /// Inference has produced nothing for too long; the scene counts as empty.
    Stale,
}

/// Per-cycle output of the vision pathway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleGesture {
    pub gesture: GestureSymbol,
    pub source: CycleSource,
}

/// Gesture for a single hand. Malformed or palm-away hands give `None`.
pub fn hand_gesture(hand: &HandObservation, split_x: f32, finger_margin: f32) -> GestureSymbol {
    match resolve(hand, split_x) {
        Ok(Laterality {
            side,
            facing_camera: true,
        }) => classify(hand, side, finger_margin),
        Ok(_) => GestureSymbol::None,
        Err(e) => {
            log::debug!("Ignoring malformed hand: {e}");
            GestureSymbol::None
        }
    }
}

/// Gesture for a whole scene of 0-2 hands, in detection order.
pub fn scene_gesture(hands: &[HandObservation], split_x: f32, finger_margin: f32) -> GestureSymbol {
    let per_hand: Vec<GestureSymbol> = hands
        .iter()
        .map(|h| hand_gesture(h, split_x, finger_margin))
        .collect();
    reduce(&per_hand)
}

/// The Vision Pathway - runs the pose source on gated cycles and reduces
/// its hands to one cycle gesture
pub struct VisionPathway {
    source: Box<dyn PoseSource>,
    gate: FrameGate,
    cache: CycleCache,
    split_x: f32,
    finger_margin: f32,
    max_fallbacks: u32,
    fallbacks: u32,
}

impl VisionPathway {
    pub fn new(source: Box<dyn PoseSource>, config: &RemoteConfig) -> Self {
        log::info!(
            "Vision pathway: inference every {} cycle(s), finger margin {}",
            config.decimation_ratio,
            config.finger_up_margin
        );
        Self {
            source,
            gate: FrameGate::new(config.decimation_ratio),
            cache: CycleCache::default(),
            split_x: config.side_split_x,
            finger_margin: config.finger_up_margin,
            max_fallbacks: config.max_fallback_cycles,
            fallbacks: 0,
        }
    }

    /// Advance one cycle. Never fails: pose faults replay the cache.
    pub async fn next_cycle(&mut self) -> CycleGesture {
        if self.gate.tick() == GateDecision::ReuseCache {
            return CycleGesture {
                gesture: self.cache.gesture,
                source: CycleSource::Cached,
            };
        }

        let hands = match self.source.detect().await {
            Ok(Some(hands)) => hands,
            Ok(None) => return self.fallback(),
            Err(e) => {
                log::warn!("Pose source failed on cycle {}: {e:#}", self.gate.cycle());
                return self.fallback();
            }
        };

        if self.fallbacks > self.max_fallbacks {
            log::info!("Pose source recovered after {} empty cycles", self.fallbacks);
        }
        self.fallbacks = 0;

        let gesture = scene_gesture(&hands, self.split_x, self.finger_margin);
        self.cache.store(gesture, hands);
        CycleGesture {
            gesture,
            source: CycleSource::Fresh,
        }
    }

    fn fallback(&mut self) -> CycleGesture {
        self.fallbacks = self.fallbacks.saturating_add(1);
        if self.fallbacks <= self.max_fallbacks {
            return CycleGesture {
                gesture: self.cache.gesture,
                source: CycleSource::Fallback,
            };
        }

        if self.fallbacks == self.max_fallbacks + 1 {
            log::warn!(
                "Pose source silent for {} inference cycles, treating scene as empty",
                self.fallbacks
            );
        }
        self.cache.store(GestureSymbol::None, Vec::new());
        CycleGesture {
            gesture: GestureSymbol::None,
            source: CycleSource::Stale,
        }
    }

    /// Hands from the last fresh inference, for overlay drawing.
    pub fn cached_hands(&self) -> &[HandObservation] {
        &self.cache.hands
    }

    pub fn cycle(&self) -> u64 {
        self.gate.cycle()
    }

    pub async fn stop(&mut self) -> anyhow::Result<()> {
        log::info!("Stopping Vision Pathway...");
        self.source.stop().await
    }
}
