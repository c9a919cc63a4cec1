//! Frame decimation and the per-cycle result cache.
//!
//! Pose inference dominates the cycle cost, so it only runs on every Nth
//! cycle. The other cycles replay the cached cycle gesture unchanged; the
//! engine stays correct because it is driven by timestamps, not cycle counts.

use crate::types::{GestureSymbol, HandObservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    RunInference,
    ReuseCache,
}

/// Decide for an explicit cycle number.
pub fn decide(cycle: u64, ratio: u32) -> GateDecision {
    if ratio <= 1 || cycle % ratio as u64 == 0 {
        GateDecision::RunInference
    } else {
        GateDecision::ReuseCache
    }
}

/// Cycle counter plus decimation policy.
#[derive(Debug, Clone)]
pub struct FrameGate {
    ratio: u32,
    cycle: u64,
}

impl FrameGate {
    pub fn new(ratio: u32) -> Self {
        Self {
            ratio: ratio.max(1),
            cycle: 0,
        }
    }

    /// Advance to the next cycle and decide it. The first cycle is number 1,
    /// so with the default ratio of 2 inference starts on the second cycle.
    pub fn tick(&mut self) -> GateDecision {
        self.cycle += 1;
        decide(self.cycle, self.ratio)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn ratio(&self) -> u32 {
        self.ratio
    }
}

/// Last inference result, replayed on decimated cycles and after pose faults.
/// The hands are kept for overlay drawing only.
#[derive(Debug, Clone, Default)]
pub struct CycleCache {
    pub gesture: GestureSymbol,
    pub hands: Vec<HandObservation>,
}

impl CycleCache {
    pub fn store(&mut self, gesture: GestureSymbol, hands: Vec<HandObservation>) {
        self.gesture = gesture;
        self.hands = hands;
    }
}
