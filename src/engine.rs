//! Confirmation & throttle engine.
//!
//! The only component with state across cycles. Every call to
//! [`ConfirmationEngine::process`] is one cycle and receives the single
//! timestamp sampled for that cycle.
//!
//! Per repeatable gesture G:
//!
//! ```text
//! IDLE --edge--> ARMED(1) --edge within window--> CONFIRMED
//!   CONFIRMED --PLAY_PAUSE--> dispatch once
//!   CONFIRMED --other--> CONTINUOUS (throttled repeats while G is held)
//!   CONTINUOUS --gesture lost or changed--> IDLE
//! ```
//!
//! An edge arriving after the window restarts at ARMED(1).

use crate::config::RemoteConfig;
use crate::types::{Action, GestureKind, GestureSymbol, Trigger};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

pub const STATUS_SCANNING: &str = "Scanning...";
pub const STATUS_READY: &str = "Ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimings {
    /// Two entries closer than this confirm a repeatable gesture.
    pub activation_window: Duration,
    /// Repeats fire when strictly more than this has passed since the last one.
    pub continuous_interval: Duration,
}

impl Default for EngineTimings {
    fn default() -> Self {
        Self {
            activation_window: Duration::from_secs(5),
            continuous_interval: Duration::from_millis(200),
        }
    }
}

impl From<&RemoteConfig> for EngineTimings {
    fn from(cfg: &RemoteConfig) -> Self {
        Self {
            activation_window: cfg.activation_window(),
            continuous_interval: cfg.continuous_interval(),
        }
    }
}

/// Double-trigger progress for one repeatable gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceRecord {
    pub trigger_count: u32,
    pub last_trigger: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContinuousUnlock {
    pub unlocked: bool,
    pub active_gesture: Option<GestureSymbol>,
    /// `None` until the first repeat after unlocking.
    pub last_action: Option<Duration>,
}

impl ContinuousUnlock {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Read-only snapshot for HUDs and observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub gesture: GestureSymbol,
    pub message: String,
    pub unlocked: bool,
    pub active_gesture: Option<GestureSymbol>,
}

pub struct ConfirmationEngine {
    timings: EngineTimings,
    debounce: HashMap<GestureSymbol, DebounceRecord>,
    unlock: ContinuousUnlock,
    last_gesture: GestureSymbol,
    status: String,
}

impl ConfirmationEngine {
    pub fn new(timings: EngineTimings) -> Self {
        Self {
            timings,
            debounce: HashMap::new(),
            unlock: ContinuousUnlock::default(),
            last_gesture: GestureSymbol::None,
            status: STATUS_SCANNING.to_string(),
        }
    }

    /// Run one cycle. Returns the action to dispatch, if any; at most one
    /// action can come out of a single cycle.
    pub fn process(&mut self, gesture: GestureSymbol, now: Duration) -> Option<Action> {
        let edge = gesture != self.last_gesture;
        if edge {
            log::debug!("Gesture {} -> {}", self.last_gesture, gesture);
        }

        // Losing or changing the unlocked gesture always cancels continuous mode.
        if self.unlock.active_gesture.is_some_and(|active| active != gesture) {
            log::debug!("Continuous mode for {:?} cancelled", self.unlock.active_gesture);
            self.unlock.clear();
        }

        let mut action = None;
        match gesture.kind() {
            GestureKind::Idle => {
                self.unlock.clear();
                self.set_status(STATUS_READY.to_string());
            }
            GestureKind::OneShot => {
                if edge {
                    self.set_status(format!("Triggered: {gesture}"));
                    action = Some(Action {
                        gesture,
                        trigger: Trigger::Edge,
                    });
                }
            }
            GestureKind::Repeatable => {
                if edge {
                    action = self.register_edge(gesture, now);
                }
                if let Some(repeat) = self.throttle(gesture, now) {
                    action = Some(repeat);
                }
            }
        }

        self.last_gesture = gesture;
        action
    }

    fn register_edge(&mut self, gesture: GestureSymbol, now: Duration) -> Option<Action> {
        let window = self.timings.activation_window;
        // Expired progress is equivalent to a fresh record.
        self.debounce
            .retain(|_, rec| now.saturating_sub(rec.last_trigger) < window);

        let record = self.debounce.entry(gesture).or_default();
        record.trigger_count += 1;
        record.last_trigger = now;

        if record.trigger_count < 2 {
            self.set_status(format!("{gesture}: 1/2"));
            return None;
        }

        self.debounce.remove(&gesture);
        if gesture.is_continuous() {
            self.unlock = ContinuousUnlock {
                unlocked: true,
                active_gesture: Some(gesture),
                last_action: None,
            };
            self.set_status(format!("{gesture} Unlocked"));
            None
        } else {
            self.set_status("Play/Pause: OK".to_string());
            Some(Action {
                gesture,
                trigger: Trigger::Confirmed,
            })
        }
    }

    fn throttle(&mut self, gesture: GestureSymbol, now: Duration) -> Option<Action> {
        if !self.unlock.unlocked || self.unlock.active_gesture != Some(gesture) {
            return None;
        }

        let due = match self.unlock.last_action {
            None => true,
            Some(last) => now.saturating_sub(last) > self.timings.continuous_interval,
        };
        if !due {
            return None;
        }

        self.unlock.last_action = Some(now);
        self.set_status(format!("Continuous: {gesture}"));
        Some(Action {
            gesture,
            trigger: Trigger::Repeat,
        })
    }

    fn set_status(&mut self, message: String) {
        if message != self.status {
            log::debug!("Status: {message}");
            self.status = message;
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            gesture: self.last_gesture,
            message: self.status.clone(),
            unlocked: self.unlock.unlocked,
            active_gesture: self.unlock.active_gesture,
        }
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    pub fn unlock_state(&self) -> ContinuousUnlock {
        self.unlock
    }

    pub fn debounce_record(&self, gesture: GestureSymbol) -> Option<DebounceRecord> {
        self.debounce.get(&gesture).copied()
    }

    pub fn last_gesture(&self) -> GestureSymbol {
        self.last_gesture
    }

    pub fn timings(&self) -> EngineTimings {
        self.timings
    }
}

impl Default for ConfirmationEngine {
    fn default() -> Self {
        Self::new(EngineTimings::default())
    }
}
