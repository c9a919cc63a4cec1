//! Runtime configuration: TOML file, environment overrides, validation

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const POSE_UDP_ADDR_ENV: &str = "GESTURE_REMOTE_POSE_UDP_ADDR";
pub const QEMU_MONITOR_SOCK_ENV: &str = "GESTURE_REMOTE_QEMU_MONITOR_SOCK";

/// Where dispatched key taps go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Log the tap only (dry run).
    #[default]
    Log,
    /// `xdotool key ...` on the local X11 session.
    Xdotool,
    /// `sendkey ...` through a QEMU HMP monitor socket.
    Qemu,
}

/// Configuration for the gesture remote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Window (seconds) in which two entries of a repeatable gesture confirm it
    pub activation_window_secs: f64,
    /// Minimum spacing (seconds) between continuous repeats
    pub continuous_interval_secs: f64,
    /// Run pose inference every Nth cycle, reuse the cached result otherwise
    pub decimation_ratio: u32,
    /// A finger is up iff `tip.y < pip.y - finger_up_margin`
    pub finger_up_margin: f32,
    /// Wrist x below this is a Left hand
    pub side_split_x: f32,
    /// Control loop cadence
    pub cycle_hz: u32,
    /// Consecutive failed or empty inference cycles that may replay the
    /// cached gesture before the scene is treated as empty
    pub max_fallback_cycles: u32,
    /// Bind address for the UDP pose feed
    pub pose_udp_addr: Option<SocketAddr>,
    pub sink: SinkKind,
    /// QEMU monitor socket, required by the `qemu` sink
    pub qemu_monitor_sock: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            activation_window_secs: 5.0,
            continuous_interval_secs: 0.2,
            decimation_ratio: 2,
            finger_up_margin: 0.0,
            side_split_x: 0.5,
            cycle_hz: 30,
            max_fallback_cycles: 15,
            pose_udp_addr: None,
            sink: SinkKind::Log,
            qemu_monitor_sock: None,
        }
    }
}

impl RemoteConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `GESTURE_REMOTE_*` environment overrides. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(POSE_UDP_ADDR_ENV) {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => self.pose_udp_addr = Some(addr),
                Err(e) => log::warn!("Ignoring {POSE_UDP_ADDR_ENV}={raw}: {e}"),
            }
        }
        if let Ok(sock) = std::env::var(QEMU_MONITOR_SOCK_ENV) {
            self.qemu_monitor_sock = Some(PathBuf::from(sock));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_secs("activation_window_secs", self.activation_window_secs)?;
        positive_secs("continuous_interval_secs", self.continuous_interval_secs)?;

        if self.decimation_ratio == 0 {
            return Err(ConfigError::Invalid {
                field: "decimation_ratio",
                reason: "must be at least 1".into(),
            });
        }
        if !self.finger_up_margin.is_finite() || self.finger_up_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "finger_up_margin",
                reason: format!("must be a non-negative number, got {}", self.finger_up_margin),
            });
        }
        if !(0.0..=1.0).contains(&self.side_split_x) {
            return Err(ConfigError::Invalid {
                field: "side_split_x",
                reason: format!("must lie in [0, 1], got {}", self.side_split_x),
            });
        }
        if self.cycle_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "cycle_hz",
                reason: "must be at least 1".into(),
            });
        }
        if self.sink == SinkKind::Qemu && self.qemu_monitor_sock.is_none() {
            return Err(ConfigError::Invalid {
                field: "qemu_monitor_sock",
                reason: "required when sink = \"qemu\"".into(),
            });
        }
        Ok(())
    }

    pub fn activation_window(&self) -> Duration {
        saturating_secs(self.activation_window_secs)
    }

    pub fn continuous_interval(&self) -> Duration {
        saturating_secs(self.continuous_interval_secs)
    }

    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.cycle_hz.max(1) as f64)
    }
}

fn positive_secs(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number of seconds, got {value}"),
        });
    }
    if Duration::try_from_secs_f64(value).is_err() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} seconds does not fit in a duration"),
        });
    }
    Ok(())
}

/// Unvalidated values never panic: non-positive or NaN is zero, overflow is `Duration::MAX`.
fn saturating_secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
