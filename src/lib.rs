//! # Gesture Remote
//!
//! Turns a stream of hand-pose observations into debounced key taps for a
//! media player or desktop. One control cycle runs:
//!
//! frame gate -> pose source -> laterality -> classifier -> reducer ->
//! confirmation engine -> dispatcher
//!
//! All state is owned by a single [`GestureRemote`] and only touched from its
//! loop, one cycle at a time.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod stats;
pub mod types;
pub mod vision;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{RemoteConfig, SinkKind};
pub use dispatch::{ActionDispatcher, KeySink, RecordingSink};
pub use engine::{ConfirmationEngine, EngineStatus, EngineTimings};
pub use stats::LoopStats;
pub use types::*;
pub use vision::{CycleSource, PoseSource, VisionPathway};

use crossbeam_channel::{Sender, TrySendError};
use std::time::Duration;
use tokio::sync::watch;

const STATS_LOG_PERIOD: Duration = Duration::from_secs(1);

/// What happened in one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub now: Duration,
    pub gesture: GestureSymbol,
    pub source: CycleSource,
    pub action: Option<Action>,
}

/// The control loop: owns the pipeline, the engine state and the key sink
pub struct GestureRemote {
    config: RemoteConfig,
    vision: VisionPathway,
    engine: ConfirmationEngine,
    dispatcher: ActionDispatcher,
    clock: Box<dyn Clock>,
    stats: LoopStats,
    observers: Vec<Sender<EngineStatus>>,
    last_stats_log: Duration,
}

impl GestureRemote {
    /// Build the loop from a validated config: UDP pose feed if configured,
    /// key sink as selected, wall clock.
    pub async fn new(config: RemoteConfig) -> anyhow::Result<Self> {
        log::info!("Initializing Gesture Remote...");
        config.validate()?;

        let source: Box<dyn PoseSource> = match config.pose_udp_addr {
            Some(addr) => Box::new(vision::UdpPoseSource::bind(addr).await?),
            None => {
                log::warn!("No pose feed configured, every cycle will see an empty scene");
                Box::new(vision::ScriptedPoseSource::new([]))
            }
        };
        let sink = dispatch::sink_from_config(&config)?;

        let remote = Self::with_parts(config, source, sink, Box::new(MonotonicClock::new()));
        log::info!("Gesture Remote initialization complete");
        Ok(remote)
    }

    /// Assemble the loop from explicit collaborators.
    pub fn with_parts(
        config: RemoteConfig,
        source: Box<dyn PoseSource>,
        sink: Box<dyn KeySink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            vision: VisionPathway::new(source, &config),
            engine: ConfirmationEngine::new(EngineTimings::from(&config)),
            dispatcher: ActionDispatcher::new(sink),
            clock,
            stats: LoopStats::new(),
            observers: Vec::new(),
            last_stats_log: Duration::ZERO,
            config,
        }
    }

    /// Receive an [`EngineStatus`] snapshot after every cycle.
    pub fn connect_status_observer(&mut self, tx: Sender<EngineStatus>) {
        log::info!("Status observer connected");
        self.observers.push(tx);
    }

    /// Run exactly one cycle.
    pub async fn step(&mut self) -> CycleReport {
        // One timestamp per cycle, shared by every decision below.
        let now = self.clock.now();
        self.stats.record(now);

        let cycle = self.vision.next_cycle().await;
        let action = self.engine.process(cycle.gesture, now);
        if let Some(action) = action {
            self.dispatcher.dispatch(action).await;
        }

        self.publish_status();
        self.log_stats(now);

        CycleReport {
            cycle: self.vision.cycle(),
            now,
            gesture: cycle.gesture,
            source: cycle.source,
            action,
        }
    }

    /// Cycle at the configured rate until `shutdown` turns true or its
    /// sender goes away.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        log::info!("Starting control loop at {} Hz...", self.config.cycle_hz);

        let mut ticker = tokio::time::interval(self.config.cycle_period());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.step().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        log::info!("Control loop stopped after {} cycles", self.stats.cycles());
        Ok(())
    }

    /// Release the pose source.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        log::info!("Shutting down Gesture Remote...");
        self.vision.stop().await?;
        log::info!(
            "Dispatched {} key taps ({} failed)",
            self.dispatcher.dispatched(),
            self.dispatcher.failed()
        );
        Ok(())
    }

    fn publish_status(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let status = self.engine.status();
        self.observers.retain(|tx| match tx.try_send(status.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    fn log_stats(&mut self, now: Duration) {
        if now.saturating_sub(self.last_stats_log) < STATS_LOG_PERIOD {
            return;
        }
        self.last_stats_log = now;
        log::debug!(
            "FPS {:.1}, latency {:.1} ms, status {:?}",
            self.stats.fps(),
            self.stats.latency_ms(),
            self.engine.status_message()
        );
    }

    pub fn status(&self) -> EngineStatus {
        self.engine.status()
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn engine(&self) -> &ConfirmationEngine {
        &self.engine
    }

    pub fn vision(&self) -> &VisionPathway {
        &self.vision
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}
