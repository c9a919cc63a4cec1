//! Action dispatcher and key sinks.
//!
//! The dispatcher maps each action to exactly one key tap and hands it to a
//! sink. Delivery is fire-and-forget: a failing sink is logged, never retried,
//! and never stops the loop. Call cadence is the engine's job; nothing here
//! deduplicates.

use crate::config::{RemoteConfig, SinkKind};
use crate::types::{Action, GestureSymbol, Key};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{timeout, Duration};

/// The fixed gesture-to-key table. `None` has no key.
pub fn key_for(gesture: GestureSymbol) -> Option<Key> {
    Some(match gesture {
        GestureSymbol::None => return None,
        GestureSymbol::Quit => Key::Char('q'),
        GestureSymbol::Subtitle => Key::Char('v'),
        GestureSymbol::Mute => Key::Char('m'),
        GestureSymbol::Fullscreen => Key::Char('f'),
        GestureSymbol::PlayPause => Key::Space,
        GestureSymbol::VolUp => Key::Char('9'),
        GestureSymbol::VolDown => Key::Char('0'),
        GestureSymbol::SeekFwd => Key::ArrowRight,
        GestureSymbol::SeekRev => Key::ArrowLeft,
    })
}

/// Something that can deliver a single key tap (press + release).
#[async_trait]
pub trait KeySink: Send {
    fn name(&self) -> &'static str;

    async fn tap(&mut self, key: Key) -> Result<()>;
}

pub struct ActionDispatcher {
    sink: Box<dyn KeySink>,
    dispatched: u64,
    failed: u64,
}

impl ActionDispatcher {
    pub fn new(sink: Box<dyn KeySink>) -> Self {
        log::info!("Key sink: {}", sink.name());
        Self {
            sink,
            dispatched: 0,
            failed: 0,
        }
    }

    pub async fn dispatch(&mut self, action: Action) {
        let Some(key) = key_for(action.gesture) else {
            log::warn!("No key bound to {}, dropping {:?}", action.gesture, action.trigger);
            return;
        };

        log::info!("{} ({:?}) -> tap {}", action.gesture, action.trigger, key);
        self.dispatched += 1;
        if let Err(e) = self.sink.tap(key).await {
            self.failed += 1;
            log::warn!("{} sink failed to tap {key}: {e:#}", self.sink.name());
        }
    }

    /// Taps attempted so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Taps the sink reported as failed.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}

/// Build the sink selected in the config.
pub fn sink_from_config(config: &RemoteConfig) -> Result<Box<dyn KeySink>> {
    Ok(match config.sink {
        SinkKind::Log => Box::new(LogSink),
        SinkKind::Xdotool => Box::new(XdotoolSink::default()),
        SinkKind::Qemu => {
            let sock = config
                .qemu_monitor_sock
                .as_ref()
                .context("qemu sink selected without a monitor socket")?;
            Box::new(QemuMonitorSink::new(sock))
        }
    })
}

/// Dry-run sink: logs every tap.
pub struct LogSink;

#[async_trait]
impl KeySink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn tap(&mut self, key: Key) -> Result<()> {
        log::info!("[dry-run] key tap {key}");
        Ok(())
    }
}

/// Keeps every tap in memory. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSink {
    taps: Arc<Mutex<Vec<Key>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taps(&self) -> Vec<Key> {
        self.taps.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl KeySink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn tap(&mut self, key: Key) -> Result<()> {
        self.taps
            .lock()
            .map_err(|_| anyhow::anyhow!("recording sink poisoned"))?
            .push(key);
        Ok(())
    }
}

fn xdotool_key_name(key: Key) -> String {
    match key {
        Key::Char(c) => c.to_string(),
        Key::Space => "space".to_string(),
        Key::ArrowLeft => "Left".to_string(),
        Key::ArrowRight => "Right".to_string(),
    }
}

/// Taps keys on the local X11 session via `xdotool key`.
pub struct XdotoolSink {
    program: PathBuf,
}

impl Default for XdotoolSink {
    fn default() -> Self {
        Self {
            program: PathBuf::from("xdotool"),
        }
    }
}

#[async_trait]
impl KeySink for XdotoolSink {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    async fn tap(&mut self, key: Key) -> Result<()> {
        let name = xdotool_key_name(key);
        let status = tokio::process::Command::new(&self.program)
            .args(["key", &name])
            .status()
            .await
            .with_context(|| format!("spawn {}", self.program.display()))?;
        if !status.success() {
            anyhow::bail!("xdotool key {name} exited with {status}");
        }
        Ok(())
    }
}

fn sendkey_name(key: Key) -> Result<String> {
    Ok(match key {
        Key::Char(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => c.to_string(),
        Key::Char(c) => anyhow::bail!("unsupported character for sendkey: {:?}", c),
        Key::Space => "spc".to_string(),
        Key::ArrowLeft => "left".to_string(),
        Key::ArrowRight => "right".to_string(),
    })
}

/// Minimal QEMU HMP monitor link that injects keyboard input via `sendkey`.
pub struct QemuMonitorSink {
    sock_path: PathBuf,
}

impl QemuMonitorSink {
    pub fn new(sock_path: impl Into<PathBuf>) -> Self {
        Self {
            sock_path: sock_path.into(),
        }
    }

    pub fn sock_path(&self) -> &Path {
        &self.sock_path
    }
}

#[async_trait]
impl KeySink for QemuMonitorSink {
    fn name(&self) -> &'static str {
        "qemu"
    }

    async fn tap(&mut self, key: Key) -> Result<()> {
        let cmd = format!("sendkey {}\r\n", sendkey_name(key)?);

        let mut s = UnixStream::connect(&self.sock_path)
            .await
            .with_context(|| format!("connect to QEMU monitor: {}", self.sock_path.display()))?;

        // Drain banner/prompt (best-effort).
        let mut tmp = [0u8; 4096];
        let _ = timeout(Duration::from_millis(200), s.read(&mut tmp)).await;

        s.write_all(cmd.as_bytes()).await?;
        s.flush().await?;

        let _ = timeout(Duration::from_millis(50), s.read(&mut tmp)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trigger;

    struct BrokenSink;

    #[async_trait]
    impl KeySink for BrokenSink {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn tap(&mut self, _key: Key) -> Result<()> {
            anyhow::bail!("display gone")
        }
    }

    #[test]
    fn key_table() {
        assert_eq!(key_for(GestureSymbol::Quit), Some(Key::Char('q')));
        assert_eq!(key_for(GestureSymbol::Subtitle), Some(Key::Char('v')));
        assert_eq!(key_for(GestureSymbol::Mute), Some(Key::Char('m')));
        assert_eq!(key_for(GestureSymbol::Fullscreen), Some(Key::Char('f')));
        assert_eq!(key_for(GestureSymbol::PlayPause), Some(Key::Space));
        assert_eq!(key_for(GestureSymbol::VolUp), Some(Key::Char('9')));
        assert_eq!(key_for(GestureSymbol::VolDown), Some(Key::Char('0')));
        assert_eq!(key_for(GestureSymbol::SeekFwd), Some(Key::ArrowRight));
        assert_eq!(key_for(GestureSymbol::SeekRev), Some(Key::ArrowLeft));
        assert_eq!(key_for(GestureSymbol::None), None);
    }

    #[test]
    fn sink_key_names() {
        assert_eq!(sendkey_name(Key::Space).unwrap(), "spc");
        assert_eq!(sendkey_name(Key::Char('9')).unwrap(), "9");
        assert!(sendkey_name(Key::Char('?')).is_err());
        assert_eq!(xdotool_key_name(Key::ArrowRight), "Right");
        assert_eq!(xdotool_key_name(Key::Char('m')), "m");
    }

    #[tokio::test]
    async fn dispatch_taps_mapped_key_every_time() {
        let sink = RecordingSink::new();
        let mut dispatcher = ActionDispatcher::new(Box::new(sink.clone()));
        let action = Action { gesture: GestureSymbol::VolUp, trigger: Trigger::Repeat };
        dispatcher.dispatch(action).await;
        dispatcher.dispatch(action).await;
        assert_eq!(sink.taps(), vec![Key::Char('9'), Key::Char('9')]);
        assert_eq!(dispatcher.dispatched(), 2);
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let mut dispatcher = ActionDispatcher::new(Box::new(BrokenSink));
        dispatcher
            .dispatch(Action { gesture: GestureSymbol::Mute, trigger: Trigger::Edge })
            .await;
        assert_eq!(dispatcher.dispatched(), 1);
        assert_eq!(dispatcher.failed(), 1);
    }

    #[tokio::test]
    async fn none_gesture_is_not_dispatched() {
        let sink = RecordingSink::new();
        let mut dispatcher = ActionDispatcher::new(Box::new(sink.clone()));
        dispatcher
            .dispatch(Action { gesture: GestureSymbol::None, trigger: Trigger::Edge })
            .await;
        assert!(sink.taps().is_empty());
        assert_eq!(dispatcher.dispatched(), 0);
    }

    #[tokio::test]
    async fn qemu_sink_writes_sendkey() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            conn.write_all(b"QEMU monitor\r\n(qemu) ").await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 64];
            while !buf.ends_with(b"\r\n") {
                let n = conn.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            String::from_utf8(buf).unwrap()
        });

        let mut sink = QemuMonitorSink::new(&path);
        sink.tap(Key::ArrowLeft).await.unwrap();
        assert_eq!(server.await.unwrap(), "sendkey left\r\n");
    }

    #[test]
    fn qemu_sink_requires_socket() {
        let cfg = RemoteConfig { sink: SinkKind::Qemu, ..RemoteConfig::default() };
        assert!(sink_from_config(&cfg).is_err());
        let cfg = RemoteConfig {
            sink: SinkKind::Qemu,
            qemu_monitor_sock: Some("/tmp/qemu.sock".into()),
            ..RemoteConfig::default()
        };
        assert_eq!(sink_from_config(&cfg).unwrap().name(), "qemu");
    }
}
