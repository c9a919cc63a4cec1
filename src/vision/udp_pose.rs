use crate::types::{HandObservation, Keypoint};
use crate::vision::pose_source::PoseSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

#[derive(Debug, Deserialize)]
struct JsonPoseMsg {
    #[serde(default)]
    hands: Vec<JsonHand>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonHand {
    /// [[x, y], ...]
    Pairs(Vec<[f32; 2]>),
    /// {"keypoints": [{"x": .., "y": ..}, ...]}
    Object { keypoints: Vec<Keypoint> },
}

impl From<JsonHand> for HandObservation {
    fn from(hand: JsonHand) -> Self {
        match hand {
            JsonHand::Pairs(pairs) => {
                HandObservation::new(pairs.into_iter().map(|[x, y]| Keypoint::new(x, y)).collect())
            }
            JsonHand::Object { keypoints } => HandObservation::new(keypoints),
        }
    }
}

/// Parse one pose datagram. Hands are kept as sent, even when malformed;
/// the resolver degrades those to "no gesture".
pub fn parse_pose_message(msg: &str) -> Option<Vec<HandObservation>> {
    let msg = msg.trim();
    if msg.is_empty() {
        return None;
    }

    let parsed: JsonPoseMsg = serde_json::from_str(msg).ok()?;
    Some(parsed.hands.into_iter().map(HandObservation::from).collect())
}

/// Pose feed published by an external estimator process over UDP.
///
/// A background task keeps only the newest datagram; `detect` takes it, so
/// each result is seen by the loop at most once.
pub struct UdpPoseSource {
    latest: Arc<Mutex<Option<Vec<HandObservation>>>>,
    task: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl UdpPoseSource {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let sock = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("bind UDP pose listener on {addr}"))?;
        let local_addr = sock.local_addr()?;
        log::info!("UDP pose listener bound on {local_addr}");

        let latest = Arc::new(Mutex::new(None));
        let storage = Arc::clone(&latest);
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 16 * 1024];
            loop {
                let (len, src) = match sock.recv_from(&mut buf).await {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("UDP pose recv error: {e}");
                        continue;
                    }
                };

                let hands = std::str::from_utf8(&buf[..len])
                    .ok()
                    .and_then(parse_pose_message);
                match hands {
                    Some(hands) => {
                        if let Ok(mut slot) = storage.lock() {
                            *slot = Some(hands);
                        }
                    }
                    None => log::warn!("Dropping malformed pose datagram from {src}"),
                }
            }
        });

        Ok(Self {
            latest,
            task: Some(task),
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl PoseSource for UdpPoseSource {
    async fn detect(&mut self) -> Result<Option<Vec<HandObservation>>> {
        let mut slot = self
            .latest
            .lock()
            .map_err(|_| anyhow::anyhow!("pose storage poisoned"))?;
        Ok(slot.take())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            log::info!("UDP pose listener on {} stopped", self.local_addr);
        }
        Ok(())
    }
}

impl Drop for UdpPoseSource {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
