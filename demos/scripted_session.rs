//! Example: drive the control loop with a scripted pose feed and a manual clock

use anyhow::Result;
use gesture_remote::vision::{FingerState, ScriptFrame, ScriptedPoseSource, SyntheticHand};
use gesture_remote::{GestureRemote, ManualClock, RecordingSink, RemoteConfig, Side};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mute = SyntheticHand::new(Side::Right, FingerState::new(false, true, true, true)).build();
    let vol_up = SyntheticHand::new(Side::Left, FingerState::new(true, false, false, false)).build();

    // Mute, then raise the left index twice and hold it.
    let mut frames = vec![ScriptFrame::Hands(vec![mute]); 10];
    frames.extend(vec![ScriptFrame::Hands(vec![]); 5]);
    frames.extend(vec![ScriptFrame::Hands(vec![vol_up.clone()]); 5]);
    frames.extend(vec![ScriptFrame::Hands(vec![]); 5]);
    frames.extend(vec![ScriptFrame::Hands(vec![vol_up]); 30]);
    frames.extend(vec![ScriptFrame::Hands(vec![]); 5]);
    let total = frames.len();

    let clock = ManualClock::new();
    let sink = RecordingSink::new();
    let config = RemoteConfig {
        decimation_ratio: 1,
        ..RemoteConfig::default()
    };
    let mut remote = GestureRemote::with_parts(
        config,
        Box::new(ScriptedPoseSource::new(frames)),
        Box::new(sink.clone()),
        Box::new(clock.clone()),
    );

    for _ in 0..total {
        let report = remote.step().await;
        if let Some(action) = report.action {
            println!(
                "t={:>6.3}s  {:<10} {:?}",
                report.now.as_secs_f64(),
                action.gesture.as_str(),
                action.trigger
            );
        }
        clock.advance(Duration::from_millis(50));
    }

    println!("Status: {}", remote.status().message);
    println!("Keys tapped: {:?}", sink.taps());
    remote.shutdown().await?;
    Ok(())
}
