use gesture_remote::error::ConfigError;
use gesture_remote::{EngineTimings, RemoteConfig, SinkKind};
use std::io::Write;
use std::time::Duration;

#[test]
fn loads_tunables_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
activation_window_secs = 3.0
continuous_interval_secs = 0.25
decimation_ratio = 3
finger_up_margin = 0.01
pose_udp_addr = "127.0.0.1:5005"
sink = "qemu"
qemu_monitor_sock = "/tmp/qemu-monitor.sock"
"#
    )
    .unwrap();

    let cfg = RemoteConfig::from_toml_file(file.path()).expect("load");
    cfg.validate().expect("valid");
    assert_eq!(cfg.activation_window(), Duration::from_secs(3));
    assert_eq!(cfg.continuous_interval(), Duration::from_millis(250));
    assert_eq!(cfg.decimation_ratio, 3);
    assert_eq!(cfg.sink, SinkKind::Qemu);
    assert_eq!(cfg.pose_udp_addr, Some("127.0.0.1:5005".parse().unwrap()));
    assert_eq!(cfg.cycle_hz, 30);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = RemoteConfig::from_toml_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn rejects_non_positive_windows() {
    let cfg = RemoteConfig::from_toml_str("activation_window_secs = 0.0").unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("activation_window_secs"));

    let cfg = RemoteConfig::from_toml_str("continuous_interval_secs = -1.0").unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_negative_finger_margin() {
    let cfg = RemoteConfig {
        finger_up_margin: -0.1,
        ..RemoteConfig::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Invalid { field: "finger_up_margin", .. })
    ));
}

#[test]
fn rejects_windows_too_large_for_a_duration() {
    let cfg = RemoteConfig::from_toml_str("activation_window_secs = 1e30").unwrap();
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Invalid { field: "activation_window_secs", .. })
    ));

    let cfg = RemoteConfig::from_toml_str("continuous_interval_secs = 1e300").unwrap();
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::Invalid { field: "continuous_interval_secs", .. })
    ));
}

#[test]
fn unvalidated_huge_windows_saturate() {
    let cfg = RemoteConfig::from_toml_str("activation_window_secs = 1e30").unwrap();
    let timings = EngineTimings::from(&cfg);
    assert_eq!(timings.activation_window, Duration::MAX);
    assert_eq!(timings.continuous_interval, Duration::from_millis(200));
}
