//! Configuration loading tests.
//!
//! Tests for `ConfigLoader::load()` on files: shared section parsing,
//! missing files, unknown axis fields, and axis settings validation.

use serde::Deserialize;
use stage_common::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
use stage_common::hal::config::AxisSettings;
use stage_common::hal::types::AxisId;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
struct TestFile {
    shared: SharedConfig,
    #[serde(default)]
    axes: Vec<AxisSettings>,
}

fn write_toml(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("stage.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_load_shared_and_axes() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(
        dir.path(),
        r#"
[shared]
service_name = "bench-2"
log_level = "warn"

[[axes]]
id = 3
name = "theta"
min_limit = -180.0
max_limit = 180.0
velocity = 90.0
"#,
    );

    let file = TestFile::load(&path).unwrap();
    assert_eq!(file.shared.log_level, LogLevel::Warn);
    assert_eq!(file.shared.log_level.as_directive(), "warn");
    file.shared.validate().unwrap();

    let axis = &file.axes[0];
    assert_eq!(axis.id, AxisId(3));
    assert_eq!(axis.velocity, Some(90.0));
    assert_eq!(axis.log_capacity, 4096);
    axis.validate().unwrap();
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = TestFile::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound));
}

#[test]
fn test_unknown_axis_field_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_toml(
        dir.path(),
        r#"
[shared]
service_name = "bench-2"

[[axes]]
id = 1
name = "x"
min_limit = 0.0
max_limit = 10.0
max_speed = 3.0
"#,
    );
    assert!(matches!(TestFile::load(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_axis_validation_failures() {
    let inverted = AxisSettings::new(1, "x", 10.0, 0.0);
    assert!(matches!(
        inverted.validate(),
        Err(ConfigError::ValidationError(m)) if m.contains("min_limit")
    ));

    let mut stalled = AxisSettings::new(1, "x", 0.0, 10.0);
    stalled.velocity = Some(0.0);
    assert!(stalled.validate().is_err());

    let mut no_buffer = AxisSettings::new(1, "x", 0.0, 10.0);
    no_buffer.log_capacity = 0;
    assert!(no_buffer.validate().is_err());

    assert!(AxisSettings::new(1, "", 0.0, 10.0).validate().is_err());
}
