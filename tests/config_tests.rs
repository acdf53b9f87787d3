// Tests for configuration loading

use anyhow::Result;
use session_recorder::{Config, Severity};
use std::path::PathBuf;

#[test]
fn test_config_with_storage() -> Result<()> {
    let cfg = Config::from_toml_str(
        r#"
        [service]
        name = "session-recorder"

        [recording]
        recordings_path = "/tmp/recordings"
        persist_level = "trace"
        mirror_level = "warn"

        [storage]
        primary = { name = "archive", root = "/mnt/archive" }
        secondary = [{ name = "mirror", root = "/mnt/mirror" }]
        "#,
    )?;

    assert_eq!(cfg.service.name, "session-recorder");

    let session = cfg.session_config()?;
    assert_eq!(session.output_dir, PathBuf::from("/tmp/recordings"));
    assert_eq!(session.log_levels.persist, Severity::Trace);
    assert_eq!(session.log_levels.mirror, Severity::Warn);

    let uploader = cfg.uploader().expect("storage configured");
    assert_eq!(uploader.primary_name(), "archive");
    assert_eq!(uploader.destination_names(), vec!["archive", "mirror"]);

    Ok(())
}

#[test]
fn test_config_without_storage_uses_default_levels() -> Result<()> {
    let cfg = Config::from_toml_str(
        r#"
        [service]
        name = "recorder"

        [recording]
        recordings_path = "recordings"
        "#,
    )?;

    assert!(cfg.storage.is_none());
    assert!(cfg.uploader().is_none());

    let levels = cfg.session_config()?.log_levels;
    assert_eq!(levels.persist, Severity::Debug);
    assert_eq!(levels.mirror, Severity::Info);

    Ok(())
}

#[test]
fn test_persist_level_above_mirror_is_rejected() -> Result<()> {
    let cfg = Config::from_toml_str(
        r#"
        [service]
        name = "recorder"

        [recording]
        recordings_path = "recordings"
        persist_level = "error"
        mirror_level = "info"
        "#,
    )?;

    let err = cfg.session_config().unwrap_err();
    assert!(err.to_string().contains("persist_level"));

    Ok(())
}
