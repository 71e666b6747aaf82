use anyhow::{Context, Result};
use frame_delta::DetectorConfig;
use std::path::Path;

/// Environment variables `FRAME_DELTA__<FIELD>` override file values,
/// e.g. `FRAME_DELTA__COLOR_DIFFERENCE_THRESHOLD=30`.
pub const ENV_PREFIX: &str = "FRAME_DELTA";

/// Layers the detector configuration: built-in defaults, then the optional file,
/// then the environment.
pub fn load_detector_config(path: Option<&Path>) -> Result<DetectorConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to read detector configuration")?;

    let detector: DetectorConfig = settings
        .try_deserialize()
        .context("invalid detector configuration")?;
    detector.validate()?;
    Ok(detector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_delta::ScanMode;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    /// Every test reads the process environment through the loader, so tests that
    /// set variables must not overlap with any other test here.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn no_sources_gives_defaults() {
        let _env = env_guard();
        let config = load_detector_config(None).unwrap();
        assert_eq!(config, DetectorConfig::default());
    }

    #[test]
    fn file_overrides_selected_fields() {
        let _env = env_guard();
        let file = write_config(
            r#"
            working_width = 320
            min_bbox_size = 12
            scan_mode = "row_flush"
            "#,
        );
        let config = load_detector_config(Some(file.path())).unwrap();
        assert_eq!(config.working_width, 320);
        assert_eq!(config.min_bbox_size, 12);
        assert_eq!(config.scan_mode, ScanMode::RowFlush);
        assert_eq!(config.color_difference_threshold, 40);
    }

    #[test]
    fn invalid_values_are_reported() {
        let _env = env_guard();
        let file = write_config("working_width = 0\n");
        assert!(load_detector_config(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_detector_config(Some(&missing)).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let _env = env_guard();
        let file = write_config("color_difference_threshold = 25\n");
        // SAFETY: ENV_LOCK serialises every test that touches the environment.
        unsafe {
            std::env::set_var("FRAME_DELTA__COLOR_DIFFERENCE_THRESHOLD", "30");
            std::env::set_var("FRAME_DELTA__SCAN_MODE", "row_flush");
        }
        let loaded = load_detector_config(Some(file.path()));
        unsafe {
            std::env::remove_var("FRAME_DELTA__COLOR_DIFFERENCE_THRESHOLD");
            std::env::remove_var("FRAME_DELTA__SCAN_MODE");
        }

        let config = loaded.unwrap();
        assert_eq!(config.color_difference_threshold, 30);
        assert_eq!(config.scan_mode, ScanMode::RowFlush);
        assert_eq!(config.working_width, 256);
    }
}
