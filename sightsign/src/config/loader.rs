//! Settings persistence
//!
//! Settings live in a TOML file next to the operator. A missing file means
//! defaults; a file that does not parse or validate is an error, never
//! silently replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sightsign_core::config::{Settings, SettingsError};
use sightsign_core::SettingsSink;
use tracing::{debug, info, warn};

/// Default settings file name
pub const DEFAULT_SETTINGS_PATH: &str = "sightsign.toml";

/// Settings persistence errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    /// File could not be written
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    /// TOML parsing failed
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML encoding failed
    #[error("cannot encode settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Values out of range
    #[error(transparent)]
    Invalid(#[from] SettingsError),
}

/// Parse and validate settings text
pub fn parse_settings(text: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(text)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `path`, or defaults when the file does not exist
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    let settings = parse_settings(&text)?;
    info!("Loaded settings from {}", path.display());
    log_settings_summary(&settings);
    Ok(settings)
}

/// Write `settings` to `path`
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(settings)?;
    fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_owned(),
        source,
    })?;
    debug!("saved settings to {}", path.display());
    Ok(())
}

/// Sink that writes every settings change back to `path`
///
/// Write failures are logged; the change stays in effect for the session.
pub fn settings_sink(path: PathBuf) -> SettingsSink {
    Box::new(move |settings: &Settings| {
        if let Err(e) = save_settings(&path, settings) {
            warn!("settings not saved: {}", e);
        }
    })
}

fn log_settings_summary(settings: &Settings) {
    debug!(
        "  arm: {:?} on {}",
        settings.arm.backend,
        settings.arm.port.as_deref().unwrap_or("(auto)")
    );
    debug!(
        "  scara={} z_shift={} scale={}",
        settings.arm.scara_mode, settings.arm.z_shift, settings.arm.workspace_scale
    );
    debug!(
        "  animation {} ms, screen {}x{}",
        settings.playback.animation_interval_ms, settings.screen.width, settings.screen.height
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightsign_core::config::Backend;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sightsign-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_empty_text_is_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file() {
        let settings = parse_settings(
            r#"
            [arm]
            port = "/dev/ttyUSB1"
            backend = "swift"
            z_shift = 0.06

            [playback]
            animation_interval_ms = 25
            "#,
        )
        .unwrap();

        assert_eq!(settings.arm.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(settings.arm.backend, Backend::Swift);
        assert_eq!(settings.arm.z_shift, 0.06);
        assert!(settings.arm.scara_mode);
        assert_eq!(settings.playback.animation_interval_ms, 25);
        assert_eq!(settings.screen.width, 1920.0);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_settings("[arm]\nbackend = \"delta\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            parse_settings("[arm]\nworkspace_scale = 0.0\n"),
            Err(ConfigError::Invalid(SettingsError::WorkspaceScale(_)))
        ));
        assert!(matches!(
            parse_settings("[playback]\nanimation_interval_ms = 0\n"),
            Err(ConfigError::Invalid(SettingsError::AnimationInterval))
        ));
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let path = scratch("missing");
        let _ = fs::remove_file(&path);
        assert_eq!(load_settings(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch("saved");
        let mut settings = Settings::default();
        settings.arm.z_shift = -0.04;
        settings.arm.scara_mode = false;
        settings.arm.port = Some("COM4".into());

        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_sink_persists_changes() {
        let path = scratch("sink");
        let mut sink = settings_sink(path.clone());
        let mut settings = Settings::default();
        settings.playback.animation_interval_ms = 40;
        sink(&settings);

        let loaded = load_settings(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.playback.animation_interval_ms, 40);
    }
}
