//! Settings type definitions
//!
//! These types represent the operator's persisted settings. The core
//! reads them at construction and hands changes back through a sink; the
//! storage format belongs to the caller.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::motion::WorkspaceTransform;

/// Default animation tick in milliseconds
pub const DEFAULT_ANIMATION_INTERVAL_MS: u32 = 10;

/// Arm protocol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// uArm Metal running the Brief VM over Reflecta frames
    #[default]
    Brief,
    /// uArm Swift Pro speaking G-code
    Swift,
}

/// Arm settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmSettings {
    /// Serial port name; discovered by USB ID when absent
    pub port: Option<String>,
    /// Protocol family
    pub backend: Backend,
    /// Whether moves are sent to the arm at all
    pub robot_control: bool,
    /// Encode moves as rotation/elevation (Brief backend only)
    pub scara_mode: bool,
    /// Height trim subtracted from every z
    pub z_shift: f64,
    /// Workspace gain applied to both axes
    pub workspace_scale: f64,
}

impl Default for ArmSettings {
    fn default() -> Self {
        Self {
            port: None,
            backend: Backend::Brief,
            robot_control: true,
            scara_mode: true,
            z_shift: 0.0,
            workspace_scale: 1.0,
        }
    }
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Tick period in milliseconds
    pub animation_interval_ms: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            animation_interval_ms: DEFAULT_ANIMATION_INTERVAL_MS,
        }
    }
}

impl PlaybackSettings {
    /// Tick period, never shorter than 1 ms
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.animation_interval_ms.max(1)))
    }
}

/// Screen the strokes were captured on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSettings {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl ScreenSettings {
    /// Workspace transform centred on this screen
    pub fn transform(&self) -> WorkspaceTransform {
        WorkspaceTransform::for_screen(self.width, self.height)
    }
}

/// Complete settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub arm: ArmSettings,
    pub playback: PlaybackSettings,
    pub screen: ScreenSettings,
}

/// Settings rejected by [`Settings::validate`]
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("z_shift must be finite, got {0}")]
    ZShift(f64),
    #[error("workspace_scale must be finite and positive, got {0}")]
    WorkspaceScale(f64),
    #[error("animation_interval_ms must be at least 1")]
    AnimationInterval,
    #[error("screen size must be finite and positive, got {0}x{1}")]
    Screen(f64, f64),
}

impl Settings {
    /// Check values the motion math cannot tolerate
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.arm.z_shift.is_finite() {
            return Err(SettingsError::ZShift(self.arm.z_shift));
        }
        if !is_positive(self.arm.workspace_scale) {
            return Err(SettingsError::WorkspaceScale(self.arm.workspace_scale));
        }
        if self.playback.animation_interval_ms == 0 {
            return Err(SettingsError::AnimationInterval);
        }
        if !is_positive(self.screen.width) || !is_positive(self.screen.height) {
            return Err(SettingsError::Screen(self.screen.width, self.screen.height));
        }
        Ok(())
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.arm.backend, Backend::Brief);
        assert!(s.arm.robot_control);
        assert!(s.arm.scara_mode);
        assert_eq!(s.arm.z_shift, 0.0);
        assert_eq!(s.arm.workspace_scale, 1.0);
        assert_eq!(s.playback.animation_interval_ms, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_interval_floor() {
        let p = PlaybackSettings {
            animation_interval_ms: 0,
        };
        assert_eq!(p.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let mut s = Settings::default();
        s.arm.workspace_scale = 0.0;
        assert_eq!(s.validate(), Err(SettingsError::WorkspaceScale(0.0)));
        s.arm.workspace_scale = f64::NAN;
        assert!(matches!(s.validate(), Err(SettingsError::WorkspaceScale(_))));
    }

    #[test]
    fn test_validate_rejects_bad_screen() {
        let mut s = Settings::default();
        s.screen.height = -1.0;
        assert!(matches!(s.validate(), Err(SettingsError::Screen(_, _))));
    }

    #[test]
    fn test_validate_rejects_infinite_trim() {
        let mut s = Settings::default();
        s.arm.z_shift = f64::INFINITY;
        assert!(matches!(s.validate(), Err(SettingsError::ZShift(_))));
    }

    #[test]
    fn test_screen_transform() {
        let t = ScreenSettings {
            width: 800.0,
            height: 600.0,
        }
        .transform();
        assert_eq!(t.x_shift, 400.0);
        assert_eq!(t.y_shift, 300.0);
        assert_eq!(t.min_dimension_half, 300.0);
    }
}
