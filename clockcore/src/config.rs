//! Persisted widget settings
//!
//! Stored as JSON in the platform config directory. Every key has a default;
//! loading a missing or partial file fills the gaps and the caller writes the
//! completed file straight back, so the store heals itself on every start.

use crate::anchor::ScreenAnchor;
use crate::geometry::{Point, Rect, Size};
use crate::widget::ClockState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no configuration directory for this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

const SETTINGS_FILE: &str = "settings.json";

/// Last window bounds: outer position plus client size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WindowGeometry {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rejects non-finite or empty bounds left behind by a broken write.
    pub fn is_usable(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite())
            && !self.size().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding custom SVG assets; empty selects the bundled set
    pub svg_path: String,
    pub clock_face: String,
    pub second_hand: String,
    pub minute_hand: String,
    pub hour_hand: String,
    /// Rendered as the window icon
    pub preview: String,
    pub show_second_hand: bool,
    pub opacity: f32,
    pub framed: bool,
    pub screen_percent: ScreenAnchor,
    pub window_geometry: Option<WindowGeometry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            svg_path: String::new(),
            clock_face: "face.svg".into(),
            second_hand: "second_hand.svg".into(),
            minute_hand: "minute_hand.svg".into(),
            hour_hand: "hour_hand.svg".into(),
            preview: "preview.svg".into(),
            show_second_hand: true,
            opacity: 1.0,
            framed: true,
            screen_percent: ScreenAnchor::default(),
            window_geometry: None,
        }
    }
}

/// Directory for the widget's configuration
pub fn config_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("com", "pmify", "Analog Clock Widget")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(SettingsError::NoConfigDir)
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join(SETTINGS_FILE))
    }

    /// Read settings from `path`. A missing file yields the defaults; keys
    /// absent from the file take their default values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let mut settings: Settings = serde_json::from_str(&contents)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Like [`Settings::load_from`], but any failure degrades to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), "unreadable settings, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn clock_state(&self) -> ClockState {
        ClockState {
            show_second_hand: self.show_second_hand,
            opacity: self.opacity,
            framed: self.framed,
        }
    }

    /// Restored window rect, if the stored one is usable.
    pub fn window_rect(&self) -> Option<Rect> {
        self.window_geometry
            .filter(WindowGeometry::is_usable)
            .map(|g| Rect::from_origin_size(g.position(), g.size()))
    }

    /// Fold the end-of-session state back in. `client_size` is stored rather
    /// than the outer size so that decorations are not counted twice on the
    /// next start.
    pub fn record_session(&mut self, state: ClockState, anchor: ScreenAnchor, outer: Rect, client_size: Size) {
        self.show_second_hand = state.show_second_hand;
        self.opacity = state.opacity;
        self.framed = state.framed;
        self.screen_percent = anchor;
        self.window_geometry = Some(WindowGeometry {
            x: outer.left(),
            y: outer.top(),
            width: client_size.width,
            height: client_size.height,
        });
        self.sanitize();
    }

    /// Pull hand-edited values back into range.
    fn sanitize(&mut self) {
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if !(self.screen_percent.x.is_finite() && self.screen_percent.y.is_finite()) {
            self.screen_percent = ScreenAnchor::default();
        }
    }

    /// Full path of an asset file, `None` when the bundled set is in use.
    pub fn asset_path(&self, file: &str) -> Option<PathBuf> {
        if self.svg_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.svg_path).join(file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let s = Settings::load_from(&path).unwrap();
        assert!(s.show_second_hand);
        assert_eq!(s.opacity, 1.0);
        assert_eq!(s.screen_percent, ScreenAnchor::new(0.5, 0.5));
        assert_eq!(s.window_geometry, None);
        assert_eq!(s.clock_face, "face.svg");
    }

    #[test]
    fn test_partial_file_is_completed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "opacity": 0.4, "show_second_hand": false }"#).unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.opacity, 0.4);
        assert!(!s.show_second_hand);
        assert_eq!(s.hour_hand, "hour_hand.svg");

        // rewriting heals the file: every key is present afterwards
        s.save_to(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for key in [
            "svg_path",
            "clock_face",
            "second_hand",
            "minute_hand",
            "hour_hand",
            "preview",
            "show_second_hand",
            "opacity",
            "framed",
            "screen_percent",
            "window_geometry",
        ] {
            assert!(raw.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Json(_))));
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "opacity": 3.0 }"#).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let mut s = Settings::default();
        let state = ClockState {
            show_second_hand: false,
            opacity: 0.7,
            framed: false,
        };
        s.record_session(
            state,
            ScreenAnchor::new(0.2, 0.8),
            Rect::new(384.0, 864.0, 200.0, 200.0),
            Size::new(200.0, 200.0),
        );
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.clock_state(), state);
        assert_eq!(loaded.screen_percent, ScreenAnchor::new(0.2, 0.8));
        assert_eq!(loaded.window_rect(), Some(Rect::new(384.0, 864.0, 200.0, 200.0)));
    }

    #[test]
    fn test_unusable_geometry_is_ignored() {
        let s = Settings {
            window_geometry: Some(WindowGeometry { x: 0.0, y: 0.0, width: 0.0, height: 200.0 }),
            ..Settings::default()
        };
        assert_eq!(s.window_rect(), None);
    }

    #[test]
    fn test_asset_path() {
        let mut s = Settings::default();
        assert_eq!(s.asset_path("face.svg"), None);
        s.svg_path = "/opt/clock".into();
        assert_eq!(s.asset_path("face.svg"), Some(PathBuf::from("/opt/clock/face.svg")));
    }
}
