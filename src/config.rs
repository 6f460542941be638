// ── Settings ──────────────────────────────────────────────────────────────────
//
// Reads `%APPDATA%\Pancanvas\config.json` (or the file named by
// `PANCANVAS_CONFIG`).  Read-only: nothing is ever written back.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, io, path::PathBuf};

use serde::Deserialize;

use crate::{
    error::Result,
    geometry::{Color, Size},
    workspace::Palette,
};

/// Environment variable that overrides the settings file location.
pub(crate) const CONFIG_ENV: &str = "PANCANVAS_CONFIG";

/// Largest accepted client width or height.  WM_SIZE reports sizes in
/// 16-bit words, so nothing larger round-trips through the window.
pub(crate) const MAX_CLIENT_EXTENT: i32 = i16::MAX as i32;

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Root of the JSON settings file.  Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Title bar text.
    pub(crate) title: String,
    /// Initial client width in 96-DPI pixels; scaled to the system DPI.
    pub(crate) width: i32,
    /// Initial client height in 96-DPI pixels.
    pub(crate) height: i32,
    /// Fill behind the canvas.
    pub(crate) background: Color,
    /// Initial fill of the canvas.
    pub(crate) canvas: Color,
}

impl Default for Config {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            title: "Pancanvas".to_owned(),
            width: 800,
            height: 600,
            background: palette.background,
            canvas: palette.canvas,
        }
    }
}

impl Config {
    pub(crate) fn palette(&self) -> Palette {
        Palette {
            background: self.background,
            canvas: self.canvas,
        }
    }

    /// Requested client size, with non-positive dimensions replaced by the
    /// defaults and oversized ones capped at `MAX_CLIENT_EXTENT`.
    pub(crate) fn client_size(&self) -> Size {
        let defaults = Self::default();
        let pick = |v: i32, d: i32| if v > 0 { v.min(MAX_CLIENT_EXTENT) } else { d };
        Size::new(pick(self.width, defaults.width), pick(self.height, defaults.height))
    }

    /// Parse settings from JSON text.
    pub(crate) fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `$PANCANVAS_CONFIG` if set, otherwise `%APPDATA%\Pancanvas\config.json`.
///
/// Returns `None` if neither variable is set.
pub(crate) fn config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Pancanvas");
    p.push("config.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read the settings file at `path`.
///
/// A missing file is not an error and yields `None`.
pub(crate) fn read(path: &std::path::Path) -> Result<Option<Config>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Config::from_json(&text).map(Some)
}

/// Load settings, falling back to defaults.
///
/// Unreadable or malformed files are reported with a warning; the program
/// always starts.
pub(crate) fn load() -> Config {
    let Some(path) = config_path() else {
        log::debug!("no settings location (APPDATA unset); using defaults");
        return Config::default();
    };

    match read(&path) {
        Ok(Some(cfg)) => {
            log::info!("settings loaded from {}", path.display());
            cfg
        }
        Ok(None) => {
            log::debug!("no settings at {}; using defaults", path.display());
            Config::default()
        }
        Err(e) => {
            log::warn!("ignoring settings at {}: {e}", path.display());
            Config::default()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
