use serde::Deserialize;

use crate::{ClearColor, SnapshotFormat, SnapshotOptions, SurfaceSize, ViewerError};

/// Startup configuration. Every field has a default. The page may embed a JSON document and
/// override a few fields through the query string (`?padding=0.8&speed=0.5&log=debug`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fraction of the viewport the fitted content may occupy.
    pub fit_padding: f32,
    /// Playback speed multiplier, clamped to `0.0..=2.0`.
    pub speed: f32,
    pub layout: LayoutConfig,
    /// Used when the viewport's CSS background colour cannot be read.
    pub fallback_clear_color: ClearColor,
    pub snapshot: SnapshotOptions,
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fit_padding: 0.9,
            speed: 1.0,
            layout: LayoutConfig::default(),
            fallback_clear_color: ClearColor::LIGHT_VIEWPORT,
            snapshot: SnapshotOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(input).map_err(|e| ViewerError::Config {
            message: e.to_string(),
        })?;
        Ok(config.sanitized())
    }

    /// Applies decoded `key=value` pairs from the page URL. Unknown keys are skipped; unparsable
    /// values are ignored with a warning.
    pub fn apply_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            let applied = match key {
                "padding" => value.parse().map(|v| self.fit_padding = v).is_ok(),
                "speed" => value.parse().map(|v| self.speed = v).is_ok(),
                "log" => {
                    self.log_level = value.to_string();
                    true
                }
                "snapshot-padding" => value.parse().map(|v| self.snapshot.padding_px = v).is_ok(),
                "snapshot-size" => value
                    .parse()
                    .map(|v| self.snapshot.target_long_side = v)
                    .is_ok(),
                "snapshot-format" => SnapshotFormat::parse(value)
                    .map(|f| self.snapshot.format = f)
                    .is_some(),
                _ => continue,
            };
            if !applied {
                log::warn!("ignoring query parameter {key}={value}");
            }
        }
        *self = self.clone().sanitized();
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    fn sanitized(mut self) -> Self {
        if !(self.fit_padding > 0.0 && self.fit_padding <= 1.0) {
            log::warn!("fit padding {} out of range, using 0.9", self.fit_padding);
            self.fit_padding = 0.9;
        }
        self.speed = if self.speed.is_finite() {
            self.speed.clamp(0.0, 2.0)
        } else {
            1.0
        };
        self.snapshot.target_long_side = self.snapshot.target_long_side.max(1);
        self
    }
}

/// Canvas placement next to the control panel.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub side_panel_width: u32,
    /// The side panel only takes horizontal space when the window is wider than this.
    pub side_panel_breakpoint: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            side_panel_width: 340,
            side_panel_breakpoint: 768,
        }
    }
}

impl LayoutConfig {
    /// Backing-buffer size for a window of `inner_width` x `inner_height` CSS pixels.
    pub fn canvas_size(&self, inner_width: f64, inner_height: f64, device_pixel_ratio: f64) -> SurfaceSize {
        let panel = if inner_width > self.side_panel_breakpoint as f64 {
            self.side_panel_width as f64
        } else {
            0.0
        };
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.max(0.1)
        } else {
            1.0
        };

        let w = ((inner_width - panel).max(1.0) * dpr).round().max(1.0) as u32;
        let h = (inner_height.max(1.0) * dpr).round().max(1.0) as u32;
        SurfaceSize::new(w, h)
    }
}
