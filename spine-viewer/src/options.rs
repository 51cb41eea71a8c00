use serde::Deserialize;

/// Per-frame drawing options, read once per frame from the UI.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ViewOptions {
    /// Treat page textures as premultiplied alpha. Off unless the checkbox says otherwise.
    pub premultiplied_alpha: bool,
    /// Draw bones on top of the skeleton. Off by default.
    pub debug_overlay: bool,
    pub clear_color: ClearColor,
}

/// Linear RGBA clear colour in `0..=1`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct ClearColor(pub [f32; 4]);

impl ClearColor {
    pub const TRANSPARENT: ClearColor = ClearColor([0.0, 0.0, 0.0, 0.0]);
    pub const LIGHT_VIEWPORT: ClearColor = ClearColor([0.94, 0.95, 0.96, 1.0]);

    /// Parses a computed CSS colour such as `rgb(12, 34, 56)` or `rgba(12, 34, 56, 0.5)`.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        let inner = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))?
            .strip_suffix(')')?;

        let parts = inner
            .split(|c: char| c == ',' || c == '/' || c.is_ascii_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f32>().ok())
            .collect::<Option<Vec<_>>>()?;

        match parts.as_slice() {
            [r, g, b] => Some(Self([r / 255.0, g / 255.0, b / 255.0, 1.0])),
            [r, g, b, a] => Some(Self([r / 255.0, g / 255.0, b / 255.0, a.clamp(0.0, 1.0)])),
            _ => None,
        }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::LIGHT_VIEWPORT
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Png,
    Webp,
}

impl SnapshotFormat {
    pub fn mime(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "image/png",
            SnapshotFormat::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Webp => "webp",
        }
    }

    /// Accepts a MIME type (`image/webp`) or a bare name (`webp`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.strip_prefix("image/").unwrap_or(value.as_str()) {
            "png" => Some(SnapshotFormat::Png),
            "webp" => Some(SnapshotFormat::Webp),
            _ => None,
        }
    }
}

/// Snapshot export settings, read once per export.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotOptions {
    /// Transparent margin around the content, in output pixels.
    pub padding_px: u32,
    /// Output length of the content's longer side, in pixels.
    pub target_long_side: u32,
    pub format: SnapshotFormat,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            padding_px: 50,
            target_long_side: 4096,
            format: SnapshotFormat::Png,
        }
    }
}

/// The padding slider and its numeric field share a value; the slider shows it as a fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaddingControl {
    pub min: f32,
    pub max: f32,
}

impl Default for PaddingControl {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
        }
    }
}

impl PaddingControl {
    pub fn fill_percent(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Value typed into the numeric field, if it is a number. Out-of-range values are kept; only
    /// the slider position saturates.
    pub fn parse_field(text: &str) -> Option<f32> {
        text.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }
}
