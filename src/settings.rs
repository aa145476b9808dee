use crate::keyboard_hook::DEFAULT_QUEUE_CAPACITY;
use crate::overlay::grid::{
    GridConfig, DEFAULT_CLEAR_ROW_MS, DEFAULT_HOLD_MS, DEFAULT_ICON_SIZE_PX,
    DEFAULT_LABEL_PITCH_PX, DEFAULT_NEW_ROW_MS, DEFAULT_ROW_HEIGHT_PX, DEFAULT_ROW_WIDTH_PX,
};
use crate::overlay::sink::LabelStyle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverlayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl OverlayColor {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_pixel(self) -> image::Rgba<u8> {
        image::Rgba(self.to_rgba_array())
    }
}

/// Text colours per label style plus the window's keyed-out background.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelPalette {
    pub neutral: OverlayColor,
    pub press: OverlayColor,
    pub release: OverlayColor,
    pub held: OverlayColor,
    /// Drawn behind gap text.
    pub text_background: OverlayColor,
    /// Window background and icon corner fill, for chroma keying in capture software.
    pub chroma_key: OverlayColor,
}

impl Default for LabelPalette {
    fn default() -> Self {
        Self {
            neutral: OverlayColor::rgb(255, 255, 255),
            press: OverlayColor::rgb(255, 255, 0),
            release: OverlayColor::rgb(255, 0, 0),
            held: OverlayColor::rgb(0, 0, 255),
            text_background: OverlayColor::rgb(0, 0, 0),
            chroma_key: OverlayColor::rgb(0, 255, 0),
        }
    }
}

impl LabelPalette {
    pub fn text_color(&self, style: LabelStyle) -> OverlayColor {
        match style {
            LabelStyle::Neutral => self.neutral,
            LabelStyle::Press => self.press,
            LabelStyle::Release => self.release,
            LabelStyle::Held => self.held,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetPaths {
    /// Screenshot of the key bindings screen the icons are cut from.
    pub bindings: PathBuf,
    /// Small marker image locating the sheet origin inside `bindings`.
    pub marker: PathBuf,
    pub arrows: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            bindings: PathBuf::from("bindings.png"),
            marker: PathBuf::from("magic.png"),
            arrows: PathBuf::from("arrows.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlaySettings {
    /// Idle gap in milliseconds after which the next key starts a new row.
    #[serde(default = "default_new_row_ms")]
    pub new_row_ms: u64,
    /// Rows idle for longer than this many milliseconds disappear.
    #[serde(default = "default_clear_row_ms")]
    pub clear_row_ms: u64,
    /// Repeats of the same key faster than this are merged into one label.
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    #[serde(default = "default_row_height_px")]
    pub row_height_px: i32,
    #[serde(default = "default_label_pitch_px")]
    pub label_pitch_px: i32,
    /// Window width; also decides how many labels fit in a row.
    #[serde(default = "default_row_width_px")]
    pub row_width_px: i32,
    #[serde(default = "default_window_height_px")]
    pub window_height_px: i32,
    #[serde(default = "default_icon_size_px")]
    pub icon_size_px: i32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub always_on_top: bool,
    #[serde(default)]
    pub palette: LabelPalette,
    #[serde(default)]
    pub assets: AssetPaths,
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Also write logs to a daily rotated file in this folder.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_new_row_ms() -> u64 {
    DEFAULT_NEW_ROW_MS
}

fn default_clear_row_ms() -> u64 {
    DEFAULT_CLEAR_ROW_MS
}

fn default_hold_ms() -> u64 {
    DEFAULT_HOLD_MS
}

fn default_row_height_px() -> i32 {
    DEFAULT_ROW_HEIGHT_PX
}

fn default_label_pitch_px() -> i32 {
    DEFAULT_LABEL_PITCH_PX
}

fn default_row_width_px() -> i32 {
    DEFAULT_ROW_WIDTH_PX
}

fn default_window_height_px() -> i32 {
    900
}

fn default_icon_size_px() -> i32 {
    DEFAULT_ICON_SIZE_PX
}

fn default_font_size() -> f32 {
    12.0
}

fn default_event_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            new_row_ms: default_new_row_ms(),
            clear_row_ms: default_clear_row_ms(),
            hold_ms: default_hold_ms(),
            row_height_px: default_row_height_px(),
            label_pitch_px: default_label_pitch_px(),
            row_width_px: default_row_width_px(),
            window_height_px: default_window_height_px(),
            icon_size_px: default_icon_size_px(),
            font_size: default_font_size(),
            always_on_top: false,
            palette: LabelPalette::default(),
            assets: AssetPaths::default(),
            event_queue_capacity: default_event_queue_capacity(),
            debug_logging: false,
            log_dir: None,
        }
    }
}

impl OverlaySettings {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            new_row: Duration::from_millis(self.new_row_ms),
            clear_row: Duration::from_millis(self.clear_row_ms),
            hold: Duration::from_millis(self.hold_ms),
            row_height: self.row_height_px,
            label_pitch: self.label_pitch_px,
            row_width: self.row_width_px,
            icon_size: self.icon_size_px,
        }
    }

    /// Clamps geometry that would make the layout degenerate. Returns whether
    /// anything was changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        self.row_height_px = self.row_height_px.max(1);
        self.label_pitch_px = self.label_pitch_px.max(1);
        self.icon_size_px = self.icon_size_px.max(1);
        self.row_width_px = self.row_width_px.max(self.label_pitch_px);
        self.window_height_px = self.window_height_px.max(self.row_height_px);
        self.event_queue_capacity = self.event_queue_capacity.max(1);
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            self.font_size = default_font_size();
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_overlay_settings() {
        let settings = OverlaySettings::default();
        let json = serde_json::to_string(&settings).expect("serialize overlay settings");
        let decoded: OverlaySettings =
            serde_json::from_str(&json).expect("deserialize overlay settings");
        assert_eq!(decoded, settings);
    }

    #[test]
    fn defaults_match_reference_timing_and_geometry() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.new_row_ms, 1380);
        assert_eq!(settings.clear_row_ms, 2250);
        assert_eq!(settings.hold_ms, 75);
        assert_eq!(settings.row_height_px, 60);
        assert_eq!(settings.label_pitch_px, 45);
        assert_eq!(settings.row_width_px, 410);
        assert_eq!(settings.window_height_px, 900);
        assert_eq!(settings.grid_config(), GridConfig::default());
        assert_eq!(settings.assets.marker, PathBuf::from("magic.png"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let decoded: OverlaySettings = serde_json::from_value(serde_json::json!({
            "hold_ms": 40,
            "palette": { "press": { "r": 1, "g": 2, "b": 3, "a": 255 } }
        }))
        .expect("deserialize partial settings");

        assert_eq!(decoded.hold_ms, 40);
        assert_eq!(decoded.new_row_ms, 1380);
        assert_eq!(decoded.palette.press, OverlayColor::rgb(1, 2, 3));
        assert_eq!(decoded.palette.release, OverlayColor::rgb(255, 0, 0));
        assert_eq!(decoded.assets, AssetPaths::default());
    }

    #[test]
    fn palette_maps_styles_to_colours() {
        let palette = LabelPalette::default();
        assert_eq!(palette.text_color(LabelStyle::Press), OverlayColor::rgb(255, 255, 0));
        assert_eq!(palette.text_color(LabelStyle::Release), OverlayColor::rgb(255, 0, 0));
        assert_eq!(palette.text_color(LabelStyle::Held), OverlayColor::rgb(0, 0, 255));
        assert_eq!(palette.chroma_key.to_pixel(), image::Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn sanitize_repairs_degenerate_geometry() {
        let mut settings = OverlaySettings::default();
        assert!(!settings.sanitize());

        settings.label_pitch_px = 0;
        settings.row_width_px = -5;
        settings.event_queue_capacity = 0;
        settings.font_size = f32::NAN;

        assert!(settings.sanitize());
        assert_eq!(settings.label_pitch_px, 1);
        assert_eq!(settings.row_width_px, 1);
        assert_eq!(settings.event_queue_capacity, 1);
        assert_eq!(settings.font_size, 12.0);
        assert!(settings.grid_config().max_labels_per_row() >= 1);
    }
}
