use serde::{Deserialize, Serialize};

use crate::guide::input::{GuideTuning, DEFAULT_GHOST_RADIUS_STEP, DEFAULT_HALF_WIDTH_STEP};
use crate::guide::model::{DEFAULT_GHOST_RADIUS, DEFAULT_GRAB_RADIUS, MIN_GHOST_RADIUS};
use crate::guide::render::{
    CircleStyle, Color, GuideStyle, StrokeStyle, MAX_STROKE_WIDTH, TRANSPARENCY_COLORKEY,
};

const COLORKEY_SAFE_FALLBACK: GuideColor = GuideColor::rgba(254, 0, 255, 255);
const DEFAULT_MARKER_RADIUS: f32 = 5.0;
const DEFAULT_LINE_WIDTH: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuideColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl GuideColor {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color(self) -> Color {
        Color::rgba(self.r, self.g, self.b, self.a)
    }

    pub fn collides_with_colorkey(self) -> bool {
        self.to_color().matches_rgb(TRANSPARENCY_COLORKEY)
    }

    pub fn resolve_colorkey_collision(self) -> Self {
        if self.collides_with_colorkey() {
            COLORKEY_SAFE_FALLBACK
        } else {
            self
        }
    }
}

/// Startup parameters for the overlay, read once from `guide_settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuideSettings {
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_ghost_radius")]
    pub ghost_radius: f32,
    #[serde(default = "default_grab_radius")]
    pub grab_radius: f32,
    #[serde(default = "default_ghost_radius_step")]
    pub ghost_radius_step: f32,
    #[serde(default = "default_half_width_step")]
    pub half_width_step: f32,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    #[serde(default = "default_ghost_filled")]
    pub ghost_filled: bool,
    #[serde(default = "default_guide_line_color")]
    pub guide_line_color: GuideColor,
    #[serde(default = "default_mouth_color")]
    pub mouth_color: GuideColor,
    #[serde(default = "default_marker_color")]
    pub marker_color: GuideColor,
    #[serde(default = "default_ghost_color")]
    pub ghost_color: GuideColor,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            ghost_radius: default_ghost_radius(),
            grab_radius: default_grab_radius(),
            ghost_radius_step: default_ghost_radius_step(),
            half_width_step: default_half_width_step(),
            marker_radius: default_marker_radius(),
            line_width: default_line_width(),
            ghost_filled: default_ghost_filled(),
            guide_line_color: default_guide_line_color(),
            mouth_color: default_mouth_color(),
            marker_color: default_marker_color(),
            ghost_color: default_ghost_color(),
        }
    }
}

impl GuideSettings {
    /// Replaces values the overlay cannot honor. Colors equal to the
    /// transparency colorkey would render invisible and are nudged off it.
    pub fn sanitize(&mut self) {
        self.ghost_radius = finite_or(self.ghost_radius, default_ghost_radius()).max(MIN_GHOST_RADIUS);
        self.grab_radius = positive_or(self.grab_radius, default_grab_radius());
        self.ghost_radius_step = positive_or(self.ghost_radius_step, default_ghost_radius_step());
        self.half_width_step = positive_or(self.half_width_step, default_half_width_step());
        self.marker_radius = positive_or(self.marker_radius, default_marker_radius());
        self.line_width = self.line_width.clamp(1, MAX_STROKE_WIDTH);

        self.guide_line_color = self.guide_line_color.resolve_colorkey_collision();
        self.mouth_color = self.mouth_color.resolve_colorkey_collision();
        self.marker_color = self.marker_color.resolve_colorkey_collision();
        self.ghost_color = self.ghost_color.resolve_colorkey_collision();
    }

    pub fn tuning(&self) -> GuideTuning {
        GuideTuning {
            grab_radius: self.grab_radius,
            ghost_radius_step: self.ghost_radius_step,
            half_width_step: self.half_width_step,
        }
    }

    pub fn style(&self) -> GuideStyle {
        GuideStyle {
            guide_line: StrokeStyle {
                width: self.line_width,
                color: self.guide_line_color.to_color(),
            },
            mouth: StrokeStyle {
                width: self.line_width,
                color: self.mouth_color.to_color(),
            },
            marker: CircleStyle {
                color: self.marker_color.to_color(),
                filled: true,
                stroke_width: 1,
            },
            marker_radius: self.marker_radius,
            ghost: CircleStyle {
                color: self.ghost_color.to_color(),
                filled: self.ghost_filled,
                stroke_width: self.line_width,
            },
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn default_ghost_radius() -> f32 {
    DEFAULT_GHOST_RADIUS
}

fn default_grab_radius() -> f32 {
    DEFAULT_GRAB_RADIUS
}

fn default_ghost_radius_step() -> f32 {
    DEFAULT_GHOST_RADIUS_STEP
}

fn default_half_width_step() -> f32 {
    DEFAULT_HALF_WIDTH_STEP
}

fn default_marker_radius() -> f32 {
    DEFAULT_MARKER_RADIUS
}

fn default_line_width() -> u32 {
    DEFAULT_LINE_WIDTH
}

fn default_ghost_filled() -> bool {
    true
}

fn default_guide_line_color() -> GuideColor {
    GuideColor::rgba(0, 255, 0, 255)
}

fn default_mouth_color() -> GuideColor {
    GuideColor::rgba(0, 140, 255, 255)
}

fn default_marker_color() -> GuideColor {
    GuideColor::rgba(255, 255, 255, 255)
}

fn default_ghost_color() -> GuideColor {
    GuideColor::rgba(255, 255, 255, 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_style_and_tuning() {
        let settings = GuideSettings::default();
        assert_eq!(settings.style(), GuideStyle::default());
        assert_eq!(settings.tuning(), GuideTuning::default());
    }

    #[test]
    fn partial_json_fills_remaining_fields_with_defaults() {
        let settings: GuideSettings =
            serde_json::from_str(r#"{ "ghost_radius": 22.0, "debug_logging": true }"#)
                .expect("partial settings");
        assert_eq!(settings.ghost_radius, 22.0);
        assert!(settings.debug_logging);
        assert_eq!(settings.half_width_step, DEFAULT_HALF_WIDTH_STEP);
        assert_eq!(settings.mouth_color, default_mouth_color());
    }

    #[test]
    fn sanitize_repairs_unusable_values() {
        let mut settings = GuideSettings {
            ghost_radius: 1.0,
            grab_radius: -3.0,
            ghost_radius_step: 0.0,
            half_width_step: f32::NAN,
            marker_radius: 0.0,
            line_width: 0,
            ..GuideSettings::default()
        };
        settings.sanitize();

        assert_eq!(settings.ghost_radius, MIN_GHOST_RADIUS);
        assert_eq!(settings.grab_radius, DEFAULT_GRAB_RADIUS);
        assert_eq!(settings.ghost_radius_step, DEFAULT_GHOST_RADIUS_STEP);
        assert_eq!(settings.half_width_step, DEFAULT_HALF_WIDTH_STEP);
        assert_eq!(settings.marker_radius, DEFAULT_MARKER_RADIUS);
        assert_eq!(settings.line_width, 1);
    }

    #[test]
    fn oversized_line_width_is_capped() {
        let mut settings: GuideSettings =
            serde_json::from_str(r#"{ "line_width": 100000 }"#).expect("settings");
        settings.sanitize();
        assert_eq!(settings.line_width, MAX_STROKE_WIDTH);
        assert_eq!(settings.style().guide_line.width, MAX_STROKE_WIDTH);
    }

    #[test]
    fn colorkey_colors_are_nudged_to_fallback() {
        let mut settings = GuideSettings {
            ghost_color: GuideColor::rgba(255, 0, 255, 128),
            ..GuideSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.ghost_color, COLORKEY_SAFE_FALLBACK);
        assert!(!settings.ghost_color.collides_with_colorkey());
        assert_eq!(settings.mouth_color, default_mouth_color());
    }

    #[test]
    fn outline_ghost_uses_line_width() {
        let settings = GuideSettings {
            ghost_filled: false,
            line_width: 3,
            ..GuideSettings::default()
        };
        let style = settings.style();
        assert!(!style.ghost.filled);
        assert_eq!(style.ghost.stroke_width, 3);
        assert_eq!(style.guide_line.width, 3);
    }
}
