//! Draw configuration.
//!
//! A [`RenderConfig`] is passed explicitly into every build call; nothing in the
//! crate consults global style state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Pure red, used as the highlight color on green fills.
pub const TIP_RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
/// Pure green, the default highlight color.
pub const TIP_GREEN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Which geometry style a draw produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlotStyle {
    /// Boxes for 3D grids; falls back to lego for 1D/2D grids.
    Box,
    /// Stacked boxes whose height follows the bin content.
    #[default]
    Lego,
    /// Contour-clipped triangulated surface through bin centers.
    Surface,
    /// Extruded polygonal bins.
    PolyLego,
    /// Scattered point markers.
    Points,
}

/// How faces are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// One fill color for everything.
    #[default]
    Single,
    /// One palette color per level band.
    Palette,
}

/// Variant of the surface plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMode {
    /// Levels at the major value ticks, contour lines and wire lines.
    #[default]
    Lines,
    /// Palette levels with per-level colors and wire lines.
    ColorFaces,
    /// Palette levels with per-level colors, no wire lines.
    ColorFacesNoLines,
    /// Single band over the whole box with averaged corner normals.
    SmoothNormals,
    /// Palette levels with contour lines, no wire lines.
    ContourGrid,
}

/// Shape drawn for each bin of a 3D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinShape {
    /// Axis-aligned cube.
    #[default]
    Cube,
    /// UV sphere.
    Sphere,
}

/// How point markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerMode {
    /// One vertex per point.
    #[default]
    Points,
    /// A small cube per point.
    Boxes,
}

/// Configuration for one draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Geometry style.
    pub plot_style: PlotStyle,

    /// Number of level bands (1 draws a single band).
    pub level_count: usize,

    /// Face coloring.
    pub color_mode: ColorMode,

    /// Whether zoom planes are created.
    pub zoom_enabled: bool,

    /// Whether 1D data maps its value onto the third axis.
    pub use_second_axis_for_third_dimension: bool,

    /// Draw bins sitting exactly at the value-axis minimum as flat quads.
    pub draw_zero_bins: bool,

    /// Move the +-x faces of lego boxes into a second, red buffer.
    pub split_faces: bool,

    /// Draw wireframe border lines around lego boxes and 3D bins.
    pub border_lines: bool,

    /// Surface plot variant.
    pub surface_mode: SurfaceMode,

    /// Shape for 3D grid bins.
    pub bin_shape: BinShape,

    /// Point marker mode.
    pub marker_mode: MarkerMode,

    /// Thin large marker sets in boxes mode.
    pub optimize_markers: bool,

    /// Marker count above which thinning kicks in.
    pub marker_size_limit: usize,

    /// Logarithmic x axis.
    pub log_x: bool,
    /// Logarithmic y axis.
    pub log_y: bool,
    /// Logarithmic value axis.
    pub log_z: bool,

    /// Half-width of the draw box; z spans `[0, 2 * extent]`.
    pub extent: f64,

    /// Factor applied to the value maximum when the value axis is not zoomed.
    pub value_margin: f64,

    /// Explicit value-axis minimum.
    pub value_min: Option<f64>,
    /// Explicit value-axis maximum.
    pub value_max: Option<f64>,

    /// First-render time above which hover highlighting is disabled.
    pub highlight_latency_ms: u64,

    /// Default delay for coalesced render requests.
    pub render_delay_ms: u64,

    /// Show the front edges of the frame box.
    pub front_box: bool,
    /// Show the back edges of the frame box and the wall grids.
    pub back_box: bool,

    /// Fill color for single-color draws.
    pub fill_color: Vec3,
    /// Line color for wireframes and contour lines.
    pub line_color: Vec3,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plot_style: PlotStyle::Lego,
            level_count: 1,
            color_mode: ColorMode::Single,
            zoom_enabled: true,
            use_second_axis_for_third_dimension: false,
            draw_zero_bins: false,
            split_faces: false,
            border_lines: true,
            surface_mode: SurfaceMode::Lines,
            bin_shape: BinShape::Cube,
            marker_mode: MarkerMode::Points,
            optimize_markers: true,
            marker_size_limit: 50_000,
            log_x: false,
            log_y: false,
            log_z: false,
            extent: 100.0,
            value_margin: 1.1,
            value_min: None,
            value_max: None,
            highlight_latency_ms: 1200,
            render_delay_ms: 5,
            front_box: true,
            back_box: true,
            fill_color: Vec3::new(1.0, 1.0, 1.0),
            line_color: Vec3::ZERO,
        }
    }
}

impl RenderConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Text size used for tick labels.
    #[must_use]
    pub fn text_size(&self) -> f64 {
        (self.extent * 0.05).round()
    }

    /// Length of a major tick mark.
    #[must_use]
    pub fn tick_length(&self) -> f64 {
        self.text_size() * 0.5
    }

    /// Draw-space range of the given axis.
    #[must_use]
    pub fn draw_range(&self, axis: crate::axis::AxisId) -> (f64, f64) {
        match axis {
            crate::axis::AxisId::X | crate::axis::AxisId::Y => (-self.extent, self.extent),
            crate::axis::AxisId::Z => (0.0, 2.0 * self.extent),
        }
    }

    /// Whether bins sitting at the value minimum are drawn.
    #[must_use]
    pub fn show_min(&self, axis_zmin: f64) -> bool {
        self.draw_zero_bins || axis_zmin > 0.0
    }
}

/// Highlight color for a given fill: red on green fills, green otherwise.
#[must_use]
pub fn tip_color_for(fill: Vec3) -> Vec3 {
    if fill == TIP_GREEN {
        TIP_RED
    } else {
        TIP_GREEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.plot_style, PlotStyle::Lego);
        assert_eq!(config.level_count, 1);
        assert!((config.extent - 100.0).abs() < 1e-12);
        assert!((config.text_size() - 5.0).abs() < 1e-12);
        assert!((config.tick_length() - 2.5).abs() < 1e-12);
        assert_eq!(config.highlight_latency_ms, 1200);
    }

    #[test]
    fn test_partial_json() {
        let config =
            RenderConfig::from_json(r#"{ "plot_style": "surface", "log_z": true }"#).unwrap();
        assert_eq!(config.plot_style, PlotStyle::Surface);
        assert!(config.log_z);
        assert_eq!(config.render_delay_ms, 5);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = RenderConfig::default();
        config.surface_mode = SurfaceMode::SmoothNormals;
        config.value_max = Some(42.0);
        let text = config.to_json().unwrap();
        assert_eq!(RenderConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_json() {
        assert!(RenderConfig::from_json("{ plot_style: ").is_err());
    }

    #[test]
    fn test_show_min() {
        let mut config = RenderConfig::default();
        assert!(!config.show_min(0.0));
        assert!(config.show_min(0.5));
        config.draw_zero_bins = true;
        assert!(config.show_min(0.0));
    }

    #[test]
    fn test_tip_color() {
        assert_eq!(tip_color_for(TIP_GREEN), TIP_RED);
        assert_eq!(tip_color_for(Vec3::ONE), TIP_GREEN);
    }
}
