//! Plot style dispatch.
//!
//! Each [`PlotStyle`] maps to a [`PlotBuilder`] that turns a data source into scene
//! primitives. A style that does not fit the source falls back to one that does.

use histoscope_core::{PlotStyle, RenderConfig, Result};
use histoscope_render::LevelPalette;

use crate::bins3d::build_bins3d;
use crate::lego::build_lego;
use crate::markers::build_markers;
use crate::output::{DataSource, DrawOutput};
use crate::poly_lego::build_poly_lego;
use crate::scales::{DrawScales, ZoomWindows};
use crate::surface::{build_surface, surface_primitives};

/// Builds the content geometry of one plot style.
pub trait PlotBuilder {
    /// Style this builder draws.
    fn style(&self) -> PlotStyle;

    /// Builds the primitives of `source`. Sources the style can not draw yield
    /// empty output.
    fn build(
        &self,
        source: &DataSource,
        scales: &DrawScales,
        config: &RenderConfig,
        palette: &dyn LevelPalette,
    ) -> DrawOutput;
}

/// Box style: cubes or spheres for 3D grids.
pub struct BoxBuilder;
/// Lego boxes for 1D and 2D grids.
pub struct LegoBuilder;
/// Contour-clipped surface for 2D grids.
pub struct SurfaceBuilder;
/// Extruded polygon bins.
pub struct PolyLegoBuilder;
/// Point markers.
pub struct PointsBuilder;

impl PlotBuilder for BoxBuilder {
    fn style(&self) -> PlotStyle {
        PlotStyle::Box
    }

    fn build(&self, source: &DataSource, scales: &DrawScales, config: &RenderConfig, _: &dyn LevelPalette) -> DrawOutput {
        source
            .grid()
            .map(|grid| build_bins3d(grid, scales, config))
            .unwrap_or_default()
    }
}

impl PlotBuilder for LegoBuilder {
    fn style(&self) -> PlotStyle {
        PlotStyle::Lego
    }

    fn build(
        &self,
        source: &DataSource,
        scales: &DrawScales,
        config: &RenderConfig,
        palette: &dyn LevelPalette,
    ) -> DrawOutput {
        source
            .grid()
            .map(|grid| build_lego(grid, scales, config, palette))
            .unwrap_or_default()
    }
}

impl PlotBuilder for SurfaceBuilder {
    fn style(&self) -> PlotStyle {
        PlotStyle::Surface
    }

    fn build(
        &self,
        source: &DataSource,
        scales: &DrawScales,
        config: &RenderConfig,
        palette: &dyn LevelPalette,
    ) -> DrawOutput {
        let Some(grid) = source.grid() else {
            return DrawOutput::default();
        };
        let geometry = build_surface(grid, scales, config, palette);
        for issue in &geometry.issues {
            log::error!("surface topology: {issue}");
        }
        surface_primitives(geometry, config, palette)
    }
}

impl PlotBuilder for PolyLegoBuilder {
    fn style(&self) -> PlotStyle {
        PlotStyle::PolyLego
    }

    fn build(
        &self,
        source: &DataSource,
        scales: &DrawScales,
        config: &RenderConfig,
        palette: &dyn LevelPalette,
    ) -> DrawOutput {
        match source {
            DataSource::Poly(grid) => build_poly_lego(grid, scales, config, palette),
            _ => DrawOutput::default(),
        }
    }
}

impl PlotBuilder for PointsBuilder {
    fn style(&self) -> PlotStyle {
        PlotStyle::Points
    }

    fn build(&self, source: &DataSource, scales: &DrawScales, config: &RenderConfig, _: &dyn LevelPalette) -> DrawOutput {
        match source {
            DataSource::Points(points) => build_markers(points, scales, config),
            _ => DrawOutput::default(),
        }
    }
}

/// Builder for a style.
#[must_use]
pub fn builder_for(style: PlotStyle) -> &'static dyn PlotBuilder {
    match style {
        PlotStyle::Box => &BoxBuilder,
        PlotStyle::Lego => &LegoBuilder,
        PlotStyle::Surface => &SurfaceBuilder,
        PlotStyle::PolyLego => &PolyLegoBuilder,
        PlotStyle::Points => &PointsBuilder,
    }
}

/// The style actually drawn for `source` when `requested` is configured.
///
/// Polygon and point sources always use their own style. Histograms draw 3D grids
/// as boxes, surfaces only for 2D grids, and lego otherwise.
#[must_use]
pub fn effective_style(requested: PlotStyle, source: &DataSource) -> PlotStyle {
    let style = match source {
        DataSource::Poly(_) => PlotStyle::PolyLego,
        DataSource::Points(_) => PlotStyle::Points,
        DataSource::Histogram(grid) => match (requested, grid.dimension()) {
            (_, 3) => PlotStyle::Box,
            (PlotStyle::Surface, 2) => PlotStyle::Surface,
            _ => PlotStyle::Lego,
        },
    };
    if style != requested {
        log::debug!("plot style {requested:?} drawn as {style:?} for {source:?}");
    }
    style
}

/// Axis scales for a data source.
pub fn scales_for(source: &DataSource, config: &RenderConfig, zoom: &ZoomWindows) -> Result<DrawScales> {
    match source {
        DataSource::Histogram(grid) => DrawScales::for_grid(grid.as_ref(), config, zoom),
        DataSource::Poly(grid) => DrawScales::for_poly(grid, config, zoom),
        DataSource::Points(points) => DrawScales::for_points(points, config, zoom),
    }
}

/// Builds scales and content geometry in one go.
pub fn build_plot(
    source: &DataSource,
    config: &RenderConfig,
    zoom: &ZoomWindows,
    palette: &dyn LevelPalette,
) -> Result<(DrawScales, DrawOutput)> {
    let scales = scales_for(source, config, zoom)?;
    let style = effective_style(config.plot_style, source);
    let output = builder_for(style).build(source, &scales, config, palette);
    log::debug!(
        "{style:?}: {} primitives, {} triangles",
        output.primitives.len(),
        output.triangle_count()
    );
    Ok((scales, output))
}

#[cfg(test)]
mod tests {
    use glam::{DVec2, DVec3};
    use histoscope_core::{uniform_edges, HistogramGrid, PointSet, PolyBin, PolyGrid};
    use histoscope_render::ColorMapPalette;

    use super::*;

    fn grid4x4() -> DataSource {
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|j| (1..=4).map(|i| f64::from(i + 4 * j)).collect())
            .collect();
        DataSource::Histogram(Box::new(
            HistogramGrid::from_rows((0.0, 4.0), (0.0, 4.0), &rows).unwrap(),
        ))
    }

    #[test]
    fn test_box_on_2d_grid_draws_lego() {
        let source = grid4x4();
        let config = RenderConfig {
            plot_style: PlotStyle::Box,
            ..RenderConfig::default()
        };
        let (_, output) = build_plot(&source, &config, &[None; 3], &ColorMapPalette::default()).unwrap();
        let meshes: Vec<_> = output.meshes().collect();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].triangle_count(), 192);
        let mut bins = meshes[0].bin_index_per_group.clone();
        bins.sort_unstable();
        bins.dedup();
        assert_eq!(bins, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_style_fallbacks() {
        let cube = DataSource::Histogram(Box::new(
            HistogramGrid::new_3d(
                uniform_edges(0.0, 1.0, 2),
                uniform_edges(0.0, 1.0, 2),
                uniform_edges(0.0, 1.0, 2),
                vec![1.0; 8],
            )
            .unwrap(),
        ));
        assert_eq!(effective_style(PlotStyle::Lego, &cube), PlotStyle::Box);
        assert_eq!(effective_style(PlotStyle::Surface, &grid4x4()), PlotStyle::Surface);
        assert_eq!(effective_style(PlotStyle::Points, &grid4x4()), PlotStyle::Lego);

        let poly = DataSource::Poly(PolyGrid::new(vec![PolyBin::new(
            vec![DVec2::ZERO, DVec2::X, DVec2::ONE],
            1.0,
        )]));
        assert_eq!(effective_style(PlotStyle::Lego, &poly), PlotStyle::PolyLego);
        let points = DataSource::Points(PointSet::new(vec![DVec3::ZERO]));
        assert_eq!(effective_style(PlotStyle::Box, &points), PlotStyle::Points);
    }

    #[test]
    fn test_mismatched_builder_is_empty() {
        let source = grid4x4();
        let config = RenderConfig::default();
        let scales = scales_for(&source, &config, &[None; 3]).unwrap();
        let palette = ColorMapPalette::default();
        for style in [PlotStyle::PolyLego, PlotStyle::Points] {
            let builder = builder_for(style);
            assert_eq!(builder.style(), style);
            assert!(builder.build(&source, &scales, &config, &palette).primitives.is_empty());
        }
    }

    #[test]
    fn test_surface_style_builds_bands() {
        let source = grid4x4();
        let config = RenderConfig {
            plot_style: PlotStyle::Surface,
            ..RenderConfig::default()
        };
        let (_, output) = build_plot(&source, &config, &[None; 3], &ColorMapPalette::default()).unwrap();
        assert!(output.triangle_count() > 0);
        assert!(output.lines().count() >= 1);
    }
}
