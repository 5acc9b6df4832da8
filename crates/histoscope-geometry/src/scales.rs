//! Axis setup for one draw.
//!
//! Turns a data source, the configuration and the current zoom windows into the
//! three [`AxisScale`]s every builder maps through.

use glam::Vec3;
use histoscope_core::{
    AxisId, AxisKind, AxisRange, AxisScale, Grid, PointSet, PolyGrid, RenderConfig, Result,
};

/// Current zoom window per axis.
pub type ZoomWindows = [Option<(f64, f64)>; 3];

/// The three axis mappings of a draw plus the value range.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawScales {
    pub x: AxisScale,
    pub y: AxisScale,
    pub z: AxisScale,
    /// Smallest content over the source.
    pub gmin: f64,
    /// Largest content over the source.
    pub gmax: f64,
    /// Half-width of the draw box.
    pub extent: f64,
}

impl DrawScales {
    /// Scale of `axis`.
    #[must_use]
    pub fn axis(&self, axis: AxisId) -> &AxisScale {
        match axis {
            AxisId::X => &self.x,
            AxisId::Y => &self.y,
            AxisId::Z => &self.z,
        }
    }

    /// Draw x of a data value.
    #[must_use]
    pub fn grx(&self, v: f64) -> f32 {
        self.x.to_draw(v) as f32
    }

    /// Draw y of a data value.
    #[must_use]
    pub fn gry(&self, v: f64) -> f32 {
        self.y.to_draw(v) as f32
    }

    /// Draw z of a data value.
    #[must_use]
    pub fn grz(&self, v: f64) -> f32 {
        self.z.to_draw(v) as f32
    }

    /// Draw position of a data point.
    #[must_use]
    pub fn to_draw(&self, p: glam::DVec3) -> Vec3 {
        Vec3::new(self.grx(p.x), self.gry(p.y), self.grz(p.z))
    }

    /// Draw-box half-width as `f32`.
    #[must_use]
    pub fn size3d(&self) -> f32 {
        self.extent as f32
    }

    /// Builds scales for a histogram grid.
    ///
    /// 1D and 2D grids put the content on z; 3D grids use their third axis.
    pub fn for_grid(grid: &dyn Grid, config: &RenderConfig, zoom: &ZoomWindows) -> Result<Self> {
        let (gmin, gmax) = grid.content_range();
        let x = edge_scale(grid, AxisId::X, config.log_x, config, zoom[0])?;
        let dimension = grid.dimension();

        let y_zoom = if dimension == 1 { None } else { zoom[1] };
        let y = if dimension == 1 {
            AxisScale::configure(AxisKind::Linear, 0.0, 1.0, -config.extent, config.extent, None, None)?
        } else {
            edge_scale(grid, AxisId::Y, config.log_y, config, y_zoom)?
        };

        let z = if dimension == 3 {
            edge_scale(grid, AxisId::Z, config.log_z, config, zoom[2])?
        } else {
            let value_zoom = if dimension == 1 && config.use_second_axis_for_third_dimension {
                zoom[1]
            } else {
                zoom[2]
            };
            value_scale(gmin, gmax, grid.min_positive(), config, value_zoom)?
        };

        log::debug!(
            "draw scales: x {:?} y {:?} z {:?}",
            x.domain(),
            y.domain(),
            z.domain()
        );
        Ok(Self {
            x,
            y,
            z,
            gmin,
            gmax,
            extent: config.extent,
        })
    }

    /// Builds scales for polygon bins.
    pub fn for_poly(grid: &PolyGrid, config: &RenderConfig, zoom: &ZoomWindows) -> Result<Self> {
        let (lo, hi) = grid.bounds();
        let (gmin, gmax) = grid.content_range();
        let min_positive = grid
            .bins
            .iter()
            .map(|b| b.content)
            .filter(|&c| c > 0.0)
            .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.min(c))));
        let x = plain_scale(lo.x, hi.x, config.log_x, config, AxisId::X, zoom[0])?;
        let y = plain_scale(lo.y, hi.y, config.log_y, config, AxisId::Y, zoom[1])?;
        let z = value_scale(gmin, gmax, min_positive, config, zoom[2])?;
        Ok(Self {
            x,
            y,
            z,
            gmin,
            gmax,
            extent: config.extent,
        })
    }

    /// Builds scales for scattered points.
    pub fn for_points(points: &PointSet, config: &RenderConfig, zoom: &ZoomWindows) -> Result<Self> {
        let (lo, hi) = if points.is_empty() {
            (glam::DVec3::ZERO, glam::DVec3::ONE)
        } else {
            points.bounds()
        };
        let x = plain_scale(lo.x, hi.x, config.log_x, config, AxisId::X, zoom[0])?;
        let y = plain_scale(lo.y, hi.y, config.log_y, config, AxisId::Y, zoom[1])?;
        let z = plain_scale(lo.z, hi.z, config.log_z, config, AxisId::Z, zoom[2])?;
        Ok(Self {
            x,
            y,
            z,
            gmin: 0.0,
            gmax: points.len() as f64,
            extent: config.extent,
        })
    }
}

fn kind_for(log: bool, labels: bool) -> AxisKind {
    if labels {
        AxisKind::Labels
    } else if log {
        AxisKind::Log
    } else {
        AxisKind::Linear
    }
}

fn edge_scale(
    grid: &dyn Grid,
    axis: AxisId,
    log: bool,
    config: &RenderConfig,
    zoom: Option<(f64, f64)>,
) -> Result<AxisScale> {
    let labels = grid.labels(axis).map(<[String]>::to_vec);
    let kind = kind_for(log, labels.is_some());
    let (mut min, max) = if kind == AxisKind::Labels {
        (0.0, grid.dims()[axis.index()] as f64)
    } else {
        grid.axis_extent(axis)
    };
    if kind == AxisKind::Log && min <= 0.0 {
        min = grid
            .first_positive_edge(axis)
            .filter(|&e| e < max)
            .unwrap_or(1e-4 * max);
    }
    let mut range = AxisRange::new(kind, min, max);
    if let Some((lo, hi)) = zoom {
        range = range.with_zoom(lo, hi);
    }
    let (draw_min, draw_max) = config.draw_range(axis);
    let scale = AxisScale::from_range(&range, draw_min, draw_max)?;
    Ok(match labels {
        Some(names) => scale.with_labels(names),
        None => scale,
    })
}

fn plain_scale(
    min: f64,
    max: f64,
    log: bool,
    config: &RenderConfig,
    axis: AxisId,
    zoom: Option<(f64, f64)>,
) -> Result<AxisScale> {
    let mut range = AxisRange::new(kind_for(log, false), min, max);
    if let Some((lo, hi)) = zoom {
        range = range.with_zoom(lo, hi);
    }
    let (draw_min, draw_max) = config.draw_range(axis);
    AxisScale::from_range(&range, draw_min, draw_max)
}

/// Value-axis scale: `[min(0, gmin), gmax]` (linear) or `[0.3 * min positive, gmax]`
/// (log), overridden by the configuration; the top gets the margin when unzoomed.
fn value_scale(
    gmin: f64,
    gmax: f64,
    min_positive: Option<f64>,
    config: &RenderConfig,
    zoom: Option<(f64, f64)>,
) -> Result<AxisScale> {
    let zoomed = matches!(zoom, Some((lo, hi)) if lo != hi);
    let kind = kind_for(config.log_z, false);
    let mut min = if config.log_z {
        min_positive.map_or(1.0, |m| 0.3 * m)
    } else {
        gmin.min(0.0)
    };
    let mut max = gmax;
    if let Some(v) = config.value_min {
        min = v;
    }
    if let Some(v) = config.value_max {
        max = v;
    }
    if !zoomed && config.value_max.is_none() && max > 0.0 {
        max *= config.value_margin;
    }
    let mut range = AxisRange::new(kind, min, max);
    if let Some((lo, hi)) = zoom {
        range = range.with_zoom(lo, hi);
    }
    let (draw_min, draw_max) = config.draw_range(AxisId::Z);
    AxisScale::from_range(&range, draw_min, draw_max)
}

/// Bins of `axis` overlapping the active domain, as a half-open index range.
#[must_use]
pub fn visible_bins(grid: &dyn Grid, axis: AxisId, scale: &AxisScale) -> (usize, usize) {
    let n = grid.dims()[axis.index()];
    if scale.kind() == AxisKind::Labels {
        let (lo, hi) = scale.domain();
        let first = lo.max(0.0).floor() as usize;
        let last = (hi.max(0.0).ceil() as usize).min(n);
        return (first.min(last), last);
    }
    let (lo, hi) = scale.domain();
    let first = (0..n)
        .find(|&i| grid.bin_edge(axis, i + 1) > lo)
        .unwrap_or(n);
    let last = (0..n)
        .rev()
        .find(|&i| grid.bin_edge(axis, i) < hi)
        .map_or(0, |i| i + 1);
    (first.min(last), last)
}

/// Data coordinate of edge `index` along `axis`; categorical axes count in bins.
#[must_use]
pub fn edge_value(grid: &dyn Grid, axis: AxisId, scale: &AxisScale, index: usize) -> f64 {
    if scale.kind() == AxisKind::Labels {
        index as f64
    } else {
        grid.bin_edge(axis, index)
    }
}

/// Data coordinate of the center of bin `index` along `axis`.
#[must_use]
pub fn center_value(grid: &dyn Grid, axis: AxisId, scale: &AxisScale, index: usize) -> f64 {
    if scale.kind() == AxisKind::Labels {
        index as f64 + 0.5
    } else {
        grid.bin_center(axis, index)
    }
}

/// Draw coordinate of edge `index`, clamped to the draw box.
#[must_use]
pub fn clamped_edge(grid: &dyn Grid, axis: AxisId, scale: &AxisScale, index: usize) -> f32 {
    let (a, b) = scale.range();
    scale
        .to_draw(edge_value(grid, axis, scale, index))
        .clamp(a.min(b), a.max(b)) as f32
}

/// Draw coordinates of bin edges `first..=last` along `axis`, clamped to the draw box.
#[must_use]
pub fn draw_edges(grid: &dyn Grid, axis: AxisId, scale: &AxisScale, first: usize, last: usize) -> Vec<f32> {
    (first..=last)
        .map(|i| clamped_edge(grid, axis, scale, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use histoscope_core::HistogramGrid;

    use super::*;

    fn grid4x4() -> HistogramGrid {
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|j| (1..=4).map(|i| f64::from(i + 4 * j)).collect())
            .collect();
        HistogramGrid::from_rows((0.0, 4.0), (0.0, 4.0), &rows).unwrap()
    }

    #[test]
    fn test_value_range_with_margin() {
        let scales = DrawScales::for_grid(&grid4x4(), &RenderConfig::default(), &[None; 3]).unwrap();
        assert_eq!(scales.z.domain().0, 0.0);
        assert!((scales.z.domain().1 - 16.0 * 1.1).abs() < 1e-9);
        assert!((scales.grx(0.0) + 100.0).abs() < 1e-4);
        assert!((scales.gry(4.0) - 100.0).abs() < 1e-4);
        assert_eq!(scales.grz(0.0), 0.0);
    }

    #[test]
    fn test_zoomed_value_has_no_margin() {
        let scales =
            DrawScales::for_grid(&grid4x4(), &RenderConfig::default(), &[None, None, Some((2.0, 8.0))])
                .unwrap();
        assert_eq!(scales.z.domain(), (2.0, 8.0));
    }

    #[test]
    fn test_log_value_range() {
        let config = RenderConfig {
            log_z: true,
            ..RenderConfig::default()
        };
        let scales = DrawScales::for_grid(&grid4x4(), &config, &[None; 3]).unwrap();
        assert!((scales.z.domain().0 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_one_dimensional_uses_y_zoom_for_value() {
        let grid = HistogramGrid::new_1d(vec![0.0, 1.0, 2.0], vec![3.0, 5.0]).unwrap();
        let config = RenderConfig {
            use_second_axis_for_third_dimension: true,
            ..RenderConfig::default()
        };
        let scales = DrawScales::for_grid(&grid, &config, &[None, Some((1.0, 4.0)), None]).unwrap();
        assert_eq!(scales.z.domain(), (1.0, 4.0));
        assert_eq!(scales.y.domain(), (0.0, 1.0));
    }

    #[test]
    fn test_visible_bins_follow_zoom() {
        let grid = grid4x4();
        let scales =
            DrawScales::for_grid(&grid, &RenderConfig::default(), &[Some((1.5, 3.0)), None, None])
                .unwrap();
        assert_eq!(visible_bins(&grid, AxisId::X, &scales.x), (1, 3));
        assert_eq!(visible_bins(&grid, AxisId::Y, &scales.y), (0, 4));
        let edges = draw_edges(&grid, AxisId::X, &scales.x, 1, 3);
        assert!((edges[0] + 100.0).abs() < 1e-3);
        assert!((edges[2] - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_log_axis_takes_first_positive_edge() {
        let grid = HistogramGrid::new_1d(vec![0.0, 1.0, 10.0, 100.0], vec![1.0, 2.0, 3.0]).unwrap();
        let config = RenderConfig {
            log_x: true,
            ..RenderConfig::default()
        };
        let scales = DrawScales::for_grid(&grid, &config, &[None; 3]).unwrap();
        assert_eq!(scales.x.domain(), (1.0, 100.0));
    }
}
