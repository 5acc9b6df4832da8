//! Data sources: binned grids, polygonal bins and scattered points.
//!
//! All of these are read-only for the duration of one draw.

use glam::{DVec2, DVec3};

use crate::axis::AxisId;
use crate::error::{HistoscopeError, Result};

/// A 1D, 2D or 3D grid of scalar bin contents.
///
/// Bins are addressed by zero-based `(i, j, k)`; unused dimensions have size 1.
pub trait Grid {
    /// Number of bins along x, y and z.
    fn dims(&self) -> [usize; 3];

    /// Number of meaningful dimensions (1, 2 or 3).
    fn dimension(&self) -> usize;

    /// Content of bin `(i, j, k)`.
    fn content(&self, i: usize, j: usize, k: usize) -> f64;

    /// Edge `index` (0..=n) along `axis`.
    fn bin_edge(&self, axis: AxisId, index: usize) -> f64;

    /// Category names along `axis`, if the axis is categorical.
    fn labels(&self, _axis: AxisId) -> Option<&[String]> {
        None
    }

    /// Flat bin id.
    fn bin_id(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.dims();
        i + nx * (j + ny * k)
    }

    /// Inverse of [`Grid::bin_id`].
    fn bin_from_id(&self, id: usize) -> [usize; 3] {
        let [nx, ny, _] = self.dims();
        let nx = nx.max(1);
        let ny = ny.max(1);
        [id % nx, (id / nx) % ny, id / (nx * ny)]
    }

    /// Center of bin `index` along `axis`.
    fn bin_center(&self, axis: AxisId, index: usize) -> f64 {
        0.5 * (self.bin_edge(axis, index) + self.bin_edge(axis, index + 1))
    }

    /// Smallest and largest content over all bins.
    fn content_range(&self) -> (f64, f64) {
        let [nx, ny, nz] = self.dims();
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let v = self.content(i, j, k);
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
        }
        if lo > hi {
            (0.0, 0.0)
        } else {
            (lo, hi)
        }
    }

    /// Smallest strictly positive content, if any.
    fn min_positive(&self) -> Option<f64> {
        let [nx, ny, nz] = self.dims();
        let mut best: Option<f64> = None;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let v = self.content(i, j, k);
                    if v > 0.0 && best.map_or(true, |b| v < b) {
                        best = Some(v);
                    }
                }
            }
        }
        best
    }

    /// Full edge range along `axis`.
    fn axis_extent(&self, axis: AxisId) -> (f64, f64) {
        let n = self.dims()[axis.index()];
        (self.bin_edge(axis, 0), self.bin_edge(axis, n))
    }

    /// First bin edge along `axis` that is strictly positive.
    fn first_positive_edge(&self, axis: AxisId) -> Option<f64> {
        let n = self.dims()[axis.index()];
        (0..=n).map(|i| self.bin_edge(axis, i)).find(|&e| e > 0.0)
    }

    /// Index of the bin containing `value` along `axis`, clamped to the grid.
    fn find_bin(&self, axis: AxisId, value: f64) -> usize {
        let n = self.dims()[axis.index()];
        let mut lo = 0;
        let mut hi = n;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.bin_edge(axis, mid) <= value {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo.min(n.saturating_sub(1))
    }
}

/// In-memory binned histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramGrid {
    dims: [usize; 3],
    dimension: usize,
    edges: [Vec<f64>; 3],
    values: Vec<f64>,
    labels: [Option<Vec<String>>; 3],
}

impl HistogramGrid {
    /// Creates a grid from explicit edges. `values` is indexed by
    /// `i + nx * (j + ny * k)`.
    pub fn from_edges(edges: [Vec<f64>; 3], values: Vec<f64>, dimension: usize) -> Result<Self> {
        let mut dims = [0; 3];
        for (axis, e) in edges.iter().enumerate() {
            if e.len() < 2 {
                return Err(HistoscopeError::SizeMismatch {
                    expected: 2,
                    actual: e.len(),
                });
            }
            if e.windows(2).any(|w| w[1] < w[0]) {
                return Err(HistoscopeError::DegenerateDomain {
                    min: e[0],
                    max: e[e.len() - 1],
                });
            }
            dims[axis] = e.len() - 1;
        }
        let expected = dims[0] * dims[1] * dims[2];
        if values.len() != expected {
            return Err(HistoscopeError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            dims,
            dimension: dimension.clamp(1, 3),
            edges,
            values,
            labels: [None, None, None],
        })
    }

    /// 1D histogram; the y and z axes are single `[0, 1]` bins.
    pub fn new_1d(x_edges: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::from_edges([x_edges, vec![0.0, 1.0], vec![0.0, 1.0]], values, 1)
    }

    /// 2D histogram with `values[i + nx * j]`.
    pub fn new_2d(x_edges: Vec<f64>, y_edges: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::from_edges([x_edges, y_edges, vec![0.0, 1.0]], values, 2)
    }

    /// 3D histogram with `values[i + nx * (j + ny * k)]`.
    pub fn new_3d(
        x_edges: Vec<f64>,
        y_edges: Vec<f64>,
        z_edges: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        Self::from_edges([x_edges, y_edges, z_edges], values, 3)
    }

    /// 2D histogram on uniform bins from rows, where `rows[j][i]` is bin `(i, j)`.
    pub fn from_rows(x_range: (f64, f64), y_range: (f64, f64), rows: &[Vec<f64>]) -> Result<Self> {
        let ny = rows.len();
        let nx = rows.first().map_or(0, Vec::len);
        if nx == 0 || ny == 0 {
            return Err(HistoscopeError::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let mut values = Vec::with_capacity(nx * ny);
        for row in rows {
            if row.len() != nx {
                return Err(HistoscopeError::SizeMismatch {
                    expected: nx,
                    actual: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Self::new_2d(
            uniform_edges(x_range.0, x_range.1, nx),
            uniform_edges(y_range.0, y_range.1, ny),
            values,
        )
    }

    /// Attaches category names to an axis.
    #[must_use]
    pub fn with_labels(mut self, axis: AxisId, labels: Vec<String>) -> Self {
        self.labels[axis.index()] = Some(labels);
        self
    }

    /// Raw values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Grid for HistogramGrid {
    fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn content(&self, i: usize, j: usize, k: usize) -> f64 {
        let [nx, ny, _] = self.dims;
        self.values
            .get(i + nx * (j + ny * k))
            .copied()
            .unwrap_or(0.0)
    }

    fn bin_edge(&self, axis: AxisId, index: usize) -> f64 {
        let edges = &self.edges[axis.index()];
        edges[index.min(edges.len() - 1)]
    }

    fn labels(&self, axis: AxisId) -> Option<&[String]> {
        self.labels[axis.index()].as_deref()
    }
}

/// `n + 1` evenly spaced edges from `lo` to `hi`.
#[must_use]
pub fn uniform_edges(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    (0..=n)
        .map(|i| lo + (hi - lo) * i as f64 / n as f64)
        .collect()
}

/// One polygonal bin. A bin may consist of several closed outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyBin {
    /// Outlines in data coordinates; a trailing point equal to the first is allowed.
    pub outlines: Vec<Vec<DVec2>>,
    /// Bin content.
    pub content: f64,
}

impl PolyBin {
    /// Creates a single-outline bin.
    pub fn new(outline: Vec<DVec2>, content: f64) -> Self {
        Self {
            outlines: vec![outline],
            content,
        }
    }

    /// Bounding box as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let mut lo = DVec2::splat(f64::INFINITY);
        let mut hi = DVec2::splat(f64::NEG_INFINITY);
        for p in self.outlines.iter().flatten() {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        (lo, hi)
    }
}

/// A set of polygonal bins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyGrid {
    /// The bins, addressed by position.
    pub bins: Vec<PolyBin>,
}

impl PolyGrid {
    /// Creates a grid from bins.
    pub fn new(bins: Vec<PolyBin>) -> Self {
        Self { bins }
    }

    /// Bounding box over all bins.
    #[must_use]
    pub fn bounds(&self) -> (DVec2, DVec2) {
        self.bins.iter().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), bin| {
                let (blo, bhi) = bin.bounds();
                (lo.min(blo), hi.max(bhi))
            },
        )
    }

    /// Smallest and largest content.
    #[must_use]
    pub fn content_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for bin in &self.bins {
            lo = lo.min(bin.content);
            hi = hi.max(bin.content);
        }
        if lo > hi {
            (0.0, 0.0)
        } else {
            (lo, hi)
        }
    }
}

/// Scattered 3D points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    /// Point coordinates in data space.
    pub points: Vec<DVec3>,
}

impl PointSet {
    /// Creates a point set.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (DVec3, DVec3) {
        self.points.iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let grid = HistogramGrid::from_rows((0.0, 3.0), (0.0, 2.0), &rows).unwrap();
        assert_eq!(grid.dims(), [3, 2, 1]);
        assert_eq!(grid.dimension(), 2);
        assert!((grid.content(2, 1, 0) - 6.0).abs() < 1e-12);
        assert_eq!(grid.bin_id(2, 1, 0), 5);
        assert_eq!(grid.bin_from_id(5), [2, 1, 0]);
        assert!((grid.bin_edge(AxisId::X, 3) - 3.0).abs() < 1e-12);
        assert_eq!(grid.content_range(), (1.0, 6.0));
    }

    #[test]
    fn test_size_mismatch() {
        let err = HistogramGrid::new_2d(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0], vec![1.0; 3]);
        assert!(matches!(
            err,
            Err(HistoscopeError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(HistogramGrid::new_1d(vec![1.0], vec![]).is_err());
        assert!(HistogramGrid::new_1d(vec![1.0, 0.0], vec![2.0]).is_err());
    }

    #[test]
    fn test_one_dimensional() {
        let grid = HistogramGrid::new_1d(vec![0.0, 1.0, 2.0], vec![3.0, 0.0]).unwrap();
        assert_eq!(grid.dims(), [2, 1, 1]);
        assert_eq!(grid.dimension(), 1);
        assert_eq!(grid.axis_extent(AxisId::Y), (0.0, 1.0));
        assert_eq!(grid.min_positive(), Some(3.0));
    }

    #[test]
    fn test_find_bin_and_edges() {
        let grid = HistogramGrid::new_1d(uniform_edges(-2.0, 2.0, 4), vec![0.0; 4]).unwrap();
        assert_eq!(grid.find_bin(AxisId::X, -1.5), 0);
        assert_eq!(grid.find_bin(AxisId::X, 0.5), 2);
        assert_eq!(grid.find_bin(AxisId::X, 9.0), 3);
        assert_eq!(grid.first_positive_edge(AxisId::X), Some(1.0));
        assert!((grid.bin_center(AxisId::X, 1) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_poly_bounds() {
        let grid = PolyGrid::new(vec![
            PolyBin::new(vec![DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0), DVec2::new(1.0, 3.0)], 4.0),
            PolyBin::new(vec![DVec2::new(-1.0, 1.0), DVec2::new(0.0, 1.0), DVec2::new(0.0, 2.0)], 1.0),
        ]);
        let (lo, hi) = grid.bounds();
        assert_eq!(lo, DVec2::new(-1.0, 0.0));
        assert_eq!(hi, DVec2::new(2.0, 3.0));
        assert_eq!(grid.content_range(), (1.0, 4.0));
    }
}
