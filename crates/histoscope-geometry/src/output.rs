//! Builder output and the pick tables that map hits back to bins.

use glam::Vec3;
use histoscope_core::{
    AxisId, BinBounds, GeometryBuffer, Grid, LineBuffer, PickResult, PointSet, PolyGrid,
};
use histoscope_render::{Material, NodeKind};

use crate::scales::{center_value, clamped_edge, DrawScales};

/// The data a draw was built from.
pub enum DataSource {
    /// A 1D, 2D or 3D binned histogram.
    Histogram(Box<dyn Grid>),
    /// Polygonal bins.
    Poly(PolyGrid),
    /// Scattered points.
    Points(PointSet),
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Histogram(grid) => write!(f, "Histogram({:?})", grid.dims()),
            Self::Poly(grid) => write!(f, "Poly({} bins)", grid.bins.len()),
            Self::Points(points) => write!(f, "Points({})", points.len()),
        }
    }
}

impl DataSource {
    /// The histogram grid, if this is one.
    #[must_use]
    pub fn grid(&self) -> Option<&dyn Grid> {
        match self {
            Self::Histogram(grid) => Some(grid.as_ref()),
            Self::Poly(_) | Self::Points(_) => None,
        }
    }
}

/// How a picked vertex group turns into highlight bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum Tooltip {
    /// Lego boxes: z spans the base level up to the bin value, capped at `zmax`.
    Lego { zmin: f64, zmax: f64 },
    /// 3D bins: a box around the bin center scaled by the bin weight.
    Bins3d { scale: Vec3 },
    /// A polygon bin; highlighted by recoloring its own node.
    PolyBin { bin: usize, bounds: BinBounds },
    /// Point markers; groups map to point indices.
    Marker { half_size: f32 },
}

/// Side table entry for one pickable node.
#[derive(Debug, Clone, PartialEq)]
pub struct PickTable {
    /// Vertices per group.
    pub group_size: usize,
    /// Source bin (or point index) per group.
    pub bins: Vec<usize>,
    pub tooltip: Tooltip,
    /// Highlight color.
    pub tip_color: Vec3,
}

impl PickTable {
    /// Pick table mirroring the bin mapping of `buffer`.
    pub fn for_buffer(buffer: &GeometryBuffer, tooltip: Tooltip, tip_color: Vec3) -> Self {
        Self {
            group_size: buffer.group_size,
            bins: buffer.bin_index_per_group.clone(),
            tooltip,
            tip_color,
        }
    }

    /// Source bin of a hit vertex.
    #[must_use]
    pub fn bin_of_vertex(&self, vertex: usize) -> Option<usize> {
        if self.group_size == 0 {
            return None;
        }
        self.bins.get(vertex / self.group_size).copied()
    }

    /// Resolves a hit vertex into a pick result.
    #[must_use]
    pub fn resolve(&self, vertex: usize, source: &DataSource, scales: &DrawScales) -> Option<PickResult> {
        let group = vertex.checked_div(self.group_size)?;
        let bin_id = *self.bins.get(group)?;
        match (&self.tooltip, source) {
            (Tooltip::Lego { zmin, zmax }, DataSource::Histogram(grid)) => {
                Some(self.lego_tip(grid.as_ref(), bin_id, *zmin, *zmax, scales))
            }
            (Tooltip::Bins3d { scale }, DataSource::Histogram(grid)) => {
                Some(self.bins3d_tip(grid.as_ref(), bin_id, *scale, scales))
            }
            (Tooltip::PolyBin { bin, bounds }, DataSource::Poly(grid)) => {
                let value = grid.bins.get(*bin)?.content;
                Some(PickResult {
                    bin_id: *bin,
                    bin: [*bin, 0, 0],
                    bounds: *bounds,
                    value,
                    color: self.tip_color,
                    use_itself: true,
                })
            }
            (Tooltip::Marker { half_size }, DataSource::Points(points)) => {
                let index = bin_id;
                let p = *points.points.get(index)?;
                let center = scales.to_draw(p);
                let half = Vec3::splat(*half_size);
                Some(PickResult {
                    bin_id: index,
                    bin: [index, 0, 0],
                    bounds: BinBounds::from_corners(center - half, center + half),
                    value: p.z,
                    color: self.tip_color,
                    use_itself: false,
                })
            }
            _ => None,
        }
    }

    fn lego_tip(&self, grid: &dyn Grid, bin_id: usize, zmin: f64, zmax: f64, scales: &DrawScales) -> PickResult {
        let [i, j, k] = grid.bin_from_id(bin_id);
        let value = grid.content(i, j, k);
        let x1 = clamped_edge(grid, AxisId::X, &scales.x, i);
        let x2 = clamped_edge(grid, AxisId::X, &scales.x, i + 1);
        let (y1, y2) = if grid.dimension() == 1 {
            (scales.gry(0.0), scales.gry(1.0))
        } else {
            (
                clamped_edge(grid, AxisId::Y, &scales.y, j),
                clamped_edge(grid, AxisId::Y, &scales.y, j + 1),
            )
        };
        let z1 = scales.grz(zmin);
        let z2 = if value < zmin {
            z1
        } else if value < zmax {
            scales.grz(value)
        } else {
            scales.grz(zmax)
        };
        PickResult {
            bin_id,
            bin: [i, j, k],
            bounds: BinBounds {
                x1,
                x2,
                y1,
                y2,
                z1,
                z2,
            },
            value,
            color: self.tip_color,
            use_itself: false,
        }
    }

    fn bins3d_tip(&self, grid: &dyn Grid, bin_id: usize, scale: Vec3, scales: &DrawScales) -> PickResult {
        let [i, j, k] = grid.bin_from_id(bin_id);
        let value = grid.content(i, j, k);
        let center = Vec3::new(
            scales.grx(center_value(grid, AxisId::X, &scales.x, i)),
            scales.gry(center_value(grid, AxisId::Y, &scales.y, j)),
            scales.grz(center_value(grid, AxisId::Z, &scales.z, k)),
        );
        let wei = if scales.gmax > 0.0 {
            (value / scales.gmax) as f32
        } else {
            1.0
        };
        let half = scale * wei;
        PickResult {
            bin_id,
            bin: [i, j, k],
            bounds: BinBounds::from_corners(center - half, center + half),
            value,
            color: self.tip_color,
            use_itself: false,
        }
    }
}

/// One node produced by a builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    /// Node name.
    pub name: String,
    pub kind: NodeKind,
    pub material: Material,
    /// Present for nodes that resolve hover picks.
    pub pick: Option<PickTable>,
}

impl Primitive {
    /// A triangle mesh node.
    pub fn mesh(name: impl Into<String>, buffer: GeometryBuffer, material: Material) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(buffer),
            material,
            pick: None,
        }
    }

    /// A point-cloud node.
    pub fn points(name: impl Into<String>, points: Vec<Vec3>, material: Material) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Points(points),
            material,
            pick: None,
        }
    }

    /// A line-segment node.
    pub fn lines(name: impl Into<String>, buffer: LineBuffer, material: Material) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Lines(buffer),
            material,
            pick: None,
        }
    }

    /// Attaches a pick table.
    #[must_use]
    pub fn with_pick(mut self, pick: PickTable) -> Self {
        self.pick = Some(pick);
        self
    }

    /// The mesh buffer, for mesh nodes.
    #[must_use]
    pub fn mesh_buffer(&self) -> Option<&GeometryBuffer> {
        match &self.kind {
            NodeKind::Mesh(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// The line buffer, for line nodes.
    #[must_use]
    pub fn line_buffer(&self) -> Option<&LineBuffer> {
        match &self.kind {
            NodeKind::Lines(buffer) => Some(buffer),
            _ => None,
        }
    }
}

/// Everything one draw adds to the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawOutput {
    pub primitives: Vec<Primitive>,
    /// Requested render delay in milliseconds, when the style asks for one.
    pub render_delay_ms: Option<u64>,
}

impl DrawOutput {
    /// Mesh buffers in emission order.
    pub fn meshes(&self) -> impl Iterator<Item = &GeometryBuffer> {
        self.primitives.iter().filter_map(Primitive::mesh_buffer)
    }

    /// Line buffers in emission order.
    pub fn lines(&self) -> impl Iterator<Item = &LineBuffer> {
        self.primitives.iter().filter_map(Primitive::line_buffer)
    }

    /// Total number of triangles over all meshes.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.meshes().map(GeometryBuffer::triangle_count).sum()
    }

    /// Appends another output.
    pub fn extend(&mut self, other: DrawOutput) {
        self.primitives.extend(other.primitives);
        if other.render_delay_ms.is_some() {
            self.render_delay_ms = other.render_delay_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use histoscope_core::{HistogramGrid, RenderConfig, TIP_GREEN};

    use super::*;

    #[test]
    fn test_group_resolution() {
        let buffer = GeometryBuffer::from_positions(vec![Vec3::ZERO; 18]).with_bins(6, vec![7, 2, 7]);
        let table = PickTable::for_buffer(&buffer, Tooltip::Lego { zmin: 0.0, zmax: 1.0 }, TIP_GREEN);
        for g in 0..3 {
            for v in g * 6..(g + 1) * 6 {
                assert_eq!(table.bin_of_vertex(v), Some(buffer.bin_index_per_group[g]));
            }
        }
        assert_eq!(table.bin_of_vertex(18), None);
    }

    #[test]
    fn test_lego_tip_bounds() {
        let grid = HistogramGrid::from_rows((0.0, 2.0), (0.0, 2.0), &[vec![1.0, 4.0], vec![2.0, 0.0]]).unwrap();
        let config = RenderConfig::default();
        let scales = DrawScales::for_grid(&grid, &config, &[None; 3]).unwrap();
        let (zmin, zmax) = scales.z.domain();
        let source = DataSource::Histogram(Box::new(grid));
        let buffer = GeometryBuffer::from_positions(vec![Vec3::ZERO; 6]).with_bins(3, vec![1, 3]);
        let table = PickTable::for_buffer(&buffer, Tooltip::Lego { zmin, zmax }, TIP_GREEN);

        let tip = table.resolve(0, &source, &scales).unwrap();
        assert_eq!(tip.bin, [1, 0, 0]);
        assert!((tip.value - 4.0).abs() < 1e-12);
        assert!((tip.bounds.x1 - 0.0).abs() < 1e-4);
        assert!((tip.bounds.x2 - 100.0).abs() < 1e-4);
        assert!((tip.bounds.z2 - scales.grz(4.0)).abs() < 1e-4);

        let empty = table.resolve(3, &source, &scales).unwrap();
        assert_eq!(empty.bin, [1, 1, 0]);
        assert_eq!(empty.bounds.z1, empty.bounds.z2);
    }

    #[test]
    fn test_mismatched_source_resolves_nothing() {
        let table = PickTable {
            group_size: 3,
            bins: vec![0],
            tooltip: Tooltip::Bins3d { scale: Vec3::ONE },
            tip_color: TIP_GREEN,
        };
        let source = DataSource::Points(PointSet::default());
        let scales = DrawScales::for_points(&PointSet::default(), &RenderConfig::default(), &[None; 3]).unwrap();
        assert!(table.resolve(0, &source, &scales).is_none());
    }
}
