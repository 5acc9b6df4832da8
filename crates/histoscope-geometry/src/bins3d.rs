//! Boxes or spheres for 3D histograms.
//!
//! Every bin above the global minimum gets one shape at its center, scaled by its
//! weight `content / gmax` times the average bin size along each axis.

use glam::Vec3;
use histoscope_core::{
    tip_color_for, AxisId, BinShape, GeometryBuffer, Grid, IndexBuffer, LineBuffer, RenderConfig,
};
use histoscope_render::Material;

use crate::lego::MAX_U16_LINE_VERTICES;
use crate::output::{DrawOutput, PickTable, Primitive, Tooltip};
use crate::scales::{center_value, edge_value, visible_bins, DrawScales};
use crate::topology::{
    box_corner, box_normal, sphere_triangles, BOX_INDICES, BOX_MESH_SEGMENTS, BOX_SEGMENTS,
    BOX_VERTICES,
};

/// Weight below which a bin is not drawn.
const MIN_WEIGHT: f64 = 1e-5;

/// A unit shape centered on the origin.
struct Template {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tipscale: f32,
    material: fn(Vec3) -> Material,
}

impl Template {
    fn for_shape(shape: BinShape) -> Self {
        match shape {
            BinShape::Cube => {
                let half = Vec3::splat(0.5);
                Self {
                    positions: (0..BOX_INDICES.len()).map(|k| box_corner(k) - half).collect(),
                    normals: (0..BOX_INDICES.len()).map(box_normal).collect(),
                    tipscale: 0.5,
                    material: Material::flat,
                }
            }
            BinShape::Sphere => {
                let (positions, normals) = sphere_triangles(0.5, 16, 12);
                Self {
                    positions,
                    normals,
                    tipscale: 0.4,
                    material: Material::lambert,
                }
            }
        }
    }
}

/// Average draw size of the visible bins along `axis`.
fn bin_scale(grid: &dyn Grid, axis: AxisId, scales: &DrawScales, range: (usize, usize)) -> f32 {
    let scale = scales.axis(axis);
    let (first, last) = range;
    if last <= first {
        return 0.0;
    }
    let lo = scale.to_draw(edge_value(grid, axis, scale, first));
    let hi = scale.to_draw(edge_value(grid, axis, scale, last));
    ((hi - lo) / (last - first) as f64) as f32
}

/// Builds the shapes of a 3D grid plus, for cubes, their outlines.
pub fn build_bins3d(grid: &dyn Grid, scales: &DrawScales, config: &RenderConfig) -> DrawOutput {
    let mut output = DrawOutput::default();
    let ranges = [
        visible_bins(grid, AxisId::X, &scales.x),
        visible_bins(grid, AxisId::Y, &scales.y),
        visible_bins(grid, AxisId::Z, &scales.z),
    ];
    let scale = Vec3::new(
        bin_scale(grid, AxisId::X, scales, ranges[0]),
        bin_scale(grid, AxisId::Y, scales, ranges[1]),
        bin_scale(grid, AxisId::Z, scales, ranges[2]),
    );
    let (gmin, gmax) = (scales.gmin, scales.gmax);

    let mut drawn = Vec::new();
    for i in ranges[0].0..ranges[0].1 {
        for j in ranges[1].0..ranges[1].1 {
            for k in ranges[2].0..ranges[2].1 {
                let content = grid.content(i, j, k);
                if content <= gmin {
                    continue;
                }
                let wei = content / gmax;
                if wei < MIN_WEIGHT {
                    continue;
                }
                drawn.push(([i, j, k], wei as f32));
            }
        }
    }
    if drawn.is_empty() {
        log::debug!("3d bins: nothing above the minimum");
        return output;
    }

    let template = Template::for_shape(config.bin_shape);
    let per_bin = template.positions.len();
    let mut positions = Vec::with_capacity(drawn.len() * per_bin);
    let mut normals = Vec::with_capacity(drawn.len() * per_bin);
    let mut bins = Vec::with_capacity(drawn.len());

    for &([i, j, k], wei) in &drawn {
        let center = Vec3::new(
            scales.grx(center_value(grid, AxisId::X, &scales.x, i)),
            scales.gry(center_value(grid, AxisId::Y, &scales.y, j)),
            scales.grz(center_value(grid, AxisId::Z, &scales.z, k)),
        );
        let size = scale * wei;
        positions.extend(template.positions.iter().map(|&p| center + p * size));
        normals.extend_from_slice(&template.normals);
        bins.push(grid.bin_id(i, j, k));
    }

    let outlines = (config.bin_shape == BinShape::Cube && config.border_lines)
        .then(|| bin_outlines(&positions, &drawn, scale, scales, grid));

    let buffer = GeometryBuffer {
        positions,
        normals: Some(normals),
        indices: None,
        group_size: per_bin,
        bin_index_per_group: bins,
    };
    log::debug!(
        "3d bins: {} bins, {} vertices",
        drawn.len(),
        buffer.vertex_count()
    );

    let pick = PickTable::for_buffer(
        &buffer,
        Tooltip::Bins3d {
            scale: scale * template.tipscale,
        },
        tip_color_for(config.fill_color),
    );
    output.primitives.push(
        Primitive::mesh("bins3d", buffer, (template.material)(config.fill_color)).with_pick(pick),
    );
    if let Some(lines) = outlines {
        output
            .primitives
            .push(Primitive::lines("bins3d_wire", lines, Material::flat(Vec3::ZERO)));
    }
    output
}

/// Box outlines reusing the mesh positions through 16-bit indices when they fit,
/// else as separate positions.
fn bin_outlines(
    mesh_positions: &[Vec3],
    drawn: &[([usize; 3], f32)],
    scale: Vec3,
    scales: &DrawScales,
    grid: &dyn Grid,
) -> LineBuffer {
    let per_bin = BOX_INDICES.len();
    if mesh_positions.len() <= MAX_U16_LINE_VERTICES {
        let indices = (0..drawn.len())
            .flat_map(|n| BOX_MESH_SEGMENTS.iter().map(move |&s| (n * per_bin + s) as u16))
            .collect();
        return LineBuffer {
            positions: mesh_positions.to_vec(),
            indices: Some(IndexBuffer::U16(indices)),
        };
    }

    let half = Vec3::splat(0.5);
    let mut positions = Vec::with_capacity(drawn.len() * BOX_SEGMENTS.len());
    for &([i, j, k], wei) in drawn {
        let center = Vec3::new(
            scales.grx(center_value(grid, AxisId::X, &scales.x, i)),
            scales.gry(center_value(grid, AxisId::Y, &scales.y, j)),
            scales.grz(center_value(grid, AxisId::Z, &scales.z, k)),
        );
        let size = scale * wei;
        positions.extend(
            BOX_SEGMENTS
                .iter()
                .map(|&s| center + (BOX_VERTICES[s] - half) * size),
        );
    }
    LineBuffer::from_positions(positions)
}
