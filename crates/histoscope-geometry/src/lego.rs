//! Lego boxes for 1D and 2D histograms.
//!
//! Every visible bin becomes a box from the base level up to its content. With several
//! level bands each band only emits the faces that can be seen: a band the bin rises
//! past has no top face, and every band above the first has no bottom face. Bins sitting
//! exactly on the value minimum are drawn as flat quads when allowed.

use glam::Vec3;
use histoscope_core::{
    tip_color_for, AxisId, ColorMode, GeometryBuffer, Grid, IndexBuffer, LineBuffer, RenderConfig,
    TIP_RED,
};
use histoscope_render::{LevelPalette, Material};

use crate::output::{DrawOutput, PickTable, Primitive, Tooltip};
use crate::scales::{clamped_edge, visible_bins, DrawScales};
use crate::topology::{
    box_corner, box_normal, place, BOX_SEGMENTS, BOX_VERTICES, FLAT_SEGMENTS,
    FLAT_VERTICES, TOP_FACE_START,
};

/// Largest vertex count the wireframe addresses with 16-bit indices.
pub const MAX_U16_LINE_VERTICES: usize = 0xFFF0;

/// Level boundaries for a lego draw: the value-axis domain, split into
/// `level_count` palette bands when more than one is requested.
#[must_use]
pub fn lego_levels(scales: &DrawScales, config: &RenderConfig, palette: &dyn LevelPalette) -> Vec<f64> {
    let (zmin, zmax) = scales.z.domain();
    if config.level_count <= 1 {
        vec![zmin, zmax]
    } else {
        palette.levels(zmin, zmax, config.level_count, scales.z.is_log())
    }
}

/// Footprint of one bin in draw space.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

struct BinCell {
    id: usize,
    value: f64,
    foot: Footprint,
}

fn visible_cells(grid: &dyn Grid, scales: &DrawScales) -> Vec<BinCell> {
    let (i1, i2) = visible_bins(grid, AxisId::X, &scales.x);
    let one_dim = grid.dimension() == 1;
    let (j1, j2) = if one_dim {
        (0, 1)
    } else {
        visible_bins(grid, AxisId::Y, &scales.y)
    };

    let mut cells = Vec::with_capacity((i2 - i1) * (j2 - j1));
    for j in j1..j2 {
        for i in i1..i2 {
            let (y1, y2) = if one_dim {
                (scales.gry(0.0), scales.gry(1.0))
            } else {
                (
                    clamped_edge(grid, AxisId::Y, &scales.y, j),
                    clamped_edge(grid, AxisId::Y, &scales.y, j + 1),
                )
            };
            cells.push(BinCell {
                id: grid.bin_id(i, j, 0),
                value: grid.content(i, j, 0),
                foot: Footprint {
                    x1: clamped_edge(grid, AxisId::X, &scales.x, i),
                    x2: clamped_edge(grid, AxisId::X, &scales.x, i + 1),
                    y1,
                    y2,
                },
            });
        }
    }
    cells
}

/// Which expanded box corners one band of one bin emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FaceSelection {
    reduced: bool,
    nobottom: bool,
    notop: bool,
}

impl FaceSelection {
    /// Face selection for a bin of value `binz` in band `level` of `bands`, or
    /// `None` when the band draws nothing for this bin.
    fn for_band(binz: f64, zmin: f64, zmax: f64, level: usize, bands: usize, showmin: bool) -> Option<Self> {
        if binz < zmin {
            return None;
        }
        let reduced = binz == zmin;
        if reduced && (level > 0 || !showmin) {
            return None;
        }
        Some(Self {
            reduced,
            nobottom: !reduced && level > 0,
            notop: !reduced && binz > zmax && level + 1 < bands,
        })
    }

    /// Expanded-corner indices in emission order.
    fn corners(self) -> impl Iterator<Item = usize> {
        let start = if self.reduced { TOP_FACE_START } else { 0 };
        let end = if self.nobottom { 30 } else { 36 };
        let notop = self.notop;
        (start..end).filter(move |&k| !(notop && (TOP_FACE_START..30).contains(&k)))
    }

    fn vertex_count(self) -> usize {
        self.corners().count()
    }
}

#[derive(Default)]
struct MeshAccum {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    bins: Vec<usize>,
}

impl MeshAccum {
    fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            bins: Vec::with_capacity(vertices / 3),
        }
    }

    fn push(&mut self, k: usize, lo: Vec3, hi: Vec3, bin: usize) {
        self.positions.push(place(box_corner(k), lo, hi));
        self.normals.push(box_normal(k));
        if self.positions.len() % 3 == 0 {
            self.bins.push(bin);
        }
    }

    fn into_buffer(self) -> GeometryBuffer {
        GeometryBuffer {
            positions: self.positions,
            normals: Some(self.normals),
            indices: None,
            group_size: 3,
            bin_index_per_group: self.bins,
        }
    }
}

/// Builds the lego boxes of a 1D or 2D grid, one mesh per level band.
pub fn build_lego(
    grid: &dyn Grid,
    scales: &DrawScales,
    config: &RenderConfig,
    palette: &dyn LevelPalette,
) -> DrawOutput {
    let mut output = DrawOutput::default();
    let cells = visible_cells(grid, scales);
    if cells.is_empty() {
        log::debug!("lego: no visible bins");
        return output;
    }

    let (axis_zmin, axis_zmax) = scales.z.domain();
    let levels = lego_levels(scales, config, palette);
    let bands = levels.len().saturating_sub(1);
    let showmin = config.show_min(axis_zmin);
    let tip_color = tip_color_for(config.fill_color);
    let tooltip = Tooltip::Lego {
        zmin: axis_zmin,
        zmax: axis_zmax,
    };

    for level in 0..bands {
        let (zmin, zmax) = (levels[level], levels[level + 1]);
        let z1 = scales.grz(zmin);

        // counting pass sizes both buffers
        let mut count = 0;
        let mut count2 = 0;
        for cell in &cells {
            if let Some(sel) = FaceSelection::for_band(cell.value, zmin, zmax, level, bands, showmin) {
                let n = sel.vertex_count();
                if config.split_faces {
                    let side = sel.corners().filter(|&k| k < 12).count();
                    count += n - side;
                    count2 += side;
                } else {
                    count += n;
                }
            }
        }
        if count + count2 == 0 {
            continue;
        }

        let mut main = MeshAccum::with_capacity(count);
        let mut split = MeshAccum::with_capacity(count2);
        for cell in &cells {
            let Some(sel) = FaceSelection::for_band(cell.value, zmin, zmax, level, bands, showmin) else {
                continue;
            };
            let z2 = if cell.value > zmax {
                scales.grz(zmax)
            } else {
                scales.grz(cell.value)
            };
            let lo = Vec3::new(cell.foot.x1, cell.foot.y1, z1);
            let hi = Vec3::new(cell.foot.x2, cell.foot.y2, z2);
            for k in sel.corners() {
                if config.split_faces && k < 12 {
                    split.push(k, lo, hi, cell.id);
                } else {
                    main.push(k, lo, hi, cell.id);
                }
            }
        }

        let color = match config.color_mode {
            ColorMode::Palette => palette.color_for_level(level, bands),
            ColorMode::Single => config.fill_color,
        };
        log::debug!(
            "lego band {level}: {} + {} vertices",
            main.positions.len(),
            split.positions.len()
        );

        for (name, accum, material) in [
            ("lego", main, Material::flat(color)),
            ("lego_split", split, Material::flat(TIP_RED)),
        ] {
            if accum.positions.is_empty() {
                continue;
            }
            let buffer = accum.into_buffer();
            let pick = PickTable::for_buffer(&buffer, tooltip.clone(), tip_color);
            output
                .primitives
                .push(Primitive::mesh(format!("{name}_{level}"), buffer, material).with_pick(pick));
        }
    }

    if config.border_lines {
        if let Some(lines) = build_lego_wireframe(&cells, scales, showmin) {
            output
                .primitives
                .push(Primitive::lines("lego_wire", lines, Material::flat(config.line_color)));
        }
    }
    output
}

/// Outline of every box over the full value range.
///
/// Uses 16-bit indices when the vertex count fits, duplicated positions otherwise.
fn build_lego_wireframe(cells: &[BinCell], scales: &DrawScales, showmin: bool) -> Option<LineBuffer> {
    let (zmin, zmax) = scales.z.domain();
    let z1 = scales.grz(zmin);

    let drawn: Vec<(&BinCell, bool)> = cells
        .iter()
        .filter(|c| c.value >= zmin)
        .map(|c| (c, c.value == zmin))
        .filter(|&(_, reduced)| !reduced || showmin)
        .collect();
    if drawn.is_empty() {
        return None;
    }

    let num_vertices: usize = drawn
        .iter()
        .map(|&(_, reduced)| if reduced { FLAT_VERTICES.len() } else { BOX_VERTICES.len() })
        .sum();
    let num_segments: usize = drawn
        .iter()
        .map(|&(_, reduced)| if reduced { FLAT_SEGMENTS.len() } else { BOX_SEGMENTS.len() })
        .sum();
    let use_indices = num_vertices <= MAX_U16_LINE_VERTICES;

    let mut positions = Vec::with_capacity(if use_indices { num_vertices } else { num_segments });
    let mut indices: Vec<u16> = Vec::with_capacity(if use_indices { num_segments } else { 0 });

    for (cell, reduced) in drawn {
        let z2 = if cell.value > zmax {
            scales.grz(zmax)
        } else {
            scales.grz(cell.value)
        };
        let lo = Vec3::new(cell.foot.x1, cell.foot.y1, z1);
        let hi = Vec3::new(cell.foot.x2, cell.foot.y2, z2);
        let (verts, segs): (&[Vec3], &[usize]) = if reduced {
            (&FLAT_VERTICES, &FLAT_SEGMENTS)
        } else {
            (&BOX_VERTICES, &BOX_SEGMENTS)
        };
        if use_indices {
            let shift = positions.len();
            positions.extend(verts.iter().map(|&v| place(v, lo, hi)));
            indices.extend(segs.iter().map(|&s| (shift + s) as u16));
        } else {
            positions.extend(segs.iter().map(|&s| place(verts[s], lo, hi)));
        }
    }

    log::debug!(
        "lego wireframe: {num_vertices} vertices, {} segments, indexed {use_indices}",
        num_segments / 2
    );
    Some(LineBuffer {
        positions,
        indices: use_indices.then_some(IndexBuffer::U16(indices)),
    })
}
