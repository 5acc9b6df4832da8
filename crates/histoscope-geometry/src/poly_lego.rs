//! Extruded polygonal bins.
//!
//! Each outline of a bin is triangulated with `lyon_tessellation` and extruded from
//! the value-axis minimum up to the bin content: a reversed bottom cap, a top cap and
//! side walls when the prism has height.

use glam::{DVec2, Vec2, Vec3};
use histoscope_core::{tip_color_for, BinBounds, ColorMode, GeometryBuffer, PolyGrid, RenderConfig};
use histoscope_render::{LevelPalette, Material};
use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};

use crate::output::{DrawOutput, PickTable, Primitive, Tooltip};
use crate::scales::DrawScales;

/// A triangulated outline in draw coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineMesh {
    /// Outline points after duplicate removal.
    pub points: Vec<Vec2>,
    /// Triangulation vertices.
    pub vertices: Vec<Vec2>,
    /// Counter-clockwise triangles into `vertices`.
    pub triangles: Vec<[usize; 3]>,
}

/// Drops the closing point of an outline when it repeats the first one.
fn strip_closing(outline: &[DVec2]) -> &[DVec2] {
    let mut n = outline.len();
    while n > 2 && outline[0] == outline[n - 1] {
        n -= 1;
    }
    &outline[..n]
}

/// Maps an outline to draw space, dropping points closer than `sqrt(limit)` to the
/// previously kept one.
fn compress(outline: &[DVec2], scales: &DrawScales, limit: f32) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = Vec::with_capacity(outline.len());
    for p in outline {
        let q = Vec2::new(scales.grx(p.x), scales.gry(p.y));
        let keep = points
            .last()
            .map_or(true, |last| last.distance_squared(q) > limit);
        if keep {
            points.push(q);
        }
    }
    points
}

fn tessellate(points: &[Vec2]) -> Option<(Vec<Vec2>, Vec<[usize; 3]>)> {
    let (first, rest) = points.split_first()?;
    let mut builder = Path::builder();
    builder.begin(point(first.x, first.y));
    for p in rest {
        builder.line_to(point(p.x, p.y));
    }
    builder.close();
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    let result = tessellator.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            Vec2::new(vertex.position().x, vertex.position().y)
        }),
    );
    if let Err(e) = result {
        log::debug!("poly outline tessellation failed: {e:?}");
        return None;
    }

    let triangles = buffers
        .indices
        .chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [t[0] as usize, t[1] as usize, t[2] as usize];
            let (pa, pb, pc) = (buffers.vertices[a], buffers.vertices[b], buffers.vertices[c]);
            if (pb - pa).perp_dot(pc - pa) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect();
    Some((buffers.vertices, triangles))
}

/// Triangulates one outline.
///
/// Tries a compressed outline first and falls back to the full one when the
/// triangulation comes out short.
#[must_use]
pub fn triangulate_outline(outline: &[DVec2], scales: &DrawScales) -> Option<OutlineMesh> {
    let outline = strip_closing(outline);
    let size = scales.size3d();
    let mut result = None;
    for limit in [size * size / 1e6, 0.0] {
        let points = compress(outline, scales, limit);
        if points.len() < 3 {
            continue;
        }
        let Some((vertices, triangles)) = tessellate(&points) else {
            continue;
        };
        let complete = triangles.len() + 2 >= points.len();
        result = Some(OutlineMesh {
            points,
            vertices,
            triangles,
        });
        if complete {
            break;
        }
    }
    result.filter(|mesh| !mesh.triangles.is_empty())
}

/// Prism positions for the given outlines between `z0` and `z1`.
fn extrude(meshes: &[OutlineMesh], z0: f32, z1: f32) -> Vec<Vec3> {
    let mut positions = Vec::new();
    for mesh in meshes {
        for top in [false, true] {
            let z = if top { z1 } else { z0 };
            for &[a, b, c] in &mesh.triangles {
                let order = if top { [a, b, c] } else { [a, c, b] };
                positions.extend(order.iter().map(|&v| mesh.vertices[v].extend(z)));
            }
        }
        if z1 > z0 {
            let n = mesh.points.len();
            for k in 0..n {
                let p1 = mesh.points[k];
                let p2 = mesh.points[if k > 0 { k - 1 } else { n - 1 }];
                positions.extend([
                    p1.extend(z0),
                    p2.extend(z0),
                    p2.extend(z1),
                    p1.extend(z0),
                    p2.extend(z1),
                    p1.extend(z1),
                ]);
            }
        }
    }
    positions
}

/// Builds one prism node per visible polygon bin.
pub fn build_poly_lego(
    grid: &PolyGrid,
    scales: &DrawScales,
    config: &RenderConfig,
    palette: &dyn LevelPalette,
) -> DrawOutput {
    let mut output = DrawOutput::default();
    let (zmin, zmax) = scales.z.domain();
    let (xmin, xmax) = scales.x.domain();
    let (ymin, ymax) = scales.y.domain();
    let z0 = scales.grz(zmin);
    let levels = palette.levels(zmin, zmax, config.level_count.max(1), scales.z.is_log());
    let bands = levels.len().saturating_sub(1);
    let tip_color = tip_color_for(config.fill_color);

    for (index, bin) in grid.bins.iter().enumerate() {
        if bin.content < zmin {
            continue;
        }
        let (lo, hi) = bin.bounds();
        if lo.x > xmax || hi.x < xmin || lo.y > ymax || hi.y < ymin {
            continue;
        }
        let z1 = scales.grz(bin.content.min(zmax));

        let meshes: Vec<OutlineMesh> = bin
            .outlines
            .iter()
            .filter_map(|outline| triangulate_outline(outline, scales))
            .collect();
        if meshes.is_empty() {
            log::warn!("poly bin {index}: no outline could be triangulated");
            continue;
        }

        let positions = extrude(&meshes, z0, z1);
        let vertex_count = positions.len();
        let buffer = GeometryBuffer::with_flat_normals(positions).with_bins(vertex_count, vec![index]);

        let color = match config.color_mode {
            ColorMode::Palette => {
                let band = levels
                    .windows(2)
                    .position(|w| bin.content < w[1])
                    .unwrap_or(bands.saturating_sub(1));
                palette.color_for_level(band, bands)
            }
            ColorMode::Single => config.fill_color,
        };

        let bounds = BinBounds {
            x1: scales.grx(lo.x),
            x2: scales.grx(hi.x),
            y1: scales.gry(lo.y),
            y2: scales.gry(hi.y),
            z1: z0,
            z2: z1,
        };
        let pick = PickTable::for_buffer(&buffer, Tooltip::PolyBin { bin: index, bounds }, tip_color);
        output.primitives.push(
            Primitive::mesh(format!("poly_bin_{index}"), buffer, Material::flat(color)).with_pick(pick),
        );
    }
    log::debug!("poly lego: {} bins drawn", output.primitives.len());
    output
}

#[cfg(test)]
mod tests {
    use histoscope_core::PolyBin;
    use histoscope_render::ColorMapPalette;

    use super::*;

    fn square(x: f64, y: f64, content: f64) -> PolyBin {
        PolyBin::new(
            vec![
                DVec2::new(x, y),
                DVec2::new(x + 1.0, y),
                DVec2::new(x + 1.0, y + 1.0),
                DVec2::new(x, y + 1.0),
                DVec2::new(x, y),
            ],
            content,
        )
    }

    fn draw(grid: &PolyGrid) -> DrawOutput {
        let config = RenderConfig::default();
        let scales = DrawScales::for_poly(grid, &config, &[None; 3]).unwrap();
        build_poly_lego(grid, &scales, &config, &ColorMapPalette::default())
    }

    #[test]
    fn test_square_prism() {
        let grid = PolyGrid::new(vec![square(0.0, 0.0, 3.0), square(1.0, 0.0, 5.0)]);
        let output = draw(&grid);
        assert_eq!(output.primitives.len(), 2);
        let buffer = output.primitives[0].mesh_buffer().unwrap();
        // two caps of two triangles plus four walls of two triangles
        assert_eq!(buffer.triangle_count(), 4 + 8);
        assert_eq!(buffer.bin_of_vertex(0), Some(0));
        let normals = buffer.normals.as_ref().unwrap();
        assert!(normals[..6].iter().all(|n| (*n - Vec3::NEG_Z).length() < 1e-5));
        assert!(normals[6..12].iter().all(|n| (*n - Vec3::Z).length() < 1e-5));
    }

    #[test]
    fn test_pick_recolors_bin() {
        let grid = PolyGrid::new(vec![square(0.0, 0.0, 3.0), square(1.0, 0.0, 5.0)]);
        let output = draw(&grid);
        let pick = output.primitives[1].pick.as_ref().unwrap();
        assert_eq!(pick.bins, vec![1]);
        assert!(matches!(pick.tooltip, Tooltip::PolyBin { bin: 1, .. }));
    }

    #[test]
    fn test_flat_bin_has_no_walls() {
        let grid = PolyGrid::new(vec![square(0.0, 0.0, 0.0), square(1.0, 0.0, 2.0)]);
        let config = RenderConfig {
            value_min: Some(0.0),
            ..RenderConfig::default()
        };
        let scales = DrawScales::for_poly(&grid, &config, &[None; 3]).unwrap();
        let output = build_poly_lego(&grid, &scales, &config, &ColorMapPalette::default());
        assert_eq!(output.primitives[0].mesh_buffer().unwrap().triangle_count(), 4);
    }

    #[test]
    fn test_near_duplicates_removed() {
        let grid = PolyGrid::new(vec![square(0.0, 0.0, 1.0)]);
        let scales = DrawScales::for_poly(&grid, &RenderConfig::default(), &[None; 3]).unwrap();
        let outline = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1e-9, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(0.0, 0.0),
        ];
        let mesh = triangulate_outline(&outline, &scales).unwrap();
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn test_degenerate_outline_skipped() {
        let grid = PolyGrid::new(vec![
            PolyBin::new(vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)], 2.0),
            square(0.0, 0.0, 1.0),
        ]);
        let output = draw(&grid);
        assert_eq!(output.primitives.len(), 1);
        assert_eq!(output.primitives[0].name, "poly_bin_1");
    }
}
