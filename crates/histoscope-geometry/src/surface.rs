//! Contour-clipped surface through bin centers.
//!
//! Every cell between four neighbouring bin centers is split into two triangles.
//! Each triangle is clipped against every level band; the clipped polygon (at most
//! six points) is fan-triangulated into that band's buffer. Cell edges become wire
//! lines clipped to the draw box, and crossings of the upper level of a band become
//! contour lines.
//!
//! The build runs twice over the grid. The first pass only counts faces and
//! segments; the second writes into buffers of exactly that size. A mismatch
//! between the two is reported as a [`TopologyIssue`].

use glam::Vec3;
use histoscope_core::{
    ticks::DEFAULT_DIVISIONS, AxisId, FixedBuffer, GeometryBuffer, Grid, LineBuffer, RenderConfig,
    SurfaceMode, TickSet,
};
use histoscope_render::{LevelPalette, LineStyle, Material};
use thiserror::Error;

use crate::output::{DrawOutput, Primitive};
use crate::scales::{center_value, visible_bins, DrawScales};

/// Color of the smooth-shaded surface when no fill color is configured.
pub const SMOOTH_SURFACE_COLOR: Vec3 = Vec3::new(0.5, 0.5, 1.0);

/// Draw z of log values below the axis minimum.
const BELOW_LOG_MIN: f32 = -0.1;

const MAX_CLIP_POINTS: usize = 6;
const MAX_CORNER_SLOTS: usize = 8;

/// A defect found while clipping. The affected cell or corner is skipped; the rest
/// of the surface is still built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyIssue {
    /// A triangle walk produced one or two points for a band.
    #[error("band {band}: clip walk produced {points} points")]
    UnexpectedPointCount { band: usize, points: usize },

    /// A triangle walk produced more than six points.
    #[error("band {band}: more than 6 clip points")]
    ClipOverflow { band: usize },

    /// The writing pass did not fill its buffer exactly.
    #[error("{buffer}: counted {counted} vertices, wrote {written}")]
    CountMismatch {
        buffer: &'static str,
        counted: usize,
        written: usize,
    },

    /// More than eight triangles touched one grid corner.
    #[error("corner {corner:?}: more than 8 contributing vertices")]
    CornerOverflow { corner: [usize; 2] },

    /// A remembered corner vertex is missing from the band buffer.
    #[error("corner {corner:?}: contributing vertex {vertex} missing")]
    MissingContributor { corner: [usize; 2], vertex: usize },
}

/// Per-mode switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SurfaceFlags {
    wire_lines: bool,
    contour_lines: bool,
    color_faces: bool,
    smooth_normals: bool,
}

impl SurfaceFlags {
    fn for_mode(mode: SurfaceMode) -> Self {
        let (wire_lines, contour_lines, color_faces, smooth_normals) = match mode {
            SurfaceMode::Lines => (true, true, false, false),
            SurfaceMode::ColorFaces => (true, false, true, false),
            SurfaceMode::ColorFacesNoLines => (false, false, true, false),
            SurfaceMode::SmoothNormals => (false, false, false, true),
            SurfaceMode::ContourGrid => (false, true, false, false),
        };
        Self {
            wire_lines,
            contour_lines,
            color_faces,
            smooth_normals,
        }
    }
}

/// Buffers produced by [`build_surface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceGeometry {
    /// Level boundaries in draw z.
    pub levels: Vec<f32>,
    /// Fill triangles per band, `None` for bands that emit nothing.
    pub bands: Vec<Option<GeometryBuffer>>,
    /// Cell edges clipped to the draw box.
    pub wire_lines: Option<LineBuffer>,
    /// Crossings of each band's upper level.
    pub contour_lines: Option<LineBuffer>,
    /// Defects found while building.
    pub issues: Vec<TopologyIssue>,
}

impl SurfaceGeometry {
    /// Total fill triangles over all bands.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.bands
            .iter()
            .flatten()
            .map(GeometryBuffer::triangle_count)
            .sum()
    }
}

/// Side of a value relative to the band `[lo, hi]`.
fn side(z: f32, lo: f32, hi: f32) -> i32 {
    if z < lo {
        -1
    } else if z > hi {
        1
    } else {
        0
    }
}

/// Points of one clipped triangle.
#[derive(Debug, Clone)]
struct ClipPolygon {
    points: [Vec3; MAX_CLIP_POINTS],
    len: usize,
    last_part: f32,
    grid: [Vec3; 2],
    grid_count: usize,
    overflow: bool,
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self {
            points: [Vec3::ZERO; MAX_CLIP_POINTS],
            len: 0,
            last_part: 0.0,
            grid: [Vec3::ZERO; 2],
            grid_count: 0,
            overflow: false,
        }
    }
}

impl ClipPolygon {
    fn clear(&mut self) {
        self.len = 0;
        self.last_part = 0.0;
        self.grid_count = 0;
        self.overflow = false;
    }

    fn push(&mut self, p: Vec3) {
        if self.len < MAX_CLIP_POINTS {
            self.points[self.len] = p;
            self.len += 1;
        } else {
            self.overflow = true;
        }
    }

    /// Adds the point where edge `a -> b` crosses `level`.
    ///
    /// When two crossings fall on one edge the one nearer to `a` goes first.
    fn crossing(&mut self, a: Vec3, b: Vec3, level: f32, with_grid: bool) {
        let part = (level - a.z) / (b.z - a.z);
        let p = Vec3::new(a.x + part * (b.x - a.x), a.y + part * (b.y - a.y), level);
        if self.last_part != 0.0 && part.abs() < self.last_part.abs() && self.len > 0 {
            let previous = self.points[self.len - 1];
            self.points[self.len - 1] = p;
            self.push(previous);
        } else {
            self.push(p);
        }
        if with_grid {
            if let Some(slot) = self.grid.get_mut(self.grid_count) {
                *slot = p;
            }
            self.grid_count += 1;
        }
        self.last_part = part;
    }

    /// Walks edge `a -> b`, adding `a` when inside the band and any crossings.
    fn edge(&mut self, a: Vec3, sa: i32, b: Vec3, sb: i32, lo: f32, hi: f32) {
        if sa == 0 {
            self.push(a);
        }
        if sa != sb {
            self.last_part = 0.0;
            if sa < 0 || sb < 0 {
                self.crossing(a, b, lo, false);
            }
            if sa > 0 || sb > 0 {
                self.crossing(a, b, hi, true);
            }
        }
    }

    fn points(&self) -> &[Vec3] {
        &self.points[..self.len]
    }
}

/// Up to eight band-vertex indices per grid corner, for normal averaging.
#[derive(Debug, Clone)]
struct CornerTable {
    i0: usize,
    j0: usize,
    nj: usize,
    slots: Vec<[usize; MAX_CORNER_SLOTS]>,
    counts: Vec<usize>,
}

impl CornerTable {
    fn new(i0: usize, ni: usize, j0: usize, nj: usize) -> Self {
        Self {
            i0,
            j0,
            nj,
            slots: vec![[0; MAX_CORNER_SLOTS]; ni * nj],
            counts: vec![0; ni * nj],
        }
    }

    fn slot(&self, i: usize, j: usize) -> usize {
        (i - self.i0) * self.nj + (j - self.j0)
    }

    fn remember(&mut self, vertex: usize, i: usize, j: usize) -> Result<(), TopologyIssue> {
        let bin = self.slot(i, j);
        let count = self.counts[bin];
        if count >= MAX_CORNER_SLOTS {
            return Err(TopologyIssue::CornerOverflow { corner: [i, j] });
        }
        self.slots[bin][count] = vertex;
        self.counts[bin] = count + 1;
        Ok(())
    }

    /// Replaces the normal of every remembered vertex by the corner average.
    fn apply(&self, normals: &mut [Vec3], issues: &mut Vec<TopologyIssue>) {
        for (bin, (slots, &count)) in self.slots.iter().zip(&self.counts).enumerate() {
            if count == 0 {
                continue;
            }
            let corner = [self.i0 + bin / self.nj, self.j0 + bin % self.nj];
            let used = &slots[..count];
            if let Some(&vertex) = used.iter().find(|&&v| v >= normals.len()) {
                issues.push(TopologyIssue::MissingContributor { corner, vertex });
                continue;
            }
            let sum: Vec3 = used.iter().map(|&v| normals[v]).sum();
            let average = sum / count as f32;
            for &v in used {
                normals[v] = average;
            }
        }
    }
}

struct SurfaceBuild<'a> {
    levels: &'a [f32],
    top: f32,
    flags: SurfaceFlags,
    counting: bool,
    face_counts: Vec<usize>,
    segment_count: usize,
    grid_segment_count: usize,
    fills: Vec<Option<FixedBuffer<Vec3>>>,
    wire: Option<FixedBuffer<Vec3>>,
    contour: Option<FixedBuffer<Vec3>>,
    corners: Option<CornerTable>,
    poly: ClipPolygon,
    issues: Vec<TopologyIssue>,
}

impl<'a> SurfaceBuild<'a> {
    fn new(levels: &'a [f32], top: f32, flags: SurfaceFlags) -> Self {
        let bands = levels.len().saturating_sub(1);
        Self {
            levels,
            top,
            flags,
            counting: true,
            face_counts: vec![0; bands],
            segment_count: 0,
            grid_segment_count: 0,
            fills: vec![None; bands],
            wire: None,
            contour: None,
            corners: None,
            poly: ClipPolygon::default(),
            issues: Vec::new(),
        }
    }

    /// Switches to the writing pass with buffers sized from the counts.
    fn start_writing(&mut self) {
        self.counting = false;
        for (fill, &faces) in self.fills.iter_mut().zip(&self.face_counts) {
            *fill = (faces > 0).then(|| FixedBuffer::new(faces * 3));
        }
        if self.flags.wire_lines && self.segment_count > 0 {
            self.wire = Some(FixedBuffer::new(self.segment_count * 2));
        }
        if self.flags.contour_lines && self.grid_segment_count > 0 {
            self.contour = Some(FixedBuffer::new(self.grid_segment_count * 2));
        }
    }

    /// Adds a wire segment clipped to `[0, top]` in z.
    fn line_segment(&mut self, mut a: Vec3, mut b: Vec3) {
        if !self.flags.wire_lines {
            return;
        }
        let s1 = side(a.z, 0.0, self.top);
        let s2 = side(b.z, 0.0, self.top);
        if s1 == s2 && s1 != 0 {
            return;
        }
        if self.counting {
            self.segment_count += 1;
            return;
        }
        if s1 != 0 {
            let diff = b.z - a.z;
            a.z = if s1 < 0 { 0.0 } else { self.top };
            a.x = b.x - (b.x - a.x) / diff * (b.z - a.z);
            a.y = b.y - (b.y - a.y) / diff * (b.z - a.z);
        }
        if s2 != 0 {
            let diff = a.z - b.z;
            b.z = if s2 < 0 { 0.0 } else { self.top };
            b.x = a.x - (a.x - b.x) / diff * (a.z - b.z);
            b.y = a.y - (a.y - b.y) / diff * (a.z - b.z);
        }
        if let Some(wire) = self.wire.as_mut() {
            wire.push(a);
            wire.push(b);
        }
    }

    /// Clips one cell triangle against every band.
    ///
    /// `cell` is the lower-left grid corner; `first` selects the triangle above
    /// the diagonal.
    fn main_triangle(&mut self, v: [Vec3; 3], cell: (usize, usize), first: bool) {
        let (i, j) = cell;
        for band in 0..self.levels.len().saturating_sub(1) {
            let (lo, hi) = (self.levels[band], self.levels[band + 1]);
            let s = [side(v[0].z, lo, hi), side(v[1].z, lo, hi), side(v[2].z, lo, hi)];
            let sum: i32 = s.iter().sum();
            if sum == 3 {
                continue;
            }
            if sum == -3 {
                return;
            }

            if self.counting {
                let zeros = s.iter().filter(|&&x| x == 0).count();
                let points = ((s[1] - s[0]).abs() + (s[2] - s[1]).abs() + (s[0] - s[2]).abs())
                    as usize
                    + zeros;
                if points == 1 || points == 2 {
                    self.report(TopologyIssue::UnexpectedPointCount { band, points });
                }
                if points > 2 {
                    self.face_counts[band] += points - 2;
                }
                let mixed = s[0] != s[1] || s[1] != s[2];
                if s.iter().any(|&x| x > 0) && mixed {
                    self.grid_segment_count += 1;
                }
                continue;
            }

            self.poly.clear();
            self.poly.edge(v[0], s[0], v[1], s[1], lo, hi);
            self.poly.edge(v[1], s[1], v[2], s[2], lo, hi);
            self.poly.edge(v[2], s[2], v[0], s[0], lo, hi);

            if self.poly.overflow {
                self.report(TopologyIssue::ClipOverflow { band });
                continue;
            }
            let n = self.poly.len;
            if n < 3 {
                continue;
            }

            if self.poly.grid_count == 2 {
                if let Some(contour) = self.contour.as_mut() {
                    contour.push(self.poly.grid[0]);
                    contour.push(self.poly.grid[1]);
                }
            }

            let Some(fill) = self.fills[band].as_mut() else {
                continue;
            };
            let start = fill.written();
            let pts = self.poly.points();
            for k in 1..n - 1 {
                fill.push(pts[0]);
                fill.push(pts[k]);
                fill.push(pts[k + 1]);
            }

            if n == 3 && band == 0 {
                if let Some(corners) = self.corners.as_mut() {
                    let targets = [
                        (i, j),
                        (i + 1, if first { j + 1 } else { j }),
                        (if first { i } else { i + 1 }, j + 1),
                    ];
                    for (offset, (ci, cj)) in targets.into_iter().enumerate() {
                        if let Err(issue) = corners.remember(start + offset, ci, cj) {
                            log::error!("surface: {issue}");
                            self.issues.push(issue);
                        }
                    }
                }
            }
        }
    }

    fn report(&mut self, issue: TopologyIssue) {
        log::error!("surface: {issue}");
        self.issues.push(issue);
    }

    fn finish(mut self) -> SurfaceGeometry {
        let mut bands = Vec::with_capacity(self.fills.len());
        let fills = std::mem::take(&mut self.fills);
        for (band, fill) in fills.into_iter().enumerate() {
            let Some(fill) = fill else {
                bands.push(None);
                continue;
            };
            if !fill.is_exact() {
                self.report(TopologyIssue::CountMismatch {
                    buffer: "fill",
                    counted: fill.capacity(),
                    written: fill.written() + fill.overflow(),
                });
            }
            let mut buffer = GeometryBuffer::with_flat_normals(fill.into_written());
            if band == 0 {
                if let (Some(corners), Some(normals)) = (self.corners.as_ref(), buffer.normals.as_mut()) {
                    corners.apply(normals, &mut self.issues);
                }
            }
            bands.push(Some(buffer));
        }

        let wire_lines = self.wire.take().map(|b| self.close_lines("wire lines", b));
        let contour_lines = self.contour.take().map(|b| self.close_lines("contour lines", b));

        SurfaceGeometry {
            levels: self.levels.to_vec(),
            bands,
            wire_lines,
            contour_lines,
            issues: self.issues,
        }
    }

    fn close_lines(&mut self, name: &'static str, buffer: FixedBuffer<Vec3>) -> LineBuffer {
        if !buffer.is_exact() {
            self.report(TopologyIssue::CountMismatch {
                buffer: name,
                counted: buffer.capacity(),
                written: buffer.written() + buffer.overflow(),
            });
        }
        LineBuffer::from_positions(buffer.into_written())
    }
}

/// Level boundaries in draw z for the given mode.
///
/// Tick-based levels are extended to the full draw box so nothing above the last
/// major tick is cut away.
#[must_use]
pub fn surface_levels(scales: &DrawScales, config: &RenderConfig, palette: &dyn LevelPalette) -> Vec<f32> {
    let top = (2.0 * scales.extent) as f32;
    let (zmin, zmax) = scales.z.domain();
    let to_draw = |v: f64| surface_z(scales, v);
    match config.surface_mode {
        SurfaceMode::SmoothNormals => vec![0.0, top],
        SurfaceMode::Lines => {
            let mut levels = vec![0.0];
            levels.extend(
                TickSet::new(&scales.z, DEFAULT_DIVISIONS)
                    .iter()
                    .filter(|t| t.is_major)
                    .map(|t| to_draw(t.data_value))
                    .filter(|&z| z > 0.0 && z < top),
            );
            levels.push(top);
            levels
        }
        SurfaceMode::ColorFaces | SurfaceMode::ColorFacesNoLines | SurfaceMode::ContourGrid => {
            let count = config.level_count.max(2);
            palette
                .levels(zmin, zmax, count, scales.z.is_log())
                .into_iter()
                .map(to_draw)
                .collect()
        }
    }
}

fn surface_z(scales: &DrawScales, value: f64) -> f32 {
    if scales.z.is_log() && value < scales.z.domain().0 {
        BELOW_LOG_MIN
    } else {
        scales.grz(value)
    }
}

/// Builds the clipped surface of a 2D grid.
///
/// Returns empty geometry when fewer than two bins are visible along x or y.
pub fn build_surface(
    grid: &dyn Grid,
    scales: &DrawScales,
    config: &RenderConfig,
    palette: &dyn LevelPalette,
) -> SurfaceGeometry {
    let (i1, i2) = visible_bins(grid, AxisId::X, &scales.x);
    let (j1, j2) = visible_bins(grid, AxisId::Y, &scales.y);
    if grid.dimension() != 2 || i2 - i1 < 2 || j2 - j1 < 2 {
        log::debug!("surface: not enough visible bins");
        return SurfaceGeometry::default();
    }

    let flags = SurfaceFlags::for_mode(config.surface_mode);
    let levels = surface_levels(scales, config, palette);
    let top = (2.0 * scales.extent) as f32;

    let xs: Vec<f32> = (i1..i2)
        .map(|i| scales.grx(center_value(grid, AxisId::X, &scales.x, i)))
        .collect();
    let ys: Vec<f32> = (j1..j2)
        .map(|j| scales.gry(center_value(grid, AxisId::Y, &scales.y, j)))
        .collect();
    let z = |i: usize, j: usize| surface_z(scales, grid.content(i, j, 0));

    let mut build = SurfaceBuild::new(&levels, top, flags);
    if flags.smooth_normals {
        build.corners = Some(CornerTable::new(i1, i2 - i1, j1, j2 - j1));
    }

    for pass in 0..2 {
        if pass == 1 {
            build.start_writing();
        }
        for i in i1..i2 - 1 {
            let (x1, x2) = (xs[i - i1], xs[i - i1 + 1]);
            for j in j1..j2 - 1 {
                let (y1, y2) = (ys[j - j1], ys[j - j1 + 1]);
                let p11 = Vec3::new(x1, y1, z(i, j));
                let p12 = Vec3::new(x1, y2, z(i, j + 1));
                let p21 = Vec3::new(x2, y1, z(i + 1, j));
                let p22 = Vec3::new(x2, y2, z(i + 1, j + 1));

                build.main_triangle([p11, p22, p12], (i, j), true);
                build.main_triangle([p11, p21, p22], (i, j), false);

                build.line_segment(p12, p11);
                build.line_segment(p11, p21);
                if i == i2 - 2 {
                    build.line_segment(p21, p22);
                }
                if j == j2 - 2 {
                    build.line_segment(p12, p22);
                }
            }
        }
    }

    let geometry = build.finish();
    log::debug!(
        "surface: {} bands, {} triangles, {} issues",
        geometry.bands.len(),
        geometry.triangle_count(),
        geometry.issues.len()
    );
    geometry
}

/// Scene primitives for a surface draw.
pub fn surface_primitives(
    geometry: SurfaceGeometry,
    config: &RenderConfig,
    palette: &dyn LevelPalette,
) -> DrawOutput {
    let flags = SurfaceFlags::for_mode(config.surface_mode);
    let band_count = geometry.bands.len();
    let mut output = DrawOutput::default();

    for (band, buffer) in geometry.bands.into_iter().enumerate() {
        let Some(buffer) = buffer else { continue };
        let material = if flags.color_faces {
            Material::flat(palette.color_for_level(band, band_count))
        } else if flags.smooth_normals {
            let color = if config.fill_color == Vec3::ONE {
                SMOOTH_SURFACE_COLOR
            } else {
                config.fill_color
            };
            Material::lambert(color)
        } else {
            Material::flat(config.fill_color)
        };
        output
            .primitives
            .push(Primitive::mesh(format!("surface_{band}"), buffer, material));
    }

    if let Some(wire) = geometry.wire_lines {
        output
            .primitives
            .push(Primitive::lines("surface_wire", wire, Material::flat(config.line_color)));
    }
    if let Some(contour) = geometry.contour_lines {
        let material = if config.surface_mode == SurfaceMode::Lines {
            Material {
                line_style: LineStyle::Dashed,
                ..Material::flat(Vec3::ZERO)
            }
        } else {
            Material::flat(config.line_color)
        };
        output
            .primitives
            .push(Primitive::lines("surface_contour", contour, material));
    }
    output
}
