//! Axis decorations: tick marks, label anchors, wall grids, the frame box and the
//! zoom planes.
//!
//! Every element sits in its own container with a [`AxisRole`] that decides, from
//! the camera quadrant, whether the element faces the viewer.

use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};
use histoscope_core::ticks::{set_axis_title, DEFAULT_DIVISIONS};
use histoscope_core::zoom_plane::ZOOM_FACES;
use histoscope_core::{
    AxisId, AxisScale, GeometryBuffer, LineBuffer, RenderConfig, TextMeasure, Tick, TickSet,
    ZoomPlane,
};
use histoscope_render::{LineStyle, Material, NodeDesc, NodeKind};

use crate::scales::DrawScales;

/// Length of a minor tick relative to a major one.
const MINOR_TICK: f32 = 0.6;

/// What an axis element is, for quadrant visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    /// Tick container of the x or y axis along one side.
    XyAxis(u8),
    /// Tick container of the z axis at one vertical edge.
    ZAxis(u8),
    /// Dashed z grid on one wall.
    Grid(u8),
    /// Horizontal frame edge, at the bottom or the top of the box.
    XyBoxEdge { id: u8, bottom: bool },
    /// Vertical frame edge.
    ZBoxEdge(u8),
}

/// Quadrant of the camera around the vertical axis, numbered 1 to 4.
#[must_use]
pub fn quadrant(camera: Vec3) -> u8 {
    match (camera.x >= 0.0, camera.y >= 0.0) {
        (false, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
        (true, false) => 4,
    }
}

fn quadrant_visible(id: i32, quadrant: i32, range: i32) -> bool {
    let id = if id <= quadrant { id + 4 } else { id };
    id > quadrant && id < quadrant + range
}

impl AxisRole {
    /// Whether the element shows for a camera in `quadrant`.
    #[must_use]
    pub fn is_visible(self, quadrant: u8, front_box: bool, back_box: bool) -> bool {
        let q = i32::from(quadrant);
        match self {
            Self::Grid(id) => back_box && quadrant_visible(i32::from(id), q, 3),
            Self::ZAxis(id) => quadrant_visible(i32::from(id), q, 2),
            Self::XyAxis(id) => quadrant_visible(i32::from(id), q, 3),
            Self::XyBoxEdge { id, bottom } => {
                let id = i32::from(id);
                let (range, shift) = match (front_box, back_box) {
                    (true, true) => (5, 0),
                    (false, true) => (3, -2),
                    (true, false) => (3, 0),
                    (false, false) => (if bottom { 3 } else { 0 }, 0),
                };
                quadrant_visible(id + shift, q, range) || (bottom && back_box && quadrant_visible(id, q, 3))
            }
            Self::ZBoxEdge(id) => {
                let (range, shift) = match (front_box, back_box) {
                    (true, true) => (5, 0),
                    (false, true) => (4, 0),
                    (true, false) => (4, -2),
                    (false, false) => (2, 0),
                };
                quadrant_visible(i32::from(id) + shift, q, range)
            }
        }
    }
}

/// One decoration container.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisElement {
    /// Group node carrying the container transform.
    pub container: NodeDesc,
    pub role: AxisRole,
    /// Nodes below the container.
    pub children: Vec<NodeDesc>,
    /// Zoom plane attached to this container, when zooming is enabled.
    pub zoom: Option<ZoomPlane>,
}

/// All decorations of one draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisDecorations {
    pub elements: Vec<AxisElement>,
}

impl AxisDecorations {
    /// Zoom planes in element order.
    pub fn zoom_planes(&self) -> impl Iterator<Item = &ZoomPlane> {
        self.elements.iter().filter_map(|e| e.zoom.as_ref())
    }

    /// Elements with the given role kind.
    pub fn with_role(&self, role: AxisRole) -> impl Iterator<Item = &AxisElement> {
        self.elements.iter().filter(move |e| e.role == role)
    }
}

/// Invisible mesh of a zoom plane, in container-local coordinates.
#[must_use]
pub fn zoom_plane_node(plane: &ZoomPlane) -> NodeDesc {
    let v = plane.local_vertices();
    let positions = ZOOM_FACES
        .iter()
        .flat_map(|f| [v[f[0]], v[f[1]], v[f[2]]])
        .collect();
    let local = plane.container().inverse() * plane.world_transform();
    NodeDesc::new(
        format!("zoom_{}", plane.axis().name()),
        NodeKind::Mesh(GeometryBuffer::with_flat_normals(positions)),
        Material::flat(Vec3::ZERO).with_opacity(0.0),
    )
    .with_transform(local)
    .with_pickable(false)
}

struct AxisTicks {
    ticks: Vec<Tick>,
    text_height: f32,
}

fn axis_ticks(
    scale: &AxisScale,
    measure: &dyn TextMeasure,
    text_size: f64,
    vertical: bool,
    title: Option<&str>,
) -> AxisTicks {
    let mut ticks = TickSet::new(scale, DEFAULT_DIVISIONS).fitted(measure, text_size, vertical, title.is_some());
    if let Some(title) = title {
        set_axis_title(&mut ticks, title);
    }
    let text_height = ticks
        .iter()
        .filter_map(|t| t.label.as_deref())
        .map(|l| measure.measure(l, text_size).1)
        .fold(0.0, f64::max) as f32;
    AxisTicks { ticks, text_height }
}

/// Tick segments and label anchors; `place` maps a draw position and an offset
/// across the axis into container-local coordinates.
fn tick_nodes(
    axis: char,
    ticks: &AxisTicks,
    ticklen: f32,
    text_size: f32,
    label_offset: f32,
    place: impl Fn(f32, f32) -> Vec3,
) -> Vec<NodeDesc> {
    let black = Material::flat(Vec3::ZERO);
    let mut lines = LineBuffer::default();
    let mut nodes = Vec::new();
    for tick in &ticks.ticks {
        let pos = tick.draw_pos as f32;
        let len = if tick.is_major { ticklen } else { ticklen * MINOR_TICK };
        lines.push_segment(place(pos, 0.0), place(pos, len));
        if let Some(label) = &tick.label {
            nodes.push(
                NodeDesc::new(
                    format!("{axis}_label"),
                    NodeKind::Text {
                        text: label.clone(),
                        size: text_size,
                    },
                    black,
                )
                .with_transform(Mat4::from_translation(place(pos, label_offset)))
                .with_pickable(false),
            );
        }
    }
    nodes.insert(
        0,
        NodeDesc::new(format!("{axis}_ticks"), NodeKind::Lines(lines), black).with_pickable(false),
    );
    nodes
}

fn element(
    name: String,
    transform: Mat4,
    role: AxisRole,
    children: Vec<NodeDesc>,
    zoom: Option<ZoomPlane>,
) -> AxisElement {
    let mut children = children;
    if let Some(plane) = &zoom {
        children.push(zoom_plane_node(plane));
    }
    AxisElement {
        container: NodeDesc::group(name).with_transform(transform),
        role,
        children,
        zoom,
    }
}

fn segment_node(name: &str, a: Vec3, b: Vec3, material: Material) -> NodeDesc {
    NodeDesc::new(
        name,
        NodeKind::Lines(LineBuffer::from_positions(vec![a, b])),
        material,
    )
    .with_pickable(false)
}

/// Builds the decorations for the current scales.
///
/// `with_y` is false for 1D data, which has no y ticks and no y zoom planes.
pub fn build_axes(
    scales: &DrawScales,
    config: &RenderConfig,
    measure: &dyn TextMeasure,
    with_y: bool,
) -> AxisDecorations {
    let s = scales.size3d();
    let (zmin, zmax) = (0.0_f32, 2.0 * s);
    let text_size = config.text_size();
    let ticklen = config.tick_length() as f32;
    let zoom = |axis: AxisId, container: Mat4| {
        config
            .zoom_enabled
            .then(|| ZoomPlane::new(axis, container, s, ticklen))
    };
    let mut elements = Vec::new();

    let xt = axis_ticks(&scales.x, measure, text_size, false, Some("x"));
    let x_offset = xt.text_height + 1.5 * ticklen;
    for (id, y, angle) in [(2, -s, FRAC_PI_4), (4, s, 3.0 * FRAC_PI_4)] {
        let transform = Mat4::from_translation(Vec3::new(0.0, y, zmin)) * Mat4::from_rotation_x(angle);
        let children = tick_nodes('x', &xt, ticklen, text_size as f32, x_offset, |p, d| {
            Vec3::new(p, -d, 0.0)
        });
        elements.push(element(
            format!("x_axis_{id}"),
            transform,
            AxisRole::XyAxis(id),
            children,
            zoom(AxisId::X, transform),
        ));
    }

    if with_y {
        let yt = axis_ticks(&scales.y, measure, text_size, false, Some("y"));
        let y_offset = yt.text_height + 1.5 * ticklen;
        for (id, x, angle) in [(3, -s, -FRAC_PI_4), (1, s, -3.0 * FRAC_PI_4)] {
            let transform =
                Mat4::from_translation(Vec3::new(x, 0.0, zmin)) * Mat4::from_rotation_y(angle);
            let children = tick_nodes('y', &yt, ticklen, text_size as f32, y_offset, |p, d| {
                Vec3::new(-d, p, 0.0)
            });
            elements.push(element(
                format!("y_axis_{id}"),
                transform,
                AxisRole::XyAxis(id),
                children,
                zoom(AxisId::Y, transform),
            ));
        }
    }

    let zt = axis_ticks(&scales.z, measure, text_size, true, None);
    let dashed = Material {
        line_style: LineStyle::Dashed,
        ..Material::flat(Vec3::ZERO)
    };
    let majors: Vec<f32> = zt
        .ticks
        .iter()
        .filter(|t| t.is_major)
        .map(|t| t.draw_pos as f32)
        .collect();
    if !majors.is_empty() {
        let along_x: Vec<Vec3> = majors
            .iter()
            .flat_map(|&z| [Vec3::new(-s, 0.0, z), Vec3::new(s, 0.0, z)])
            .collect();
        let along_y: Vec<Vec3> = majors
            .iter()
            .flat_map(|&z| [Vec3::new(0.0, -s, z), Vec3::new(0.0, s, z)])
            .collect();
        for (id, offset, positions) in [
            (2, Vec3::new(0.0, s, 0.0), &along_x),
            (4, Vec3::new(0.0, -s, 0.0), &along_x),
            (3, Vec3::new(s, 0.0, 0.0), &along_y),
            (1, Vec3::new(-s, 0.0, 0.0), &along_y),
        ] {
            let lines = NodeDesc::new(
                "z_grid",
                NodeKind::Lines(LineBuffer::from_positions(positions.clone())),
                dashed,
            )
            .with_pickable(false);
            elements.push(element(
                format!("z_grid_{id}"),
                Mat4::from_translation(offset),
                AxisRole::Grid(id),
                vec![lines],
                None,
            ));
        }
    }

    let corners = [
        (2, Vec3::new(-s, s, 0.0), 3.0 * FRAC_PI_4),
        (3, Vec3::new(s, s, 0.0), FRAC_PI_4),
        (4, Vec3::new(s, -s, 0.0), -FRAC_PI_4),
        (5, Vec3::new(-s, -s, 0.0), -3.0 * FRAC_PI_4),
    ];
    for (id, position, angle) in corners {
        let transform = Mat4::from_translation(position) * Mat4::from_rotation_z(angle);
        let children = tick_nodes('z', &zt, ticklen, text_size as f32, 2.0 * ticklen, |p, d| {
            Vec3::new(d, 0.0, p)
        });
        elements.push(element(
            format!("z_axis_{id}"),
            transform,
            AxisRole::ZAxis(id),
            children,
            zoom(AxisId::Z, transform),
        ));
    }

    let black = Material::flat(Vec3::ZERO);
    for bottom in [true, false] {
        let z = if bottom { zmin } else { zmax };
        for (id, position, a, b) in [
            (2, Vec3::new(0.0, -s, z), Vec3::new(-s, 0.0, 0.0), Vec3::new(s, 0.0, 0.0)),
            (4, Vec3::new(0.0, s, z), Vec3::new(-s, 0.0, 0.0), Vec3::new(s, 0.0, 0.0)),
            (3, Vec3::new(-s, 0.0, z), Vec3::new(0.0, -s, 0.0), Vec3::new(0.0, s, 0.0)),
            (1, Vec3::new(s, 0.0, z), Vec3::new(0.0, -s, 0.0), Vec3::new(0.0, s, 0.0)),
        ] {
            elements.push(element(
                format!("frame_{id}_{}", if bottom { "bottom" } else { "top" }),
                Mat4::from_translation(position),
                AxisRole::XyBoxEdge { id, bottom },
                vec![segment_node("frame_edge", a, b, black)],
                None,
            ));
        }
    }
    for (id, position, _) in corners {
        elements.push(element(
            format!("frame_z_{id}"),
            Mat4::from_translation(position),
            AxisRole::ZBoxEdge(id),
            vec![segment_node(
                "frame_edge",
                Vec3::new(0.0, 0.0, zmin),
                Vec3::new(0.0, 0.0, zmax),
                black,
            )],
            None,
        ));
    }

    log::debug!(
        "axes: {} elements, {} zoom planes",
        elements.len(),
        elements.iter().filter(|e| e.zoom.is_some()).count()
    );
    AxisDecorations { elements }
}
