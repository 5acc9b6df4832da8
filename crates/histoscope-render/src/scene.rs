//! Scene-graph interface.
//!
//! Builders hand their output to a [`SceneGraph`] as [`NodeDesc`]s. The graph
//! owns the nodes; callers only hold [`NodeId`]s.

use glam::{Mat4, Vec3};
use histoscope_core::{GeometryBuffer, LineBuffer, Ray};

use crate::camera::Camera;
use crate::error::RenderResult;

/// Handle to a node owned by a scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Dash pattern for line nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Appearance of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color.
    pub color: Vec3,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Diffuse-lit instead of flat.
    pub lambert: bool,
    /// Dash pattern for lines.
    pub line_style: LineStyle,
    /// Marker size for point nodes, in draw units.
    pub point_size: f32,
}

impl Material {
    /// Flat, opaque material.
    pub fn flat(color: Vec3) -> Self {
        Self {
            color,
            opacity: 1.0,
            lambert: false,
            line_style: LineStyle::Solid,
            point_size: 1.0,
        }
    }

    /// Diffuse-lit, opaque material.
    pub fn lambert(color: Vec3) -> Self {
        Self {
            lambert: true,
            ..Self::flat(color)
        }
    }

    /// Returns the material with the given opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::flat(Vec3::ONE)
    }
}

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A transform-only container.
    Group,
    /// Triangles.
    Mesh(GeometryBuffer),
    /// Line segments.
    Lines(LineBuffer),
    /// Unconnected points.
    Points(Vec<Vec3>),
    /// A text label anchored at the node origin.
    Text { text: String, size: f32 },
}

impl NodeKind {
    /// Bytes of vertex and index data a renderer keeps for this node.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Mesh(geom) => geom.byte_len(),
            Self::Lines(lines) => lines.byte_len(),
            Self::Points(points) => std::mem::size_of_val(points.as_slice()),
            Self::Group | Self::Text { .. } => 0,
        }
    }
}

/// Description of a node to add.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDesc {
    /// Human-readable name, useful in logs.
    pub name: String,
    pub kind: NodeKind,
    pub material: Material,
    /// Local transform relative to the parent.
    pub transform: Mat4,
    pub visible: bool,
    /// Whether ray queries may hit this node.
    pub pickable: bool,
}

impl NodeDesc {
    /// A named group.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group, Material::default())
    }

    /// A named node of the given kind.
    pub fn new(name: impl Into<String>, kind: NodeKind, material: Material) -> Self {
        Self {
            name: name.into(),
            kind,
            material,
            transform: Mat4::IDENTITY,
            visible: true,
            pickable: true,
        }
    }

    /// Sets the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Sets whether ray queries see the node.
    #[must_use]
    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }
}

/// One ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Node that was hit.
    pub node: NodeId,
    /// World-space hit point.
    pub point: Vec3,
    /// Distance along the ray.
    pub distance: f32,
    /// First vertex of the hit face, or the hit point index for point nodes.
    pub vertex: usize,
}

/// A retained-mode scene graph.
pub trait SceneGraph {
    /// Adds a node below `parent`, or at the top level.
    fn add_node(&mut self, parent: Option<NodeId>, desc: NodeDesc) -> RenderResult<NodeId>;

    /// Removes a node and everything below it, releasing their resources.
    /// Returns the number of nodes released.
    fn remove_node(&mut self, id: NodeId) -> RenderResult<usize>;

    /// Direct children of a node.
    fn children(&self, id: NodeId) -> RenderResult<Vec<NodeId>>;

    /// Shows or hides a node and its subtree.
    fn set_visible(&mut self, id: NodeId, visible: bool) -> RenderResult<()>;

    /// Sets the material color, returning the previous one.
    fn set_material_color(&mut self, id: NodeId, color: Vec3) -> RenderResult<Vec3>;

    /// Visible, pickable hits of `ray` within `root`'s subtree (or the whole
    /// scene), nearest first.
    fn intersect(&self, ray: &Ray, root: Option<NodeId>) -> Vec<Intersection>;

    /// Draws one frame.
    fn render(&mut self, camera: &Camera) -> RenderResult<()>;

    /// Resizes the drawing surface.
    fn set_size(&mut self, width: u32, height: u32) -> RenderResult<()>;
}
