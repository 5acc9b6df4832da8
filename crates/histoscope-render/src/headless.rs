//! In-memory scene graph without a GPU.
//!
//! Keeps the full node tree, answers ray queries on the CPU and counts
//! frames. Used by tests and by embedders that draw through their own backend.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use histoscope_core::Ray;

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::scene::{Intersection, NodeDesc, NodeId, NodeKind, SceneGraph};

#[derive(Debug, Clone)]
struct Node {
    desc: NodeDesc,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A CPU-only [`SceneGraph`].
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u64,
    frames: u64,
    resident_bytes: usize,
    size: (u32, u32),
    /// Distance from the ray within which point nodes are hit.
    pub point_threshold: f32,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl HeadlessScene {
    /// Creates an empty scene with the given surface size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            next_id: 1,
            frames: 0,
            resident_bytes: 0,
            size: (width, height),
            point_threshold: 1.0,
        }
    }

    /// Number of nodes currently alive.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bytes of buffer data held by live nodes.
    #[must_use]
    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    /// Number of frames drawn.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Current surface size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Whether `id` is alive.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Description of a live node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeDesc> {
        self.nodes.get(&id).map(|n| &n.desc)
    }

    /// Product of the transforms from the top level down to `id`.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(node) = self.nodes.get(&c) else {
                break;
            };
            m = node.desc.transform * m;
            cur = node.parent;
        }
        m
    }

    fn get(&self, id: NodeId) -> RenderResult<&Node> {
        self.nodes.get(&id).ok_or(RenderError::NodeNotFound(id.0))
    }

    fn get_mut(&mut self, id: NodeId) -> RenderResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(RenderError::NodeNotFound(id.0))
    }

    fn collect_hits(&self, id: NodeId, parent_world: Mat4, ray: &Ray, hits: &mut Vec<Intersection>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.desc.visible {
            return;
        }
        let world = parent_world * node.desc.transform;
        if node.desc.pickable {
            match &node.desc.kind {
                NodeKind::Mesh(geom) => {
                    for face in 0..geom.triangle_count() {
                        let Some(tri) = geom.triangle(face) else {
                            continue;
                        };
                        let [a, b, c] = tri.map(|p| world.transform_point3(p));
                        if let Some(t) = ray.intersect_triangle(a, b, c) {
                            hits.push(Intersection {
                                node: id,
                                point: ray.at(t),
                                distance: t,
                                vertex: geom.first_vertex_of(face).unwrap_or(face * 3),
                            });
                        }
                    }
                }
                NodeKind::Points(points) => {
                    let threshold = self.point_threshold * node.desc.material.point_size.max(1.0);
                    for (i, p) in points.iter().enumerate() {
                        let wp = world.transform_point3(*p);
                        let t = (wp - ray.origin).dot(ray.dir);
                        if t <= 0.0 {
                            continue;
                        }
                        if (ray.at(t) - wp).length() <= threshold {
                            hits.push(Intersection {
                                node: id,
                                point: wp,
                                distance: t,
                                vertex: i,
                            });
                        }
                    }
                }
                NodeKind::Group | NodeKind::Lines(_) | NodeKind::Text { .. } => {}
            }
        }
        for child in &node.children {
            self.collect_hits(*child, world, ray, hits);
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|c| *c != id),
        }
    }
}

impl SceneGraph for HeadlessScene {
    fn add_node(&mut self, parent: Option<NodeId>, desc: NodeDesc) -> RenderResult<NodeId> {
        if let NodeKind::Mesh(geom) = &desc.kind {
            if let Some(idx) = &geom.indices {
                let n = geom.positions.len();
                if (0..idx.len()).any(|i| idx.get(i).is_some_and(|v| v >= n)) {
                    return Err(RenderError::InvalidGeometry(format!(
                        "index out of range in node '{}'",
                        desc.name
                    )));
                }
            }
        }
        let id = NodeId(self.next_id);
        match parent {
            Some(p) => self.get_mut(p)?.children.push(id),
            None => self.roots.push(id),
        }
        self.next_id += 1;
        self.resident_bytes += desc.kind.byte_len();
        self.nodes.insert(
            id,
            Node {
                desc,
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    fn remove_node(&mut self, id: NodeId) -> RenderResult<usize> {
        let parent = self.get(id)?.parent;
        self.detach(id, parent);
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.remove(&cur) {
                self.resident_bytes = self.resident_bytes.saturating_sub(node.desc.kind.byte_len());
                stack.extend(node.children);
                count += 1;
            }
        }
        log::trace!("released {count} scene nodes below {}", id.0);
        Ok(count)
    }

    fn children(&self, id: NodeId) -> RenderResult<Vec<NodeId>> {
        Ok(self.get(id)?.children.clone())
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) -> RenderResult<()> {
        self.get_mut(id)?.desc.visible = visible;
        Ok(())
    }

    fn set_material_color(&mut self, id: NodeId, color: Vec3) -> RenderResult<Vec3> {
        let material = &mut self.get_mut(id)?.desc.material;
        Ok(std::mem::replace(&mut material.color, color))
    }

    fn intersect(&self, ray: &Ray, root: Option<NodeId>) -> Vec<Intersection> {
        let mut hits = Vec::new();
        match root {
            Some(r) => {
                let parent_world = self
                    .nodes
                    .get(&r)
                    .and_then(|n| n.parent)
                    .map_or(Mat4::IDENTITY, |p| self.world_transform(p));
                self.collect_hits(r, parent_world, ray, &mut hits);
            }
            None => {
                for r in &self.roots {
                    self.collect_hits(*r, Mat4::IDENTITY, ray, &mut hits);
                }
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn render(&mut self, _camera: &Camera) -> RenderResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.size = (width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use histoscope_core::GeometryBuffer;

    use super::*;
    use crate::scene::Material;

    fn quad_node(name: &str) -> NodeDesc {
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        NodeDesc::new(
            name,
            NodeKind::Mesh(GeometryBuffer::from_positions(positions)),
            Material::flat(Vec3::ONE),
        )
    }

    #[test]
    fn test_remove_subtree() {
        let mut scene = HeadlessScene::default();
        let root = scene.add_node(None, NodeDesc::group("root")).unwrap();
        let a = scene.add_node(Some(root), quad_node("a")).unwrap();
        scene.add_node(Some(a), quad_node("b")).unwrap();
        assert_eq!(scene.node_count(), 3);
        // two quads of six positions
        assert_eq!(scene.resident_bytes(), 2 * 6 * 12);
        assert_eq!(scene.remove_node(root).unwrap(), 3);
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.resident_bytes(), 0);
        assert!(scene.remove_node(root).is_err());
    }

    #[test]
    fn test_intersect_ordering_and_transform() {
        let mut scene = HeadlessScene::default();
        let near = scene
            .add_node(
                None,
                quad_node("near").with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))),
            )
            .unwrap();
        let far = scene.add_node(None, quad_node("far")).unwrap();
        let ray = Ray::new(Vec3::new(0.5, 0.2, 10.0), -Vec3::Z);
        let hits = scene.intersect(&ray, None);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].point.z - 5.0).abs() < 1e-4);

        scene.set_visible(near, false).unwrap();
        let hits = scene.intersect(&ray, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, far);
    }

    #[test]
    fn test_subtree_query() {
        let mut scene = HeadlessScene::default();
        let group = scene
            .add_node(
                None,
                NodeDesc::group("g").with_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0))),
            )
            .unwrap();
        let inner = scene.add_node(Some(group), quad_node("inner")).unwrap();
        scene.add_node(None, quad_node("outer")).unwrap();
        let ray = Ray::new(Vec3::new(10.0, 0.0, 10.0), -Vec3::Z);
        let hits = scene.intersect(&ray, Some(inner));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, inner);
    }

    #[test]
    fn test_material_color_swap() {
        let mut scene = HeadlessScene::default();
        let id = scene.add_node(None, quad_node("q")).unwrap();
        let old = scene.set_material_color(id, Vec3::X).unwrap();
        assert_eq!(old, Vec3::ONE);
        assert_eq!(scene.node(id).unwrap().material.color, Vec3::X);
    }

    #[test]
    fn test_render_and_size() {
        let mut scene = HeadlessScene::default();
        scene.render(&Camera::default()).unwrap();
        assert_eq!(scene.frame_count(), 1);
        assert!(scene.set_size(0, 10).is_err());
        scene.set_size(640, 480).unwrap();
        assert_eq!(scene.size(), (640, 480));
    }
}
