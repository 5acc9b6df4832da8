//! Pointer interaction: drag-to-zoom on zoom planes, hover picking, wheel zoom and
//! double-click handling.
//!
//! The controller owns the zoom planes of the current draw and a side table from
//! scene nodes to their [`PickTable`]s. It never touches the scene itself; callers
//! act on the returned outcomes.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use histoscope_core::{AxisId, PickResult, Ray, ZoomPlane};
use histoscope_geometry::{DataSource, DrawScales, PickTable};
use histoscope_render::{NodeId, SceneGraph};

/// Primary mouse button code.
pub const PRIMARY_BUTTON: u8 = 0;
/// Button mask with only the primary button held.
pub const PRIMARY_ONLY: u8 = 1;

/// A pointer event in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub offset: Vec2,
    /// Button that changed state.
    pub button: u8,
    /// Mask of held buttons.
    pub buttons: u8,
}

impl PointerEvent {
    /// A primary-button event at `(x, y)`.
    #[must_use]
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            button: PRIMARY_BUTTON,
            buttons: PRIMARY_ONLY,
        }
    }

    /// A move with no button held.
    #[must_use]
    pub fn hover(x: f32, y: f32) -> Self {
        Self {
            offset: Vec2::new(x, y),
            button: PRIMARY_BUTTON,
            buttons: 0,
        }
    }
}

/// A wheel event; positive deltas scroll away from the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub offset: Vec2,
    /// 0 pixels, 1 lines, 2 pages.
    pub delta_mode: u32,
    pub delta: f32,
}

/// A zoom plane together with its scene node and current visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneEntry {
    pub plane: ZoomPlane,
    /// Mesh node of the plane, parent of the selection overlay.
    pub node: Option<NodeId>,
    pub visible: bool,
}

/// Range selection in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSelection {
    /// Index of the plane being dragged on.
    pub plane: usize,
    pub axis: AxisId,
    /// World-space press point.
    pub point1: Vec3,
    /// Latest world-space drag point.
    pub point2: Option<Vec3>,
}

/// Drag state of the zoom planes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSelection),
}

/// Result of a press, move, release or leave.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing for the caller to do.
    Ignored,
    /// A drag started; orbiting must stay suppressed until release.
    DragStarted { axis: AxisId },
    /// The selection overlay should span `[p1, p2]` along the axis.
    SelectionChanged { plane: usize, p1: f32, p2: f32 },
    /// The selection resolved into a zoom request.
    Zoom { axis: AxisId, min: f64, max: f64 },
    /// The selection was dropped without zooming.
    SelectionDiscarded { plane: usize },
    /// Hover state changed.
    Hover(HoverChange),
}

/// Hover transition.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverChange {
    /// Same bin as before; nothing to rebuild.
    Unchanged,
    /// Nothing is hovered any more.
    Cleared,
    /// A new bin is hovered.
    Picked { node: NodeId, result: PickResult },
}

/// What a double-click asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleClick {
    /// Reset the zoom of one axis.
    Unzoom(AxisId),
    /// Restore the default camera.
    ResetCamera,
}

/// Pointer interaction state for one scene.
#[derive(Debug, Default)]
pub struct PickingController {
    planes: Vec<PlaneEntry>,
    tables: HashMap<NodeId, PickTable>,
    state: DragState,
    orbit_active: bool,
    hovered: Option<HoverKey>,
}

/// What the hover debounce compares.
///
/// A histogram bin can span several band meshes, so it is keyed by bin alone.
/// Bins recolored in place own their node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverKey {
    Bin(usize),
    Node(NodeId),
}

impl PickingController {
    /// Creates a controller with no planes and no pick tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Marks the camera orbit control as active or idle.
    pub fn set_orbit_active(&mut self, active: bool) {
        self.orbit_active = active;
    }

    /// Whether the camera orbit control is active.
    #[must_use]
    pub fn orbit_active(&self) -> bool {
        self.orbit_active
    }

    /// Adds a zoom plane, returning its index.
    pub fn add_plane(&mut self, plane: ZoomPlane, node: Option<NodeId>) -> usize {
        self.planes.push(PlaneEntry {
            plane,
            node,
            visible: true,
        });
        self.planes.len() - 1
    }

    /// Plane entry by index.
    #[must_use]
    pub fn plane(&self, index: usize) -> Option<&PlaneEntry> {
        self.planes.get(index)
    }

    /// All plane entries.
    #[must_use]
    pub fn planes(&self) -> &[PlaneEntry] {
        &self.planes
    }

    /// Shows or hides a plane for hit testing.
    pub fn set_plane_visible(&mut self, index: usize, visible: bool) {
        if let Some(entry) = self.planes.get_mut(index) {
            entry.visible = visible;
        }
    }

    /// Registers the pick table of a content node.
    pub fn register(&mut self, node: NodeId, table: PickTable) {
        self.tables.insert(node, table);
    }

    /// Pick table of a node.
    #[must_use]
    pub fn table(&self, node: NodeId) -> Option<&PickTable> {
        self.tables.get(&node)
    }

    /// Number of registered pick tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Drops planes, pick tables, hover and drag state.
    pub fn clear(&mut self) {
        self.planes.clear();
        self.tables.clear();
        self.state = DragState::Idle;
        self.hovered = None;
    }

    /// Nearest visible plane hit by `ray`.
    #[must_use]
    pub fn hit_plane(&self, ray: &Ray) -> Option<(usize, Vec3)> {
        self.planes
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible)
            .filter_map(|(i, e)| e.plane.intersect(ray).map(|p| (i, p)))
            .min_by(|a, b| {
                let da = (a.1 - ray.origin).length_squared();
                let db = (b.1 - ray.origin).length_squared();
                da.total_cmp(&db)
            })
    }

    /// Pointer press. Starts a drag when the primary button alone goes down over a
    /// zoom plane.
    pub fn press(&mut self, ray: &Ray, event: &PointerEvent) -> PointerOutcome {
        if self.orbit_active || self.is_dragging() {
            return PointerOutcome::Ignored;
        }
        if event.button != PRIMARY_BUTTON || event.buttons != PRIMARY_ONLY {
            return PointerOutcome::Ignored;
        }
        let Some((index, point)) = self.hit_plane(ray) else {
            return PointerOutcome::Ignored;
        };
        let axis = self.planes[index].plane.axis();
        self.state = DragState::Dragging(DragSelection {
            plane: index,
            axis,
            point1: point,
            point2: None,
        });
        log::debug!("zoom drag started on {} at {point}", axis.name());
        PointerOutcome::DragStarted { axis }
    }

    /// Pointer move while dragging: re-intersects the dragged plane only.
    pub fn drag(&mut self, ray: &Ray) -> PointerOutcome {
        if self.orbit_active {
            return PointerOutcome::Ignored;
        }
        let DragState::Dragging(mut selection) = self.state else {
            return PointerOutcome::Ignored;
        };
        let Some(entry) = self.planes.get(selection.plane) else {
            self.state = DragState::Idle;
            return PointerOutcome::Ignored;
        };
        let Some(point) = entry.plane.drag_point(ray) else {
            return PointerOutcome::Ignored;
        };
        selection.point2 = Some(point);
        self.state = DragState::Dragging(selection);
        let i = selection.axis.index();
        PointerOutcome::SelectionChanged {
            plane: selection.plane,
            p1: selection.point1[i],
            p2: point[i],
        }
    }

    /// Pointer release: converts the selection into a zoom range on the dragged
    /// axis, or discards it. Always returns to idle.
    pub fn release(&mut self, scales: &DrawScales) -> PointerOutcome {
        let DragState::Dragging(selection) = std::mem::take(&mut self.state) else {
            return PointerOutcome::Ignored;
        };
        let discarded = PointerOutcome::SelectionDiscarded {
            plane: selection.plane,
        };
        let (Some(point2), Some(entry)) = (selection.point2, self.planes.get(selection.plane)) else {
            return discarded;
        };
        let mut f1 = entry.plane.fraction_of(selection.point1);
        let mut f2 = entry.plane.fraction_of(point2);
        if f1 > f2 {
            std::mem::swap(&mut f1, &mut f2);
        }
        if f1 == f2 {
            return discarded;
        }
        let scale = scales.axis(selection.axis);
        let (min, max) = (scale.from_fraction(f1), scale.from_fraction(f2));
        if min < max {
            log::debug!("zoom selection on {}: [{min}, {max}]", selection.axis.name());
            PointerOutcome::Zoom {
                axis: selection.axis,
                min,
                max,
            }
        } else {
            discarded
        }
    }

    /// Pointer left the surface: cancels a drag without zooming and clears hover.
    pub fn leave(&mut self) -> PointerOutcome {
        self.hovered = None;
        match std::mem::take(&mut self.state) {
            DragState::Dragging(selection) => PointerOutcome::SelectionDiscarded {
                plane: selection.plane,
            },
            DragState::Idle => PointerOutcome::Hover(HoverChange::Cleared),
        }
    }

    /// Resolves the nearest pickable content hit and reports whether the hovered
    /// bin changed.
    pub fn hover(
        &mut self,
        ray: &Ray,
        scene: &dyn SceneGraph,
        root: Option<NodeId>,
        source: &DataSource,
        scales: &DrawScales,
    ) -> HoverChange {
        if self.orbit_active || self.is_dragging() {
            return HoverChange::Unchanged;
        }
        let picked = scene.intersect(ray, root).into_iter().find_map(|hit| {
            let table = self.tables.get(&hit.node)?;
            table
                .resolve(hit.vertex, source, scales)
                .map(|result| (hit.node, result))
        });
        match picked {
            Some((node, result)) => {
                let key = if result.use_itself {
                    HoverKey::Node(node)
                } else {
                    HoverKey::Bin(result.bin_id)
                };
                if self.hovered == Some(key) {
                    HoverChange::Unchanged
                } else {
                    self.hovered = Some(key);
                    HoverChange::Picked { node, result }
                }
            }
            None => {
                if self.hovered.take().is_some() {
                    HoverChange::Cleared
                } else {
                    HoverChange::Unchanged
                }
            }
        }
    }

    /// Wheel over a zoom plane: the new zoom window of that axis. Ignored while a
    /// render is pending or a drag is active.
    pub fn wheel(
        &self,
        ray: &Ray,
        event: &WheelEvent,
        scales: &DrawScales,
        render_pending: bool,
    ) -> Option<(AxisId, f64, f64)> {
        if render_pending || self.is_dragging() || event.delta == 0.0 {
            return None;
        }
        let (index, point) = self.hit_plane(ray)?;
        let plane = &self.planes[index].plane;
        let fraction = plane.fraction_of(point);
        let (min, max) = scales
            .axis(plane.axis())
            .wheel_zoom(fraction, event.delta > 0.0)?;
        Some((plane.axis(), min, max))
    }

    /// Double-click: unzoom the axis under the pointer, or reset the camera.
    #[must_use]
    pub fn double_click(&self, ray: &Ray) -> DoubleClick {
        match self.hit_plane(ray) {
            Some((index, _)) => DoubleClick::Unzoom(self.planes[index].plane.axis()),
            None => DoubleClick::ResetCamera,
        }
    }
}
