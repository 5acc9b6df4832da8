//! Scene construction, teardown, render scheduling and pointer dispatch.

use glam::Vec2;
use histoscope_core::{
    AxisId, GeometryBuffer, HistoscopeError, MonospaceMeasure, Ray, RenderConfig, Result,
    TextMeasure, TIP_GREEN,
};
use histoscope_geometry::axes::zoom_plane_node;
use histoscope_geometry::scales::{edge_value, visible_bins};
use histoscope_geometry::{
    build_axes, build_plot, highlight_box, quadrant, tip_bounds, AxisRole, DataSource, DrawScales,
    Primitive, ZoomWindows,
};
use histoscope_render::{
    Camera, ColorMapPalette, LevelPalette, Material, NodeDesc, NodeId, NodeKind, SceneGraph,
};

use crate::picking::{
    DoubleClick, HoverChange, PickingController, PointerEvent, PointerOutcome, WheelEvent,
};
use crate::scheduler::{Clock, DeferredRender, RenderRequest, SystemClock};

/// Surfaces smaller than this in either direction are not resized to.
pub const MIN_SURFACE_SIZE: u32 = 10;

type ZoomListener = Box<dyn FnMut(AxisId, f64, f64)>;

/// A decoration container added to the scene.
#[derive(Debug, Clone, Copy)]
struct AxisNode {
    node: NodeId,
    role: AxisRole,
    plane: Option<usize>,
}

/// What the hover highlight currently changed in the scene.
#[derive(Debug, Clone, Copy, Default)]
enum Highlight {
    #[default]
    None,
    /// A separate box node.
    Box(NodeId),
    /// A content node recolored in place.
    Recolor { node: NodeId, previous: glam::Vec3 },
}

/// Owns one interactive plot in a scene graph.
///
/// Every draw discards the previous subtree and all pick tables before building
/// new geometry, so nodes of two draws never coexist.
pub struct SceneLifecycle<S: SceneGraph, C: Clock = SystemClock> {
    scene: S,
    clock: C,
    config: RenderConfig,
    palette: Box<dyn LevelPalette>,
    measure: Box<dyn TextMeasure>,
    camera: Camera,
    size: (u32, u32),
    source: Option<DataSource>,
    zoom: ZoomWindows,
    scales: Option<DrawScales>,
    root: Option<NodeId>,
    content: Option<NodeId>,
    axis_nodes: Vec<AxisNode>,
    picking: PickingController,
    render: DeferredRender,
    first_render_ms: Option<u64>,
    highlight_enabled: bool,
    highlight: Highlight,
    selection: Option<NodeId>,
    on_zoom: Option<ZoomListener>,
}

impl<S: SceneGraph, C: Clock> std::fmt::Debug for SceneLifecycle<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneLifecycle")
            .field("size", &self.size)
            .field("source", &self.source)
            .field("zoom", &self.zoom)
            .field("root", &self.root)
            .field("render_pending", &self.render.is_pending())
            .field("highlight_enabled", &self.highlight_enabled)
            .finish_non_exhaustive()
    }
}

impl<S: SceneGraph, C: Clock> SceneLifecycle<S, C> {
    /// Creates a lifecycle drawing into `scene` with a `width` x `height` surface.
    pub fn new(scene: S, clock: C, config: RenderConfig, width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let camera = Camera::for_extent(config.extent as f32, aspect);
        Self {
            scene,
            clock,
            config,
            palette: Box::new(ColorMapPalette::default()),
            measure: Box::new(MonospaceMeasure::default()),
            camera,
            size: (width, height),
            source: None,
            zoom: [None; 3],
            scales: None,
            root: None,
            content: None,
            axis_nodes: Vec::new(),
            picking: PickingController::new(),
            render: DeferredRender::new(),
            first_render_ms: None,
            highlight_enabled: false,
            highlight: Highlight::None,
            selection: None,
            on_zoom: None,
        }
    }

    /// Replaces the level palette.
    #[must_use]
    pub fn with_palette(mut self, palette: impl LevelPalette + 'static) -> Self {
        self.palette = Box::new(palette);
        self
    }

    /// Replaces the label measurement.
    #[must_use]
    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Calls `listener` with every applied zoom range.
    pub fn set_zoom_listener(&mut self, listener: impl FnMut(AxisId, f64, f64) + 'static) {
        self.on_zoom = Some(Box::new(listener));
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn picking(&self) -> &PickingController {
        &self.picking
    }

    /// Scales of the current draw.
    pub fn scales(&self) -> Option<&DrawScales> {
        self.scales.as_ref()
    }

    /// Current zoom window per axis.
    pub fn zoom_windows(&self) -> &ZoomWindows {
        &self.zoom
    }

    /// Top node of the current draw.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Group holding the content geometry of the current draw.
    pub fn content(&self) -> Option<NodeId> {
        self.content
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Whether a deferred render is waiting.
    pub fn render_pending(&self) -> bool {
        self.render.is_pending()
    }

    /// Duration of the first render, once it happened.
    pub fn first_render_ms(&self) -> Option<u64> {
        self.first_render_ms
    }

    /// Whether hover highlighting is rebuilt.
    pub fn highlight_enabled(&self) -> bool {
        self.highlight_enabled
    }

    /// Node of the drag selection overlay.
    pub fn selection_node(&self) -> Option<NodeId> {
        self.selection
    }

    /// Node showing the hover highlight box.
    pub fn highlight_node(&self) -> Option<NodeId> {
        match self.highlight {
            Highlight::Box(node) => Some(node),
            Highlight::None | Highlight::Recolor { .. } => None,
        }
    }

    /// Sets new data and redraws.
    pub fn set_source(&mut self, source: DataSource) -> Result<()> {
        self.source = Some(source);
        self.draw()
    }

    /// Sets a new configuration and redraws.
    pub fn set_config(&mut self, config: RenderConfig) -> Result<()> {
        self.config = config;
        self.draw()
    }

    /// Rebuilds the whole scene subtree from the current source.
    pub fn draw(&mut self) -> Result<()> {
        self.clear_content()?;
        let Some(source) = &self.source else {
            return Ok(());
        };
        let (scales, output) = build_plot(source, &self.config, &self.zoom, self.palette.as_ref())?;
        let with_y = source.grid().map_or(true, |grid| grid.dimension() != 1);
        let axes = build_axes(&scales, &self.config, self.measure.as_ref(), with_y);

        let root = self.scene.add_node(None, NodeDesc::group("histoscope"))?;
        self.root = Some(root);
        for element in axes.elements {
            let container = self.scene.add_node(Some(root), element.container)?;
            for child in element.children {
                self.scene.add_node(Some(container), child)?;
            }
            let plane = match element.zoom {
                Some(plane) => {
                    let node = self.scene.add_node(Some(container), zoom_plane_node(&plane))?;
                    Some(self.picking.add_plane(plane, Some(node)))
                }
                None => None,
            };
            self.axis_nodes.push(AxisNode {
                node: container,
                role: element.role,
                plane,
            });
        }

        let content = self.scene.add_node(Some(root), NodeDesc::group("content"))?;
        self.content = Some(content);
        let count = output.primitives.len();
        for Primitive {
            name,
            kind,
            material,
            pick,
        } in output.primitives
        {
            let node = self
                .scene
                .add_node(Some(content), NodeDesc::new(name, kind, material))?;
            if let Some(table) = pick {
                self.picking.register(node, table);
            }
        }
        log::info!(
            "drew {source:?}: {count} content nodes, {} axis containers, {} zoom planes",
            self.axis_nodes.len(),
            self.picking.planes().len()
        );
        self.scales = Some(scales);
        self.request_render(output.render_delay_ms)
    }

    /// Disposes the scene subtree and every pick table, and cancels a pending
    /// render. Returns the number of released nodes.
    pub fn teardown(&mut self) -> Result<usize> {
        let released = self.clear_content()?;
        if self.render.cancel() {
            log::debug!("pending render cancelled");
        }
        log::info!("scene torn down, {released} nodes released");
        Ok(released)
    }

    fn clear_content(&mut self) -> Result<usize> {
        self.highlight = Highlight::None;
        self.selection = None;
        self.picking.clear();
        self.axis_nodes.clear();
        self.content = None;
        self.scales = None;
        match self.root.take() {
            Some(root) => Ok(self.scene.remove_node(root)?),
            None => Ok(0),
        }
    }

    /// Requests a render after `delay_ms`, or the configured default delay.
    ///
    /// A zero delay renders at once and cancels a pending request; otherwise
    /// requests made while one is pending are dropped.
    pub fn request_render(&mut self, delay_ms: Option<u64>) -> Result<()> {
        let delay = delay_ms.unwrap_or(self.config.render_delay_ms);
        match self.render.request(self.clock.now_ms(), delay) {
            RenderRequest::Immediate => self.render_now(),
            RenderRequest::Scheduled { due_ms } => {
                log::debug!("render scheduled at {due_ms} ms");
                Ok(())
            }
            RenderRequest::Coalesced => Ok(()),
        }
    }

    /// Runs the pending render when it is due. Returns whether it rendered.
    pub fn poll(&mut self) -> Result<bool> {
        if self.render.take_due(self.clock.now_ms()) {
            self.render_now()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Renders one frame right away.
    pub fn render_now(&mut self) -> Result<()> {
        self.render.cancel();
        self.apply_axis_visibility()?;
        let start = self.clock.now_ms();
        self.scene.render(&self.camera)?;
        let elapsed = self.clock.now_ms().saturating_sub(start);
        if self.first_render_ms.is_none() {
            self.first_render_ms = Some(elapsed);
            self.highlight_enabled = elapsed < self.config.highlight_latency_ms;
            log::info!(
                "first render took {elapsed} ms, hover highlight {}",
                if self.highlight_enabled { "enabled" } else { "disabled" }
            );
        }
        Ok(())
    }

    fn apply_axis_visibility(&mut self) -> Result<()> {
        let q = quadrant(self.camera.position);
        for axis_node in &self.axis_nodes {
            let visible = axis_node
                .role
                .is_visible(q, self.config.front_box, self.config.back_box);
            self.scene.set_visible(axis_node.node, visible)?;
            if let Some(plane) = axis_node.plane {
                self.picking.set_plane_visible(plane, visible);
            }
        }
        Ok(())
    }

    /// Resizes the surface. Unchanged or tiny sizes are ignored; returns whether
    /// the size was applied.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<bool> {
        if (width, height) == self.size || width < MIN_SURFACE_SIZE || height < MIN_SURFACE_SIZE {
            return Ok(false);
        }
        self.size = (width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.scene.set_size(width, height)?;
        self.request_render(None)?;
        Ok(true)
    }

    fn is_1d(&self) -> bool {
        self.source
            .as_ref()
            .and_then(DataSource::grid)
            .is_some_and(|grid| grid.dimension() == 1)
    }

    /// Zoom window slot used by `axis`. 1D data zooms its value axis through the
    /// y slot when it maps values onto the second axis.
    fn zoom_slot(&self, axis: AxisId) -> usize {
        if axis == AxisId::Z && self.is_1d() && self.config.use_second_axis_for_third_dimension {
            AxisId::Y.index()
        } else {
            axis.index()
        }
    }

    /// Zooms `axis` to `[min, max]` and redraws.
    pub fn zoom(&mut self, axis: AxisId, min: f64, max: f64) -> Result<()> {
        if min.partial_cmp(&max) != Some(std::cmp::Ordering::Less) {
            return Err(HistoscopeError::InvalidZoom {
                axis: axis.name(),
                min,
                max,
            });
        }
        let slot = self.zoom_slot(axis);
        self.zoom[slot] = Some((min, max));
        log::info!("zoom {} to [{min}, {max}]", axis.name());
        if let Some(listener) = self.on_zoom.as_mut() {
            listener(axis, min, max);
        }
        self.draw()
    }

    /// Drops the zoom of `axis`. Returns whether it was zoomed.
    pub fn unzoom(&mut self, axis: AxisId) -> Result<bool> {
        let slot = self.zoom_slot(axis);
        if self.zoom[slot].take().is_none() {
            return Ok(false);
        }
        log::info!("unzoom {}", axis.name());
        self.draw()?;
        Ok(true)
    }

    /// Whether zooming a grid axis to `[min, max]` keeps more than one bin.
    ///
    /// Value axes are continuous and can always be zoomed.
    pub fn can_zoom_in(&self, axis: AxisId, min: f64, max: f64) -> bool {
        let Some(grid) = self.source.as_ref().and_then(DataSource::grid) else {
            return false;
        };
        if axis.index() >= grid.dimension() {
            return true;
        }
        let n = grid.dims()[axis.index()];
        (0..n)
            .filter(|&i| grid.bin_edge(axis, i + 1) > min && grid.bin_edge(axis, i) < max)
            .nth(1)
            .is_some()
    }

    /// Shrinks the zoom of every grid axis to the bins whose content exceeds the
    /// smallest visible content. Returns whether any zoom changed.
    pub fn auto_zoom(&mut self) -> Result<bool> {
        let (Some(grid), Some(scales)) = (self.source.as_ref().and_then(DataSource::grid), &self.scales) else {
            return Ok(false);
        };
        let dimension = grid.dimension();
        let dims = grid.dims();
        let mut ranges = [(0, 1); 3];
        for axis in AxisId::ALL {
            let a = axis.index();
            ranges[a] = if a < dimension {
                visible_bins(grid, axis, scales.axis(axis))
            } else {
                (0, dims[a])
            };
        }

        let visible = || {
            (ranges[0].0..ranges[0].1).flat_map(move |i| {
                (ranges[1].0..ranges[1].1)
                    .flat_map(move |j| (ranges[2].0..ranges[2].1).map(move |k| (i, j, k)))
            })
        };
        let min = visible()
            .map(|(i, j, k)| grid.content(i, j, k))
            .fold(f64::INFINITY, f64::min);
        let mut lo = [usize::MAX; 3];
        let mut hi = [0; 3];
        for (i, j, k) in visible() {
            if grid.content(i, j, k) > min {
                for (a, index) in [i, j, k].into_iter().enumerate() {
                    lo[a] = lo[a].min(index);
                    hi[a] = hi[a].max(index + 1);
                }
            }
        }
        if lo[0] == usize::MAX {
            return Ok(false);
        }

        let mut windows = self.zoom;
        let mut changed = false;
        for axis in AxisId::ALL.into_iter().take(dimension) {
            let a = axis.index();
            let (first, last) = ranges[a];
            let (mut l, mut h) = (lo[a], hi[a]);
            if h - l == 1 {
                l = l.saturating_sub(1).max(first);
                h = (h + 1).min(last);
            }
            if l > first || h < last {
                let scale = scales.axis(axis);
                windows[a] = Some((edge_value(grid, axis, scale, l), edge_value(grid, axis, scale, h)));
                changed = true;
            }
        }
        if changed {
            log::info!("auto zoom to {windows:?}");
            self.zoom = windows;
            self.draw()?;
        }
        Ok(changed)
    }

    fn ray_at(&self, offset: Vec2) -> Option<Ray> {
        self.camera.screen_ray(offset, self.size.0, self.size.1)
    }

    /// Marks the external orbit control as active or idle.
    pub fn set_orbit_active(&mut self, active: bool) {
        self.picking.set_orbit_active(active);
    }

    /// Orbits the camera unless a zoom drag holds the pointer.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) -> Result<bool> {
        if self.picking.is_dragging() {
            return Ok(false);
        }
        self.camera.orbit(delta_x, delta_y);
        self.request_render(Some(0))?;
        Ok(true)
    }

    /// Pointer press. Returns true when a zoom drag started, in which case the
    /// orbit control must not react to this press.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        let Some(ray) = self.ray_at(event.offset) else {
            return false;
        };
        matches!(self.picking.press(&ray, event), PointerOutcome::DragStarted { .. })
    }

    /// Pointer move: extends a drag selection or hover-picks content.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Result<PointerOutcome> {
        let Some(ray) = self.ray_at(event.offset) else {
            return Ok(PointerOutcome::Ignored);
        };
        if self.picking.is_dragging() {
            let outcome = self.picking.drag(&ray);
            if let PointerOutcome::SelectionChanged { plane, p1, p2 } = outcome {
                self.show_selection(plane, p1, p2)?;
            }
            return Ok(outcome);
        }
        let (Some(source), Some(scales)) = (&self.source, &self.scales) else {
            return Ok(PointerOutcome::Ignored);
        };
        let change = self
            .picking
            .hover(&ray, &self.scene, self.content, source, scales);
        self.apply_hover(&change)?;
        Ok(PointerOutcome::Hover(change))
    }

    /// Pointer release: applies a completed drag selection as a zoom.
    pub fn pointer_up(&mut self, _event: &PointerEvent) -> Result<PointerOutcome> {
        let outcome = match &self.scales {
            Some(scales) => self.picking.release(scales),
            None => self.picking.leave(),
        };
        self.clear_selection()?;
        if let PointerOutcome::Zoom { axis, min, max } = outcome {
            self.zoom(axis, min, max)?;
        }
        Ok(outcome)
    }

    /// Pointer left the surface: drops a drag and the hover highlight.
    pub fn pointer_leave(&mut self) -> Result<()> {
        self.picking.leave();
        let had_selection = self.clear_selection()?;
        let had_highlight = self.clear_highlight()?;
        if had_selection || had_highlight {
            self.request_render(None)?;
        }
        Ok(())
    }

    /// Wheel over a zoom plane zooms that axis. Returns whether it zoomed.
    pub fn wheel(&mut self, event: &WheelEvent) -> Result<bool> {
        let Some(ray) = self.ray_at(event.offset) else {
            return Ok(false);
        };
        let Some(scales) = &self.scales else {
            return Ok(false);
        };
        match self
            .picking
            .wheel(&ray, event, scales, self.render.is_pending())
        {
            Some((axis, min, max)) => {
                self.zoom(axis, min, max)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Double-click: unzooms the axis under the pointer or resets the camera.
    pub fn double_click(&mut self, event: &PointerEvent) -> Result<DoubleClick> {
        let action = self
            .ray_at(event.offset)
            .map_or(DoubleClick::ResetCamera, |ray| self.picking.double_click(&ray));
        match action {
            DoubleClick::Unzoom(axis) => {
                self.unzoom(axis)?;
            }
            DoubleClick::ResetCamera => {
                self.camera.reset(self.config.extent as f32);
                self.request_render(Some(0))?;
            }
        }
        Ok(action)
    }

    fn show_selection(&mut self, plane: usize, p1: f32, p2: f32) -> Result<()> {
        self.clear_selection()?;
        let (Some(root), Some(entry)) = (self.root, self.picking.plane(plane)) else {
            return Ok(());
        };
        let triangles = entry.plane.selection_triangles(p1.min(p2), p1.max(p2));
        let desc = NodeDesc::new(
            "zoom_selection",
            NodeKind::Mesh(GeometryBuffer::from_positions(triangles)),
            Material::flat(TIP_GREEN),
        )
        .with_pickable(false);
        self.selection = Some(self.scene.add_node(Some(root), desc)?);
        self.request_render(None)
    }

    fn clear_selection(&mut self) -> Result<bool> {
        match self.selection.take() {
            Some(node) => {
                self.scene.remove_node(node)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear_highlight(&mut self) -> Result<bool> {
        match std::mem::take(&mut self.highlight) {
            Highlight::None => Ok(false),
            Highlight::Box(node) => {
                self.scene.remove_node(node)?;
                Ok(true)
            }
            Highlight::Recolor { node, previous } => {
                self.scene.set_material_color(node, previous)?;
                Ok(true)
            }
        }
    }

    fn apply_hover(&mut self, change: &HoverChange) -> Result<()> {
        match change {
            HoverChange::Unchanged => Ok(()),
            HoverChange::Cleared => {
                if self.clear_highlight()? {
                    self.request_render(None)?;
                }
                Ok(())
            }
            HoverChange::Picked { node, result } => {
                self.clear_highlight()?;
                if !self.highlight_enabled {
                    return Ok(());
                }
                if result.use_itself {
                    let previous = self.scene.set_material_color(*node, result.color)?;
                    self.highlight = Highlight::Recolor {
                        node: *node,
                        previous,
                    };
                } else if let Some(root) = self.root {
                    let bounds = tip_bounds(result, self.config.extent as f32);
                    let Primitive {
                        name,
                        kind,
                        material,
                        ..
                    } = highlight_box(&bounds, result.color);
                    let desc = NodeDesc::new(name, kind, material).with_pickable(false);
                    self.highlight = Highlight::Box(self.scene.add_node(Some(root), desc)?);
                }
                self.request_render(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use histoscope_core::HistogramGrid;
    use histoscope_render::HeadlessScene;

    use super::*;
    use crate::scheduler::ManualClock;

    fn lifecycle(clock: ManualClock) -> SceneLifecycle<HeadlessScene, ManualClock> {
        SceneLifecycle::new(HeadlessScene::new(800, 600), clock, RenderConfig::default(), 800, 600)
    }

    fn grid_1d() -> DataSource {
        DataSource::Histogram(Box::new(
            HistogramGrid::new_1d(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![0.0, 3.0, 5.0, 0.0]).unwrap(),
        ))
    }

    #[test]
    fn test_resize_ignores_unchanged_and_tiny() {
        let mut plot = lifecycle(ManualClock::new());
        assert!(!plot.resize(800, 600).unwrap());
        assert!(!plot.resize(9, 600).unwrap());
        assert!(plot.resize(400, 400).unwrap());
        assert_eq!(plot.scene().size(), (400, 400));
        assert!((plot.camera().aspect_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        let mut plot = lifecycle(ManualClock::new());
        plot.set_source(grid_1d()).unwrap();
        assert!(matches!(
            plot.zoom(AxisId::X, 2.0, 2.0),
            Err(HistoscopeError::InvalidZoom { axis: 'x', .. })
        ));
    }

    #[test]
    fn test_value_zoom_of_1d_uses_second_slot() {
        let config = RenderConfig {
            use_second_axis_for_third_dimension: true,
            ..RenderConfig::default()
        };
        let mut plot = SceneLifecycle::new(HeadlessScene::new(800, 600), ManualClock::new(), config, 800, 600);
        plot.set_source(grid_1d()).unwrap();
        plot.zoom(AxisId::Z, 1.0, 4.0).unwrap();
        assert_eq!(plot.zoom_windows()[1], Some((1.0, 4.0)));
        assert_eq!(plot.zoom_windows()[2], None);
        assert_eq!(plot.scales().unwrap().z.domain(), (1.0, 4.0));
        assert!(plot.unzoom(AxisId::Z).unwrap());
        assert!(!plot.unzoom(AxisId::Z).unwrap());
    }

    #[test]
    fn test_can_zoom_in() {
        let mut plot = lifecycle(ManualClock::new());
        plot.set_source(grid_1d()).unwrap();
        assert!(plot.can_zoom_in(AxisId::X, 0.5, 2.5));
        assert!(!plot.can_zoom_in(AxisId::X, 1.2, 1.8));
        assert!(plot.can_zoom_in(AxisId::Z, 0.0, 0.1));
    }

    #[test]
    fn test_auto_zoom_shrinks_to_filled_bins() {
        let mut plot = lifecycle(ManualClock::new());
        plot.set_source(grid_1d()).unwrap();
        assert!(plot.auto_zoom().unwrap());
        assert_eq!(plot.zoom_windows()[0], Some((1.0, 3.0)));
        assert!(!plot.auto_zoom().unwrap());
    }

    #[test]
    fn test_slow_first_render_disables_highlight() {
        let mut plot = lifecycle(ManualClock::with_step(2000));
        plot.set_source(grid_1d()).unwrap();
        plot.render_now().unwrap();
        assert_eq!(plot.first_render_ms(), Some(2000));
        assert!(!plot.highlight_enabled());
    }

    #[test]
    fn test_fast_first_render_enables_highlight() {
        let mut plot = lifecycle(ManualClock::new());
        plot.set_source(grid_1d()).unwrap();
        plot.render_now().unwrap();
        assert_eq!(plot.first_render_ms(), Some(0));
        assert!(plot.highlight_enabled());
    }
}
