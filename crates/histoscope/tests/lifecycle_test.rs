//! End-to-end tests driving `SceneLifecycle` against the headless scene.
//!
//! Pointer positions are found by projecting world points on the zoom planes and
//! bin tops through the lifecycle's own camera.

use std::cell::RefCell;
use std::rc::Rc;

use histoscope::*;
use histoscope_render::NodeKind;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

type Plot = SceneLifecycle<HeadlessScene, ManualClock>;

fn plot_with(config: RenderConfig, clock: &ManualClock) -> Plot {
    SceneLifecycle::new(HeadlessScene::new(WIDTH, HEIGHT), clock.clone(), config, WIDTH, HEIGHT)
}

/// 4 x 2 bins over `[0, 10] x [0, 10]`.
fn wide_grid() -> DataSource {
    let grid = HistogramGrid::new_2d(
        vec![0.0, 2.5, 5.0, 7.5, 10.0],
        vec![0.0, 5.0, 10.0],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    )
    .unwrap();
    DataSource::Histogram(Box::new(grid))
}

/// The `[[1, 2, 3, 4], [5, 6, 7, 8], ...]` grid over `[0, 4] x [0, 4]`.
fn grid4x4() -> DataSource {
    let rows: Vec<Vec<f64>> = (0..4)
        .map(|j| (1..=4).map(|i| f64::from(i + 4 * j)).collect())
        .collect();
    DataSource::Histogram(Box::new(
        HistogramGrid::from_rows((0.0, 4.0), (0.0, 4.0), &rows).unwrap(),
    ))
}

fn visible_plane(plot: &Plot, axis: AxisId) -> usize {
    plot.picking()
        .planes()
        .iter()
        .position(|e| e.visible && e.plane.axis() == axis)
        .expect("no visible zoom plane")
}

/// Pixel over the x zoom plane at draw coordinate `draw_x`.
fn x_plane_pixel(plot: &Plot, plane: usize, draw_x: f32) -> Vec2 {
    let v = plot.picking().plane(plane).unwrap().plane.world_vertices();
    let mut point = (v[0] + v[3]) * 0.5;
    point.x = draw_x;
    plot.camera().project(point, WIDTH, HEIGHT).unwrap()
}

fn zoom_recorder(plot: &mut Plot) -> Rc<RefCell<Vec<(AxisId, f64, f64)>>> {
    let zooms = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&zooms);
    plot.set_zoom_listener(move |axis, min, max| sink.borrow_mut().push((axis, min, max)));
    zooms
}

#[test]
fn test_drag_on_x_plane_zooms_range() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    plot.render_now().unwrap();
    let zooms = zoom_recorder(&mut plot);

    let plane = visible_plane(&plot, AxisId::X);
    // data 2.0 and 5.0 on [0, 10] mapped to [-100, 100]
    let start = x_plane_pixel(&plot, plane, -60.0);
    let end = x_plane_pixel(&plot, plane, 0.0);

    assert!(plot.pointer_down(&PointerEvent::primary(start.x, start.y)));
    let moved = plot.pointer_move(&PointerEvent::primary(end.x, end.y)).unwrap();
    assert!(matches!(moved, PointerOutcome::SelectionChanged { .. }));
    assert!(plot.selection_node().is_some());

    let released = plot.pointer_up(&PointerEvent::primary(end.x, end.y)).unwrap();
    assert!(matches!(released, PointerOutcome::Zoom { axis: AxisId::X, .. }));

    let zooms = zooms.borrow();
    assert_eq!(zooms.len(), 1);
    let (axis, min, max) = zooms[0];
    assert_eq!(axis, AxisId::X);
    assert!((min - 2.0).abs() < 1e-2, "min {min}");
    assert!((max - 5.0).abs() < 1e-2, "max {max}");
    assert!(plot.zoom_windows()[0].is_some());
    assert!(plot.selection_node().is_none());
    assert!(!plot.picking().is_dragging());
}

#[test]
fn test_click_without_drag_does_not_zoom() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    plot.render_now().unwrap();
    let zooms = zoom_recorder(&mut plot);

    let plane = visible_plane(&plot, AxisId::X);
    let at = x_plane_pixel(&plot, plane, 20.0);
    assert!(plot.pointer_down(&PointerEvent::primary(at.x, at.y)));
    plot.pointer_move(&PointerEvent::primary(at.x, at.y)).unwrap();
    let released = plot.pointer_up(&PointerEvent::primary(at.x, at.y)).unwrap();

    assert!(matches!(released, PointerOutcome::SelectionDiscarded { .. }));
    assert!(zooms.borrow().is_empty());
    assert_eq!(plot.zoom_windows(), &[None; 3]);
}

#[test]
fn test_orbit_blocks_drag_and_drag_blocks_orbit() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    plot.render_now().unwrap();
    let plane = visible_plane(&plot, AxisId::X);
    let at = x_plane_pixel(&plot, plane, 0.0);

    plot.set_orbit_active(true);
    assert!(!plot.pointer_down(&PointerEvent::primary(at.x, at.y)));
    plot.set_orbit_active(false);

    assert!(plot.pointer_down(&PointerEvent::primary(at.x, at.y)));
    let before = plot.camera().position;
    assert!(!plot.orbit(0.3, 0.0).unwrap());
    assert_eq!(plot.camera().position, before);

    plot.pointer_leave().unwrap();
    assert!(!plot.picking().is_dragging());
    assert!(plot.orbit(0.3, 0.0).unwrap());
    assert_ne!(plot.camera().position, before);
}

#[test]
fn test_box_style_on_4x4_grid() {
    let clock = ManualClock::new();
    let config = RenderConfig {
        plot_style: PlotStyle::Box,
        level_count: 1,
        ..RenderConfig::default()
    };
    let mut plot = plot_with(config, &clock);
    plot.set_source(grid4x4()).unwrap();

    let content = plot.content().unwrap();
    let meshes: Vec<_> = plot
        .scene()
        .children(content)
        .unwrap()
        .into_iter()
        .filter_map(|id| match &plot.scene().node(id)?.kind {
            NodeKind::Mesh(buffer) => Some(buffer.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].triangle_count(), 192);
    let mut bins = meshes[0].bin_index_per_group.clone();
    bins.sort_unstable();
    bins.dedup();
    assert_eq!(bins, (0..16).collect::<Vec<_>>());
    assert_eq!(plot.picking().table_count(), 1);
}

#[test]
fn test_render_requests_coalesce() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(grid4x4()).unwrap();
    assert!(plot.render_pending());
    assert_eq!(plot.scene().frame_count(), 0);

    plot.request_render(Some(5)).unwrap();
    plot.request_render(None).unwrap();
    clock.advance(4);
    assert!(!plot.poll().unwrap());
    clock.advance(1);
    assert!(plot.poll().unwrap());
    assert_eq!(plot.scene().frame_count(), 1);
    assert!(!plot.poll().unwrap());

    plot.request_render(Some(100)).unwrap();
    plot.request_render(Some(0)).unwrap();
    assert_eq!(plot.scene().frame_count(), 2);
    assert!(!plot.render_pending());
    clock.advance(200);
    assert!(!plot.poll().unwrap());
}

#[test]
fn test_teardown_releases_everything() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(grid4x4()).unwrap();
    let nodes = plot.scene().node_count();
    assert!(nodes > 0);
    assert!(plot.scene().resident_bytes() > 0);
    assert!(plot.picking().table_count() > 0);

    let released = plot.teardown().unwrap();
    assert_eq!(released, nodes);
    assert_eq!(plot.scene().node_count(), 0);
    assert_eq!(plot.scene().resident_bytes(), 0);
    assert_eq!(plot.picking().table_count(), 0);
    assert!(plot.picking().planes().is_empty());
    assert!(!plot.render_pending());
    assert!(plot.root().is_none());
}

#[test]
fn test_redraw_replaces_previous_subtree() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    let first = plot.root().unwrap();

    plot.zoom(AxisId::Y, 0.0, 5.0).unwrap();
    assert!(!plot.scene().contains(first));
    assert!(plot.scene().contains(plot.root().unwrap()));
    assert_eq!(plot.scales().unwrap().y.domain(), (0.0, 5.0));
}

#[test]
fn test_hover_debounces_on_bin() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(grid4x4()).unwrap();
    plot.render_now().unwrap();
    assert!(plot.highlight_enabled());

    // top face center of bin (1, 1), content 6
    let scales = plot.scales().unwrap();
    let top = Vec3::new(scales.grx(1.5), scales.gry(1.5), scales.grz(6.0));
    let pixel = plot.camera().project(top, WIDTH, HEIGHT).unwrap();
    let hover = PointerEvent::hover(pixel.x, pixel.y);

    match plot.pointer_move(&hover).unwrap() {
        PointerOutcome::Hover(HoverChange::Picked { result, .. }) => {
            assert_eq!(result.bin_id, 5);
            assert_eq!(result.value, 6.0);
        }
        other => panic!("expected a pick, got {other:?}"),
    }
    let highlight = plot.highlight_node().unwrap();
    assert!(plot.scene().contains(highlight));

    assert_eq!(
        plot.pointer_move(&hover).unwrap(),
        PointerOutcome::Hover(HoverChange::Unchanged)
    );
    assert_eq!(plot.highlight_node(), Some(highlight));

    plot.pointer_leave().unwrap();
    assert!(plot.highlight_node().is_none());
    assert!(!plot.scene().contains(highlight));
}

#[test]
fn test_hover_same_bin_across_bands_keeps_highlight() {
    let clock = ManualClock::new();
    let config = RenderConfig {
        level_count: 4,
        color_mode: histoscope_core::ColorMode::Palette,
        ..RenderConfig::default()
    };
    let mut plot = plot_with(config, &clock);
    let rows = vec![vec![10.0, 10.0], vec![10.0, 10.0]];
    let grid = HistogramGrid::from_rows((0.0, 2.0), (0.0, 2.0), &rows).unwrap();
    plot.set_source(DataSource::Histogram(Box::new(grid))).unwrap();
    plot.render_now().unwrap();

    // front face of bin 0, low in the bottom band and high in the third
    let scales = plot.scales().unwrap();
    let low = Vec3::new(scales.grx(0.5), scales.gry(0.0), scales.grz(1.0));
    let high = Vec3::new(scales.grx(0.5), scales.gry(0.0), scales.grz(8.0));
    let low = plot.camera().project(low, WIDTH, HEIGHT).unwrap();
    let high = plot.camera().project(high, WIDTH, HEIGHT).unwrap();

    let first = match plot.pointer_move(&PointerEvent::hover(low.x, low.y)).unwrap() {
        PointerOutcome::Hover(HoverChange::Picked { node, result }) => {
            assert_eq!(result.bin_id, 0);
            node
        }
        other => panic!("expected a pick, got {other:?}"),
    };
    let highlight = plot.highlight_node().unwrap();

    let hits = plot.scene().intersect(
        &plot.camera().screen_ray(high, WIDTH, HEIGHT).unwrap(),
        plot.content(),
    );
    assert_ne!(hits.first().map(|h| h.node), Some(first));

    assert_eq!(
        plot.pointer_move(&PointerEvent::hover(high.x, high.y)).unwrap(),
        PointerOutcome::Hover(HoverChange::Unchanged)
    );
    assert_eq!(plot.highlight_node(), Some(highlight));
    assert!(plot.scene().contains(highlight));
}

#[test]
fn test_hover_without_highlight_keeps_scene() {
    let clock = ManualClock::with_step(5000);
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(grid4x4()).unwrap();
    plot.render_now().unwrap();
    assert!(!plot.highlight_enabled());

    let scales = plot.scales().unwrap();
    let top = Vec3::new(scales.grx(1.5), scales.gry(1.5), scales.grz(6.0));
    let pixel = plot.camera().project(top, WIDTH, HEIGHT).unwrap();
    let outcome = plot.pointer_move(&PointerEvent::hover(pixel.x, pixel.y)).unwrap();
    assert!(matches!(outcome, PointerOutcome::Hover(HoverChange::Picked { .. })));
    assert!(plot.highlight_node().is_none());
}

#[test]
fn test_wheel_waits_for_pending_render() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    let plane = visible_plane(&plot, AxisId::X);
    let at = x_plane_pixel(&plot, plane, 0.0);
    let wheel = WheelEvent {
        offset: at,
        delta_mode: 0,
        delta: -120.0,
    };

    assert!(plot.render_pending());
    assert!(!plot.wheel(&wheel).unwrap());

    clock.advance(10);
    plot.poll().unwrap();
    let plane = visible_plane(&plot, AxisId::X);
    let at = x_plane_pixel(&plot, plane, 0.0);
    assert!(plot.wheel(&WheelEvent { offset: at, ..wheel }).unwrap());
    let (min, max) = plot.zoom_windows()[0].unwrap();
    assert!(min > 0.0 && max < 10.0);
}

#[test]
fn test_double_click_unzooms_or_resets_camera() {
    let clock = ManualClock::new();
    let mut plot = plot_with(RenderConfig::default(), &clock);
    plot.set_source(wide_grid()).unwrap();
    plot.render_now().unwrap();
    plot.zoom(AxisId::X, 2.0, 8.0).unwrap();
    plot.render_now().unwrap();

    let plane = visible_plane(&plot, AxisId::X);
    let at = x_plane_pixel(&plot, plane, 10.0);
    assert_eq!(
        plot.double_click(&PointerEvent::primary(at.x, at.y)).unwrap(),
        DoubleClick::Unzoom(AxisId::X)
    );
    assert_eq!(plot.zoom_windows()[0], None);

    let home = plot.camera().position;
    plot.orbit(0.4, 0.1).unwrap();
    assert_ne!(plot.camera().position, home);
    assert_eq!(
        plot.double_click(&PointerEvent::primary(1.0, 1.0)).unwrap(),
        DoubleClick::ResetCamera
    );
    assert!((plot.camera().position - home).length() < 1e-3);
}
