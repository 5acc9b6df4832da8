#![allow(clippy::cast_precision_loss)]
//! Demo drawing a 2D histogram as stacked lego bands in a headless scene.
//!
//! Fills a 24x24 grid with two Gaussian bumps, draws it with four palette bands,
//! then replays a hover and a drag-to-zoom on the x axis.
//!
//! Pass a JSON file as the first argument to override the render configuration:
//!
//! ```text
//! RUST_LOG=debug cargo run --example lego_demo -- config.json
//! ```

use histoscope::{
    AxisId, DataSource, HeadlessScene, HistogramGrid, PointerEvent, PointerOutcome, RenderConfig,
    SceneLifecycle, SystemClock, Vec3,
};
use histoscope_core::ColorMode;

const SIZE: u32 = 800;

fn bumps(n: usize) -> Vec<Vec<f64>> {
    let bump = |x: f64, y: f64, cx: f64, cy: f64, w: f64| (-((x - cx).powi(2) + (y - cy).powi(2)) / w).exp();
    (0..n)
        .map(|j| {
            (0..n)
                .map(|i| {
                    let (x, y) = ((i as f64 + 0.5) / n as f64, (j as f64 + 0.5) / n as f64);
                    100.0 * bump(x, y, 0.3, 0.4, 0.02) + 60.0 * bump(x, y, 0.7, 0.65, 0.05)
                })
                .collect()
        })
        .collect()
}

fn main() -> histoscope::Result<()> {
    histoscope::init_logging();

    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                histoscope::HistoscopeError::Scene(format!("can not read {path}: {e}"))
            })?;
            RenderConfig::from_json(&text)?
        }
        None => RenderConfig::default(),
    };
    config.level_count = config.level_count.max(4);
    config.color_mode = ColorMode::Palette;

    let grid = HistogramGrid::from_rows((-3.0, 3.0), (-3.0, 3.0), &bumps(24))?;
    let mut plot = SceneLifecycle::new(
        HeadlessScene::new(SIZE, SIZE),
        SystemClock::default(),
        config,
        SIZE,
        SIZE,
    );
    plot.set_zoom_listener(|axis, min, max| {
        log::info!("zoomed {} to [{min:.3}, {max:.3}]", axis.name());
    });
    plot.set_source(DataSource::Histogram(Box::new(grid)))?;
    plot.render_now()?;
    log::info!(
        "{} scene nodes holding {} bytes, first render {:?} ms",
        plot.scene().node_count(),
        plot.scene().resident_bytes(),
        plot.first_render_ms()
    );

    // hover the center of the taller bump
    let target = plot.scales().map(|s| Vec3::new(s.grx(-1.2), s.gry(-0.6), s.grz(50.0)));
    if let Some(pixel) = target.and_then(|p| plot.camera().project(p, SIZE, SIZE)) {
        match plot.pointer_move(&PointerEvent::hover(pixel.x, pixel.y))? {
            PointerOutcome::Hover(change) => log::info!("hover: {change:?}"),
            other => log::info!("hover ignored: {other:?}"),
        }
    }

    // drag across the middle half of the first visible x zoom plane
    let plane = plot
        .picking()
        .planes()
        .iter()
        .find(|e| e.visible && e.plane.axis() == AxisId::X)
        .map(|e| e.plane.world_vertices());
    if let Some(v) = plane {
        let at = |x: f32| {
            let mut p = (v[0] + v[3]) * 0.5;
            p.x = x;
            plot.camera().project(p, SIZE, SIZE)
        };
        if let (Some(a), Some(b)) = (at(-50.0), at(50.0)) {
            plot.pointer_down(&PointerEvent::primary(a.x, a.y));
            plot.pointer_move(&PointerEvent::primary(b.x, b.y))?;
            let outcome = plot.pointer_up(&PointerEvent::primary(b.x, b.y))?;
            log::info!("release: {outcome:?}");
        }
    }

    plot.render_now()?;
    let released = plot.teardown()?;
    log::info!("released {released} nodes after {} frames", plot.scene().frame_count());
    Ok(())
}
