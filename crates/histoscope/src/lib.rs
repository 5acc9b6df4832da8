//! histoscope-rs: interactive 3D histogram geometry and picking.
//!
//! Histograms, polygon bins and point sets are turned into scene geometry, drawn
//! through a [`SceneGraph`] and made interactive: drag on an axis to zoom, hover
//! to pick a bin, wheel and double-click to zoom in and out.
//!
//! # Quick Start
//!
//! ```no_run
//! use histoscope::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
//!     let grid = HistogramGrid::from_rows((0.0, 2.0), (0.0, 2.0), &rows)?;
//!
//!     let mut plot = SceneLifecycle::new(
//!         HeadlessScene::new(800, 600),
//!         SystemClock::default(),
//!         RenderConfig::default(),
//!         800,
//!         600,
//!     );
//!     plot.set_source(DataSource::Histogram(Box::new(grid)))?;
//!     plot.render_now()?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`histoscope_core`]: scales, ticks, grids, buffers and configuration
//! - [`histoscope_render`]: the scene-graph seam, camera and palettes
//! - [`histoscope_geometry`]: one builder per plot style plus axis decorations
//! - this crate: [`PickingController`], [`DeferredRender`] and [`SceneLifecycle`]

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod lifecycle;
pub mod picking;
pub mod scheduler;

pub use histoscope_core::{
    AxisId, AxisKind, AxisScale, BinBounds, Grid, HistogramGrid, HistoscopeError, PickResult,
    PlotStyle, PointSet, PolyBin, PolyGrid, RenderConfig, Result, SurfaceMode, Vec2, Vec3,
};
pub use histoscope_geometry::{DataSource, DrawOutput, DrawScales};
pub use histoscope_render::{Camera, HeadlessScene, NodeId, SceneGraph};

pub use lifecycle::SceneLifecycle;
pub use picking::{
    DoubleClick, DragState, HoverChange, PickingController, PointerEvent, PointerOutcome,
    WheelEvent,
};
pub use scheduler::{Clock, DeferredRender, ManualClock, RenderRequest, SystemClock};

/// Initializes `env_logger` from `RUST_LOG`.
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("histoscope-rs logging initialized");
    }
}
