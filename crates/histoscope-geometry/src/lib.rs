//! Geometry builders for histoscope-rs.
//!
//! Every builder takes a data source, the [`DrawScales`] of the current draw and a
//! [`RenderConfig`](histoscope_core::RenderConfig), and returns scene primitives:
//! - Lego boxes with per-band face culling in [`lego`]
//! - Contour-clipped surfaces in [`surface`]
//! - Extruded polygon bins in [`poly_lego`]
//! - Boxes and spheres for 3D grids in [`bins3d`]
//! - Point markers in [`markers`]
//! - Axis decorations and zoom planes in [`axes`]
//!
//! [`style`] picks the builder for a configured plot style.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Draw coordinates are f32, data coordinates f64, bin indices usize
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_lines)]

pub mod axes;
pub mod bins3d;
pub mod highlight;
pub mod lego;
pub mod markers;
pub mod output;
pub mod poly_lego;
pub mod scales;
pub mod style;
pub mod surface;
pub mod topology;

pub use axes::{build_axes, quadrant, AxisDecorations, AxisElement, AxisRole};
pub use highlight::{highlight_box, tip_bounds};
pub use output::{DataSource, DrawOutput, PickTable, Primitive, Tooltip};
pub use scales::{DrawScales, ZoomWindows};
pub use style::{build_plot, builder_for, effective_style, scales_for, PlotBuilder};
pub use surface::{SurfaceGeometry, TopologyIssue};
