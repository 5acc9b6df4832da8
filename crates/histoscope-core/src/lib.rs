//! Core types for histoscope-rs.
//!
//! This crate provides the data model shared by every other crate:
//! - [`Grid`] sources and [`AxisScale`] mappings from data to draw space
//! - Tick generation in [`ticks`]
//! - Geometry buffers, rays and zoom planes used by builders and picking
//! - [`RenderConfig`], the explicit per-draw configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Config structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
// Bin indices and counts are converted to floating point all over the place
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::float_cmp)]

pub mod axis;
pub mod buffer;
pub mod error;
pub mod grid;
pub mod options;
pub mod pick;
pub mod ray;
pub mod ticks;
pub mod zoom_plane;

pub use axis::{AxisId, AxisKind, AxisRange, AxisScale};
pub use buffer::{flat_normals, FixedBuffer, GeometryBuffer, IndexBuffer, LineBuffer};
pub use error::{HistoscopeError, Result};
pub use grid::{uniform_edges, Grid, HistogramGrid, PointSet, PolyBin, PolyGrid};
pub use options::{
    tip_color_for, BinShape, ColorMode, MarkerMode, PlotStyle, RenderConfig, SurfaceMode,
    TIP_GREEN, TIP_RED,
};
pub use pick::{BinBounds, PickResult};
pub use ray::{Plane, Ray};
pub use ticks::{MonospaceMeasure, TextMeasure, Tick, TickSet};
pub use zoom_plane::ZoomPlane;

// Re-export glam types for convenience
pub use glam::{DVec2, DVec3, Mat4, Vec2, Vec3, Vec4};
