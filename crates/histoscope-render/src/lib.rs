//! Scene backend for histoscope-rs.
//!
//! This crate provides the seam between geometry builders and a renderer:
//! - The [`SceneGraph`] trait with node, material and intersection types
//! - A CPU-only [`HeadlessScene`] implementation
//! - Camera and view management
//! - Color map and level palette system

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod camera;
pub mod color_maps;
pub mod error;
pub mod headless;
pub mod scene;

pub use camera::Camera;
pub use color_maps::{ColorMap, ColorMapPalette, LevelPalette};
pub use error::{RenderError, RenderResult};
pub use headless::HeadlessScene;
pub use scene::{Intersection, LineStyle, Material, NodeDesc, NodeId, NodeKind, SceneGraph};
