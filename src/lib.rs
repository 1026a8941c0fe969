//! Rendering core for an extruded-building map scene on OpenGL ES 3.0 /
//! WebGL 2: shader and GPU resource wrappers, color, depth, fog/normal and
//! shadow passes, color-coded object picking, and an on-demand frame
//! scheduler.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod renderer;
pub mod scene;

pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use renderer::{Context, Renderer};
