//! Export rendering.

mod render;

pub use render::{CsvRenderer, ExportRenderer, RenderError};
