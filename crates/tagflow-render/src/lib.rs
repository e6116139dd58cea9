#![forbid(unsafe_code)]

//! Render kernel: cells, styles, buffers, frames, and terminal output.

pub mod buffer;
pub mod cell;
pub mod frame;
pub mod link_registry;
pub mod presenter;
pub mod style;

pub use buffer::Buffer;
pub use cell::{Cell, CellAttrs, CellContent, PackedRgba, StyleFlags};
pub use frame::Frame;
pub use link_registry::LinkRegistry;
pub use style::Style;
