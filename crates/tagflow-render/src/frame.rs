#![forbid(unsafe_code)]

//! Frame: the render target handed to widgets.
//!
//! Wraps the cell [`Buffer`] together with the hyperlink registry that
//! cell link ids refer to and the requested cursor position.

use tagflow_core::geometry::Rect;

use crate::buffer::Buffer;
use crate::link_registry::LinkRegistry;

#[derive(Debug, Clone)]
pub struct Frame {
    pub buffer: Buffer,
    pub links: LinkRegistry,
    /// Where the terminal cursor should be shown, if anywhere.
    pub cursor_position: Option<(u16, u16)>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            links: LinkRegistry::new(),
            cursor_position: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Register a URL for OSC 8 output and return its link id.
    pub fn register_link(&mut self, url: &str) -> u32 {
        self.links.register(url)
    }

    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position;
    }

    /// Clear cells, links and cursor for the next render pass.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.links.clear();
        self.cursor_position = None;
    }
}
