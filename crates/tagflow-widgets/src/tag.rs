#![forbid(unsafe_code)]

//! Tag chip.
//!
//! A single-line `key: value` label with one cell of padding on each
//! side. The label is truncated to the area by display width; a chip
//! can carry a hyperlink id that is attached to every cell it draws.

use tagflow_core::geometry::Rect;
use tagflow_render::cell::Cell;
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;

use crate::{Widget, display_width, draw_text_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag<'a> {
    label: &'a str,
    style: Style,
    pad_left: u16,
    pad_right: u16,
    link_id: u32,
}

impl<'a> Tag<'a> {
    /// Create a chip with 1 cell padding on each side.
    #[must_use]
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            style: Style::default(),
            pad_left: 1,
            pad_right: 1,
            link_id: 0,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, left: u16, right: u16) -> Self {
        self.pad_left = left;
        self.pad_right = right;
        self
    }

    /// Attach a link id from the frame's registry (0 for none).
    #[must_use]
    pub fn with_link(mut self, link_id: u32) -> Self {
        self.link_id = link_id;
        self
    }

    /// Display width in cells, padding included.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u16 {
        let label_width = u16::try_from(display_width(self.label)).unwrap_or(u16::MAX);
        label_width
            .saturating_add(self.pad_left)
            .saturating_add(self.pad_right)
    }

    fn render_spaces(&self, frame: &mut Frame, mut x: u16, y: u16, n: u16, max_x: u16) -> u16 {
        let mut cell = Cell::from_char(' ').with_link(self.link_id);
        self.style.apply_to(&mut cell);
        for _ in 0..n {
            if x >= max_x {
                break;
            }
            frame.buffer.set(x, y, cell);
            x = x.saturating_add(1);
        }
        x
    }
}

impl Widget for Tag<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        let y = area.y;
        let max_x = area.right();
        let mut x = area.x;

        x = self.render_spaces(frame, x, y, self.pad_left, max_x);
        x = draw_text_span(frame, x, y, self.label, self.style, max_x, self.link_id);
        let _ = self.render_spaces(frame, x, y, self.pad_right, max_x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_render::cell::PackedRgba;

    #[test]
    fn width_includes_padding() {
        assert_eq!(Tag::new("app: web").width(), 10);
        assert_eq!(Tag::new("+8").with_padding(0, 0).width(), 2);
        assert_eq!(Tag::new("").width(), 2);
    }

    #[test]
    fn renders_padded_label_with_style() {
        let style = Style::new()
            .fg(PackedRgba::rgb(1, 2, 3))
            .bg(PackedRgba::rgb(4, 5, 6));
        let mut frame = Frame::new(10, 1);
        Tag::new("OK")
            .with_style(style)
            .render(Rect::new(0, 0, 10, 1), &mut frame);

        for (x, ch) in [' ', 'O', 'K', ' '].into_iter().enumerate() {
            let cell = frame.buffer.get(x as u16, 0).unwrap();
            assert_eq!(cell.content.as_char(), Some(ch));
            assert_eq!(cell.bg, PackedRgba::rgb(4, 5, 6));
        }
    }

    #[test]
    fn truncates_in_small_area() {
        let mut frame = Frame::new(10, 1);
        Tag::new("app: web").render(Rect::new(0, 0, 4, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0).trim_end(), " app");
    }

    #[test]
    fn link_covers_padding_and_label() {
        let mut frame = Frame::new(10, 1);
        let id = frame.register_link("/pipelineruns?labelSelector=a%3Db");
        Tag::new("a: b")
            .with_link(id)
            .render(Rect::new(0, 0, 10, 1), &mut frame);
        for x in 0..6 {
            assert_eq!(frame.buffer.get(x, 0).unwrap().attrs.link_id(), id);
        }
        assert_eq!(frame.buffer.get(6, 0).unwrap().attrs.link_id(), 0);
    }

    #[test]
    fn empty_area_is_noop() {
        let mut frame = Frame::new(4, 1);
        Tag::new("x").render(Rect::new(0, 0, 0, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "    ");
    }
}
