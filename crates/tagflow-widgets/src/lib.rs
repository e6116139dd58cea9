#![forbid(unsafe_code)]

//! Widgets for tagflow: tag chips, the overflow tag filter, a search
//! input, and log scroll controls.

pub mod block;
pub mod log_scroll;
pub mod search_input;
pub mod tag;
pub mod tag_overflow;

pub use block::Block;
pub use log_scroll::{
    DEFAULT_SCROLL_THRESHOLD, LogScrollButtons, LogViewChange, LogViewContext, ScrollMetrics,
    ScrollRequest,
};
pub use search_input::SearchInput;
pub use tag::Tag;
pub use tag_overflow::{
    Disclosure, HitTarget, TagOverflow, TagOverflowAction, TagOverflowConfig, TagOverflowState,
};

use tagflow_core::geometry::Rect;
use tagflow_render::cell::Cell;
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A `Widget` is a renderable component.
///
/// Widgets render themselves into a `Frame` within a given `Rect`.
pub trait Widget {
    /// Render the widget into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);
}

/// A `StatefulWidget` is a widget that renders based on mutable state.
pub trait StatefulWidget {
    type State;

    /// Render the widget into the frame with mutable state.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State);
}

/// Display width of `text` in terminal cells.
#[inline]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Apply a style to all cells in a rectangular area, keeping content.
pub(crate) fn set_style_area(frame: &mut Frame, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = frame.buffer.get_mut(x, y) {
                style.apply_to(cell);
            }
        }
    }
}

/// Fill `area` with blank cells in `style`, hiding whatever was below.
pub(crate) fn clear_area(frame: &mut Frame, area: Rect, style: Style) {
    let mut blank = Cell::from_char(' ');
    style.apply_to(&mut blank);
    frame.buffer.fill(area, blank);
}

/// Draw a text span at `(x, y)`, stopping before `max_x`.
///
/// Graphemes that would straddle `max_x` are dropped. A non-zero
/// `link_id` is attached to every drawn cell. Returns the x position
/// after the last drawn grapheme.
pub(crate) fn draw_text_span(
    frame: &mut Frame,
    mut x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
    link_id: u32,
) -> u16 {
    for grapheme in content.graphemes(true) {
        if x >= max_x {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        if w == 0 {
            continue;
        }
        if x as usize + w > max_x as usize {
            break;
        }
        if let Some(c) = grapheme.chars().next() {
            let mut cell = Cell::from_char(c).with_link(link_id);
            style.apply_to(&mut cell);
            frame.buffer.set(x, y, cell);
        }
        x = x.saturating_add(w as u16);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_render::cell::PackedRgba;

    #[test]
    fn draw_text_span_clips_at_max_x() {
        let mut frame = Frame::new(10, 1);
        let end = draw_text_span(&mut frame, 0, 0, "hello", Style::new(), 3, 0);
        assert_eq!(end, 3);
        assert_eq!(frame.buffer.row_text(0).trim_end(), "hel");
    }

    #[test]
    fn draw_text_span_drops_straddling_wide_grapheme() {
        let mut frame = Frame::new(10, 1);
        let end = draw_text_span(&mut frame, 0, 0, "a日", Style::new(), 2, 0);
        assert_eq!(end, 1);
        assert_eq!(frame.buffer.row_text(0).trim_end(), "a");
    }

    #[test]
    fn draw_text_span_attaches_link() {
        let mut frame = Frame::new(4, 1);
        let id = frame.register_link("/x");
        draw_text_span(&mut frame, 0, 0, "ab", Style::new(), 4, id);
        assert_eq!(frame.buffer.get(1, 0).unwrap().attrs.link_id(), id);
        assert_eq!(frame.buffer.get(2, 0).unwrap().attrs.link_id(), 0);
    }

    #[test]
    fn set_style_area_applies_to_all_cells() {
        let mut frame = Frame::new(3, 2);
        let style = Style::new().bg(PackedRgba::rgb(10, 20, 30));
        set_style_area(&mut frame, Rect::new(0, 0, 3, 2), style);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.buffer.get(x, y).unwrap().bg, PackedRgba::rgb(10, 20, 30));
            }
        }
    }

    #[test]
    fn clear_area_overwrites_content() {
        let mut frame = Frame::new(3, 1);
        draw_text_span(&mut frame, 0, 0, "abc", Style::new(), 3, 0);
        clear_area(&mut frame, Rect::new(1, 0, 1, 1), Style::new());
        assert_eq!(frame.buffer.row_text(0), "a c");
    }

    #[test]
    fn display_width_counts_cells() {
        assert_eq!(display_width("app: web"), 8);
        assert_eq!(display_width("日本"), 4);
    }
}
