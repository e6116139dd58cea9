#![forbid(unsafe_code)]

//! Bordered surface used by the popover, the modal, and the log pane.

use tagflow_core::geometry::{Rect, Sides};
use tagflow_render::cell::Cell;
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;

use crate::{Widget, clear_area, display_width, draw_text_span};

const TOP_LEFT: char = '╭';
const TOP_RIGHT: char = '╮';
const BOTTOM_LEFT: char = '╰';
const BOTTOM_RIGHT: char = '╯';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

/// A rounded, fully bordered block with an optional title.
///
/// Rendering clears the whole area first, so a block drawn over other
/// content acts as an opaque overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block<'a> {
    title: Option<&'a str>,
    border_style: Style,
    style: Style,
}

impl<'a> Block<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title drawn on the top border, after the corner.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Style used for the cleared interior.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Area left for content inside the border.
    pub fn inner(&self, area: Rect) -> Rect {
        area.inner(Sides::all(1))
    }

    fn border_cell(&self, c: char) -> Cell {
        let mut cell = Cell::from_char(c);
        self.style.apply_to(&mut cell);
        self.border_style.apply_to(&mut cell);
        cell
    }
}

impl Widget for Block<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "Block",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }
        clear_area(frame, area, self.style);
        if area.width < 2 || area.height < 2 {
            return;
        }

        let right = area.right() - 1;
        let bottom = area.bottom() - 1;
        let buf = &mut frame.buffer;
        for x in area.x + 1..right {
            buf.set(x, area.y, self.border_cell(HORIZONTAL));
            buf.set(x, bottom, self.border_cell(HORIZONTAL));
        }
        for y in area.y + 1..bottom {
            buf.set(area.x, y, self.border_cell(VERTICAL));
            buf.set(right, y, self.border_cell(VERTICAL));
        }
        buf.set(area.x, area.y, self.border_cell(TOP_LEFT));
        buf.set(right, area.y, self.border_cell(TOP_RIGHT));
        buf.set(area.x, bottom, self.border_cell(BOTTOM_LEFT));
        buf.set(right, bottom, self.border_cell(BOTTOM_RIGHT));

        if let Some(title) = self.title
            && area.width > 4
            && display_width(title) > 0
        {
            let style = self.style.patch(self.border_style).bold();
            let x = draw_text_span(frame, area.x + 1, area.y, " ", style, right, 0);
            let x = draw_text_span(frame, x, area.y, title, style, right, 0);
            draw_text_span(frame, x, area.y, " ", style, right, 0);
        }
    }
}
