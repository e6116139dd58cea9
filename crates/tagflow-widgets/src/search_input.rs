#![forbid(unsafe_code)]

//! Single-line search field.
//!
//! Grapheme-cluster aware editing with a placeholder, horizontal
//! scrolling that keeps the cursor in view, and a hardware cursor
//! request on the frame when focused.

use tagflow_core::event::{Event, KeyCode, KeyEvent};
use tagflow_core::geometry::Rect;
use tagflow_render::cell::{Cell, StyleFlags};
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::Widget;

/// Result of feeding an event to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The value changed.
    Edited,
    /// Only the cursor moved.
    Moved,
    /// The event is not for the input.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    value: String,
    /// Cursor position (grapheme index).
    cursor: usize,
    placeholder: String,
    style: Style,
    placeholder_style: Style,
    focused: bool,
}

impl SearchInput {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_placeholder_style(mut self, style: Style) -> Self {
        self.placeholder_style = style;
        self
    }

    #[must_use]
    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Replace the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.grapheme_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Cursor position as a grapheme index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn handle_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key),
            Event::Paste(text) => {
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                if text.is_empty() {
                    return InputOutcome::Ignored;
                }
                self.insert_str(&text);
                InputOutcome::Edited
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> InputOutcome {
        match key.code {
            KeyCode::Char(c) if !key.ctrl() && !c.is_control() => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                InputOutcome::Edited
            }
            KeyCode::Char('u') if key.ctrl() => {
                if self.value.is_empty() {
                    return InputOutcome::Ignored;
                }
                self.clear();
                InputOutcome::Edited
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return InputOutcome::Ignored;
                }
                let start = self.grapheme_byte_offset(self.cursor - 1);
                let end = self.grapheme_byte_offset(self.cursor);
                self.value.drain(start..end);
                self.cursor -= 1;
                InputOutcome::Edited
            }
            KeyCode::Delete => {
                if self.cursor >= self.grapheme_count() {
                    return InputOutcome::Ignored;
                }
                let start = self.grapheme_byte_offset(self.cursor);
                let end = self.grapheme_byte_offset(self.cursor + 1);
                self.value.drain(start..end);
                InputOutcome::Edited
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputOutcome::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.grapheme_count());
                InputOutcome::Moved
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputOutcome::Moved
            }
            KeyCode::End => {
                self.cursor = self.grapheme_count();
                InputOutcome::Moved
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn insert_str(&mut self, text: &str) {
        let offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert_str(offset, text);
        self.cursor += text.graphemes(true).count();
        // A combining mark may merge with the previous grapheme.
        self.cursor = self.cursor.min(self.grapheme_count());
    }

    fn grapheme_count(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn cursor_visual_pos(&self) -> usize {
        self.value
            .graphemes(true)
            .take(self.cursor)
            .map(UnicodeWidthStr::width)
            .sum()
    }

    fn scroll_for(&self, viewport_width: usize) -> usize {
        let cursor = self.cursor_visual_pos();
        if cursor >= viewport_width {
            cursor + 1 - viewport_width
        } else {
            0
        }
    }
}

impl Widget for SearchInput {
    fn render(&self, area: Rect, frame: &mut Frame) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "SearchInput",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }
        let row = area.row(0);
        crate::set_style_area(frame, row, self.style);

        let viewport = row.width as usize;
        let (text, style, scroll) = if self.value.is_empty() {
            (self.placeholder.as_str(), self.style.patch(self.placeholder_style), 0)
        } else {
            (self.value.as_str(), self.style, self.scroll_for(viewport))
        };

        let mut visual = 0usize;
        for g in text.graphemes(true) {
            let w = UnicodeWidthStr::width(g);
            if w == 0 {
                continue;
            }
            if visual < scroll {
                visual += w;
                continue;
            }
            let rel = visual - scroll;
            if rel + w > viewport {
                break;
            }
            if let Some(c) = g.chars().next() {
                let mut cell = Cell::from_char(c);
                style.apply_to(&mut cell);
                frame.buffer.set(row.x + rel as u16, row.y, cell);
            }
            visual += w;
        }

        if !self.focused {
            return;
        }
        let cursor_rel = self.cursor_visual_pos().saturating_sub(self.scroll_for(viewport));
        if cursor_rel < viewport {
            let cx = row.x + cursor_rel as u16;
            if let Some(cell) = frame.buffer.get_mut(cx, row.y) {
                cell.attrs = cell.attrs.with_flags(StyleFlags::REVERSE);
            }
            frame.set_cursor(Some((cx, row.y)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagflow_core::event::Modifiers;

    fn type_str(input: &mut SearchInput, s: &str) {
        for c in s.chars() {
            input.handle_event(&Event::key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_inserts_at_cursor() {
        let mut input = SearchInput::new();
        type_str(&mut input, "tg3");
        input.handle_event(&Event::key(KeyCode::Left));
        input.handle_event(&Event::key(KeyCode::Left));
        assert_eq!(
            input.handle_event(&Event::key(KeyCode::Char('a'))),
            InputOutcome::Edited
        );
        assert_eq!(input.value(), "tag3");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = SearchInput::new();
        type_str(&mut input, "abc");
        assert_eq!(
            input.handle_event(&Event::key(KeyCode::Delete)),
            InputOutcome::Ignored
        );
        input.handle_event(&Event::key(KeyCode::Backspace));
        assert_eq!(input.value(), "ab");
        input.handle_event(&Event::key(KeyCode::Home));
        input.handle_event(&Event::key(KeyCode::Delete));
        assert_eq!(input.value(), "b");
        assert_eq!(
            input.handle_event(&Event::key(KeyCode::Backspace)),
            InputOutcome::Ignored
        );
    }

    #[test]
    fn grapheme_aware_deletion() {
        let mut input = SearchInput::new();
        input.set_value("e\u{301}x");
        assert_eq!(input.cursor(), 2);
        input.handle_event(&Event::key(KeyCode::Left));
        input.handle_event(&Event::key(KeyCode::Backspace));
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn ctrl_u_clears_and_ctrl_chars_are_not_inserted() {
        let mut input = SearchInput::new();
        type_str(&mut input, "abc");
        let ctrl_x = Event::Key(KeyEvent::new(KeyCode::Char('x')).with_modifiers(Modifiers::CTRL));
        assert_eq!(input.handle_event(&ctrl_x), InputOutcome::Ignored);
        let ctrl_u = Event::Key(KeyEvent::new(KeyCode::Char('u')).with_modifiers(Modifiers::CTRL));
        assert_eq!(input.handle_event(&ctrl_u), InputOutcome::Edited);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn paste_inserts_text() {
        let mut input = SearchInput::new();
        assert_eq!(
            input.handle_event(&Event::Paste("tag\n3".into())),
            InputOutcome::Edited
        );
        assert_eq!(input.value(), "tag3");
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let input = SearchInput::new().with_placeholder("Search for a tag");
        let mut frame = Frame::new(20, 1);
        input.render(Rect::new(0, 0, 20, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0).trim_end(), "Search for a tag");
        assert_eq!(frame.cursor_position, None);
    }

    #[test]
    fn focused_input_sets_cursor_and_scrolls() {
        let mut input = SearchInput::new().with_focused(true);
        input.set_value("abcdefgh");
        let mut frame = Frame::new(4, 1);
        input.render(Rect::new(0, 0, 4, 1), &mut frame);
        assert_eq!(frame.buffer.row_text(0).trim_end(), "fgh");
        assert_eq!(frame.cursor_position, Some((3, 0)));
    }
}
