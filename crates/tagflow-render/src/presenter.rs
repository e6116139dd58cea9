#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! The presenter keeps the last buffer it wrote and only re-emits cells
//! that changed. Style and hyperlink state are tracked so SGR and OSC 8
//! sequences are written only on transitions.
//!
//! ```no_run
//! use tagflow_render::frame::Frame;
//! use tagflow_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(std::io::stdout());
//! let frame = Frame::new(80, 24);
//! presenter.present(&frame)?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufWriter, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::frame::Frame;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs.flags(),
        }
    }
}

fn color(c: PackedRgba) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Buffer>,
    previous_links: Vec<String>,
    current_style: Option<CellStyle>,
    current_link: Option<u32>,
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            previous_links: Vec::new(),
            current_style: None,
            current_link: None,
            cursor: None,
        }
    }

    /// Write the cells of `frame` that differ from the last presented frame.
    ///
    /// A size change, or a change in the link table, repaints everything.
    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("present", width = frame.width(), height = frame.height()).entered();

        let buffer = &frame.buffer;
        let full = match &self.previous {
            Some(prev) => {
                prev.width() != buffer.width()
                    || prev.height() != buffer.height()
                    || self.previous_links.as_slice() != frame.links.urls()
            }
            None => true,
        };
        if full {
            queue!(self.writer, Clear(ClearType::All))?;
            self.cursor = None;
        }

        let mut emitted = 0usize;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                if !full && self.previous.as_ref().and_then(|p| p.get(x, y)) == Some(cell) {
                    continue;
                }
                if cell.is_continuation() {
                    continue;
                }
                self.move_cursor_to(x, y)?;
                self.emit_cell(cell, frame)?;
                emitted += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(cells = emitted, full, "frame emitted");
        let _ = emitted;

        self.close_link()?;
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        self.current_style = None;

        match frame.cursor_position {
            Some((x, y)) => {
                self.move_cursor_to(x, y)?;
                queue!(self.writer, Show)?;
            }
            None => queue!(self.writer, Hide)?,
        }

        self.previous = Some(buffer.clone());
        self.previous_links = frame.links.urls().to_vec();
        self.writer.flush()
    }

    fn emit_cell(&mut self, cell: &Cell, frame: &Frame) -> io::Result<()> {
        self.emit_style_changes(cell)?;
        self.emit_link_changes(cell, frame)?;

        let width = match cell.content {
            CellContent::Char(ch) => {
                let mut buf = [0u8; 4];
                self.writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
                unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0)
            }
            _ => {
                self.writer.write_all(b" ")?;
                1
            }
        };
        if let Some((x, y)) = self.cursor {
            self.cursor = Some((x.saturating_add(width as u16), y));
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let style = CellStyle::from_cell(cell);
        if self.current_style == Some(style) {
            return Ok(());
        }

        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        if !style.fg.is_transparent() {
            queue!(self.writer, SetForegroundColor(color(style.fg)))?;
        }
        if !style.bg.is_transparent() {
            queue!(self.writer, SetBackgroundColor(color(style.bg)))?;
        }
        for (flag, attr) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
            (StyleFlags::STRIKETHROUGH, Attribute::CrossedOut),
        ] {
            if style.attrs.contains(flag) {
                queue!(self.writer, SetAttribute(attr))?;
            }
        }

        self.current_style = Some(style);
        Ok(())
    }

    fn emit_link_changes(&mut self, cell: &Cell, frame: &Frame) -> io::Result<()> {
        let id = cell.attrs.link_id();
        let next = (id != 0).then_some(id);
        if self.current_link == next {
            return Ok(());
        }
        self.close_link()?;
        if let Some(url) = next.and_then(|id| frame.links.get(id)) {
            write!(self.writer, "\x1b]8;;{url}\x1b\\")?;
            self.current_link = next;
        }
        Ok(())
    }

    fn close_link(&mut self) -> io::Result<()> {
        if self.current_link.take().is_some() {
            self.writer.write_all(b"\x1b]8;;\x1b\\")?;
        }
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        queue!(self.writer, MoveTo(x, y))?;
        self.cursor = Some((x, y));
        Ok(())
    }

    /// Forget the previous frame so the next present repaints everything.
    ///
    /// Call after a resize or anything else that leaves the screen unknown.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.previous_links.clear();
        self.current_style = None;
        self.current_link = None;
        self.cursor = None;
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flushes and returns the inner writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}
