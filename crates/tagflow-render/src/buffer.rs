#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! Cells are stored row-major: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Dimensions never change after creation
//! 3. A wide character's head is always followed by its continuation
//!    cell(s); overwriting either half clears the other

use tagflow_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellContent};

/// A 2D grid of terminal cells.
///
/// ```
/// use tagflow_render::buffer::Buffer;
/// use tagflow_render::cell::Cell;
///
/// let mut buf = Buffer::new(8, 1);
/// buf.set(0, 0, Cell::from_char('+'));
/// buf.set(1, 0, Cell::from_char('8'));
/// assert_eq!(buf.row_text(0).trim_end(), "+8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a buffer of empty cells. Zero dimensions give an empty grid.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Write `cell` at `(x, y)`. Out-of-bounds writes are ignored.
    ///
    /// Wide characters also claim the cell to their right; a wide
    /// character that does not fit in the row is replaced by a space.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.clear_wide_neighbors(x, y);

        let width = match cell.content {
            CellContent::Char(c) => c.width().unwrap_or(0),
            _ => 1,
        };
        if width <= 1 {
            self.cells[idx] = cell;
            return;
        }

        if x.saturating_add(1) >= self.width {
            let mut blank = cell;
            blank.content = CellContent::Char(' ');
            self.cells[idx] = blank;
            return;
        }
        self.clear_wide_neighbors(x + 1, y);
        self.cells[idx] = cell;
        let mut tail = Cell::CONTINUATION;
        tail.bg = cell.bg;
        tail.attrs = cell.attrs;
        self.cells[idx + 1] = tail;
    }

    fn clear_wide_neighbors(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        match self.cells[idx].content {
            CellContent::Continuation if x > 0 => {
                self.cells[idx - 1].content = CellContent::Empty;
            }
            CellContent::Char(c) if c.width().unwrap_or(0) > 1 => {
                if let Some(next) = self.index(x + 1, y) {
                    self.cells[next].content = CellContent::Empty;
                }
            }
            _ => {}
        }
    }

    /// Fill `area` (clipped to the buffer) with `cell`.
    pub fn fill(&mut self, area: Rect, cell: Cell) {
        let area = area.intersection(&self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.set(x, y, cell);
            }
        }
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Row `y` as text; empty cells read as spaces.
    pub fn row_text(&self, y: u16) -> String {
        self.text_in(Rect::new(0, y, self.width, 1))
    }

    /// Text inside `area`, rows joined with `\n`.
    pub fn text_in(&self, area: Rect) -> String {
        let area = area.intersection(&self.bounds());
        let mut out = String::new();
        for y in area.y..area.bottom() {
            if y > area.y {
                out.push('\n');
            }
            for x in area.x..area.right() {
                match self.get(x, y).map(|c| c.content) {
                    Some(CellContent::Char(c)) => out.push(c),
                    Some(CellContent::Continuation) => {}
                    _ => out.push(' '),
                }
            }
        }
        out
    }

    /// Whole buffer as text with trailing spaces trimmed per row.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y).trim_end().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cells of row `y`.
    pub fn row(&self, y: u16) -> &[Cell] {
        match self.index(0, y) {
            Some(start) => &self.cells[start..start + self.width as usize],
            None => &[],
        }
    }
}
