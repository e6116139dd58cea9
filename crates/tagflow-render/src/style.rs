#![forbid(unsafe_code)]

//! Partial styles applied on top of existing cells.
//!
//! Unset fields leave the cell untouched, so styles layer: a focus style
//! that only sets `REVERSE` keeps whatever colors the chip style chose.

use crate::cell::{Cell, PackedRgba, StyleFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<PackedRgba>,
    pub bg: Option<PackedRgba>,
    pub attrs: Option<StyleFlags>,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn add_flags(mut self, flags: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flags);
        self
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.add_flags(StyleFlags::BOLD)
    }

    #[must_use]
    pub fn dim(self) -> Self {
        self.add_flags(StyleFlags::DIM)
    }

    #[must_use]
    pub fn italic(self) -> Self {
        self.add_flags(StyleFlags::ITALIC)
    }

    #[must_use]
    pub fn underline(self) -> Self {
        self.add_flags(StyleFlags::UNDERLINE)
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        self.add_flags(StyleFlags::REVERSE)
    }

    pub const fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// `other` on top of `self`: set fields in `other` win, flags union.
    #[must_use]
    pub fn patch(self, other: Style) -> Style {
        let attrs = match (self.attrs, other.attrs) {
            (Some(a), Some(b)) => Some(a | b),
            (a, b) => a.or(b),
        };
        Style {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs,
        }
    }

    /// Write the set fields into `cell`.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(flags) = self.attrs {
            cell.attrs = cell.attrs.with_flags(flags);
        }
    }
}
