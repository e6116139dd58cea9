#![forbid(unsafe_code)]

//! Cell: one terminal grid position.
//!
//! A wide character occupies its own cell plus [`CellContent::Continuation`]
//! cells to its right, so that every column maps to exactly one cell.

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellContent {
    /// Nothing drawn (renders as a space).
    #[default]
    Empty,
    /// A single character.
    Char(char),
    /// Covered by the wide character to the left.
    Continuation,
}

impl CellContent {
    /// The character, if this cell holds one.
    #[inline]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// RGBA color packed as `0xRRGGBBAA`. Alpha 0 means "terminal default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque RGB color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// True when the color defers to the terminal default.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }
}

bitflags::bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD          = 0b0000_0001;
        const DIM           = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const UNDERLINE     = 0b0000_1000;
        const REVERSE       = 0b0010_0000;
        const STRIKETHROUGH = 0b0100_0000;
    }
}

/// Style flags plus hyperlink id (0 = no link).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellAttrs {
    flags: StyleFlags,
    link_id: u32,
}

impl CellAttrs {
    pub const NONE: Self = Self {
        flags: StyleFlags::empty(),
        link_id: 0,
    };

    #[inline]
    pub const fn new(flags: StyleFlags, link_id: u32) -> Self {
        Self { flags, link_id }
    }

    #[inline]
    pub const fn flags(self) -> StyleFlags {
        self.flags
    }

    #[inline]
    pub const fn link_id(self) -> u32 {
        self.link_id
    }

    /// Add `flags` to the existing flags.
    #[inline]
    pub fn with_flags(self, flags: StyleFlags) -> Self {
        Self {
            flags: self.flags | flags,
            link_id: self.link_id,
        }
    }

    #[inline]
    pub const fn with_link(self, link_id: u32) -> Self {
        Self {
            flags: self.flags,
            link_id,
        }
    }

    #[inline]
    pub fn has_flag(self, flag: StyleFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// One grid position: content, colors, attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub content: CellContent,
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub attrs: CellAttrs,
}

impl Cell {
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        attrs: CellAttrs::NONE,
    };

    /// Cell holding `c` with default colors.
    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self {
            content: CellContent::Char(c),
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            attrs: CellAttrs::NONE,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }

    /// Same cell with a hyperlink attached.
    #[inline]
    pub const fn with_link(mut self, link_id: u32) -> Self {
        self.attrs = self.attrs.with_link(link_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_channels_round_trip() {
        let c = PackedRgba::rgba(1, 2, 3, 4);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (1, 2, 3, 4));
        assert!(PackedRgba::TRANSPARENT.is_transparent());
        assert!(!PackedRgba::BLACK.is_transparent());
    }

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.content.as_char(), None);
        assert_eq!(cell.attrs, CellAttrs::NONE);
    }

    #[test]
    fn attrs_accumulate_flags_and_keep_link() {
        let attrs = CellAttrs::NONE
            .with_link(7)
            .with_flags(StyleFlags::BOLD)
            .with_flags(StyleFlags::UNDERLINE);
        assert!(attrs.has_flag(StyleFlags::BOLD));
        assert!(attrs.has_flag(StyleFlags::UNDERLINE));
        assert_eq!(attrs.link_id(), 7);
    }

    #[test]
    fn with_link_sets_id() {
        let cell = Cell::from_char('x').with_link(3);
        assert_eq!(cell.attrs.link_id(), 3);
        assert_eq!(cell.content.as_char(), Some('x'));
    }
}
