#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Widgets consume these types instead of backend events so they can be
//! driven from tests without a terminal. Mouse coordinates are 0-indexed.
//! `KeyEventKind` defaults to `Press` when the terminal cannot tell.

use bitflags::bitflags;
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Terminal was resized.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// Pasted text (bracketed paste).
    Paste(String),

    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
}

impl Event {
    /// Convert a crossterm event. Returns `None` for keys with no mapping.
    #[must_use]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(mouse) => Some(Event::Mouse(map_mouse_event(mouse))),
            cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
            cte::Event::Paste(text) => Some(Event::Paste(text)),
            cte::Event::FocusGained => Some(Event::Focus(true)),
            cte::Event::FocusLost => Some(Event::Focus(false)),
        }
    }

    /// Shorthand for a plain key press.
    #[must_use]
    pub const fn key(code: KeyCode) -> Self {
        Event::Key(KeyEvent::new(code))
    }

    /// Shorthand for a left-button press at `(x, y)`.
    #[must_use]
    pub const fn click(x: u16, y: u16) -> Self {
        Event::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            x,
            y,
        ))
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// True for presses and auto-repeats, false for releases.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Super/Meta/Command.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Column, 0-indexed.
    pub x: u16,
    /// Row, 0-indexed.
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// True for a left-button press.
    #[must_use]
    pub const fn is_left_press(&self) -> bool {
        matches!(self.kind, MouseEventKind::Down(MouseButton::Left))
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    let kind = match event.kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    };
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind,
    })
}

fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::Insert => Some(KeyCode::Insert),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.intersects(
        cte::KeyModifiers::SUPER | cte::KeyModifiers::HYPER | cte::KeyModifiers::META,
    ) {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

fn map_mouse_event(event: cte::MouseEvent) -> MouseEvent {
    let kind = match event.kind {
        cte::MouseEventKind::Down(button) => MouseEventKind::Down(map_mouse_button(button)),
        cte::MouseEventKind::Up(button) => MouseEventKind::Up(map_mouse_button(button)),
        cte::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_mouse_button(button)),
        cte::MouseEventKind::Moved => MouseEventKind::Moved,
        cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        cte::MouseEventKind::ScrollLeft => MouseEventKind::ScrollLeft,
        cte::MouseEventKind::ScrollRight => MouseEventKind::ScrollRight,
    };
    MouseEvent {
        kind,
        x: event.column,
        y: event.row,
        modifiers: map_modifiers(event.modifiers),
    }
}

fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}
