#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] enters raw mode on construction and restores the
//! terminal when dropped, including during panic unwinding and on
//! SIGINT/SIGTERM (Unix). Each optional mode is tracked so that only what
//! was enabled gets disabled, in reverse order:
//!
//! 1. bracketed paste
//! 2. mouse capture
//! 3. show cursor (always)
//! 4. alternate screen
//! 5. raw mode (always)

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crate::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Which terminal modes a session enables. All default to `false`.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer.
    pub alternate_screen: bool,
    /// Report mouse presses, drags and wheel events.
    pub mouse_capture: bool,
    /// Deliver pastes as a single [`Event::Paste`].
    pub bracketed_paste: bool,
}

/// Owns raw mode and the enabled terminal modes for its lifetime.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    bracketed_paste_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any requested mode cannot be enabled.
    /// Modes enabled before the failure are restored by `Drop`.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        crate::info!("terminal raw mode enabled");

        let mut session = Self {
            options: options.clone(),
            alternate_screen_enabled: false,
            mouse_enabled: false,
            bracketed_paste_enabled: false,
            #[cfg(unix)]
            signal_guard: None,
        };

        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            crate::info!("alternate screen enabled");
        }

        if options.mouse_capture {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            crate::info!("mouse capture enabled");
        }

        if options.bracketed_paste {
            crossterm::execute!(stdout, crossterm::event::EnableBracketedPaste)?;
            session.bracketed_paste_enabled = true;
            crate::info!("bracketed paste enabled");
        }

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input. `Ok(true)` means an event is ready.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next event, blocking until one arrives.
    ///
    /// Returns `Ok(None)` for input with no canonical mapping.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(Event::from_crossterm(event))
    }

    /// The options this session was created with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.bracketed_paste_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableBracketedPaste);
            self.bracketed_paste_enabled = false;
            crate::info!("bracketed paste disabled");
        }

        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
            crate::info!("mouse capture disabled");
        }

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            crate::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        crate::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableBracketedPaste);
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                crate::warn!(signal, "termination signal received, restoring terminal");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
