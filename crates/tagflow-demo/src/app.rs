#![forbid(unsafe_code)]

//! Demo application model.
//!
//! Row 0 holds the overflow tag filter. Below it an "Activity" pane
//! records every action the filter reports. Maximizing the pane hides the
//! tag row and enables the scroll-to-top / scroll-to-bottom buttons, which
//! track the pane through a [`LogViewContext`].

use tagflow_core::event::{Event, KeyCode, KeyEvent, MouseEventKind};
use tagflow_core::geometry::Rect;
use tagflow_labels::{LabelSelectorLinks, LabelSet, LinkContext};
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;
use tagflow_widgets::{
    Block, LogScrollButtons, LogViewContext, ScrollMetrics, ScrollRequest, StatefulWidget, Tag,
    TagOverflow, TagOverflowAction, TagOverflowConfig, TagOverflowState, Widget,
};

use crate::cli::Opts;

const PAGE_ROWS: usize = 10;

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Tags,
    Log,
}

/// What the event loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    tags: TagOverflowState,
    widget: TagOverflow,
    log: Vec<String>,
    log_offset: usize,
    /// Keep the newest line in view.
    follow: bool,
    view: LogViewContext,
    buttons: LogScrollButtons,
    focus: Pane,
    /// Inner area of the log pane in the last render.
    log_area: Rect,
}

impl App {
    pub fn new(labels: LabelSet, opts: &Opts) -> Self {
        let config = TagOverflowConfig::new()
            .with_thresholds(opts.thresholds)
            .close_overflow_on_tag_click(!opts.keep_overflow_open)
            .reset_search_on_modal_close(opts.reset_search);
        let ctx = match &opts.namespace {
            Some(ns) => LinkContext::new().with_namespace(ns.as_str()),
            None => LinkContext::new(),
        };
        let count = labels.len();
        let tags = TagOverflowState::with_config(labels, config)
            .on_tag_click(|key, value| tracing::info!(key, value, "tag clicked"))
            .with_link_resolver(LabelSelectorLinks::default())
            .with_link_context(ctx);

        let mut view = LogViewContext::new();
        let mut buttons = LogScrollButtons::new();
        buttons.mount(&mut view);

        let mut app = Self {
            tags,
            widget: TagOverflow::new(),
            log: Vec::new(),
            log_offset: 0,
            follow: true,
            view,
            buttons,
            focus: Pane::Tags,
            log_area: Rect::default(),
        };
        app.push_log(format!("loaded {count} labels"));
        app
    }

    pub fn tags(&self) -> &TagOverflowState {
        &self.tags
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn log_offset(&self) -> usize {
        self.log_offset
    }

    pub fn is_maximized(&self) -> bool {
        self.view.is_maximized()
    }

    pub fn scroll_buttons(&self) -> &LogScrollButtons {
        &self.buttons
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(line = %line, "activity");
        self.log.push(line);
        if self.follow {
            self.log_offset = self.metrics().max_offset();
        }
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.log_offset,
            self.log.len(),
            usize::from(self.log_area.height),
        )
    }

    fn scroll_to(&mut self, offset: usize) {
        let metrics = ScrollMetrics { offset, ..self.metrics() }.clamped();
        self.log_offset = metrics.offset;
        self.follow = metrics.offset == metrics.max_offset();
    }

    fn scroll_by(&mut self, delta: isize) {
        let offset = self.log_offset.saturating_add_signed(delta);
        self.scroll_to(offset);
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.view.set_maximized(maximized);
        if maximized {
            self.focus = Pane::Log;
        }
        self.push_log(if maximized { "log maximized" } else { "log restored" });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        frame.clear();
        let area = frame.bounds();
        if area.is_empty() {
            return;
        }
        let maximized = self.view.is_maximized();
        let body = Rect::new(area.x, area.y, area.width, area.height - 1);

        let log_outer = if maximized {
            body
        } else {
            Rect::new(
                body.x,
                body.y.saturating_add(2).min(body.bottom()),
                body.width,
                body.height.saturating_sub(2),
            )
        };
        let title = if maximized { "Activity (maximized)" } else { "Activity" };
        let mut block = Block::new().title(title);
        if self.focus == Pane::Log {
            block = block.border_style(Style::new().bold());
        }
        block.render(log_outer, frame);
        self.log_area = block.inner(log_outer);

        let mut metrics = self.metrics();
        if self.follow {
            metrics.offset = metrics.max_offset();
        }
        let metrics = metrics.clamped();
        self.log_offset = metrics.offset;

        for (row, line) in self
            .log
            .iter()
            .skip(metrics.offset)
            .take(metrics.viewport_height)
            .enumerate()
        {
            let rect = self.log_area.row(row as u16);
            Tag::new(line).with_padding(0, 0).render(rect, frame);
        }

        self.view.set_metrics(metrics);
        self.buttons.sync(&mut self.view);
        self.buttons.render(self.log_area, frame);

        let status = format!(
            " {} labels | {} hidden | focus: {:?} | Tab switch  m maximize  q quit",
            self.tags.labels().len(),
            self.tags.hidden_count(),
            self.focus,
        );
        Tag::new(&status)
            .with_padding(0, 0)
            .with_style(Style::new().dim())
            .render(area.row(area.height - 1), frame);

        if !maximized {
            self.tags.set_focused(self.focus == Pane::Tags);
            self.widget.render(body, frame, &mut self.tags);
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> Control {
        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key),
            Event::Mouse(_) => {
                self.handle_mouse(event);
                Control::Continue
            }
            Event::Paste(_) if self.focus == Pane::Tags => {
                self.forward_to_tags(event);
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Control {
        if key.ctrl() && key.is_char('c') {
            return Control::Quit;
        }
        // The search field owns printable keys while the modal is open.
        if !self.tags.is_modal_open() {
            match key.code {
                KeyCode::Char('q') => return Control::Quit,
                KeyCode::Tab | KeyCode::BackTab if !self.view.is_maximized() => {
                    self.focus = match self.focus {
                        Pane::Tags => Pane::Log,
                        Pane::Log => Pane::Tags,
                    };
                    return Control::Continue;
                }
                KeyCode::Char('m') => {
                    self.set_maximized(!self.view.is_maximized());
                    return Control::Continue;
                }
                _ => {}
            }
        }

        match self.focus {
            Pane::Tags => {
                self.forward_to_tags(&Event::Key(*key));
            }
            Pane::Log => self.scroll_key(key.code),
        }
        Control::Continue
    }

    fn scroll_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-(PAGE_ROWS as isize)),
            KeyCode::PageDown => self.scroll_by(PAGE_ROWS as isize),
            KeyCode::Home => self.scroll_to(0),
            KeyCode::End => self.scroll_to(usize::MAX),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, event: &Event) {
        let Event::Mouse(mouse) = event else {
            return;
        };
        if self.log_area.contains(mouse.x, mouse.y) {
            match mouse.kind {
                MouseEventKind::ScrollUp => return self.scroll_by(-3),
                MouseEventKind::ScrollDown => return self.scroll_by(3),
                _ => {}
            }
        }
        if self.view.is_maximized() {
            if let Some(request) = self.buttons.handle_event(event, self.log_area) {
                let target = request.target_offset(self.metrics());
                self.scroll_to(target);
                self.push_log(match request {
                    ScrollRequest::Top => "scrolled to top",
                    ScrollRequest::Bottom => "scrolled to bottom",
                });
            }
            return;
        }
        if mouse.is_left_press() && self.log_area.contains(mouse.x, mouse.y) && !self.tags.is_modal_open() {
            self.focus = Pane::Log;
        }
        if self.forward_to_tags(event) {
            self.focus = Pane::Tags;
        }
    }

    /// Returns `true` if the filter reported an action.
    fn forward_to_tags(&mut self, event: &Event) -> bool {
        let Some(action) = self.tags.handle_event(event) else {
            return false;
        };
        let line = describe(&action);
        self.push_log(line);
        true
    }
}

fn describe(action: &TagOverflowAction) -> String {
    match action {
        TagOverflowAction::Activated { pair, link: Some(link) } => {
            format!("open {} -> {link}", pair.text())
        }
        TagOverflowAction::Activated { pair, link: None } => format!("select {}", pair.text()),
        TagOverflowAction::OverflowToggled(true) => "overflow opened".to_owned(),
        TagOverflowAction::OverflowToggled(false) => "overflow closed".to_owned(),
        TagOverflowAction::ModalOpened => "all tags opened".to_owned(),
        TagOverflowAction::ModalClosed => "all tags closed".to_owned(),
        TagOverflowAction::QueryChanged(query) => format!("search \"{query}\""),
    }
}
