#![forbid(unsafe_code)]

//! Scroll-to-top / scroll-to-bottom controls for a maximized log pane.
//!
//! The buttons never inspect the log pane directly. The pane's owner
//! publishes its scroll metrics and maximized flag through a
//! [`LogViewContext`]; [`LogScrollButtons`] subscribes on mount and drains
//! the context's change feed on every `sync`.
//!
//! ```
//! use tagflow_widgets::{LogScrollButtons, LogViewContext, ScrollMetrics};
//!
//! let mut ctx = LogViewContext::new();
//! let mut buttons = LogScrollButtons::new();
//! buttons.mount(&mut ctx);
//!
//! ctx.set_maximized(true);
//! ctx.set_metrics(ScrollMetrics::new(50, 200, 20));
//! buttons.sync(&mut ctx);
//! assert!(buttons.show_top());
//! assert!(buttons.show_bottom());
//! ```

use tagflow_core::event::Event;
use tagflow_core::feed::{ChangeFeed, SubId};
use tagflow_core::geometry::Rect;
use tagflow_render::cell::PackedRgba;
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;

use crate::tag::Tag;
use crate::{Widget, clear_area};

/// Rows of slack before a button appears.
pub const DEFAULT_SCROLL_THRESHOLD: usize = 5;

const TOP_LABEL: &str = "↑ Top";
const BOTTOM_LABEL: &str = "↓ Bottom";

/// Scroll position of a log viewport, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScrollMetrics {
    /// First visible row.
    pub offset: usize,
    pub content_height: usize,
    pub viewport_height: usize,
}

impl ScrollMetrics {
    pub const fn new(offset: usize, content_height: usize, viewport_height: usize) -> Self {
        Self {
            offset,
            content_height,
            viewport_height,
        }
    }

    pub const fn is_scrollable(&self) -> bool {
        self.content_height > self.viewport_height
    }

    /// Largest valid offset.
    pub const fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Rows hidden below the viewport.
    pub const fn rows_below(&self) -> usize {
        self.content_height
            .saturating_sub(self.offset)
            .saturating_sub(self.viewport_height)
    }

    /// Same metrics with `offset` clamped into range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset.min(self.max_offset()),
            ..self
        }
    }
}

/// A change published by [`LogViewContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogViewChange {
    TargetChanged(ScrollMetrics),
    MaximizedChanged(bool),
}

/// Shared state of the log pane, observed through an explicit feed.
#[derive(Debug, Default)]
pub struct LogViewContext {
    metrics: ScrollMetrics,
    maximized: bool,
    feed: ChangeFeed<LogViewChange>,
}

impl LogViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    /// Publishes [`LogViewChange::TargetChanged`] when `metrics` differ.
    pub fn set_metrics(&mut self, metrics: ScrollMetrics) {
        if self.metrics == metrics {
            return;
        }
        self.metrics = metrics;
        self.feed.publish_latest(LogViewChange::TargetChanged(metrics), |queued| {
            matches!(queued, LogViewChange::TargetChanged(_))
        });
    }

    /// Publishes [`LogViewChange::MaximizedChanged`] when the flag flips.
    pub fn set_maximized(&mut self, maximized: bool) {
        if self.maximized == maximized {
            return;
        }
        self.maximized = maximized;
        tagflow_core::debug!(maximized, "log view maximized changed");
        self.feed.publish_latest(LogViewChange::MaximizedChanged(maximized), |queued| {
            matches!(queued, LogViewChange::MaximizedChanged(_))
        });
    }

    pub fn toggle_maximized(&mut self) {
        self.set_maximized(!self.maximized);
    }

    pub fn subscribe(&mut self) -> SubId {
        self.feed.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubId) -> bool {
        self.feed.unsubscribe(id)
    }

    pub fn drain(&mut self, id: SubId) -> Vec<LogViewChange> {
        self.feed.drain(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }
}

/// Button pressed by the user; the log owner applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollRequest {
    Top,
    Bottom,
}

impl ScrollRequest {
    /// Offset this request scrolls to.
    pub fn target_offset(self, metrics: ScrollMetrics) -> usize {
        match self {
            ScrollRequest::Top => 0,
            ScrollRequest::Bottom => metrics.max_offset(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogScrollButtons {
    threshold: usize,
    style: Style,
    subscription: Option<SubId>,
    metrics: ScrollMetrics,
    maximized: bool,
}

impl Default for LogScrollButtons {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SCROLL_THRESHOLD,
            style: Style::new()
                .fg(PackedRgba::rgb(244, 244, 244))
                .bg(PackedRgba::rgb(15, 98, 254))
                .bold(),
            subscription: None,
            metrics: ScrollMetrics::default(),
            maximized: false,
        }
    }
}

impl LogScrollButtons {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_threshold(mut self, rows: usize) -> Self {
        self.threshold = rows;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe to `ctx` and take its current values. Mounting twice
    /// replaces the earlier subscription.
    pub fn mount(&mut self, ctx: &mut LogViewContext) {
        if let Some(old) = self.subscription.take() {
            ctx.unsubscribe(old);
        }
        self.subscription = Some(ctx.subscribe());
        self.metrics = ctx.metrics();
        self.maximized = ctx.is_maximized();
    }

    /// Apply pending changes from `ctx`. Returns `true` if any arrived.
    pub fn sync(&mut self, ctx: &mut LogViewContext) -> bool {
        let Some(id) = self.subscription else {
            return false;
        };
        let changes = ctx.drain(id);
        for change in &changes {
            match *change {
                LogViewChange::TargetChanged(metrics) => self.metrics = metrics,
                LogViewChange::MaximizedChanged(maximized) => self.maximized = maximized,
            }
        }
        !changes.is_empty()
    }

    pub fn unmount(&mut self, ctx: &mut LogViewContext) {
        if let Some(id) = self.subscription.take() {
            ctx.unsubscribe(id);
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn show_top(&self) -> bool {
        self.metrics.is_scrollable() && self.metrics.offset > self.threshold
    }

    pub fn show_bottom(&self) -> bool {
        self.metrics.is_scrollable() && self.metrics.rows_below() > self.threshold
    }

    /// Whether anything renders at all.
    pub fn is_visible(&self) -> bool {
        self.maximized && (self.show_top() || self.show_bottom())
    }

    /// Button rectangles inside `area`: top-right and bottom-right corners.
    pub fn layout(&self, area: Rect) -> (Option<Rect>, Option<Rect>) {
        if !self.maximized || area.is_empty() {
            return (None, None);
        }
        let place = |label: &str, y: u16| {
            let width = Tag::new(label).width().min(area.width);
            Rect::new(area.right() - width, y, width, 1)
        };
        let top = self.show_top().then(|| place(TOP_LABEL, area.y));
        let bottom = self
            .show_bottom()
            .then(|| place(BOTTOM_LABEL, area.bottom() - 1));
        match (top, bottom) {
            // One row: the bottom button wins.
            (Some(_), Some(b)) if area.height == 1 => (None, Some(b)),
            other => other,
        }
    }

    /// Map a click inside `area` onto a scroll request.
    pub fn handle_event(&self, event: &Event, area: Rect) -> Option<ScrollRequest> {
        let Event::Mouse(mouse) = event else {
            return None;
        };
        if !mouse.is_left_press() {
            return None;
        }
        let (top, bottom) = self.layout(area);
        if top.is_some_and(|r| r.contains(mouse.x, mouse.y)) {
            return Some(ScrollRequest::Top);
        }
        if bottom.is_some_and(|r| r.contains(mouse.x, mouse.y)) {
            return Some(ScrollRequest::Bottom);
        }
        None
    }
}

impl Widget for LogScrollButtons {
    fn render(&self, area: Rect, frame: &mut Frame) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "LogScrollButtons",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        let (top, bottom) = self.layout(area);
        for (rect, label) in [(top, TOP_LABEL), (bottom, BOTTOM_LABEL)] {
            if let Some(rect) = rect {
                clear_area(frame, rect, self.style);
                Tag::new(label).with_style(self.style).render(rect, frame);
            }
        }
    }
}
