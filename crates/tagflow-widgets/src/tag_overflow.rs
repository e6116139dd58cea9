#![forbid(unsafe_code)]

//! Overflow tag filter.
//!
//! Shows the first `max_visible` labels inline as chips followed by a
//! `+N` button. The button opens a popover with the next `max_overflow`
//! labels and, when more remain, a `+M` button that opens a searchable
//! modal over the complete label set.
//!
//! [`TagOverflowState`] owns the labels, the disclosure state, the search
//! query, keyboard focus, and the hit regions of the last render.
//! [`TagOverflow`] is the stateless renderer.
//!
//! ```
//! use tagflow_core::geometry::Rect;
//! use tagflow_render::frame::Frame;
//! use tagflow_widgets::{StatefulWidget, TagOverflow, TagOverflowState};
//!
//! let labels: Vec<(String, String)> =
//!     (1..=10).map(|i| (format!("tag{i}"), format!("value{i}"))).collect();
//! let mut state = TagOverflowState::new(labels.into_iter().collect::<tagflow_labels::LabelSet>());
//! let mut frame = Frame::new(80, 24);
//! TagOverflow::new().render(Rect::new(0, 0, 80, 24), &mut frame, &mut state);
//! assert!(frame.buffer.row_text(0).contains("+8"));
//! ```
//!
//! # Invariants
//!
//! 1. With `hidden_count == 0` no button renders and the disclosure stays
//!    `Collapsed`.
//! 2. `ModalOpen` is only entered from `OverflowOpen` with a non-empty
//!    remaining tier.
//! 3. Activating a tag never changes whether the modal is open.

use std::fmt;

use tagflow_core::event::{Event, KeyCode, KeyEvent};
use tagflow_core::geometry::Rect;
use tagflow_labels::{
    FilterQuery, LabelPair, LabelSet, LinkContext, LinkResolver, PartitionView, Thresholds,
    compute_filtered_view, compute_partition, filter_indices,
};
use tagflow_render::cell::PackedRgba;
use tagflow_render::frame::Frame;
use tagflow_render::style::Style;

use crate::block::Block;
use crate::search_input::{InputOutcome, SearchInput};
use crate::tag::Tag;
use crate::{StatefulWidget, Widget, clear_area, draw_text_span};

/// Title of the all-tags modal.
pub const MODAL_TITLE: &str = "All Tags";
/// Placeholder shown in the empty search field.
pub const SEARCH_PLACEHOLDER: &str = "Search for a tag";
const MODAL_HINT: &str = "↑↓ select  Enter open  Esc close";
const NO_MATCHES: &str = "No matching tags";

type TagClickHandler = Box<dyn FnMut(&str, &str)>;

/// Behavior and styling of the overflow filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOverflowConfig {
    pub thresholds: Thresholds,
    /// Collapse an open popover when a tag is activated.
    pub close_overflow_on_tag_click: bool,
    /// Clear the search query when the modal closes.
    pub reset_search_on_modal_close: bool,
    pub chip_style: Style,
    pub button_style: Style,
    /// Patched over the chip or button style of the focused item.
    pub focus_style: Style,
    /// Background of the popover and modal.
    pub surface_style: Style,
    pub hint_style: Style,
}

impl Default for TagOverflowConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            close_overflow_on_tag_click: true,
            reset_search_on_modal_close: false,
            chip_style: Style::new()
                .fg(PackedRgba::rgb(244, 244, 244))
                .bg(PackedRgba::rgb(57, 57, 57)),
            button_style: Style::new()
                .fg(PackedRgba::rgb(120, 169, 255))
                .bg(PackedRgba::rgb(38, 38, 38))
                .bold(),
            focus_style: Style::new().reverse(),
            surface_style: Style::new().bg(PackedRgba::rgb(22, 22, 22)),
            hint_style: Style::new().dim(),
        }
    }
}

impl TagOverflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.thresholds.max_visible = max_visible;
        self
    }

    #[must_use]
    pub fn with_max_overflow(mut self, max_overflow: usize) -> Self {
        self.thresholds.max_overflow = max_overflow;
        self
    }

    #[must_use]
    pub fn close_overflow_on_tag_click(mut self, close: bool) -> Self {
        self.close_overflow_on_tag_click = close;
        self
    }

    #[must_use]
    pub fn reset_search_on_modal_close(mut self, reset: bool) -> Self {
        self.reset_search_on_modal_close = reset;
        self
    }

    #[must_use]
    pub fn with_chip_style(mut self, style: Style) -> Self {
        self.chip_style = style;
        self
    }

    #[must_use]
    pub fn with_button_style(mut self, style: Style) -> Self {
        self.button_style = style;
        self
    }

    #[must_use]
    pub fn with_focus_style(mut self, style: Style) -> Self {
        self.focus_style = style;
        self
    }

    #[must_use]
    pub fn with_surface_style(mut self, style: Style) -> Self {
        self.surface_style = style;
        self
    }
}

/// Which surface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disclosure {
    #[default]
    Collapsed,
    OverflowOpen,
    ModalOpen,
}

/// What a rendered region maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// A tag chip, by index into the label set.
    Tag(usize),
    /// The inline `+N` button.
    OverflowButton,
    /// The `+M` button at the bottom of the popover.
    MoreButton,
    SearchInput,
}

/// Outcome of an event handled by [`TagOverflowState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOverflowAction {
    /// A tag was clicked; `link` is the resolved target, if any.
    Activated {
        pair: LabelPair,
        link: Option<String>,
    },
    /// The popover opened (`true`) or closed (`false`).
    OverflowToggled(bool),
    ModalOpened,
    ModalClosed,
    /// The search query changed to the contained value.
    QueryChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HitRegion {
    area: Rect,
    target: HitTarget,
}

/// Tier sizes of the current partition.
#[derive(Debug, Clone, Copy)]
struct Tiers {
    visible: usize,
    overflow: usize,
    remaining: usize,
    hidden: usize,
}

impl Tiers {
    fn inline_len(&self) -> usize {
        self.visible + usize::from(self.hidden > 0)
    }

    fn popover_len(&self) -> usize {
        self.overflow + usize::from(self.remaining > 0)
    }
}

/// Rows a clipped popover actually drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PopoverRows {
    tags: usize,
    more: bool,
}

pub struct TagOverflowState {
    labels: LabelSet,
    config: TagOverflowConfig,
    disclosure: Disclosure,
    search: SearchInput,
    /// Indices into `labels` matching the current query.
    filtered: Vec<usize>,
    inline_focus: usize,
    /// `Some` while keyboard focus is inside the popover.
    popover_focus: Option<usize>,
    /// Selected position within `filtered`.
    selected: usize,
    modal_scroll: usize,
    focused: bool,
    on_tag_click: Option<TagClickHandler>,
    link_resolver: Option<Box<dyn LinkResolver>>,
    link_context: LinkContext,
    hits: Vec<HitRegion>,
    popover_area: Option<Rect>,
    /// What the last render fit into the popover.
    popover_rows: Option<PopoverRows>,
    modal_area: Option<Rect>,
}

impl fmt::Debug for TagOverflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagOverflowState")
            .field("labels", &self.labels.len())
            .field("config", &self.config)
            .field("disclosure", &self.disclosure)
            .field("query", &self.search.value())
            .field("filtered", &self.filtered.len())
            .field("focused", &self.focused)
            .field("has_click_handler", &self.on_tag_click.is_some())
            .field("has_link_resolver", &self.link_resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl TagOverflowState {
    pub fn new(labels: impl Into<LabelSet>) -> Self {
        Self::with_config(labels, TagOverflowConfig::default())
    }

    pub fn with_config(labels: impl Into<LabelSet>, config: TagOverflowConfig) -> Self {
        let labels = labels.into();
        let filtered = (0..labels.len()).collect();
        Self {
            labels,
            config,
            disclosure: Disclosure::Collapsed,
            search: SearchInput::new()
                .with_placeholder(SEARCH_PLACEHOLDER)
                .with_style(config.surface_style)
                .with_placeholder_style(config.hint_style),
            filtered,
            inline_focus: 0,
            popover_focus: None,
            selected: 0,
            modal_scroll: 0,
            focused: true,
            on_tag_click: None,
            link_resolver: None,
            link_context: LinkContext::default(),
            hits: Vec::new(),
            popover_area: None,
            popover_rows: None,
            modal_area: None,
        }
    }

    /// Called with `(key, value)` whenever a tag is activated.
    #[must_use]
    pub fn on_tag_click(mut self, handler: impl FnMut(&str, &str) + 'static) -> Self {
        self.set_on_tag_click(handler);
        self
    }

    pub fn set_on_tag_click(&mut self, handler: impl FnMut(&str, &str) + 'static) {
        self.on_tag_click = Some(Box::new(handler));
    }

    #[must_use]
    pub fn with_link_resolver(mut self, resolver: impl LinkResolver + 'static) -> Self {
        self.set_link_resolver(resolver);
        self
    }

    pub fn set_link_resolver(&mut self, resolver: impl LinkResolver + 'static) {
        self.link_resolver = Some(Box::new(resolver));
    }

    #[must_use]
    pub fn with_link_context(mut self, ctx: LinkContext) -> Self {
        self.link_context = ctx;
        self
    }

    pub fn set_link_context(&mut self, ctx: LinkContext) {
        self.link_context = ctx;
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn config(&self) -> &TagOverflowConfig {
        &self.config
    }

    pub fn disclosure(&self) -> Disclosure {
        self.disclosure
    }

    pub fn is_overflow_open(&self) -> bool {
        self.disclosure == Disclosure::OverflowOpen
    }

    pub fn is_modal_open(&self) -> bool {
        self.disclosure == Disclosure::ModalOpen
    }

    pub fn search_query(&self) -> &str {
        self.search.value()
    }

    pub fn partition(&self) -> PartitionView<'_> {
        compute_partition(&self.labels, self.config.thresholds)
    }

    pub fn hidden_count(&self) -> usize {
        self.tiers().hidden
    }

    /// Labels matching the current query, in label order.
    pub fn filtered_view(&self) -> LabelSet {
        compute_filtered_view(&self.labels, self.search.value())
    }

    pub fn filtered_pairs(&self) -> impl Iterator<Item = &LabelPair> + '_ {
        self.filtered.iter().filter_map(|&i| self.labels.get(i))
    }

    /// The highlighted row of the modal list.
    pub fn selected(&self) -> Option<&LabelPair> {
        self.filtered
            .get(self.selected)
            .and_then(|&i| self.labels.get(i))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Give or take keyboard focus. Unfocused state draws no focus marker.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.search.set_focused(focused && self.is_modal_open());
    }

    /// Replace the labels. Focus is clamped and a surface whose control
    /// no longer exists is closed.
    pub fn set_labels(&mut self, labels: impl Into<LabelSet>) {
        self.labels = labels.into();
        self.reconcile();
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.config.thresholds = thresholds;
        self.reconcile();
    }

    /// Open or close the popover. Returns `false` when there is no `+N`
    /// button or the modal is open.
    pub fn toggle_overflow(&mut self) -> bool {
        if self.tiers().hidden == 0 {
            return false;
        }
        match self.disclosure {
            Disclosure::Collapsed => {
                self.disclosure = Disclosure::OverflowOpen;
                self.popover_focus = Some(0);
            }
            Disclosure::OverflowOpen => {
                self.disclosure = Disclosure::Collapsed;
                self.popover_focus = None;
            }
            Disclosure::ModalOpen => return false,
        }
        tagflow_core::debug!(open = self.is_overflow_open(), "overflow toggled");
        true
    }

    /// Open the modal from an open popover with remaining labels.
    /// The search query is kept.
    pub fn open_modal(&mut self) -> bool {
        if self.disclosure != Disclosure::OverflowOpen || self.tiers().remaining == 0 {
            return false;
        }
        self.disclosure = Disclosure::ModalOpen;
        self.popover_focus = None;
        self.search.set_focused(self.focused);
        self.refilter();
        tagflow_core::debug!(query = self.search.value(), "modal opened");
        true
    }

    pub fn close_modal(&mut self) -> bool {
        if self.disclosure != Disclosure::ModalOpen {
            return false;
        }
        self.disclosure = Disclosure::Collapsed;
        self.search.set_focused(false);
        if self.config.reset_search_on_modal_close {
            self.search.clear();
            self.refilter();
        }
        tagflow_core::debug!("modal closed");
        true
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search.set_value(query);
        self.selected = 0;
        self.modal_scroll = 0;
        self.refilter();
    }

    /// Activate the label at `index`: run the click handler, resolve the
    /// link, and collapse an open popover when configured to.
    pub fn activate(&mut self, index: usize) -> Option<TagOverflowAction> {
        let pair = self.labels.get(index)?.clone();
        if let Some(handler) = self.on_tag_click.as_mut() {
            handler(&pair.key, &pair.value);
        }
        let link = self.resolve_link(&pair);
        if self.is_overflow_open() && self.config.close_overflow_on_tag_click {
            self.disclosure = Disclosure::Collapsed;
            self.popover_focus = None;
        }
        tagflow_core::debug!(key = %pair.key, value = %pair.value, linked = link.is_some(), "tag activated");
        Some(TagOverflowAction::Activated { pair, link })
    }

    /// Region under `(x, y)` in the last render, topmost first.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<HitTarget> {
        self.hits
            .iter()
            .rev()
            .find(|hit| hit.area.contains(x, y))
            .map(|hit| hit.target)
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<TagOverflowAction> {
        match event {
            Event::Mouse(mouse) if mouse.is_left_press() => self.handle_click(mouse.x, mouse.y),
            Event::Key(key) if key.is_press() => self.handle_key(key),
            Event::Paste(_) if self.is_modal_open() => self.edit_query(event),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<TagOverflowAction> {
        if self.is_modal_open() {
            return self.handle_modal_key(key);
        }
        match key.code {
            KeyCode::Left | KeyCode::BackTab => {
                self.move_inline(false);
                None
            }
            KeyCode::Right | KeyCode::Tab => {
                self.move_inline(true);
                None
            }
            KeyCode::Up => {
                self.move_popover(false);
                None
            }
            KeyCode::Down => {
                self.move_popover(true);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_focused(),
            KeyCode::Escape if self.is_overflow_open() => self
                .toggle_overflow()
                .then_some(TagOverflowAction::OverflowToggled(false)),
            _ => None,
        }
    }

    fn handle_modal_key(&mut self, key: &KeyEvent) -> Option<TagOverflowAction> {
        match key.code {
            KeyCode::Escape => self.close_modal().then_some(TagOverflowAction::ModalClosed),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.filtered.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                let index = *self.filtered.get(self.selected)?;
                self.activate(index)
            }
            _ => self.edit_query(&Event::Key(*key)),
        }
    }

    fn edit_query(&mut self, event: &Event) -> Option<TagOverflowAction> {
        match self.search.handle_event(event) {
            InputOutcome::Edited => {
                self.selected = 0;
                self.modal_scroll = 0;
                self.refilter();
                Some(TagOverflowAction::QueryChanged(self.search.value().to_owned()))
            }
            InputOutcome::Moved | InputOutcome::Ignored => None,
        }
    }

    fn handle_click(&mut self, x: u16, y: u16) -> Option<TagOverflowAction> {
        let target = self.hit_test(x, y);

        if self.is_modal_open() {
            if !self.modal_area.is_some_and(|area| area.contains(x, y)) {
                return self.close_modal().then_some(TagOverflowAction::ModalClosed);
            }
            let Some(HitTarget::Tag(index)) = target else {
                return None;
            };
            if let Some(pos) = self.filtered.iter().position(|&i| i == index) {
                self.selected = pos;
            }
            return self.activate(index);
        }

        match target {
            Some(HitTarget::Tag(index)) => self.activate(index),
            Some(HitTarget::OverflowButton) => self
                .toggle_overflow()
                .then(|| TagOverflowAction::OverflowToggled(self.is_overflow_open())),
            Some(HitTarget::MoreButton) => self.open_modal().then_some(TagOverflowAction::ModalOpened),
            Some(HitTarget::SearchInput) => None,
            None => {
                let inside = self.popover_area.is_some_and(|area| area.contains(x, y));
                if self.is_overflow_open() && !inside && self.toggle_overflow() {
                    Some(TagOverflowAction::OverflowToggled(false))
                } else {
                    None
                }
            }
        }
    }

    fn activate_focused(&mut self) -> Option<TagOverflowAction> {
        let tiers = self.tiers();
        if let (Disclosure::OverflowOpen, Some(pos)) = (self.disclosure, self.popover_focus) {
            if !self.popover_slots().contains(&pos) {
                return None;
            }
            if pos < tiers.overflow {
                return self.activate(tiers.visible + pos);
            }
            return self.open_modal().then_some(TagOverflowAction::ModalOpened);
        }
        if self.inline_focus < tiers.visible {
            return self.activate(self.inline_focus);
        }
        self.toggle_overflow()
            .then(|| TagOverflowAction::OverflowToggled(self.is_overflow_open()))
    }

    fn move_inline(&mut self, forward: bool) {
        let len = self.tiers().inline_len();
        self.popover_focus = None;
        if len == 0 {
            return;
        }
        self.inline_focus = if forward {
            (self.inline_focus + 1).min(len - 1)
        } else {
            self.inline_focus.saturating_sub(1)
        };
    }

    fn move_popover(&mut self, forward: bool) {
        if !self.is_overflow_open() {
            return;
        }
        let slots = self.popover_slots();
        let Some(&first) = slots.first() else {
            return;
        };
        let current = self
            .popover_focus
            .and_then(|pos| slots.iter().position(|&slot| slot == pos));
        self.popover_focus = Some(match current {
            None => first,
            Some(i) if forward => slots[(i + 1).min(slots.len() - 1)],
            Some(i) => slots[i.saturating_sub(1)],
        });
    }

    /// Focus positions the popover can hold: drawn tag rows, then the
    /// `+M` button at position `overflow`. Before the first render every
    /// position counts as drawn.
    fn popover_slots(&self) -> Vec<usize> {
        let tiers = self.tiers();
        let (tags, more) = match self.popover_rows {
            Some(rows) => (rows.tags.min(tiers.overflow), rows.more && tiers.remaining > 0),
            None => (tiers.overflow, tiers.remaining > 0),
        };
        let mut slots: Vec<usize> = (0..tags).collect();
        if more {
            slots.push(tiers.overflow);
        }
        slots
    }

    fn tiers(&self) -> Tiers {
        let view = self.partition();
        Tiers {
            visible: view.visible.len(),
            overflow: view.overflow.len(),
            remaining: view.remaining.len(),
            hidden: view.hidden_count,
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.labels, &FilterQuery::new(self.search.value()));
        self.selected = self.selected.min(self.filtered.len().saturating_sub(1));
    }

    fn reconcile(&mut self) {
        let tiers = self.tiers();
        self.inline_focus = self.inline_focus.min(tiers.inline_len().saturating_sub(1));
        match self.disclosure {
            Disclosure::OverflowOpen if tiers.hidden == 0 => {
                self.disclosure = Disclosure::Collapsed;
            }
            Disclosure::ModalOpen if tiers.remaining == 0 => {
                self.disclosure = Disclosure::Collapsed;
                self.search.set_focused(false);
            }
            _ => {}
        }
        let popover_len = tiers.popover_len();
        self.popover_focus = match self.popover_focus {
            Some(pos) if self.is_overflow_open() && popover_len > 0 => Some(pos.min(popover_len - 1)),
            _ => None,
        };
        self.refilter();
    }

    fn resolve_link(&self, pair: &LabelPair) -> Option<String> {
        self.link_resolver
            .as_ref()?
            .resolve(pair, &self.link_context)
    }

    /// Registers the resolved link of label `index` with the frame.
    fn link_id(&self, frame: &mut Frame, index: usize) -> u32 {
        self.labels
            .get(index)
            .and_then(|pair| self.resolve_link(pair))
            .map_or(0, |url| frame.register_link(&url))
    }

    fn push_hit(&mut self, area: Rect, target: HitTarget) {
        if !area.is_empty() {
            self.hits.push(HitRegion { area, target });
        }
    }
}

/// Renderer for [`TagOverflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOverflow {
    modal_width: u16,
    modal_height: u16,
}

impl Default for TagOverflow {
    fn default() -> Self {
        Self {
            modal_width: 60,
            modal_height: 16,
        }
    }
}

impl TagOverflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum modal size; it shrinks to fit smaller areas.
    #[must_use]
    pub fn modal_size(mut self, width: u16, height: u16) -> Self {
        self.modal_width = width;
        self.modal_height = height;
        self
    }

    /// Draws row 0. Returns the x of the `+N` button when one is drawn.
    fn render_inline(&self, area: Rect, frame: &mut Frame, state: &mut TagOverflowState) -> Option<u16> {
        let tiers = state.tiers();
        let cfg = state.config;
        let record = !state.is_modal_open();
        let focus = (state.focused && record && state.popover_focus.is_none())
            .then_some(state.inline_focus);
        let y = area.y;
        let right = area.right();

        let mut x = area.x;
        for i in 0..tiers.visible {
            if x >= right {
                break;
            }
            let text = state.labels[i].text();
            let link = state.link_id(frame, i);
            let style = if focus == Some(i) {
                cfg.chip_style.patch(cfg.focus_style)
            } else {
                cfg.chip_style
            };
            let tag = Tag::new(&text).with_style(style).with_link(link);
            let rect = Rect::new(x, y, tag.width().min(right - x), 1);
            tag.render(rect, frame);
            if record {
                state.push_hit(rect, HitTarget::Tag(i));
            }
            x = rect.right().saturating_add(1);
        }

        if tiers.hidden == 0 {
            return None;
        }
        let label = format!("+{}", tiers.hidden);
        let mut style = cfg.button_style;
        if focus == Some(tiers.visible) || state.is_overflow_open() {
            style = style.patch(cfg.focus_style);
        }
        let button = Tag::new(&label).with_style(style);
        let width = button.width().min(area.width);
        // The button stays on screen even when chips fill the row.
        let bx = if x.saturating_add(width) > right { right - width } else { x };
        let rect = Rect::new(bx, y, width, 1);
        clear_area(frame, rect, Style::new());
        button.render(rect, frame);
        if record {
            state.push_hit(rect, HitTarget::OverflowButton);
        }
        Some(bx)
    }

    fn render_popover(&self, area: Rect, anchor_x: u16, frame: &mut Frame, state: &mut TagOverflowState) {
        let tiers = state.tiers();
        let cfg = state.config;
        let texts: Vec<String> = state.labels[tiers.visible..tiers.visible + tiers.overflow]
            .iter()
            .map(LabelPair::text)
            .collect();
        let more = (tiers.remaining > 0).then(|| format!("+{}", tiers.remaining));

        let content_width = texts
            .iter()
            .chain(more.iter())
            .map(|t| Tag::new(t).width())
            .max()
            .unwrap_or(0);
        let rows = texts.len() + usize::from(more.is_some());
        let width = content_width.saturating_add(2).min(area.width);
        let height = u16::try_from(rows + 2)
            .unwrap_or(u16::MAX)
            .min(area.height.saturating_sub(1));
        if width < 3 || height < 3 {
            state.popover_rows = Some(PopoverRows { tags: 0, more: false });
            state.popover_focus = None;
            return;
        }

        let x = anchor_x.min(area.right() - width);
        let rect = Rect::new(x, area.y + 1, width, height);
        let block = Block::new().style(cfg.surface_style);
        block.render(rect, frame);
        state.popover_area = Some(rect);
        let inner = block.inner(rect);

        let tag_rows = if more.is_some() {
            (inner.height as usize - 1).min(texts.len())
        } else {
            (inner.height as usize).min(texts.len())
        };
        state.popover_rows = Some(PopoverRows {
            tags: tag_rows,
            more: more.is_some(),
        });
        // Focus on a clipped row moves to the nearest drawn slot above it.
        if let Some(pos) = state.popover_focus {
            let slots = state.popover_slots();
            if !slots.contains(&pos) {
                state.popover_focus = slots
                    .iter()
                    .rev()
                    .find(|&&slot| slot <= pos)
                    .or(slots.first())
                    .copied();
            }
        }
        let focus = if state.focused { state.popover_focus } else { None };

        for (row, text) in texts.iter().enumerate().take(tag_rows) {
            let index = tiers.visible + row;
            let link = state.link_id(frame, index);
            let style = if focus == Some(row) {
                cfg.chip_style.patch(cfg.focus_style)
            } else {
                cfg.chip_style
            };
            let line = inner.row(row as u16);
            let tag = Tag::new(text).with_style(style).with_link(link);
            let r = Rect::new(line.x, line.y, tag.width().min(line.width), 1);
            tag.render(r, frame);
            state.push_hit(r, HitTarget::Tag(index));
        }

        if let Some(label) = more {
            let style = if focus == Some(texts.len()) {
                cfg.button_style.patch(cfg.focus_style)
            } else {
                cfg.button_style
            };
            let line = inner.row(tag_rows as u16);
            let tag = Tag::new(&label).with_style(style);
            let r = Rect::new(line.x, line.y, tag.width().min(line.width), 1);
            tag.render(r, frame);
            state.push_hit(r, HitTarget::MoreButton);
        }
    }

    fn render_modal(&self, area: Rect, frame: &mut Frame, state: &mut TagOverflowState) {
        let cfg = state.config;
        let rect = area.centered(self.modal_width, self.modal_height);
        state.modal_area = Some(rect);

        let block = Block::new().title(MODAL_TITLE).style(cfg.surface_style);
        block.render(rect, frame);
        let inner = block.inner(rect);
        if inner.is_empty() {
            return;
        }

        let search_row = inner.row(0);
        state.search.render(search_row, frame);
        state.push_hit(search_row, HitTarget::SearchInput);

        let (list_height, hint_row) = if inner.height >= 3 {
            (inner.height as usize - 2, Some(inner.row(inner.height - 1)))
        } else {
            (inner.height as usize - 1, None)
        };
        if list_height > 0 {
            if state.selected < state.modal_scroll {
                state.modal_scroll = state.selected;
            } else if state.selected >= state.modal_scroll + list_height {
                state.modal_scroll = state.selected + 1 - list_height;
            }
            state.modal_scroll = state
                .modal_scroll
                .min(state.filtered.len().saturating_sub(list_height));
        }

        if state.filtered.is_empty() && list_height > 0 {
            let line = inner.row(1);
            draw_text_span(frame, line.x + 1, line.y, NO_MATCHES, cfg.hint_style, line.right(), 0);
        }

        let rows: Vec<usize> = state
            .filtered
            .iter()
            .skip(state.modal_scroll)
            .take(list_height)
            .copied()
            .collect();
        let selected = state.focused.then_some(state.selected);
        for (offset, index) in rows.into_iter().enumerate() {
            let position = state.modal_scroll + offset;
            let text = state.labels[index].text();
            let link = state.link_id(frame, index);
            let style = if selected == Some(position) {
                cfg.chip_style.patch(cfg.focus_style)
            } else {
                cfg.chip_style
            };
            let line = inner.row(1 + offset as u16);
            let tag = Tag::new(&text).with_style(style).with_link(link);
            let r = Rect::new(line.x, line.y, tag.width().min(line.width), 1);
            tag.render(r, frame);
            state.push_hit(r, HitTarget::Tag(index));
        }

        if let Some(line) = hint_row {
            draw_text_span(frame, line.x, line.y, MODAL_HINT, cfg.hint_style, line.right(), 0);
        }
    }
}

impl StatefulWidget for TagOverflow {
    type State = TagOverflowState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "TagOverflow",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        state.hits.clear();
        state.popover_area = None;
        state.popover_rows = None;
        state.modal_area = None;
        if area.is_empty() || state.labels.is_empty() {
            return;
        }

        let button_x = self.render_inline(area, frame, state);
        match state.disclosure {
            Disclosure::OverflowOpen => {
                if let Some(x) = button_x {
                    self.render_popover(area, x, frame, state);
                }
            }
            Disclosure::ModalOpen => self.render_modal(area, frame, state),
            Disclosure::Collapsed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn labels(n: usize) -> LabelSet {
        (1..=n)
            .map(|i| (format!("tag{i}"), format!("value{i}")))
            .collect()
    }

    fn render(state: &mut TagOverflowState) -> Frame {
        let mut frame = Frame::new(80, 24);
        TagOverflow::new().render(Rect::new(0, 0, 80, 24), &mut frame, state);
        frame
    }

    #[test]
    fn toggle_is_noop_without_hidden_labels() {
        let mut state = TagOverflowState::new(labels(2));
        assert!(!state.toggle_overflow());
        assert_eq!(state.disclosure(), Disclosure::Collapsed);
    }

    #[test]
    fn toggle_flips_popover() {
        let mut state = TagOverflowState::new(labels(4));
        assert!(state.toggle_overflow());
        assert!(state.is_overflow_open());
        assert!(state.toggle_overflow());
        assert!(!state.is_overflow_open());
    }

    #[test]
    fn modal_requires_open_popover_and_remaining() {
        let mut state = TagOverflowState::new(labels(10));
        assert!(!state.open_modal());
        state.toggle_overflow();
        assert!(state.open_modal());
        assert!(state.is_modal_open());
        assert!(!state.toggle_overflow());

        // 7 labels: nothing remains past the popover.
        let mut state = TagOverflowState::new(labels(7));
        state.toggle_overflow();
        assert!(!state.open_modal());
    }

    #[test]
    fn query_survives_reopen_by_default() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        state.set_search_query("tag1");
        assert!(state.close_modal());
        assert_eq!(state.search_query(), "tag1");
        state.toggle_overflow();
        state.open_modal();
        assert_eq!(state.filtered_pairs().count(), 2);
    }

    #[test]
    fn reset_search_on_close_when_configured() {
        let config = TagOverflowConfig::new().reset_search_on_modal_close(true);
        let mut state = TagOverflowState::with_config(labels(10), config);
        state.toggle_overflow();
        state.open_modal();
        state.set_search_query("tag1");
        state.close_modal();
        assert_eq!(state.search_query(), "");
        assert_eq!(state.filtered_pairs().count(), 10);
    }

    #[test]
    fn activate_runs_handler_and_closes_popover() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut state = TagOverflowState::new(labels(10)).on_tag_click(move |k, v| {
            sink.borrow_mut().push((k.to_owned(), v.to_owned()));
        });
        state.toggle_overflow();
        let action = state.activate(3);
        assert_eq!(
            action,
            Some(TagOverflowAction::Activated {
                pair: LabelPair::new("tag4", "value4"),
                link: None,
            })
        );
        assert_eq!(*seen.borrow(), vec![("tag4".to_owned(), "value4".to_owned())]);
        assert_eq!(state.disclosure(), Disclosure::Collapsed);
    }

    #[test]
    fn activate_keeps_popover_when_configured() {
        let config = TagOverflowConfig::new().close_overflow_on_tag_click(false);
        let mut state = TagOverflowState::with_config(labels(10), config);
        state.toggle_overflow();
        state.activate(0);
        assert!(state.is_overflow_open());
    }

    #[test]
    fn activate_in_modal_keeps_modal_open() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        assert!(state.activate(9).is_some());
        assert!(state.is_modal_open());
        assert!(state.activate(99).is_none());
    }

    #[test]
    fn link_resolver_result_is_reported() {
        let mut state = TagOverflowState::new(labels(3))
            .with_link_resolver(|p: &LabelPair, ctx: &LinkContext| {
                Some(format!("/{}/{}", ctx.namespace.as_deref().unwrap_or("-"), p.key))
            })
            .with_link_context(LinkContext::new().with_namespace("ci"));
        let Some(TagOverflowAction::Activated { link, .. }) = state.activate(0) else {
            panic!("expected activation");
        };
        assert_eq!(link.as_deref(), Some("/ci/tag1"));
    }

    #[test]
    fn keyboard_walks_inline_row_and_popover() {
        let mut state = TagOverflowState::new(labels(10));
        state.handle_event(&Event::key(KeyCode::Right));
        state.handle_event(&Event::key(KeyCode::Right));
        state.handle_event(&Event::key(KeyCode::Right));
        assert_eq!(
            state.handle_event(&Event::key(KeyCode::Enter)),
            Some(TagOverflowAction::OverflowToggled(true))
        );
        for _ in 0..10 {
            state.handle_event(&Event::key(KeyCode::Down));
        }
        assert_eq!(
            state.handle_event(&Event::key(KeyCode::Enter)),
            Some(TagOverflowAction::ModalOpened)
        );
        assert_eq!(
            state.handle_event(&Event::key(KeyCode::Escape)),
            Some(TagOverflowAction::ModalClosed)
        );
    }

    #[test]
    fn clipped_popover_skips_undrawn_rows() {
        let activated = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&activated);
        let mut state = TagOverflowState::new(labels(10))
            .on_tag_click(move |key, _| sink.borrow_mut().push(key.to_owned()));
        let area = Rect::new(0, 0, 80, 5);
        assert!(state.toggle_overflow());
        let mut frame = Frame::new(80, 5);
        TagOverflow::new().render(area, &mut frame, &mut state);
        // Only one overflow row fits above the `+3` button.
        assert!(frame.buffer.row_text(2).contains("tag3: value3"));
        assert!(frame.buffer.row_text(3).contains("+3"));
        assert!(!frame.buffer.to_text().contains("tag5"));

        state.handle_event(&Event::key(KeyCode::Down));
        state.handle_event(&Event::key(KeyCode::Down));
        assert_eq!(
            state.handle_event(&Event::key(KeyCode::Enter)),
            Some(TagOverflowAction::ModalOpened)
        );
        assert!(activated.borrow().is_empty());
    }

    #[test]
    fn shrinking_area_moves_focus_onto_drawn_row() {
        let mut state = TagOverflowState::new(labels(10));
        assert!(state.toggle_overflow());
        render(&mut state);
        for _ in 0..3 {
            state.handle_event(&Event::key(KeyCode::Down));
        }
        let mut frame = Frame::new(80, 5);
        TagOverflow::new().render(Rect::new(0, 0, 80, 5), &mut frame, &mut state);
        let Some(TagOverflowAction::Activated { pair, .. }) =
            state.handle_event(&Event::key(KeyCode::Enter))
        else {
            panic!("expected the drawn tag to activate");
        };
        assert_eq!(pair.key, "tag3");
    }

    #[test]
    fn escape_closes_popover() {
        let mut state = TagOverflowState::new(labels(4));
        state.toggle_overflow();
        assert_eq!(
            state.handle_event(&Event::key(KeyCode::Escape)),
            Some(TagOverflowAction::OverflowToggled(false))
        );
        assert_eq!(state.handle_event(&Event::key(KeyCode::Escape)), None);
    }

    #[test]
    fn typing_in_modal_filters() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        let mut last = None;
        for c in "TAG3".chars() {
            last = state.handle_event(&Event::key(KeyCode::Char(c)));
        }
        assert_eq!(last, Some(TagOverflowAction::QueryChanged("TAG3".into())));
        assert_eq!(state.selected(), Some(&LabelPair::new("tag3", "value3")));
        assert_eq!(state.filtered_view().len(), 1);
    }

    #[test]
    fn modal_enter_activates_selection() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        state.handle_event(&Event::key(KeyCode::Down));
        let Some(TagOverflowAction::Activated { pair, .. }) =
            state.handle_event(&Event::key(KeyCode::Enter))
        else {
            panic!("expected activation");
        };
        assert_eq!(pair.key, "tag2");
    }

    #[test]
    fn click_button_then_outside_collapses() {
        let mut state = TagOverflowState::new(labels(10));
        render(&mut state);
        let button = state
            .hits
            .iter()
            .find(|h| h.target == HitTarget::OverflowButton)
            .map(|h| h.area)
            .unwrap();
        assert_eq!(state.hit_test(button.x, 0), Some(HitTarget::OverflowButton));
        assert_eq!(
            state.handle_event(&Event::click(button.x, 0)),
            Some(TagOverflowAction::OverflowToggled(true))
        );
        render(&mut state);
        assert_eq!(
            state.handle_event(&Event::click(79, 23)),
            Some(TagOverflowAction::OverflowToggled(false))
        );
    }

    #[test]
    fn click_outside_modal_closes_it() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        render(&mut state);
        assert_eq!(
            state.handle_event(&Event::click(0, 0)),
            Some(TagOverflowAction::ModalClosed)
        );
        assert!(!state.is_modal_open());
    }

    #[test]
    fn click_tag_in_modal_activates() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        render(&mut state);
        let hit = state
            .hits
            .iter()
            .find(|h| h.target == HitTarget::Tag(4))
            .copied()
            .unwrap();
        let action = state.handle_event(&Event::click(hit.area.x, hit.area.y));
        assert!(matches!(action, Some(TagOverflowAction::Activated { ref pair, .. }) if pair.key == "tag5"));
        assert_eq!(state.selected().map(|p| p.key.as_str()), Some("tag5"));
    }

    #[test]
    fn set_labels_collapses_when_control_disappears() {
        let mut state = TagOverflowState::new(labels(10));
        state.toggle_overflow();
        state.open_modal();
        state.set_labels(labels(5));
        assert_eq!(state.disclosure(), Disclosure::Collapsed);

        state.toggle_overflow();
        state.set_labels(labels(1));
        assert_eq!(state.disclosure(), Disclosure::Collapsed);
        assert_eq!(state.hidden_count(), 0);
    }

    #[test]
    fn set_thresholds_repartitions() {
        let mut state = TagOverflowState::new(labels(10));
        state.set_thresholds(Thresholds::new(10, 0));
        assert_eq!(state.hidden_count(), 0);
        assert!(!state.toggle_overflow());
    }

    #[test]
    fn popover_with_zero_overflow_shows_only_more_button() {
        let config = TagOverflowConfig::new().with_max_overflow(0);
        let mut state = TagOverflowState::with_config(labels(4), config);
        state.toggle_overflow();
        let frame = render(&mut state);
        assert!(frame.buffer.row_text(2).contains("+2"));
        assert!(state.open_modal());
    }

    #[test]
    fn unfocused_state_reports_focus_flag() {
        let mut state = TagOverflowState::new(labels(3));
        state.set_focused(false);
        assert!(!state.is_focused());
        assert!(format!("{state:?}").contains("TagOverflowState"));
    }
}
