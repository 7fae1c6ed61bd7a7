//! Quick filter box.
//!
//! Filters the grid on "any filterable column contains the text" while the
//! user types, after a quiet period. Enter filters right away. When the host
//! has a filter bar the request goes there instead.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::config::config::QuickFilterConfig;
use crate::filter::{self, FilterBar, FilterCondition, FilterExpr, FilterRule};
use crate::grid::body::GridBody;
use crate::grid::refresh::Refresh;
use crate::grid::Grid;
use crate::utils::debouncer::Debouncer;

/// What the quick filter forwards to
pub trait FilterHost {
    /// Ids of visible columns taking part in quick filtering
    fn filterable_columns(&self) -> Vec<String>;

    fn filter_bar(&mut self) -> Option<&mut (dyn FilterBar + 'static)>;

    fn set_filter(&mut self, filter: Option<FilterExpr>) -> Refresh;
}

impl<B: GridBody> FilterHost for Grid<B> {
    fn filterable_columns(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|col| col.filterable)
            .map(|col| col.id.clone())
            .collect()
    }

    fn filter_bar(&mut self) -> Option<&mut (dyn FilterBar + 'static)> {
        self.filter_bar_mut()
    }

    fn set_filter(&mut self, filter: Option<FilterExpr>) -> Refresh {
        Grid::set_filter(self, filter)
    }
}

/// Result of handling a key in the quick filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickFilterAction {
    /// Key consumed, nothing scheduled
    Continue,
    /// A filter application is pending
    Scheduled,
    /// User pressed Esc to leave the box
    Leave,
    /// Pass the key through to parent handler
    PassThrough,
}

pub struct QuickFilter {
    input: Input,
    debouncer: Debouncer,
    auto_apply: bool,
    focused: bool,
}

impl Default for QuickFilter {
    fn default() -> Self {
        Self::new(&QuickFilterConfig::default())
    }
}

impl QuickFilter {
    pub fn new(config: &QuickFilterConfig) -> Self {
        Self {
            input: Input::default(),
            debouncer: Debouncer::new(config.delay_ms),
            auto_apply: config.auto_apply,
            focused: false,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input = Input::default().with_value(value.into());
    }

    /// The box holds text, i.e. a filter is (or is about to be) in effect
    pub fn is_active(&self) -> bool {
        !self.input.value().is_empty()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_remaining(now)
    }

    /// Handle a key while the box has focus
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> QuickFilterAction {
        if !self.focused {
            return QuickFilterAction::PassThrough;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => QuickFilterAction::PassThrough,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                QuickFilterAction::PassThrough
            }
            KeyCode::Esc => {
                self.blur();
                QuickFilterAction::Leave
            }
            KeyCode::Enter => {
                self.debouncer.schedule_in(now, Duration::ZERO);
                QuickFilterAction::Scheduled
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                if self.auto_apply {
                    // Replaces any pending application
                    self.debouncer.schedule(now);
                    trace!(target: "quick_filter", "Scheduled filter for '{}'", self.value());
                    QuickFilterAction::Scheduled
                } else {
                    QuickFilterAction::Continue
                }
            }
        }
    }

    /// Apply the pending filter if its quiet period has passed.
    /// Call this from the event loop.
    pub fn poll<H: FilterHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> Option<Refresh> {
        if self.debouncer.fire_if_due(now) {
            Some(self.apply(host))
        } else {
            None
        }
    }

    /// Filter with the current text now, cancelling anything pending
    pub fn apply<H: FilterHost + ?Sized>(&mut self, host: &mut H) -> Refresh {
        self.debouncer.cancel();
        let text = self.input.value().to_string();

        if let Some(bar) = host.filter_bar() {
            debug!(target: "quick_filter", "Delegating '{}' to filter bar", text);
            if text.is_empty() {
                bar.clear_filter(true);
            } else {
                bar.apply_filter(FilterRule {
                    conditions: vec![FilterCondition {
                        condition: "contain".to_string(),
                        value: text,
                    }],
                });
            }
            return Refresh::ready();
        }

        let expr = if text.is_empty() {
            None
        } else {
            Some(filter::or(host.filterable_columns().into_iter().map(|id| {
                filter::contain(filter::column(id), filter::value(text.as_str()))
            })))
        };
        debug!(target: "quick_filter", "Applying quick filter '{}'", text);
        host.set_filter(expr)
    }

    /// Hand over to the host's filter bar, if it has one.
    /// Returns false when there is no bar to open.
    pub fn show_filter_bar<H: FilterHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match host.filter_bar() {
            Some(bar) => {
                debug!(target: "quick_filter", "Opening filter bar");
                self.blur();
                bar.show();
                true
            }
            None => false,
        }
    }

    /// Empty the box and drop the filter
    pub fn clear<H: FilterHost + ?Sized>(&mut self, host: &mut H) -> Refresh {
        self.input.reset();
        self.apply(host)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, now: Instant) {
        let mut title = String::from("Quick Filter");
        if self.is_active() {
            title.push_str(" [active]");
        }
        if self.debouncer.time_remaining(now).is_some() {
            title.push_str(" (typing...)");
        }

        let style = if self.focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style);
        let widget = Paragraph::new(self.input.value()).block(block).style(style);
        f.render_widget(widget, area);

        if self.focused {
            let cursor = u16::try_from(self.input.cursor()).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(cursor).saturating_add(1);
            f.set_cursor_position((x, area.y.saturating_add(1)));
        }
    }
}
