use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row as TableRow, Table},
    Frame, Terminal,
};
use std::time::{Duration, Instant};
use tracing::info;

use grid_plugins::config::Config;
use grid_plugins::persist::Persist;
use grid_plugins::plugins::QuickFilterAction;
use grid_plugins::utils::logging::LogRingBuffer;
use grid_plugins::{CellBody, Grid, HiddenColumns, QuickFilter};

/// How often the loop wakes up to let the quick filter fire
const TICK: Duration = Duration::from_millis(50);

pub struct GridApp {
    grid: Grid<CellBody>,
    hidden: HiddenColumns,
    quick_filter: QuickFilter,
    persist: Option<Box<dyn Persist>>,
    logs: LogRingBuffer,
    /// Selected visible column
    selected: usize,
    status: String,
}

impl GridApp {
    pub fn new(
        grid: Grid<CellBody>,
        hidden: HiddenColumns,
        config: &Config,
        persist: Option<Box<dyn Persist>>,
        logs: LogRingBuffer,
    ) -> Self {
        Self {
            grid,
            hidden,
            quick_filter: QuickFilter::new(&config.quick_filter),
            persist,
            logs,
            selected: 0,
            status: "/ filter  1-9 toggle column  c show all  h/l select  </> move  q quit"
                .to_string(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            let body_width = terminal.size()?.width.saturating_sub(2);
            if body_width != self.grid.body_width() {
                self.grid.set_body_width(body_width);
                let _ = self.grid.refresh(true);
            }
            terminal.draw(|f| self.ui(f))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if !self.handle_key(key)? {
                        break;
                    }
                }
            }

            // Finished render passes need no follow-up in the demo
            let _ = self.quick_filter.poll(&mut self.grid, Instant::now());
        }
        self.save()
    }

    /// Returns false when the app should exit
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.quick_filter.is_focused() {
            match self.quick_filter.handle_key(key, Instant::now()) {
                QuickFilterAction::PassThrough => {}
                QuickFilterAction::Leave => self.status = "Left filter box".to_string(),
                QuickFilterAction::Continue | QuickFilterAction::Scheduled => return Ok(true),
            }
        }

        match key.code {
            KeyCode::Char('q') => return Ok(false),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(false)
            }
            KeyCode::Char('/') => {
                self.quick_filter.focus();
                self.status = "Type to filter, Enter to apply now, Esc to leave".to_string();
            }
            KeyCode::Char('x') => {
                let _ = self.quick_filter.clear(&mut self.grid);
                self.status = "Filter cleared".to_string();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let n = c as usize - '1' as usize;
                self.toggle_column(n)?;
            }
            KeyCode::Char('c') => {
                let _ = self.hidden.clear(&mut self.grid);
                self.status = "Showing all columns".to_string();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.selected + 1 < self.grid.column_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('<') => {
                let len = self.grid.column_count();
                if self.grid.move_column_left(self.selected) {
                    self.selected = if self.selected == 0 {
                        len - 1
                    } else {
                        self.selected - 1
                    };
                }
                self.dispatch_events()?;
            }
            KeyCode::Char('>') => {
                let len = self.grid.column_count();
                if self.grid.move_column_right(self.selected) {
                    self.selected = (self.selected + 1) % len;
                }
                self.dispatch_events()?;
            }
            _ => {}
        }
        Ok(true)
    }

    /// Toggle the n-th remembered column, hidden ones included
    fn toggle_column(&mut self, n: usize) -> Result<()> {
        let ids = self.hidden.ordered_ids(&self.grid);
        let Some(id) = ids.get(n) else {
            return Ok(());
        };
        let _ = self.hidden.toggle(&mut self.grid, id)?;
        self.selected = self
            .selected
            .min(self.grid.column_count().saturating_sub(1));
        self.status = if self.hidden.is_hidden(&self.grid, id) {
            format!("Hid '{}'", id)
        } else {
            format!("Showed '{}'", id)
        };
        Ok(())
    }

    fn dispatch_events(&mut self) -> Result<()> {
        for event in self.grid.drain_events() {
            self.hidden.handle_event(&self.grid, &event)?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if let Some(persist) = self.persist.as_deref_mut() {
            self.hidden.save(&self.grid, persist)?;
            info!(target: "app", "Saved hidden columns");
        }
        Ok(())
    }

    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.quick_filter.render(f, chunks[0], Instant::now());
        self.render_grid(f, chunks[1]);
        self.render_logs(f, chunks[2]);

        let hidden = self.hidden.get(&self.grid);
        let status = Line::from(vec![
            Span::styled(&self.status, Style::default().fg(Color::Cyan)),
            Span::raw(format!("  hidden: [{}]", hidden.join(", "))),
        ]);
        f.render_widget(Paragraph::new(status), chunks[3]);
    }

    fn render_grid(&self, f: &mut Frame, area: Rect) {
        let body = self.grid.body();
        let header = TableRow::new(body.header().iter().enumerate().map(|(i, h)| {
            let style = if i == self.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Span::styled(h.label.clone(), style)
        }));
        let widths: Vec<Constraint> = body
            .header()
            .iter()
            .map(|h| Constraint::Length(h.width))
            .collect();
        let rows = body
            .rendered_rows()
            .into_iter()
            .map(|cells| TableRow::new(cells.into_iter().map(|c| c.text.clone())));

        let title = format!(
            "Grid ({} of {} rows, {} of {} columns)",
            body.row_count(),
            self.grid.rows().len(),
            self.grid.column_count(),
            self.grid.total_column_count()
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(table, area);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .logs
            .get_recent(area.height.saturating_sub(2) as usize)
            .into_iter()
            .map(|entry| Line::from(entry.format_for_display()))
            .collect();
        let widget =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(widget, area);
    }
}
