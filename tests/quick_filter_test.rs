// Quick filter driven by simulated key presses and explicit clock values

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use grid_plugins::config::config::QuickFilterConfig;
use grid_plugins::filter::{self, FilterBar, FilterExpr, FilterRule};
use grid_plugins::plugins::{FilterHost, QuickFilterAction};
use grid_plugins::{CellBody, ColumnDef, Grid, HiddenColumns, QuickFilter, Refresh, Row};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Records every filter the quick filter sets
#[derive(Default)]
struct RecordingHost {
    columns: Vec<String>,
    applied: Vec<Option<FilterExpr>>,
}

impl RecordingHost {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            applied: Vec::new(),
        }
    }
}

impl FilterHost for RecordingHost {
    fn filterable_columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn filter_bar(&mut self) -> Option<&mut (dyn FilterBar + 'static)> {
        None
    }

    fn set_filter(&mut self, filter: Option<FilterExpr>) -> Refresh {
        self.applied.push(filter);
        Refresh::ready()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BarCall {
    Apply(FilterRule),
    Clear(bool),
    Show,
}

struct RecordingBar {
    calls: Arc<Mutex<Vec<BarCall>>>,
}

impl FilterBar for RecordingBar {
    fn apply_filter(&mut self, rule: FilterRule) {
        self.calls.lock().unwrap().push(BarCall::Apply(rule));
    }

    fn clear_filter(&mut self, silent: bool) {
        self.calls.lock().unwrap().push(BarCall::Clear(silent));
    }

    fn show(&mut self) {
        self.calls.lock().unwrap().push(BarCall::Show);
    }
}

fn contains_any(columns: &[&str], text: &str) -> Option<FilterExpr> {
    Some(filter::or(
        columns
            .iter()
            .map(|c| filter::contain(filter::column(*c), filter::value(text))),
    ))
}

fn people_grid() -> Grid {
    let defs = vec![
        ColumnDef::new("name"),
        ColumnDef::new("city"),
        ColumnDef::new("notes").filterable(false),
    ];
    let mut grid = Grid::new(defs, CellBody::new()).unwrap();
    let _ = grid.set_rows(vec![
        Row::new("1")
            .with("name", "Alice")
            .with("city", "Leeds")
            .with("notes", "likes york"),
        Row::new("2")
            .with("name", "Bob")
            .with("city", "York")
            .with("notes", ""),
        Row::new("3")
            .with("name", "Carol")
            .with("city", "Bath")
            .with("notes", ""),
    ]);
    grid
}

#[test]
fn test_burst_of_keystrokes_applies_once() {
    let t0 = Instant::now();
    let mut qf = QuickFilter::default();
    let mut host = RecordingHost::new(&["name", "city"]);
    qf.focus();

    // Five keys, each well inside the 700ms quiet period of the last
    for (i, c) in "hello".chars().enumerate() {
        let now = t0 + ms(100 * i as u64);
        assert_eq!(qf.handle_key(key(c), now), QuickFilterAction::Scheduled);
        assert!(qf.poll(&mut host, now).is_none());
    }
    let last = t0 + ms(400);

    assert!(qf.poll(&mut host, last + ms(699)).is_none());
    assert!(host.applied.is_empty());

    assert!(qf.poll(&mut host, last + ms(700)).is_some());
    assert_eq!(host.applied, vec![contains_any(&["name", "city"], "hello")]);

    // Nothing further fires
    assert!(qf.poll(&mut host, last + ms(5000)).is_none());
    assert_eq!(host.applied.len(), 1);
}

#[test]
fn test_pause_between_keys_applies_twice() {
    let t0 = Instant::now();
    let mut qf = QuickFilter::default();
    let mut host = RecordingHost::new(&["name"]);
    qf.focus();

    qf.handle_key(key('a'), t0);
    assert!(qf.poll(&mut host, t0 + ms(800)).is_some());
    qf.handle_key(key('b'), t0 + ms(900));
    assert!(qf.poll(&mut host, t0 + ms(1600)).is_some());

    assert_eq!(
        host.applied,
        vec![contains_any(&["name"], "a"), contains_any(&["name"], "ab")]
    );
}

#[test]
fn test_custom_delay_from_config() {
    let t0 = Instant::now();
    let config = QuickFilterConfig {
        auto_apply: true,
        delay_ms: 200,
    };
    let mut qf = QuickFilter::new(&config);
    let mut host = RecordingHost::new(&["name"]);
    qf.focus();

    qf.handle_key(key('z'), t0);
    assert_eq!(qf.time_remaining(t0 + ms(50)), Some(ms(150)));
    assert!(qf.poll(&mut host, t0 + ms(200)).is_some());
}

#[test]
fn test_enter_cancels_pending_and_applies_now() {
    let t0 = Instant::now();
    let mut qf = QuickFilter::default();
    let mut host = RecordingHost::new(&["name"]);
    qf.focus();

    qf.handle_key(key('q'), t0);
    qf.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0 + ms(10));
    assert!(qf.poll(&mut host, t0 + ms(10)).is_some());
    assert!(qf.poll(&mut host, t0 + ms(2000)).is_none());
    assert_eq!(host.applied.len(), 1);
}

#[test]
fn test_backspace_to_empty_drops_filter() {
    let t0 = Instant::now();
    let mut qf = QuickFilter::default();
    let mut host = RecordingHost::new(&["name"]);
    qf.focus();

    qf.handle_key(key('a'), t0);
    qf.handle_key(
        KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
        t0 + ms(50),
    );
    assert_eq!(qf.value(), "");
    assert!(qf.poll(&mut host, t0 + ms(750)).is_some());
    assert_eq!(host.applied, vec![None]);
}

#[test]
fn test_filters_grid_rows_on_filterable_columns() {
    let t0 = Instant::now();
    let mut grid = people_grid();
    let mut qf = QuickFilter::default();
    qf.focus();

    for c in "york".chars() {
        qf.handle_key(key(c), t0);
    }
    let _ = qf.poll(&mut grid, t0 + ms(700));

    // "notes" is not filterable, so Alice's row drops out
    let ids: Vec<&str> = grid.filtered_rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
    assert_eq!(grid.body().row_count(), 1);

    let _ = qf.clear(&mut grid);
    assert!(grid.filter().is_none());
    assert_eq!(grid.body().row_count(), 3);
}

#[test]
fn test_match_is_case_insensitive() {
    let mut grid = people_grid();
    let mut qf = QuickFilter::default();
    qf.set_value("LEEDS");
    let _ = qf.apply(&mut grid);

    let ids: Vec<&str> = grid.filtered_rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[test]
fn test_hidden_columns_are_not_filtered_on() {
    let mut grid = people_grid();
    let mut hidden = HiddenColumns::new(&grid);
    let _ = hidden.add(&mut grid, ["city"]).unwrap();
    assert_eq!(grid.filterable_columns(), vec!["name"]);

    let mut qf = QuickFilter::default();
    qf.set_value("york");
    let _ = qf.apply(&mut grid);
    assert!(grid.filtered_rows().is_empty());
}

#[test]
fn test_delegates_to_filter_bar() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut grid = people_grid();
    grid.set_filter_bar(Box::new(RecordingBar {
        calls: calls.clone(),
    }));

    let mut qf = QuickFilter::default();
    qf.set_value("bob");
    let _ = qf.apply(&mut grid);
    let _ = qf.clear(&mut grid);

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            BarCall::Apply(FilterRule {
                conditions: vec![filter::FilterCondition {
                    condition: "contain".to_string(),
                    value: "bob".to_string(),
                }],
            }),
            BarCall::Clear(true),
        ]
    );
    // The grid's own filter is left alone
    assert!(grid.filter().is_none());
    assert_eq!(grid.body().row_count(), 3);
}

#[tokio::test]
async fn test_applied_refresh_resolves() {
    let t0 = Instant::now();
    let mut grid = people_grid();
    let mut qf = QuickFilter::default();
    qf.focus();
    qf.handle_key(key('b'), t0);

    let refresh = qf.poll(&mut grid, t0 + ms(700)).unwrap();
    refresh.await;
    assert_eq!(grid.filtered_rows().len(), 2);
}

#[test]
fn test_opens_filter_bar_when_present() {
    let mut grid = people_grid();
    let mut qf = QuickFilter::default();
    qf.focus();
    assert!(!qf.show_filter_bar(&mut grid));
    assert!(qf.is_focused());

    let calls = Arc::new(Mutex::new(Vec::new()));
    grid.set_filter_bar(Box::new(RecordingBar {
        calls: calls.clone(),
    }));
    assert!(qf.show_filter_bar(&mut grid));
    assert!(!qf.is_focused());
    assert_eq!(*calls.lock().unwrap(), vec![BarCall::Show]);
}
