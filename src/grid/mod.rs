//! Grid context: the column registry, display rows and the rendered body.
//!
//! Columns live in an arena and are addressed by [`ColumnKey`]. The visible
//! list and the id lookup hold keys, as do plugins that need to remember
//! columns the grid currently does not show.

pub mod body;
pub mod column;
pub mod refresh;
mod width;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::filter::{FilterBar, FilterExpr};
use body::{BodyView, CellBody, GridBody};
use column::{Column, ColumnDef, ColumnKey};
use refresh::Refresh;

pub use width::{DEFAULT_BODY_WIDTH, MIN_COLUMN_WIDTH};

/// A display row: an id plus field -> text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub values: BTreeMap<String, String>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }
}

/// Notifications the grid queues for its plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// The visible column order changed through a move
    ColumnsMoved,
}

pub struct Grid<B: GridBody = CellBody> {
    pub(crate) arena: Vec<Column>,
    /// Visible columns in display order
    pub(crate) columns: Vec<ColumnKey>,
    /// Lookup of visible columns by id
    pub(crate) by_id: HashMap<String, ColumnKey>,
    rows: Vec<Row>,
    filter: Option<FilterExpr>,
    filter_bar: Option<Box<dyn FilterBar>>,
    body: B,
    pub(crate) body_width: u16,
    events: Vec<GridEvent>,
}

impl<B: GridBody> Grid<B> {
    /// Build a grid from a column layout. Column ids must be non-empty and unique.
    pub fn new<I>(defs: I, body: B) -> Result<Self>
    where
        I: IntoIterator<Item = ColumnDef>,
    {
        let mut arena = Vec::new();
        let mut by_id = HashMap::new();
        for (i, def) in defs.into_iter().enumerate() {
            if def.id.is_empty() {
                bail!("Column at position {} has an empty id", i);
            }
            if by_id.contains_key(&def.id) {
                bail!("Duplicate column id '{}'", def.id);
            }
            by_id.insert(def.id.clone(), ColumnKey(i));
            arena.push(Column::from_def(def, i));
        }

        let columns = (0..arena.len()).map(ColumnKey).collect();
        let mut grid = Self {
            arena,
            columns,
            by_id,
            rows: Vec::new(),
            filter: None,
            filter_bar: None,
            body,
            body_width: DEFAULT_BODY_WIDTH,
            events: Vec::new(),
        };
        grid.adapt_width();
        debug!(target: "grid", "Created grid with {} columns", grid.arena.len());
        Ok(grid)
    }

    pub fn with_body_width(mut self, width: u16) -> Self {
        self.set_body_width(width);
        self
    }

    pub fn set_body_width(&mut self, width: u16) {
        self.body_width = width;
        self.adapt_width();
    }

    pub fn body_width(&self) -> u16 {
        self.body_width
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Visible column by id. Hidden columns are not reachable here.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.by_id.get(id).map(|&key| &self.arena[key.0])
    }

    pub fn column_by_key(&self, key: ColumnKey) -> &Column {
        &self.arena[key.0]
    }

    /// Visible columns in display order
    pub fn columns(&self) -> Vec<&Column> {
        visible(&self.arena, &self.columns)
    }

    pub fn column_keys(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.columns().into_iter().map(|c| c.id.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of columns, visible or not
    pub fn total_column_count(&self) -> usize {
        self.arena.len()
    }

    /// Set every visible column's index to its position, starting at `from`
    pub(crate) fn reindex_from(&mut self, from: usize) {
        for (i, key) in self.columns.iter().enumerate().skip(from) {
            self.arena[key.0].index = i;
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) -> Refresh {
        self.rows = rows;
        self.refresh_body()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows passing the active filter
    pub fn filtered_rows(&self) -> Vec<&Row> {
        filtered(&self.arena, &self.by_id, &self.rows, self.filter.as_ref())
    }

    pub fn filter(&self) -> Option<&FilterExpr> {
        self.filter.as_ref()
    }

    /// Replace the active filter expression; `None` shows every row
    pub fn set_filter(&mut self, filter: Option<FilterExpr>) -> Refresh {
        debug!(target: "grid", "Filter set: {:?}", filter);
        self.filter = filter;
        self.refresh_body()
    }

    pub fn set_filter_bar(&mut self, bar: Box<dyn FilterBar>) {
        self.filter_bar = Some(bar);
    }

    pub fn has_filter_bar(&self) -> bool {
        self.filter_bar.is_some()
    }

    pub fn filter_bar_mut(&mut self) -> Option<&mut (dyn FilterBar + 'static)> {
        self.filter_bar.as_deref_mut()
    }

    /// Full header + body refresh when `changed`, otherwise an immediate no-op
    pub fn refresh(&mut self, changed: bool) -> Refresh {
        if !changed {
            return Refresh::ready();
        }
        self.adapt_width();
        let cols = visible(&self.arena, &self.columns);
        self.body.refresh_header(&cols);
        self.refresh_body()
    }

    pub fn refresh_body(&mut self) -> Refresh {
        let view = BodyView {
            columns: visible(&self.arena, &self.columns),
            rows: filtered(&self.arena, &self.by_id, &self.rows, self.filter.as_ref()),
        };
        self.body.refresh_body(view)
    }

    /// Size every rendered cell to its column's current width
    pub fn resize_cells(&mut self) {
        for cell in self.body.all_cells() {
            let width = self
                .body
                .cell_column(cell)
                .and_then(|id| self.by_id.get(id))
                .map(|key| self.arena[key.0].render_width);
            if let Some(width) = width {
                self.body.resize_cell(cell, width);
            }
        }
    }

    /// Move the visible column at `from` so it ends up at `to`
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<Refresh> {
        let len = self.columns.len();
        if from >= len || to >= len {
            return Err(anyhow!(
                "Column move {} -> {} out of bounds ({} visible columns)",
                from,
                to,
                len
            ));
        }
        if from == to {
            return Ok(Refresh::ready());
        }

        let key = self.columns.remove(from);
        self.columns.insert(to, key);
        self.reindex_from(from.min(to));
        debug!(target: "grid", "Moved column '{}' from {} to {}", self.arena[key.0].id, from, to);
        self.events.push(GridEvent::ColumnsMoved);
        Ok(self.refresh(true))
    }

    /// Move a column left in the view (swap with previous column)
    /// With wraparound: moving left from first position moves to last
    pub fn move_column_left(&mut self, visible_index: usize) -> bool {
        let len = self.columns.len();
        if visible_index >= len {
            return false;
        }
        let to = if visible_index == 0 { len - 1 } else { visible_index - 1 };
        self.move_column(visible_index, to).is_ok()
    }

    /// Move a column right in the view (swap with next column)
    /// With wraparound: moving right from last position moves to first
    pub fn move_column_right(&mut self, visible_index: usize) -> bool {
        let len = self.columns.len();
        if visible_index >= len {
            return false;
        }
        let to = if visible_index == len - 1 { 0 } else { visible_index + 1 };
        self.move_column(visible_index, to).is_ok()
    }

    /// Take the notifications queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check the registry's own invariants: the lookup holds exactly the
    /// visible columns, none of them hidden, each index equal to its position.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (pos, key) in self.columns.iter().enumerate() {
            let col = &self.arena[key.0];
            if !seen.insert(*key) {
                bail!("Column '{}' is listed twice", col.id);
            }
            if col.hidden {
                bail!("Column '{}' is hidden but listed as visible", col.id);
            }
            if col.index != pos {
                bail!("Column '{}' has index {} at position {}", col.id, col.index, pos);
            }
            if self.by_id.get(&col.id) != Some(key) {
                bail!("Column '{}' is missing from the id lookup", col.id);
            }
        }
        if self.by_id.len() != self.columns.len() {
            bail!(
                "Id lookup has {} entries for {} visible columns",
                self.by_id.len(),
                self.columns.len()
            );
        }
        Ok(())
    }
}

fn visible<'a>(arena: &'a [Column], keys: &[ColumnKey]) -> Vec<&'a Column> {
    keys.iter().map(|key| &arena[key.0]).collect()
}

fn filtered<'a>(
    arena: &'a [Column],
    by_id: &'a HashMap<String, ColumnKey>,
    rows: &'a [Row],
    filter: Option<&FilterExpr>,
) -> Vec<&'a Row> {
    match filter {
        None => rows.iter().collect(),
        Some(expr) => rows
            .iter()
            .filter(|row| {
                let lookup = |id: &str| {
                    by_id
                        .get(id)
                        .and_then(|key| row.get(&arena[key.0].field))
                };
                expr.matches(&lookup)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{column, contain, or, value};

    fn grid() -> Grid {
        let defs = ["a", "b", "c", "d"].into_iter().map(ColumnDef::new);
        let mut grid = Grid::new(defs, CellBody::new()).unwrap();
        let _ = grid.set_rows(vec![
            Row::new("1").with("a", "apple").with("b", "banana"),
            Row::new("2").with("a", "cherry").with("c", "date"),
        ]);
        grid
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let defs = ["a", "b", "a"].into_iter().map(ColumnDef::new);
        let err = Grid::new(defs, CellBody::new()).err().unwrap();
        assert!(err.to_string().contains("Duplicate column id 'a'"));
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(Grid::new([ColumnDef::new("")], CellBody::new()).is_err());
    }

    #[test]
    fn test_new_grid_is_consistent() {
        let grid = grid();
        grid.validate().unwrap();
        assert_eq!(grid.column_ids(), vec!["a", "b", "c", "d"]);
        assert_eq!(grid.body().row_count(), 2);
    }

    #[test]
    fn test_move_column_reindexes_and_queues_event() {
        let mut grid = grid();
        grid.move_column(2, 0).unwrap();
        assert_eq!(grid.column_ids(), vec!["c", "a", "b", "d"]);
        grid.validate().unwrap();
        assert_eq!(grid.drain_events(), vec![GridEvent::ColumnsMoved]);
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_move_column_wraparound() {
        let mut grid = grid();
        assert!(grid.move_column_left(0));
        assert_eq!(grid.column_ids(), vec!["b", "c", "d", "a"]);
        assert!(grid.move_column_right(3));
        assert_eq!(grid.column_ids(), vec!["a", "b", "c", "d"]);
        assert!(!grid.move_column_right(4));
        grid.validate().unwrap();
    }

    #[test]
    fn test_move_out_of_bounds_is_error() {
        let mut grid = grid();
        assert!(grid.move_column(0, 9).is_err());
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_set_filter_limits_rendered_rows() {
        let mut grid = grid();
        let expr = or(["a", "b"].map(|c| contain(column(c), value("BAN"))));
        let _ = grid.set_filter(Some(expr));
        assert_eq!(grid.filtered_rows().len(), 1);
        assert_eq!(grid.body().row_count(), 1);

        let _ = grid.set_filter(None);
        assert_eq!(grid.body().row_count(), 2);
    }

    #[test]
    fn test_refresh_unchanged_is_noop() {
        let mut grid = grid();
        let before = grid.body().body_refreshes();
        let mut refresh = grid.refresh(false);
        assert!(refresh.is_ready());
        assert_eq!(grid.body().body_refreshes(), before);

        let mut refresh = grid.refresh(true);
        assert!(refresh.is_ready());
        assert_eq!(grid.body().header_refreshes(), 1);
        assert_eq!(grid.body().body_refreshes(), before + 1);
    }
}
