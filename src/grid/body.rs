//! Rendered grid body.
//!
//! The grid never re-renders on its own; it patches the body through
//! [`GridBody`] and only asks for a full refresh when the column set changed.

use super::column::Column;
use super::refresh::Refresh;
use super::Row;

/// Handle to a single rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey(pub usize);

/// What a body refresh should render
#[derive(Debug, Clone)]
pub struct BodyView<'a> {
    pub columns: Vec<&'a Column>,
    pub rows: Vec<&'a Row>,
}

/// Rendering surface the grid and its plugins patch
pub trait GridBody {
    /// Cells currently rendered for a column
    fn cells_of(&self, column_id: &str) -> Vec<CellKey>;

    /// Every cell currently rendered
    fn all_cells(&self) -> Vec<CellKey>;

    /// Column a cell belongs to, if the cell still exists
    fn cell_column(&self, cell: CellKey) -> Option<&str>;

    /// Detach a cell. Removing a cell that is already gone is a no-op.
    fn remove_cell(&mut self, cell: CellKey);

    fn resize_cell(&mut self, cell: CellKey, width: u16);

    fn refresh_header(&mut self, columns: &[&Column]);

    fn refresh_body(&mut self, view: BodyView<'_>) -> Refresh;

    /// Whether the body renders only a window of rows
    fn is_virtual_scroll(&self) -> bool;

    /// Resynchronize a virtual scroller after the column layout changed
    fn force_scroll(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row_id: String,
    pub column_id: String,
    pub text: String,
    pub width: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column_id: String,
    pub label: String,
    pub width: u16,
}

/// In-memory body: one cell per (row, visible column)
#[derive(Debug, Default)]
pub struct CellBody {
    cells: Vec<Option<Cell>>,
    rows: Vec<Vec<CellKey>>,
    header: Vec<HeaderCell>,
    virtual_scroll: bool,
    header_refreshes: usize,
    body_refreshes: usize,
    forced_scrolls: usize,
}

impl CellBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_virtual_scroll(mut self, virtual_scroll: bool) -> Self {
        self.virtual_scroll = virtual_scroll;
        self
    }

    pub fn header(&self) -> &[HeaderCell] {
        &self.header
    }

    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key.0).and_then(|c| c.as_ref())
    }

    /// Rendered rows with detached cells skipped
    pub fn rendered_rows(&self) -> Vec<Vec<&Cell>> {
        self.rows
            .iter()
            .map(|row| row.iter().filter_map(|&key| self.cell(key)).collect())
            .collect()
    }

    /// Column ids of the first rendered row, in display order
    pub fn first_row_columns(&self) -> Vec<String> {
        self.rendered_rows()
            .first()
            .map(|row| row.iter().map(|c| c.column_id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn header_refreshes(&self) -> usize {
        self.header_refreshes
    }

    pub fn body_refreshes(&self) -> usize {
        self.body_refreshes
    }

    pub fn forced_scrolls(&self) -> usize {
        self.forced_scrolls
    }
}

impl GridBody for CellBody {
    fn cells_of(&self, column_id: &str) -> Vec<CellKey> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Some(cell) if cell.column_id == column_id => Some(CellKey(i)),
                _ => None,
            })
            .collect()
    }

    fn all_cells(&self) -> Vec<CellKey> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|_| CellKey(i)))
            .collect()
    }

    fn cell_column(&self, cell: CellKey) -> Option<&str> {
        self.cell(cell).map(|c| c.column_id.as_str())
    }

    fn remove_cell(&mut self, cell: CellKey) {
        if let Some(slot) = self.cells.get_mut(cell.0) {
            *slot = None;
        }
    }

    fn resize_cell(&mut self, cell: CellKey, width: u16) {
        if let Some(Some(c)) = self.cells.get_mut(cell.0) {
            c.width = width;
        }
    }

    fn refresh_header(&mut self, columns: &[&Column]) {
        self.header_refreshes += 1;
        self.header = columns
            .iter()
            .map(|col| HeaderCell {
                column_id: col.id.clone(),
                label: col.name.clone(),
                width: col.render_width,
            })
            .collect();
    }

    fn refresh_body(&mut self, view: BodyView<'_>) -> Refresh {
        let (done, refresh) = Refresh::pending();
        self.body_refreshes += 1;
        self.cells.clear();
        self.rows.clear();

        for row in &view.rows {
            let mut keys = Vec::with_capacity(view.columns.len());
            for col in &view.columns {
                keys.push(CellKey(self.cells.len()));
                self.cells.push(Some(Cell {
                    row_id: row.id.clone(),
                    column_id: col.id.clone(),
                    text: row.get(&col.field).unwrap_or_default().to_string(),
                    width: col.render_width,
                }));
            }
            self.rows.push(keys);
        }

        done.complete();
        refresh
    }

    fn is_virtual_scroll(&self) -> bool {
        self.virtual_scroll
    }

    fn force_scroll(&mut self) {
        self.forced_scrolls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::ColumnDef;

    fn columns() -> Vec<Column> {
        vec![
            Column::from_def(ColumnDef::new("a").width(4), 0),
            Column::from_def(ColumnDef::new("b").width(6), 1),
        ]
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("r1").with("a", "1").with("b", "x"),
            Row::new("r2").with("a", "2"),
        ]
    }

    #[test]
    fn test_refresh_body_materializes_cells() {
        let cols = columns();
        let rows = rows();
        let mut body = CellBody::new();
        let mut refresh = body.refresh_body(BodyView {
            columns: cols.iter().collect(),
            rows: rows.iter().collect(),
        });

        assert!(refresh.is_ready());
        assert_eq!(body.row_count(), 2);
        assert_eq!(body.all_cells().len(), 4);
        assert_eq!(body.cells_of("b").len(), 2);
        assert_eq!(body.rendered_rows()[1][1].text, "");
    }

    #[test]
    fn test_remove_cell_twice_is_noop() {
        let cols = columns();
        let rows = rows();
        let mut body = CellBody::new();
        let _ = body.refresh_body(BodyView {
            columns: cols.iter().collect(),
            rows: rows.iter().collect(),
        });

        let cell = body.cells_of("a")[0];
        body.remove_cell(cell);
        body.remove_cell(cell);
        body.remove_cell(CellKey(999));

        assert_eq!(body.cells_of("a").len(), 1);
        assert_eq!(body.cell_column(cell), None);
        assert_eq!(body.first_row_columns(), vec!["b"]);
    }
}
