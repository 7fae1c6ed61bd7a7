//! Optional feature modules for a data grid: hiding columns and a quick
//! filter box, plus a reproducible tree-data generator for testing.

pub mod config;
pub mod filter;
pub mod grid;
pub mod persist;
pub mod plugins;
pub mod testdata;
pub mod utils;

pub use grid::body::{CellBody, GridBody};
pub use grid::column::{AsColumnId, Column, ColumnDef, ColumnKey};
pub use grid::refresh::Refresh;
pub use grid::{Grid, GridEvent, Row};
pub use plugins::{HiddenColumns, QuickFilter};
