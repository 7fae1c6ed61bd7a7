//! Optional grid features

pub mod hidden_columns;
pub mod quick_filter;

pub use hidden_columns::HiddenColumns;
pub use quick_filter::{FilterHost, QuickFilter, QuickFilterAction};
