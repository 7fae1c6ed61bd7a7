//! Synthetic data for exercising the grid

pub mod tree_data;

pub use tree_data::{flatten_rows, layout, TreeDataGenerator, TreeItem, TreeStore};
