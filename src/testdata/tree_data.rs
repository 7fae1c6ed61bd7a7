//! Reproducible tree-shaped test records.
//!
//! A fixed linear congruential sequence drives every value, so the same seed
//! always yields the same tree.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::grid::column::ColumnDef;
use crate::grid::Row;

const LCG_MULTIPLIER: u64 = 8887;
const LCG_INCREMENT: u64 = 9643;
const LCG_MODULUS: u64 = 8677;

pub const DEFAULT_SEED: u64 = 9973;

const CHARS: [char; 46] = [
    '0', '1', '2', '3', ' ', '4', '5', '6', '7', ' ', '8', '9', 'a', 'b', ' ', 'c', 'd', 'e',
    'f', ' ', 'g', 'h', 'i', 'j', ' ', 'k', 'l', 'm', 'n', ' ', 'k', 'o', 'p', 'q', ' ', 'r',
    's', 't', 'u', ' ', 'v', 'w', 'x', 'y', ' ', 'z',
];

const MAX_STRING_LEN: u64 = 50;
const MAX_TIMESTAMP_MS: u64 = 10_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeItem {
    pub id: String,
    pub number: u64,
    pub string: String,
    pub date: String,
    pub time: String,
    pub bool: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeItem>>,
}

/// Item store in the shape tree grids load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeStore {
    pub identifier: String,
    pub label: String,
    pub items: Vec<TreeItem>,
}

impl TreeStore {
    /// Number of items at every level
    pub fn item_count(&self) -> usize {
        fn count(items: &[TreeItem]) -> usize {
            items
                .iter()
                .map(|i| 1 + i.children.as_deref().map_or(0, count))
                .sum()
        }
        count(&self.items)
    }

    /// Deepest level that holds at least one item (1 = top level)
    pub fn depth(&self) -> usize {
        fn depth(items: &[TreeItem]) -> usize {
            items
                .iter()
                .map(|i| 1 + i.children.as_deref().map_or(0, depth))
                .max()
                .unwrap_or(0)
        }
        depth(&self.items)
    }
}

#[derive(Debug, Clone)]
pub struct TreeDataGenerator {
    seed: u64,
}

impl Default for TreeDataGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl TreeDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: seed % LCG_MODULUS,
        }
    }

    /// Next value in `0..range`
    pub fn random_number(&mut self, range: u64) -> u64 {
        self.seed = (LCG_MULTIPLIER * self.seed + LCG_INCREMENT) % LCG_MODULUS;
        (self.seed as f64 / LCG_MODULUS as f64 * range as f64).floor() as u64
    }

    fn random_string(&mut self) -> String {
        let len = self.random_number(MAX_STRING_LEN);
        (0..len)
            .map(|_| CHARS[self.random_number(CHARS.len() as u64) as usize])
            .collect()
    }

    fn random_timestamp(&mut self) -> Option<DateTime<chrono::Utc>> {
        DateTime::from_timestamp_millis(self.random_number(MAX_TIMESTAMP_MS) as i64)
    }

    fn generate_item(&mut self, parent_id: &str, index: usize) -> TreeItem {
        let number = self.random_number(10_000);
        let string = self.random_string();
        let date = self
            .random_timestamp()
            .map(|d| d.format("%a %b %d %Y").to_string())
            .unwrap_or_default();
        let time = self
            .random_timestamp()
            .map(|d| d.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        let bool = self.random_number(10) < 5;
        TreeItem {
            id: format!("{}-{}", parent_id, index + 1),
            number,
            string,
            date,
            time,
            bool,
            children: None,
        }
    }

    fn generate_level(
        &mut self,
        parent_id: &str,
        level: u32,
        max_level: u32,
        max_children: u64,
    ) -> Vec<TreeItem> {
        let count = self.random_number(max_children) as usize;
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let mut item = self.generate_item(parent_id, i);
            if level < max_level {
                item.children =
                    Some(self.generate_level(&item.id, level + 1, max_level, max_children));
            }
            items.push(item);
        }
        items
    }

    /// Generate a tree up to `max_level` deep with fewer than
    /// `max_children` children per node
    pub fn generate(&mut self, max_level: u32, max_children: u64) -> TreeStore {
        TreeStore {
            identifier: "id".to_string(),
            label: "id".to_string(),
            items: self.generate_level("item", 1, max_level, max_children),
        }
    }
}

/// Column layout matching the generated records
pub fn layout() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("id").name("id").field("id").expand_field("children"),
        ColumnDef::new("number").name("number").field("number"),
        ColumnDef::new("string").name("string").field("string"),
        ColumnDef::new("date").name("date").field("date"),
        ColumnDef::new("time").name("time").field("time"),
        ColumnDef::new("bool").name("bool").field("bool"),
    ]
}

/// Depth-first rows for a flat grid; ids are indented by depth
pub fn flatten_rows(items: &[TreeItem]) -> Vec<Row> {
    fn walk(items: &[TreeItem], depth: usize, out: &mut Vec<Row>) {
        for item in items {
            out.push(
                Row::new(item.id.clone())
                    .with("id", format!("{}{}", "  ".repeat(depth), item.id))
                    .with("number", item.number.to_string())
                    .with("string", item.string.clone())
                    .with("date", item.date.clone())
                    .with("time", item.time.clone())
                    .with("bool", item.bool.to_string()),
            );
            if let Some(children) = &item.children {
                walk(children, depth + 1, out);
            }
        }
    }

    let mut rows = Vec::new();
    walk(items, 0, &mut rows);
    rows
}
