//! Hide and show grid columns.
//!
//! Hidden columns are taken out of the grid's visible list and id lookup, so
//! other features never see them. This plugin remembers every column in its
//! original order so that a column shown again lands back where it was,
//! relative to the columns around it.

use anyhow::{anyhow, bail, Result};
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::config::config::HiddenColumnsConfig;
use crate::grid::body::GridBody;
use crate::grid::column::{AsColumnId, ColumnKey};
use crate::grid::refresh::Refresh;
use crate::grid::{Grid, GridEvent};
use crate::persist::Persist;

/// Key hidden column ids are persisted under
pub const PERSIST_KEY: &str = "hiddenColumns";

pub struct HiddenColumns {
    /// Every column, visible or hidden, in original order (modulo moves)
    cols: Vec<ColumnKey>,
    /// Ids to hide on load
    init: Vec<String>,
    ready: watch::Sender<bool>,
}

impl HiddenColumns {
    /// Snapshot the grid's current column order. Call before anything is hidden.
    pub fn new<B: GridBody>(grid: &Grid<B>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            cols: grid.column_keys().to_vec(),
            init: Vec::new(),
            ready,
        }
    }

    pub fn from_config<B: GridBody>(grid: &Grid<B>, config: &HiddenColumnsConfig) -> Self {
        Self::new(grid).with_init(config.init.clone())
    }

    pub fn with_init(mut self, ids: Vec<String>) -> Self {
        self.init = ids;
        self
    }

    /// Hide the configured and persisted columns once `startup` completes.
    ///
    /// Persisted ids come first. When there is nothing to hide the plugin is
    /// ready immediately and `startup` is not awaited.
    pub async fn load<B, F>(
        &mut self,
        grid: &mut Grid<B>,
        persist: Option<&dyn Persist>,
        startup: F,
    ) -> Result<()>
    where
        B: GridBody,
        F: Future<Output = ()>,
    {
        let mut ids: Vec<String> = persist
            .and_then(|p| p.load(PERSIST_KEY))
            .unwrap_or_default();
        ids.extend(self.init.iter().cloned());

        let mut result = Ok(());
        if !ids.is_empty() {
            startup.await;
            debug!(target: "hidden_columns", "Hiding {} columns on load", ids.len());
            // The render pass completes on its own; readiness only covers the hide
            result = self.add(grid, &ids).map(|_refresh| ());
        }

        // Waiters on `loaded` are released even when the hide failed
        self.ready.send_if_modified(|ready| {
            let changed = !*ready;
            *ready = true;
            changed
        });
        result
    }

    /// Resolves once `load` has finished
    pub fn loaded(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.ready.subscribe();
        async move {
            // An error means the plugin is gone; nothing left to wait for
            let _ = rx.wait_for(|ready| *ready).await;
        }
    }

    pub fn is_loaded(&self) -> bool {
        *self.ready.borrow()
    }

    /// Hide columns. Unknown or already hidden ids are skipped.
    ///
    /// Fails only if a column is in the grid's id lookup but missing from its
    /// visible list, which means the two have gone out of sync. Every id is
    /// checked before anything is hidden, so a failed call changes nothing.
    pub fn add<B, I>(&mut self, grid: &mut Grid<B>, ids: I) -> Result<Refresh>
    where
        B: GridBody,
        I: IntoIterator,
        I::Item: AsColumnId,
    {
        let mut targets = Vec::new();
        for item in ids {
            let id = item.column_id();
            let Some(key) = grid.by_id.get(id).copied() else {
                trace!(target: "hidden_columns", "Skipping unknown or hidden column '{}'", id);
                continue;
            };
            if targets.contains(&key) {
                continue;
            }
            if !grid.columns.contains(&key) {
                bail!(
                    "Column '{}' is in the id lookup but not in the visible list",
                    id
                );
            }
            targets.push(key);
        }

        let changed = !targets.is_empty();
        for key in targets {
            let Some(pos) = grid.columns.iter().position(|&k| k == key) else {
                continue;
            };
            let id = grid.arena[key.0].id.clone();
            grid.arena[key.0].hidden = true;
            grid.by_id.remove(&id);
            grid.columns.remove(pos);

            // Patch the body directly instead of re-rendering it
            let body = grid.body_mut();
            for cell in body.cells_of(&id) {
                body.remove_cell(cell);
            }
            debug!(target: "hidden_columns", "Hid column '{}' (was at {})", id, pos);
        }

        if changed {
            grid.reindex_from(0);
            grid.adapt_width();
            grid.resize_cells();
            if grid.body().is_virtual_scroll() {
                grid.body_mut().force_scroll();
            }
        }
        Ok(grid.refresh(changed))
    }

    /// Show hidden columns again. Unknown or visible ids are skipped.
    ///
    /// A column is inserted right after the nearest column before it (in the
    /// remembered order) that is still visible.
    pub fn remove<B, I>(&mut self, grid: &mut Grid<B>, ids: I) -> Refresh
    where
        B: GridBody,
        I: IntoIterator,
        I::Item: AsColumnId,
    {
        let mut changed = false;
        for item in ids {
            let id = item.column_id();
            let mut insert_at = 0;
            let mut found = None;
            for &key in &self.cols {
                let col = grid.column_by_key(key);
                if col.hidden && col.id == id {
                    found = Some(key);
                    break;
                } else if !col.hidden {
                    insert_at = col.index + 1;
                }
            }
            let Some(key) = found else {
                trace!(target: "hidden_columns", "Skipping unknown or visible column '{}'", id);
                continue;
            };

            debug_assert!(insert_at <= grid.columns.len());
            changed = true;
            grid.arena[key.0].hidden = false;
            grid.by_id.insert(id.to_string(), key);
            grid.columns.insert(insert_at, key);
            grid.reindex_from(insert_at);
            debug!(target: "hidden_columns", "Showed column '{}' at {}", id, insert_at);
        }
        grid.refresh(changed)
    }

    /// Show every column, in remembered order
    pub fn clear<B: GridBody>(&mut self, grid: &mut Grid<B>) -> Refresh {
        let mut changed = false;
        grid.columns = self.cols.clone();
        for (i, &key) in self.cols.iter().enumerate() {
            let col = &mut grid.arena[key.0];
            col.index = i;
            if col.hidden {
                changed = true;
                col.hidden = false;
                grid.by_id.insert(col.id.clone(), key);
            }
        }
        debug!(target: "hidden_columns", "Cleared hidden columns (changed: {})", changed);
        grid.refresh(changed)
    }

    /// Ids of the hidden columns, in remembered order
    pub fn get<B: GridBody>(&self, grid: &Grid<B>) -> Vec<String> {
        self.cols
            .iter()
            .map(|&key| grid.column_by_key(key))
            .filter(|col| col.hidden)
            .map(|col| col.id.clone())
            .collect()
    }

    pub fn is_hidden<B: GridBody>(&self, grid: &Grid<B>, id: &str) -> bool {
        self.cols
            .iter()
            .map(|&key| grid.column_by_key(key))
            .any(|col| col.hidden && col.id == id)
    }

    /// Hide a visible column or show a hidden one
    pub fn toggle<B: GridBody>(&mut self, grid: &mut Grid<B>, id: &str) -> Result<Refresh> {
        if grid.column(id).is_some() {
            self.add(grid, [id])
        } else {
            Ok(self.remove(grid, [id]))
        }
    }

    /// Write the hidden ids to the persistence store
    pub fn save<B: GridBody>(&self, grid: &Grid<B>, persist: &mut dyn Persist) -> Result<()> {
        persist.save(PERSIST_KEY, self.get(grid))
    }

    pub fn handle_event<B: GridBody>(&mut self, grid: &Grid<B>, event: &GridEvent) -> Result<()> {
        match event {
            GridEvent::ColumnsMoved => self.sync_order(grid),
        }
    }

    /// Reorder the remembered columns so the visible ones follow the grid's
    /// current order. Hidden columns keep their slots.
    pub fn sync_order<B: GridBody>(&mut self, grid: &Grid<B>) -> Result<()> {
        let columns = grid.column_keys();
        debug_assert_eq!(
            columns.iter().collect::<HashSet<_>>(),
            self.cols
                .iter()
                .filter(|&&key| !grid.column_by_key(key).hidden)
                .collect::<HashSet<_>>(),
            "visible list and remembered columns disagree"
        );

        let mut j = 0;
        for &wanted in columns {
            while j < self.cols.len() && grid.column_by_key(self.cols[j]).hidden {
                j += 1;
            }
            if j >= self.cols.len() {
                bail!("Remembered columns ran out while matching the visible list");
            }
            if self.cols[j] != wanted {
                let k = self
                    .cols
                    .iter()
                    .position(|&key| key == wanted)
                    .ok_or_else(|| {
                        anyhow!(
                            "Visible column '{}' is not among the remembered columns",
                            grid.column_by_key(wanted).id
                        )
                    })?;
                self.cols.swap(j, k);
            }
            j += 1;
        }
        trace!(target: "hidden_columns", "Synced column order after move");
        Ok(())
    }

    /// Remembered column ids, hidden ones included
    pub fn ordered_ids<B: GridBody>(&self, grid: &Grid<B>) -> Vec<String> {
        self.cols
            .iter()
            .map(|&key| grid.column_by_key(key).id.clone())
            .collect()
    }

    /// Check that the grid and the remembered order agree
    pub fn validate<B: GridBody>(&self, grid: &Grid<B>) -> Result<()> {
        grid.validate()?;
        if self.cols.len() != grid.total_column_count() {
            bail!(
                "Remembering {} columns, grid has {}",
                self.cols.len(),
                grid.total_column_count()
            );
        }
        let remembered: HashSet<_> = self.cols.iter().collect();
        for key in grid.column_keys() {
            if !remembered.contains(key) {
                bail!("Visible column '{}' is not remembered", grid.column_by_key(*key).id);
            }
        }
        for &key in &self.cols {
            let col = grid.column_by_key(key);
            if col.hidden && (grid.column(&col.id).is_some() || grid.column_keys().contains(&key))
            {
                bail!("Hidden column '{}' is still reachable", col.id);
            }
        }
        Ok(())
    }
}
