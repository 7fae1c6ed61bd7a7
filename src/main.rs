use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{info, warn};

use grid_plugins::config::Config;
use grid_plugins::persist::{JsonFilePersist, Persist};
use grid_plugins::testdata::{flatten_rows, layout, TreeDataGenerator};
use grid_plugins::utils::logging::init_tracing;
use grid_plugins::{CellBody, Grid, HiddenColumns};

mod app;

use app::GridApp;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    let logs = init_tracing(&config.logging.filter);

    let store = TreeDataGenerator::default()
        .generate(config.display.tree_levels, u64::from(config.display.tree_children));
    info!(target: "app", "Generated {} items", store.item_count());

    let body = CellBody::new().with_virtual_scroll(config.display.virtual_scroll);
    let mut grid = Grid::new(layout(), body)?.with_body_width(config.display.body_width);
    let mut hidden = HiddenColumns::from_config(&grid, &config.hidden_columns);

    let persist: Option<Box<dyn Persist>> = if config.persist.enabled {
        let opened = match &config.persist.path {
            Some(path) => JsonFilePersist::open(path),
            None => JsonFilePersist::open_default(),
        };
        match opened {
            Ok(file) => {
                info!(target: "app", "Persisting to {}", file.path().display());
                Some(Box::new(file) as Box<dyn Persist>)
            }
            Err(e) => {
                warn!(target: "app", "Persistence disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    grid.set_rows(flatten_rows(&store.items)).await;
    // Rows are rendered, so the grid's startup is already over
    hidden
        .load(&mut grid, persist.as_deref(), std::future::ready(()))
        .await?;
    hidden.loaded().await;
    grid.refresh(true).await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = GridApp::new(grid, hidden, &config, persist, logs);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}
