// Matrix Workbench - interactive TUI over the two grids

pub mod app;
pub mod components;
pub mod events;
pub mod layout;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use tracing::{error, info};

use crate::client::ServiceClient;
use crate::error::LabError;
use crate::matrix::MatrixSession;
use app::WorkbenchApp;
use events::EventHandler;

/// Entry point for the matrix workbench
pub async fn run_workbench(session: MatrixSession, client: ServiceClient) -> Result<()> {
    info!("Starting matrix workbench");

    enable_raw_mode().map_err(|e| LabError::terminal(format!("cannot enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| LabError::terminal(format!("cannot enter alternate screen: {}", e)))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = WorkbenchApp::new(session, client);
    let mut event_handler = EventHandler::new();

    let result = run_workbench_loop(&mut terminal, &mut app, &mut event_handler).await;

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("Workbench error: {:?}", err);
        return Err(err);
    }

    info!("Workbench shut down");
    Ok(())
}

async fn run_workbench_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut WorkbenchApp,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Some(action) = event_handler.handle_events().await? {
            if app.handle_action(action).await? {
                break;
            }
        }

        app.update().await?;
    }

    Ok(())
}
