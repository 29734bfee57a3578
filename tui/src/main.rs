mod app;
mod cli;
mod logging;
mod settings;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use tasklist_core::{ListController, RemoteStore, ReqwestTransport, TaskStore};

use app::App;
use cli::Cli;

/// How long to wait for a key before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = settings::load(&cli)?;
    logging::init(&settings.log_file)?;
    tracing::info!(
        url = %settings.store.url,
        table = %settings.store.table,
        "starting"
    );

    let transport = match settings.timeout_secs {
        Some(secs) => ReqwestTransport::with_timeout(Duration::from_secs(secs))
            .context("building HTTP client")?,
        None => ReqwestTransport::new(),
    };
    let store = RemoteStore::with_transport(&settings.store, transport);
    let mut app = App::new(ListController::new(store));

    // ratatui::init also installs a panic hook that restores the terminal.
    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app).await;
    ratatui::restore();

    tracing::info!("exiting");
    result.context("terminal I/O failed")
}

async fn run<S: TaskStore>(terminal: &mut DefaultTerminal, app: &mut App<S>) -> io::Result<()> {
    // Show the empty frame while the first fetch is in flight.
    terminal.draw(|frame| ui::render(frame, app))?;
    app.controller.init().await;

    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }
    }
    Ok(())
}
