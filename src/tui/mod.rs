mod app;
mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::error;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::exchanges::OrderHistorySource;
use crate::{Outcome, ReportShell};
use app::Action;
use state::App;

/// Opens the interactive report window and blocks until the user quits.
pub async fn run<S>(shell: Arc<ReportShell<S>>) -> Result<()>
where
    S: OrderHistorySource + 'static,
{
    // ── Setup terminal ──────────────────────────────────────────
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(shell.output_path().display().to_string());

    let result = run_loop(&mut terminal, &mut app, shell).await;

    // ── Teardown (always runs) ──────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Runs one report in the background. An outcome is always sent back, even
/// when the pipeline task panics, so the window never stays busy.
fn spawn_run<S>(shell: Arc<ReportShell<S>>, input: String, tx: mpsc::UnboundedSender<Outcome>)
where
    S: OrderHistorySource + 'static,
{
    let pipeline = tokio::spawn(async move { shell.submit(&input).await });

    tokio::spawn(async move {
        let outcome = pipeline.await.unwrap_or_else(|e| {
            error!("Report run did not finish: {}", e);
            Outcome::aborted()
        });
        let _ = tx.send(outcome);
    });
}

async fn run_loop<S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    shell: Arc<ReportShell<S>>,
) -> Result<()>
where
    S: OrderHistorySource + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // ── Finished runs ───────────────────────────────────────
        while let Ok(outcome) = rx.try_recv() {
            app.finish(outcome);
        }

        // ── Input ───────────────────────────────────────────────
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app::handle_key(app, key.code, key.modifiers) {
                    Action::None => {}
                    Action::Quit => return Ok(()),
                    Action::Submit => {
                        let input = app.start();
                        spawn_run(Arc::clone(&shell), input, tx.clone());
                    }
                    Action::Insert(c) => app.insert(c),
                    Action::Backspace => app.backspace(),
                    Action::ClearInput => app.clear_input(),
                    Action::ScrollUp => app.scroll_up(),
                    Action::ScrollDown => app.scroll_down(),
                    Action::DismissError => app.dismiss_error(),
                }
            }
        }

        app.tick();
    }
}
