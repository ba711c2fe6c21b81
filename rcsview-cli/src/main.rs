mod app;
mod event;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use rcsview::{
    HostConfig, HostSession, PinnacleSender, PollWatcher, PreviewSurface, WorkspaceIndex,
};
use tokio::sync::mpsc;

use app::{App, Mode};
use event::AppEvent;

#[derive(Parser)]
struct Args {
    /// Workspace root to watch for *.rcs.json documents
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Document to preview before any selection is made
    #[arg(long)]
    file: Option<PathBuf>,

    /// Base URL for the messaging API
    #[arg(long, default_value = "https://api.pinnacle.sh", env = "PINNACLE_BASE_URL")]
    base_url: String,

    /// Watcher poll interval in milliseconds
    #[arg(long, default_value = "500")]
    poll_ms: u64,
}

fn cleanup_terminal() {
    ratatui::restore();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // File-based tracing — stderr would tear the TUI
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let log_dir = PathBuf::from(&home).join(".rcsview");
        std::fs::create_dir_all(&log_dir).ok();
        let log_file = std::fs::File::create(log_dir.join("rcsview.log"))?;

        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::try_from_env("RCSVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(log_file)
            .with_ansi(false)
            .init();
    }

    let args = Args::parse();
    tracing::info!("watching {} for *.rcs.json documents", args.root.display());

    // Host collaborators
    let index = Arc::new(WorkspaceIndex::new(args.root.clone()));
    let (watcher, watch_rx) =
        PollWatcher::spawn(Arc::clone(&index), Duration::from_millis(args.poll_ms));

    // The transport channel: one mpsc pair per direction
    let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
    let (to_surface_tx, to_surface_rx) = mpsc::unbounded_channel();
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();

    let host = HostSession::new(
        HostConfig {
            root: args.root,
            active_document: args.file,
        },
        index,
        Arc::new(PinnacleSender::new(args.base_url)),
        to_surface_tx,
    )
    .with_notices(notice_tx);
    let host_task = tokio::spawn(host.run(to_host_rx, watch_rx));

    let surface = PreviewSurface::new(to_host_tx);
    surface.request_initial();

    // Install panic hook that restores the terminal
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        cleanup_terminal();
        default_hook(info);
    }));

    let terminal = ratatui::init();
    let result = run_app(terminal, surface, to_surface_rx, notice_rx).await;
    cleanup_terminal();

    host_task.abort();
    drop(watcher);

    result
}

async fn run_app(
    mut terminal: DefaultTerminal,
    surface: PreviewSurface,
    mut to_surface_rx: mpsc::UnboundedReceiver<rcsview::HostMessage>,
    mut notice_rx: mpsc::UnboundedReceiver<rcsview::Notice>,
) -> anyhow::Result<()> {
    let mut app = App::new(surface);

    // Unified event channel
    let (app_tx, mut app_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Stop flag for the terminal reader thread
    let stop = Arc::new(AtomicBool::new(false));

    // Terminal events, polled so the thread can observe the stop flag
    let term_tx = app_tx.clone();
    let stop_reader = Arc::clone(&stop);
    tokio::task::spawn_blocking(move || {
        while !stop_reader.load(Ordering::Relaxed) {
            if crossterm::event::poll(Duration::from_millis(50)).unwrap_or(false) {
                match crossterm::event::read() {
                    Ok(ev) => {
                        if term_tx.send(AppEvent::Terminal(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    });

    // Host envelopes
    let host_tx = app_tx.clone();
    tokio::spawn(async move {
        while let Some(msg) = to_surface_rx.recv().await {
            if host_tx.send(AppEvent::Host(msg)).is_err() {
                break;
            }
        }
    });

    // Host notices
    let notices_tx = app_tx.clone();
    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            if notices_tx.send(AppEvent::Notice(notice)).is_err() {
                break;
            }
        }
    });

    // Spinner ticks
    let tick_tx = app_tx.clone();
    let stop_tick = Arc::clone(&stop);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            if stop_tick.load(Ordering::Relaxed) {
                break;
            }
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        let event = match app_rx.recv().await {
            Some(e) => e,
            None => break,
        };

        match event {
            AppEvent::Terminal(TermEvent::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }

                match app.mode {
                    Mode::EditCredential => match key.code {
                        KeyCode::Enter => app.commit_credential(),
                        KeyCode::Esc => app.cancel_credential_edit(),
                        KeyCode::Backspace => {
                            app.input.pop();
                        }
                        KeyCode::Char(c) => app.input.push(c),
                        _ => {}
                    },
                    Mode::Normal => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Tab => app.focus_next_file(),
                        KeyCode::BackTab => app.focus_prev_file(),
                        KeyCode::Enter => app.open_focused(),
                        KeyCode::Left => app.surface.prev_card(),
                        KeyCode::Right => app.surface.next_card(),
                        KeyCode::Char('e') => app.begin_credential_edit(),
                        KeyCode::Char('s') => app.surface.send(),
                        KeyCode::Char(c @ '1'..='9') => {
                            let index = c as usize - '1' as usize;
                            app.surface.jump_to_card(index);
                        }
                        _ => {}
                    },
                }
            }
            AppEvent::Terminal(_) => {}
            AppEvent::Host(msg) => app.handle_host_message(msg),
            AppEvent::Notice(notice) => app.notice = Some(notice),
            AppEvent::Tick => {
                if app.surface.sending() {
                    app.tick += 1;
                }
            }
        }
    }

    stop.store(true, Ordering::Relaxed);

    Ok(())
}
