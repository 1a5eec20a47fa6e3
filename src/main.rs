mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, config_path};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::{ClockTicker, PeriodicRefresher};
use courtside_api::client::CourtsideApi;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc, watch};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let client = CourtsideApi::with_base_url(settings.api_url.clone());
    let credentials = settings.credentials();
    let poll_interval = settings.poll_interval;
    info!("courtside {} talking to {}", env!("CARGO_PKG_VERSION"), client.base_url());

    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (open_match_tx, open_match_rx) = watch::channel::<Option<u64>>(None);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic match refresh thread
    let periodic_updater =
        PeriodicRefresher::new(network_req_tx.clone(), open_match_rx, poll_interval);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Elapsed clock thread
    let clock_ticker = ClockTicker::new(ui_event_tx.clone());
    let clock_task = tokio::spawn(clock_ticker.run());

    if let Some((username, password)) = credentials {
        let _ = network_req_tx.send(NetworkRequest::Login { username, password }).await;
    }
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        open_match_tx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();
    clock_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("courtside {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> String {
    format!(
        "courtside - badminton live scoreboard and match console

Usage:
  courtside
  courtside --help
  courtside --version

Environment:
  COURTSIDE_API_URL     Match management API base URL (default http://127.0.0.1:5328/api)
  COURTSIDE_POLL_SECS   Seconds between refreshes (default 5)
  COURTSIDE_LOG         Log level: error, warn, info, debug, trace (default info)
  COURTSIDE_USER        Admin username, signs in at startup
  COURTSIDE_PASSWORD    Admin password
  COURTSIDE_EXPORT_DIR  Directory for exported scoresheets (default .)

Config file:
  {}",
        config_path().display()
    )
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    open_match: watch::Sender<Option<u64>>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let redraw_while_loading = draws_while_loading(&ui_event);
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                let mut app_guard = app.lock().await;
                open_match.send_if_modified(|current| {
                    let next = app_guard.open_match_id();
                    let changed = *current != next;
                    *current = next;
                    changed
                });
                if should_redraw && (redraw_while_loading || !loading.is_loading) {
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

/// Events that redraw even while the spinner owns the screen.
fn draws_while_loading(ui_event: &UiEvent) -> bool {
    matches!(ui_event, UiEvent::ClockTick | UiEvent::Resize)
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            for request in [NetworkRequest::LoadSettings, NetworkRequest::RefreshMatches] {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        // Elapsed strings are derived at draw time, so a tick only needs a redraw.
        UiEvent::ClockTick => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::LoggedIn { auth } => {
            let mut guard = app.lock().await;
            guard.on_logged_in(auth);
        }
        NetworkResponse::LoggedOut => app.lock().await.on_logged_out(),
        NetworkResponse::SettingsLoaded { settings } => {
            let mut guard = app.lock().await;
            guard.on_settings_loaded(settings);
        }
        NetworkResponse::SettingsSaved { settings } => app.lock().await.on_settings_saved(settings),
        NetworkResponse::MatchesLoaded { stats, live, scheduled } => {
            let mut guard = app.lock().await;
            guard.on_matches_loaded(stats, live, scheduled);
        }
        NetworkResponse::HistoryLoaded { matches, stats } => {
            let mut guard = app.lock().await;
            guard.on_history_loaded(matches, stats);
        }
        NetworkResponse::MatchLoaded { snapshot } => {
            let mut guard = app.lock().await;
            guard.on_match_loaded(snapshot);
        }
        NetworkResponse::MutationApplied { snapshot } => {
            let mut guard = app.lock().await;
            guard.on_mutation_applied(snapshot);
        }
        NetworkResponse::MatchCreated { match_id } => {
            app.lock().await.on_match_created(match_id);
            let _ = network_requests.send(NetworkRequest::RefreshMatches).await;
        }
        NetworkResponse::MatchDeleted { match_id } => {
            app.lock().await.on_match_deleted(match_id);
            let _ = network_requests.send(NetworkRequest::RefreshMatches).await;
        }
        NetworkResponse::ScoresheetExported { snapshot } => {
            app.lock().await.on_scoresheet_exported(snapshot);
        }
        NetworkResponse::PlayersLoaded { players, notice } => {
            app.lock().await.on_players_loaded(players, notice);
        }
        NetworkResponse::Error { message, mutated_match } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message, mutated_match);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = tokio::task::spawn_blocking(crossterm_event::read).await;
        if let Ok(Ok(event)) = event {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_keeps_ticking_during_requests() {
        assert!(draws_while_loading(&UiEvent::ClockTick));
        assert!(draws_while_loading(&UiEvent::Resize));
        assert!(!draws_while_loading(&UiEvent::AppStarted));
    }
}
