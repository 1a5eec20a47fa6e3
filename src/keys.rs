use crate::app::{App, MenuItem};
use crate::state::app_state::AdminView;
use crate::state::messages::NetworkRequest;
use courtside_api::{ScoreAction, Side};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    let requests = if guard.state.is_text_input() {
        handle_text_input(&mut guard, key_event)
    } else {
        handle_command(&mut guard, key_event)
    };

    drop(guard);
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

fn quit() -> ! {
    crate::cleanup_terminal();
    std::process::exit(0);
}

/// Keys while the history search box or the admin form has focus.
fn handle_text_input(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        (MenuItem::History, KeyCode::Enter, _) => {
            app.state.history.editing_search = false;
            requests.push(NetworkRequest::LoadHistory { filter: app.state.history.filter() });
        }
        (MenuItem::History, KeyCode::Esc, _) => {
            app.state.history.editing_search = false;
            app.state.history.search.clear();
            requests.push(NetworkRequest::LoadHistory { filter: app.state.history.filter() });
        }
        (MenuItem::History, KeyCode::Backspace, _) => app.state.history.pop_search_char(),
        (MenuItem::History, Char(c), _) => app.state.history.push_search_char(c),

        (MenuItem::Admin, KeyCode::Esc, _) => app.state.admin.leave_form(),
        (MenuItem::Admin, KeyCode::Tab, _) => app.state.admin.focus_next(),
        (MenuItem::Admin, KeyCode::BackTab, _) => app.state.admin.focus_prev(),
        (MenuItem::Admin, KeyCode::Right, _) => app.state.admin.cycle_choice(true),
        (MenuItem::Admin, KeyCode::Left, _) => app.state.admin.cycle_choice(false),
        (MenuItem::Admin, KeyCode::Backspace, _) => app.state.admin.backspace(),
        (MenuItem::Admin, KeyCode::Enter, _) => requests.extend(app.state.admin.submit()),
        (MenuItem::Admin, Char(c), _) => app.state.admin.input_char(c),

        _ => {}
    }
    requests
}

fn handle_command(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let mut requests = Vec::new();
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => quit(),

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Dashboard),
        (_, Char('2'), _) => app.update_tab(MenuItem::Scoring),
        (_, Char('3'), _) => {
            app.update_tab(MenuItem::History);
            requests.push(NetworkRequest::LoadHistory { filter: app.state.history.filter() });
        }
        (_, Char('4'), _) => {
            app.update_tab(MenuItem::Admin);
            if app.state.admin.view == AdminView::Players {
                requests.push(NetworkRequest::LoadPlayers);
            }
        }
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Dashboard
        (MenuItem::Dashboard, Char('j') | KeyCode::Down, _) => app.state.dashboard.select_next(),
        (MenuItem::Dashboard, Char('k') | KeyCode::Up, _) => app.state.dashboard.select_prev(),
        (MenuItem::Dashboard, KeyCode::Enter, _) => {
            if let Some(match_id) = app.open_dashboard_selection() {
                requests.push(NetworkRequest::LoadMatch { match_id });
            }
        }

        // Scoring
        (MenuItem::Scoring, Char('a'), _) => {
            requests.extend(app.state.scoring.score_request(Side::Player1, ScoreAction::Increment))
        }
        (MenuItem::Scoring, Char('z'), _) => {
            requests.extend(app.state.scoring.score_request(Side::Player1, ScoreAction::Decrement))
        }
        (MenuItem::Scoring, Char('k'), _) => {
            requests.extend(app.state.scoring.score_request(Side::Player2, ScoreAction::Increment))
        }
        (MenuItem::Scoring, Char('m'), _) => {
            requests.extend(app.state.scoring.score_request(Side::Player2, ScoreAction::Decrement))
        }
        (MenuItem::Scoring, Char('n'), _) => requests.extend(app.state.scoring.next_set_request()),
        (MenuItem::Scoring, Char('e'), _) => requests.extend(app.state.scoring.end_request()),
        (MenuItem::Scoring, Char('x'), _) => {
            requests.extend(app.state.scoring.end_abruptly_request())
        }
        (MenuItem::Scoring, Char('s'), _) => requests.extend(app.state.scoring.start_request()),
        (MenuItem::Scoring, Char('+'), _) => requests.extend(app.state.scoring.shuttles_request(true)),
        (MenuItem::Scoring, Char('-'), _) => {
            requests.extend(app.state.scoring.shuttles_request(false))
        }
        (MenuItem::Scoring, KeyCode::Esc, _) => app.update_tab(MenuItem::Dashboard),

        // History
        (MenuItem::History, Char('j') | KeyCode::Down, _) => app.state.history.select_next(),
        (MenuItem::History, Char('k') | KeyCode::Up, _) => app.state.history.select_prev(),
        (MenuItem::History, Char('c'), _) => {
            app.state.history.cycle_court();
            requests.push(NetworkRequest::LoadHistory { filter: app.state.history.filter() });
        }
        (MenuItem::History, Char('o'), _) => {
            app.state.history.toggle_sort_order();
            requests.push(NetworkRequest::LoadHistory { filter: app.state.history.filter() });
        }
        (MenuItem::History, Char('/'), _) => app.state.history.editing_search = true,
        (MenuItem::History, Char('p'), _) => {
            if let Some(m) = app.state.history.selected_match() {
                requests.push(NetworkRequest::ExportMatch { match_id: m.id });
            }
        }
        (MenuItem::History, KeyCode::Enter, _) => {
            if let Some(match_id) = app.open_history_selection() {
                requests.push(NetworkRequest::LoadMatch { match_id });
            }
        }

        // Admin
        (MenuItem::Admin, Char('v'), _) => {
            app.state.admin.cycle_view();
            match app.state.admin.view {
                AdminView::Players => requests.push(NetworkRequest::LoadPlayers),
                AdminView::Settings => requests.push(NetworkRequest::LoadSettings),
                AdminView::Schedule => {}
            }
        }
        (MenuItem::Admin, Char('L'), _) => requests.extend(app.sign_in_or_out()),
        (MenuItem::Admin, Char('j') | KeyCode::Down, _) => {
            let scheduled = app.state.dashboard.scheduled.len();
            app.state.admin.select_next(scheduled);
        }
        (MenuItem::Admin, Char('k') | KeyCode::Up, _) => app.state.admin.select_prev(),
        (MenuItem::Admin, KeyCode::Tab | Char('i'), _) => app.state.admin.focus_form(),

        (MenuItem::Admin, Char('s'), _) if app.state.admin.view == AdminView::Schedule => {
            if let Some(m) = app.state.admin_selected_match() {
                requests.push(NetworkRequest::StartMatch { match_id: m.id });
            }
        }
        (MenuItem::Admin, Char('d'), _) if app.state.admin.view == AdminView::Schedule => {
            if let Some(m) = app.state.admin_selected_match() {
                requests.push(NetworkRequest::DeleteMatch { match_id: m.id });
            }
        }

        (MenuItem::Admin, Char('a'), _) if app.state.admin.view == AdminView::Players => {
            app.state.admin.add_player()
        }
        (MenuItem::Admin, Char('e'), _) if app.state.admin.view == AdminView::Players => {
            app.state.admin.edit_player()
        }
        (MenuItem::Admin, Char('d'), _) if app.state.admin.view == AdminView::Players => {
            requests.extend(app.state.admin.delete_player_request())
        }

        (MenuItem::Admin, KeyCode::Right | Char('l') | Char(' '), _)
            if app.state.admin.view == AdminView::Settings =>
        {
            app.state.admin.cycle_setting(true)
        }
        (MenuItem::Admin, KeyCode::Left | Char('h'), _)
            if app.state.admin.view == AdminView::Settings =>
        {
            app.state.admin.cycle_setting(false)
        }
        (MenuItem::Admin, KeyCode::Enter, _) if app.state.admin.view == AdminView::Settings => {
            requests.extend(app.state.admin.save_settings_request())
        }

        // Global
        (_, Char('r'), _) => {
            requests.push(NetworkRequest::RefreshMatches);
            if let Some(match_id) = app.open_match_id() {
                requests.push(NetworkRequest::LoadMatch { match_id });
            }
        }
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    requests
}
