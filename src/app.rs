use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::export;
use crate::state::messages::NetworkRequest;
use chrono::{Local, NaiveDate, NaiveDateTime};
use courtside_api::{AuthStatus, DashboardStats, Match, MatchStats, Player, Settings};
use log::{info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Dashboard,
    Scoring,
    History,
    Admin,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_logged_in(&mut self, auth: AuthStatus) {
        self.state.auth = auth;
        if !auth.is_admin {
            warn!("logged in without admin rights; admin actions will be rejected");
        }
    }

    pub fn on_logged_out(&mut self) {
        info!("signed out");
        self.state.auth = AuthStatus::default();
        self.state.admin.notice = Some("Signed out".to_string());
    }

    /// Sign out when signed in, otherwise sign in with the configured credentials.
    pub fn sign_in_or_out(&mut self) -> Option<NetworkRequest> {
        if self.state.auth.authenticated {
            return Some(NetworkRequest::Logout);
        }
        match self.settings.credentials() {
            Some((username, password)) => Some(NetworkRequest::Login { username, password }),
            None => {
                self.state.admin.notice =
                    Some("Set COURTSIDE_USER and COURTSIDE_PASSWORD to sign in".to_string());
                None
            }
        }
    }

    pub fn on_settings_loaded(&mut self, settings: Settings) {
        self.state.admin.apply_settings(settings, today());
    }

    pub fn on_settings_saved(&mut self, settings: Settings) {
        self.state.admin.apply_settings(settings, today());
        self.state.admin.notice = Some("Settings saved".to_string());
    }

    pub fn on_matches_loaded(&mut self, stats: DashboardStats, live: Vec<Match>, scheduled: Vec<Match>) {
        self.state.last_error = None;
        self.state.dashboard.load(stats, live, scheduled, now());
        let scheduled = self.state.dashboard.scheduled.len();
        self.state.admin.selected = self.state.admin.selected.min(scheduled.saturating_sub(1));
    }

    pub fn on_history_loaded(&mut self, matches: Vec<Match>, stats: MatchStats) {
        self.state.last_error = None;
        self.state.history.load(matches, stats);
    }

    pub fn on_match_loaded(&mut self, snapshot: Match) {
        self.state.last_error = None;
        self.state.dashboard.upsert(&snapshot);
        self.state.scoring.apply(snapshot);
    }

    pub fn on_mutation_applied(&mut self, snapshot: Match) {
        self.state.last_error = None;
        self.state.dashboard.upsert(&snapshot);
        self.state.scoring.apply_mutation(snapshot);
    }

    pub fn on_players_loaded(&mut self, players: Vec<Player>, notice: Option<String>) {
        self.state.admin.players_loaded(players, notice);
    }

    pub fn on_scoresheet_exported(&mut self, snapshot: Match) {
        match export::write_scoresheet(&self.settings.export_dir, &snapshot) {
            Ok(path) => {
                info!(
                    "scoresheet for match {} ({}) written to {}",
                    snapshot.id,
                    export::winner_name(&snapshot).unwrap_or("draw"),
                    path.display()
                );
                self.state.history.notice = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                warn!("could not write scoresheet: {e:#}");
                self.state.history.notice = Some(format!("Export failed: {e:#}"));
            }
        }
    }

    pub fn on_match_created(&mut self, match_id: u64) {
        info!("scheduled match {match_id}");
        self.state.admin.notice = Some(format!("Match {match_id} scheduled"));
        self.state.admin.reset_after_create();
    }

    pub fn on_match_deleted(&mut self, match_id: u64) {
        info!("deleted match {match_id}");
        self.state.dashboard.remove(match_id);
        self.state.admin.notice = Some(format!("Match {match_id} deleted"));
        if self.state.scoring.match_id == Some(match_id) {
            self.state.scoring = Default::default();
        }
    }

    pub fn on_error(&mut self, message: String, mutated_match: Option<u64>) {
        // A failed mutation must not leave the scoring controls locked.
        if let Some(match_id) = mutated_match {
            self.state.scoring.mutation_failed(match_id);
        }
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.history.editing_search = false;
        self.state.admin.leave_form();
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
        if let Err(e) = self.settings.save_preferences() {
            warn!("could not save preferences: {e:#}");
        }
    }

    // -----------------------------------------------------------------------
    // Opening a match on the Scoring tab
    // -----------------------------------------------------------------------

    /// Open the dashboard selection. Returns the id to fetch.
    pub fn open_dashboard_selection(&mut self) -> Option<u64> {
        let preview = self.state.dashboard.selected_match()?.clone();
        Some(self.open_match(preview))
    }

    pub fn open_history_selection(&mut self) -> Option<u64> {
        let preview = self.state.history.selected_match()?.clone();
        Some(self.open_match(preview))
    }

    fn open_match(&mut self, preview: Match) -> u64 {
        let match_id = preview.id;
        self.state.scoring.open(match_id, Some(preview));
        self.update_tab(MenuItem::Scoring);
        match_id
    }

    pub fn open_match_id(&self) -> Option<u64> {
        self.state.scoring.match_id
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_api::{MatchStatus, ScoreAction, SetScore, Side};

    fn app() -> App {
        App { settings: AppSettings::default(), state: AppState::new() }
    }

    fn live(id: u64) -> Match {
        Match { id, status: MatchStatus::Live, ..Match::default() }
    }

    #[test]
    fn opening_a_match_switches_to_scoring() {
        let mut app = app();
        app.on_matches_loaded(DashboardStats::default(), vec![live(3)], vec![]);
        assert_eq!(app.open_dashboard_selection(), Some(3));
        assert_eq!(app.state.active_tab, MenuItem::Scoring);
        assert_eq!(app.open_match_id(), Some(3));
        assert!(app.state.scoring.snapshot.is_some());
    }

    #[test]
    fn error_unlocks_scoring_controls() {
        let mut app = app();
        app.state.scoring.updating = true;
        app.state.scoring.match_id = Some(3);
        app.on_error("match 3 not found".into(), None);
        assert!(app.state.scoring.updating);

        app.on_error("Set is already completed".into(), Some(3));
        assert!(!app.state.scoring.updating);
        assert_eq!(app.state.last_error.as_deref(), Some("Set is already completed"));
    }

    #[test]
    fn queued_poll_does_not_unlock_mutation() {
        let mut app = app();
        let before = Match { current_set: 1, scores: vec![SetScore { set_number: 1, player1_score: 3, ..SetScore::empty(1) }], ..live(5) };
        app.state.scoring.open(5, Some(before.clone()));
        assert!(app.state.scoring.score_request(Side::Player1, ScoreAction::Increment).is_some());

        app.on_match_loaded(before);
        assert!(app.state.scoring.updating);
        assert!(app.state.scoring.score_request(Side::Player1, ScoreAction::Increment).is_none());

        let after = Match { current_set: 1, scores: vec![SetScore { set_number: 1, player1_score: 4, ..SetScore::empty(1) }], ..live(5) };
        app.on_mutation_applied(after);
        assert!(!app.state.scoring.updating);
        let shown = app.state.scoring.snapshot.as_ref().map(|m| m.scores[0].player1_score);
        assert_eq!(shown, Some(4));
    }

    #[test]
    fn scoresheet_export_reports_path() {
        let mut app = app();
        let dir = std::env::temp_dir().join(format!("courtside-app-export-{}", std::process::id()));
        app.settings.export_dir = dir.clone();
        app.on_scoresheet_exported(Match { id: 8, match_number: "f-1".into(), ..Match::default() });
        let expected = format!("Saved {}", dir.join("scoresheet-8-f-1.txt").display());
        assert_eq!(app.state.history.notice.as_deref(), Some(expected.as_str()));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sign_out_clears_auth() {
        let mut app = app();
        app.on_logged_in(AuthStatus { authenticated: true, is_admin: true });
        assert!(matches!(app.sign_in_or_out(), Some(NetworkRequest::Logout)));
        app.on_logged_out();
        assert_eq!(app.state.auth, AuthStatus::default());

        assert!(app.sign_in_or_out().is_none());
        app.settings.username = Some("umpire".into());
        app.settings.password = Some("secret".into());
        assert!(matches!(
            app.sign_in_or_out(),
            Some(NetworkRequest::Login { username, .. }) if username == "umpire"
        ));
    }

    #[test]
    fn deleting_open_match_closes_it() {
        let mut app = app();
        app.on_matches_loaded(DashboardStats::default(), vec![], vec![Match { id: 9, ..Match::default() }]);
        app.open_dashboard_selection();
        app.on_match_deleted(9);
        assert_eq!(app.open_match_id(), None);
        assert_eq!(app.state.dashboard.len(), 0);
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        app.update_tab(MenuItem::History);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::History);
    }
}
