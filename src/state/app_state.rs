use crate::app::MenuItem;
use crate::state::messages::NetworkRequest;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use courtside_api::format::AVAILABLE_COURTS;
use courtside_api::scoring::{self, NextStep};
use courtside_api::{
    AuthStatus, DashboardStats, Match, MatchFilter, MatchStats, MatchStatus, NewMatch, NewPlayer,
    Player, ScoreAction, Settings, Side, SortBy, SortOrder,
};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DashboardState {
    pub stats: DashboardStats,
    pub live: Vec<Match>,
    pub scheduled: Vec<Match>,
    /// Index into live ++ scheduled.
    pub selected: usize,
    pub last_updated: Option<NaiveDateTime>,
}

impl DashboardState {
    /// Replace both lists, keeping the selection on the same match when it survives.
    pub fn load(
        &mut self,
        stats: DashboardStats,
        live: Vec<Match>,
        scheduled: Vec<Match>,
        now: NaiveDateTime,
    ) {
        let selected_id = self.selected_match_id();
        self.stats = stats;
        self.live = live;
        self.scheduled = scheduled;
        self.last_updated = Some(now);
        self.selected = selected_id
            .and_then(|id| self.entries().position(|m| m.id == id))
            .unwrap_or(self.selected)
            .min(self.len().saturating_sub(1));
    }

    /// Fold a single fresh snapshot into the lists it belongs to.
    pub fn upsert(&mut self, snapshot: &Match) {
        let selected_id = self.selected_match_id();
        self.live.retain(|m| m.id != snapshot.id);
        self.scheduled.retain(|m| m.id != snapshot.id);
        match snapshot.status {
            MatchStatus::Live => self.live.push(snapshot.clone()),
            MatchStatus::Scheduled => self.scheduled.push(snapshot.clone()),
            MatchStatus::Completed => {}
        }
        if let Some(pos) = selected_id.and_then(|id| self.entries().position(|m| m.id == id)) {
            self.selected = pos;
        }
        self.selected = self.selected.min(self.len().saturating_sub(1));
    }

    pub fn remove(&mut self, match_id: u64) {
        self.live.retain(|m| m.id != match_id);
        self.scheduled.retain(|m| m.id != match_id);
        self.selected = self.selected.min(self.len().saturating_sub(1));
    }

    pub fn entries(&self) -> impl Iterator<Item = &Match> {
        self.live.iter().chain(self.scheduled.iter())
    }

    pub fn len(&self) -> usize {
        self.live.len() + self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.entries().nth(self.selected)
    }

    pub fn selected_match_id(&self) -> Option<u64> {
        self.selected_match().map(|m| m.id)
    }
}

// ---------------------------------------------------------------------------
// Scoring state
// ---------------------------------------------------------------------------

/// The match open on the Scoring tab.
///
/// `updating` is set when a mutation is sent and cleared only by that mutation's own reply (or
/// its error). While it is set every further mutation is dropped and polled snapshots are not
/// applied, since they may predate the change.
#[derive(Debug, Default)]
pub struct ScoringState {
    pub match_id: Option<u64>,
    pub snapshot: Option<Match>,
    pub updating: bool,
}

impl ScoringState {
    /// Open a match, showing `preview` until its own snapshot arrives.
    pub fn open(&mut self, match_id: u64, preview: Option<Match>) {
        if self.match_id != Some(match_id) {
            self.snapshot = preview.filter(|m| m.id == match_id);
        }
        self.match_id = Some(match_id);
        self.updating = false;
    }

    /// Apply a polled snapshot if it belongs to the open match and no mutation is in flight.
    pub fn apply(&mut self, snapshot: Match) -> bool {
        if self.match_id != Some(snapshot.id) || self.updating {
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    /// Apply the snapshot that answers a mutation and release the lock.
    pub fn apply_mutation(&mut self, snapshot: Match) -> bool {
        if self.match_id != Some(snapshot.id) {
            return false;
        }
        self.snapshot = Some(snapshot);
        self.updating = false;
        true
    }

    /// A mutation failed. Only a failure for the open match releases the lock.
    pub fn mutation_failed(&mut self, match_id: u64) {
        if self.match_id == Some(match_id) {
            self.updating = false;
        }
    }

    pub fn score_request(&mut self, side: Side, action: ScoreAction) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if !scoring::can_score(m) {
            return None;
        }
        let set = scoring::current_set(m);
        if action == ScoreAction::Decrement && set.score(side) == 0 {
            return None;
        }
        let request = NetworkRequest::ChangeScore {
            match_id: m.id,
            set_number: set.set_number,
            side,
            action,
        };
        self.begin(request)
    }

    pub fn next_set_request(&mut self) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if scoring::next_step(m) != Some(NextStep::NextSet) {
            return None;
        }
        let request = NetworkRequest::NextSet { match_id: m.id };
        self.begin(request)
    }

    pub fn end_request(&mut self) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if scoring::next_step(m) != Some(NextStep::EndMatch) {
            return None;
        }
        let request = NetworkRequest::EndMatch { match_id: m.id };
        self.begin(request)
    }

    pub fn end_abruptly_request(&mut self) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if !m.is_live() {
            return None;
        }
        let request = NetworkRequest::EndMatchAbruptly { match_id: m.id };
        self.begin(request)
    }

    pub fn start_request(&mut self) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if m.status != MatchStatus::Scheduled {
            return None;
        }
        let request = NetworkRequest::StartMatch { match_id: m.id };
        self.begin(request)
    }

    pub fn shuttles_request(&mut self, increase: bool) -> Option<NetworkRequest> {
        let m = self.snapshot.as_ref()?;
        if !m.is_live() || (!increase && m.shuttles_used == 0) {
            return None;
        }
        let shuttles_used = if increase { m.shuttles_used + 1 } else { m.shuttles_used - 1 };
        let request = NetworkRequest::SetShuttles { match_id: m.id, shuttles_used };
        self.begin(request)
    }

    fn begin(&mut self, request: NetworkRequest) -> Option<NetworkRequest> {
        if self.updating {
            return None;
        }
        self.updating = true;
        Some(request)
    }
}

// ---------------------------------------------------------------------------
// History state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct HistoryState {
    pub matches: Vec<Match>,
    pub stats: MatchStats,
    pub selected: usize,
    pub court: Option<String>,
    pub sort_order: SortOrder,
    /// Search text as typed. Filters locally while editing.
    pub search: String,
    pub editing_search: bool,
    /// Outcome of the last scoresheet export.
    pub notice: Option<String>,
}

impl HistoryState {
    pub fn filter(&self) -> MatchFilter {
        let search = self.search.trim();
        MatchFilter {
            court: self.court.clone(),
            search: (!search.is_empty()).then(|| search.to_string()),
            sort_by: SortBy::EndTime,
            sort_order: self.sort_order,
            ..MatchFilter::with_status(MatchStatus::Completed)
        }
    }

    pub fn load(&mut self, matches: Vec<Match>, stats: MatchStats) {
        self.matches = matches;
        self.stats = stats;
        self.selected = self.selected.min(self.visible().len().saturating_sub(1));
    }

    /// None → court1 → … → court4 → None.
    pub fn cycle_court(&mut self) {
        let next = match self.court.as_deref() {
            None => AVAILABLE_COURTS.first(),
            Some(current) => AVAILABLE_COURTS
                .iter()
                .position(|c| *c == current)
                .and_then(|i| AVAILABLE_COURTS.get(i + 1)),
        };
        self.court = next.map(|c| c.to_string());
        self.selected = 0;
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggle();
        self.selected = 0;
    }

    pub fn visible(&self) -> Vec<&Match> {
        let needle = self.search.trim().to_lowercase();
        self.matches
            .iter()
            .filter(|m| {
                needle.is_empty()
                    || [&m.player1, &m.player2, &m.match_number, &m.event_type]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.visible().get(self.selected).copied()
    }
}

/// Winner name for a finished match, or "Draw" when the set tally is level.
pub fn result_label(m: &Match) -> String {
    match scoring::match_outcome(m).winner {
        Some(side) => m.player_name(side).to_string(),
        None => "Draw".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Admin state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    EventType,
    MatchNumber,
    Date,
    Time,
    Court,
    Player1,
    Player2,
    MaxPoints,
    TotalSets,
    Deuce,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::EventType,
        FormField::MatchNumber,
        FormField::Date,
        FormField::Time,
        FormField::Court,
        FormField::Player1,
        FormField::Player2,
        FormField::MaxPoints,
        FormField::TotalSets,
        FormField::Deuce,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::EventType => "Event type",
            FormField::MatchNumber => "Match number",
            FormField::Date => "Date",
            FormField::Time => "Time",
            FormField::Court => "Court",
            FormField::Player1 => "Player 1",
            FormField::Player2 => "Player 2",
            FormField::MaxPoints => "Max points",
            FormField::TotalSets => "Total sets",
            FormField::Deuce => "Deuce",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Fields picked from a fixed set rather than typed.
    pub fn is_choice(self) -> bool {
        matches!(self, FormField::EventType | FormField::Court | FormField::Deuce)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminForm {
    pub event_type: String,
    pub match_number: String,
    pub date: String,
    pub time: String,
    pub court: String,
    pub player1: String,
    pub player2: String,
    pub max_points: String,
    pub total_sets: String,
    pub deuce_enabled: bool,
}

impl AdminForm {
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            event_type: settings.default_event_types.first().cloned().unwrap_or_default(),
            date: today.format("%Y-%m-%d").to_string(),
            court: AVAILABLE_COURTS[0].to_string(),
            max_points: settings.default_max_points.to_string(),
            total_sets: settings.default_total_sets.to_string(),
            deuce_enabled: settings.default_deuce_enabled,
            ..Self::default()
        }
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Deuce => if self.deuce_enabled { "on" } else { "off" }.to_string(),
            _ => self.text(field).cloned().unwrap_or_default(),
        }
    }

    fn text(&self, field: FormField) -> Option<&String> {
        Some(match field {
            FormField::EventType => &self.event_type,
            FormField::MatchNumber => &self.match_number,
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Court => &self.court,
            FormField::Player1 => &self.player1,
            FormField::Player2 => &self.player2,
            FormField::MaxPoints => &self.max_points,
            FormField::TotalSets => &self.total_sets,
            FormField::Deuce => return None,
        })
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        Some(match field {
            FormField::MatchNumber => &mut self.match_number,
            FormField::Date => &mut self.date,
            FormField::Time => &mut self.time,
            FormField::Player1 => &mut self.player1,
            FormField::Player2 => &mut self.player2,
            FormField::MaxPoints => &mut self.max_points,
            FormField::TotalSets => &mut self.total_sets,
            FormField::EventType | FormField::Court | FormField::Deuce => return None,
        })
    }

    pub fn input_char(&mut self, field: FormField, c: char) {
        let numeric = matches!(field, FormField::MaxPoints | FormField::TotalSets);
        if numeric && !c.is_ascii_digit() {
            return;
        }
        if let Some(text) = self.text_mut(field) {
            text.push(c);
        }
    }

    pub fn backspace(&mut self, field: FormField) {
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    /// Step a choice field through its options.
    pub fn cycle(&mut self, field: FormField, event_types: &[String], forward: bool) {
        fn step<S: AsRef<str>>(options: &[S], current: &str, forward: bool) -> Option<String> {
            if options.is_empty() {
                return None;
            }
            let len = options.len();
            let next = match options.iter().position(|o| o.as_ref() == current) {
                Some(i) if forward => (i + 1) % len,
                Some(i) => (i + len - 1) % len,
                None => 0,
            };
            Some(options[next].as_ref().to_string())
        }

        match field {
            FormField::EventType => {
                if let Some(next) = step(event_types, &self.event_type, forward) {
                    self.event_type = next;
                }
            }
            FormField::Court => {
                if let Some(next) = step(&AVAILABLE_COURTS[..], &self.court, forward) {
                    self.court = next;
                }
            }
            FormField::Deuce => self.deuce_enabled = !self.deuce_enabled,
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<NewMatch, String> {
        for field in FormField::ALL {
            if let Some(text) = self.text(field)
                && text.trim().is_empty()
            {
                return Err(format!("{} is required", field.label()));
            }
        }
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Date must be YYYY-MM-DD".to_string())?;
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| "Time must be HH:MM".to_string())?;
        let max_points = self
            .max_points
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or("Max points must be a positive number")?;
        let total_sets = self
            .total_sets
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|s| *s > 0 && s % 2 == 1)
            .ok_or("Total sets must be an odd number")?;
        if self.player1.trim().eq_ignore_ascii_case(self.player2.trim()) {
            return Err("Players must be different".to_string());
        }

        Ok(NewMatch {
            event_type: self.event_type.trim().to_string(),
            match_number: self.match_number.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            court: self.court.clone(),
            umpire: None,
            service_judge: None,
            max_points,
            total_sets,
            deuce_enabled: self.deuce_enabled,
            player1: self.player1.trim().to_string(),
            player2: self.player2.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminView {
    #[default]
    Schedule,
    Players,
    Settings,
}

impl AdminView {
    pub const ALL: [AdminView; 3] = [AdminView::Schedule, AdminView::Players, AdminView::Settings];

    pub fn label(self) -> &'static str {
        match self {
            AdminView::Schedule => "Schedule",
            AdminView::Players => "Players",
            AdminView::Settings => "Settings",
        }
    }

    pub fn next(self) -> Self {
        match self {
            AdminView::Schedule => AdminView::Players,
            AdminView::Players => AdminView::Settings,
            AdminView::Settings => AdminView::Schedule,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerField {
    Name,
    Team,
    Email,
    Phone,
}

impl PlayerField {
    pub const ALL: [PlayerField; 4] =
        [PlayerField::Name, PlayerField::Team, PlayerField::Email, PlayerField::Phone];

    pub fn label(self) -> &'static str {
        match self {
            PlayerField::Name => "Name",
            PlayerField::Team => "Team",
            PlayerField::Email => "Email",
            PlayerField::Phone => "Phone",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Add or edit form for one player. `editing` holds the id of the player being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerForm {
    pub editing: Option<u64>,
    pub name: String,
    pub team: String,
    pub email: String,
    pub phone: String,
}

impl PlayerForm {
    pub fn edit(player: &Player) -> Self {
        Self {
            editing: Some(player.id),
            name: player.name.clone(),
            team: player.team.clone().unwrap_or_default(),
            email: player.email.clone().unwrap_or_default(),
            phone: player.phone.clone().unwrap_or_default(),
        }
    }

    pub fn value(&self, field: PlayerField) -> &str {
        match field {
            PlayerField::Name => &self.name,
            PlayerField::Team => &self.team,
            PlayerField::Email => &self.email,
            PlayerField::Phone => &self.phone,
        }
    }

    fn text_mut(&mut self, field: PlayerField) -> &mut String {
        match field {
            PlayerField::Name => &mut self.name,
            PlayerField::Team => &mut self.team,
            PlayerField::Email => &mut self.email,
            PlayerField::Phone => &mut self.phone,
        }
    }

    pub fn validate(&self) -> Result<NewPlayer, String> {
        let optional = |text: &str| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let email = optional(&self.email);
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err("Email must contain @".to_string());
        }
        Ok(NewPlayer {
            name: name.to_string(),
            team: optional(&self.team),
            email,
            phone: optional(&self.phone),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    MaxPoints,
    TotalSets,
    Deuce,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] =
        [SettingsField::MaxPoints, SettingsField::TotalSets, SettingsField::Deuce];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::MaxPoints => "Points per set",
            SettingsField::TotalSets => "Total sets",
            SettingsField::Deuce => "Deuce by default",
        }
    }

    pub fn value(self, settings: &Settings) -> String {
        match self {
            SettingsField::MaxPoints => format!("{} points", settings.default_max_points),
            SettingsField::TotalSets => format!("best of {}", settings.default_total_sets),
            SettingsField::Deuce => if settings.default_deuce_enabled { "on" } else { "off" }.to_string(),
        }
    }
}

const MAX_POINTS_CHOICES: [u32; 3] = [11, 15, 21];
const TOTAL_SETS_CHOICES: [u32; 3] = [1, 3, 5];

fn step_choice(options: &[u32], current: u32, forward: bool) -> u32 {
    let len = options.len();
    let next = match options.iter().position(|o| *o == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    options[next]
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub view: AdminView,
    pub settings: Settings,
    pub form: AdminForm,
    /// `Some` while the schedule form has keyboard focus.
    pub focus: Option<FormField>,
    /// Index into the dashboard's scheduled list.
    pub selected: usize,
    pub notice: Option<String>,
    pub players: Vec<Player>,
    pub player_selected: usize,
    pub player_form: PlayerForm,
    /// `Some` while the player form has keyboard focus.
    pub player_focus: Option<PlayerField>,
    /// Settings as edited on the Settings view, saved with Enter.
    pub settings_draft: Settings,
    pub settings_selected: usize,
}

impl AdminState {
    pub fn apply_settings(&mut self, settings: Settings, today: NaiveDate) {
        // Only reset an untouched form.
        if self.form == AdminForm::default() || self.form == AdminForm::from_settings(&self.settings, today) {
            self.form = AdminForm::from_settings(&settings, today);
        }
        self.settings_draft = settings.clone();
        self.settings = settings;
    }

    pub fn cycle_view(&mut self) {
        self.leave_form();
        self.view = self.view.next();
        self.notice = None;
    }

    /// True while typing goes to one of the forms.
    pub fn is_editing(&self) -> bool {
        match self.view {
            AdminView::Schedule => self.focus.is_some(),
            AdminView::Players => self.player_focus.is_some(),
            AdminView::Settings => false,
        }
    }

    pub fn focus_form(&mut self) {
        match self.view {
            AdminView::Schedule => self.focus = Some(self.focus.unwrap_or(FormField::EventType)),
            AdminView::Players => {
                self.player_focus = Some(self.player_focus.unwrap_or(PlayerField::Name))
            }
            AdminView::Settings => {}
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.map(FormField::next);
        self.player_focus = self.player_focus.map(PlayerField::next);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.map(FormField::prev);
        self.player_focus = self.player_focus.map(PlayerField::prev);
    }

    pub fn leave_form(&mut self) {
        self.focus = None;
        self.player_focus = None;
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.player_focus {
            self.player_form.text_mut(field).push(c);
            return;
        }
        let Some(field) = self.focus else {
            return;
        };
        if field.is_choice() {
            if c == ' ' {
                self.form.cycle(field, &self.settings.default_event_types, true);
            }
            return;
        }
        self.form.input_char(field, c);
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(field) = self.focus
            && field.is_choice()
        {
            self.form.cycle(field, &self.settings.default_event_types, forward);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.player_focus {
            self.player_form.text_mut(field).pop();
        } else if let Some(field) = self.focus {
            self.form.backspace(field);
        }
    }

    /// Validate the focused form into a request, or leave the reason in `notice`.
    pub fn submit(&mut self) -> Option<NetworkRequest> {
        if self.player_focus.is_some() {
            return self.submit_player();
        }
        match self.form.validate() {
            Ok(new_match) => {
                self.notice = Some(format!("Scheduling {}...", new_match.match_number));
                Some(NetworkRequest::CreateMatch { new_match })
            }
            Err(reason) => {
                self.notice = Some(reason);
                None
            }
        }
    }

    /// Clear the per-match fields after a successful create; keep the rules and the court.
    pub fn reset_after_create(&mut self) {
        self.form.match_number.clear();
        self.form.player1.clear();
        self.form.player2.clear();
        self.form.time.clear();
        self.focus = None;
    }

    pub fn select_next(&mut self, scheduled: usize) {
        match self.view {
            AdminView::Schedule => {
                if self.selected + 1 < scheduled {
                    self.selected += 1;
                }
            }
            AdminView::Players => {
                if self.player_selected + 1 < self.players.len() {
                    self.player_selected += 1;
                }
            }
            AdminView::Settings => {
                if self.settings_selected + 1 < SettingsField::ALL.len() {
                    self.settings_selected += 1;
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.view {
            AdminView::Schedule => self.selected = self.selected.saturating_sub(1),
            AdminView::Players => self.player_selected = self.player_selected.saturating_sub(1),
            AdminView::Settings => self.settings_selected = self.settings_selected.saturating_sub(1),
        }
    }

    // Players

    pub fn players_loaded(&mut self, players: Vec<Player>, notice: Option<String>) {
        self.players = players;
        self.player_selected = self.player_selected.min(self.players.len().saturating_sub(1));
        if notice.is_some() {
            self.notice = notice;
            self.player_form = PlayerForm::default();
            self.player_focus = None;
        }
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.players.get(self.player_selected)
    }

    pub fn add_player(&mut self) {
        self.player_form = PlayerForm::default();
        self.player_focus = Some(PlayerField::Name);
    }

    pub fn edit_player(&mut self) {
        if let Some(player) = self.selected_player() {
            self.player_form = PlayerForm::edit(player);
            self.player_focus = Some(PlayerField::Name);
        }
    }

    fn submit_player(&mut self) -> Option<NetworkRequest> {
        match self.player_form.validate() {
            Ok(player) => {
                self.notice = Some(format!("Saving {}...", player.name));
                Some(match self.player_form.editing {
                    Some(player_id) => NetworkRequest::UpdatePlayer { player_id, player },
                    None => NetworkRequest::CreatePlayer { player },
                })
            }
            Err(reason) => {
                self.notice = Some(reason);
                None
            }
        }
    }

    pub fn delete_player_request(&self) -> Option<NetworkRequest> {
        self.selected_player().map(|p| NetworkRequest::DeletePlayer { player_id: p.id })
    }

    // Settings

    pub fn selected_setting(&self) -> SettingsField {
        SettingsField::ALL[self.settings_selected.min(SettingsField::ALL.len() - 1)]
    }

    pub fn cycle_setting(&mut self, forward: bool) {
        let field = self.selected_setting();
        let draft = &mut self.settings_draft;
        match field {
            SettingsField::MaxPoints => {
                draft.default_max_points =
                    step_choice(&MAX_POINTS_CHOICES, draft.default_max_points, forward)
            }
            SettingsField::TotalSets => {
                draft.default_total_sets =
                    step_choice(&TOTAL_SETS_CHOICES, draft.default_total_sets, forward)
            }
            SettingsField::Deuce => draft.default_deuce_enabled = !draft.default_deuce_enabled,
        }
    }

    pub fn settings_dirty(&self) -> bool {
        self.settings_draft != self.settings
    }

    pub fn save_settings_request(&mut self) -> Option<NetworkRequest> {
        if !self.settings_dirty() {
            return None;
        }
        self.notice = Some("Saving settings...".to_string());
        Some(NetworkRequest::SaveSettings { settings: self.settings_draft.clone() })
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub auth: AuthStatus,
    pub dashboard: DashboardState,
    pub scoring: ScoringState,
    pub history: HistoryState,
    pub admin: AdminState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while keystrokes go to a text field instead of the key bindings.
    pub fn is_text_input(&self) -> bool {
        match self.active_tab {
            MenuItem::History => self.history.editing_search,
            MenuItem::Admin => self.admin.is_editing(),
            _ => false,
        }
    }

    pub fn admin_selected_match(&self) -> Option<&Match> {
        self.dashboard.scheduled.get(self.admin.selected)
    }
}
