pub mod client;
pub mod format;
pub mod scoring;
pub mod wire;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Domain types, independent of the API wire format
// ---------------------------------------------------------------------------

/// One of the two competitors in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    /// Numeric encoding used by the score endpoint.
    pub fn number(self) -> u8 {
        match self {
            Side::Player1 => 1,
            Side::Player2 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => MatchStatus::Live,
            "completed" => MatchStatus::Completed,
            _ => MatchStatus::Scheduled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Live => "LIVE",
            MatchStatus::Completed => "FINAL",
        }
    }
}

/// Per-match rules, fixed when the match is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub max_points: u32,
    pub total_sets: u32,
    pub deuce_enabled: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { max_points: 21, total_sets: 3, deuce_enabled: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetScore {
    pub set_number: u32,
    pub player1_score: u32,
    pub player2_score: u32,
    pub completed: bool,
    pub updated_at: Option<NaiveDateTime>,
}

impl SetScore {
    /// Zero-score, in-progress record for a set the API has not reported yet.
    pub fn empty(set_number: u32) -> Self {
        Self { set_number, ..Self::default() }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Player1 => self.player1_score,
            Side::Player2 => self.player2_score,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Match {
    pub id: u64,
    pub event_type: String,
    pub match_number: String,
    pub date: String, // "YYYY-MM-DD" as scheduled
    pub time: String, // "HH:MM" as scheduled
    pub court: String,
    pub umpire: Option<String>,
    pub service_judge: Option<String>,
    pub player1: String,
    pub player2: String,
    pub status: MatchStatus,
    pub config: MatchConfig,
    pub current_set: u32,
    pub scores: Vec<SetScore>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<String>, // server formatted, e.g. "1h 5m"
    pub shuttles_used: u32,
}

impl Match {
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    pub fn player_name(&self, side: Side) -> &str {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub team: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPlayer {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Tournament-wide defaults used when scheduling a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_max_points: u32,
    pub default_total_sets: u32,
    pub default_deuce_enabled: bool,
    pub default_courts: Vec<String>,
    pub default_event_types: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_max_points: 21,
            default_total_sets: 3,
            default_deuce_enabled: true,
            default_courts: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            default_event_types: vec!["Singles".into(), "Doubles".into(), "Mixed Doubles".into()],
        }
    }
}

impl Settings {
    /// Parse the API's flat key/value settings map. Missing or malformed values keep their
    /// defaults.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let parse_u32 = |key: &str, fallback: u32| {
            map.get(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };
        let parse_list = |key: &str, fallback: Vec<String>| {
            map.get(key)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                })
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            default_max_points: parse_u32("default_max_points", defaults.default_max_points),
            default_total_sets: parse_u32("default_total_sets", defaults.default_total_sets),
            default_deuce_enabled: map
                .get("default_deuce_enabled")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.default_deuce_enabled),
            default_courts: parse_list("default_courts", defaults.default_courts),
            default_event_types: parse_list("default_event_types", defaults.default_event_types),
        }
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("default_max_points".to_owned(), self.default_max_points.to_string()),
            ("default_total_sets".to_owned(), self.default_total_sets.to_string()),
            (
                "default_deuce_enabled".to_owned(),
                if self.default_deuce_enabled { "1" } else { "0" }.to_owned(),
            ),
            ("default_courts".to_owned(), self.default_courts.join(",")),
            ("default_event_types".to_owned(), self.default_event_types.join(",")),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub live_matches: u32,
    pub completed_today: u32,
    pub active_courts: u32,
    pub avg_duration: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchStats {
    pub total_matches: u32,
    pub total_shuttles: u32,
    pub event_distribution: HashMap<String, u32>,
    pub avg_shuttles_per_match: f64,
}

/// Request body for scheduling a match.
#[derive(Debug, Clone, Serialize)]
pub struct NewMatch {
    pub event_type: String,
    pub match_number: String,
    pub date: String,
    pub time: String,
    pub court: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umpire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_judge: Option<String>,
    pub max_points: u32,
    pub total_sets: u32,
    pub deuce_enabled: bool,
    pub player1: String,
    pub player2: String,
}

/// Partial update for an existing match; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umpire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_judge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuttles_used: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreAction {
    Increment,
    Decrement,
}

/// The API's reply to a score change: the new score of the set it touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub player1_score: u32,
    pub player2_score: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEnded {
    pub end_time: Option<NaiveDateTime>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    EndTime,
    ScheduledDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Server-side filters for the match list. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub status: Option<MatchStatus>,
    pub court: Option<String>,
    pub date: Option<String>,
    pub event_type: Option<String>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl MatchFilter {
    pub fn with_status(status: MatchStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        let optional = [
            ("court", &self.court),
            ("date", &self.date),
            ("event_type", &self.event_type),
            ("search", &self.search),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().map(str::trim)
                && !v.is_empty()
            {
                pairs.push((key, v.to_owned()));
            }
        }
        pairs.push((
            "sort_by",
            match self.sort_by {
                SortBy::EndTime => "end_time",
                SortBy::ScheduledDate => "scheduled_date",
            }
            .to_owned(),
        ));
        pairs.push((
            "sort_order",
            match self.sort_order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            }
            .to_owned(),
        ));
        pairs
    }
}
