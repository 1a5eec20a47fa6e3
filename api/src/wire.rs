//! Raw wire types for the match management API: serde shapes for its JSON replies.
//! These map to the clean domain types in lib.rs via the `into_*` fns below.
//!
//! The API serves SQLite rows more or less verbatim, so booleans may arrive as `0`/`1` and
//! timestamps in whatever textual form the row was written with.
use crate::{
    AuthStatus, DashboardStats, Match, MatchConfig, MatchEnded, MatchStats, MatchStatus, Player,
    ScoreUpdate, SetScore,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrInt {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<BoolOrInt>::deserialize(deserializer)?;
    Ok(match value {
        Some(BoolOrInt::Bool(b)) => b,
        Some(BoolOrInt::Int(i)) => i != 0,
        Some(BoolOrInt::Text(s)) => matches!(s.trim(), "1" | "true" | "True"),
        None => false,
    })
}

/// Parse the timestamp forms the API emits: `isoformat()` (`T`, optional fraction),
/// SQLite `CURRENT_TIMESTAMP` (space separated) or RFC 3339 with an offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn timestamp(raw: Option<String>) -> Option<NaiveDateTime> {
    raw.as_deref().and_then(parse_timestamp)
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: u64,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub match_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub court: String,
    pub umpire: Option<String>,
    pub service_judge: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub shuttles_used: Option<u32>,
    pub max_points: Option<u32>,
    pub total_sets: Option<u32>,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub deuce_enabled: bool,
    #[serde(default)]
    pub player1: String,
    #[serde(default)]
    pub player2: String,
    pub status: Option<String>,
    pub current_set: Option<u32>,
    #[serde(default)]
    pub scores: Vec<WireSetScore>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSetScore {
    pub set_number: u32,
    #[serde(default)]
    pub player1_score: u32,
    #[serde(default)]
    pub player2_score: u32,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    pub updated_at: Option<String>,
}

impl WireMatch {
    pub fn into_match(self) -> Match {
        let defaults = MatchConfig::default();
        let config = MatchConfig {
            max_points: self.max_points.filter(|p| *p > 0).unwrap_or(defaults.max_points),
            total_sets: self.total_sets.filter(|s| *s > 0).unwrap_or(defaults.total_sets),
            deuce_enabled: self.deuce_enabled,
        };

        let mut scores: Vec<SetScore> = self
            .scores
            .into_iter()
            .map(|s| SetScore {
                set_number: s.set_number,
                player1_score: s.player1_score,
                player2_score: s.player2_score,
                completed: s.completed,
                updated_at: timestamp(s.updated_at),
            })
            .collect();
        scores.sort_by_key(|s| s.set_number);
        scores.dedup_by_key(|s| s.set_number);

        Match {
            id: self.id,
            event_type: self.event_type,
            match_number: self.match_number,
            date: self.date,
            time: self.time,
            court: self.court,
            umpire: non_empty(self.umpire),
            service_judge: non_empty(self.service_judge),
            player1: self.player1,
            player2: self.player2,
            status: self.status.as_deref().map(MatchStatus::parse).unwrap_or_default(),
            config,
            current_set: self.current_set.unwrap_or(1),
            scores,
            start_time: timestamp(self.start_time),
            end_time: timestamp(self.end_time),
            duration: non_empty(self.duration),
            shuttles_used: self.shuttles_used.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutation replies
// ---------------------------------------------------------------------------

/// Envelope shared by every mutating endpoint. Failures carry either `message`
/// (`success: false`) or `error`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Ack {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub match_id: Option<u64>,
    pub player_id: Option<u64>,
    pub current_set: Option<u32>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub player1_score: Option<u32>,
    pub player2_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
}

impl Ack {
    /// The rejection reason, if the API refused the request.
    pub fn rejection(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        if self.success == Some(false) {
            return Some(self.message.clone().unwrap_or_else(|| "request rejected".to_owned()));
        }
        None
    }

    pub fn into_score_update(self) -> ScoreUpdate {
        ScoreUpdate {
            player1_score: self.player1_score.unwrap_or_default(),
            player2_score: self.player2_score.unwrap_or_default(),
            completed: self.completed,
        }
    }

    pub fn into_match_ended(self) -> MatchEnded {
        MatchEnded {
            end_time: timestamp(self.end_time),
            duration: non_empty(self.duration),
        }
    }
}

// ---------------------------------------------------------------------------
// Players, auth, stats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayer {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub team: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<WirePlayer> for Player {
    fn from(p: WirePlayer) -> Self {
        Player {
            id: p.id,
            name: p.name,
            team: non_empty(p.team),
            email: non_empty(p.email),
            phone: non_empty(p.phone),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireAuthCheck {
    #[serde(default)]
    pub authenticated: bool,
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireUser {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_admin: bool,
    pub role: Option<String>,
}

impl From<WireAuthCheck> for AuthStatus {
    fn from(raw: WireAuthCheck) -> Self {
        let is_admin = raw
            .user
            .as_ref()
            .map(|u| u.is_admin || u.role.as_deref() == Some("admin"))
            .unwrap_or(false);
        AuthStatus { authenticated: raw.authenticated, is_admin }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireDashboardStats {
    #[serde(default)]
    pub live_matches: u32,
    #[serde(default)]
    pub completed_today: u32,
    #[serde(default)]
    pub active_courts: u32,
    pub avg_duration: Option<String>,
}

impl From<WireDashboardStats> for DashboardStats {
    fn from(raw: WireDashboardStats) -> Self {
        DashboardStats {
            live_matches: raw.live_matches,
            completed_today: raw.completed_today,
            active_courts: raw.active_courts,
            avg_duration: non_empty(raw.avg_duration)
                .unwrap_or_else(|| crate::scoring::NOT_AVAILABLE.to_owned()),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatchStats {
    #[serde(default)]
    pub total_matches: u32,
    #[serde(default)]
    pub total_shuttles: u32,
    #[serde(default)]
    pub event_distribution: HashMap<String, u32>,
    #[serde(default)]
    pub avg_shuttles_per_match: f64,
}

impl From<WireMatchStats> for MatchStats {
    fn from(raw: WireMatchStats) -> Self {
        MatchStats {
            total_matches: raw.total_matches,
            total_shuttles: raw.total_shuttles,
            event_distribution: raw.event_distribution,
            avg_shuttles_per_match: raw.avg_shuttles_per_match,
        }
    }
}

/// Scoresheet export: the raw match plus generation metadata.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireExport {
    pub match_data: WireMatch,
    pub generated_at: Option<String>,
    pub export_type: Option<String>,
}
