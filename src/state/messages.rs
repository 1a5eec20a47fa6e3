use crate::state::network::LoadingState;
use courtside_api::{
    AuthStatus, DashboardStats, Match, MatchFilter, MatchStats, NewMatch, NewPlayer, Player,
    ScoreAction, Settings, Side,
};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    Login { username: String, password: String },
    Logout,
    LoadSettings,
    SaveSettings { settings: Settings },
    /// Dashboard stats plus the live and scheduled match lists.
    RefreshMatches,
    LoadHistory { filter: MatchFilter },
    LoadMatch { match_id: u64 },
    ChangeScore { match_id: u64, set_number: u32, side: Side, action: ScoreAction },
    NextSet { match_id: u64 },
    StartMatch { match_id: u64 },
    EndMatch { match_id: u64 },
    EndMatchAbruptly { match_id: u64 },
    SetShuttles { match_id: u64, shuttles_used: u32 },
    CreateMatch { new_match: NewMatch },
    DeleteMatch { match_id: u64 },
    ExportMatch { match_id: u64 },
    LoadPlayers,
    CreatePlayer { player: NewPlayer },
    UpdatePlayer { player_id: u64, player: NewPlayer },
    DeletePlayer { player_id: u64 },
}

impl NetworkRequest {
    /// The match a state-changing request acts on. Its reply is a [`NetworkResponse::MutationApplied`].
    pub fn mutated_match(&self) -> Option<u64> {
        match self {
            NetworkRequest::ChangeScore { match_id, .. }
            | NetworkRequest::NextSet { match_id }
            | NetworkRequest::StartMatch { match_id }
            | NetworkRequest::EndMatch { match_id }
            | NetworkRequest::EndMatchAbruptly { match_id }
            | NetworkRequest::SetShuttles { match_id, .. } => Some(*match_id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    LoggedIn { auth: AuthStatus },
    LoggedOut,
    SettingsLoaded { settings: Settings },
    SettingsSaved { settings: Settings },
    MatchesLoaded { stats: DashboardStats, live: Vec<Match>, scheduled: Vec<Match> },
    HistoryLoaded { matches: Vec<Match>, stats: MatchStats },
    /// A polled snapshot.
    MatchLoaded { snapshot: Match },
    /// The snapshot fetched right after a mutation of that match.
    MutationApplied { snapshot: Match },
    MatchCreated { match_id: u64 },
    MatchDeleted { match_id: u64 },
    ScoresheetExported { snapshot: Match },
    PlayersLoaded { players: Vec<Player>, notice: Option<String> },
    /// `mutated_match` is set when the failed request was a mutation of that match.
    Error { message: String, mutated_match: Option<u64> },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    ClockTick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_match_mutations_name_a_match() {
        let change = NetworkRequest::ChangeScore {
            match_id: 4,
            set_number: 1,
            side: Side::Player2,
            action: ScoreAction::Increment,
        };
        assert_eq!(change.mutated_match(), Some(4));
        assert_eq!(NetworkRequest::SetShuttles { match_id: 9, shuttles_used: 2 }.mutated_match(), Some(9));
        assert_eq!(NetworkRequest::LoadMatch { match_id: 4 }.mutated_match(), None);
        assert_eq!(NetworkRequest::DeleteMatch { match_id: 4 }.mutated_match(), None);
    }
}
