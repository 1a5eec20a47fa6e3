use crate::state::messages::{NetworkRequest, NetworkResponse};
use courtside_api::client::{ApiResult, CourtsideApi};
use courtside_api::{MatchFilter, MatchStatus, MatchUpdate, NewPlayer, ScoreAction, Settings, Side};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: CourtsideApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: CourtsideApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;
            let mutated_match = request.mutated_match();

            let result = match request {
                NetworkRequest::Login { username, password } => {
                    self.handle_login(&username, &password).await
                }
                NetworkRequest::Logout => {
                    self.client.logout().await.map(|_| NetworkResponse::LoggedOut)
                }
                NetworkRequest::LoadSettings => self.handle_load_settings().await,
                NetworkRequest::SaveSettings { settings } => self.handle_save_settings(settings).await,
                NetworkRequest::RefreshMatches => self.handle_refresh_matches().await,
                NetworkRequest::LoadHistory { filter } => self.handle_load_history(filter).await,
                NetworkRequest::LoadMatch { match_id } => self.handle_load_match(match_id).await,
                NetworkRequest::ChangeScore { match_id, set_number, side, action } => {
                    self.handle_change_score(match_id, set_number, side, action).await
                }
                NetworkRequest::NextSet { match_id } => self.handle_next_set(match_id).await,
                NetworkRequest::StartMatch { match_id } => self.handle_start_match(match_id).await,
                NetworkRequest::EndMatch { match_id } => self.handle_end_match(match_id, false).await,
                NetworkRequest::EndMatchAbruptly { match_id } => {
                    self.handle_end_match(match_id, true).await
                }
                NetworkRequest::SetShuttles { match_id, shuttles_used } => {
                    self.handle_set_shuttles(match_id, shuttles_used).await
                }
                NetworkRequest::CreateMatch { new_match } => {
                    debug!("creating match {}", new_match.match_number);
                    self.client
                        .create_match(&new_match)
                        .await
                        .map(|match_id| NetworkResponse::MatchCreated { match_id })
                }
                NetworkRequest::DeleteMatch { match_id } => {
                    debug!("deleting match {match_id}");
                    self.client
                        .delete_match(match_id)
                        .await
                        .map(|_| NetworkResponse::MatchDeleted { match_id })
                }
                NetworkRequest::ExportMatch { match_id } => {
                    debug!("exporting scoresheet for match {match_id}");
                    self.client
                        .export_match(match_id)
                        .await
                        .map(|snapshot| NetworkResponse::ScoresheetExported { snapshot })
                }
                NetworkRequest::LoadPlayers => self.handle_load_players(None).await,
                NetworkRequest::CreatePlayer { player } => self.handle_create_player(player).await,
                NetworkRequest::UpdatePlayer { player_id, player } => {
                    self.handle_update_player(player_id, player).await
                }
                NetworkRequest::DeletePlayer { player_id } => {
                    self.handle_delete_player(player_id).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
                mutated_match,
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_login(&self, username: &str, password: &str) -> ApiResult<NetworkResponse> {
        debug!("logging in as {username}");
        self.client.login(username, password).await?;
        let auth = self.client.check_auth().await?;
        info!("logged in as {username} (admin: {})", auth.is_admin);
        Ok(NetworkResponse::LoggedIn { auth })
    }

    async fn handle_load_settings(&self) -> ApiResult<NetworkResponse> {
        debug!("loading tournament settings");
        let settings = self.client.fetch_settings().await?;
        Ok(NetworkResponse::SettingsLoaded { settings })
    }

    async fn handle_save_settings(&self, settings: Settings) -> ApiResult<NetworkResponse> {
        debug!("saving tournament settings");
        self.client.update_settings(&settings).await?;
        let settings = self.client.fetch_settings().await?;
        info!("tournament settings saved");
        Ok(NetworkResponse::SettingsSaved { settings })
    }

    async fn handle_refresh_matches(&self) -> ApiResult<NetworkResponse> {
        debug!("refreshing live and scheduled matches");
        let stats = self.client.fetch_dashboard_stats().await?;
        let live = self
            .client
            .fetch_matches(&MatchFilter::with_status(MatchStatus::Live))
            .await?;
        let scheduled = self
            .client
            .fetch_matches(&MatchFilter::with_status(MatchStatus::Scheduled))
            .await?;
        Ok(NetworkResponse::MatchesLoaded { stats, live, scheduled })
    }

    async fn handle_load_history(&self, filter: MatchFilter) -> ApiResult<NetworkResponse> {
        debug!("loading match history");
        let matches = self.client.fetch_matches(&filter).await?;
        let date = filter.date.as_deref();
        let stats = self.client.fetch_match_stats(date, date).await?;
        Ok(NetworkResponse::HistoryLoaded { matches, stats })
    }

    async fn handle_load_match(&self, match_id: u64) -> ApiResult<NetworkResponse> {
        debug!("loading match {match_id}");
        let snapshot = self.client.fetch_match(match_id).await?;
        Ok(NetworkResponse::MatchLoaded { snapshot })
    }

    async fn handle_change_score(
        &self,
        match_id: u64,
        set_number: u32,
        side: Side,
        action: ScoreAction,
    ) -> ApiResult<NetworkResponse> {
        debug!("score {action:?} for player {} in set {set_number} of match {match_id}", side.number());
        let snapshot = self
            .client
            .submit_score_change(match_id, set_number, side, action)
            .await?;
        Ok(NetworkResponse::MutationApplied { snapshot })
    }

    async fn handle_next_set(&self, match_id: u64) -> ApiResult<NetworkResponse> {
        let set = self.client.next_set(match_id).await?;
        info!("match {match_id} moved to set {set}");
        self.mutation_applied(match_id).await
    }

    async fn handle_start_match(&self, match_id: u64) -> ApiResult<NetworkResponse> {
        self.client.start_match(match_id).await?;
        info!("match {match_id} started");
        self.mutation_applied(match_id).await
    }

    async fn handle_end_match(&self, match_id: u64, abruptly: bool) -> ApiResult<NetworkResponse> {
        let ended = if abruptly {
            self.client.end_match_abruptly(match_id).await?
        } else {
            self.client.end_match(match_id).await?
        };
        info!(
            "match {match_id} ended{} after {}",
            if abruptly { " abruptly" } else { "" },
            ended.duration.as_deref().unwrap_or("?")
        );
        self.mutation_applied(match_id).await
    }

    async fn handle_set_shuttles(&self, match_id: u64, shuttles_used: u32) -> ApiResult<NetworkResponse> {
        debug!("match {match_id}: {shuttles_used} shuttles used");
        let update = MatchUpdate { shuttles_used: Some(shuttles_used), ..MatchUpdate::default() };
        self.client.update_match(match_id, &update).await?;
        self.mutation_applied(match_id).await
    }

    async fn mutation_applied(&self, match_id: u64) -> ApiResult<NetworkResponse> {
        let snapshot = self.client.fetch_match(match_id).await?;
        Ok(NetworkResponse::MutationApplied { snapshot })
    }

    async fn handle_load_players(&self, notice: Option<String>) -> ApiResult<NetworkResponse> {
        debug!("loading players");
        let players = self.client.fetch_players().await?;
        Ok(NetworkResponse::PlayersLoaded { players, notice })
    }

    async fn handle_create_player(&self, player: NewPlayer) -> ApiResult<NetworkResponse> {
        let player_id = self.client.create_player(&player).await?;
        info!("added player {player_id} ({})", player.name);
        self.handle_load_players(Some(format!("Added {}", player.name))).await
    }

    async fn handle_update_player(&self, player_id: u64, player: NewPlayer) -> ApiResult<NetworkResponse> {
        self.client.update_player(player_id, &player).await?;
        info!("updated player {player_id}");
        self.handle_load_players(Some(format!("Saved {}", player.name))).await
    }

    async fn handle_delete_player(&self, player_id: u64) -> ApiResult<NetworkResponse> {
        debug!("deleting player {player_id}");
        self.client.delete_player(player_id).await?;
        self.handle_load_players(Some("Player deleted".to_string())).await
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
