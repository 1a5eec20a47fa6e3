use crate::wire::{
    Ack, WireAuthCheck, WireDashboardStats, WireExport, WireMatch, WireMatchStats, WirePlayer,
};
use crate::{
    AuthStatus, DashboardStats, Match, MatchEnded, MatchFilter, MatchStats, MatchUpdate,
    NewMatch, NewPlayer, Player, ScoreAction, ScoreUpdate, Settings, Side,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5328/api";

/// Client for the badminton match management API.
///
/// Admin endpoints are guarded by a session cookie, so the underlying client keeps a cookie
/// store: call [`CourtsideApi::login`] once and later requests carry the session.
#[derive(Debug, Clone)]
pub struct CourtsideApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for CourtsideApi {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Unauthorized(String),
    Rejected(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Rejected(msg) => write!(f, "Rejected: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl CourtsideApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("courtside/0.1 (terminal scoreboard)")
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let url = self.url("/auth/login");
        let body = serde_json::json!({ "username": username, "password": password });
        let ack: Ack = self.send(self.client.post(&url).json(&body), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let url = self.url("/auth/logout");
        let ack: Ack = self.send(self.client.post(&url), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn check_auth(&self) -> ApiResult<AuthStatus> {
        let url = self.url("/auth/check");
        let raw: WireAuthCheck = self.send(self.client.get(&url), &url).await?;
        Ok(raw.into())
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    pub async fn fetch_matches(&self, filter: &MatchFilter) -> ApiResult<Vec<Match>> {
        let base = self.url("/matches");
        let url = Url::parse_with_params(&base, filter.query_pairs())
            .map_err(|e| ApiError::Other(format!("invalid url {base}: {e}")))?;
        let raw: Vec<WireMatch> = self.send(self.client.get(url.clone()), url.as_str()).await?;
        Ok(raw.into_iter().map(WireMatch::into_match).collect())
    }

    pub async fn fetch_match(&self, match_id: u64) -> ApiResult<Match> {
        let url = self.url(&format!("/matches/{match_id}"));
        let raw: WireMatch = self.send(self.client.get(&url), &url).await?;
        Ok(raw.into_match())
    }

    /// Schedule a match. Returns the id the API assigned to it.
    pub async fn create_match(&self, new_match: &NewMatch) -> ApiResult<u64> {
        let url = self.url("/matches");
        let ack: Ack = self.send(self.client.post(&url).json(new_match), &url).await?;
        let ack = accept(ack)?;
        ack.match_id
            .ok_or_else(|| ApiError::Other(format!("{url}: reply carried no match_id")))
    }

    pub async fn update_match(&self, match_id: u64, update: &MatchUpdate) -> ApiResult<()> {
        let url = self.url(&format!("/matches/{match_id}"));
        let ack: Ack = self.send(self.client.put(&url).json(update), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn delete_match(&self, match_id: u64) -> ApiResult<()> {
        let url = self.url(&format!("/matches/{match_id}"));
        let ack: Ack = self.send(self.client.delete(&url), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn start_match(&self, match_id: u64) -> ApiResult<()> {
        self.post_action(match_id, "start").await.map(|_| ())
    }

    pub async fn end_match(&self, match_id: u64) -> ApiResult<MatchEnded> {
        Ok(self.post_action(match_id, "end").await?.into_match_ended())
    }

    /// End a match before its sets are played out. The current set is closed as it stands.
    pub async fn end_match_abruptly(&self, match_id: u64) -> ApiResult<MatchEnded> {
        Ok(self.post_action(match_id, "end-abruptly").await?.into_match_ended())
    }

    /// Advance to the next set. Returns the new current set number.
    pub async fn next_set(&self, match_id: u64) -> ApiResult<u32> {
        let ack = self.post_action(match_id, "next-set").await?;
        Ok(ack.current_set.unwrap_or_default())
    }

    pub async fn update_score(
        &self,
        match_id: u64,
        set_number: u32,
        side: Side,
        action: ScoreAction,
    ) -> ApiResult<ScoreUpdate> {
        let url = self.url(&format!("/matches/{match_id}/score"));
        let body = serde_json::json!({
            "player": side.number(),
            "action": action,
            "set_number": set_number,
        });
        let ack: Ack = self.send(self.client.put(&url).json(&body), &url).await?;
        Ok(accept(ack)?.into_score_update())
    }

    /// Apply one score change and return the match as the API now sees it.
    pub async fn submit_score_change(
        &self,
        match_id: u64,
        set_number: u32,
        side: Side,
        action: ScoreAction,
    ) -> ApiResult<Match> {
        self.update_score(match_id, set_number, side, action).await?;
        self.fetch_match(match_id).await
    }

    /// Scoresheet export: the full match as stored, for printing.
    pub async fn export_match(&self, match_id: u64) -> ApiResult<Match> {
        let url = self.url(&format!("/matches/{match_id}/export"));
        let raw: WireExport = self.send(self.client.get(&url), &url).await?;
        Ok(raw.match_data.into_match())
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    pub async fn fetch_players(&self) -> ApiResult<Vec<Player>> {
        let url = self.url("/players");
        let raw: Vec<WirePlayer> = self.send(self.client.get(&url), &url).await?;
        Ok(raw.into_iter().map(Player::from).collect())
    }

    pub async fn create_player(&self, player: &NewPlayer) -> ApiResult<u64> {
        let url = self.url("/players");
        let ack: Ack = self.send(self.client.post(&url).json(player), &url).await?;
        let ack = accept(ack)?;
        ack.player_id
            .ok_or_else(|| ApiError::Other(format!("{url}: reply carried no player_id")))
    }

    pub async fn update_player(&self, player_id: u64, player: &NewPlayer) -> ApiResult<()> {
        let url = self.url(&format!("/players/{player_id}"));
        let ack: Ack = self.send(self.client.put(&url).json(player), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn delete_player(&self, player_id: u64) -> ApiResult<()> {
        let url = self.url(&format!("/players/{player_id}"));
        let ack: Ack = self.send(self.client.delete(&url), &url).await?;
        accept(ack).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Settings and statistics
    // -----------------------------------------------------------------------

    pub async fn fetch_settings(&self) -> ApiResult<Settings> {
        let url = self.url("/settings");
        let raw: HashMap<String, String> = self.send(self.client.get(&url), &url).await?;
        Ok(Settings::from_map(&raw))
    }

    pub async fn update_settings(&self, settings: &Settings) -> ApiResult<()> {
        let url = self.url("/settings");
        let ack: Ack = self.send(self.client.put(&url).json(&settings.to_map()), &url).await?;
        accept(ack).map(|_| ())
    }

    pub async fn fetch_dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let url = self.url("/stats/dashboard");
        let raw: WireDashboardStats = self.send(self.client.get(&url), &url).await?;
        Ok(raw.into())
    }

    /// Completed-match statistics, optionally limited to `YYYY-MM-DD` bounds.
    pub async fn fetch_match_stats(
        &self,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> ApiResult<MatchStats> {
        let base = self.url("/stats/matches");
        let params: Vec<(&str, &str)> = [("date_from", date_from), ("date_to", date_to)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        let url = Url::parse_with_params(&base, params)
            .map_err(|e| ApiError::Other(format!("invalid url {base}: {e}")))?;
        let raw: WireMatchStats = self.send(self.client.get(url.clone()), url.as_str()).await?;
        Ok(raw.into())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_action(&self, match_id: u64, action: &str) -> ApiResult<Ack> {
        let url = self.url(&format!("/matches/{match_id}/{action}"));
        let ack: Ack = self.send(self.client.post(&url), &url).await?;
        accept(ack)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        let failure = response.error_for_status_ref().err();
        if let Some(e) = failure {
            let reason = response.json::<Ack>().await.ok().and_then(|ack| ack.rejection());
            return Err(match (status, reason) {
                (StatusCode::NOT_FOUND, reason) => {
                    ApiError::NotFound(reason.unwrap_or_else(|| url.to_owned()))
                }
                (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, reason) => {
                    ApiError::Unauthorized(reason.unwrap_or_else(|| url.to_owned()))
                }
                (s, Some(reason)) if s.is_client_error() => ApiError::Rejected(reason),
                _ => ApiError::Api(e, url.to_owned()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }
}

/// A 200 reply can still carry `success: false`; turn that into an error.
fn accept(ack: Ack) -> ApiResult<Ack> {
    match ack.rejection() {
        Some(reason) => Err(ApiError::Rejected(reason)),
        None => Ok(ack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;
    use mockito::Matcher;

    fn api_for(server: &mockito::ServerGuard) -> CourtsideApi {
        CourtsideApi::with_base_url(format!("{}/api", server.url()))
    }

    const LIVE_MATCH: &str = r#"{
        "id": 12, "event_type": "Doubles", "match_number": "sf-2", "date": "2024-05-01",
        "time": "14:00", "court": "court1", "player1": "Ahsan/Setiawan",
        "player2": "Gideon/Sukamuljo", "status": "live", "current_set": 2,
        "max_points": 21, "total_sets": 3, "deuce_enabled": 1,
        "start_time": "2024-05-01T14:03:00",
        "scores": [
            {"set_number": 1, "player1_score": 21, "player2_score": 18, "completed": 1},
            {"set_number": 2, "player1_score": 4, "player2_score": 6, "completed": 0},
            {"set_number": 3, "player1_score": 0, "player2_score": 0, "completed": 0}
        ]
    }"#;

    #[tokio::test]
    async fn fetch_match_maps_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/matches/12")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LIVE_MATCH)
            .create_async()
            .await;

        let m = api_for(&server).fetch_match(12).await.unwrap();
        mock.assert_async().await;
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.current_set, 2);
        assert_eq!(m.scores.len(), 3);
        assert_eq!(crate::scoring::final_score_label(&m), "1-0");
    }

    #[tokio::test]
    async fn missing_match_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/matches/99")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Match not found"}"#)
            .create_async()
            .await;

        let err = api_for(&server).fetch_match(99).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Match not found"), "{err}");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let api = CourtsideApi::with_base_url("http://127.0.0.1:9/api")
            .with_timeout(Duration::from_millis(500));
        let err = api.fetch_match(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(..)), "{err}");
    }

    #[tokio::test]
    async fn fetch_matches_sends_filter_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("status".into(), "completed".into()),
                Matcher::UrlEncoded("court".into(), "court2".into()),
                Matcher::UrlEncoded("sort_by".into(), "end_time".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{LIVE_MATCH}]"))
            .create_async()
            .await;

        let filter = MatchFilter {
            court: Some("court2".into()),
            ..MatchFilter::with_status(MatchStatus::Completed)
        };
        let matches = api_for(&server).fetch_matches(&filter).await.unwrap();
        mock.assert_async().await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 12);
    }

    #[tokio::test]
    async fn submit_score_change_puts_then_refetches() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", "/api/matches/12/score")
            .match_body(Matcher::Json(serde_json::json!({
                "player": 2, "action": "increment", "set_number": 2
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "player1_score": 4, "player2_score": 7, "completed": false}"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/api/matches/12")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LIVE_MATCH)
            .create_async()
            .await;

        let m = api_for(&server)
            .submit_score_change(12, 2, Side::Player2, ScoreAction::Increment)
            .await
            .unwrap();
        put.assert_async().await;
        get.assert_async().await;
        assert_eq!(m.id, 12);
    }

    #[tokio::test]
    async fn completed_set_rejection_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/api/matches/12/score")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Set is already completed"}"#)
            .create_async()
            .await;

        let err = api_for(&server)
            .update_score(12, 1, Side::Player1, ScoreAction::Decrement)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref msg) if msg == "Set is already completed"));
    }

    #[tokio::test]
    async fn success_false_on_200_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/matches/5/start")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "Match already live"}"#)
            .create_async()
            .await;

        let err = api_for(&server).start_match(5).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref msg) if msg == "Match already live"));
    }

    #[tokio::test]
    async fn bad_login_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "Invalid credentials"}"#)
            .create_async()
            .await;

        let err = api_for(&server).login("admin", "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref msg) if msg == "Invalid credentials"));
    }

    #[tokio::test]
    async fn create_match_returns_new_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/matches")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "player1": "Lee", "total_sets": 3, "deuce_enabled": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "match_id": 41, "message": "Match created successfully"}"#)
            .create_async()
            .await;

        let new_match = NewMatch {
            event_type: "Singles".into(),
            match_number: "R1-3".into(),
            date: "2024-05-02".into(),
            time: "09:30".into(),
            court: "court4".into(),
            umpire: None,
            service_judge: None,
            max_points: 21,
            total_sets: 3,
            deuce_enabled: true,
            player1: "Lee".into(),
            player2: "Chen".into(),
        };
        assert_eq!(api_for(&server).create_match(&new_match).await.unwrap(), 41);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn next_set_and_end_match_replies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/matches/12/next-set")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "current_set": 3}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/matches/12/end")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "end_time": "2024-05-01T15:10:00.5", "duration": "1h 7m"}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        assert_eq!(api.next_set(12).await.unwrap(), 3);
        let ended = api.end_match(12).await.unwrap();
        assert_eq!(ended.duration.as_deref(), Some("1h 7m"));
        assert!(ended.end_time.is_some());
    }

    #[tokio::test]
    async fn settings_and_dashboard_stats_decode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/settings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"default_max_points": "15", "default_total_sets": "5", "default_deuce_enabled": "1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/stats/dashboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"live_matches": 2, "completed_today": 5, "active_courts": 2, "avg_duration": "42m"}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let settings = api.fetch_settings().await.unwrap();
        assert_eq!(settings.default_max_points, 15);
        assert_eq!(settings.default_total_sets, 5);
        let stats = api.fetch_dashboard_stats().await.unwrap();
        assert_eq!(stats.live_matches, 2);
        assert_eq!(stats.avg_duration, "42m");
    }
    #[tokio::test]
    async fn players_export_and_match_stats() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/players")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1, "name": "Lee", "team": "", "email": null}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/matches/12/export")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"match_data": {LIVE_MATCH}, "generated_at": "2024-05-01T16:00:00", "export_type": "scoresheet"}}"#
            ))
            .create_async()
            .await;
        let stats = server
            .mock("GET", "/api/stats/matches")
            .match_query(Matcher::UrlEncoded("date_from".into(), "2024-05-01".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total_matches": 4, "total_shuttles": 22, "event_distribution": {"Singles": 3, "Doubles": 1}, "avg_shuttles_per_match": 5.5}"#)
            .create_async()
            .await;

        let api = api_for(&server);
        let players = api.fetch_players().await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].team, None);

        let exported = api.export_match(12).await.unwrap();
        assert_eq!(exported.player2, "Gideon/Sukamuljo");

        let match_stats = api.fetch_match_stats(Some("2024-05-01"), None).await.unwrap();
        stats.assert_async().await;
        assert_eq!(match_stats.total_matches, 4);
        assert_eq!(match_stats.event_distribution.get("Singles"), Some(&3));
    }
}
