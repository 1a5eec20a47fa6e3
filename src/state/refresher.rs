use crate::state::messages::{NetworkRequest, UiEvent};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};

/// Polls the API on a fixed cadence: the match lists every tick, plus the match open on the
/// Scoring tab, whose id is published by the UI loop.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    open_match: watch::Receiver<Option<u64>>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(
        network_requests: mpsc::Sender<NetworkRequest>,
        open_match: watch::Receiver<Option<u64>>,
        period: Duration,
    ) -> Self {
        Self { network_requests, open_match, period }
    }

    pub async fn run(self) {
        let mut poll = interval(self.period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        poll.tick().await;

        loop {
            poll.tick().await;
            if self.network_requests.send(NetworkRequest::RefreshMatches).await.is_err() {
                break;
            }
            let open_match = *self.open_match.borrow();
            if let Some(match_id) = open_match {
                let _ = self
                    .network_requests
                    .send(NetworkRequest::LoadMatch { match_id })
                    .await;
            }
        }
    }
}

/// Once a second, so elapsed clocks re-derive at draw time.
pub struct ClockTicker {
    ui_events: mpsc::Sender<UiEvent>,
}

impl ClockTicker {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events }
    }

    pub async fn run(self) {
        let mut ticks = interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            if self.ui_events.send(UiEvent::ClockTick).await.is_err() {
                break;
            }
        }
    }
}
