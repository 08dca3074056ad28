//! Poller
//!
//! Native counterpart of the chart view's refresh loop: fetch on start and
//! every interval after, derive a [`DisplayState`], publish it on a watch
//! channel.
//!
//! Ticks may overlap when the backend is slow. Each tick runs as its own
//! task tagged with a sequence number; once a tick's result is applied,
//! every older tick still in flight is aborted, and an older result that
//! arrives late is dropped.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::client::EcgClient;
use crate::display::{DisplaySettings, DisplayState, TickSequencer, POLL_INTERVAL_MS};
use crate::session::Session;

/// Poll loop settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    pub interval: Duration,
    pub display: DisplaySettings,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
            display: DisplaySettings::default(),
        }
    }
}

/// Fetches and derives display state for one session
#[derive(Debug, Clone)]
pub struct Poller {
    client: EcgClient,
    session: Option<Session>,
    config: PollConfig,
}

impl Poller {
    pub fn new(client: EcgClient, session: Option<Session>, config: PollConfig) -> Self {
        Self {
            client,
            session,
            config,
        }
    }

    /// Run a single fetch-and-derive cycle.
    ///
    /// Without a session this returns the "please log in" state and issues
    /// no request.
    pub async fn tick(&self) -> DisplayState {
        let Some(session) = &self.session else {
            tracing::warn!("No session stored, skipping fetch");
            return DisplayState::not_logged_in();
        };

        let result = self.client.fetch_ecg_data(session.user_id()).await;
        if let Err(e) = &result {
            tracing::error!(user_id = %session.user_id, error = %e, "Error fetching ECG data");
        }

        DisplayState::from_fetch(result, &self.config.display)
    }

    /// Start the poll loop in the background
    pub fn start(self) -> PollHandle {
        let (state_tx, state_rx) = watch::channel(DisplayState::Loading);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(self.run(state_tx, shutdown_rx));

        PollHandle {
            state: state_rx,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, state_tx: watch::Sender<DisplayState>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(u64, DisplayState)>();
        let mut sequencer = TickSequencer::new();
        let mut in_flight: BTreeMap<u64, JoinHandle<()>> = BTreeMap::new();

        tracing::info!(interval_ms = self.config.interval.as_millis() as u64, "Polling started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let seq = sequencer.begin();
                    let poller = self.clone();
                    let done = done_tx.clone();

                    in_flight.insert(seq, tokio::spawn(async move {
                        let state = poller.tick().await;
                        let _ = done.send((seq, state));
                    }));
                }

                Some((seq, state)) = done_rx.recv() => {
                    in_flight.remove(&seq);

                    if !sequencer.accept(seq) {
                        tracing::debug!(seq, "Dropping stale tick result");
                        continue;
                    }

                    // Everything older than the applied tick is stale
                    let newer = in_flight.split_off(&seq);
                    for (stale, handle) in std::mem::replace(&mut in_flight, newer) {
                        tracing::debug!(seq = stale, "Aborting superseded tick");
                        handle.abort();
                    }

                    state_tx.send_replace(state);
                }

                _ = shutdown.changed() => break,
            }
        }

        for (_, handle) in in_flight {
            handle.abort();
        }
        tracing::info!("Polling stopped");
    }
}

/// Handle to a running poll loop. Dropping it shuts the loop down.
#[derive(Debug)]
pub struct PollHandle {
    state: watch::Receiver<DisplayState>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Receiver that wakes on every applied tick
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.clone()
    }

    /// Latest published state
    pub fn current(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    /// Stop the timer, abort in-flight requests, and wait for the loop to exit
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        // The loop aborts its in-flight ticks on the way out
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{spawn, Stub};
    use crate::messages::MessageId;
    use crate::session::UserId;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn session() -> Option<Session> {
        Some(Session::new(UserId::new("42").unwrap()))
    }

    fn fast(interval_ms: u64) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(interval_ms),
            ..Default::default()
        }
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<DisplayState>, pred: F) -> DisplayState
    where
        F: Fn(&DisplayState) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if pred(&rx.borrow_and_update()) {
                    return rx.borrow().clone();
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("state never matched")
    }

    #[tokio::test]
    async fn test_tick_without_session_skips_fetch() {
        let stub = Arc::new(Stub::default());
        let base = spawn(stub.clone()).await;
        let poller = Poller::new(EcgClient::new(&base).unwrap(), None, PollConfig::default());

        let state = poller.tick().await;

        assert_eq!(state.error(), Some(MessageId::NotLoggedIn));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_tick_renders_sorted_batch() {
        let stub = Arc::new(Stub::default().with_ecg(
            StatusCode::OK,
            json!({ "data": [
                { "timestamp": "2024-01-01T00:00:02Z", "ecg_signal": 1.0 },
                { "timestamp": "2024-01-01T00:00:01Z", "ecg_signal": 0.5 }
            ]}),
            Duration::ZERO,
        ));
        let base = spawn(stub).await;
        let poller = Poller::new(EcgClient::new(&base).unwrap(), session(), PollConfig::default());

        let state = poller.tick().await;
        let frame = state.frame().expect("should be displaying");

        let values: Vec<f64> = frame.samples.iter().map(|s| s.ecg_signal).collect();
        assert_eq!(values, vec![0.5, 1.0]);
        assert!(!frame.warning);
    }

    #[tokio::test]
    async fn test_tick_empty_and_error() {
        let stub = Arc::new(
            Stub::default()
                .with_ecg(StatusCode::OK, json!({ "data": [] }), Duration::ZERO)
                .with_ecg(StatusCode::INTERNAL_SERVER_ERROR, json!({}), Duration::ZERO),
        );
        let base = spawn(stub).await;
        let poller = Poller::new(EcgClient::new(&base).unwrap(), session(), PollConfig::default());

        assert_eq!(poller.tick().await, DisplayState::Empty);
        assert_eq!(poller.tick().await.error(), Some(MessageId::FetchFailed));
    }

    #[tokio::test]
    async fn test_polling_recovers_after_failure() {
        let stub = Arc::new(
            Stub::default()
                .with_ecg(StatusCode::SERVICE_UNAVAILABLE, json!({}), Duration::ZERO)
                .with_ecg(
                    StatusCode::OK,
                    json!({ "data": [{ "timestamp": "2024-01-01T00:00:01Z", "ecg_signal": 1.5 }] }),
                    Duration::ZERO,
                ),
        );
        let base = spawn(stub.clone()).await;
        let handle = Poller::new(EcgClient::new(&base).unwrap(), session(), fast(50)).start();
        let mut rx = handle.subscribe();

        let state = wait_for(&mut rx, |s| s.frame().is_some()).await;

        assert!(state.warning());
        assert!(stub.calls() >= 2);
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_slow_stale_tick_never_overwrites() {
        let stub = Arc::new(
            Stub::default()
                // First tick: slow, and would raise the warning
                .with_ecg(
                    StatusCode::OK,
                    json!({ "data": [{ "timestamp": "2024-01-01T00:00:01Z", "ecg_signal": 9.0 }] }),
                    Duration::from_millis(400),
                )
                .with_ecg(
                    StatusCode::OK,
                    json!({ "data": [{ "timestamp": "2024-01-01T00:00:02Z", "ecg_signal": 0.5 }] }),
                    Duration::ZERO,
                ),
        );
        let base = spawn(stub).await;
        let handle = Poller::new(EcgClient::new(&base).unwrap(), session(), fast(50)).start();
        let mut rx = handle.subscribe();

        wait_for(&mut rx, |s| s.frame().is_some()).await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert!(!handle.current().warning());
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_halts_polling() {
        let stub = Arc::new(Stub::default());
        let base = spawn(stub.clone()).await;
        let handle = Poller::new(EcgClient::new(&base).unwrap(), session(), fast(20)).start();
        let mut rx = handle.subscribe();

        wait_for(&mut rx, |s| *s == DisplayState::Empty).await;
        handle.stop().await;

        // Let any request already on the wire land
        tokio::time::sleep(Duration::from_millis(50)).await;
        let calls = stub.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stub.calls(), calls);
    }
}
