//! Connection status and reconnect countdown
//!
//! Every console window runs one [`ConnectionStateMachine`]. It turns
//! `(connected, error, attempts)` into a display state and, while retries
//! remain, counts down to an automatic reconnect.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use cw_core::config::RetryConfig;

/// Callback that starts a new connection attempt
pub type ReconnectFn = Arc<dyn Fn() + Send + Sync>;

/// What the connection chrome shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the first connection
    Connecting,
    /// Connected; chrome hidden
    Success,
    /// Failed, automatic reconnect pending
    ErrorRetry,
    /// Failed too often; manual retry only
    ErrorFinal,
}

impl ConnectionState {
    pub fn severity(&self) -> Severity {
        match self {
            ConnectionState::Connecting => Severity::Info,
            ConnectionState::Success => Severity::Success,
            ConnectionState::ErrorRetry => Severity::Warning,
            ConnectionState::ErrorFinal => Severity::Error,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Success => write!(f, "success"),
            ConnectionState::ErrorRetry => write!(f, "error-retry"),
            ConnectionState::ErrorFinal => write!(f, "error-final"),
        }
    }
}

/// Alert colour for the connection chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Text a renderer puts in the connection chrome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub severity: Severity,
    /// Lines of the alert body; empty when the chrome is hidden
    pub lines: Vec<String>,
    /// Label of the retry button, if one is shown
    pub action: Option<&'static str>,
}

impl StatusView {
    /// Whether the chrome is shown at all
    pub fn is_visible(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Retry policy for one window.
///
/// At most one countdown task exists at a time. It is aborted whenever the
/// machine is updated, on [`retry_now`](Self::retry_now), and on drop.
pub struct ConnectionStateMachine {
    config: RetryConfig,
    state: ConnectionState,
    error: String,
    attempts: u32,
    reconnect: ReconnectFn,
    countdown: watch::Sender<u32>,
    timer: Option<JoinHandle<()>>,
}

impl ConnectionStateMachine {
    /// Create a machine in the `Connecting` state
    pub fn new(config: RetryConfig, reconnect: ReconnectFn) -> Self {
        let (countdown, _) = watch::channel(0);
        Self {
            config,
            state: ConnectionState::Connecting,
            error: String::new(),
            attempts: 1,
            reconnect,
            countdown,
            timer: None,
        }
    }

    /// Re-evaluate the state from the window's connection status.
    ///
    /// Entering `ErrorRetry` starts a fresh countdown; must be called from
    /// within a tokio runtime.
    pub fn update(&mut self, connected: bool, error: &str, attempts: u32) -> ConnectionState {
        self.cancel_timer();
        self.error = error.to_string();
        self.attempts = attempts;

        self.state = if error.is_empty() {
            if connected {
                ConnectionState::Success
            } else {
                ConnectionState::Connecting
            }
        } else if attempts <= self.config.max_retries {
            self.start_countdown();
            ConnectionState::ErrorRetry
        } else {
            ConnectionState::ErrorFinal
        };

        tracing::debug!(
            state = %self.state,
            attempts,
            max = self.config.max_retries,
            "Connection state updated"
        );
        self.state
    }

    /// Skip the countdown and reconnect immediately
    pub fn retry_now(&mut self) {
        self.cancel_timer();
        tracing::info!("Manual reconnect requested");
        (self.reconnect)();
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Seconds left on the countdown (0 when none is running)
    pub fn seconds_remaining(&self) -> u32 {
        *self.countdown.borrow()
    }

    /// Observe the countdown as it ticks
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.countdown.subscribe()
    }

    /// Whether a countdown task is pending
    pub fn has_pending_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn severity(&self) -> Severity {
        self.state.severity()
    }

    /// Render the chrome for the current state
    pub fn render(&self) -> StatusView {
        let (lines, action) = match self.state {
            ConnectionState::Success => (Vec::new(), None),
            ConnectionState::Connecting => (vec!["Connecting...".to_string()], None),
            ConnectionState::ErrorRetry => (
                vec![
                    "Error".to_string(),
                    self.error.clone(),
                    format!(
                        "Retry attempt {} of {} in {} seconds...",
                        self.attempts,
                        self.config.max_retries,
                        self.seconds_remaining()
                    ),
                ],
                Some("Retry Now"),
            ),
            ConnectionState::ErrorFinal => (
                vec!["Error".to_string(), self.error.clone()],
                Some("Retry Again"),
            ),
        };

        StatusView {
            severity: self.severity(),
            lines,
            action,
        }
    }

    /// Stop any pending countdown without reconnecting
    pub fn cancel(&mut self) {
        self.cancel_timer();
    }

    fn start_countdown(&mut self) {
        let total = self.config.countdown_secs();
        let tx = self.countdown.clone();
        let reconnect = Arc::clone(&self.reconnect);
        // Deadlines are anchored here so ticks do not drift with scheduling.
        let start = Instant::now();

        tx.send_replace(total);
        self.timer = Some(tokio::spawn(async move {
            for elapsed in 1..=total {
                tokio::time::sleep_until(start + Duration::from_secs(elapsed as u64)).await;
                tx.send_replace(total - elapsed);
            }
            tracing::info!("Reconnect countdown finished");
            reconnect();
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.countdown.send_replace(0);
    }
}

impl Drop for ConnectionStateMachine {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl fmt::Debug for ConnectionStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateMachine")
            .field("state", &self.state)
            .field("error", &self.error)
            .field("attempts", &self.attempts)
            .field("seconds_remaining", &self.seconds_remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn machine() -> (ConnectionStateMachine, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reconnect: ReconnectFn = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (
            ConnectionStateMachine::new(RetryConfig::default(), reconnect),
            calls,
        )
    }

    async fn tick(secs: u64) {
        tokio::time::advance(Duration::from_secs(secs)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_states_without_error() {
        let (mut sm, calls) = machine();
        assert_eq!(sm.update(false, "", 1), ConnectionState::Connecting);
        assert_eq!(sm.severity(), Severity::Info);
        assert_eq!(sm.update(true, "", 1), ConnectionState::Success);
        assert!(!sm.render().is_visible());
        assert!(!sm.has_pending_timer());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_within_retries_counts_down() {
        for attempts in 1..=3 {
            let (mut sm, _) = machine();
            assert_eq!(sm.update(false, "boom", attempts), ConnectionState::ErrorRetry);
            assert_eq!(sm.seconds_remaining(), 10);
            assert!(sm.has_pending_timer());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_past_retries_is_final() {
        let (mut sm, calls) = machine();
        assert_eq!(sm.update(false, "boom", 4), ConnectionState::ErrorFinal);
        assert_eq!(sm.seconds_remaining(), 0);
        assert!(!sm.has_pending_timer());

        tick(30).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let view = sm.render();
        assert_eq!(view.severity, Severity::Error);
        assert_eq!(view.action, Some("Retry Again"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_reconnects_once_at_zero() {
        let (mut sm, calls) = machine();
        sm.update(false, "CLIENT_UNAUTHORIZED: denied", 1);

        for expected in (1..10).rev() {
            tick(1).await;
            assert_eq!(sm.seconds_remaining(), expected);
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }

        tick(1).await;
        assert_eq!(sm.seconds_remaining(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tick(30).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_now_cancels_countdown() {
        let (mut sm, calls) = machine();
        sm.update(false, "boom", 2);
        tick(4).await;
        assert_eq!(sm.seconds_remaining(), 6);

        sm.retry_now();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!sm.has_pending_timer());

        tick(30).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentry_replaces_countdown() {
        let (mut sm, calls) = machine();
        sm.update(false, "first", 1);
        tick(5).await;
        sm.update(false, "second", 2);
        assert_eq!(sm.seconds_remaining(), 10);

        tick(9).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        tick(1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_countdown() {
        let (mut sm, calls) = machine();
        sm.update(false, "boom", 1);
        drop(sm);

        tick(20).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_retry_text() {
        let (mut sm, _) = machine();
        sm.update(false, "UPSTREAM_TIMEOUT: Server timeout.", 2);
        tick(3).await;

        let view = sm.render();
        assert_eq!(view.severity, Severity::Warning);
        assert_eq!(
            view.lines,
            vec![
                "Error".to_string(),
                "UPSTREAM_TIMEOUT: Server timeout.".to_string(),
                "Retry attempt 2 of 3 in 7 seconds...".to_string(),
            ]
        );
        assert_eq!(view.action, Some("Retry Now"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_ticks() {
        let (mut sm, _) = machine();
        let mut rx = sm.subscribe();
        sm.update(false, "boom", 1);
        assert_eq!(*rx.borrow_and_update(), 10);

        tick(1).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 9);
    }
}
