use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::info;

pub const REFRESH_PERIOD: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoRefreshState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    pub label: &'static str,
    pub icon: &'static str,
    pub style: &'static str,
}

impl AutoRefreshState {
    pub fn is_running(self) -> bool {
        self == AutoRefreshState::Running
    }

    /// How the toggle control presents itself in this state.
    pub fn affordance(self) -> Affordance {
        match self {
            AutoRefreshState::Stopped => Affordance {
                label: "Auto mode (10 sec)",
                icon: "play",
                style: "btn-secondary",
            },
            AutoRefreshState::Running => Affordance {
                label: "Stop",
                icon: "stop",
                style: "btn-danger",
            },
        }
    }

    pub fn announcement(self) -> &'static str {
        match self {
            AutoRefreshState::Stopped => "Auto mode disabled",
            AutoRefreshState::Running => "Auto mode enabled (10 sec)",
        }
    }
}

/// Owns the periodic refresh timer. A timer handle exists exactly while
/// the controller is running.
pub struct AutoRefreshController {
    period: Duration,
    timer: Option<JoinHandle<()>>,
}

impl Default for AutoRefreshController {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoRefreshController {
    pub fn new() -> Self {
        Self::with_period(REFRESH_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            timer: None,
        }
    }

    pub fn state(&self) -> AutoRefreshState {
        if self.timer.is_some() {
            AutoRefreshState::Running
        } else {
            AutoRefreshState::Stopped
        }
    }

    /// Flips the state. Starting arms a repeating timer whose first tick
    /// comes one full period later; each tick runs `tick` as its own task so
    /// stopping never cuts a fetch short.
    pub fn toggle<F, Fut>(&mut self, tick: F) -> AutoRefreshState
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.stop() {
            return AutoRefreshState::Stopped;
        }

        let period = self.period;
        self.timer = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tokio::spawn(tick());
            }
        }));
        info!(period_ms = period.as_millis() as u64, "auto refresh started");
        AutoRefreshState::Running
    }

    /// Cancels the timer if one is armed. Returns whether anything was stopped.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(handle) => {
                handle.abort();
                info!("auto refresh stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for AutoRefreshController {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}
