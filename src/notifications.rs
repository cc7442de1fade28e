use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const HIDE_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
}

impl Severity {
    /// ANSI foreground color code.
    pub fn color(self) -> u8 {
        match self {
            Severity::Success => 32,
            Severity::Error => 31,
            Severity::Warning => 34,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub raised_at: DateTime<Local>,
    generation: u64,
}

/// Single-slot toast: the newest message replaces the old one and restarts
/// the hide timer.
#[derive(Clone)]
pub struct NotificationCenter {
    current: Arc<watch::Sender<Option<Notification>>>,
    hide_task: Arc<Mutex<HideTimer>>,
    hide_after: Duration,
}

#[derive(Default)]
struct HideTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_hide_after(HIDE_AFTER)
    }

    pub fn with_hide_after(hide_after: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            hide_task: Arc::new(Mutex::new(HideTimer::default())),
            hide_after,
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let mut timer = match self.hide_task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = timer.handle.take() {
            previous.abort();
        }
        timer.generation += 1;
        let generation = timer.generation;

        self.current.send_replace(Some(Notification {
            message: message.into(),
            severity,
            raised_at: Local::now(),
            generation,
        }));

        let current = Arc::clone(&self.current);
        let hide_after = self.hide_after;
        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(hide_after).await;
            current.send_if_modified(|slot| match slot {
                Some(shown) if shown.generation == generation => {
                    *slot = None;
                    true
                }
                _ => false,
            });
        }));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(message, Severity::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(message, Severity::Error);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(message, Severity::Warning);
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }
}
