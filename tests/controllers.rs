use async_trait::async_trait;
use joke_client::auto_refresh::AutoRefreshState;
use joke_client::capabilities::{
    Capabilities, Clipboard, EXPORT_FILE_NAME, FileDownloader, SpeechSynthesizer,
};
use joke_client::favorites::{FavoriteChange, FavoritesStore};
use joke_client::models::{Joke, StatsSnapshot};
use joke_client::notifications::{NotificationCenter, Severity};
use joke_client::panels::Panel;
use joke_client::render::{EMPTY_HISTORY, HISTORY_FAILED, HistoryView, StatsView};
use joke_client::storage::{AUTO_SPEAK_KEY, FAVORITES_KEY};
use joke_client::view::{DisplayedJoke, FETCH_ERROR_TEXT};
use joke_client::{
    AppSettings, ClientError, Command, FileStorage, JokeApi, JokeApp, MemoryStorage, Storage,
};
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, oneshot};

static SCENARIO_JOKE: Lazy<Joke> = Lazy::new(|| Joke {
    id: 42,
    text: "Why did...".to_string(),
    category: "prog".to_string(),
    category_label: "Programming".to_string(),
    language: "en".to_string(),
    language_label: "English".to_string(),
    timestamp: "10:00".to_string(),
    date: "2024-01-01".to_string(),
});

fn joke(id: u64, text: &str) -> Joke {
    Joke {
        id,
        text: text.to_string(),
        ..SCENARIO_JOKE.clone()
    }
}

#[derive(Default)]
struct MockJokeApi {
    scripted: Mutex<VecDeque<Joke>>,
    queries: Mutex<Vec<(String, String)>>,
    history: Mutex<Vec<Joke>>,
    joke_calls: AtomicUsize,
    history_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    fail_jokes: AtomicBool,
    fail_history: AtomicBool,
    fail_clear: AtomicBool,
}

impl MockJokeApi {
    fn with_jokes(jokes: impl IntoIterator<Item = Joke>) -> Self {
        let api = Self::default();
        api.scripted.lock().unwrap().extend(jokes);
        api
    }

    fn joke_calls(&self) -> usize {
        self.joke_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JokeApi for MockJokeApi {
    async fn fetch_joke(&self, category: &str, language: &str) -> Result<Joke, ClientError> {
        let call = self.joke_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries
            .lock()
            .unwrap()
            .push((category.to_string(), language.to_string()));
        if self.fail_jokes.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".into()));
        }
        let next = self.scripted.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| joke(call as u64, &format!("joke number {call}"))))
    }

    async fn fetch_history(&self) -> Result<Vec<Joke>, ClientError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(ClientError::Decode("expected an array".into()));
        }
        Ok(self.history.lock().unwrap().clone())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let history = self.history.lock().unwrap();
        Ok(StatsSnapshot {
            total: history.len() as u64,
            by_language: [("English".to_string(), Default::default())].into_iter().collect(),
            by_category: [("Programming".to_string(), history.len() as u64)].into_iter().collect(),
            last_5_jokes: history.iter().take(5).cloned().collect(),
        })
    }

    async fn clear_history(&self) -> Result<(), ClientError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection reset".into()));
        }
        self.history.lock().unwrap().clear();
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSpeech {
    spoken: Mutex<Vec<(String, String, f32)>>,
}

impl SpeechSynthesizer for RecordingSpeech {
    fn speak(&self, text: &str, locale: &str, rate: f32) {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), locale.to_string(), rate));
    }
}

#[derive(Default)]
struct RecordingClipboard {
    contents: Mutex<Option<String>>,
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClientError> {
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

// The first fetch stays in flight until the test releases it.
struct HeldFirstFetch {
    late: Joke,
    early: Joke,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    entered: Notify,
}

impl HeldFirstFetch {
    fn new(late: Joke, early: Joke, gate: oneshot::Receiver<()>) -> Self {
        Self {
            late,
            early,
            gate: Mutex::new(Some(gate)),
            entered: Notify::new(),
        }
    }
}

#[async_trait]
impl JokeApi for HeldFirstFetch {
    async fn fetch_joke(&self, _category: &str, _language: &str) -> Result<Joke, ClientError> {
        let held = self.gate.lock().unwrap().take();
        match held {
            Some(release) => {
                self.entered.notify_one();
                let _ = release.await;
                Ok(self.late.clone())
            }
            None => Ok(self.early.clone()),
        }
    }

    async fn fetch_history(&self) -> Result<Vec<Joke>, ClientError> {
        Ok(Vec::new())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError> {
        Ok(StatsSnapshot::default())
    }

    async fn clear_history(&self) -> Result<(), ClientError> {
        Ok(())
    }
}

fn card_for(joke: &Joke) -> DisplayedJoke {
    DisplayedJoke {
        text: joke.text.clone(),
        id: joke.id.to_string(),
        category: joke.category_label.clone(),
        language: joke.language_label.clone(),
        time: joke.composed_time(),
        joke: Some(joke.clone()),
    }
}

async fn app_with(api: &Arc<MockJokeApi>, storage: Arc<dyn Storage>, capabilities: Capabilities) -> JokeApp {
    JokeApp::new(api.clone(), storage, capabilities, AppSettings::default()).await
}

async fn plain_app(api: &Arc<MockJokeApi>) -> JokeApp {
    app_with(api, Arc::new(MemoryStorage::new()), Capabilities::default()).await
}

fn severity(app: &JokeApp) -> Option<Severity> {
    app.notifications().current().map(|n| n.severity)
}

#[tokio::test]
async fn fetched_joke_fills_every_field() {
    let api = Arc::new(MockJokeApi::with_jokes([SCENARIO_JOKE.clone()]));
    let app = plain_app(&api).await;

    app.handle(Command::Generate).await;

    let shown = app.view().displayed();
    assert_eq!(shown.text, "Why did...");
    assert_eq!(shown.id, "42");
    assert_eq!(shown.category, "Programming");
    assert_eq!(shown.language, "English");
    assert_eq!(shown.time, "10:00 2024-01-01");
    assert_eq!(shown.joke.as_ref(), Some(&*SCENARIO_JOKE));
}

#[tokio::test]
async fn selection_is_sent_with_each_fetch() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    app.start().await;
    app.handle(Command::SetCategory("chuck".into())).await;
    app.handle(Command::SetLanguage("en".into())).await;
    app.handle(Command::SetLanguage("fr".into())).await;
    app.handle(Command::Generate).await;

    let queries = api.queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![
            ("all".to_string(), "ru".to_string()),
            ("chuck".to_string(), "en".to_string()),
        ]
    );
    assert_eq!(severity(&app), Some(Severity::Warning));
}

#[tokio::test]
async fn failed_fetch_only_replaces_the_text() {
    let api = Arc::new(MockJokeApi::with_jokes([SCENARIO_JOKE.clone()]));
    let app = plain_app(&api).await;
    app.handle(Command::Generate).await;
    let before = app.view().displayed();

    api.fail_jokes.store(true, Ordering::SeqCst);
    app.handle(Command::Generate).await;

    let after = app.view().displayed();
    assert_eq!(after.text, FETCH_ERROR_TEXT);
    assert_eq!(after.id, before.id);
    assert_eq!(after.category, before.category);
    assert_eq!(after.language, before.language);
    assert_eq!(after.time, before.time);
    assert_eq!(severity(&app), Some(Severity::Error));
}

#[tokio::test]
async fn last_resolved_fetch_owns_the_whole_card() {
    let late = Joke {
        id: 7,
        text: "Slow one".to_string(),
        category: "neutral".to_string(),
        category_label: "Neutral".to_string(),
        language: "ru".to_string(),
        language_label: "Russian".to_string(),
        timestamp: "09:59".to_string(),
        date: "2023-12-31".to_string(),
    };
    let (release, gate) = oneshot::channel();
    let api = Arc::new(HeldFirstFetch::new(late.clone(), SCENARIO_JOKE.clone(), gate));
    let app = JokeApp::new(
        api.clone(),
        Arc::new(MemoryStorage::new()),
        Capabilities::default(),
        AppSettings::default(),
    )
    .await;
    let mut cards = app.view().subscribe();

    let slow = app.handle(Command::Generate);
    let fast = async {
        api.entered.notified().await;
        app.handle(Command::Generate).await;
        assert_eq!(*cards.borrow_and_update(), card_for(&SCENARIO_JOKE));
        release.send(()).unwrap();
    };
    tokio::join!(slow, fast);

    assert!(cards.has_changed().unwrap());
    assert_eq!(*cards.borrow_and_update(), card_for(&late));
    assert_eq!(app.view().displayed(), card_for(&late));
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_stopped_before_first_tick_fetches_once() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    app.handle(Command::ToggleAutoRefresh).await;
    assert_eq!(app.snapshot().await.auto_refresh, AutoRefreshState::Running);
    assert_eq!(api.joke_calls(), 1);

    tokio::time::sleep(Duration::from_millis(4_000)).await;
    app.handle(Command::ToggleAutoRefresh).await;
    assert_eq!(app.snapshot().await.auto_refresh, AutoRefreshState::Stopped);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(api.joke_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_ticks_until_stopped() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    app.handle(Command::ToggleAutoRefresh).await;
    tokio::time::sleep(Duration::from_millis(25_000)).await;
    assert_eq!(api.joke_calls(), 3);
    assert_eq!(app.view().displayed().id, "3");

    app.handle(Command::ToggleAutoRefresh).await;
    let notice = app.notifications().current().unwrap();
    assert_eq!(notice.message, "Auto mode disabled");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.joke_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_can_restart_after_stop() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    for _ in 0..3 {
        app.handle(Command::ToggleAutoRefresh).await;
        app.handle(Command::ToggleAutoRefresh).await;
    }
    app.handle(Command::ToggleAutoRefresh).await;
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    // four immediate fetches plus one tick from the single live timer
    assert_eq!(api.joke_calls(), 5);
    app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn newest_notification_wins_and_restarts_the_timer() {
    let notifications = NotificationCenter::new();

    notifications.success("first");
    tokio::time::sleep(Duration::from_millis(2_000)).await;
    notifications.error("second");
    tokio::time::sleep(Duration::from_millis(2_000)).await;

    let shown = notifications.current().unwrap();
    assert_eq!(shown.message, "second");
    assert_eq!(shown.severity, Severity::Error);

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert!(notifications.current().is_none());
}

#[tokio::test]
async fn empty_history_shows_a_single_placeholder() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    app.handle(Command::TogglePanel(Panel::History)).await;

    let snapshot = app.snapshot().await;
    assert_eq!(snapshot.visible_panel, Some(Panel::History));
    let history = snapshot.history.unwrap();
    assert_eq!(history, HistoryView::Placeholder(EMPTY_HISTORY));
    assert!(history.items().is_empty());
}

#[tokio::test]
async fn switching_panels_fetches_only_for_data_panels() {
    let api = Arc::new(MockJokeApi::default());
    *api.history.lock().unwrap() = vec![joke(2, "b"), joke(1, "a")];
    let app = plain_app(&api).await;

    app.handle(Command::TogglePanel(Panel::History)).await;
    app.handle(Command::TogglePanel(Panel::Stats)).await;
    let snapshot = app.snapshot().await;
    assert_eq!(snapshot.visible_panel, Some(Panel::Stats));
    assert!(snapshot.history.is_none());
    assert!(matches!(snapshot.stats, Some(StatsView::Report(_))));

    app.handle(Command::TogglePanel(Panel::Help)).await;
    app.handle(Command::TogglePanel(Panel::Help)).await;
    let snapshot = app.snapshot().await;
    assert_eq!(snapshot.visible_panel, None);
    assert!(snapshot.stats.is_none());

    assert_eq!(api.history_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.stats_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn history_failure_keeps_panel_open_with_error_placeholder() {
    let api = Arc::new(MockJokeApi::default());
    api.fail_history.store(true, Ordering::SeqCst);
    let app = plain_app(&api).await;

    app.handle(Command::TogglePanel(Panel::History)).await;

    let snapshot = app.snapshot().await;
    assert_eq!(snapshot.visible_panel, Some(Panel::History));
    assert_eq!(snapshot.history, Some(HistoryView::Placeholder(HISTORY_FAILED)));
    assert_eq!(severity(&app), Some(Severity::Error));
}

#[tokio::test]
async fn failed_clear_leaves_rendered_history_alone() {
    let api = Arc::new(MockJokeApi::default());
    *api.history.lock().unwrap() = vec![joke(1, "kept")];
    let app = plain_app(&api).await;
    app.handle(Command::TogglePanel(Panel::History)).await;
    let before = app.snapshot().await.history;

    api.fail_clear.store(true, Ordering::SeqCst);
    app.handle(Command::ClearHistory).await;

    assert_eq!(app.snapshot().await.history, before);
    assert_eq!(severity(&app), Some(Severity::Error));
    assert_eq!(api.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_clear_reloads_the_open_history() {
    let api = Arc::new(MockJokeApi::default());
    *api.history.lock().unwrap() = vec![joke(1, "gone soon")];
    let app = plain_app(&api).await;
    app.handle(Command::TogglePanel(Panel::History)).await;

    app.handle(Command::ClearHistory).await;

    assert_eq!(
        app.snapshot().await.history,
        Some(HistoryView::Placeholder(EMPTY_HISTORY))
    );
    assert_eq!(severity(&app), Some(Severity::Success));
}

#[tokio::test]
async fn opening_a_history_entry_does_not_refetch() {
    let api = Arc::new(MockJokeApi::default());
    *api.history.lock().unwrap() = vec![joke(9, "newest"), joke(8, "older")];
    let app = plain_app(&api).await;
    app.handle(Command::TogglePanel(Panel::History)).await;

    app.handle(Command::OpenHistoryEntry(1)).await;
    assert_eq!(app.view().displayed().text, "older");
    assert_eq!(app.view().displayed().id, "8");

    app.handle(Command::OpenHistoryEntry(5)).await;
    assert_eq!(app.view().displayed().id, "8");
    assert_eq!(severity(&app), Some(Severity::Warning));
    assert_eq!(api.joke_calls(), 0);
}

#[tokio::test]
async fn favorite_toggle_round_trip_restores_payload() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(FAVORITES_KEY, "[3,7]").await.unwrap();
    let api = Arc::new(MockJokeApi::with_jokes([joke(5, "fave")]));
    let app = app_with(&api, storage.clone(), Capabilities::default()).await;
    app.handle(Command::Generate).await;

    app.handle(Command::ToggleFavorite).await;
    assert!(app.snapshot().await.is_favorite);
    assert_eq!(storage.get(FAVORITES_KEY).await.as_deref(), Some("[3,5,7]"));
    assert_eq!(app.notifications().current().unwrap().message, "Added to favorites");

    app.handle(Command::ToggleFavorite).await;
    assert!(!app.snapshot().await.is_favorite);
    assert_eq!(storage.get(FAVORITES_KEY).await.as_deref(), Some("[3,7]"));
}

#[tokio::test]
async fn favorites_remove_existing_ids() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set(FAVORITES_KEY, "[1,2]").await.unwrap();
    let favorites = FavoritesStore::load(storage.clone()).await;

    assert_eq!(favorites.toggle(1).await, FavoriteChange::Removed);
    assert_eq!(favorites.toggle(1).await, FavoriteChange::Added);
    assert_eq!(favorites.ids().await, vec![1, 2]);
    assert_eq!(storage.get(FAVORITES_KEY).await.as_deref(), Some("[1,2]"));
}

#[tokio::test]
async fn corrupt_favorites_load_as_empty() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set(FAVORITES_KEY, "{not json").await.unwrap();

    let favorites = FavoritesStore::load(storage).await;

    assert!(favorites.ids().await.is_empty());
    assert!(!favorites.is_favorite(1).await);
}

#[tokio::test]
async fn file_storage_survives_reopen_and_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = FileStorage::new(&path);
    assert_eq!(storage.get(FAVORITES_KEY).await, None);
    storage.set(FAVORITES_KEY, "[4]").await.unwrap();
    storage.set(AUTO_SPEAK_KEY, "true").await.unwrap();

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get(FAVORITES_KEY).await.as_deref(), Some("[4]"));
    assert_eq!(reopened.get(AUTO_SPEAK_KEY).await.as_deref(), Some("true"));

    std::fs::write(&path, "garbage").unwrap();
    assert_eq!(reopened.get(FAVORITES_KEY).await, None);
    let favorites = FavoritesStore::load(Arc::new(reopened)).await;
    assert!(favorites.ids().await.is_empty());
}

#[tokio::test]
async fn auto_speak_reads_new_jokes_in_selected_voice() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(AUTO_SPEAK_KEY, "true").await.unwrap();
    let speech = Arc::new(RecordingSpeech::default());
    let capabilities = Capabilities {
        speech: Some(speech.clone()),
        ..Capabilities::default()
    };
    let api = Arc::new(MockJokeApi::with_jokes([joke(1, "раз"), joke(2, "two")]));
    let app = app_with(&api, storage, capabilities).await;

    app.handle(Command::Generate).await;
    app.handle(Command::SetLanguage("en".into())).await;
    app.handle(Command::Generate).await;

    let spoken = speech.spoken.lock().unwrap().clone();
    assert_eq!(
        spoken,
        vec![
            ("раз".to_string(), "ru-RU".to_string(), 0.9),
            ("two".to_string(), "en-US".to_string(), 0.9),
        ]
    );
}

#[tokio::test]
async fn speech_without_synthesizer_warns() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;
    app.handle(Command::Generate).await;

    app.handle(Command::Speak).await;

    assert_eq!(severity(&app), Some(Severity::Warning));
}

#[tokio::test]
async fn share_without_capability_prompts_manual_copy() {
    let api = Arc::new(MockJokeApi::default());
    let app = plain_app(&api).await;

    app.handle(Command::Share).await;

    let notice = app.notifications().current().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert!(notice.message.contains("Ctrl+C"));
}

#[tokio::test]
async fn copy_writes_the_displayed_text() {
    let clipboard = Arc::new(RecordingClipboard::default());
    let capabilities = Capabilities {
        clipboard: Some(clipboard.clone()),
        ..Capabilities::default()
    };
    let api = Arc::new(MockJokeApi::with_jokes([joke(1, "copy me")]));
    let app = app_with(&api, Arc::new(MemoryStorage::new()), capabilities).await;
    app.handle(Command::Generate).await;

    app.handle(Command::Copy).await;

    assert_eq!(clipboard.contents.lock().unwrap().as_deref(), Some("copy me"));
    assert_eq!(severity(&app), Some(Severity::Success));
}

#[tokio::test]
async fn export_saves_rendered_history() {
    let dir = tempfile::tempdir().unwrap();
    let capabilities = Capabilities {
        downloader: Some(Arc::new(FileDownloader::new(dir.path()))),
        ..Capabilities::default()
    };
    let api = Arc::new(MockJokeApi::default());
    *api.history.lock().unwrap() = vec![joke(2, "second"), joke(1, "first")];
    let app = app_with(&api, Arc::new(MemoryStorage::new()), capabilities).await;

    app.handle(Command::ExportHistory).await;
    assert_eq!(severity(&app), Some(Severity::Warning));
    assert!(!dir.path().join(EXPORT_FILE_NAME).exists());

    app.handle(Command::TogglePanel(Panel::History)).await;
    app.handle(Command::ExportHistory).await;

    let saved = std::fs::read_to_string(dir.path().join(EXPORT_FILE_NAME)).unwrap();
    assert_eq!(saved, "1. second\n\n2. first");
    assert_eq!(severity(&app), Some(Severity::Success));
}
