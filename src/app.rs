use crate::auto_refresh::{AutoRefreshController, AutoRefreshState};
use crate::capabilities::{Capabilities, EXPORT_FILE_NAME, SHARE_TITLE};
use crate::errors::ClientError;
use crate::favorites::{FavoriteChange, FavoritesStore};
use crate::notifications::{Notification, NotificationCenter};
use crate::panels::{Panel, PanelController, PanelLoad};
use crate::remote::JokeApi;
use crate::render::{
    HISTORY_FAILED, HistoryView, STATS_FAILED, StatsView, render_history, render_stats,
};
use crate::storage::Storage;
use crate::view::{DisplayedJoke, JokeViewModel, Selection};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate,
    ToggleAutoRefresh,
    TogglePanel(Panel),
    ClearHistory,
    RefreshStats,
    Copy,
    Share,
    ToggleFavorite,
    Speak,
    ExportHistory,
    OpenHistoryEntry(usize),
    SetCategory(String),
    SetLanguage(String),
}

#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub selection: Selection,
    pub share_url: String,
}

/// Everything the front-end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct UiSnapshot {
    pub displayed: DisplayedJoke,
    pub is_favorite: bool,
    pub selection: Selection,
    pub auto_refresh: AutoRefreshState,
    pub visible_panel: Option<Panel>,
    pub history: Option<HistoryView>,
    pub stats: Option<StatsView>,
    pub notification: Option<Notification>,
}

// Rendered panel contents only live while their panel is visible.
struct Controllers {
    panels: PanelController,
    auto_refresh: AutoRefreshController,
    history: Option<HistoryView>,
    stats: Option<StatsView>,
}

impl Controllers {
    fn drop_hidden_views(&mut self) {
        if !self.panels.is_visible(Panel::History) {
            self.history = None;
        }
        if !self.panels.is_visible(Panel::Stats) {
            self.stats = None;
        }
    }
}

#[derive(Clone)]
pub struct JokeApp {
    api: Arc<dyn JokeApi>,
    view: JokeViewModel,
    favorites: FavoritesStore,
    notifications: NotificationCenter,
    capabilities: Capabilities,
    share_url: String,
    controllers: Arc<Mutex<Controllers>>,
}

impl JokeApp {
    pub async fn new(
        api: Arc<dyn JokeApi>,
        storage: Arc<dyn Storage>,
        capabilities: Capabilities,
        settings: AppSettings,
    ) -> Self {
        let notifications = NotificationCenter::new();
        let favorites = FavoritesStore::load(Arc::clone(&storage)).await;
        let view = JokeViewModel::new(
            Arc::clone(&api),
            storage,
            capabilities.speech.clone(),
            notifications.clone(),
            settings.selection,
        );

        Self {
            api,
            view,
            favorites,
            notifications,
            capabilities,
            share_url: settings.share_url,
            controllers: Arc::new(Mutex::new(Controllers {
                panels: PanelController::new(),
                auto_refresh: AutoRefreshController::new(),
                history: None,
                stats: None,
            })),
        }
    }

    pub fn view(&self) -> &JokeViewModel {
        &self.view
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// First joke on startup.
    pub async fn start(&self) {
        self.view.fetch_and_display().await;
    }

    pub async fn handle(&self, command: Command) {
        debug!(?command, "handling command");
        match command {
            Command::Generate => {
                self.view.fetch_and_display().await;
            }
            Command::ToggleAutoRefresh => self.toggle_auto_refresh().await,
            Command::TogglePanel(panel) => self.toggle_panel(panel).await,
            Command::ClearHistory => self.clear_history().await,
            Command::RefreshStats => self.refresh_stats().await,
            Command::Copy => self.copy().await,
            Command::Share => self.share().await,
            Command::ToggleFavorite => self.toggle_favorite().await,
            Command::Speak => self.view.speak().await,
            Command::ExportHistory => self.export_history().await,
            Command::OpenHistoryEntry(index) => self.open_history_entry(index).await,
            Command::SetCategory(value) => {
                if self.view.select_category(&value).await.is_none() {
                    self.notifications.warning(format!("Unknown category {value:?}"));
                }
            }
            Command::SetLanguage(value) => {
                if self.view.select_language(&value).await.is_none() {
                    self.notifications.warning(format!("Unknown language {value:?}"));
                }
            }
        }
    }

    pub async fn snapshot(&self) -> UiSnapshot {
        let displayed = self.view.displayed();
        let is_favorite = match &displayed.joke {
            Some(joke) => self.favorites.is_favorite(joke.id).await,
            None => false,
        };
        let selection = self.view.selection().await;
        let controllers = self.controllers.lock().await;

        UiSnapshot {
            displayed,
            is_favorite,
            selection,
            auto_refresh: controllers.auto_refresh.state(),
            visible_panel: controllers.panels.visible(),
            history: controllers.history.clone(),
            stats: controllers.stats.clone(),
            notification: self.notifications.current(),
        }
    }

    /// Stops the refresh timer; used on shutdown.
    pub async fn shutdown(&self) {
        self.controllers.lock().await.auto_refresh.stop();
    }

    async fn toggle_auto_refresh(&self) {
        let state = {
            let mut controllers = self.controllers.lock().await;
            let view = self.view.clone();
            controllers.auto_refresh.toggle(move || {
                let view = view.clone();
                async move {
                    view.fetch_and_display().await;
                }
            })
        };

        self.notifications.success(state.announcement());
        if state.is_running() {
            self.view.fetch_and_display().await;
        }
    }

    async fn toggle_panel(&self, panel: Panel) {
        let load = {
            let mut controllers = self.controllers.lock().await;
            let load = controllers.panels.toggle(panel);
            controllers.drop_hidden_views();
            load
        };

        match load {
            Some(PanelLoad::History) => self.load_history().await,
            Some(PanelLoad::Stats) => self.load_stats().await,
            None => {}
        }
    }

    async fn load_history(&self) {
        let view = match self.api.fetch_history().await {
            Ok(entries) => render_history(&entries),
            Err(err) => {
                error!("failed to load history: {err}");
                self.notifications.error(HISTORY_FAILED);
                HistoryView::Placeholder(HISTORY_FAILED)
            }
        };

        let mut controllers = self.controllers.lock().await;
        if controllers.panels.is_visible(Panel::History) {
            controllers.history = Some(view);
        } else {
            debug!("history panel closed before history arrived");
        }
    }

    async fn load_stats(&self) {
        let view = match self.api.fetch_stats().await {
            Ok(snapshot) => render_stats(&snapshot),
            Err(err) => {
                error!("failed to load stats: {err}");
                self.notifications.error(STATS_FAILED);
                StatsView::Placeholder(STATS_FAILED)
            }
        };

        let mut controllers = self.controllers.lock().await;
        if controllers.panels.is_visible(Panel::Stats) {
            controllers.stats = Some(view);
        } else {
            debug!("stats panel closed before stats arrived");
        }
    }

    async fn refresh_stats(&self) {
        let visible = self.controllers.lock().await.panels.is_visible(Panel::Stats);
        if visible {
            self.load_stats().await;
        } else {
            debug!("ignoring stats refresh while the panel is hidden");
        }
    }

    async fn clear_history(&self) {
        match self.api.clear_history().await {
            Ok(()) => {
                info!("history cleared");
                self.notifications.success("History cleared");
                let visible = self
                    .controllers
                    .lock()
                    .await
                    .panels
                    .is_visible(Panel::History);
                if visible {
                    self.load_history().await;
                }
            }
            Err(err) => {
                error!("failed to clear history: {err}");
                self.notifications.error("Failed to clear history");
            }
        }
    }

    async fn copy(&self) {
        let Some(clipboard) = &self.capabilities.clipboard else {
            self.unavailable("clipboard");
            return;
        };
        let text = self.view.displayed().text;
        match clipboard.write_text(&text).await {
            Ok(()) => self.notifications.success("Joke copied to clipboard!"),
            Err(err) => {
                error!("failed to copy joke: {err}");
                self.notifications.error("Could not copy the joke");
            }
        }
    }

    async fn share(&self) {
        let Some(target) = &self.capabilities.share else {
            self.notifications.warning("Press Ctrl+C to copy the joke");
            return;
        };
        let text = self.view.displayed().text;
        if let Err(err) = target.share(SHARE_TITLE, &text, &self.share_url).await {
            error!("failed to share joke: {err}");
            self.notifications.error("Could not share the joke");
        }
    }

    fn unavailable(&self, capability: &'static str) {
        let err = ClientError::CapabilityUnavailable(capability);
        warn!("{err}");
        self.notifications.warning(err.to_string());
    }

    async fn toggle_favorite(&self) {
        let Some(joke) = self.view.displayed().joke else {
            self.notifications.warning("There is no joke to add to favorites");
            return;
        };
        match self.favorites.toggle(joke.id).await {
            FavoriteChange::Added => self.notifications.success("Added to favorites"),
            FavoriteChange::Removed => self.notifications.success("Removed from favorites"),
        }
    }

    async fn export_history(&self) {
        let text = {
            let controllers = self.controllers.lock().await;
            controllers
                .history
                .as_ref()
                .filter(|history| !history.items().is_empty())
                .map(HistoryView::export_text)
        };
        let Some(text) = text else {
            self.notifications.warning("Open a non-empty history to export it");
            return;
        };
        let Some(downloader) = &self.capabilities.downloader else {
            self.unavailable("file saving");
            return;
        };

        match downloader.save(EXPORT_FILE_NAME, &text).await {
            Ok(_) => self.notifications.success("History exported to file"),
            Err(err) => {
                error!("failed to export history: {err}");
                self.notifications.error("Failed to export history");
            }
        }
    }

    async fn open_history_entry(&self, index: usize) {
        let entry = {
            let controllers = self.controllers.lock().await;
            controllers
                .history
                .as_ref()
                .and_then(|history| history.item(index))
                .map(|item| item.entry().clone())
        };
        match entry {
            Some(entry) => self.view.rehydrate(&entry),
            None => {
                warn!(index, "no rendered history entry");
                self.notifications.warning(format!("No history entry {}", index + 1));
            }
        }
    }
}
