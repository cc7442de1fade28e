use crate::capabilities::{SPEECH_RATE, SpeechSynthesizer, speech_locale};
use crate::errors::ClientError;
use crate::models::{CATEGORIES, Choice, Joke, LANGUAGES, find_choice};
use crate::notifications::NotificationCenter;
use crate::remote::JokeApi;
use crate::storage::{Storage, auto_speak_enabled};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{error, warn};

pub const FETCH_ERROR_TEXT: &str = "Failed to load a joke. Please try again.";
pub const FETCH_ERROR_NOTICE: &str = "Failed to load a joke";

/// The five fields of the joke card as they are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedJoke {
    pub text: String,
    pub id: String,
    pub category: String,
    pub language: String,
    pub time: String,
    pub joke: Option<Joke>,
}

impl DisplayedJoke {
    fn from_joke(joke: Joke) -> Self {
        Self {
            text: joke.text.clone(),
            id: joke.id.to_string(),
            category: joke.category_label.clone(),
            language: joke.language_label.clone(),
            time: joke.composed_time(),
            joke: Some(joke),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub language: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            language: "ru".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct JokeViewModel {
    api: Arc<dyn JokeApi>,
    storage: Arc<dyn Storage>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    notifications: NotificationCenter,
    displayed: Arc<watch::Sender<DisplayedJoke>>,
    selection: Arc<Mutex<Selection>>,
}

impl JokeViewModel {
    pub fn new(
        api: Arc<dyn JokeApi>,
        storage: Arc<dyn Storage>,
        speech: Option<Arc<dyn SpeechSynthesizer>>,
        notifications: NotificationCenter,
        selection: Selection,
    ) -> Self {
        let (displayed, _) = watch::channel(DisplayedJoke::default());
        Self {
            api,
            storage,
            speech,
            notifications,
            displayed: Arc::new(displayed),
            selection: Arc::new(Mutex::new(selection)),
        }
    }

    pub fn displayed(&self) -> DisplayedJoke {
        self.displayed.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayedJoke> {
        self.displayed.subscribe()
    }

    pub async fn selection(&self) -> Selection {
        self.selection.lock().await.clone()
    }

    pub async fn select_category(&self, value: &str) -> Option<Choice> {
        let choice = find_choice(CATEGORIES, value)?;
        self.selection.lock().await.category = choice.value.to_string();
        Some(choice)
    }

    pub async fn select_language(&self, value: &str) -> Option<Choice> {
        let choice = find_choice(LANGUAGES, value)?;
        self.selection.lock().await.language = choice.value.to_string();
        Some(choice)
    }

    /// Replaces every visible field in one step.
    pub fn display(&self, joke: Joke) {
        self.displayed.send_replace(DisplayedJoke::from_joke(joke));
    }

    /// Shows a past entry again without asking the remote.
    pub fn rehydrate(&self, entry: &Joke) {
        self.display(entry.clone());
    }

    /// Fetches a joke for the current selection. On failure only the text
    /// field changes; the other fields keep their last good values.
    pub async fn fetch_and_display(&self) -> Option<Joke> {
        let selection = self.selection().await;
        match self
            .api
            .fetch_joke(&selection.category, &selection.language)
            .await
        {
            Ok(joke) => {
                self.display(joke.clone());
                if auto_speak_enabled(self.storage.as_ref()).await {
                    self.speak_with(&joke.text, &selection.language);
                }
                Some(joke)
            }
            Err(err) => {
                error!("failed to fetch joke: {err}");
                self.displayed.send_modify(|shown| {
                    shown.text = FETCH_ERROR_TEXT.to_string();
                });
                self.notifications.error(FETCH_ERROR_NOTICE);
                None
            }
        }
    }

    /// Reads the card text aloud in the voice of the selected language.
    pub async fn speak(&self) {
        let language = self.selection.lock().await.language.clone();
        let text = self.displayed.borrow().text.clone();
        self.speak_with(&text, &language);
    }

    fn speak_with(&self, text: &str, language: &str) {
        match &self.speech {
            Some(speech) => speech.speak(text, speech_locale(language), SPEECH_RATE),
            None => {
                let err = ClientError::CapabilityUnavailable("speech synthesis");
                warn!("{err}");
                self.notifications.warning(err.to_string());
            }
        }
    }
}
