use crate::models::{CATEGORIES, Choice, LANGUAGES, find_choice};
use crate::view::Selection;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_DATA_PATH: &str = "data/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub data_path: PathBuf,
    pub export_dir: PathBuf,
    pub selection: Selection,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("JOKE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let data_path = lookup("JOKE_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let export_dir = lookup("JOKE_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let timeout_secs = lookup("JOKE_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let defaults = Selection::default();
        let category = lookup("JOKE_CATEGORY")
            .filter(|value| known(CATEGORIES, "category", value))
            .unwrap_or(defaults.category);
        let language = lookup("JOKE_LANGUAGE")
            .filter(|value| known(LANGUAGES, "language", value))
            .unwrap_or(defaults.language);

        Self {
            api_url,
            data_path,
            export_dir,
            selection: Selection { category, language },
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn known(choices: &[Choice], what: &str, value: &str) -> bool {
    let found = find_choice(choices, value).is_some();
    if !found {
        warn!("ignoring unknown {what} {value:?}");
    }
    found
}
