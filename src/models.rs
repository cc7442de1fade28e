use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type JokeId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub id: JokeId,
    pub text: String,
    pub category: String,
    pub category_label: String,
    pub language: String,
    pub language_label: String,
    pub timestamp: String,
    pub date: String,
}

impl Joke {
    pub fn composed_time(&self) -> String {
        format!("{} {}", self.timestamp, self.date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTotals {
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub by_language: Breakdown<LanguageTotals>,
    pub by_category: Breakdown<u64>,
    #[serde(default)]
    pub last_5_jokes: Vec<Joke>,
}

/// A JSON object decoded with its key order intact.
pub type Breakdown<V> = IndexMap<String, V>;

#[derive(Debug, Deserialize)]
pub struct ClearHistoryResponse {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub const CATEGORIES: &[Choice] = &[
    Choice { value: "all", label: "All" },
    Choice { value: "neutral", label: "Neutral" },
    Choice { value: "chuck", label: "Chuck Norris" },
];

pub const LANGUAGES: &[Choice] = &[
    Choice { value: "en", label: "English" },
    Choice { value: "ru", label: "Russian" },
];

pub fn find_choice(choices: &[Choice], value: &str) -> Option<Choice> {
    choices.iter().copied().find(|choice| choice.value == value)
}
