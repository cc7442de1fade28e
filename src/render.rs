use crate::models::{Joke, StatsSnapshot};

pub const EMPTY_HISTORY: &str = "History is empty";
pub const HISTORY_FAILED: &str = "Failed to load history";
pub const STATS_FAILED: &str = "Failed to load statistics";
pub const PREVIEW_CHARS: usize = 50;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Placeholder(&'static str),
    Entries(Vec<HistoryItem>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub header: String,
    pub category: String,
    pub language: String,
    pub time: String,
    entry: Joke,
}

impl HistoryItem {
    pub fn text(&self) -> &str {
        &self.entry.text
    }

    /// The joke a click on this item's text brings back to the card.
    pub fn entry(&self) -> &Joke {
        &self.entry
    }
}

impl HistoryView {
    pub fn items(&self) -> &[HistoryItem] {
        match self {
            HistoryView::Placeholder(_) => &[],
            HistoryView::Entries(items) => items,
        }
    }

    pub fn item(&self, index: usize) -> Option<&HistoryItem> {
        self.items().get(index)
    }

    /// `1. text`, blank line, `2. text`, ... in rendered order.
    pub fn export_text(&self) -> String {
        self.items()
            .iter()
            .enumerate()
            .map(|(index, item)| format!("{}. {}", index + 1, item.text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn render_history(entries: &[Joke]) -> HistoryView {
    if entries.is_empty() {
        return HistoryView::Placeholder(EMPTY_HISTORY);
    }

    HistoryView::Entries(
        entries
            .iter()
            .map(|entry| HistoryItem {
                header: format!("#{}", entry.id),
                category: entry.category_label.clone(),
                language: entry.language_label.clone(),
                time: format!("{} {}", entry.date, entry.timestamp),
                entry: entry.clone(),
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsView {
    Placeholder(&'static str),
    Report(StatsReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub total: u64,
    pub by_language: Vec<StatRow>,
    pub by_category: Vec<StatRow>,
    pub recent: Option<Vec<RecentJoke>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentJoke {
    pub category: String,
    pub preview: String,
}

pub fn render_stats(snapshot: &StatsSnapshot) -> StatsView {
    let by_language = snapshot
        .by_language
        .iter()
        .map(|(label, totals)| StatRow {
            label: label.to_string(),
            value: totals.total,
        })
        .collect();
    let by_category = snapshot
        .by_category
        .iter()
        .map(|(label, count)| StatRow {
            label: label.to_string(),
            value: *count,
        })
        .collect();
    let recent = (!snapshot.last_5_jokes.is_empty()).then(|| {
        snapshot
            .last_5_jokes
            .iter()
            .take(5)
            .map(|joke| RecentJoke {
                category: joke.category_label.clone(),
                preview: preview(&joke.text),
            })
            .collect()
    });

    StatsView::Report(StatsReport {
        total: snapshot.total,
        by_language,
        by_category,
        recent,
    })
}

/// Texts of 50 characters or more are cut to 50 and marked with an ellipsis.
pub fn preview(text: &str) -> String {
    if text.chars().count() < PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}
