use crate::app::{Command, UiSnapshot};
use crate::panels::Panel;
use crate::render::{HistoryView, StatsView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Run(Command),
    Quit,
    Redraw,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Input::Redraw;
    };
    let argument = words.next();

    let command = match (word, argument) {
        ("generate" | "g", None) => Command::Generate,
        ("auto" | "a", None) => Command::ToggleAutoRefresh,
        ("history" | "h", None) => Command::TogglePanel(Panel::History),
        ("stats" | "s", None) => Command::TogglePanel(Panel::Stats),
        ("help" | "?", None) => Command::TogglePanel(Panel::Help),
        ("clear", None) => Command::ClearHistory,
        ("refresh", None) => Command::RefreshStats,
        ("copy", None) => Command::Copy,
        ("share", None) => Command::Share,
        ("fav" | "f", None) => Command::ToggleFavorite,
        ("speak", None) => Command::Speak,
        ("export", None) => Command::ExportHistory,
        ("open", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::OpenHistoryEntry(n - 1),
            _ => return Input::Unknown(line.trim().to_string()),
        },
        ("category", Some(value)) => Command::SetCategory(value.to_string()),
        ("language", Some(value)) => Command::SetLanguage(value.to_string()),
        ("quit" | "q" | "exit", None) => return Input::Quit,
        _ => return Input::Unknown(line.trim().to_string()),
    };
    Input::Run(command)
}

pub fn render_screen(snapshot: &UiSnapshot) -> String {
    let shown = &snapshot.displayed;
    let affordance = snapshot.auto_refresh.affordance();
    let favorite = if snapshot.is_favorite { "★" } else { "☆" };

    let mut screen = format!(
        "\n{RULE}\n {}\n{RULE}\n #{}  {} | {} | {}  {}\n selection: {}/{}   auto: [{}] {}\n",
        shown.text,
        shown.id,
        shown.category,
        shown.language,
        shown.time,
        favorite,
        snapshot.selection.category,
        snapshot.selection.language,
        affordance.icon,
        affordance.label,
    );

    match snapshot.visible_panel {
        Some(Panel::History) => render_history_panel(&mut screen, snapshot.history.as_ref()),
        Some(Panel::Stats) => render_stats_panel(&mut screen, snapshot.stats.as_ref()),
        Some(Panel::Help) => screen.push_str(HELP),
        None => {}
    }

    if let Some(notification) = &snapshot.notification {
        screen.push_str(&format!(
            "\n\x1b[{}m[{}] {}: {}\x1b[0m\n",
            notification.severity.color(),
            notification.raised_at.format("%H:%M:%S"),
            notification.severity.as_str(),
            notification.message
        ));
    }
    screen
}

fn render_history_panel(screen: &mut String, history: Option<&HistoryView>) {
    screen.push_str("\n== History ==\n");
    match history {
        None => screen.push_str("loading...\n"),
        Some(HistoryView::Placeholder(text)) => screen.push_str(&format!("  {text}\n")),
        Some(HistoryView::Entries(items)) => {
            for (index, item) in items.iter().enumerate() {
                screen.push_str(&format!(
                    "{:>3}. {} [{}] [{}] {}\n     {}\n",
                    index + 1,
                    item.header,
                    item.category,
                    item.language,
                    item.time,
                    item.text()
                ));
            }
        }
    }
}

fn render_stats_panel(screen: &mut String, stats: Option<&StatsView>) {
    screen.push_str("\n== Statistics ==\n");
    let report = match stats {
        None => {
            screen.push_str("loading...\n");
            return;
        }
        Some(StatsView::Placeholder(text)) => {
            screen.push_str(&format!("  {text}\n"));
            return;
        }
        Some(StatsView::Report(report)) => report,
    };

    screen.push_str(&format!("Total jokes: {}\n", report.total));
    screen.push_str("By language:\n");
    for row in &report.by_language {
        screen.push_str(&format!("  {:<20} {}\n", row.label, row.value));
    }
    screen.push_str("By category:\n");
    for row in &report.by_category {
        screen.push_str(&format!("  {:<20} {}\n", row.label, row.value));
    }
    if let Some(recent) = &report.recent {
        screen.push_str("Recent jokes:\n");
        for joke in recent {
            screen.push_str(&format!("  [{}] {}\n", joke.category, joke.preview));
        }
    }
}

const RULE: &str = "+--------------------------------------------------------------+";

const HELP: &str = r#"
== Help ==
  generate, g        fetch a new joke
  auto, a            start or stop auto mode (every 10 sec)
  history, h         show or hide the history panel
  stats, s           show or hide statistics
  help, ?            show or hide this help
  open N             show history entry N on the card
  clear              clear the remote history
  refresh            reload statistics
  export             save the shown history to joke_history.txt
  copy / share       copy or share the current joke
  fav, f             add or remove the current joke from favorites
  speak              read the current joke aloud
  category X         all | neutral | chuck
  language X         en | ru
  quit, q            leave
"#;
