use joke_client::capabilities::{Capabilities, FileDownloader};
use joke_client::ui::{Input, parse_input, render_screen};
use joke_client::{
    AppSettings, Command, Config, FileStorage, HttpJokeClient, JokeApi, JokeApp, Storage,
};
use std::io::Write;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_path));
    let api: Arc<dyn JokeApi> =
        Arc::new(HttpJokeClient::new(&config.api_url, config.request_timeout)?);
    let capabilities = Capabilities {
        downloader: Some(Arc::new(FileDownloader::new(&config.export_dir))),
        ..Capabilities::default()
    };
    let settings = AppSettings {
        selection: config.selection.clone(),
        share_url: config.api_url.clone(),
    };

    info!("using joke service at {}", config.api_url);
    let app = JokeApp::new(api, storage, capabilities, settings).await;
    let redraw = tokio::spawn(redraw_on_change(app.clone()));

    app.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Redraw => {}
            Input::Unknown(text) => println!("unknown command {text:?}, type `help`"),
            Input::Run(Command::ClearHistory) => {
                print!("Clear the whole joke history? [y/N] ");
                std::io::stdout().flush()?;
                let answer = lines.next_line().await?.unwrap_or_default();
                if matches!(answer.trim(), "y" | "Y" | "yes") {
                    app.handle(Command::ClearHistory).await;
                }
            }
            Input::Run(command) => app.handle(command).await,
        }
        draw(&app).await;
    }

    app.shutdown().await;
    redraw.abort();
    info!("bye");
    Ok(())
}

async fn redraw_on_change(app: JokeApp) {
    let mut jokes = app.view().subscribe();
    let mut notices = app.notifications().subscribe();
    loop {
        let changed = tokio::select! {
            changed = jokes.changed() => changed,
            changed = notices.changed() => changed,
        };
        if changed.is_err() {
            break;
        }
        draw(&app).await;
    }
}

async fn draw(app: &JokeApp) {
    let screen = render_screen(&app.snapshot().await);
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{screen}");
    let _ = stdout.flush();
}
