//! Optional host integrations. A missing capability is a normal runtime
//! state; callers check for presence before invoking.

use crate::errors::ClientError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

pub const SPEECH_RATE: f32 = 0.9;
pub const EXPORT_FILE_NAME: &str = "joke_history.txt";
pub const SHARE_TITLE: &str = "Random joke";

/// Fire-and-forget text-to-speech.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, locale: &str, rate: f32);
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn share(&self, title: &str, text: &str, url: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn save(&self, file_name: &str, contents: &str) -> Result<PathBuf, ClientError>;
}

#[derive(Clone, Default)]
pub struct Capabilities {
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub share: Option<Arc<dyn ShareTarget>>,
    pub downloader: Option<Arc<dyn Downloader>>,
}

pub fn speech_locale(language: &str) -> &'static str {
    if language == "ru" { "ru-RU" } else { "en-US" }
}

/// Saves exported files into a fixed directory.
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Downloader for FileDownloader {
    async fn save(&self, file_name: &str, contents: &str) -> Result<PathBuf, ClientError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents).await?;
        info!("saved {} bytes to {}", contents.len(), path.display());
        Ok(path)
    }
}
