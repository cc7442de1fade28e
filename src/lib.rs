pub mod app;
pub mod auto_refresh;
pub mod capabilities;
pub mod config;
pub mod errors;
pub mod favorites;
pub mod models;
pub mod notifications;
pub mod panels;
pub mod remote;
pub mod render;
pub mod storage;
pub mod ui;
pub mod view;

pub use app::{AppSettings, Command, JokeApp, UiSnapshot};
pub use config::Config;
pub use errors::ClientError;
pub use remote::{HttpJokeClient, JokeApi};
pub use storage::{FileStorage, MemoryStorage, Storage};
