use crate::models::JokeId;
use crate::storage::{FAVORITES_KEY, Storage};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

#[derive(Clone)]
pub struct FavoritesStore {
    storage: Arc<dyn Storage>,
    ids: Arc<Mutex<BTreeSet<JokeId>>>,
}

impl FavoritesStore {
    pub async fn load(storage: Arc<dyn Storage>) -> Self {
        let ids = match storage.get(FAVORITES_KEY).await {
            Some(raw) => match serde_json::from_str::<Vec<JokeId>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(err) => {
                    warn!("discarding unreadable favorites: {err}");
                    BTreeSet::new()
                }
            },
            None => BTreeSet::new(),
        };

        Self {
            storage,
            ids: Arc::new(Mutex::new(ids)),
        }
    }

    pub async fn toggle(&self, id: JokeId) -> FavoriteChange {
        let mut ids = self.ids.lock().await;
        let change = if ids.remove(&id) {
            FavoriteChange::Removed
        } else {
            ids.insert(id);
            FavoriteChange::Added
        };

        let payload = encode(&ids);
        if let Err(err) = self.storage.set(FAVORITES_KEY, &payload).await {
            error!("failed to persist favorites: {err}");
        }

        change
    }

    pub async fn is_favorite(&self, id: JokeId) -> bool {
        self.ids.lock().await.contains(&id)
    }

    pub async fn ids(&self) -> Vec<JokeId> {
        self.ids.lock().await.iter().copied().collect()
    }
}

fn encode(ids: &BTreeSet<JokeId>) -> String {
    let ids: Vec<JokeId> = ids.iter().copied().collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}
