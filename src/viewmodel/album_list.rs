use crate::api::{CreateAlbumInput, GraphApi};
use crate::model::{Album, UserIdentity};
use crate::sync_error::{Result, SyncError};
use crate::utils::timestamp_now;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ListState {
    albums: Vec<Album>,
    loading: bool,
}

impl ListState {
    /// Insert an album unless one with the same id is already present.
    ///
    /// Both the initial load and subscription events funnel through here, so
    /// an album delivered by both paths (created between list and subscribe)
    /// lands exactly once, whichever side arrives first.
    fn merge(&mut self, album: Album) -> bool {
        if self.albums.iter().any(|existing| existing.id == album.id) {
            return false;
        }
        self.albums.push(album);
        true
    }
}

/// State behind the album overview: the user's albums, loaded once and kept
/// current by the album-creation subscription.
pub struct AlbumListViewModel {
    api: Arc<dyn GraphApi>,
    identity: UserIdentity,
    state: Arc<Mutex<ListState>>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AlbumListViewModel {
    pub fn new(api: Arc<dyn GraphApi>, identity: UserIdentity) -> AlbumListViewModel {
        AlbumListViewModel {
            api,
            identity,
            state: Arc::new(Mutex::new(ListState { albums: Vec::new(), loading: true })),
            token: CancellationToken::new(),
            task: None,
        }
    }

    /// Open the creation subscription, then run the one-shot list query.
    ///
    /// Subscribing first means nothing created after activation can be
    /// missed; the deduplicating merge keeps the overlap harmless whichever
    /// of the two resolves first.
    pub async fn activate(&mut self) -> Result<()> {
        if self.task.is_some() {
            debug!("album list already active");
            return Ok(());
        }

        let mut sub = self.api.on_create_album(&self.identity.username);
        let state = Arc::clone(&self.state);
        let token = self.token.clone();

        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        sub.cancel();
                        break;
                    }
                    event = sub.next() => match event {
                        Some(album) => {
                            if token.is_cancelled() {
                                break;
                            }
                            let mut state = state.lock().unwrap();
                            if state.merge(album) {
                                debug!("applied album-creation event");
                            }
                        }
                        None => break,
                    }
                }
            }
        }));

        let loaded = self.api.list_albums(&self.identity.username).await;
        let mut state = self.state.lock().unwrap();
        state.loading = false;
        match loaded {
            Ok(albums) => {
                for album in albums {
                    state.merge(album);
                }
                Ok(())
            }
            Err(err) => {
                warn!("album list load failed: {}", err);
                Err(err)
            }
        }
    }

    /// Create a new album with a client-generated timestamp.
    ///
    /// No optimistic insert: the self-subscription delivers the created
    /// record back, so local state converges through the same path as every
    /// other client. Callers clear their input on success.
    pub async fn create_album(&self, name: &str) -> Result<Album> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::InvalidInput("album name must not be empty".into()));
        }

        let input = CreateAlbumInput { name: name.to_owned(), created_at: timestamp_now() };
        let album = self.api.create_album(input, &self.identity.username).await.map_err(|err| {
            warn!("create album '{}' failed: {}", name, err);
            err
        })?;

        info!(album = %album.id, "created album '{}'", album.name);
        Ok(album)
    }

    /// Snapshot of the albums in arrival order. Presentation sorts by
    /// creation timestamp.
    pub fn albums(&self) -> Vec<Album> {
        self.state.lock().unwrap().albums.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().loading
    }

    /// Cancel the subscription. No state mutation happens afterwards.
    pub fn deactivate(&mut self) {
        self.token.cancel();
        self.task = None;
    }
}

impl Drop for AlbumListViewModel {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhotoPage;

    fn album(id: &str, created_at: &str) -> Album {
        Album {
            id: id.into(),
            name: format!("album {}", id),
            created_at: created_at.into(),
            owner: "ann".into(),
            photos: PhotoPage::default(),
        }
    }

    #[test]
    fn merge_appends_unknown_albums() {
        let mut state = ListState::default();
        assert!(state.merge(album("a", "1")));
        assert!(state.merge(album("b", "2")));
        assert_eq!(state.albums.len(), 2);
    }

    #[test]
    fn merge_drops_duplicates_by_id() {
        let mut state = ListState::default();
        assert!(state.merge(album("a", "1")));
        assert!(!state.merge(album("a", "1")));
        assert_eq!(state.albums.len(), 1);
    }

    #[test]
    fn merge_tolerates_events_before_the_load() {
        let mut state = ListState::default();
        // Subscription event lands while the list query is still in flight.
        assert!(state.merge(album("pushed", "9")));
        // Load resolves afterwards; the already-merged album stays put.
        assert!(state.merge(album("loaded", "1")));
        assert!(!state.merge(album("pushed", "9")));
        assert_eq!(state.albums.len(), 2);
    }
}
