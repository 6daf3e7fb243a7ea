use crate::api::GraphApi;
use crate::model::{Album, Photo, UserIdentity};
use crate::sync_error::{Result, SyncError};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Default)]
struct DetailState {
    album: Option<Album>,
    loading: bool,
    /// Events that arrived while the get query was still in flight; replayed
    /// through the same filter once the album is loaded.
    pending: Vec<Photo>,
}

impl DetailState {
    /// Apply one photo-creation event.
    ///
    /// Only photos belonging to the displayed album are merged; everything
    /// else the user creates elsewhere is ignored. New photos are prepended,
    /// deduplicated by id against the loaded page.
    fn apply(&mut self, photo: Photo) {
        match self.album.as_mut() {
            Some(album) => {
                if photo.album_id != album.id {
                    return;
                }
                if album.photos.items.iter().any(|existing| existing.id == photo.id) {
                    return;
                }
                album.photos.items.insert(0, photo);
            }
            None => self.pending.push(photo),
        }
    }

    fn finish_load(&mut self, album: Album) {
        self.album = Some(album);
        self.loading = false;
        for photo in std::mem::take(&mut self.pending) {
            self.apply(photo);
        }
    }
}

/// State behind one album's detail view: the album record, its lazily paged
/// photo collection, and the photo-creation subscription keeping it current.
pub struct AlbumDetailViewModel {
    api: Arc<dyn GraphApi>,
    identity: UserIdentity,
    state: Arc<Mutex<DetailState>>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AlbumDetailViewModel {
    pub fn new(api: Arc<dyn GraphApi>, identity: UserIdentity) -> AlbumDetailViewModel {
        AlbumDetailViewModel {
            api,
            identity,
            state: Arc::new(Mutex::new(DetailState::default())),
            token: CancellationToken::new(),
            task: None,
        }
    }

    /// Display the album with the given id.
    ///
    /// The previous photo subscription is cancelled and its apply task joined
    /// before the new subscription opens, so no event from the old album can
    /// land after the switch. The subscription opens before the get query so
    /// photos created mid-load are buffered rather than lost.
    pub async fn show_album(&mut self, id: &str) -> Result<()> {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.token = CancellationToken::new();

        {
            let mut state = self.state.lock().unwrap();
            state.album = None;
            state.loading = true;
            state.pending.clear();
        }

        let mut sub = self.api.on_create_photo(&self.identity.username);
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
                        Some(photo) => {
                            if token.is_cancelled() {
                                break;
                            }
                            let mut state = state.lock().unwrap();
                            state.apply(photo);
                            debug!("applied photo-creation event");
                        }
                        None => break,
                    }
                }
            }
        }));

        let loaded = self.api.get_album(id, None).await;
        match loaded {
            Ok(Some(album)) => {
                self.state.lock().unwrap().finish_load(album);
                Ok(())
            }
            Ok(None) => {
                self.state.lock().unwrap().loading = false;
                self.token.cancel();
                Err(SyncError::NotFound(format!("album {}", id)))
            }
            Err(err) => {
                warn!("album {} load failed: {}", id, err);
                self.state.lock().unwrap().loading = false;
                self.token.cancel();
                Err(err)
            }
        }
    }

    /// Fetch the next photo page, appending it behind the photos already
    /// shown. Returns `false` when the collection is exhausted.
    pub async fn load_more_photos(&self) -> Result<bool> {
        let (id, token) = {
            let state = self.state.lock().unwrap();
            let album = state
                .album
                .as_ref()
                .ok_or_else(|| SyncError::InvalidInput("no album loaded".into()))?;
            match &album.photos.next_token {
                Some(token) => (album.id.clone(), token.clone()),
                None => return Ok(false),
            }
        };

        let fetched = self
            .api
            .get_album(&id, Some(&token))
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("album {}", id)))?;

        let mut state = self.state.lock().unwrap();
        if let Some(album) = state.album.as_mut() {
            // The view may have switched albums while the page was in flight.
            if album.id == id {
                for photo in fetched.photos.items {
                    if !album.photos.items.iter().any(|existing| existing.id == photo.id) {
                        album.photos.items.push(photo);
                    }
                }
                album.photos.next_token = fetched.photos.next_token;
            }
        }
        Ok(true)
    }

    /// Snapshot of the displayed album, photos in subscription-merge order.
    pub fn album(&self) -> Option<Album> {
        self.state.lock().unwrap().album.clone()
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

impl Drop for AlbumDetailViewModel {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhotoPage;

    fn album(id: &str) -> Album {
        Album {
            id: id.into(),
            name: format!("album {}", id),
            created_at: "1".into(),
            owner: "ann".into(),
            photos: PhotoPage::default(),
        }
    }

    fn photo(id: &str, album_id: &str) -> Photo {
        Photo {
            id: id.into(),
            bucket: "b".into(),
            name: format!("images/{}.jpg", id),
            created_at: "2".into(),
            owner: "ann".into(),
            labels: vec![],
            album_id: album_id.into(),
        }
    }

    #[test]
    fn events_are_prepended_to_the_loaded_album() {
        let mut state = DetailState::default();
        state.finish_load(album("a"));
        state.apply(photo("p1", "a"));
        state.apply(photo("p2", "a"));

        let items = &state.album.as_ref().unwrap().photos.items;
        assert_eq!(items[0].id, "p2");
        assert_eq!(items[1].id, "p1");
    }

    #[test]
    fn events_for_other_albums_are_ignored() {
        let mut state = DetailState::default();
        state.finish_load(album("a"));
        state.apply(photo("p1", "elsewhere"));
        assert!(state.album.as_ref().unwrap().photos.items.is_empty());
    }

    #[test]
    fn events_before_the_load_are_replayed_after_it() {
        let mut state = DetailState::default();
        state.apply(photo("early", "a"));
        state.apply(photo("stray", "other"));
        assert!(state.album.is_none());

        state.finish_load(album("a"));
        let items = &state.album.as_ref().unwrap().photos.items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "early");
    }

    #[test]
    fn duplicate_events_are_dropped() {
        let mut state = DetailState::default();
        let mut loaded = album("a");
        loaded.photos.items.push(photo("p1", "a"));
        state.finish_load(loaded);

        state.apply(photo("p1", "a"));
        assert_eq!(state.album.as_ref().unwrap().photos.items.len(), 1);
    }
}
