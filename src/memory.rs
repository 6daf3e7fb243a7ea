//! In-memory implementations of the external client seams.
//!
//! Backs the test suite and the CLI's session catalog: records live in a
//! mutex-guarded catalog and creation events fan out over a broadcast bus to
//! per-owner subscription forwarders.

use crate::api::{CreateAlbumInput, CreatePhotoInput, GraphApi};
use crate::identity::IdentityProvider;
use crate::labeler::PhotoLabeler;
use crate::model::{Album, Photo, PhotoPage, UserIdentity};
use crate::store::{ObjectStore, PutOptions};
use crate::subscription::Subscription;
use crate::sync_error::{Result, SyncError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

const EVENT_BUS_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
enum RecordEvent {
    Album(Album),
    Photo(Photo),
}

#[derive(Default)]
struct Catalog {
    albums: Vec<Album>,
}

/// Graph backend held entirely in memory.
#[derive(Clone)]
pub struct MemoryGraph {
    catalog: Arc<Mutex<Catalog>>,
    events: broadcast::Sender<RecordEvent>,
    page_size: usize,
}

impl MemoryGraph {
    pub fn new(page_size: usize) -> MemoryGraph {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        MemoryGraph { catalog: Arc::new(Mutex::new(Catalog::default())), events, page_size }
    }

    /// Forward matching creation events into a cancellable subscription.
    fn subscribe_filtered<T, F>(&self, filter: F) -> Subscription<T>
    where
        T: Send + 'static,
        F: Fn(RecordEvent) -> Option<T> + Send + 'static,
    {
        let mut bus = BroadcastStream::new(self.events.subscribe());
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let task_token = token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    event = bus.next() => match event {
                        Some(Ok(event)) => {
                            if let Some(item) = filter(event) {
                                if tx.send(item).is_err() {
                                    break;
                                }
                            }
                        }
                        Some(Err(BroadcastStreamRecvError::Lagged(missed))) => {
                            debug!(missed, "subscription lagged behind the event bus");
                        }
                        None => break,
                    },
                }
            }
        });

        Subscription::new(rx, token)
    }

    fn page(&self, photos: &[Photo], token: Option<&str>) -> Result<PhotoPage> {
        let offset = match token {
            Some(raw) => decode_token(raw)?,
            None => 0,
        };

        let end = (offset + self.page_size).min(photos.len());
        let items = photos.get(offset..end).unwrap_or_default().to_vec();
        let next_token =
            if end < photos.len() { Some(json::json!({ "offset": end }).to_string()) } else { None };

        Ok(PhotoPage { items, next_token })
    }
}

#[async_trait]
impl GraphApi for MemoryGraph {
    async fn list_albums(&self, owner: &str) -> Result<Vec<Album>> {
        let catalog = self.catalog.lock().unwrap();
        Ok(catalog
            .albums
            .iter()
            .filter(|album| album.owner == owner)
            .cloned()
            .map(|mut album| {
                // List queries return bare albums; photos load lazily.
                album.photos = PhotoPage::default();
                album
            })
            .collect())
    }

    async fn get_album(&self, id: &str, photo_token: Option<&str>) -> Result<Option<Album>> {
        let catalog = self.catalog.lock().unwrap();
        let album = match catalog.albums.iter().find(|album| album.id == id) {
            Some(album) => album,
            None => return Ok(None),
        };

        let mut loaded = album.clone();
        loaded.photos = self.page(&album.photos.items, photo_token)?;
        Ok(Some(loaded))
    }

    async fn create_album(&self, input: CreateAlbumInput, owner: &str) -> Result<Album> {
        let album = Album {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            created_at: input.created_at,
            owner: owner.to_owned(),
            photos: PhotoPage::default(),
        };

        self.catalog.lock().unwrap().albums.push(album.clone());
        let _ = self.events.send(RecordEvent::Album(album.clone()));
        Ok(album)
    }

    async fn create_photo(&self, input: CreatePhotoInput, owner: &str) -> Result<Photo> {
        let photo = Photo {
            id: Uuid::new_v4().to_string(),
            bucket: input.bucket,
            name: input.name,
            created_at: input.created_at,
            owner: owner.to_owned(),
            labels: input.labels,
            album_id: input.photo_album_id,
        };

        {
            let mut catalog = self.catalog.lock().unwrap();
            let album = catalog
                .albums
                .iter_mut()
                .find(|album| album.id == photo.album_id)
                .ok_or_else(|| SyncError::NotFound(format!("album {}", photo.album_id)))?;
            album.photos.items.push(photo.clone());
        }

        let _ = self.events.send(RecordEvent::Photo(photo.clone()));
        Ok(photo)
    }

    fn on_create_album(&self, owner: &str) -> Subscription<Album> {
        let owner = owner.to_owned();
        self.subscribe_filtered(move |event| match event {
            RecordEvent::Album(album) if album.owner == owner => Some(album),
            _ => None,
        })
    }

    fn on_create_photo(&self, owner: &str) -> Subscription<Photo> {
        let owner = owner.to_owned();
        self.subscribe_filtered(move |event| match event {
            RecordEvent::Photo(photo) if photo.owner == owner => Some(photo),
            _ => None,
        })
    }
}

/// Continuation tokens are opaque to callers; this backend encodes a plain
/// offset cursor.
fn decode_token(raw: &str) -> Result<usize> {
    let invalid = || SyncError::InvalidInput(format!("bad continuation token '{}'", raw));
    let value: json::Value = json::from_str(raw).map_err(|_| invalid())?;
    let offset = value.get("offset").and_then(json::Value::as_u64).ok_or_else(invalid)?;
    Ok(offset as usize)
}

#[derive(Clone)]
struct StoredObject {
    bytes: Bytes,
    #[allow(dead_code)]
    content_type: Option<String>,
    #[allow(dead_code)]
    metadata: HashMap<String, String>,
}

/// Object store held in memory, with injectable put failures for exercising
/// partial-batch behavior.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_marker: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Every subsequent put whose key contains `marker` fails.
    pub fn fail_when_key_contains(&self, marker: impl Into<String>) {
        *self.fail_marker.lock().unwrap() = Some(marker.into());
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object_len(&self, bucket: &str, key: &str) -> Option<usize> {
        let objects = self.objects.lock().unwrap();
        objects.get(&format!("{}/{}", bucket, key)).map(|obj| obj.bytes.len())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes, opts: PutOptions) -> Result<String> {
        if let Some(marker) = self.fail_marker.lock().unwrap().as_deref() {
            if key.contains(marker) {
                return Err(SyncError::Upload {
                    key: key.to_owned(),
                    reason: "injected failure".to_owned(),
                });
            }
        }

        let stored = StoredObject {
            bytes,
            content_type: opts.content_type,
            metadata: opts.metadata,
        };
        self.objects.lock().unwrap().insert(format!("{}/{}", bucket, key), stored);
        Ok(key.to_owned())
    }

    async fn resolve(&self, bucket: &str, key: &str) -> Result<String> {
        let objects = self.objects.lock().unwrap();
        if objects.contains_key(&format!("{}/{}", bucket, key)) {
            Ok(format!("memory://{}/{}", bucket, key))
        } else {
            Err(SyncError::NotFound(format!("object {}/{}", bucket, key)))
        }
    }
}

/// Identity provider returning a fixed user.
pub struct StaticIdentity(pub UserIdentity);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<UserIdentity> {
        Ok(self.0.clone())
    }
}

/// Labeler returning the same labels for every object.
pub struct StaticLabeler(pub Vec<String>);

#[async_trait]
impl PhotoLabeler for StaticLabeler {
    async fn analyze(&self, _bucket: &str, _key: &str) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Labeler that always fails; uploads must still persist without labels.
pub struct FailingLabeler;

#[async_trait]
impl PhotoLabeler for FailingLabeler {
    async fn analyze(&self, _bucket: &str, key: &str) -> Result<Vec<String>> {
        Err(SyncError::Labeling(format!("no analysis available for {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::timestamp_now;

    fn album_input(name: &str) -> CreateAlbumInput {
        CreateAlbumInput { name: name.to_owned(), created_at: timestamp_now() }
    }

    #[tokio::test]
    async fn list_albums_is_scoped_to_the_owner() {
        let graph = MemoryGraph::new(20);
        graph.create_album(album_input("mine"), "ann").await.unwrap();
        graph.create_album(album_input("theirs"), "bob").await.unwrap();

        let albums = graph.list_albums("ann").await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "mine");
    }

    #[tokio::test]
    async fn photo_pages_follow_the_continuation_token() {
        let graph = MemoryGraph::new(2);
        let album = graph.create_album(album_input("hike"), "ann").await.unwrap();
        for i in 0..5 {
            let input = CreatePhotoInput {
                bucket: "b".into(),
                name: format!("images/{}.jpg", i),
                created_at: timestamp_now(),
                labels: vec![],
                photo_album_id: album.id.clone(),
            };
            graph.create_photo(input, "ann").await.unwrap();
        }

        let first = graph.get_album(&album.id, None).await.unwrap().unwrap();
        assert_eq!(first.photos.items.len(), 2);
        let token = first.photos.next_token.unwrap();

        let second = graph.get_album(&album.id, Some(&token)).await.unwrap().unwrap();
        assert_eq!(second.photos.items.len(), 2);
        let token = second.photos.next_token.unwrap();

        let last = graph.get_album(&album.id, Some(&token)).await.unwrap().unwrap();
        assert_eq!(last.photos.items.len(), 1);
        assert!(last.photos.next_token.is_none());
    }

    #[tokio::test]
    async fn garbage_continuation_tokens_are_rejected() {
        let graph = MemoryGraph::new(2);
        let album = graph.create_album(album_input("hike"), "ann").await.unwrap();
        let result = graph.get_album(&album.id, Some("not a cursor")).await;
        assert!(matches!(result, Err(SyncError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn photo_for_unknown_album_is_rejected() {
        let graph = MemoryGraph::new(20);
        let input = CreatePhotoInput {
            bucket: "b".into(),
            name: "images/x.jpg".into(),
            created_at: timestamp_now(),
            labels: vec![],
            photo_album_id: "missing".into(),
        };
        assert!(matches!(graph.create_photo(input, "ann").await, Err(SyncError::NotFound(_))));
    }

    #[tokio::test]
    async fn subscriptions_only_see_their_owners_events() {
        let graph = MemoryGraph::new(20);
        let mut sub = graph.on_create_album("ann");

        graph.create_album(album_input("bobs"), "bob").await.unwrap();
        let mine = graph.create_album(album_input("anns"), "ann").await.unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event.id, mine.id);
    }
}
