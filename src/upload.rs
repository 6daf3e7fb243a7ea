use crate::api::{CreatePhotoInput, GraphApi};
use crate::labeler::PhotoLabeler;
use crate::model::{Photo, UserIdentity};
use crate::store::{ObjectStore, PutOptions};
use crate::utils::timestamp_now;
use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// One file handed to the uploader: declared name, content type and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Where a single file's pipeline ended up.
///
/// Upload, labeling and persistence run strictly in that order per file;
/// `UploadFailed` and `PersistFailed` are terminal, a labeling failure falls
/// back to persisting without labels.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadPhase {
    Pending,
    Uploading,
    UploadFailed(String),
    Uploaded,
    Labeling,
    Labeled,
    Persisting,
    PersistFailed(String),
    Persisted,
}

/// Outcome of one file's upload pipeline.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file_name: String,
    /// Derived object key; `None` only if key derivation never ran.
    pub key: Option<String>,
    pub phase: UploadPhase,
    /// The persisted record, present exactly when `phase` is `Persisted`.
    pub photo: Option<Photo>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.phase == UploadPhase::Persisted
    }
}

/// Uploads batches of photos into an album: store the bytes, label them best
/// effort, then persist the photo record.
pub struct PhotoUploader {
    api: Arc<dyn GraphApi>,
    store: Arc<dyn ObjectStore>,
    labeler: Option<Arc<dyn PhotoLabeler>>,
    bucket: String,
    identity: UserIdentity,
}

impl PhotoUploader {
    pub fn new(
        api: Arc<dyn GraphApi>,
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        identity: UserIdentity,
    ) -> PhotoUploader {
        PhotoUploader { api, store, labeler: None, bucket: bucket.into(), identity }
    }

    pub fn with_labeler(mut self, labeler: Arc<dyn PhotoLabeler>) -> PhotoUploader {
        self.labeler = Some(labeler);
        self
    }

    /// Upload all files concurrently. One file's failure neither cancels nor
    /// delays the others; the batch completes when every per-file pipeline
    /// has reached a terminal phase.
    pub async fn upload_all(&self, album_id: &str, files: Vec<UploadRequest>) -> Vec<FileOutcome> {
        self.upload_all_with(album_id, files, |_| {}).await
    }

    /// Like [`upload_all`](PhotoUploader::upload_all), invoking `on_done` as
    /// each file reaches its terminal phase (completion order, not input
    /// order).
    pub async fn upload_all_with<F>(
        &self,
        album_id: &str,
        files: Vec<UploadRequest>,
        on_done: F,
    ) -> Vec<FileOutcome>
    where
        F: Fn(&FileOutcome),
    {
        let mut pipelines: FuturesUnordered<_> = files
            .into_iter()
            .map(|request| self.upload_one(album_id, request))
            .collect();

        let mut outcomes = Vec::new();
        while let Some(outcome) = pipelines.next().await {
            on_done(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// One file's pipeline: upload, label, persist. Strictly sequential.
    async fn upload_one(&self, album_id: &str, request: UploadRequest) -> FileOutcome {
        let mut outcome = FileOutcome {
            file_name: request.file_name.clone(),
            key: None,
            phase: UploadPhase::Pending,
            photo: None,
        };

        let key = derive_key(album_id, &request.file_name);
        outcome.key = Some(key.clone());

        outcome.phase = UploadPhase::Uploading;
        let opts = PutOptions::content_type(request.content_type)
            .with_metadata("owner", &self.identity.username)
            .with_metadata("albumId", album_id);
        if let Err(err) = self.store.put(&self.bucket, &key, request.bytes, opts).await {
            warn!("upload of '{}' failed: {}", request.file_name, err);
            outcome.phase = UploadPhase::UploadFailed(err.to_string());
            return outcome;
        }
        outcome.phase = UploadPhase::Uploaded;
        debug!(key = %key, "uploaded '{}'", request.file_name);

        let labels = match &self.labeler {
            Some(labeler) => {
                outcome.phase = UploadPhase::Labeling;
                match labeler.analyze(&self.bucket, &key).await {
                    Ok(labels) => {
                        outcome.phase = UploadPhase::Labeled;
                        labels
                    }
                    Err(err) => {
                        // Best effort: persist without labels.
                        warn!("labeling of '{}' failed: {}", key, err);
                        outcome.phase = UploadPhase::Uploaded;
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        outcome.phase = UploadPhase::Persisting;
        let input = CreatePhotoInput {
            bucket: self.bucket.clone(),
            name: key,
            created_at: timestamp_now(),
            labels,
            photo_album_id: album_id.to_owned(),
        };
        match self.api.create_photo(input, &self.identity.username).await {
            Ok(photo) => {
                outcome.phase = UploadPhase::Persisted;
                outcome.photo = Some(photo);
            }
            Err(err) => {
                warn!("persisting '{}' failed: {}", request.file_name, err);
                outcome.phase = UploadPhase::PersistFailed(err.to_string());
            }
        }
        outcome
    }
}

/// Globally unique object key: random identifier + album id + the file's
/// extension, under the `images/` prefix.
fn derive_key(album_id: &str, file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, extension)) => {
            format!("images/{}{}.{}", Uuid::new_v4(), album_id, extension.to_lowercase())
        }
        None => format!("images/{}{}", Uuid::new_v4(), album_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CreateAlbumInput;
    use crate::memory::{FailingLabeler, MemoryGraph, MemoryStore, StaticLabeler};
    use crate::model::Album;

    fn request(name: &str) -> UploadRequest {
        UploadRequest {
            file_name: name.to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: Bytes::from_static(b"pixels"),
        }
    }

    async fn graph_with_album() -> (MemoryGraph, Album) {
        let graph = MemoryGraph::new(20);
        let input = CreateAlbumInput { name: "hike".into(), created_at: timestamp_now() };
        let album = graph.create_album(input, "ann").await.unwrap();
        (graph, album)
    }

    fn uploader(graph: &MemoryGraph, store: &MemoryStore) -> PhotoUploader {
        PhotoUploader::new(
            Arc::new(graph.clone()),
            Arc::new(store.clone()),
            "bucket",
            UserIdentity::new("ann"),
        )
    }

    #[test]
    fn keys_carry_prefix_album_and_extension() {
        let key = derive_key("alb-1", "holiday.JPG");
        assert!(key.starts_with("images/"));
        assert!(key.contains("alb-1"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn keys_are_unique_per_upload() {
        assert_ne!(derive_key("a", "x.jpg"), derive_key("a", "x.jpg"));
    }

    #[tokio::test]
    async fn a_batch_with_one_failure_persists_the_rest() {
        let (graph, album) = graph_with_album().await;
        let store = MemoryStore::new();
        store.fail_when_key_contains(".fail");

        let files = vec![request("one.jpg"), request("broken.fail"), request("two.png")];
        let outcomes = uploader(&graph, &store).upload_all(&album.id, files).await;

        let persisted: Vec<_> = outcomes.iter().filter(|o| o.succeeded()).collect();
        assert_eq!(persisted.len(), 2);

        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| matches!(o.phase, UploadPhase::UploadFailed(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].file_name, "broken.fail");
        assert!(failed[0].photo.is_none());

        // Exactly the two successful records, nothing for the failed file.
        let loaded = graph.get_album(&album.id, None).await.unwrap().unwrap();
        assert_eq!(loaded.photos.items.len(), 2);
        assert_eq!(store.object_count(), 2);
    }

    #[tokio::test]
    async fn labels_are_attached_to_the_persisted_record() {
        let (graph, album) = graph_with_album().await;
        let store = MemoryStore::new();
        let labeler = Arc::new(StaticLabeler(vec!["cat".into(), "outdoor".into()]));

        let outcomes = uploader(&graph, &store)
            .with_labeler(labeler)
            .upload_all(&album.id, vec![request("cat.jpg")])
            .await;

        let photo = outcomes[0].photo.as_ref().unwrap();
        assert_eq!(photo.caption(), "cat outdoor");
    }

    #[tokio::test]
    async fn labeling_failure_still_persists_without_labels() {
        let (graph, album) = graph_with_album().await;
        let store = MemoryStore::new();

        let outcomes = uploader(&graph, &store)
            .with_labeler(Arc::new(FailingLabeler))
            .upload_all(&album.id, vec![request("one.jpg")])
            .await;

        assert!(outcomes[0].succeeded());
        assert!(outcomes[0].photo.as_ref().unwrap().labels.is_empty());
    }

    #[tokio::test]
    async fn upload_attaches_content_and_metadata() {
        let (graph, album) = graph_with_album().await;
        let store = MemoryStore::new();

        let outcomes = uploader(&graph, &store).upload_all(&album.id, vec![request("one.jpg")]).await;
        let key = outcomes[0].key.as_ref().unwrap();
        assert_eq!(store.object_len("bucket", key), Some("pixels".len()));
    }
}
