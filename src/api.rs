use crate::model::{Album, Photo};
use crate::subscription::Subscription;
use crate::sync_error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Input for the CreateAlbum mutation. `created_at` is generated on the client
/// at the moment of the user action; the backend assigns the id and owner.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAlbumInput {
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Input for the CreatePhoto mutation. `name` is the object key already
/// uploaded to `bucket`; `photo_album_id` ties the record to its album.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePhotoInput {
    pub bucket: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(rename = "photoAlbumId")]
    pub photo_album_id: String,
}

/// Client for the managed graph backend.
///
/// One method per remote operation: queries (`list_albums`, `get_album`),
/// mutations (`create_album`, `create_photo`) and creation-event subscriptions
/// scoped to an owner. The backend is an external collaborator with a fixed
/// contract; this crate never owns its schema.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// All albums belonging to `owner`.
    async fn list_albums(&self, owner: &str) -> Result<Vec<Album>>;

    /// One album with a page of its photo collection. `photo_token` continues
    /// a previous page; `None` requests the first page. Returns `Ok(None)`
    /// when no album has that id.
    async fn get_album(&self, id: &str, photo_token: Option<&str>) -> Result<Option<Album>>;

    /// CreateAlbum mutation; returns the created record.
    async fn create_album(&self, input: CreateAlbumInput, owner: &str) -> Result<Album>;

    /// CreatePhoto mutation; returns the created record.
    async fn create_photo(&self, input: CreatePhotoInput, owner: &str) -> Result<Photo>;

    /// Stream of albums created by `owner`, including the caller's own
    /// mutations (self-subscription).
    fn on_create_album(&self, owner: &str) -> Subscription<Album>;

    /// Stream of photos created by `owner`, across all of their albums.
    fn on_create_photo(&self, owner: &str) -> Subscription<Photo>;
}
