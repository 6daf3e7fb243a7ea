//! Real-time photo album synchronization.
//!
//! View-models load a user's albums and photos once, then keep them current
//! by merging creation events pushed over cancellable subscriptions. A
//! concurrent upload pipeline stores photo bytes in an object store, labels
//! them best effort, and persists the photo records that the subscriptions
//! then deliver back. The graph backend, object store, identity provider and
//! labeler are external collaborators behind trait seams.

pub mod api;
pub mod config;
pub mod file;
pub mod identity;
pub mod labeler;
pub mod memory;
pub mod model;
pub mod render;
pub mod s3_store;
pub mod store;
pub mod subscription;
pub mod sync_error;
pub mod upload;
pub mod utils;
pub mod viewmodel;

pub use api::GraphApi;
pub use model::{Album, Photo, UserIdentity};
pub use subscription::Subscription;
pub use sync_error::{Result, SyncError};
pub use viewmodel::{AlbumDetailViewModel, AlbumListViewModel};
