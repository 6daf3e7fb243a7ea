//! Pure presentation of view-model state: no I/O beyond resolving stored
//! objects to displayable URLs.

use crate::model::album::created_at_order;
use crate::model::{Album, Photo};
use crate::store::ObjectStore;
use crate::sync_error::Result;
use tracing::warn;

/// One line in the album overview.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRow {
    pub id: String,
    pub name: String,
}

/// One rendered photo: a displayable URL plus its caption.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRow {
    pub url: String,
    pub caption: String,
}

/// Album rows sorted by creation timestamp ascending, regardless of the
/// order loads and subscription events arrived in.
pub fn album_rows(albums: &[Album]) -> Vec<AlbumRow> {
    let mut sorted: Vec<&Album> = albums.iter().collect();
    sorted.sort_by(|a, b| created_at_order(&a.created_at, &b.created_at));
    sorted
        .into_iter()
        .map(|album| AlbumRow { id: album.id.clone(), name: album.name.clone() })
        .collect()
}

/// Photo rows in the album's current merge order. A photo whose object can no
/// longer be resolved is skipped with a warning rather than failing the view.
pub async fn photo_rows(store: &dyn ObjectStore, photos: &[Photo]) -> Result<Vec<PhotoRow>> {
    let mut rows = Vec::with_capacity(photos.len());
    for photo in photos {
        match store.resolve(&photo.bucket, &photo.name).await {
            Ok(url) => rows.push(PhotoRow { url, caption: photo.caption() }),
            Err(err) => warn!("could not resolve '{}': {}", photo.name, err),
        }
    }
    Ok(rows)
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
    fn rows_sort_by_creation_time_not_arrival() {
        let albums = vec![album("late", "2000"), album("early", "999"), album("mid", "1500")];
        let rows = album_rows(&albums);
        let ids: Vec<_> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["early", "mid", "late"]);
    }

    #[test]
    fn equal_timestamps_keep_arrival_order() {
        let albums = vec![album("first", "1000"), album("second", "1000")];
        let ids: Vec<_> = album_rows(&albums).into_iter().map(|row| row.id).collect();
        assert_eq!(ids, ["first", "second"]);
    }
}
