use serde::{Deserialize, Serialize};

/// A single uploaded image belonging to exactly one album.
///
/// `name` is the object key within `bucket`; the displayable URL is resolved
/// through the object store, never stored on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub bucket: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub owner: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "albumId")]
    pub album_id: String,
}

impl Photo {
    /// Caption shown under the image: derived labels joined by single spaces,
    /// empty when analysis produced none.
    pub fn caption(&self) -> String {
        self.labels.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_with_labels(labels: Vec<String>) -> Photo {
        Photo {
            id: "p1".into(),
            bucket: "bucket".into(),
            name: "images/p1.jpg".into(),
            created_at: "1000".into(),
            owner: "ann".into(),
            labels,
            album_id: "a1".into(),
        }
    }

    #[test]
    fn caption_joins_labels_with_spaces() {
        let photo = photo_with_labels(vec!["cat".into(), "outdoor".into()]);
        assert_eq!(photo.caption(), "cat outdoor");
    }

    #[test]
    fn caption_is_empty_without_labels() {
        assert_eq!(photo_with_labels(vec![]).caption(), "");
    }

    #[test]
    fn records_use_the_backend_field_names() {
        let value = json::to_value(photo_with_labels(vec!["cat".into()])).unwrap();
        assert_eq!(value["createdAt"], "1000");
        assert_eq!(value["albumId"], "a1");
        assert_eq!(value["name"], "images/p1.jpg");
    }
}
