use crate::sync_error::Result;
use crate::upload::UploadRequest;
use bytes::Bytes;
use std::path::Path;
use tracing::debug;

/// Image extensions admitted for upload, with their declared content types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

fn content_type_for(extension: &str) -> Option<&'static str> {
    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| extension.eq_ignore_ascii_case(ext))
        .map(|(_, mime)| *mime)
}

/// Read every image file in `folder` into an upload request. Non-image
/// entries are skipped, not errors.
pub async fn load_upload_requests(folder: &str) -> Result<Vec<UploadRequest>> {
    let mut dir = tokio::fs::read_dir(folder).await?;
    let mut requests = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if !entry.metadata().await?.is_file() {
            continue;
        }

        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for);

        match content_type {
            Some(content_type) => {
                let bytes = tokio::fs::read(&path).await?;
                requests.push(UploadRequest {
                    file_name: file_name_of(&path),
                    content_type: content_type.to_owned(),
                    bytes: Bytes::from(bytes),
                });
            }
            None => debug!("{:?} is not an image", path),
        }
    }

    Ok(requests)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
