use crate::sync_error::{Result, SyncError};
use async_trait::async_trait;
use rusoto_core::{Client, HttpClient, Region};
use rusoto_credential::EnvironmentProvider;
use rusoto_rekognition::{DetectLabelsRequest, Image, Rekognition, RekognitionClient, S3Object};
use tracing::debug;

/// External image analysis. Best effort: callers log failures and persist the
/// photo without labels rather than failing the upload.
#[async_trait]
pub trait PhotoLabeler: Send + Sync {
    /// Text labels for an already-stored object.
    async fn analyze(&self, bucket: &str, key: &str) -> Result<Vec<String>>;
}

const MIN_CONFIDENCE: f32 = 75.0;
const MAX_LABELS: i64 = 10;

/// Rekognition-backed labeler reading the object straight from the bucket.
pub struct RekognitionLabeler {
    inner: RekognitionClient,
}

impl RekognitionLabeler {
    pub fn new(region: Region) -> Result<RekognitionLabeler> {
        let dispatcher = HttpClient::new().map_err(SyncError::network)?;
        let client = Client::new_with(EnvironmentProvider::default(), dispatcher);

        Ok(RekognitionLabeler { inner: RekognitionClient::new_with_client(client, region) })
    }
}

#[async_trait]
impl PhotoLabeler for RekognitionLabeler {
    async fn analyze(&self, bucket: &str, key: &str) -> Result<Vec<String>> {
        let req = DetectLabelsRequest {
            image: Image {
                s3_object: Some(S3Object {
                    bucket: Some(bucket.to_owned()),
                    name: Some(key.to_owned()),
                    ..S3Object::default()
                }),
                ..Image::default()
            },
            max_labels: Some(MAX_LABELS),
            min_confidence: Some(MIN_CONFIDENCE),
            ..DetectLabelsRequest::default()
        };

        let res = self
            .inner
            .detect_labels(req)
            .await
            .map_err(|err| SyncError::Labeling(err.to_string()))?;

        let labels: Vec<String> = res
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| label.name)
            .collect();

        debug!(key, count = labels.len(), "labeled object");
        Ok(labels)
    }
}
