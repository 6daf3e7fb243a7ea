use crate::store::{ObjectStore, PutOptions};
use crate::sync_error::{Result, SyncError};
use async_trait::async_trait;
use bytes::Bytes;
use rusoto_core::{Client, HttpClient, Region};
use rusoto_credential::{EnvironmentProvider, ProvideAwsCredentials};
use rusoto_s3::util::{PreSignedRequest, PreSignedRequestOption};
use rusoto_s3::{GetObjectRequest, PutObjectRequest, S3Client, StreamingBody, S3};
use tracing::debug;

/// S3-backed object store. Credentials come from the environment, the same way
/// the original deployment configured its storage client.
#[derive(Clone)]
pub struct StoreClient {
    inner: S3Client,
    region: Region,
}

impl StoreClient {
    pub fn new(region: Region) -> Result<StoreClient> {
        let dispatcher = HttpClient::new().map_err(SyncError::network)?;

        let client = Client::new_with(EnvironmentProvider::default(), dispatcher);
        let inner = S3Client::new_with_client(client, region.clone());

        Ok(StoreClient { inner, region })
    }
}

#[async_trait]
impl ObjectStore for StoreClient {
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes, opts: PutOptions) -> Result<String> {
        let req = PutObjectRequest {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            body: Some(StreamingBody::from(bytes.to_vec())),
            content_type: opts.content_type,
            metadata: if opts.metadata.is_empty() { None } else { Some(opts.metadata) },
            ..Default::default()
        };

        self.inner
            .put_object(req)
            .await
            .map_err(|err| SyncError::Upload { key: key.to_owned(), reason: err.to_string() })?;

        debug!(key, "stored object");
        Ok(key.to_owned())
    }

    async fn resolve(&self, bucket: &str, key: &str) -> Result<String> {
        let credentials = EnvironmentProvider::default()
            .credentials()
            .await
            .map_err(|err| SyncError::Auth(err.to_string()))?;

        let req = GetObjectRequest {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            ..GetObjectRequest::default()
        };

        Ok(req.get_presigned_url(&self.region, &credentials, &PreSignedRequestOption::default()))
    }
}
