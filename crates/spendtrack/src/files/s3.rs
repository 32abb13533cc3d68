use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;
use spendtrack_core::auth::UserId;
use spendtrack_core::files::{
    content_type_for, object_key, FileStorage, FileStorageError, Result, StoredFile,
};
use uuid::Uuid;

/// Stores receipts in an S3 bucket and hands out public object URLs.
pub struct S3FileStorage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3FileStorage {
    pub fn new(client: Client, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    pub fn from_sdk_config(
        sdk_config: &aws_config::SdkConfig,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let region = region.into();
        let conf = aws_sdk_s3::config::Builder::from(sdk_config)
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .build();
        Self::new(Client::from_conf(conf), bucket, region)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn map_put_object_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutObjectError, R>,
) -> FileStorageError {
    match err {
        SdkError::DispatchFailure(e) => {
            FileStorageError::ConnectionFailed(format!("S3 unreachable: {e:?}"))
        }
        SdkError::TimeoutError(_) => {
            FileStorageError::ConnectionFailed("S3 request timed out".to_string())
        }
        err => FileStorageError::UploadFailed(DisplayErrorContext(&err).to_string()),
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn upload(&self, user_id: &UserId, filename: &str, data: Vec<u8>) -> Result<StoredFile> {
        let key = object_key(user_id, filename, Utc::now(), Uuid::new_v4());
        let content_type = content_type_for(filename);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let err = map_put_object_error(e);
                tracing::error!(bucket = %self.bucket, %key, error = %err, "S3 upload failed");
                err
            })?;

        let url = self.url_for(&key);
        tracing::info!(%user_id, bucket = %self.bucket, %key, size, "Uploaded receipt to S3");

        Ok(StoredFile {
            key,
            url,
            content_type: content_type.to_string(),
            size,
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }
}
