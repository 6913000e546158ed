use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use super::Storage;

/// S3-backed storage: one object per note, key = `{prefix}/{id}`, inside a
/// configured bucket.
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn object_key(&self, note_id: &str) -> String {
        format!("{}/{}", self.prefix.trim_end_matches('/'), note_id)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn read(&self, note_id: &str) -> Result<String> {
        let key = self.object_key(note_id);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    tracing::info!("Note {} does not exist at s3://{}/{}", note_id, self.bucket, key);
                    return Ok(String::new());
                }
                tracing::error!("Failed to read note {} from S3: {}", note_id, service_err);
                return Err(service_err)
                    .with_context(|| format!("failed to read note {} from S3", note_id));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read note {} content", note_id))?;
        Ok(String::from_utf8_lossy(&data.into_bytes()).into_owned())
    }

    async fn write(&self, note_id: &str, content: &str) -> Result<()> {
        let key = self.object_key(note_id);
        if let Err(err) = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .send()
            .await
        {
            tracing::error!("Failed to write note {} to S3: {}", note_id, err);
            return Err(err).with_context(|| format!("failed to write note {} to S3", note_id));
        }
        tracing::debug!(
            "Note {} written to s3://{}/{} ({} bytes)",
            note_id,
            self.bucket,
            key,
            content.len()
        );
        Ok(())
    }

    async fn delete(&self, note_id: &str) -> Result<()> {
        // S3 DeleteObject already succeeds for missing keys, which matches the
        // idempotent-delete contract.
        let key = self.object_key(note_id);
        if let Err(err) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            tracing::error!("Failed to delete note {} from S3: {}", note_id, err);
            return Err(err).with_context(|| format!("failed to delete note {} from S3", note_id));
        }
        tracing::debug!("Note {} deleted from s3://{}/{}", note_id, self.bucket, key);
        Ok(())
    }
}
