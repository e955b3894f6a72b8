#![doc = "S3 implementation of the core object store contract."]
//
//! # Object Store Client (CLI <-> Core)
//!
//! This module wires the [`ObjectStore`] trait from `s3-delivery-core` to the
//! AWS S3 SDK. [`S3Client`] is bound to one bucket and region and uses the
//! static credentials read from `S3.ini`.
//!
//! Construction is pure: the SDK client is configured in memory and no request
//! is made until the first put.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials as AwsCredentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use s3_delivery_core::contract::{ObjectStore, StoreError};
use std::path::Path;

use crate::load_config::Credentials;

pub const S3_BUCKET_NAME: &str = "symphony-client-shared-atlanta-ga";
pub const S3_REGION: &str = "us-east-1";

pub struct S3Client {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Client for the delivery bucket.
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_target(credentials, S3_BUCKET_NAME, S3_REGION)
    }

    pub fn with_target(credentials: &Credentials, bucket: &str, region: &str) -> Self {
        let provider = AwsCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "s3-ini",
        );
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(provider)
            .build();
        tracing::debug!(bucket, region, "Initialized S3 client");
        S3Client {
            client: aws_sdk_s3::Client::from_conf(conf),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> String {
        self.bucket.clone()
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<(), StoreError> {
        tracing::debug!(bucket = %self.bucket, key, path = %path.display(), "put_object from file");
        let body = ByteStream::from_path(path).await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    async fn put_bytes(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        tracing::debug!(bucket = %self.bucket, key, bytes = body.len(), "put_object from buffer");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("text/csv")
            .body(ByteStream::from(body))
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn construction_binds_fixed_bucket() {
        let creds = Credentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "secret".into(),
        };
        let client = S3Client::new(&creds);
        assert_eq!(client.bucket(), S3_BUCKET_NAME);
    }
}
