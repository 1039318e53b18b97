use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_types::region::Region;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::TeardownError;

use super::ObjectStore;

pub struct S3Store {
    region: Option<String>,
    inner: OnceCell<aws_sdk_s3::Client>,
}

impl S3Store {
    /// Client from the ambient AWS configuration (env, profile, IMDS).
    ///
    /// `region` wins over the ambient region when the backend URL names one.
    /// Nothing is loaded until the first request.
    pub fn new(region: Option<&str>) -> Self {
        Self {
            region: region.map(str::to_string),
            inner: OnceCell::new(),
        }
    }

    async fn client(&self) -> &aws_sdk_s3::Client {
        self.inner
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = &self.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                debug!("Loading AWS configuration");
                aws_sdk_s3::Client::new(&loader.load().await)
            })
            .await
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, TeardownError> {
        debug!("ListObjectsV2 s3://{}/{}", bucket, prefix);

        let mut pages = self
            .client()
            .await
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|error| TeardownError::Storage {
                operation: "ListObjectsV2",
                bucket: bucket.to_string(),
                key: prefix.to_string(),
                message: DisplayErrorContext(&error).to_string(),
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        debug!("Found {} object(s) under s3://{}/{}", keys.len(), bucket, prefix);
        Ok(keys)
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), TeardownError> {
        debug!("DeleteObject s3://{}/{}", bucket, key);

        self.client()
            .await
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| TeardownError::Storage {
                operation: "DeleteObject",
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&error).to_string(),
            })?;
        Ok(())
    }
}
