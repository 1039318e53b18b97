mod s3;

use async_trait::async_trait;

use crate::error::TeardownError;

pub use s3::S3Store;

/// The slice of an object store the teardown needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key under `prefix`, across all result pages.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, TeardownError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), TeardownError>;
}
