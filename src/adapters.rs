use async_trait::async_trait;

use crate::model;

pub mod mock;
pub mod s3;

// Missing keys: `fs_head_object` returns `Ok(None)`, get and copy return `FSError::NotFound`.
#[async_trait]
pub trait Object: Send + Sync {
    async fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FSError>;

    async fn fs_get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError>;

    async fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<model::fs::FSObject>, model::fs::FSError>;

    async fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError>;

    async fn fs_copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), model::fs::FSError>;

    async fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<model::fs::FSObjectPage, model::fs::FSError>;
}
