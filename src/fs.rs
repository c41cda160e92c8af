use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{info, instrument};

use crate::{
    credentials::StorageProvider,
    filesystem::{FileSystem, KeyStream, TreeOptions},
    model::fs::{FSError, FileStat, UnsupportedOperation},
    util::object,
};

// A directory exists when a zero-byte marker `dir/` exists or any key starts with `dir/`.
pub struct ObjectFS {
    provider: Arc<dyn StorageProvider>,
    bucket: String,
}

impl ObjectFS {
    pub fn new(provider: Arc<dyn StorageProvider>, bucket: &str) -> Self {
        Self {
            provider,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn unsupported<T>(&self, op: UnsupportedOperation) -> Result<T, FSError> {
        info!(operation = op.name(), "unsupported operation called");
        Err(FSError::Unsupported(op))
    }

    async fn has_children(&self, prefix: &str) -> Result<bool, FSError> {
        let client = self.provider.storage_client().await?;
        let page = client
            .fs_list_objects(&self.bucket, prefix, None, Some(1))
            .await?;

        Ok(!page.objects.is_empty())
    }
}

#[async_trait]
impl FileSystem for ObjectFS {
    #[instrument(skip(self, content), fields(context = "write", size = content.len()))]
    async fn write(&self, path: &str, content: Vec<u8>) -> Result<bool, FSError> {
        let key = object::to_object_key(path)?;
        info!(key = %key, "called");

        let client = self.provider.storage_client().await?;
        client.fs_put_object(&self.bucket, &key, content).await?;

        Ok(true)
    }

    #[instrument(skip(self), fields(context = "read"))]
    async fn read(&self, path: &str) -> Result<String, FSError> {
        let key = object::to_object_key(path)?;
        info!(key = %key, "called");

        let client = self.provider.storage_client().await?;
        let bytes = client.fs_get_object(&self.bucket, &key).await?;

        Ok(String::from_utf8(bytes)?)
    }

    #[instrument(skip(self), fields(context = "delete"))]
    async fn delete(&self, path: &str) -> Result<bool, FSError> {
        let key = object::to_object_key(path)?;
        info!(key = %key, "called");

        let client = self.provider.storage_client().await?;
        client.fs_delete_object(&self.bucket, &key).await?;

        Ok(true)
    }

    #[instrument(skip(self), fields(context = "exists"))]
    async fn exists(&self, path: &str) -> Result<bool, FSError> {
        let key = object::to_key(path)?;
        info!(key = %key, "called");

        if key.is_empty() {
            return Ok(false);
        }

        let client = self.provider.storage_client().await?;
        let head = client.fs_head_object(&self.bucket, &key).await?;

        Ok(head.is_some())
    }

    #[instrument(skip(self), fields(context = "stat"))]
    async fn stat(&self, path: &str) -> Result<FileStat, FSError> {
        let key = object::to_key(path)?;
        info!(key = %key, "called");

        // The root is always a directory, whatever the bucket holds.
        if key.is_empty() {
            return Ok(FileStat::directory(path));
        }

        let client = self.provider.storage_client().await?;
        if let Some(head) = client.fs_head_object(&self.bucket, &key).await? {
            return Ok(FileStat::file(path, head));
        }

        let prefix = object::to_directory_prefix(&key);
        if self.has_children(&prefix).await? {
            return Ok(FileStat::directory(path));
        }

        Err(FSError::NotFound(path.to_string()))
    }

    #[instrument(skip(self), fields(context = "copy"))]
    async fn copy(&self, source: &str, destination: &str) -> Result<bool, FSError> {
        let source_key = object::to_object_key(source)?;
        let destination_key = object::to_object_key(destination)?;
        info!(
            source_key = %source_key,
            destination_key = %destination_key,
            "called"
        );

        let client = self.provider.storage_client().await?;
        client
            .fs_copy_object(&self.bucket, &source_key, &destination_key)
            .await?;

        Ok(true)
    }

    #[instrument(skip(self), fields(context = "create_directory"))]
    async fn create_directory(&self, path: &str) -> Result<bool, FSError> {
        let key = object::to_key(path)?;
        info!(key = %key, "called");

        if key.is_empty() {
            return Ok(true);
        }

        let marker = object::to_directory_prefix(&key);
        match self.stat(&marker).await {
            Ok(stat) if stat.is_directory => return Ok(true),
            Ok(_) => (),
            Err(err) if err.is_not_found() => (),
            Err(err) => return Err(err),
        }

        let client = self.provider.storage_client().await?;
        client.fs_put_object(&self.bucket, &marker, Vec::new()).await?;

        Ok(true)
    }

    fn list_tree<'a>(&'a self, path: &str, options: TreeOptions) -> Result<KeyStream<'a>, FSError> {
        let prefix = object::to_directory_prefix(&object::to_key(path)?);
        info!(context = "list_tree", prefix = %prefix, recursive = options.recursive, "called");

        let ignore = options.ignore;
        let stream = async_stream::try_stream! {
            let client = self.provider.storage_client().await?;
            let mut continuation_token: Option<String> = None;

            loop {
                let page = client
                    .fs_list_objects(&self.bucket, &prefix, continuation_token.take(), None)
                    .await?;

                for o in page.objects {
                    if o.key == prefix && o.key.ends_with('/') {
                        continue;
                    }

                    let ignored = match &ignore {
                        Some(ignore) => ignore(o.key.as_str()),
                        None => self.should_ignore(&o.key),
                    };
                    if !ignored {
                        yield o.key;
                    }
                }

                continuation_token = page.next_continuation_token;
                if continuation_token.is_none() {
                    break;
                }
            }
        };

        Ok(stream.boxed())
    }

    async fn chown(&self, _path: &str, _uid: u32, _gid: u32) -> Result<(), FSError> {
        self.unsupported(UnsupportedOperation::Chown)
    }

    async fn chmod(&self, _path: &str, _mode: u32) -> Result<(), FSError> {
        self.unsupported(UnsupportedOperation::Chmod)
    }

    async fn rename(&self, _source: &str, _destination: &str) -> Result<bool, FSError> {
        self.unsupported(UnsupportedOperation::Rename)
    }

    async fn watch(&self, _path: &str) -> Result<KeyStream<'static>, FSError> {
        self.unsupported(UnsupportedOperation::Watch)
    }

    async fn execute_command(&self, _command: &str, _cwd: Option<&str>) -> Result<String, FSError> {
        self.unsupported(UnsupportedOperation::ExecuteCommand)
    }

    async fn borrow_file(&self, _path: &str) -> Result<Vec<u8>, FSError> {
        self.unsupported(UnsupportedOperation::BorrowFile)
    }

    async fn glob(&self, _pattern: &str) -> Result<Vec<String>, FSError> {
        self.unsupported(UnsupportedOperation::Glob)
    }

    async fn grep(&self, _pattern: &str, _path: &str) -> Result<Vec<String>, FSError> {
        self.unsupported(UnsupportedOperation::Grep)
    }
}
