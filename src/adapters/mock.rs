use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{adapters, credentials::StorageProvider, model};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub put: usize,
    pub get: usize,
    pub head: usize,
    pub delete: usize,
    pub copy: usize,
    pub list: usize,
}

impl MockCalls {
    pub fn total(&self) -> usize {
        self.put + self.get + self.head + self.delete + self.copy + self.list
    }
}

#[derive(Default)]
struct Counters {
    put: AtomicUsize,
    get: AtomicUsize,
    head: AtomicUsize,
    delete: AtomicUsize,
    copy: AtomicUsize,
    list: AtomicUsize,
}

#[derive(Clone)]
struct MockObject {
    body: Vec<u8>,
    modified_time: OffsetDateTime,
}

pub struct MockClient {
    objects: Mutex<BTreeMap<String, MockObject>>,
    page_size: usize,
    failing_key: Option<String>,
    counters: Counters,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
            failing_key: None,
            counters: Counters::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_failing_key(mut self, key: &str) -> Self {
        self.failing_key = Some(key.to_string());
        self
    }

    /// Seeds an object without counting it as a call.
    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .insert(
                key.to_string(),
                MockObject {
                    body: body.to_vec(),
                    modified_time: OffsetDateTime::now_utc(),
                },
            );
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .keys()
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> MockCalls {
        MockCalls {
            put: self.counters.put.load(Ordering::SeqCst),
            get: self.counters.get.load(Ordering::SeqCst),
            head: self.counters.head.load(Ordering::SeqCst),
            delete: self.counters.delete.load(Ordering::SeqCst),
            copy: self.counters.copy.load(Ordering::SeqCst),
            list: self.counters.list.load(Ordering::SeqCst),
        }
    }

    fn check_failing(&self, key: &str) -> Result<(), model::fs::FSError> {
        if self.failing_key.as_deref() == Some(key) {
            return Err(model::fs::FSError::Remote(Box::new(std::io::Error::other(
                format!("injected failure for: {}", key),
            ))));
        }

        Ok(())
    }
}

#[async_trait]
impl adapters::Object for MockClient {
    async fn fs_put_object(
        &self,
        _bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), model::fs::FSError> {
        self.counters.put.fetch_add(1, Ordering::SeqCst);
        self.insert(key, &body);

        Ok(())
    }

    async fn fs_get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        self.counters.get.fetch_add(1, Ordering::SeqCst);
        self.check_failing(key)?;

        let objects = self.objects.lock().expect("failed to acquire `objects` guard");
        match objects.get(key) {
            None => Err(model::fs::FSError::NotFound(key.to_string())),
            Some(o) => Ok(o.body.clone()),
        }
    }

    async fn fs_head_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> Result<Option<model::fs::FSObject>, model::fs::FSError> {
        self.counters.head.fetch_add(1, Ordering::SeqCst);
        self.check_failing(key)?;

        let objects = self.objects.lock().expect("failed to acquire `objects` guard");
        Ok(objects.get(key).map(|o| model::fs::FSObject {
            key: key.to_string(),
            size: o.body.len() as i64,
            modified_time: Some(o.modified_time),
            content_type: Some("application/octet-stream".to_string()),
            etag: Some(format!("\"{:x}\"", o.body.len())),
        }))
    }

    async fn fs_delete_object(&self, _bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        self.counters.delete.fetch_add(1, Ordering::SeqCst);

        self.objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .remove(key);

        Ok(())
    }

    async fn fs_copy_object(
        &self,
        _bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), model::fs::FSError> {
        self.counters.copy.fetch_add(1, Ordering::SeqCst);

        let mut objects = self.objects.lock().expect("failed to acquire `objects` guard");
        let source = match objects.get(source_key) {
            None => return Err(model::fs::FSError::NotFound(source_key.to_string())),
            Some(o) => o.clone(),
        };
        objects.insert(destination_key.to_string(), source);

        Ok(())
    }

    async fn fs_list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<model::fs::FSObjectPage, model::fs::FSError> {
        self.counters.list.fetch_add(1, Ordering::SeqCst);

        let limit = match max_keys {
            Some(max) if max > 0 => (max as usize).min(self.page_size),
            _ => self.page_size,
        };

        let objects = self.objects.lock().expect("failed to acquire `objects` guard");
        let mut matching = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| match &continuation_token {
                Some(token) => key.as_str() > token.as_str(),
                None => true,
            });

        let page: Vec<model::fs::FSObject> = matching
            .by_ref()
            .take(limit)
            .map(|(key, o)| model::fs::FSObject {
                key: key.clone(),
                size: o.body.len() as i64,
                modified_time: Some(o.modified_time),
                content_type: None,
                etag: None,
            })
            .collect();

        let next_continuation_token = if matching.next().is_some() {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(model::fs::FSObjectPage {
            objects: page,
            next_continuation_token,
        })
    }
}

pub struct MockProvider {
    pub client: MockClient,
    authenticated: bool,
    client_requests: AtomicUsize,
}

impl MockProvider {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            authenticated: true,
            client_requests: AtomicUsize::new(0),
        }
    }

    pub fn unauthenticated(client: MockClient) -> Self {
        Self {
            authenticated: false,
            ..Self::new(client)
        }
    }

    pub fn client_requests(&self) -> usize {
        self.client_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageProvider for MockProvider {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn storage_client(&self) -> Result<&dyn adapters::Object, model::fs::FSError> {
        self.client_requests.fetch_add(1, Ordering::SeqCst);

        if !self.authenticated {
            return Err(model::fs::FSError::NotAuthenticated(
                "mock provider is not authenticated".to_string(),
            ));
        }

        Ok(&self.client)
    }
}
