//! In-memory stores for tests
//!
//! Each store records how many writes it received so tests can assert that a
//! rejected request never reached persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{Error, Result};
use crate::models::{Connection, Group, Image};
use crate::storage::ObjectStore;
use crate::store::{ConnectionStore, GroupStore, ImageStore};

/// Groups keyed by id
#[derive(Default)]
pub struct MemoryGroupStore {
    groups: Mutex<HashMap<String, Group>>,
    writes: AtomicUsize,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing groups (seeding is not counted as writes)
    pub fn with_groups(groups: impl IntoIterator<Item = Group>) -> Self {
        let store = Self::new();
        {
            let mut map = store.groups.lock().unwrap();
            for group in groups {
                map.insert(group.id.clone(), group);
            }
        }
        store
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.lock().unwrap().values().cloned().collect())
    }

    async fn put_group(&self, group: &Group) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.groups
            .lock()
            .unwrap()
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn group_exists(&self, group_id: &str) -> Result<bool> {
        Ok(self.groups.lock().unwrap().contains_key(group_id))
    }
}

/// Images keyed by (group_id, timestamp)
#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<BTreeMap<(String, String), Image>>,
    writes: AtomicUsize,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put_image(&self, image: &Image) -> Result<()> {
        let key = (image.group_id.clone(), image.timestamp.clone());
        let mut images = self.images.lock().unwrap();
        if images.contains_key(&key) {
            return Err(Error::ImageAlreadyExists(format!("{}@{}", key.0, key.1)));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        images.insert(key, image.clone());
        Ok(())
    }

    async fn images_for_group(&self, group_id: &str) -> Result<Vec<Image>> {
        let images = self.images.lock().unwrap();
        Ok(images
            .iter()
            .rev()
            .filter(|((group, _), _)| group == group_id)
            .map(|(_, image)| image.clone())
            .collect())
    }

    async fn get_image(&self, image_id: &str) -> Result<Option<Image>> {
        let images = self.images.lock().unwrap();
        Ok(images.values().find(|i| i.image_id == image_id).cloned())
    }
}

/// Connections keyed by id
#[derive(Default)]
pub struct MemoryConnectionStore {
    connections: Mutex<HashMap<String, Connection>>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn put_connection(&self, connection: &Connection) -> Result<()> {
        self.connections
            .lock()
            .unwrap()
            .insert(connection.id.clone(), connection.clone());
        Ok(())
    }

    async fn delete_connection(&self, connection_id: &str) -> Result<()> {
        self.connections.lock().unwrap().remove(connection_id);
        Ok(())
    }

    async fn get_connection(&self, connection_id: &str) -> Result<Option<Connection>> {
        Ok(self.connections.lock().unwrap().get(connection_id).cloned())
    }

    async fn list_connections(&self) -> Result<Vec<Connection>> {
        Ok(self.connections.lock().unwrap().values().cloned().collect())
    }
}

/// A stored object and its content type
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Objects keyed by (bucket, key). Pre-signed URLs mimic the S3 query
/// string shape without any real signature.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an object directly, as a client upload would
    pub fn insert(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: None,
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.object(bucket, key)
            .map(|o| o.body)
            .ok_or_else(|| Error::Storage(format!("NoSuchKey: {}/{}", bucket, key)))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }

    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Expires={}&X-Amz-Signature=test",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
