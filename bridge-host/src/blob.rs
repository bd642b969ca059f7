//! In-memory binary resource handles.
//!
//! A successful sandbox fetch yields raw bytes that UI code expects to
//! reference by URL. The blob store keeps those bytes in memory under a
//! `blob:<uuid>` address that substitutes for the original URL. The store
//! does not track handle lifetime - whoever resolved the resource releases
//! it when done.

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

/// One stored payload plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Bytes,
    pub media_type: String,
}

/// Registry of locally addressable binary handles.
#[derive(Default)]
pub struct BlobStore {
    entries: Mutex<HashMap<Uuid, Blob>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload and return its `blob:<uuid>` address.
    pub fn insert(&self, data: Bytes, media_type: impl Into<String>) -> String {
        let id = Uuid::new_v4();
        let media_type = media_type.into();
        debug!(%id, media_type = %media_type, len = data.len(), "Allocating blob handle");
        self.entries
            .lock()
            .expect("blob table poisoned")
            .insert(id, Blob { data, media_type });
        format!("blob:{id}")
    }

    /// Dereference an address. Cheap - blob payloads are reference-counted.
    pub fn get(&self, address: &str) -> Option<Blob> {
        let id = Self::parse_address(address)?;
        self.entries
            .lock()
            .expect("blob table poisoned")
            .get(&id)
            .cloned()
    }

    /// Release a handle. Returns whether anything was stored under it.
    pub fn release(&self, address: &str) -> bool {
        let Some(id) = Self::parse_address(address) else {
            return false;
        };
        self.entries
            .lock()
            .expect("blob table poisoned")
            .remove(&id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("blob table poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parse_address(address: &str) -> Option<Uuid> {
        address
            .strip_prefix("blob:")
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}
