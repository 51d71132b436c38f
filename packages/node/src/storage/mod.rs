//! Storage abstraction layer for the inventory node.
//!
//! The [`Storage`] trait defines the contract between the HTTP handler layer
//! and persistence. Handlers own the JSON:API shaping; storage only hands
//! out plain records and page windows.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests, conformance suite, ephemeral nodes |
//!
//! [`MemoryStorage`]: memory::MemoryStorage

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested item does not exist.
    #[error("not found")]
    NotFound,

    /// An item with the same key already exists (e.g. duplicate identifier).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A connected device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// UUIDv7, assigned on creation.
    pub id: String,
    /// Unique, human-chosen key.
    pub identifier: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub priority: Option<i64>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A measurement channel belonging to one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub device_id: String,
    pub identifier: String,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub step: Option<f64>,
    pub created_at: String,
}

/// Offset window over an ordered collection.
///
/// `limit: None` returns everything from `offset` on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Page {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// Slice `items` to this window.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let rest = items.iter().skip(self.offset);
        match self.limit {
            Some(limit) => rest.take(limit).cloned().collect(),
            None => rest.cloned().collect(),
        }
    }
}

/// One page of results plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Persistence contract for the inventory node.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// Tokio tasks via `Arc<dyn Storage>`. Listings are ordered by creation.
#[async_trait]
pub trait Storage: Send + Sync {
    // --- Devices -----------------------------------------------------------

    /// Persist a new device.
    ///
    /// Returns [`StorageError::Conflict`] if the id or identifier is taken.
    async fn put_device(&self, device: &Device) -> Result<(), StorageError>;

    async fn get_device(&self, id: &str) -> Result<Option<Device>, StorageError>;

    async fn list_devices(&self, page: Page) -> Result<Listing<Device>, StorageError>;

    // --- Channels ----------------------------------------------------------

    /// Persist a new channel.
    ///
    /// Returns [`StorageError::NotFound`] if the owning device is unknown and
    /// [`StorageError::Conflict`] if the identifier is already used on it.
    async fn put_channel(&self, channel: &Channel) -> Result<(), StorageError>;

    async fn get_channel(&self, id: &str) -> Result<Option<Channel>, StorageError>;

    async fn list_channels(&self, page: Page) -> Result<Listing<Channel>, StorageError>;

    /// Channels of one device, in creation order.
    async fn device_channels(
        &self,
        device_id: &str,
        page: Page,
    ) -> Result<Listing<Channel>, StorageError>;
}
