//! In-memory storage implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Use this for tests, the conformance suite, and ephemeral nodes.
//!
//! Records live in a [`BTreeMap`] keyed by UUIDv7 id. Because UUIDv7 ids sort
//! lexicographically in creation order, iterating the map yields listings in
//! creation order without a secondary index.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Channel, Device, Listing, Page, Storage, StorageError};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    devices: BTreeMap<String, Device>,
    channels: BTreeMap<String, Channel>,
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Thread-safe, in-memory implementation of [`Storage`].
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StorageError> {
        self.inner
            .read()
            .map_err(|_| StorageError::Internal("storage lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StorageError> {
        self.inner
            .write()
            .map_err(|_| StorageError::Internal("storage lock poisoned".into()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn listing<T: Clone>(all: Vec<T>, page: Page) -> Listing<T> {
    Listing {
        items: page.apply(&all),
        total: all.len() as u64,
    }
}

// ---------------------------------------------------------------------------
// Storage impl
// ---------------------------------------------------------------------------

#[async_trait]
impl Storage for MemoryStorage {
    // --- Devices -------------------------------------------------------------

    async fn put_device(&self, device: &Device) -> Result<(), StorageError> {
        let mut inner = self.write()?;
        if inner.devices.contains_key(&device.id) {
            return Err(StorageError::Conflict(format!(
                "device {} already exists",
                device.id
            )));
        }
        if inner
            .devices
            .values()
            .any(|d| d.identifier == device.identifier)
        {
            return Err(StorageError::Conflict(format!(
                "device identifier {} is already in use",
                device.identifier
            )));
        }
        inner.devices.insert(device.id.clone(), device.clone());
        Ok(())
    }

    async fn get_device(&self, id: &str) -> Result<Option<Device>, StorageError> {
        Ok(self.read()?.devices.get(id).cloned())
    }

    async fn list_devices(&self, page: Page) -> Result<Listing<Device>, StorageError> {
        let inner = self.read()?;
        Ok(listing(inner.devices.values().cloned().collect(), page))
    }

    // --- Channels ------------------------------------------------------------

    async fn put_channel(&self, channel: &Channel) -> Result<(), StorageError> {
        let mut inner = self.write()?;
        if !inner.devices.contains_key(&channel.device_id) {
            return Err(StorageError::NotFound);
        }
        if inner.channels.contains_key(&channel.id) {
            return Err(StorageError::Conflict(format!(
                "channel {} already exists",
                channel.id
            )));
        }
        if inner
            .channels
            .values()
            .any(|c| c.device_id == channel.device_id && c.identifier == channel.identifier)
        {
            return Err(StorageError::Conflict(format!(
                "channel identifier {} is already in use on device {}",
                channel.identifier, channel.device_id
            )));
        }
        inner.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn get_channel(&self, id: &str) -> Result<Option<Channel>, StorageError> {
        Ok(self.read()?.channels.get(id).cloned())
    }

    async fn list_channels(&self, page: Page) -> Result<Listing<Channel>, StorageError> {
        let inner = self.read()?;
        Ok(listing(inner.channels.values().cloned().collect(), page))
    }

    async fn device_channels(
        &self,
        device_id: &str,
        page: Page,
    ) -> Result<Listing<Channel>, StorageError> {
        let inner = self.read()?;
        let owned = inner
            .channels
            .values()
            .filter(|c| c.device_id == device_id)
            .cloned()
            .collect();
        Ok(listing(owned, page))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
