use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use super::{KeyedStore, StoreKey};
use crate::error::StoreError;

/// Accessibility policy applied to every item written to the enclave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accessibility {
    /// Readable only while the device is unlocked; never leaves this device.
    WhenUnlockedThisDeviceOnly,
    /// Readable any time after the first unlock since boot; never leaves
    /// this device.
    AfterFirstUnlockThisDeviceOnly,
}

/// Failures reported by a secure-storage provider.
#[derive(Error, Debug)]
pub enum EnclaveError {
    #[error("no item for this service/account")]
    ItemNotFound,

    #[error("an item already exists for this service/account")]
    DuplicateItem,

    #[error("the access policy forbids this operation: {0}")]
    AccessDenied(String),

    #[error("secure storage backend failure: {0}")]
    Backend(String),
}

/// Device secure-storage collaborator.
///
/// Stores opaque labeled secret items keyed by (service, account) under an
/// accessibility policy. This is the seam between the vault and whatever the
/// platform provides (keychain, credential manager, keyutils).
pub trait EnclaveProvider: Send + Sync {
    fn add_item(
        &self,
        service: &str,
        account: &str,
        payload: &str,
        accessibility: Accessibility,
    ) -> Result<(), EnclaveError>;

    fn update_item(&self, service: &str, account: &str, payload: &str)
        -> Result<(), EnclaveError>;

    fn copy_item(&self, service: &str, account: &str) -> Result<String, EnclaveError>;

    fn delete_item(&self, service: &str, account: &str) -> Result<(), EnclaveError>;
}

/// Enclave provider backed by the OS credential store.
///
/// The platform store scopes items to the current user session, which covers
/// the "unlocked device only, this device only" policy on every supported
/// target; the requested [`Accessibility`] is recorded at the call site but
/// enforced by the platform, not by this wrapper.
pub struct KeyringEnclave;

impl KeyringEnclave {
    fn entry(service: &str, account: &str) -> Result<keyring::Entry, EnclaveError> {
        keyring::Entry::new(service, account).map_err(|e| EnclaveError::Backend(e.to_string()))
    }

    fn map_err(e: keyring::Error) -> EnclaveError {
        match e {
            keyring::Error::NoEntry => EnclaveError::ItemNotFound,
            keyring::Error::NoStorageAccess(inner) => {
                EnclaveError::AccessDenied(inner.to_string())
            }
            other => EnclaveError::Backend(other.to_string()),
        }
    }
}

impl EnclaveProvider for KeyringEnclave {
    fn add_item(
        &self,
        service: &str,
        account: &str,
        payload: &str,
        _accessibility: Accessibility,
    ) -> Result<(), EnclaveError> {
        // The credential store upserts, so add and update share one path.
        Self::entry(service, account)?
            .set_password(payload)
            .map_err(Self::map_err)
    }

    fn update_item(
        &self,
        service: &str,
        account: &str,
        payload: &str,
    ) -> Result<(), EnclaveError> {
        Self::entry(service, account)?
            .set_password(payload)
            .map_err(Self::map_err)
    }

    fn copy_item(&self, service: &str, account: &str) -> Result<String, EnclaveError> {
        Self::entry(service, account)?
            .get_password()
            .map_err(Self::map_err)
    }

    fn delete_item(&self, service: &str, account: &str) -> Result<(), EnclaveError> {
        Self::entry(service, account)?
            .delete_credential()
            .map_err(Self::map_err)
    }
}

/// In-memory enclave for tests and headless hosts without a credential store.
///
/// `set_locked(true)` simulates the locked-device state: every operation on
/// item payloads is refused with `AccessDenied` until unlocked again.
#[derive(Default)]
pub struct MemoryEnclave {
    items: Mutex<HashMap<(String, String), String>>,
    locked: AtomicBool,
}

impl MemoryEnclave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::SeqCst);
    }

    fn check_unlocked(&self) -> Result<(), EnclaveError> {
        if self.locked.load(Ordering::SeqCst) {
            return Err(EnclaveError::AccessDenied("device is locked".to_string()));
        }
        Ok(())
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), String>>, EnclaveError> {
        self.items
            .lock()
            .map_err(|_| EnclaveError::Backend("enclave lock poisoned".to_string()))
    }
}

impl EnclaveProvider for MemoryEnclave {
    fn add_item(
        &self,
        service: &str,
        account: &str,
        payload: &str,
        _accessibility: Accessibility,
    ) -> Result<(), EnclaveError> {
        self.check_unlocked()?;
        let mut items = self.items()?;
        let key = (service.to_string(), account.to_string());
        if items.contains_key(&key) {
            return Err(EnclaveError::DuplicateItem);
        }
        items.insert(key, payload.to_string());
        Ok(())
    }

    fn update_item(
        &self,
        service: &str,
        account: &str,
        payload: &str,
    ) -> Result<(), EnclaveError> {
        self.check_unlocked()?;
        let mut items = self.items()?;
        let key = (service.to_string(), account.to_string());
        if !items.contains_key(&key) {
            return Err(EnclaveError::ItemNotFound);
        }
        items.insert(key, payload.to_string());
        Ok(())
    }

    fn copy_item(&self, service: &str, account: &str) -> Result<String, EnclaveError> {
        self.check_unlocked()?;
        let items = self.items()?;
        items
            .get(&(service.to_string(), account.to_string()))
            .cloned()
            .ok_or(EnclaveError::ItemNotFound)
    }

    fn delete_item(&self, service: &str, account: &str) -> Result<(), EnclaveError> {
        let mut items = self.items()?;
        items
            .remove(&(service.to_string(), account.to_string()))
            .map(|_| ())
            .ok_or(EnclaveError::ItemNotFound)
    }
}

/// Secret store: the keyed-vault contract over a secure-storage provider.
///
/// Items are written under `(service, storage_key)` with the
/// unlocked-device-only policy. A save over an existing key replaces the
/// item; the caller never observes a duplicate.
pub struct SecretStore<P: EnclaveProvider> {
    service: String,
    accessibility: Accessibility,
    provider: P,
    lock: Mutex<()>,
}

impl<P: EnclaveProvider> SecretStore<P> {
    pub fn new(service: impl Into<String>, provider: P) -> Self {
        Self {
            service: service.into(),
            accessibility: Accessibility::WhenUnlockedThisDeviceOnly,
            provider,
            lock: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::BackendUnavailable("store lock poisoned".to_string()))
    }

    fn store_err(key: &str, e: EnclaveError) -> StoreError {
        match e {
            EnclaveError::ItemNotFound => StoreError::NotFound(key.to_string()),
            EnclaveError::AccessDenied(msg) => StoreError::AccessDenied(msg),
            EnclaveError::DuplicateItem => {
                StoreError::BackendUnavailable("duplicate item persisted after update".to_string())
            }
            EnclaveError::Backend(msg) => StoreError::BackendUnavailable(msg),
        }
    }
}

impl<K, V, P> KeyedStore<K, V> for SecretStore<P>
where
    K: StoreKey,
    V: Serialize + DeserializeOwned,
    P: EnclaveProvider,
{
    fn load(&self, key: &K) -> Result<V, StoreError> {
        let _guard = self.lock()?;
        let account = key.storage_key();
        let payload = self
            .provider
            .copy_item(&self.service, &account)
            .map_err(|e| Self::store_err(&account, e))?;
        serde_json::from_str(&payload).map_err(|e| StoreError::CorruptData(e.to_string()))
    }

    fn save(&self, value: &V, key: &K) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let account = key.storage_key();
        let payload = serde_json::to_string(value)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        match self
            .provider
            .add_item(&self.service, &account, &payload, self.accessibility)
        {
            Ok(()) => Ok(()),
            // An existing item means update, not error: the observable result
            // is always a single clean value per key.
            Err(EnclaveError::DuplicateItem) => self
                .provider
                .update_item(&self.service, &account, &payload)
                .map_err(|e| Self::store_err(&account, e)),
            Err(e) => Err(Self::store_err(&account, e)),
        }
    }

    fn delete(&self, key: &K) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let account = key.storage_key();
        match self.provider.delete_item(&self.service, &account) {
            Ok(()) => Ok(()),
            // Deleting an absent key is a no-op success
            Err(EnclaveError::ItemNotFound) => Ok(()),
            Err(e) => Err(Self::store_err(&account, e)),
        }
    }
}
