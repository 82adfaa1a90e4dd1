//! Keyed vault abstraction and its two backing stores
//!
//! - `KeyedStore`: one contract for storing, loading, and deleting a value
//!   under a typed key
//! - `FileStore`: durable, non-secret state on the filesystem
//! - `SecretStore`: secret material behind a device secure-storage provider
//!
//! Both backends implement the contract once for all serializable value
//! types; the repositories in [`crate::repository`] bind each backend to a
//! single domain type so secrets and ordinary state can never cross over.

mod durable;
mod secure;

pub use durable::FileStore;
pub use secure::{
    Accessibility, EnclaveError, EnclaveProvider, KeyringEnclave, MemoryEnclave, SecretStore,
};

use crate::error::StoreError;
use crate::state::WalletIdentity;

/// A domain identifier that maps onto a storage key.
///
/// Keys must be deterministic and collision-free: the same identifier always
/// yields the same key, and distinct identifiers never share one.
pub trait StoreKey {
    fn storage_key(&self) -> String;
}

/// Contract shared by both backing stores.
///
/// A `save` fully replaces any prior value at the key; `delete` of an absent
/// key is a no-op success. Per-key operations on one store are linearizable
/// (the backend holds an exclusive lock for the duration of each call), so a
/// concurrent load observes either the fully-old or the fully-new value.
pub trait KeyedStore<K: StoreKey, V> {
    fn load(&self, key: &K) -> Result<V, StoreError>;
    fn save(&self, value: &V, key: &K) -> Result<(), StoreError>;
    fn delete(&self, key: &K) -> Result<(), StoreError>;
}

/// Singleton key for the application-state record.
///
/// Derived from the aggregate's type name so the on-disk name follows the
/// record it stores.
pub struct StateKey;

impl StoreKey for StateKey {
    fn storage_key(&self) -> String {
        let full = std::any::type_name::<crate::state::KeeperInfo>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }
}

/// Key of one item in the secret store: (purpose, wallet identity).
///
/// The passcode is device-wide, so it uses a fixed singleton slot instead of
/// a per-wallet one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecretKey {
    /// Recovery mnemonic of one wallet.
    Mnemonic(WalletIdentity),
    /// The device passcode.
    Passcode,
}

impl StoreKey for SecretKey {
    fn storage_key(&self) -> String {
        match self {
            SecretKey::Mnemonic(identity) => format!("mnemonic.{}", identity),
            SecretKey::Passcode => "passcode".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PublicKey;

    #[test]
    fn test_state_key_is_type_name_derived() {
        assert_eq!(StateKey.storage_key(), "KeeperInfo");
    }

    #[test]
    fn test_secret_keys_do_not_collide() {
        let a = WalletIdentity::from_public_key(&PublicKey::new([1u8; 32]));
        let b = WalletIdentity::from_public_key(&PublicKey::new([2u8; 32]));

        let keys = [
            SecretKey::Mnemonic(a.clone()).storage_key(),
            SecretKey::Mnemonic(b).storage_key(),
            SecretKey::Passcode.storage_key(),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert_ne!(keys[1], keys[2]);

        // Deterministic for the same identity
        assert_eq!(keys[0], SecretKey::Mnemonic(a).storage_key());
    }
}
