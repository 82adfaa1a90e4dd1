//! Typed facades over the two backing stores
//!
//! Each repository binds one store to one value kind and builds the keys,
//! nothing more. Secrets can only travel through [`SecretStore`] and the
//! state record only through [`FileStore`]; the types make the opposite
//! impossible to write.

use std::sync::Arc;

use crate::error::StoreError;
use crate::secrets::{Mnemonic, Passcode};
use crate::state::{KeeperInfo, WalletIdentity};
use crate::store::{EnclaveProvider, FileStore, KeyedStore, SecretKey, SecretStore, StateKey};

/// Per-wallet recovery mnemonics, stored in the secret enclave.
pub struct MnemonicRepository<P: EnclaveProvider> {
    store: Arc<SecretStore<P>>,
}

impl<P: EnclaveProvider> MnemonicRepository<P> {
    pub fn new(store: Arc<SecretStore<P>>) -> Self {
        Self { store }
    }

    pub fn get(&self, wallet: &WalletIdentity) -> Result<Mnemonic, StoreError> {
        self.store.load(&SecretKey::Mnemonic(wallet.clone()))
    }

    pub fn save(&self, mnemonic: &Mnemonic, wallet: &WalletIdentity) -> Result<(), StoreError> {
        self.store.save(mnemonic, &SecretKey::Mnemonic(wallet.clone()))
    }

    pub fn remove(&self, wallet: &WalletIdentity) -> Result<(), StoreError> {
        KeyedStore::<SecretKey, Mnemonic>::delete(
            self.store.as_ref(),
            &SecretKey::Mnemonic(wallet.clone()),
        )
    }
}

/// The device-wide passcode, stored in the secret enclave under a fixed slot.
pub struct PasscodeRepository<P: EnclaveProvider> {
    store: Arc<SecretStore<P>>,
}

impl<P: EnclaveProvider> PasscodeRepository<P> {
    pub fn new(store: Arc<SecretStore<P>>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> Result<Passcode, StoreError> {
        self.store.load(&SecretKey::Passcode)
    }

    pub fn set(&self, passcode: &Passcode) -> Result<(), StoreError> {
        self.store.save(passcode, &SecretKey::Passcode)
    }

    pub fn remove(&self) -> Result<(), StoreError> {
        KeyedStore::<SecretKey, Passcode>::delete(self.store.as_ref(), &SecretKey::Passcode)
    }
}

/// The singleton state record, stored durably on disk.
pub struct StateRepository {
    store: Arc<FileStore>,
}

impl StateRepository {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    pub fn get_state(&self) -> Result<KeeperInfo, StoreError> {
        self.store.load(&StateKey)
    }

    pub fn save_state(&self, state: &KeeperInfo) -> Result<(), StoreError> {
        self.store.save(state, &StateKey)
    }

    pub fn remove_state(&self) -> Result<(), StoreError> {
        KeyedStore::<StateKey, KeeperInfo>::delete(self.store.as_ref(), &StateKey)
    }
}
