use std::sync::Arc;

use crate::config::VaultConfig;
use crate::derivation::{derive_address, Address, ContractVersion};
use crate::error::{StoreError, VaultError};
use crate::repository::{MnemonicRepository, PasscodeRepository, StateRepository};
use crate::secrets::{Mnemonic, Passcode};
use crate::state::{
    KeeperInfo, PublicKey, SecuritySettings, Wallet, WalletIdentity, WalletMetadata,
};
use crate::store::{EnclaveProvider, FileStore, SecretStore};

/// Keeper Manager - Orchestration Layer
///
/// Coordinates wallet lifecycle across the state record and the secret
/// enclave by delegating to the typed repositories. Repositories are
/// injected: there is no ambient global state, and callers assemble the
/// manager once during configuration.
pub struct KeeperManager<P: EnclaveProvider> {
    state: StateRepository,
    mnemonics: MnemonicRepository<P>,
    passcode: PasscodeRepository<P>,
}

impl<P: EnclaveProvider> KeeperManager<P> {
    pub fn new(
        state: StateRepository,
        mnemonics: MnemonicRepository<P>,
        passcode: PasscodeRepository<P>,
    ) -> Self {
        Self {
            state,
            mnemonics,
            passcode,
        }
    }

    /// Assemble a manager from configuration and an enclave provider.
    pub fn from_config(config: &VaultConfig, provider: P) -> Self {
        let file_store = Arc::new(FileStore::open(config.data_dir.clone()));
        let secret_store = Arc::new(SecretStore::new(config.keychain_service.clone(), provider));
        Self {
            state: StateRepository::new(file_store),
            mnemonics: MnemonicRepository::new(Arc::clone(&secret_store)),
            passcode: PasscodeRepository::new(secret_store),
        }
    }

    // ========================================================================
    // Wallet lifecycle
    // ========================================================================

    /// Import a wallet.
    ///
    /// The mnemonic is written to the secret enclave before the state record
    /// is updated; if the second write fails, the orphaned secret is
    /// harmless and gets overwritten on retry. A wallet imported without a
    /// mnemonic is watch-only.
    pub fn import_wallet(
        &self,
        public_key: PublicKey,
        contract_version: ContractVersion,
        metadata: WalletMetadata,
        mnemonic: Option<&Mnemonic>,
    ) -> Result<Wallet, VaultError> {
        let wallet = Wallet::new(public_key, contract_version, metadata);
        let mut info = self.load_or_empty_state()?;
        if info.wallet(wallet.identity()).is_some() {
            return Err(VaultError::WalletExists(wallet.identity().to_string()));
        }

        if let Some(mnemonic) = mnemonic {
            self.mnemonics.save(mnemonic, wallet.identity())?;
        }
        info.add_wallet(wallet.clone())?;
        self.state.save_state(&info)?;

        log::info!("Imported wallet {}", wallet.identity());
        Ok(wallet)
    }

    /// Create a wallet with a freshly generated mnemonic.
    pub fn create_wallet(
        &self,
        public_key: PublicKey,
        contract_version: ContractVersion,
        metadata: WalletMetadata,
    ) -> Result<(Wallet, Mnemonic), VaultError> {
        let mnemonic = Mnemonic::generate()?;
        let wallet = self.import_wallet(public_key, contract_version, metadata, Some(&mnemonic))?;
        Ok((wallet, mnemonic))
    }

    /// Remove a wallet and its secret material.
    ///
    /// When the last wallet goes, the state record is deleted entirely; the
    /// next import starts from a fresh aggregate.
    pub fn remove_wallet(&self, identity: &WalletIdentity) -> Result<(), VaultError> {
        let mut info = self.state.get_state()?;
        info.remove_wallet(identity)?;
        self.mnemonics.remove(identity)?;
        if info.is_empty() {
            self.state.remove_state()?;
        } else {
            self.state.save_state(&info)?;
        }
        log::warn!("Removed wallet {}", identity);
        Ok(())
    }

    pub fn list_wallets(&self) -> Result<Vec<Wallet>, VaultError> {
        Ok(self.load_or_empty_state()?.wallets().to_vec())
    }

    pub fn active_wallet(&self) -> Result<Wallet, VaultError> {
        let info = self.state.get_state()?;
        info.current_wallet()
            .cloned()
            .ok_or_else(|| VaultError::UnknownWallet("no active wallet".to_string()))
    }

    pub fn set_active_wallet(&self, identity: &WalletIdentity) -> Result<(), VaultError> {
        let mut info = self.state.get_state()?;
        info.set_current_wallet(identity)?;
        self.state.save_state(&info)?;
        Ok(())
    }

    pub fn update_metadata(
        &self,
        identity: &WalletIdentity,
        metadata: WalletMetadata,
    ) -> Result<(), VaultError> {
        let mut info = self.state.get_state()?;
        info.update_metadata(identity, metadata)?;
        self.state.save_state(&info)?;
        Ok(())
    }

    // ========================================================================
    // Addresses
    // ========================================================================

    /// On-chain address of the active wallet.
    pub fn active_wallet_address(&self) -> Result<Address, VaultError> {
        let wallet = self.active_wallet()?;
        derive_address(wallet.public_key(), wallet.contract_version())
    }

    /// On-chain address of one wallet.
    pub fn wallet_address(&self, identity: &WalletIdentity) -> Result<Address, VaultError> {
        let info = self.state.get_state()?;
        let wallet = info
            .wallet(identity)
            .ok_or_else(|| VaultError::UnknownWallet(identity.to_string()))?;
        derive_address(wallet.public_key(), wallet.contract_version())
    }

    // ========================================================================
    // Secrets
    // ========================================================================

    pub fn get_mnemonic(&self, identity: &WalletIdentity) -> Result<Mnemonic, VaultError> {
        Ok(self.mnemonics.get(identity)?)
    }

    pub fn get_passcode(&self) -> Result<Passcode, VaultError> {
        Ok(self.passcode.get()?)
    }

    pub fn set_passcode(&self, passcode: &Passcode) -> Result<(), VaultError> {
        Ok(self.passcode.set(passcode)?)
    }

    // ========================================================================
    // Security settings
    // ========================================================================

    pub fn security_settings(&self) -> Result<SecuritySettings, VaultError> {
        Ok(self.load_or_empty_state()?.security_settings)
    }

    pub fn set_biometry_enabled(&self, enabled: bool) -> Result<(), VaultError> {
        let mut info = self.load_or_empty_state()?;
        info.security_settings.is_biometry_enabled = enabled;
        self.state.save_state(&info)?;
        Ok(())
    }

    // ========================================================================
    // Reset & reconciliation
    // ========================================================================

    /// Wipe the state record; with `purge_secrets`, also delete every known
    /// mnemonic and the passcode.
    ///
    /// Secrets of wallets no longer referenced by the record cannot be
    /// enumerated through the enclave and stay behind; they are inert until
    /// overwritten by a future import of the same key material.
    pub fn reset(&self, purge_secrets: bool) -> Result<(), VaultError> {
        if purge_secrets {
            let info = self.load_or_empty_state()?;
            for wallet in info.wallets() {
                self.mnemonics.remove(wallet.identity())?;
            }
            self.passcode.remove()?;
        }
        self.state.remove_state()?;
        log::warn!("Keeper state reset (purge_secrets: {})", purge_secrets);
        Ok(())
    }

    /// Wallets whose mnemonic entry is absent from the enclave.
    ///
    /// These are either watch-only imports or the visible half of an import
    /// that never finished; the caller decides whether to re-prompt for the
    /// phrase or leave the wallet read-only.
    pub fn missing_secret_wallets(&self) -> Result<Vec<WalletIdentity>, VaultError> {
        let info = self.load_or_empty_state()?;
        let mut missing = Vec::new();
        for wallet in info.wallets() {
            match self.mnemonics.get(wallet.identity()) {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => missing.push(wallet.identity().clone()),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(missing)
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Load the state record, treating an absent record as the empty state.
    ///
    /// Corruption is not absence: a record that fails its invariants still
    /// surfaces as `CorruptData`.
    fn load_or_empty_state(&self) -> Result<KeeperInfo, StoreError> {
        match self.state.get_state() {
            Ok(info) => Ok(info),
            Err(StoreError::NotFound(_)) => Ok(KeeperInfo::default()),
            Err(e) => Err(e),
        }
    }
}
