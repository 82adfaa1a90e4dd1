//! The keeper state aggregate and its models
//!
//! `KeeperInfo` is the single source of truth for everything non-secret:
//! the wallets known to the install, which one is active, the shared
//! security settings, and the opaque assets/app records. It is saved and
//! replaced wholesale; there is no partial update.

mod models;

pub use models::{
    AppCollection, AssetsPolicy, PublicKey, SecuritySettings, Wallet, WalletIdentity,
    WalletMetadata,
};

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Format tag for the persisted record, kept for future migrations.
const RECORD_VERSION: u32 = 1;

fn default_record_version() -> u32 {
    RECORD_VERSION
}

/// The application-state record: one per install.
///
/// Cross-field invariants (active wallet present in the list, identities
/// unique) are enforced at every construction site including decoding, so a
/// loaded record either satisfies them or fails as corrupt; they are never
/// silently patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KeeperInfoRecord")]
pub struct KeeperInfo {
    record_version: u32,
    wallets: Vec<Wallet>,
    current_wallet: Option<WalletIdentity>,
    pub security_settings: SecuritySettings,
    pub assets_policy: AssetsPolicy,
    pub app_collection: AppCollection,
}

/// Raw decoded form of [`KeeperInfo`], before invariants are checked.
///
/// Every field defaults when absent so records written by older releases
/// keep loading; unknown fields from newer releases are ignored.
#[derive(Deserialize)]
struct KeeperInfoRecord {
    #[serde(default = "default_record_version")]
    record_version: u32,
    #[serde(default)]
    wallets: Vec<Wallet>,
    #[serde(default)]
    current_wallet: Option<WalletIdentity>,
    #[serde(default)]
    security_settings: SecuritySettings,
    #[serde(default)]
    assets_policy: AssetsPolicy,
    #[serde(default)]
    app_collection: AppCollection,
}

impl TryFrom<KeeperInfoRecord> for KeeperInfo {
    type Error = String;

    fn try_from(record: KeeperInfoRecord) -> Result<Self, Self::Error> {
        for (i, wallet) in record.wallets.iter().enumerate() {
            if record.wallets[i + 1..]
                .iter()
                .any(|other| other.identity() == wallet.identity())
            {
                return Err(format!("duplicate wallet identity: {}", wallet.identity()));
            }
        }
        if let Some(current) = &record.current_wallet {
            if !record.wallets.iter().any(|w| w.identity() == current) {
                return Err(format!(
                    "active wallet {} is not among the stored wallets",
                    current
                ));
            }
        }
        Ok(Self {
            record_version: record.record_version,
            wallets: record.wallets,
            current_wallet: record.current_wallet,
            security_settings: record.security_settings,
            assets_policy: record.assets_policy,
            app_collection: record.app_collection,
        })
    }
}

impl Default for KeeperInfo {
    fn default() -> Self {
        Self {
            record_version: RECORD_VERSION,
            wallets: Vec::new(),
            current_wallet: None,
            security_settings: SecuritySettings::default(),
            assets_policy: AssetsPolicy::default(),
            app_collection: AppCollection::default(),
        }
    }
}

impl KeeperInfo {
    /// State after the first wallet import: one wallet, and it is active.
    pub fn new(first_wallet: Wallet) -> Self {
        let current = first_wallet.identity().clone();
        Self {
            wallets: vec![first_wallet],
            current_wallet: Some(current),
            ..Self::default()
        }
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn wallet(&self, identity: &WalletIdentity) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.identity() == identity)
    }

    /// The active wallet, if one is selected.
    pub fn current_wallet(&self) -> Option<&Wallet> {
        self.current_wallet.as_ref().and_then(|id| self.wallet(id))
    }

    /// Add a wallet; the first wallet added becomes active.
    pub fn add_wallet(&mut self, wallet: Wallet) -> Result<(), VaultError> {
        if self.wallet(wallet.identity()).is_some() {
            return Err(VaultError::WalletExists(wallet.identity().to_string()));
        }
        if self.current_wallet.is_none() {
            self.current_wallet = Some(wallet.identity().clone());
        }
        self.wallets.push(wallet);
        Ok(())
    }

    /// Remove a wallet; removing the active one repoints to the first
    /// remaining wallet, or clears the selection when none remain.
    pub fn remove_wallet(&mut self, identity: &WalletIdentity) -> Result<(), VaultError> {
        let index = self
            .wallets
            .iter()
            .position(|w| w.identity() == identity)
            .ok_or_else(|| VaultError::UnknownWallet(identity.to_string()))?;
        self.wallets.remove(index);
        if self.current_wallet.as_ref() == Some(identity) {
            self.current_wallet = self.wallets.first().map(|w| w.identity().clone());
        }
        Ok(())
    }

    pub fn set_current_wallet(&mut self, identity: &WalletIdentity) -> Result<(), VaultError> {
        if self.wallet(identity).is_none() {
            return Err(VaultError::UnknownWallet(identity.to_string()));
        }
        self.current_wallet = Some(identity.clone());
        Ok(())
    }

    pub fn update_metadata(
        &mut self,
        identity: &WalletIdentity,
        metadata: WalletMetadata,
    ) -> Result<(), VaultError> {
        let wallet = self
            .wallets
            .iter_mut()
            .find(|w| w.identity() == identity)
            .ok_or_else(|| VaultError::UnknownWallet(identity.to_string()))?;
        wallet.metadata = metadata;
        Ok(())
    }
}
