//! Keeper-Vault: persistence and secrets layer for a multi-wallet TON app
//!
//! This crate keeps two kinds of records strictly apart:
//!
//! - **Durable state**: the singleton [`KeeperInfo`] record describing every
//!   wallet known to the install, the active-wallet selection, and shared
//!   security settings, persisted as a field-named JSON document.
//! - **Secrets**: recovery mnemonics and the device passcode, held in an
//!   OS-protected secret enclave behind the unlocked-device-only policy.
//!
//! Both sit behind one keyed-store contract with typed repositories on top,
//! so a secret can never end up in the durable store or vice versa. Address
//! derivation is a pure function over (public key, contract version).
//!
//! # Example
//!
//! ```ignore
//! use keeper_vault::{
//!     ContractVersion, KeeperManager, KeyringEnclave, Mnemonic, PublicKey, VaultConfig,
//!     WalletMetadata,
//! };
//!
//! let config = VaultConfig::from_env();
//! let keeper = KeeperManager::from_config(&config, KeyringEnclave);
//!
//! let mnemonic = Mnemonic::from_phrase(phrase)?;
//! let wallet = keeper.import_wallet(
//!     PublicKey::new(public_key),
//!     ContractVersion::V4R2,
//!     WalletMetadata::default(),
//!     Some(&mnemonic),
//! )?;
//! println!("{}", keeper.active_wallet_address()?);
//! ```

// Public modules
pub mod config;
pub mod derivation;
pub mod error;
pub mod manager;
pub mod repository;
pub mod secrets;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use config::VaultConfig;
pub use derivation::{derive_address, Address, ContractVersion, BASECHAIN};
pub use error::{StoreError, VaultError};
pub use manager::KeeperManager;
pub use repository::{MnemonicRepository, PasscodeRepository, StateRepository};
pub use secrets::{Mnemonic, Passcode, MNEMONIC_WORD_COUNT, PASSCODE_LENGTH};
pub use state::{
    AppCollection, AssetsPolicy, KeeperInfo, PublicKey, SecuritySettings, Wallet, WalletIdentity,
    WalletMetadata,
};
pub use store::{
    Accessibility, EnclaveError, EnclaveProvider, FileStore, KeyedStore, KeyringEnclave,
    MemoryEnclave, SecretKey, SecretStore, StateKey, StoreKey,
};

// Common result type
pub type Result<T> = std::result::Result<T, VaultError>;
