//! Data models for the keeper state record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::derivation::ContractVersion;

/// Ed25519 public key of one wallet, hex-serialized.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("public key must be 32 bytes"))?;
        Ok(Self(bytes))
    }
}

/// Stable wallet identifier: hex SHA-256 of the public key.
///
/// Correlates the state record with the wallet's secret material; immutable
/// for the life of the wallet.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct WalletIdentity(String);

impl WalletIdentity {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = Sha256::digest(public_key.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User-facing wallet metadata; mutable in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletMetadata {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub tint_color: String,
}

/// One wallet known to this install.
///
/// Identity, public key, and contract version never change after creation;
/// only the metadata does. The mnemonic is never part of this record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    identity: WalletIdentity,
    public_key: PublicKey,
    contract_version: ContractVersion,
    #[serde(default)]
    pub metadata: WalletMetadata,
    created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(
        public_key: PublicKey,
        contract_version: ContractVersion,
        metadata: WalletMetadata,
    ) -> Self {
        Self {
            identity: WalletIdentity::from_public_key(&public_key),
            public_key,
            contract_version,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> &WalletIdentity {
        &self.identity
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn contract_version(&self) -> &ContractVersion {
        &self.contract_version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Security settings shared by all wallets of the install.
///
/// Absent fields decode to `false` so records written before a flag existed
/// keep loading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    #[serde(default)]
    pub is_biometry_enabled: bool,
    #[serde(default)]
    pub is_lock_screen_enabled: bool,
    #[serde(default)]
    pub are_balances_hidden: bool,
}

/// Asset visibility policy; opaque to the vault.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsPolicy {
    #[serde(flatten)]
    entries: serde_json::Map<String, serde_json::Value>,
}

impl AssetsPolicy {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.insert(key.into(), value);
    }
}

/// Installed-app collection; opaque to the vault.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppCollection {
    #[serde(flatten)]
    apps: serde_json::Map<String, serde_json::Value>,
}

impl AppCollection {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.apps.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.apps.insert(key.into(), value);
    }
}
