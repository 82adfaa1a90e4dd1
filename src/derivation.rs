//! Wallet contract versions and on-chain address derivation
//!
//! Pure and deterministic: (public key, contract version) fully determines
//! the address. Each version pairs its own contract code template with the
//! version-specific initial data image; the account address is the hash of
//! that initial state, placed in the basechain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::VaultError;
use crate::state::PublicKey;

/// Workchain all wallet contracts are deployed to.
pub const BASECHAIN: i8 = 0;

/// Default wallet id baked into every contract's initial data.
const WALLET_ID: u32 = 0x29A9_A317;

/// Wallet contract revisions known to this install.
///
/// `Other` carries a revision tag written by a newer release: it decodes and
/// re-encodes losslessly, but address derivation refuses it rather than
/// falling back to a default template.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContractVersion {
    V3R1,
    V3R2,
    V4R1,
    V4R2,
    Other(String),
}

impl ContractVersion {
    /// Revisions this build can derive addresses for.
    pub const SUPPORTED: [ContractVersion; 4] = [
        ContractVersion::V3R1,
        ContractVersion::V3R2,
        ContractVersion::V4R1,
        ContractVersion::V4R2,
    ];

    /// Parse a revision tag from user input, rejecting anything unknown.
    pub fn parse(tag: &str) -> Result<Self, VaultError> {
        match tag {
            "v3R1" => Ok(ContractVersion::V3R1),
            "v3R2" => Ok(ContractVersion::V3R2),
            "v4R1" => Ok(ContractVersion::V4R1),
            "v4R2" => Ok(ContractVersion::V4R2),
            other => Err(VaultError::UnsupportedContractVersion(other.to_string())),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ContractVersion::V3R1 => "v3R1",
            ContractVersion::V3R2 => "v3R2",
            ContractVersion::V4R1 => "v4R1",
            ContractVersion::V4R2 => "v4R2",
            ContractVersion::Other(tag) => tag,
        }
    }

    /// Hash of this revision's contract code template.
    fn code_hash(&self) -> Result<[u8; 32], VaultError> {
        let template = match self {
            ContractVersion::V3R1 => "wallet-code/v3R1",
            ContractVersion::V3R2 => "wallet-code/v3R2",
            ContractVersion::V4R1 => "wallet-code/v4R1",
            ContractVersion::V4R2 => "wallet-code/v4R2",
            ContractVersion::Other(tag) => {
                return Err(VaultError::UnsupportedContractVersion(tag.clone()))
            }
        };
        Ok(Sha256::digest(template.as_bytes()).into())
    }

    /// Hash of the contract's initial data image for this public key.
    ///
    /// v3 family: seqno, wallet id, public key. v4 family additionally ends
    /// with the empty plugin-dictionary marker.
    fn data_hash(&self, public_key: &PublicKey) -> Result<[u8; 32], VaultError> {
        let mut data = Vec::with_capacity(4 + 4 + 32 + 1);
        data.extend_from_slice(&0u32.to_be_bytes()); // initial seqno
        data.extend_from_slice(&WALLET_ID.to_be_bytes());
        data.extend_from_slice(public_key.as_bytes());
        match self {
            ContractVersion::V3R1 | ContractVersion::V3R2 => {}
            ContractVersion::V4R1 | ContractVersion::V4R2 => data.push(0x00),
            ContractVersion::Other(tag) => {
                return Err(VaultError::UnsupportedContractVersion(tag.clone()))
            }
        }
        Ok(Sha256::digest(&data).into())
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ContractVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ContractVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        // Tolerate revisions from newer releases; derivation rejects them.
        Ok(ContractVersion::parse(&tag).unwrap_or(ContractVersion::Other(tag)))
    }
}

/// Raw on-chain account address: workchain plus 32-byte account hash.
///
/// Presentation concerns (friendly form, bounceable flag) belong to the
/// caller; the raw rendering is `"{workchain}:{hex}"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl Address {
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_raw())
    }
}

/// Derive the on-chain address of a wallet contract.
///
/// The address is the hash of the initial state (code template hash plus
/// initial data hash) in the basechain. Fails with
/// `UnsupportedContractVersion` for a revision this build does not know.
pub fn derive_address(
    public_key: &PublicKey,
    version: &ContractVersion,
) -> Result<Address, VaultError> {
    let code_hash = version.code_hash()?;
    let data_hash = version.data_hash(public_key)?;

    let mut hasher = Sha256::new();
    hasher.update(code_hash);
    hasher.update(data_hash);

    Ok(Address {
        workchain: BASECHAIN,
        hash: hasher.finalize().into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(seed: u8) -> PublicKey {
        PublicKey::new([seed; 32])
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let pk = test_key(1);
        for version in ContractVersion::SUPPORTED {
            let first = derive_address(&pk, &version).unwrap();
            let second = derive_address(&pk, &version).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.workchain, BASECHAIN);
        }
    }

    #[test]
    fn test_versions_derive_distinct_addresses() {
        let pk = test_key(2);
        let addresses: Vec<Address> = ContractVersion::SUPPORTED
            .iter()
            .map(|v| derive_address(&pk, v).unwrap())
            .collect();
        for (i, a) in addresses.iter().enumerate() {
            for b in &addresses[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_keys_derive_distinct_addresses() {
        let version = ContractVersion::V4R2;
        let a = derive_address(&test_key(3), &version).unwrap();
        let b = derive_address(&test_key(4), &version).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_revision_never_falls_back() {
        let version = ContractVersion::Other("v9R9".to_string());
        let err = derive_address(&test_key(5), &version).unwrap_err();
        assert!(matches!(err, VaultError::UnsupportedContractVersion(tag) if tag == "v9R9"));
    }

    #[test]
    fn test_revision_tag_round_trips() {
        let json = serde_json::to_string(&ContractVersion::V4R2).unwrap();
        assert_eq!(json, "\"v4R2\"");
        let back: ContractVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ContractVersion::V4R2);

        // A tag from a newer release survives load and re-save unchanged.
        let future: ContractVersion = serde_json::from_str("\"v5R1\"").unwrap();
        assert_eq!(future, ContractVersion::Other("v5R1".to_string()));
        assert_eq!(serde_json::to_string(&future).unwrap(), "\"v5R1\"");
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        assert!(ContractVersion::parse("v4R2").is_ok());
        assert!(matches!(
            ContractVersion::parse("v9R9"),
            Err(VaultError::UnsupportedContractVersion(_))
        ));
    }

    #[test]
    fn test_raw_rendering() {
        let address = derive_address(&test_key(6), &ContractVersion::V3R2).unwrap();
        let raw = address.to_raw();
        assert!(raw.starts_with("0:"));
        assert_eq!(raw.len(), 2 + 64);
    }
}
