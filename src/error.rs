use thiserror::Error;

/// Errors surfaced by the two backing stores.
///
/// Every store operation returns a subset of these; callers decide the
/// recovery policy (prompt, retry, default). The vault itself never retries.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no value stored under key: {0}")]
    NotFound(String),

    #[error("access denied by storage policy: {0}")]
    AccessDenied(String),

    #[error("stored record is corrupt: {0}")]
    CorruptData(String),

    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("value could not be serialized: {0}")]
    SerializationFailed(String),
}

#[derive(Error, Debug)]
pub enum VaultError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid passcode: {0}")]
    InvalidPasscode(String),

    #[error("unsupported wallet contract version: {0}")]
    UnsupportedContractVersion(String),

    #[error("wallet not present in keeper state: {0}")]
    UnknownWallet(String),

    #[error("wallet already present in keeper state: {0}")]
    WalletExists(String),
}
