/// Vault configuration from environment variables
///
/// Controls where the durable state record lives on disk and the service
/// label used for items written to the OS credential store.
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct VaultConfig {
    /// Base directory for the durable state store
    pub data_dir: PathBuf,
    /// Service label for secret items in the OS credential store
    pub keychain_service: String,
}

impl VaultConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `KEEPER_DATA_DIR`: durable state directory (default "./keeper-data")
    /// - `KEEPER_KEYCHAIN_SERVICE`: credential-store service label
    ///   (default "keeper-vault")
    pub fn from_env() -> Self {
        let data_dir = env::var("KEEPER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./keeper-data"));
        log::info!("State directory: {}", data_dir.display());

        let keychain_service =
            env::var("KEEPER_KEYCHAIN_SERVICE").unwrap_or_else(|_| "keeper-vault".to_string());
        log::info!("Keychain service: {}", keychain_service);

        Self {
            data_dir,
            keychain_service,
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./keeper-data"),
            keychain_service: "keeper-vault".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = VaultConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./keeper-data"));
        assert_eq!(config.keychain_service, "keeper-vault");
    }
}
