//! Secret value types: recovery mnemonic and device passcode
//!
//! Both types can only be built through validating factories, so anything
//! that reaches a store is already well-formed. Values are wiped from memory
//! on drop and never appear in debug output.

use bip39::Language;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::VaultError;

/// Number of words in a recovery mnemonic.
pub const MNEMONIC_WORD_COUNT: usize = 24;

/// Number of digits in the device passcode.
pub const PASSCODE_LENGTH: usize = 4;

/// A validated 24-word recovery mnemonic.
///
/// Construction checks the word count, membership of every word in the
/// English wordlist, and the checksum over the word indices. Equality is
/// value equality over the word sequence.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    words: Vec<String>,
}

impl Mnemonic {
    /// Build a mnemonic from its word sequence, validating it fully.
    pub fn new<I, S>(words: I) -> Result<Self, VaultError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.len() != MNEMONIC_WORD_COUNT {
            return Err(VaultError::InvalidMnemonic(format!(
                "expected {} words, got {}",
                MNEMONIC_WORD_COUNT,
                words.len()
            )));
        }
        let phrase = words.join(" ");
        bip39::Mnemonic::parse_in(Language::English, phrase.as_str()).map_err(map_bip39_error)?;
        Ok(Self { words })
    }

    /// Build a mnemonic from a whitespace-separated phrase.
    pub fn from_phrase(phrase: &str) -> Result<Self, VaultError> {
        Self::new(phrase.split_whitespace().map(str::to_string))
    }

    /// Generate a fresh mnemonic from OS entropy.
    pub fn generate() -> Result<Self, VaultError> {
        let generated = bip39::Mnemonic::generate_in(Language::English, MNEMONIC_WORD_COUNT)
            .map_err(map_bip39_error)?;
        Ok(Self {
            words: generated.words().map(str::to_string).collect(),
        })
    }

    /// Full validation without constructing a value.
    pub fn validate<S: AsRef<str>>(words: &[S]) -> bool {
        if words.len() != MNEMONIC_WORD_COUNT {
            return false;
        }
        let phrase = words
            .iter()
            .map(|w| w.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        bip39::Mnemonic::parse_in(Language::English, phrase.as_str()).is_ok()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The space-joined phrase.
    ///
    /// Handle with care: the returned string is not zeroized.
    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }
}

fn map_bip39_error(e: bip39::Error) -> VaultError {
    let reason = match e {
        bip39::Error::BadWordCount(n) => format!("unsupported word count: {}", n),
        bip39::Error::UnknownWord(index) => format!("word {} is not in the wordlist", index),
        bip39::Error::InvalidChecksum => "checksum mismatch".to_string(),
        other => other.to_string(),
    };
    VaultError::InvalidMnemonic(reason)
}

// Never leak the phrase through debug output.
impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &"[REDACTED]")
            .finish()
    }
}

impl Serialize for Mnemonic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.phrase())
    }
}

impl<'de> Deserialize<'de> for Mnemonic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let phrase = String::deserialize(deserializer)?;
        Self::from_phrase(&phrase).map_err(serde::de::Error::custom)
    }
}

/// The device passcode: a fixed-length digit sequence.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passcode {
    digits: String,
}

impl Passcode {
    pub fn new(digits: impl Into<String>) -> Result<Self, VaultError> {
        let digits = digits.into();
        if digits.len() != PASSCODE_LENGTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VaultError::InvalidPasscode(format!(
                "expected exactly {} digits",
                PASSCODE_LENGTH
            )));
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Passcode")
            .field("digits", &"[REDACTED]")
            .finish()
    }
}

impl Serialize for Passcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digits)
    }
}

impl<'de> Deserialize<'de> for Passcode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let digits = String::deserialize(deserializer)?;
        Self::new(digits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-39 test vector: 24 words, valid checksum
    const VALID_24: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art";
    // Same words with the checksum word broken
    const BAD_CHECKSUM_24: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";

    #[test]
    fn test_valid_phrase_round_trips_words() {
        let mnemonic = Mnemonic::from_phrase(VALID_24).unwrap();
        assert_eq!(mnemonic.words().len(), MNEMONIC_WORD_COUNT);
        assert_eq!(mnemonic.phrase(), VALID_24);
        assert_eq!(mnemonic, Mnemonic::from_phrase(VALID_24).unwrap());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = Mnemonic::from_phrase("abandon abandon about").unwrap_err();
        assert!(matches!(err, VaultError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_unknown_word_rejected() {
        let phrase = VALID_24.replace("art", "zzzzz");
        assert!(Mnemonic::from_phrase(&phrase).is_err());
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let err = Mnemonic::from_phrase(BAD_CHECKSUM_24).unwrap_err();
        assert!(matches!(err, VaultError::InvalidMnemonic(_)));
    }

    #[test]
    fn test_validate_matches_construction() {
        let good: Vec<&str> = VALID_24.split(' ').collect();
        let bad: Vec<&str> = BAD_CHECKSUM_24.split(' ').collect();
        assert!(Mnemonic::validate(&good));
        assert!(!Mnemonic::validate(&bad));
        assert!(!Mnemonic::validate(&good[..12]));
    }

    #[test]
    fn test_generated_mnemonics_validate_and_differ() {
        let a = Mnemonic::generate().unwrap();
        let b = Mnemonic::generate().unwrap();
        assert!(Mnemonic::validate(a.words()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_does_not_leak() {
        let mnemonic = Mnemonic::from_phrase(VALID_24).unwrap();
        let output = format!("{:?}", mnemonic);
        assert!(!output.contains("abandon"));
        assert!(output.contains("REDACTED"));
    }

    #[test]
    fn test_serde_validates_on_decode() {
        let mnemonic = Mnemonic::from_phrase(VALID_24).unwrap();
        let json = serde_json::to_string(&mnemonic).unwrap();
        let back: Mnemonic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mnemonic);

        let tampered = format!("\"{}\"", BAD_CHECKSUM_24);
        assert!(serde_json::from_str::<Mnemonic>(&tampered).is_err());
    }

    #[test]
    fn test_passcode_format() {
        assert!(Passcode::new("1234").is_ok());
        assert!(Passcode::new("123").is_err());
        assert!(Passcode::new("12345").is_err());
        assert!(Passcode::new("12a4").is_err());

        let output = format!("{:?}", Passcode::new("1234").unwrap());
        assert!(!output.contains("1234"));
    }
}
