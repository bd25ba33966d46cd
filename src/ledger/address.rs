//! Account Identifiers
//!
//! Ledger accounts are identified by base58-encoded 32-byte keys. The
//! canonical string form is kept; validation happens on every parse so an
//! `AccountId` in hand is always well-formed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded length of a valid account identifier
pub const ACCOUNT_ID_LEN: usize = 32;

/// Account identifier validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Account id is not valid base58")]
    NotBase58,

    #[error("Account id must decode to {ACCOUNT_ID_LEN} bytes, got {0}")]
    BadLength(usize),
}

/// A validated ledger account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for logs and display: first 4 and last 4 characters
    pub fn short(&self) -> String {
        if self.0.len() <= 8 {
            return self.0.clone();
        }
        format!("{}..{}", &self.0[..4], &self.0[self.0.len() - 4..])
    }
}

impl FromStr for AccountId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::NotBase58)?;
        if decoded.len() != ACCOUNT_ID_LEN {
            return Err(AddressError::BadLength(decoded.len()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 32 bytes of 0x01 in base58
    const VALID: &str = "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi";

    #[test]
    fn test_parse_valid() {
        let id: AccountId = VALID.parse().unwrap();
        assert_eq!(id.as_str(), VALID);
    }

    #[test]
    fn test_parse_rejects_bad_base58() {
        // '0', 'I', 'O', 'l' are outside the base58 alphabet
        assert_eq!(
            "0OIl".parse::<AccountId>().unwrap_err(),
            AddressError::NotBase58
        );
        assert_eq!(
            "not a key".parse::<AccountId>().unwrap_err(),
            AddressError::NotBase58
        );
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        // Valid base58 but far too short
        assert!(matches!(
            "abc".parse::<AccountId>().unwrap_err(),
            AddressError::BadLength(_)
        ));
        assert!(matches!(
            "".parse::<AccountId>().unwrap_err(),
            AddressError::BadLength(0)
        ));
    }

    #[test]
    fn test_short_form() {
        let id: AccountId = VALID.parse().unwrap();
        assert_eq!(id.short(), "4vJ9..kLKi");
    }

    #[test]
    fn test_serde_roundtrip() {
        let id: AccountId = VALID.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", VALID));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<AccountId>("\"bad!\"").is_err());
    }
}
