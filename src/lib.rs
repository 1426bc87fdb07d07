pub mod key;
pub mod parameters;
pub mod provider;
pub mod provisioner;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum length EC2 accepts for a key pair name.
const MAX_KEY_PAIR_NAME_LEN: usize = 255;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidKeyPairName {
    #[error("key pair name cannot be empty")]
    Empty,
    #[error("key pair name cannot be longer than 255 characters")]
    TooLong,
    #[error("key pair name `{0}` cannot be used as a file name")]
    NotAFileName(String),
}

/// Name identifying a key pair in the provider account. It is also the stem of the local
/// private key file, so it must be usable as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyPairName(String);

impl KeyPairName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyPairName {
    type Error = InvalidKeyPairName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidKeyPairName::Empty);
        }
        if value.chars().count() > MAX_KEY_PAIR_NAME_LEN {
            return Err(InvalidKeyPairName::TooLong);
        }
        if value == "." || value == ".." || value.contains(['/', '\\']) {
            return Err(InvalidKeyPairName::NotAFileName(value));
        }
        Ok(KeyPairName(value))
    }
}

impl TryFrom<&str> for KeyPairName {
    type Error = InvalidKeyPairName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl fmt::Display for KeyPairName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
