use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::KeyPairName;
use crate::key::PrivateKeyMaterial;

pub mod ec2;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The key pair does not exist. Drives the creation path, it is not fatal by itself.
    #[error("key pair `{0}` not found")]
    NotFound(String),
    #[error("provider api error: code: `{code}`, message: `{message}`")]
    Api { code: String, message: String },
    #[error("provider transport error: `{0}`")]
    Transport(String),
    #[error("provider did not return the private key material of `{0}`")]
    MissingKeyMaterial(String),
    #[error("unable to start the provider client runtime: `{0}`")]
    Runtime(String),
}

/// Algorithm of the key pair requested to the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum KeyAlgorithm {
    #[default]
    Rsa,
    Ed25519,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa => write!(f, "rsa"),
            KeyAlgorithm::Ed25519 => write!(f, "ed25519"),
        }
    }
}

/// Key pair as known by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPairRecord {
    pub key_name: KeyPairName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

impl KeyPairRecord {
    pub fn new(key_name: KeyPairName) -> Self {
        Self {
            key_name,
            key_pair_id: None,
            key_fingerprint: None,
            key_type: None,
        }
    }
}

/// A freshly created key pair together with its private key, which the provider only returns
/// at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedKeyPair {
    pub record: KeyPairRecord,
    pub private_key: PrivateKeyMaterial,
}

/// Remote compute provider owning the key pairs.
pub trait KeyPairProvider {
    /// Looks up the key pair called `name`, returning [`ProviderError::NotFound`] when absent.
    fn describe_key_pair(&self, name: &KeyPairName) -> Result<KeyPairRecord, ProviderError>;

    fn create_key_pair(
        &self,
        name: &KeyPairName,
        algorithm: KeyAlgorithm,
    ) -> Result<CreatedKeyPair, ProviderError>;
}

#[cfg(test)]
pub mod tests {
    use mockall::mock;

    use super::*;

    mock! {
        pub KeyPairProvider {}

        impl KeyPairProvider for KeyPairProvider {
            fn describe_key_pair(&self, name: &KeyPairName) -> Result<KeyPairRecord, ProviderError>;
            fn create_key_pair(
                &self,
                name: &KeyPairName,
                algorithm: KeyAlgorithm,
            ) -> Result<CreatedKeyPair, ProviderError>;
        }
    }

    #[test]
    fn key_pair_record_serialization_skips_unknown_fields() {
        let record = KeyPairRecord::new(KeyPairName::try_from("ec2_key").unwrap());
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"key_name":"ec2_key"}"#
        );
    }
}
