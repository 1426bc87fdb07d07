use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::KeyPairName;

pub mod local;

/// Extension of the file the private key material is stored in.
pub const PRIVATE_KEY_FILE_EXTENSION: &str = "pem";

/// Private key material returned by the provider when a key pair is created.
///
/// The provider only hands it out once, so it is never serialized or printed and it is wiped
/// from memory when dropped.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial(String);

impl PrivateKeyMaterial {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl<S: AsRef<str>> From<S> for PrivateKeyMaterial {
    fn from(material: S) -> Self {
        PrivateKeyMaterial(material.as_ref().to_string())
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyMaterial: redacted")
    }
}

/// Errors that can occur while storing private key material.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// The user home directory, used to build the default key directory, is unknown.
    #[error("unable to determine the home directory")]
    HomeDirectoryNotFound,
    /// The directory holding the key files could not be created.
    #[error("unable to create key directory `{0}`: `{1}`")]
    UnableToCreateDirectory(PathBuf, String),
    /// The private key file could not be created.
    #[error("unable to create private key file `{0}`: `{1}`")]
    UnableToCreateKeyFile(PathBuf, String),
    /// Writing the private key into its file failed.
    #[error("unable to write private key file `{0}`: `{1}`")]
    UnableToWriteKeyFile(PathBuf, String),
}

/// Persists the private key material of newly created key pairs.
pub trait KeyStore {
    /// Location where the private key of `name` is (or would be) stored.
    fn path_for(&self, name: &KeyPairName) -> PathBuf;

    /// Stores `material` as the private key of `name`, returning where it was written.
    fn persist(
        &self,
        name: &KeyPairName,
        material: &PrivateKeyMaterial,
    ) -> Result<PathBuf, KeyStoreError>;
}
