use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::KeyPairName;
use crate::key::{KeyStore, KeyStoreError};
use crate::provider::{CreatedKeyPair, KeyAlgorithm, KeyPairProvider, KeyPairRecord, ProviderError};

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("looking up key pair: {0}")]
    Lookup(ProviderError),
    #[error("creating key pair: {0}")]
    Creation(ProviderError),
    /// The key pair exists remotely but its private key is lost: the provider only returns it
    /// once, so there is nothing to retry.
    #[error(
        "key pair `{key_name}` was created but its private key could not be saved and cannot be retrieved again, delete the key pair before retrying: {source}"
    )]
    Persist {
        key_name: KeyPairName,
        key_pair_id: Option<String>,
        source: KeyStoreError,
    },
    /// The provider created the key pair without returning its private key.
    #[error(
        "key pair `{0}` was created but the provider did not return its private key, which cannot be retrieved again, delete the key pair before retrying"
    )]
    MissingKeyMaterial(KeyPairName),
}

/// Terminal state of [`Provisioner::ensure_key_pair`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The key pair was already there, nothing was changed.
    AlreadyExists(KeyPairRecord),
    /// The key pair was created and its private key stored at `path`.
    Created {
        #[serde(flatten)]
        record: KeyPairRecord,
        path: PathBuf,
    },
}

impl Outcome {
    pub fn record(&self) -> &KeyPairRecord {
        match self {
            Outcome::AlreadyExists(record) | Outcome::Created { record, .. } => record,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AlreadyExists(record) => {
                write!(f, "Key pair '{}' already exists.", record.key_name)
            }
            Outcome::Created { record, path } => write!(
                f,
                "Key pair '{}' created and saved as '{}'",
                record.key_name,
                path.display()
            ),
        }
    }
}

/// Makes sure a key pair exists in the provider, creating it and storing its private key when
/// it does not.
pub struct Provisioner<P, S>
where
    P: KeyPairProvider,
    S: KeyStore,
{
    provider: P,
    key_store: S,
    key_algorithm: KeyAlgorithm,
}

impl<P, S> Provisioner<P, S>
where
    P: KeyPairProvider,
    S: KeyStore,
{
    pub fn new(provider: P, key_store: S) -> Self {
        Self {
            provider,
            key_store,
            key_algorithm: KeyAlgorithm::default(),
        }
    }

    /// Algorithm used for key pairs created from now on.
    pub fn with_key_algorithm(self, key_algorithm: KeyAlgorithm) -> Self {
        Self {
            key_algorithm,
            ..self
        }
    }

    /// Existing key pairs are left untouched, their private key is never fetched or rewritten.
    ///
    /// Two invocations racing on the same name may both see it missing; the provider rejects
    /// the second creation and that error is returned as is.
    pub fn ensure_key_pair(&self, name: &KeyPairName) -> Result<Outcome, ProvisionError> {
        match self.provider.describe_key_pair(name) {
            Ok(record) => {
                info!("key pair {name} already exists");
                return Ok(Outcome::AlreadyExists(record));
            }
            Err(ProviderError::NotFound(_)) => {
                debug!("key pair {name} not found, creating it");
            }
            Err(err) => return Err(ProvisionError::Lookup(err)),
        }

        let CreatedKeyPair {
            record,
            private_key,
        } = self
            .provider
            .create_key_pair(name, self.key_algorithm)
            .map_err(|err| match err {
                ProviderError::MissingKeyMaterial(_) => {
                    ProvisionError::MissingKeyMaterial(name.clone())
                }
                err => ProvisionError::Creation(err),
            })?;

        let path = self
            .key_store
            .persist(name, &private_key)
            .map_err(|source| ProvisionError::Persist {
                key_name: name.clone(),
                key_pair_id: record.key_pair_id.clone(),
                source,
            })?;

        info!("key pair {name} created, private key saved to {}", path.display());
        Ok(Outcome::Created { record, path })
    }
}
