use std::fmt;

use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::{BehaviorVersion, Region};
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::{KeyFormat, KeyType};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::KeyPairName;
use crate::key::PrivateKeyMaterial;
use crate::provider::{
    CreatedKeyPair, DEFAULT_REGION, KeyAlgorithm, KeyPairProvider, KeyPairRecord, ProviderError,
};

/// Error code EC2 returns when describing a key pair that does not exist.
const KEY_PAIR_NOT_FOUND_CODE: &str = "InvalidKeyPair.NotFound";

/// Settings used to build the EC2 client. Credentials are resolved by the AWS default chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Ec2ProviderConfig {
    pub region: String,
    /// Named profile of the shared AWS config files.
    pub profile: Option<String>,
    /// Overrides the EC2 endpoint, for instance to target a local emulator.
    pub endpoint_url: Option<String>,
}

impl Default for Ec2ProviderConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            endpoint_url: None,
        }
    }
}

/// [`KeyPairProvider`] backed by the AWS EC2 API.
///
/// The SDK is async, so every call is driven to completion on a current-thread runtime owned by
/// the provider, keeping the provider itself blocking.
pub struct Ec2Provider {
    client: Client,
    runtime: Runtime,
}

impl fmt::Debug for Ec2Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ec2Provider")
            .field("region", &self.client.config().region())
            .finish()
    }
}

impl Ec2Provider {
    /// Builds the client from the environment (credentials, shared config files) and `config`.
    pub fn from_env(config: &Ec2ProviderConfig) -> Result<Self, ProviderError> {
        let runtime = current_thread_runtime()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = runtime.block_on(loader.load());

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }

    /// Builds the client from an explicit EC2 client configuration.
    pub fn from_conf(conf: aws_sdk_ec2::Config) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::from_conf(conf),
            runtime: current_thread_runtime()?,
        })
    }
}

impl KeyPairProvider for Ec2Provider {
    fn describe_key_pair(&self, name: &KeyPairName) -> Result<KeyPairRecord, ProviderError> {
        debug!("describing key pair {name}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_key_pairs()
                    .key_names(name.as_str())
                    .send(),
            )
            .map_err(|err| {
                if err.code() == Some(KEY_PAIR_NOT_FOUND_CODE) {
                    ProviderError::NotFound(name.to_string())
                } else {
                    into_provider_error(err)
                }
            })?;

        let key_pair = output
            .key_pairs()
            .first()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))?;

        Ok(KeyPairRecord {
            key_pair_id: key_pair.key_pair_id().map(String::from),
            key_fingerprint: key_pair.key_fingerprint().map(String::from),
            key_type: key_pair.key_type().map(|t| t.as_str().to_string()),
            ..KeyPairRecord::new(name.clone())
        })
    }

    fn create_key_pair(
        &self,
        name: &KeyPairName,
        algorithm: KeyAlgorithm,
    ) -> Result<CreatedKeyPair, ProviderError> {
        debug!("creating {algorithm} key pair {name}");
        let key_type = match algorithm {
            KeyAlgorithm::Rsa => KeyType::Rsa,
            KeyAlgorithm::Ed25519 => KeyType::Ed25519,
        };

        let output = self
            .runtime
            .block_on(
                self.client
                    .create_key_pair()
                    .key_name(name.as_str())
                    .key_type(key_type)
                    .key_format(KeyFormat::Pem)
                    .send(),
            )
            .map_err(into_provider_error)?;

        let private_key = output
            .key_material()
            .map(PrivateKeyMaterial::from)
            .ok_or_else(|| ProviderError::MissingKeyMaterial(name.to_string()))?;

        Ok(CreatedKeyPair {
            record: KeyPairRecord {
                key_pair_id: output.key_pair_id().map(String::from),
                key_fingerprint: output.key_fingerprint().map(String::from),
                key_type: Some(algorithm.to_string()),
                ..KeyPairRecord::new(name.clone())
            },
            private_key,
        })
    }
}

fn current_thread_runtime() -> Result<Runtime, ProviderError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ProviderError::Runtime(e.to_string()))
}

fn into_provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    match err.as_service_error() {
        Some(service_err) => ProviderError::Api {
            code: service_err.code().unwrap_or("Unknown").to_string(),
            message: service_err.message().unwrap_or_default().to_string(),
        },
        None => ProviderError::Transport(DisplayErrorContext(&err).to_string()),
    }
}
