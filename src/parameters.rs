use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, ValueEnum};
use http::Uri;
use thiserror::Error;

use crate::provider::ec2::Ec2ProviderConfig;
use crate::provider::{DEFAULT_REGION, KeyAlgorithm};
use crate::{InvalidKeyPairName, KeyPairName};

/// Name of the key pair when none is given.
pub const DEFAULT_KEY_PAIR_NAME: &str = "ec2_key";

#[derive(Error, Debug)]
pub enum ParametersError {
    #[error("invalid key pair name: {0}")]
    InvalidKeyPairName(#[from] InvalidKeyPairName),
    #[error("invalid endpoint url `{0}`: {1}")]
    InvalidEndpointUrl(String, String),
}

#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// Name of the key pair, also used as the private key file name
    #[arg(long, short, default_value = DEFAULT_KEY_PAIR_NAME)]
    key_name: String,

    /// Region of the EC2 account
    #[arg(long, short, default_value = DEFAULT_REGION)]
    region: String,

    /// Named profile from the shared AWS config and credentials files
    #[arg(long)]
    profile: Option<String>,

    /// Custom EC2 endpoint, e.g. a local emulator. Must be an absolute URL.
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Directory where the private key is saved. Defaults to `~/.ssh`.
    #[arg(long)]
    key_dir: Option<PathBuf>,

    /// Type of key pair to create when it does not exist yet
    #[arg(long, value_enum, default_value_t = KeyTypeChoice::Rsa)]
    key_type: KeyTypeChoice,

    /// Select how the result is printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output_format: OutputFormat,

    /// Log debug information to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum KeyTypeChoice {
    #[value(name = "rsa")]
    Rsa,
    #[value(name = "ed25519")]
    Ed25519,
}

impl From<KeyTypeChoice> for KeyAlgorithm {
    fn from(value: KeyTypeChoice) -> Self {
        match value {
            KeyTypeChoice::Rsa => KeyAlgorithm::Rsa,
            KeyTypeChoice::Ed25519 => KeyAlgorithm::Ed25519,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Human readable status line
    #[value(name = "Plain")]
    Plain,
    /// Outcome details in json format
    #[value(name = "Json")]
    Json,
}

/// Everything needed to run the provisioning, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionerConfig {
    pub key_name: KeyPairName,
    pub key_algorithm: KeyAlgorithm,
    pub provider: Ec2ProviderConfig,
    /// `None` stands for the `.ssh` folder in the home directory.
    pub key_dir: Option<PathBuf>,
}

impl TryFrom<ProvisionArgs> for ProvisionerConfig {
    type Error = ParametersError;

    fn try_from(args: ProvisionArgs) -> Result<Self, Self::Error> {
        let key_name = KeyPairName::try_from(args.key_name)?;
        let endpoint_url = args
            .endpoint_url
            .map(|url| validate_endpoint_url(&url).map(|_| url))
            .transpose()?;

        Ok(ProvisionerConfig {
            key_name,
            key_algorithm: args.key_type.into(),
            provider: Ec2ProviderConfig {
                region: args.region,
                profile: args.profile,
                endpoint_url,
            },
            key_dir: args.key_dir,
        })
    }
}

fn validate_endpoint_url(url: &str) -> Result<Uri, ParametersError> {
    let uri = Uri::from_str(url)
        .map_err(|e| ParametersError::InvalidEndpointUrl(url.to_string(), e.to_string()))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(ParametersError::InvalidEndpointUrl(
            url.to_string(),
            String::from("scheme and host are required"),
        ));
    }
    Ok(uri)
}
