use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use ec2_keypair::key::local::LocalKeyStore;
use ec2_keypair::parameters::{OutputFormat, ProvisionArgs, ProvisionerConfig};
use ec2_keypair::provider::ec2::Ec2Provider;
use ec2_keypair::provisioner::Provisioner;
use tracing::Level;

/// Ensures an EC2 key pair exists, saving its private key locally when it gets created.
#[derive(Parser, Debug)]
#[command(name = "ec2-keypair-cli")]
struct Cli {
    #[command(flatten)]
    args: ProvisionArgs,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(Cli { args }: Cli) -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let output_format = args.output_format;
    let config = ProvisionerConfig::try_from(args)?;

    let key_store = match config.key_dir {
        Some(dir) => LocalKeyStore::new(dir),
        None => LocalKeyStore::in_home_ssh_dir()?,
    };
    let provider = Ec2Provider::from_env(&config.provider)?;

    let outcome = Provisioner::new(provider, key_store)
        .with_key_algorithm(config.key_algorithm)
        .ensure_key_pair(&config.key_name)?;

    match output_format {
        OutputFormat::Plain => println!("{outcome}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}
