use std::path::{Path, PathBuf};

use keystore::{Bridge, Pkcs12Provider};
use pem::{Pem, bundle::Bundle};
use tracing::info;

use crate::error::{Error, Result};

#[derive(clap::Args)]
pub(crate) struct Config {
    /// Keystore filename
    #[arg(short, long)]
    keystore: PathBuf,

    /// Keystore password
    #[arg(short, long)]
    password: String,

    /// Create a new keystore instead of appending to an existing one
    #[arg(short, long)]
    new: bool,

    /// PEM file holding the private key
    #[arg(long, value_name = "FILENAME")]
    key: PathBuf,

    /// PEM file holding the matching certificate
    #[arg(long, value_name = "FILENAME")]
    cert: PathBuf,

    /// Alias to store the key under
    #[arg(short, long)]
    alias: String,

    /// Password of an encrypted private key
    #[arg(long)]
    key_password: Option<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let key_block = first_block(&config.key, Pem::is_key)?
        .ok_or_else(|| Error::Message(format!("no private key in {}", config.key.display())))?;
    let cert_block = first_block(&config.cert, Pem::is_cert)?
        .ok_or_else(|| Error::Message(format!("no certificate in {}", config.cert.display())))?;

    let mut bridge = if config.new {
        Bridge::create(Pkcs12Provider, &config.keystore, &config.password)
    } else {
        Bridge::open(Pkcs12Provider, &config.keystore, &config.password)?
    };

    bridge.merge_key(
        &key_block,
        &cert_block,
        &config.alias,
        config.key_password.as_deref(),
    )?;
    info!("stored key entry '{}'", config.alias);
    Ok(())
}

fn first_block(path: &Path, want: fn(&Pem) -> bool) -> Result<Option<Pem>> {
    Ok(Bundle::open(path).blocks()?.into_iter().find(want))
}
