use std::path::PathBuf;

use keystore::{Bridge, Pkcs12Provider};
use tracing::info;

use crate::error::Result;

#[derive(clap::Args)]
pub(crate) struct Config {
    /// Keystore filename
    #[arg(short, long)]
    keystore: PathBuf,

    /// Keystore password
    #[arg(short, long)]
    password: String,

    /// PEM output filename
    #[arg(short, long, value_name = "FILENAME")]
    out: PathBuf,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let bridge = Bridge::open(Pkcs12Provider, &config.keystore, &config.password)?;
    let bundle = bridge.to_bundle();
    bundle.write(&config.out)?;
    info!(
        "wrote {} blocks to {}",
        bundle.blocks()?.len(),
        config.out.display()
    );
    Ok(())
}
