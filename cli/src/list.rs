use std::path::PathBuf;

use keystore::{Bridge, Pkcs12Provider};

use crate::error::Result;

#[derive(clap::Args)]
pub(crate) struct Config {
    /// Keystore filename
    #[arg(short, long)]
    keystore: PathBuf,

    /// Keystore password
    #[arg(short, long)]
    password: String,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let bridge = Bridge::open(Pkcs12Provider, &config.keystore, &config.password)?;
    for (alias, dn) in bridge.list() {
        println!("{}: {}", alias, dn);
    }
    Ok(())
}
