use std::{fs::File, path::PathBuf};

use keystore::{Bridge, MergeReport, Pkcs12Provider, Provider};
use pem::bundle::Bundle;
use tracing::{debug, info, warn};

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

    /// Overwrite an existing keystore together with --new
    #[arg(long, requires = "new")]
    force: bool,

    /// PEM bundle files to import
    #[arg(short, long, value_name = "FILENAME", num_args = 1..)]
    certs: Vec<PathBuf>,

    /// Other keystores to merge, as FILE:PASSWORD
    #[arg(long = "container", value_name = "FILE:PASSWORD")]
    containers: Vec<String>,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    if config.certs.is_empty() && config.containers.is_empty() {
        return Err(Error::from("nothing to import; pass --certs or --container"));
    }
    if config.new && config.keystore.exists() && !config.force {
        return Err(Error::Message(format!(
            "{} already exists; pass --force to overwrite",
            config.keystore.display()
        )));
    }

    let mut bridge = if config.new {
        Bridge::create(Pkcs12Provider, &config.keystore, &config.password)
    } else {
        Bridge::open(Pkcs12Provider, &config.keystore, &config.password)?
    };

    let mut batch = bridge.begin_batch();

    for path in &config.certs {
        let bundle = Bundle::open(path);
        let report = batch.merge_certificates(&bundle.blocks()?)?;
        log_report(&path.display().to_string(), &report);
    }

    for source in &config.containers {
        let (path, password) = source
            .split_once(':')
            .ok_or_else(|| Error::from("container import must be given as FILE:PASSWORD"))?;
        let mut file = File::open(path)?;
        let container = Pkcs12Provider.load(&mut file, password)?;
        let report = batch.merge_container(&container)?;
        log_report(path, &report);
    }

    batch.end_batch()?;
    Ok(())
}

fn log_report(source: &str, report: &MergeReport) {
    for warning in &report.warnings {
        warn!("{}: {}", source, warning);
    }
    for alias in &report.added {
        debug!("added '{}'", alias);
    }
    info!("{}: {} entries added", source, report.added.len());
}
