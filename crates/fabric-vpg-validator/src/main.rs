//! fabric-vpg-validator - Fabric VPG Validation Tool
//!
//! Entry point for the validator.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use fabric_vpg_validator::config::{Args, ValidatorConfig};
use fabric_vpg_validator::logging::init_logging;
use fabric_vpg_validator::{
    FabricAggregator, IdentityResolver, InterfaceResolver, JsonVpgSource, NameTable, Reporter,
    Statistics,
};

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("fabric-vpg-validator: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = ValidatorConfig::from_args(args).context("failed to load configuration")?;
    config.validate()?;

    let log_file = config.log_file();
    init_logging(&config.logging, &log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    info!("--- Starting fabric-vpg-validator {} ---", env!("CARGO_PKG_VERSION"));
    info!("Logging to {}", log_file.display());

    let vpg_file = config
        .source
        .vpg_file
        .as_ref()
        .context("no VPG export configured")?;
    let source = JsonVpgSource::new(vpg_file);
    let result = FabricAggregator::scan_source(&source)
        .with_context(|| format!("failed to scan {}", vpg_file.display()))?;

    match &config.output.to_json {
        Some(path) => result
            .write_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let resolver: Box<dyn InterfaceResolver> = match &config.source.names_file {
                Some(path) => Box::new(
                    NameTable::from_path(path)
                        .with_context(|| format!("failed to load names from {}", path.display()))?,
                ),
                None => Box::new(IdentityResolver),
            };
            Reporter::new(resolver.as_ref()).emit(&result)?;
        }
    }

    println!();
    println!("{}", Statistics::from(&result.stats));

    Ok(())
}
