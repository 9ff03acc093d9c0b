#![warn(clippy::all, clippy::pedantic)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use symfarm::cli::{ColorOverride, FarmCli};
use symfarm::error::FarmError;
use symfarm::package::{PackageConfig, error::ConfigRead};
use symfarm::plan::FarmPlan;
use symfarm::utils::replace_home_with_tilde;

/// Farm one package into its target: read/merge the config, plan, execute.
///
/// # Arguments
///
/// - `package` - Package directory to farm.
fn farm(package: &Path, cli: &FarmCli) -> Result<(), FarmError> {
    let config = match PackageConfig::init(package, cli) {
        Ok(config) => config,
        Err(ConfigRead::FileNotFound(_)) => {
            // packages without a config are farmed with defaults + CLI flags
            let mut config = PackageConfig::new(package);
            config.merge_with_cli(cli);
            config
        }
        Err(err) => return Err(err.into()),
    };

    #[cfg(debug_assertions)]
    println!("{config:#?}");

    // OS config always takes precedence
    if cli.save_os_config {
        config.save_to_os_package()?;
    }

    if cli.save_config {
        config.save_to_package()?;
    }

    let plan = FarmPlan::plan(&config)?;
    plan.execute(cli.run_options())?;

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = FarmCli::parse();

    #[cfg(debug_assertions)]
    println!("cli={cli:#?}");

    let FarmCli {
        ref packages,
        color_override,
        dry_run,
        ..
    } = cli;

    match color_override {
        ColorOverride::Always => colored::control::set_override(true),
        ColorOverride::Auto => colored::control::unset_override(),
        ColorOverride::Never => colored::control::set_override(false),
    }

    if dry_run {
        eprintln!("{}: dry run, nothing will be changed", "warn".yellow());
    }

    for package in packages {
        let canon_package = dunce::canonicalize(package)?;
        farm(&canon_package, &cli).with_context(|| {
            format!("failed to farm {}", replace_home_with_tilde(&canon_package))
        })?;
    }

    Ok(())
}
