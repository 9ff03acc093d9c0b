use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use anyhow::Context;
use clap::{
    Parser, ValueEnum, ValueHint,
    builder::{Styles, styling::AnsiColor},
};
use regex::Regex;

use crate::{package::LinkType, plan::RunOptions, utils::expand_into_pathbuf};

/// Get the color styles for the CLI help menu.
fn __cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default())
        .usage(AnsiColor::Yellow.on_default())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Parses a `&str` slice as a [`PathBuf`], expand `~` and environment variables and clean the path.
///
/// # Arguments
///
/// - `s` - `&str` slice.
fn cli_parse_pathbuf(s: &str) -> Result<PathBuf, String> {
    expand_into_pathbuf(s)
        .and_then(|p| {
            dunce::canonicalize(&p)
                .with_context(|| format!("failed to canonicalize {}", p.display()))
        })
        .map_err(|err| err.to_string())
}

/// Override the color setting. Default is [`ColorOverride::Auto`].
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ColorOverride {
    /// Always display color (i.e. force it).
    Always,
    /// Automatically determine if color should be used or not.
    Auto,
    /// Never display color.
    Never,
}

/// symfarm mirrors package trees into a target tree with symlinks, like GNU stow.
#[derive(Clone, Debug, Parser)]
#[command(about, long_about = None, styles=__cli_styles(), version)]
#[allow(clippy::struct_excessive_bools)]
pub struct FarmCli {
    /// Package (directory) to farm into the target. Specify multiple directories to farm multiple.
    #[arg(required = true, value_parser = cli_parse_pathbuf, value_hint = ValueHint::DirPath)]
    pub packages: Vec<PathBuf>,

    /// When to show color.
    #[arg(long = "color", default_value_t = ColorOverride::default(), value_name = "WHEN")]
    pub color_override: ColorOverride,
    /// Delete the links and directories a previous run created, instead of creating them.
    #[arg(short = 'D', long)]
    pub delete: bool,
    /// Dry run; log what would be done, but mutate nothing.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Ignore file names with a regex. May be specified multiple times.
    ///
    /// Regex (regular expression) patterns are different from glob patterns. See regex(7) for
    /// an explanation of syntax and <https://regex101.com/> for testing regex patterns.
    #[arg(short, long = "ignore", value_name = "REGEX")]
    pub ignore_pats: Vec<Regex>,
    /// Type of symlink to create.
    #[arg(short, long, value_name = "TYPE")]
    pub link_type: Option<LinkType>,
    /// Delete first, then create again; useful after pruning the package.
    #[arg(short = 'R', long, conflicts_with = "delete")]
    pub restow: bool,
    /// Save the current CLI parameters to a config file. WARNING: overwrites any existing file!
    ///
    /// When specified in conjunction with `--save-os-config`, both options are respected and two
    /// configs are saved: a generic config AND an OS-specific config. The configs will be
    /// identical.
    #[arg(short = 's', long)]
    pub save_config: bool,
    /// Save the CLI parameters to an OS-specific config instead of a generic one.
    ///
    /// The OS marker is determined at compile time. A list of all possible OS values is
    /// available in the Rust docs: <https://doc.rust-lang.org/std/env/consts/constant.OS.html>
    #[arg(short = 'o', long)]
    pub save_os_config: bool,
    /// Directory to farm the package(s) into. [default: ~]
    #[arg(short, long, value_parser = cli_parse_pathbuf, value_hint = ValueHint::DirPath)]
    pub target: Option<PathBuf>,
    /// Log one line per created or removed entry.
    #[arg(short, long)]
    pub verbose: bool,
}

impl FarmCli {
    /// Collapse the action flags into [`RunOptions`] for the engine: plain
    /// invocations create, `--delete` deletes, `--restow` does both (delete
    /// pass first).
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            create: !self.delete || self.restow,
            delete: self.delete || self.restow,
            verbose: self.verbose,
            dry_run: self.dry_run,
        }
    }
}

impl Default for ColorOverride {
    fn default() -> Self {
        Self::Auto
    }
}

impl Display for ColorOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColorOverride::Always => "always",
            ColorOverride::Auto => "auto",
            ColorOverride::Never => "never",
        };

        write!(f, "{s}")
    }
}

#[cfg(test)]
impl FarmCli {
    pub(crate) fn new<P: Into<PathBuf>>(package: P) -> Self {
        Self {
            packages: vec![package.into()],
            color_override: ColorOverride::default(),
            delete: false,
            dry_run: false,
            ignore_pats: Vec::new(),
            link_type: None,
            restow: false,
            save_config: false,
            save_os_config: false,
            target: None,
            verbose: false,
        }
    }
}
