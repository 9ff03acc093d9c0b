use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use clap::ValueEnum;
use const_format::formatc;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de::Error};

use crate::{cli::FarmCli, constants::BASE_DIRS, utils::expand_into_pathbuf};

pub mod error;

/// Utility function to deserialize a [`PathBuf`] while expanding environment variables and `~`.
///
/// # Arguments
///
/// - `d` - Argument to deserialize, expected to be `String`.
fn __de_pathbuf<'de, D>(d: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    // NOTE: don't use &str or deserializing will fail for strings
    let s: String = Deserialize::deserialize(d)?;
    expand_into_pathbuf(s).map_err(D::Error::custom)
}

/// Utility function returning the default value for [`PackageConfig::ignore_pats`], which is a
/// Regex for the config file, `git` files, and some `.md` files.
fn __ignore_pats_default() -> Vec<Regex> {
    static DEFAULT_REGEX_VEC: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            Regex::new(r"^\.symfarm(\.[^.]+)?\.toml$").unwrap(),
            Regex::new(r"^\.git.*$").unwrap(),
            Regex::new(r"^(README|LICEN[CS]E|COPYING).*$").unwrap(),
        ]
    });

    DEFAULT_REGEX_VEC.clone()
}

/// Utility function returning the default value for [`PackageConfig::target`], which is the users
/// home directory.
#[cfg(not(test))]
fn __target_default() -> PathBuf {
    BASE_DIRS.home_dir().to_path_buf()
}

/// Utility function returning the default **_test_** value for [`PackageConfig::target`], which is
/// created from [`crate::test_utils::TEST_TARGET`].
#[cfg(test)]
fn __target_default() -> PathBuf {
    PathBuf::from(crate::test_utils::TEST_TARGET)
}

/// Describes what kind of referent the farmed symlinks point to.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
pub enum LinkType {
    /// A symlink pointing to the absolute source path.
    #[value(name = "absolute")]
    Absolute,
    /// A symlink pointing to the source path relative to the link's parent.
    #[value(name = "relative")]
    Relative,
}

/// A package configuration. Can de/serialize with [`serde`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PackageConfig {
    /// The path of the package this config is for. This is also the directory where the config
    /// file is located.
    #[serde(skip)]
    pub package: PathBuf,

    /// The target directory.
    #[serde(default = "__target_default", deserialize_with = "__de_pathbuf")]
    pub target: PathBuf,
    /// [`Regex`]'s that determine which file names to ignore.
    #[serde(default = "__ignore_pats_default", with = "serde_regex")]
    pub ignore_pats: Vec<Regex>,
    /// What kind of symlink to create.
    #[serde(default = "LinkType::default")]
    pub link_type: LinkType,
}

impl Default for LinkType {
    fn default() -> Self {
        Self::Absolute
    }
}

impl Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkType::Absolute => "absolute symlink",
            LinkType::Relative => "relative symlink",
        };
        write!(f, "{s}")
    }
}

impl Eq for PackageConfig {}

impl PartialEq for PackageConfig {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package
            && self.target == other.target
            && self.ignore_pats.len() == other.ignore_pats.len()
            && self
                .ignore_pats
                .iter()
                .zip(&other.ignore_pats)
                .all(|(l, r)| l.as_str() == r.as_str())
            && self.link_type == other.link_type
    }
}

impl TryFrom<PathBuf> for PackageConfig {
    type Error = error::ConfigRead;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        let config_path = value;

        if !config_path
            .try_exists()
            .map_err(|err| error::ConfigRead::Io {
                source: err,
                path: config_path.clone(),
            })?
        {
            return Err(error::ConfigRead::FileNotFound(config_path));
        }

        let config_str =
            &fs::read_to_string(&config_path).map_err(|err| error::ConfigRead::Io {
                source: err,
                path: config_path.clone(),
            })?;
        let mut parsed_config: Self = toml::from_str(config_str)?;
        parsed_config.package = config_path
            .parent()
            .unwrap_or_else(|| panic!("file '{}' has no parent", config_path.display()))
            .to_path_buf();

        Ok(parsed_config)
    }
}

impl PackageConfig {
    /// File name this struct will serialize to by default.
    const fn __serde_file_name() -> &'static str {
        ".symfarm.toml"
    }

    /// File name this struct will serialize to when saving to an OS-specific config.
    const fn __serde_os_file_name() -> &'static str {
        formatc!(".symfarm.{}.toml", std::env::consts::OS)
    }

    /// Create a new [`PackageConfig`] with the given `package` and default values.
    ///
    /// # Arguments
    ///
    /// - `package` - The package this config is for.
    pub fn new<P: Into<PathBuf>>(package: P) -> Self {
        Self {
            package: package.into(),
            target: __target_default(),
            ignore_pats: __ignore_pats_default(),
            link_type: LinkType::default(),
        }
    }

    /// Create a new [`PackageConfig`] from the given `package` and `target` paths and default
    /// values for everything else.
    ///
    /// # Arguments
    ///
    /// - `package` - The package directory to create a config for.
    /// - `target` - The target directory of the new config.
    #[cfg(test)]
    pub fn new_with_target<P: Into<PathBuf>, Q: Into<PathBuf>>(package: P, target: Q) -> Self {
        Self {
            package: package.into(),
            target: target.into(),
            ignore_pats: __ignore_pats_default(),
            link_type: LinkType::default(),
        }
    }

    /// Try to read a config file from the given `package` directory.
    ///
    /// # Arguments
    ///
    /// - `package` - Directory to read from
    ///
    /// # Errors
    ///
    /// An error will be returned if the config file does not exist, cannot be read, or contains
    /// malformed TOML data.
    pub fn try_from_package<P: Into<PathBuf>>(package: P) -> Result<Self, error::ConfigRead> {
        let package: PathBuf = package.into();
        // OS-specific configs always take precedence
        let os_toml_path = package.join(Self::__serde_os_file_name());
        let toml_path = if os_toml_path.try_exists().unwrap_or(false) {
            os_toml_path
        } else {
            package.join(Self::__serde_file_name())
        };

        Self::try_from(toml_path)
    }

    /// Read a config from the `package` directory and merge it with [`FarmCli`] flags of the
    /// same name.
    ///
    /// # Errors
    ///
    /// See [`PackageConfig::try_from_package`].
    pub fn init<P: Into<PathBuf>>(package: P, cli: &FarmCli) -> Result<Self, error::ConfigRead> {
        let package = package.into();
        let mut config = Self::try_from_package(package)?;
        config.merge_with_cli(cli);

        Ok(config)
    }

    pub fn merge_with_cli(&mut self, cli: &FarmCli) {
        self.ignore_pats.extend_from_slice(&cli.ignore_pats[..]);
        if let Some(link_type) = cli.link_type {
            self.link_type = link_type;
        }
        if let Some(target) = cli.target.as_ref() {
            self.target.clone_from(target);
        }
    }

    /// Get the disk path for this `PackageConfig`.
    #[inline]
    fn disk_path(&self) -> PathBuf {
        self.package.join(Self::__serde_file_name())
    }

    fn os_disk_path(&self) -> PathBuf {
        self.package.join(Self::__serde_os_file_name())
    }

    /// Utility function for saving this [`PackageConfig`] to a given path.
    ///
    /// # Arguments
    ///
    /// - `config_path` - [`Path`] to serialize this config to.
    fn __inner_save_to_package<P: AsRef<Path>>(
        &self,
        config_path: P,
    ) -> Result<(), error::ConfigWrite> {
        let config_path = config_path.as_ref();
        let config_str = toml::to_string_pretty(self)?;
        // WARN: this truncates the existing file. be careful!
        fs::write(config_path, config_str).map_err(|err| error::ConfigWrite::Io {
            source: err,
            path: config_path.to_path_buf(),
        })?;
        Ok(())
    }

    /// Save this `PackageConfig` to a package directory.
    ///
    /// # Errors
    ///
    /// An error will be returned if the config fails to serialize or the file cannot be
    /// written to for some reason.
    pub fn save_to_package(&self) -> Result<(), error::ConfigWrite> {
        self.__inner_save_to_package(self.disk_path())
    }

    /// Save this `PackageConfig` to a package as an OS-specific config. This uses
    /// [`std::env::consts::OS`] at runtime to determine which system the user is on.
    pub fn save_to_os_package(&self) -> Result<(), error::ConfigWrite> {
        self.__inner_save_to_package(self.os_disk_path())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use crate::test_utils::{TEST_TARGET, make_tmp_tree};

    use super::*;

    #[test]
    fn test_try_from_package() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let package_path = package.path();
        PackageConfig::new(package_path)
            .save_to_package()
            .context("failed to save test config")?;
        let conf = PackageConfig::try_from_package(package_path)
            .context("failed to create package config from package")?;

        assert_eq!(conf.package, package_path);
        assert_eq!(conf.target, PathBuf::from(TEST_TARGET));
        let expected_ignore_pats = __ignore_pats_default();
        assert!(
            conf.ignore_pats.len() == expected_ignore_pats.len()
                && conf
                    .ignore_pats
                    .iter()
                    .zip(expected_ignore_pats)
                    .all(|(a, b)| a.as_str() == b.as_str())
        );
        assert_eq!(conf.link_type, LinkType::Absolute);

        Ok(())
    }

    #[test]
    fn test_try_from_package_missing_config() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let res = PackageConfig::try_from_package(package.path());

        assert!(matches!(res, Err(error::ConfigRead::FileNotFound(_))));

        Ok(())
    }

    #[test]
    fn test_try_from_os_package() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let package_path = package.path();
        let expected_target = PathBuf::from("/some/other/test/target");
        PackageConfig::new_with_target(package_path, expected_target.clone())
            .save_to_os_package()
            .context("failed to save test OS config")?;
        // generic config with a different target; the OS config should win
        PackageConfig::new(package_path)
            .save_to_package()
            .context("failed to save test config")?;

        let conf = PackageConfig::try_from_package(package_path)
            .context("failed to create package config from package")?;

        assert_eq!(
            expected_target, conf.target,
            "OS-specific config should take precedence"
        );

        Ok(())
    }

    #[test]
    fn test_init() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let package_path = package.path();
        PackageConfig::new(package_path)
            .save_to_package()
            .context("failed to save test config")?;
        let mut cli = FarmCli::new(package_path);
        // change EVERY value from the default for a comprehensive test
        cli.link_type = Some(LinkType::Relative);
        let test_regex = Regex::new("^test$").context("failed to compile test Regex")?;
        cli.ignore_pats = vec![test_regex];
        let expected_target = PathBuf::from("/path/to/test/target");
        cli.target = Some(expected_target.clone());

        let conf = PackageConfig::init(package_path, &cli)
            .context("failed to create package config from package")?;

        assert_eq!(conf.package, package_path);
        assert_eq!(conf.target, expected_target);
        let expected_ignore_pats = __ignore_pats_default()
            .into_iter()
            .chain(cli.ignore_pats.clone())
            .collect::<Vec<Regex>>();
        assert!(
            conf.ignore_pats.len() == expected_ignore_pats.len()
                && conf
                    .ignore_pats
                    .iter()
                    .zip(expected_ignore_pats)
                    .all(|(a, b)| a.as_str() == b.as_str())
        );
        assert_eq!(conf.link_type, LinkType::Relative);

        Ok(())
    }

    #[test]
    fn test_save_to_package() -> anyhow::Result<()> {
        let package = tempfile::tempdir().context("failed to make test package")?;
        let conf = PackageConfig::new(package.path());
        conf.save_to_package()
            .context("failed to save config to test package")?;
        let conf_path = package.path().join(PackageConfig::__serde_file_name());
        let expected_conf_str =
            toml::to_string_pretty(&conf).context("failed to serialize test config")?;
        let actual_conf_str =
            std::fs::read_to_string(&conf_path).context("failed to read test config")?;

        assert!(
            conf_path
                .try_exists()
                .context("failed to verify existence of test config")?,
            "test config file could not be found"
        );
        assert_eq!(
            expected_conf_str, actual_conf_str,
            "contents of test config file do not match serialized test config"
        );

        Ok(())
    }

    #[test]
    fn test_save_to_os_package() -> anyhow::Result<()> {
        let package = tempfile::tempdir().context("failed to make test package")?;
        let conf = PackageConfig::new(package.path());
        conf.save_to_os_package()
            .context("failed to save config to test package")?;
        let conf_path = package.path().join(PackageConfig::__serde_os_file_name());
        let expected_conf_str =
            toml::to_string_pretty(&conf).context("failed to serialize test config")?;
        let actual_conf_str =
            std::fs::read_to_string(&conf_path).context("failed to read test config")?;

        assert!(
            conf_path
                .try_exists()
                .context("failed to verify existence of test config")?,
            "test config file could not be found"
        );
        assert_eq!(
            expected_conf_str, actual_conf_str,
            "contents of test config file do not match serialized test config"
        );

        Ok(())
    }
}
