use std::path::PathBuf;

use thiserror::Error as ThisError;

use crate::package::error::{ConfigRead, ConfigWrite};

#[derive(Debug, ThisError)]
pub enum WalkError {
    #[error("failed to stat '{path}'")]
    Metadata {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to read directory '{path}'")]
    ReadDir {
        source: std::io::Error,
        path: PathBuf,
    },
}

#[derive(Debug, ThisError)]
pub enum PlanError {
    #[error("package is not a directory: {0}")]
    PackageNotDirectory(PathBuf),
    #[error("target is not a directory: {0}")]
    TargetNotDirectory(PathBuf),
    #[error("failed to enumerate package tree")]
    Walk(#[from] WalkError),
}

#[derive(Debug, ThisError)]
pub enum FarmError {
    #[error("failed to parse package config")]
    ConfigParse(#[from] ConfigRead),
    #[error("failed to save TOML config")]
    ConfigWrite(#[from] ConfigWrite),
    #[error("failed to create directory '{path}'")]
    CreateDir {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to set permissions on '{path}'")]
    SetPermissions {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to link '{path}'")]
    Symlink {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to stat source entry '{path}'")]
    SourceMetadata {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to plan the farm")]
    Planning(#[from] PlanError),
}
