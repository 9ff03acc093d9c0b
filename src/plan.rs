use std::{
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use pathdiff::diff_paths;

use crate::{
    error::{FarmError, PlanError},
    package::{LinkType, PackageConfig},
    utils::{join_rel, os_symlink, replace_home_with_tilde},
    walk,
};

/// Mode flags for a single run. These travel as an explicit value through
/// the engine rather than as process-wide state.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Run the create pass.
    pub create: bool,
    /// Run the delete pass (before the create pass, if both are set).
    pub delete: bool,
    /// Print one line per (would-be) mutation to stdout.
    pub verbose: bool,
    /// Suppress filesystem mutation, but not logging.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            create: true,
            delete: false,
            verbose: false,
            dry_run: false,
        }
    }
}

/// A snapshot of one package tree, ready to be farmed into (or out of) a
/// target tree.
///
/// The entry list is built once by [`walk::enumerate`] and read twice at
/// most: forward by [`FarmPlan::materialize`], backward by
/// [`FarmPlan::dematerialize`]. Absolute source/target paths are derived
/// per entry during each pass, never stored.
#[derive(Debug)]
pub struct FarmPlan {
    /// Paths relative to both roots, ancestors before descendants.
    entries: Vec<PathBuf>,
    source: PathBuf,
    target: PathBuf,
    link_type: LinkType,
}

impl FarmPlan {
    /// Enumerate `config.package` and build a plan against `config.target`.
    ///
    /// # Errors
    ///
    /// An error is returned if either root is not an existing directory or
    /// if the package tree cannot be enumerated.
    pub fn plan(config: &PackageConfig) -> Result<Self, PlanError> {
        let PackageConfig {
            package,
            target,
            ignore_pats,
            link_type,
        } = config;

        if !package.is_dir() {
            return Err(PlanError::PackageNotDirectory(package.clone()));
        }
        if !target.is_dir() {
            return Err(PlanError::TargetNotDirectory(target.clone()));
        }

        let entries = walk::enumerate(package, ignore_pats)?;

        Ok(Self {
            entries,
            source: package.clone(),
            target: target.clone(),
            link_type: *link_type,
        })
    }

    /// Run the passes selected by `opts`: delete first, then create.
    ///
    /// # Errors
    ///
    /// See [`FarmPlan::materialize`]; the delete pass only fails if a source
    /// entry cannot be stat'd.
    pub fn execute(&self, opts: RunOptions) -> Result<(), FarmError> {
        if opts.delete {
            self.dematerialize(opts)?;
        }
        if opts.create {
            self.materialize(opts)?;
        }
        Ok(())
    }

    /// Walk the entry list front-to-back, recreating source directories in
    /// the target and symlinking everything else back into the source tree.
    /// Forward order guarantees a parent directory exists in the target
    /// before anything beneath it is created.
    ///
    /// A target path that is already a directory satisfies a directory
    /// entry and is skipped; this is also what makes the root entry a
    /// no-op, since the target root exists by contract. Directories are
    /// created with the source directory's permission bits.
    ///
    /// # Errors
    ///
    /// Creation failures are fatal and stop the pass immediately, leaving
    /// the partially materialized tree for the operator to inspect. Only an
    /// already-existing target *directory* is tolerated; an occupied
    /// symlink path is reported as whatever the filesystem said.
    pub fn materialize(&self, opts: RunOptions) -> Result<(), FarmError> {
        for rel in &self.entries {
            let src = join_rel(&self.source, rel);
            let dest = join_rel(&self.target, rel);

            let metadata = fs::symlink_metadata(&src).map_err(|err| FarmError::SourceMetadata {
                source: err,
                path: src.clone(),
            })?;

            if metadata.is_dir() {
                if dest.is_dir() {
                    continue;
                }
                if opts.verbose {
                    println!("mkdir {}", dest.display());
                }
                if !opts.dry_run {
                    fs::create_dir(&dest).map_err(|err| FarmError::CreateDir {
                        source: err,
                        path: dest.clone(),
                    })?;
                    fs::set_permissions(&dest, metadata.permissions()).map_err(|err| {
                        FarmError::SetPermissions {
                            source: err,
                            path: dest.clone(),
                        }
                    })?;
                }
            } else {
                if opts.verbose {
                    println!("{} -> {}", src.display(), dest.display());
                }
                if !opts.dry_run {
                    let referent = match self.link_type {
                        LinkType::Absolute => src.clone(),
                        LinkType::Relative => src_relative_to_dest(&src, &dest),
                    };
                    os_symlink(&referent, &dest).map_err(|err| FarmError::Symlink {
                        source: err,
                        path: dest.clone(),
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Walk the entry list back-to-front, the mirror image of
    /// [`FarmPlan::materialize`]: unlink leaf entries, then remove each
    /// directory once everything beneath it is gone.
    ///
    /// Removal failures (most commonly a directory kept non-empty by a
    /// foreign file) are reported as warnings and do not abort the rest of
    /// the pass; an undeleted entry in one branch should not block removal
    /// of unrelated branches. The target root itself is never removed.
    ///
    /// # Errors
    ///
    /// An error is returned only if a source entry cannot be stat'd, since
    /// without its kind there is no way to tell `rm` from `rm -d`.
    pub fn dematerialize(&self, opts: RunOptions) -> Result<(), FarmError> {
        for rel in self.entries.iter().rev() {
            if rel.as_os_str().is_empty() {
                // the root entry; its target path is the target root
                continue;
            }

            let src = join_rel(&self.source, rel);
            let dest = join_rel(&self.target, rel);

            let metadata = fs::symlink_metadata(&src).map_err(|err| FarmError::SourceMetadata {
                source: err,
                path: src.clone(),
            })?;

            let removal = if metadata.is_dir() {
                if opts.verbose {
                    println!("rm -d {}", dest.display());
                }
                if opts.dry_run {
                    continue;
                }
                fs::remove_dir(&dest)
            } else {
                if opts.verbose {
                    println!("rm {}", dest.display());
                }
                if opts.dry_run {
                    continue;
                }
                fs::remove_file(&dest)
            };

            if let Err(err) = removal {
                eprintln!(
                    "{}: cannot remove {}: {err}",
                    "warn".yellow(),
                    replace_home_with_tilde(&dest)
                );
            }
        }

        Ok(())
    }
}

/// Returns `src` rewritten relative to the parent of `dest`. Both paths
/// must be absolute before calling this function.
fn src_relative_to_dest(src: &Path, dest: &Path) -> PathBuf {
    assert!(src.is_absolute(), "{} is not absolute", src.display());
    assert!(dest.is_absolute(), "{} is not absolute", dest.display());

    let dest_parent = dest
        .parent()
        .expect("destination link should have a parent directory");

    diff_paths(src, dest_parent).expect("diff_paths should not return None")
}
