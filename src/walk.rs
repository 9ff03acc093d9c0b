use std::{
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;

use crate::{error::WalkError, utils::join_rel};

/// Enumerate a package tree into an ordered list of paths relative to
/// `source_root`. The first entry is always the empty path (the root
/// itself) and every directory appears before all of its descendants, so
/// the list can be consumed front-to-back to create entries and
/// back-to-front to remove them.
///
/// The walk is breadth-first and iterative: a cursor chases the end of the
/// list while directory entries keep appending their children behind it.
/// The list stops growing once every directory has been expanded, which is
/// also the termination condition. Each directory handle is closed before
/// the cursor advances.
///
/// File names matching any pattern in `ignore_pats` are skipped; a matching
/// directory is pruned along with everything beneath it, since it is never
/// appended and therefore never expanded.
///
/// A `source_root` that is not a directory is not an error: it yields the
/// one-element list, same as a package consisting of a single file.
///
/// # Arguments
///
/// - `source_root` - Absolute path of the package to enumerate.
/// - `ignore_pats` - File name patterns to skip.
///
/// # Errors
///
/// An error is returned if an entry cannot be stat'd or a directory's
/// contents cannot be read mid-walk (e.g. the tree is being mutated by
/// someone else). There is no partial enumeration.
pub fn enumerate(source_root: &Path, ignore_pats: &[Regex]) -> Result<Vec<PathBuf>, WalkError> {
    let mut entries = vec![PathBuf::new()];
    let mut cursor = 0;

    while cursor < entries.len() {
        // cloned so the push below doesn't hold a borrow of `entries`
        let rel = entries[cursor].clone();
        let abs = join_rel(source_root, &rel);

        let metadata = fs::symlink_metadata(&abs).map_err(|err| WalkError::Metadata {
            source: err,
            path: abs.clone(),
        })?;

        if metadata.is_dir() {
            let read_dir = fs::read_dir(&abs).map_err(|err| WalkError::ReadDir {
                source: err,
                path: abs.clone(),
            })?;

            for res in read_dir {
                let entry = res.map_err(|err| WalkError::ReadDir {
                    source: err,
                    path: abs.clone(),
                })?;
                let file_name = entry.file_name();
                // need utf8 string for regex
                let lossy_name = file_name.to_string_lossy();

                if ignore_pats.iter().any(|re| re.is_match(&lossy_name)) {
                    continue;
                }

                entries.push(join_rel(&rel, &file_name));
            }
        }

        cursor += 1;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Context;

    use crate::test_utils::{TEST_PACKAGE_FILE_TAILS, make_tmp_tree};

    use super::*;

    /// Asserts that every non-root entry's parent appears earlier in the
    /// list than the entry itself.
    fn assert_parents_first(entries: &[PathBuf]) {
        for (i, rel) in entries.iter().enumerate() {
            if rel.as_os_str().is_empty() {
                continue;
            }
            let parent = rel.parent().expect("non-root entry should have a parent");
            let parent_idx = entries
                .iter()
                .position(|p| p.as_path() == parent)
                .unwrap_or_else(|| panic!("missing parent entry for {}", rel.display()));
            assert!(
                parent_idx < i,
                "{} (index {parent_idx}) enumerated after {} (index {i})",
                parent.display(),
                rel.display()
            );
        }
    }

    #[test]
    fn test_enumerate_starts_at_root() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let entries = enumerate(package.path(), &[])?;

        assert_eq!(
            PathBuf::new(),
            entries[0],
            "first entry should be the empty relative path"
        );

        Ok(())
    }

    #[test]
    fn test_enumerate_parents_before_children() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let entries = enumerate(package.path(), &[])?;

        assert_parents_first(&entries);

        Ok(())
    }

    #[test]
    fn test_enumerate_finds_everything() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let entries = enumerate(package.path(), &[])?;

        for tail in TEST_PACKAGE_FILE_TAILS {
            assert!(
                entries.contains(&PathBuf::from(tail)),
                "enumeration is missing {tail}"
            );
        }

        Ok(())
    }

    #[test]
    fn test_enumerate_concrete_scenario() -> anyhow::Result<()> {
        let package = tempfile::tempdir().context("failed to create tempdir")?;
        let root = package.path();
        fs::create_dir_all(root.join("bin")).context("failed to create bin")?;
        fs::create_dir_all(root.join("share/doc")).context("failed to create share/doc")?;
        fs::write(root.join("bin/tool"), b"tool").context("failed to write bin/tool")?;
        fs::write(root.join("share/doc/readme"), b"readme")
            .context("failed to write share/doc/readme")?;

        let entries = enumerate(root, &[])?;
        let expected = [
            "",
            "bin",
            "share",
            "bin/tool",
            "share/doc",
            "share/doc/readme",
        ]
        .map(PathBuf::from);

        assert_eq!(expected.len(), entries.len(), "unexpected entry count");
        for rel in &expected {
            assert!(
                entries.contains(rel),
                "enumeration is missing {}",
                rel.display()
            );
        }
        assert_parents_first(&entries);
        // breadth-first: both top-level dirs come before any of their contents
        let idx =
            |p: &str| entries.iter().position(|e| e == Path::new(p)).unwrap();
        assert!(idx("bin") < idx("bin/tool"));
        assert!(idx("share") < idx("bin/tool"), "level order violated");
        assert!(idx("share/doc") < idx("share/doc/readme"));

        Ok(())
    }

    #[test]
    fn test_enumerate_is_idempotent() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let first = enumerate(package.path(), &[])?;
        let second = enumerate(package.path(), &[])?;

        assert_eq!(first, second, "static tree enumerated differently twice");

        Ok(())
    }

    #[test]
    fn test_enumerate_non_directory_root() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let file_root = package.path().join("test.txt");
        let entries = enumerate(&file_root, &[])?;

        assert_eq!(
            vec![PathBuf::new()],
            entries,
            "single-file package should enumerate to just the root"
        );

        Ok(())
    }

    #[test]
    fn test_enumerate_missing_root_fails() {
        let res = enumerate(Path::new("/definitely/does/not/exist"), &[]);

        assert!(matches!(res, Err(WalkError::Metadata { .. })));
    }

    #[test]
    fn test_enumerate_prunes_ignored_dirs() -> anyhow::Result<()> {
        let package = make_tmp_tree().context("failed to make test package")?;
        let ignore_pats = vec![Regex::new("^folder1$").context("test regex should compile")?];
        let entries = enumerate(package.path(), &ignore_pats)?;

        assert!(
            !entries
                .iter()
                .any(|rel| rel.starts_with("folder1")),
            "ignored directory was not pruned: {entries:?}"
        );
        assert!(
            entries.contains(&PathBuf::from("folder2/nested2.txt")),
            "unrelated entries should survive the ignore pattern"
        );

        Ok(())
    }
}
