//! Read-compute-write glue for whole-file patching.
//!
//! Each operation is a strict read → compute-in-memory → write sequence.
//! The write is atomic (tempfile + fsync + rename), so a crash leaves the
//! target either fully old or fully new, never truncated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {0}: path has no parent directory")]
    NoParent(PathBuf),
}

/// The before/after pair from one [`apply_to_file`] cycle.
///
/// Both sides are kept so callers can render a diff without re-reading the
/// file (which may already hold newer content by then).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub original: String,
    pub modified: String,
}

impl Splice {
    pub fn changed(&self) -> bool {
        self.original != self.modified
    }
}

/// One full patch cycle: read the file, run `compute` on the snapshot, and
/// persist the result.
///
/// Unchanged output skips the write entirely, and `dry_run` never writes.
/// Errors from `compute` propagate before anything touches the disk, so a
/// rejected patch leaves the file exactly as it was read.
pub fn apply_to_file<F, E>(path: &Path, dry_run: bool, compute: F) -> Result<Splice, E>
where
    F: FnOnce(&str) -> Result<String, E>,
    E: From<SpliceError>,
{
    let original = read_source(path)?;
    let modified = compute(&original)?;

    if !dry_run && modified != original {
        write_source(path, &modified)?;
    }

    Ok(Splice { original, modified })
}

/// Read the whole target file as a UTF-8 snapshot.
pub fn read_source(path: &Path) -> Result<String, SpliceError> {
    fs::read_to_string(path).map_err(|source| SpliceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replace the target file's contents.
///
/// The tempfile is created in the target's directory so the final rename
/// stays on one filesystem.
pub fn write_source(path: &Path, content: &str) -> Result<(), SpliceError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| SpliceError::NoParent(path.to_path_buf()))?;

    let io_err = |source| SpliceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(content.as_bytes()).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.ts");
        fs::write(&path, "before").unwrap();

        write_source(&path, "after").unwrap();
        assert_eq!(read_source(&path).unwrap(), "after");
    }

    #[test]
    fn test_write_preserves_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.ts");
        let sibling = dir.path().join("sibling.ts");
        fs::write(&target, "old").unwrap();
        fs::write(&sibling, "untouched").unwrap();

        write_source(&target, "new").unwrap();

        assert_eq!(fs::read_to_string(&sibling).unwrap(), "untouched");
        // No stray tempfiles left behind.
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_apply_writes_computed_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.ts");
        fs::write(&path, "old text").unwrap();

        let splice =
            apply_to_file(&path, false, |original| {
                Ok::<_, SpliceError>(original.replace("old", "new"))
            })
            .unwrap();

        assert!(splice.changed());
        assert_eq!(splice.original, "old text");
        assert_eq!(splice.modified, "new text");
        assert_eq!(fs::read_to_string(&path).unwrap(), "new text");
    }

    #[test]
    fn test_apply_dry_run_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.ts");
        fs::write(&path, "old text").unwrap();

        let splice =
            apply_to_file(&path, true, |original| {
                Ok::<_, SpliceError>(original.replace("old", "new"))
            })
            .unwrap();

        assert!(splice.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old text");
    }

    #[test]
    fn test_apply_unchanged_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.ts");
        fs::write(&path, "same").unwrap();

        let splice =
            apply_to_file(&path, false, |original| {
                Ok::<_, SpliceError>(original.to_string())
            })
            .unwrap();

        assert!(!splice.changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), "same");
    }

    #[test]
    fn test_apply_compute_error_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.ts");
        fs::write(&path, "untouched").unwrap();

        let result = apply_to_file(&path, false, |_| {
            Err::<String, _>(SpliceError::NoParent(path.clone()))
        });

        assert!(matches!(result, Err(SpliceError::NoParent(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "untouched");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_source(&dir.path().join("absent.ts"));
        assert!(matches!(result, Err(SpliceError::Io { .. })));
    }

    #[test]
    fn test_write_rootless_path() {
        let result = write_source(Path::new("bare-filename"), "x");
        assert!(matches!(result, Err(SpliceError::NoParent(_))));
    }
}
