pub mod files;
pub mod rules;
pub mod target;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use files::{FileChange, TargetFiles};
pub use rules::{WatchlistRule, clean_mac, render_rule_file, render_rules};
pub use target::{
    AuthorizedTarget, ConfigTarget, DirectiveChange, EmitOutcome, RetractOutcome, RuleFileChange,
    directive_for,
};

/// Replace `path` with `contents` in one step: write a sibling temp file, then rename.
/// A symlinked `path` is followed, so the link survives and its target is replaced.
/// An existing file keeps its permissions and, on unix, its owner and group.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let path = resolve_link(path)?;
    let path = path.as_path();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(contents).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;

    match fs::metadata(path) {
        Ok(meta) => {
            fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| Error::io(tmp.path(), e))?;
            copy_owner(&meta, tmp.path())?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // tempfile creates 0600; a new config file should be world-readable like its siblings
            set_default_mode(tmp.path())?;
        }
        Err(e) => return Err(Error::io(path, e)),
    }

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// The file a write to `path` should land in. Symlinks resolve to their final target;
/// anything else, including a path that does not exist yet, is returned as is.
fn resolve_link(path: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).map_err(|e| Error::io(path, e))
        }
        _ => Ok(path.to_path_buf()),
    }
}

#[cfg(unix)]
fn copy_owner(meta: &fs::Metadata, path: &Path) -> Result<()> {
    use std::os::unix::fs::MetadataExt;
    match std::os::unix::fs::chown(path, Some(meta.uid()), Some(meta.gid())) {
        Ok(()) => Ok(()),
        // Unprivileged writers cannot give files away; the file stays ours
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            log::debug!("Could not keep owner of {}: {}", path.display(), e);
            Ok(())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

#[cfg(not(unix))]
fn copy_owner(_meta: &fs::Metadata, _path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_default_mode(_path: &Path) -> Result<()> {
    Ok(())
}

/// Remove a file, treating "already gone" as success. Returns whether it existed.
pub(crate) fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}
