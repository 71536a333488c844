//! Small filesystem helpers shared by the stores.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{BasedError, Result};

/// Read a whole file, mapping a missing file to `NotFound { what }`
pub(crate) fn read(what: &'static str, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| BasedError::io(what, path, e))
}

/// Create (or truncate) `path` and write `bytes` to it
pub(crate) fn write(path: &Path, bytes: &[u8], sync: SyncStrategy) -> Result<()> {
    let mut file = File::create(path).map_err(|e| BasedError::io("directory", path, e))?;
    file.write_all(bytes)
        .map_err(|e| BasedError::io("file", path, e))?;
    if sync == SyncStrategy::EveryWrite {
        file.sync_all().map_err(|e| BasedError::io("file", path, e))?;
    }
    Ok(())
}

/// Write `bytes` next to `path` and rename over it.
///
/// Readers see either the old content or the new content, never a prefix.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8], sync: SyncStrategy) -> Result<()> {
    let tmp = temp_sibling(path);
    if let Err(e) = write(&tmp, bytes, sync) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        BasedError::io("file", path, e)
    })
}

/// Create a directory and its parents
pub(crate) fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| BasedError::IoAt {
        path: path.to_path_buf(),
        source: e,
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
