//! File helpers shared by the snapshot store and the history log.

use crate::error::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Indentation used for every pretty-printed JSON file.
pub(crate) const INDENT: &[u8] = b"    ";

/// Serialize `value` as JSON indented with four spaces.
pub(crate) fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Replace the contents of `path` with `data` via a synced temp file and rename.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => Some(p),
        _ => None,
    };
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let tmp_path = tmp_path_for(path);
    if let Err(e) = write_synced(&tmp_path, data) {
        // Cleanup only; `e` is the error reported.
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)?;

    #[cfg(unix)]
    {
        if let Some(dir) = parent {
            File::open(dir)?.sync_all()?;
        }
    }

    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("data"));
    name.push(".tmp");
    path.with_file_name(name)
}
