//! File I/O utilities with atomic writes
//!
//! Snapshot files are either completely written or not modified at all.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LensError, LensResult};

fn storage_err(action: &str, path: &Path, err: impl std::fmt::Display) -> LensError {
    LensError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Read a JSON snapshot; a missing file yields `T::default()`
pub fn read_json<T, P>(path: P) -> LensResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_err("read", path, e)),
    };

    serde_json::from_slice(&bytes).map_err(|e| storage_err("parse", path, e))
}

/// Write a JSON snapshot through a sibling temp file and a rename
pub fn write_json_atomic<T, P>(path: P, data: &T) -> LensResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_err("create directory", parent, e))?;
    }

    // Same directory, or the rename is not atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| storage_err("create", &temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_err("serialize", path, e))?;
    writeln!(writer).map_err(|e| storage_err("write", &temp_path, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| storage_err("flush", &temp_path, e.error()))?;
    file.sync_all()
        .map_err(|e| storage_err("sync", &temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(storage_err("replace", path, e));
    }

    Ok(())
}
