//! Filesystem helpers shared by the alter-check agents.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::{AlterCheckError, AlterCheckResult};

/// List every file under `dir`, recursively, sorted by path.
///
/// A missing directory yields an empty list.
pub fn find_hierarchy_files(dir: &Path) -> AlterCheckResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_files(dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> AlterCheckResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        AlterCheckError::io(format!("failed to list directory: {}", resolve_path(dir)), e)
    })?;
    for entry in entries {
        let path = entry
            .map_err(|e| {
                AlterCheckError::io(format!("failed to read directory: {}", resolve_path(dir)), e)
            })?
            .path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// The file with the lexically greatest file name.
pub fn find_latest_name_file(files: &[PathBuf]) -> Option<&PathBuf> {
    files.iter().max_by(|left, right| left.file_name().cmp(&right.file_name()))
}

/// Delete a file if it exists, calling `on_deleted` after a deletion.
///
/// Returns whether a file was deleted.
pub fn delete_file(path: &Path, on_deleted: Option<&dyn Fn(&Path)>) -> AlterCheckResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            if let Some(callback) = on_deleted {
                callback(path);
            }
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AlterCheckError::io(
            format!("failed to delete the file: {}", resolve_path(path)),
            e,
        )),
    }
}

/// Create a marker file holding `notice` unless one already exists.
///
/// Returns whether the marker was created; an existing marker is kept
/// as it is.
pub fn create_mark(path: &Path, notice: &str) -> AlterCheckResult<bool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AlterCheckError::io(
                    format!("failed to create the directory: {}", resolve_path(parent)),
                    e,
                )
            })?;
        }
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(AlterCheckError::io(
                format!("failed to create a file for the mark: {}", resolve_path(path)),
                e,
            ));
        }
    };
    write_notice(&mut file, notice).map_err(|e| {
        AlterCheckError::io(
            format!("failed to write the notice: {}", resolve_path(path)),
            e,
        )
    })?;
    Ok(true)
}

fn write_notice(file: &mut impl Write, notice: &str) -> io::Result<()> {
    file.write_all(notice.as_bytes())?;
    if !notice.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.flush()
}

/// Display form of a path with `/` separators.
pub fn resolve_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
