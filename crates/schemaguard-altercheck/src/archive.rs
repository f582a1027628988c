//! Zip extraction for previous-schema archives.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::control::resolve_path;
use crate::errors::{AlterCheckError, AlterCheckResult};

/// Extract every entry of `archive_path` into `dest_dir`.
///
/// Returns the extracted file paths in archive order, calling
/// `on_extracted` for each one. Entries whose names would escape
/// `dest_dir`, and files whose destination `is_reserved`, are skipped.
pub fn extract_archive(
    archive_path: &Path,
    dest_dir: &Path,
    is_reserved: impl Fn(&Path) -> bool,
    mut on_extracted: impl FnMut(&Path),
) -> AlterCheckResult<Vec<PathBuf>> {
    let archive_disp = resolve_path(archive_path);
    let file = File::open(archive_path)
        .map_err(|e| AlterCheckError::io(format!("failed to open the zip: {archive_disp}"), e))?;
    let mut archive = ZipArchive::new(file).map_err(|source| AlterCheckError::Zip {
        archive: archive_disp.clone(),
        source,
    })?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|source| AlterCheckError::Zip {
            archive: archive_disp.clone(),
            source,
        })?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(
                event = "previous_entry_skipped",
                archive = %archive_disp,
                entry = %entry.name()
            );
            continue;
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| {
                AlterCheckError::io(
                    format!("failed to create the directory: {}", resolve_path(&out_path)),
                    e,
                )
            })?;
            continue;
        }

        if is_reserved(&out_path) {
            tracing::warn!(
                event = "previous_entry_skipped",
                archive = %archive_disp,
                entry = %entry.name()
            );
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AlterCheckError::io(
                    format!("failed to create the directory: {}", resolve_path(parent)),
                    e,
                )
            })?;
        }
        let mut out = File::create(&out_path).map_err(|e| {
            AlterCheckError::io(
                format!("failed to create the file: {}", resolve_path(&out_path)),
                e,
            )
        })?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            AlterCheckError::io(
                format!("failed to extract the file: {}", resolve_path(&out_path)),
                e,
            )
        })?;

        on_extracted(&out_path);
        extracted.push(out_path);
    }

    Ok(extracted)
}
