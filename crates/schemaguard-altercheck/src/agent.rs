use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::archive::extract_archive;
use crate::control::{
    create_mark, delete_file, find_hierarchy_files, find_latest_name_file, resolve_path,
};
use crate::errors::{AlterCheckError, AlterCheckResult};
use crate::layout::MigrationLayout;
use crate::player::PreviousPlayer;

/// Notice written to the NG mark when the previous schema cannot be replayed.
pub const ROLLBACK_FAILURE_NOTICE: &str = "Failed to rollback the schema as previous DB.";

const ROLLBACK_FAILURE_ADVICE: &str =
    "The AlterCheck requires that PreviousDDL are correct.\nSo you should prepare the PreviousDDL again.";

/// Manages previous-schema archives, their extracted resources and the
/// previous NG/OK markers.
///
/// Extraction deletes and recreates files under the previous directory, so
/// two agents must not run against the same layout at once.
#[derive(Debug)]
pub struct PreviousDbAgent<P> {
    layout: MigrationLayout,
    player: P,
}

impl<P: PreviousPlayer> PreviousDbAgent<P> {
    pub fn new(layout: MigrationLayout, player: P) -> Self {
        Self { layout, player }
    }

    pub fn layout(&self) -> &MigrationLayout {
        &self.layout
    }

    /// Replay the extracted previous resource through the player.
    pub fn play_previous_schema(&self) -> AlterCheckResult<()> {
        let previous_dir = self.layout.previous_dir();
        tracing::info!(event = "previous_schema_playing", dir = %resolve_path(previous_dir));
        self.player
            .play_previous(previous_dir)
            .map_err(AlterCheckError::Play)
    }

    /// Extract the latest archive, replay it and clean up.
    ///
    /// Returns `Ok(false)` when there is no archive to roll back to. When the
    /// replay fails, the previous NG mark is written when possible and a
    /// rollback failure wrapping the replay error is returned.
    pub fn rollback_previous_schema(&self) -> AlterCheckResult<bool> {
        self.delete_previous_ng_mark()?;
        if !self.extract_previous_resource()? {
            return Ok(false);
        }

        let played = self.play_previous_schema();
        let cleaned = self.delete_extracted_previous_resource();
        match played {
            Ok(()) => {
                cleaned?;
                tracing::info!(event = "previous_schema_rolled_back");
                Ok(true)
            }
            Err(err) => {
                if let Err(clean_err) = cleaned {
                    tracing::warn!(event = "previous_resource_cleanup_failed", error = %clean_err);
                }
                if let Err(mark_err) = self.mark_previous_ng(ROLLBACK_FAILURE_NOTICE) {
                    tracing::warn!(event = "previous_ng_mark_failed", error = %mark_err);
                }
                Err(self.rollback_failure(err))
            }
        }
    }

    /// Wrap a replay failure with remediation advice.
    pub fn rollback_failure(&self, cause: AlterCheckError) -> AlterCheckError {
        AlterCheckError::RollbackFailure {
            notice: ROLLBACK_FAILURE_NOTICE.to_string(),
            advice: ROLLBACK_FAILURE_ADVICE.to_string(),
            source: Box::new(cause),
        }
    }

    /// Record that the last rollback failed.
    ///
    /// Removes the OK mark first. An existing NG mark is left untouched, so
    /// the first notice wins.
    pub fn mark_previous_ng(&self, notice: &str) -> AlterCheckResult<()> {
        delete_file(self.layout.previous_ok_mark(), None)?;
        let ng_mark = self.layout.previous_ng_mark();
        if create_mark(ng_mark, notice)? {
            tracing::info!(event = "previous_ng_marked", path = %resolve_path(ng_mark));
        }
        Ok(())
    }

    /// Record that the previous schema was verified, removing the NG mark.
    pub fn mark_previous_ok(&self, notice: &str) -> AlterCheckResult<()> {
        self.delete_previous_ng_mark()?;
        let ok_mark = self.layout.previous_ok_mark();
        if create_mark(ok_mark, notice)? {
            tracing::info!(event = "previous_ok_marked", path = %resolve_path(ok_mark));
        }
        Ok(())
    }

    pub fn delete_previous_ng_mark(&self) -> AlterCheckResult<bool> {
        delete_file(
            self.layout.previous_ng_mark(),
            Some(&|path: &Path| {
                tracing::info!(event = "previous_ng_mark_deleted", path = %resolve_path(path));
            }),
        )
    }

    pub fn has_previous_ng_mark(&self) -> bool {
        self.layout.previous_ng_mark().exists()
    }

    pub fn has_previous_ok_mark(&self) -> bool {
        self.layout.previous_ok_mark().exists()
    }

    /// Date token of the latest archive, for display only.
    pub fn find_latest_previous_date(&self) -> AlterCheckResult<Option<String>> {
        Ok(self
            .find_latest_previous_archive()?
            .and_then(|archive| self.layout.previous_date_token(&archive)))
    }

    /// Extract the latest archive into the previous directory.
    ///
    /// Returns `Ok(false)` when no archive exists. An archive without any
    /// file is treated as corrupted.
    pub fn extract_previous_resource(&self) -> AlterCheckResult<bool> {
        let Some(archive) = self.find_latest_previous_archive()? else {
            tracing::info!(
                event = "previous_archive_not_found",
                dir = %resolve_path(self.layout.previous_dir())
            );
            return Ok(false);
        };

        self.delete_extracted_previous_resource()?;

        let archive_disp = resolve_path(&archive);
        tracing::info!(event = "previous_resource_extracting", archive = %archive_disp);
        let extracted = extract_archive(
            &archive,
            self.layout.previous_dir(),
            |path| self.layout.is_previous_archive(path),
            |path| {
                tracing::info!(event = "previous_resource_extracted", path = %resolve_path(path));
            },
        )?;

        if extracted.is_empty() {
            return Err(AlterCheckError::EmptyArchive {
                archive: archive_disp,
            });
        }
        Ok(true)
    }

    pub fn find_latest_previous_archive(&self) -> AlterCheckResult<Option<PathBuf>> {
        let archives = self.find_previous_archives()?;
        Ok(find_latest_name_file(&archives).cloned())
    }

    /// Archives directly under the previous directory, sorted by path.
    pub fn find_previous_archives(&self) -> AlterCheckResult<Vec<PathBuf>> {
        let previous_dir = self.layout.previous_dir();
        let entries = match fs::read_dir(previous_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AlterCheckError::io(
                    format!("failed to list directory: {}", resolve_path(previous_dir)),
                    e,
                ));
            }
        };

        let mut archives = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    AlterCheckError::io(
                        format!("failed to read directory: {}", resolve_path(previous_dir)),
                        e,
                    )
                })?
                .path();
            if path.is_file() && self.layout.is_previous_archive(&path) {
                archives.push(path);
            }
        }
        archives.sort();
        Ok(archives)
    }

    /// Delete every non-archive file under the previous directory.
    pub fn delete_extracted_previous_resource(&self) -> AlterCheckResult<()> {
        let previous_files = find_hierarchy_files(self.layout.previous_dir())?;
        if previous_files.is_empty() {
            return Ok(());
        }

        tracing::info!(event = "previous_resource_deleting");
        let on_deleted = |path: &Path| {
            tracing::debug!(event = "previous_resource_deleted", path = %resolve_path(path));
        };
        for previous_file in &previous_files {
            if self.layout.is_previous_archive(previous_file) {
                continue;
            }
            delete_file(previous_file, Some(&on_deleted))?;
        }
        Ok(())
    }
}
