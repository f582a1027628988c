use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const PREVIOUS_DIR_NAME: &str = "previous";
const PREVIOUS_ARCHIVE_PREFIX: &str = "previous-";
const PREVIOUS_ARCHIVE_EXTENSION: &str = ".zip";
const PREVIOUS_NG_MARK_NAME: &str = "previous-ng.dfmark";
const PREVIOUS_OK_MARK_NAME: &str = "previous-ok.dfmark";

/// Alter-check locations, usually read from an `[alter_check]` TOML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlterCheckSettings {
    pub migration_dir: PathBuf,
    /// Overrides `<migration_dir>/previous-ng.dfmark`.
    pub previous_ng_mark: Option<PathBuf>,
    /// Overrides `<migration_dir>/previous-ok.dfmark`.
    pub previous_ok_mark: Option<PathBuf>,
}

impl Default for AlterCheckSettings {
    fn default() -> Self {
        Self {
            migration_dir: PathBuf::from("migration"),
            previous_ng_mark: None,
            previous_ok_mark: None,
        }
    }
}

/// Every path the previous DB agent reads or writes.
///
/// The markers default to the migration directory rather than the previous
/// directory, because cleaning extracted resources deletes every
/// non-archive file under the previous directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLayout {
    migration_dir: PathBuf,
    previous_dir: PathBuf,
    previous_ng_mark: PathBuf,
    previous_ok_mark: PathBuf,
}

impl MigrationLayout {
    pub fn new(migration_dir: impl Into<PathBuf>) -> Self {
        let migration_dir = migration_dir.into();
        let previous_dir = migration_dir.join(PREVIOUS_DIR_NAME);
        let previous_ng_mark = migration_dir.join(PREVIOUS_NG_MARK_NAME);
        let previous_ok_mark = migration_dir.join(PREVIOUS_OK_MARK_NAME);
        Self {
            migration_dir,
            previous_dir,
            previous_ng_mark,
            previous_ok_mark,
        }
    }

    pub fn from_settings(settings: &AlterCheckSettings) -> Self {
        let mut layout = Self::new(settings.migration_dir.clone());
        if let Some(path) = &settings.previous_ng_mark {
            layout.previous_ng_mark = path.clone();
        }
        if let Some(path) = &settings.previous_ok_mark {
            layout.previous_ok_mark = path.clone();
        }
        layout
    }

    pub fn migration_dir(&self) -> &Path {
        &self.migration_dir
    }

    pub fn previous_dir(&self) -> &Path {
        &self.previous_dir
    }

    pub fn previous_ng_mark(&self) -> &Path {
        &self.previous_ng_mark
    }

    pub fn previous_ok_mark(&self) -> &Path {
        &self.previous_ok_mark
    }

    /// Whether the file name looks like `previous-<token>.zip`.
    pub fn is_previous_archive(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.starts_with(PREVIOUS_ARCHIVE_PREFIX)
                    && name.ends_with(PREVIOUS_ARCHIVE_EXTENSION)
            })
    }

    /// Date token of an archive name: extension and `previous-` prefix
    /// stripped, e.g. `previous-20230215.zip` gives `20230215`.
    pub fn previous_date_token(&self, archive: &Path) -> Option<String> {
        let name = archive.file_name()?.to_str()?;
        let stem = name.rsplit_once('.').map_or(name, |(front, _)| front);
        let token = stem
            .split_once(PREVIOUS_ARCHIVE_PREFIX)
            .map_or(stem, |(_, rear)| rear);
        Some(token.to_string())
    }
}
