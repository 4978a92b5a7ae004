//! Moving the finished staging folder into place, archiving what it replaces.

use super::Pipeline;
use crate::console::Level;
use crate::error::Result;
use crate::fs::{file_name, FileSystem};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to the staging folder at the end of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PromotionOutcome {
    /// Final folder was free
    Moved,
    /// Previous final folder archived, then replaced
    #[serde(rename_all = "camelCase")]
    Replaced { archived_to: PathBuf },
    /// Operator kept the existing final folder
    Declined,
    Failed { message: String },
}

/// `<prefix>_<dd>_<mm>_<yyyy>`
pub fn archive_folder_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}", prefix, date.format("%d_%m_%Y"))
}

/// Dated archive path, suffixed `_1`, `_2`, ... when that date is taken
pub fn unique_archive_path(
    fs: &dyn FileSystem,
    archive_root: &Path,
    prefix: &str,
    date: NaiveDate,
) -> PathBuf {
    let base = archive_folder_name(prefix, date);
    let mut candidate = archive_root.join(&base);
    let mut n = 1;
    while fs.exists(&candidate) {
        candidate = archive_root.join(format!("{}_{}", base, n));
        n += 1;
    }
    candidate
}

impl Pipeline<'_> {
    pub(super) fn promote(&mut self) -> PromotionOutcome {
        match self.try_promote() {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Failed to move the TS folder: {}", e);
                self.fail(message.clone());
                PromotionOutcome::Failed { message }
            }
        }
    }

    fn try_promote(&mut self) -> Result<PromotionOutcome> {
        let staging = self.config.staging_dir();
        let final_dir = self.config.final_dir();

        self.fs.create_dir_all(&self.config.data_work_dir())?;

        if !self.fs.exists(&final_dir) {
            self.fs.move_path(&staging, &final_dir)?;
            self.console
                .report("TS folder moved to Data_work", Level::Success);
            return Ok(PromotionOutcome::Moved);
        }

        self.console
            .report("Data_work already contains a TS folder", Level::Warning);
        if !self.console.confirm("Replace the existing folder?") {
            self.console.report("Operation cancelled", Level::Info);
            return Ok(PromotionOutcome::Declined);
        }

        let archive_root = self.config.archive_dir();
        self.fs.create_dir_all(&archive_root)?;
        let archived_to =
            unique_archive_path(self.fs, &archive_root, &self.config.staging, self.today);

        self.fs.move_path(&final_dir, &archived_to)?;
        self.console.report(
            &format!("Existing TS folder archived: {}", file_name(&archived_to)),
            Level::Success,
        );

        self.fs.move_path(&staging, &final_dir)?;
        self.console
            .report("New TS folder moved to Data_work", Level::Success);

        Ok(PromotionOutcome::Replaced { archived_to })
    }
}
