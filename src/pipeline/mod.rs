//! Pipeline orchestration
//!
//! Runs the organizer's stages in a fixed forward order. Each stage lists the
//! folder it works on afresh, so it always sees what the previous stage left.
//!
//! # Failure handling
//!
//! Per-file failures in ingest, normalize, reconcile and deduplicate are
//! reported and the file is skipped. Failing to clear or create the staging
//! folder ends the run. A failed promotion is reported and the run still
//! finishes with its summary.

mod dedup;
mod promote;

pub use dedup::{find_duplicates, DuplicateGroup};
pub use promote::{archive_folder_name, unique_archive_path, PromotionOutcome};

use crate::config::OrganizerConfig;
use crate::conflict::{self, MoveOutcome, RenameOutcome};
use crate::console::{Console, Level};
use crate::document::TextExtractor;
use crate::error::Result;
use crate::fs::{file_name, list_pdfs, FileSystem};
use crate::isin::{self, display_or_undetermined};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Precheck,
    Prepare,
    Ingest,
    Normalize,
    Reconcile,
    Deduplicate,
    Promote,
    Terminal,
}

impl Stage {
    pub const ORDER: [Stage; 8] = [
        Stage::Precheck,
        Stage::Prepare,
        Stage::Ingest,
        Stage::Normalize,
        Stage::Reconcile,
        Stage::Deduplicate,
        Stage::Promote,
        Stage::Terminal,
    ];

    fn title(self) -> &'static str {
        match self {
            Stage::Precheck => "Checking for a leftover TS folder",
            Stage::Prepare => "Step 1: Preparing the TS folder",
            Stage::Ingest => "Step 2: Moving PDF files",
            Stage::Normalize => "Step 3: Normalizing file names",
            Stage::Reconcile => "Step 4: Checking ISINs against content",
            Stage::Deduplicate => "Step 5: Looking for duplicates",
            Stage::Promote => "Step 6: Moving to Data_work",
            Stage::Terminal => "Summary",
        }
    }
}

/// Counts gathered over one run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Files moved into staging (including `_conflict_N` ones)
    pub moved: usize,
    /// Files looked at while normalizing names
    pub normalized: usize,
    /// Files renamed to their content ISIN
    pub reconciled: usize,
    pub duplicates_removed: usize,
    /// PDFs in staging after deduplication
    pub staged_files: usize,
    pub promotion: Option<PromotionOutcome>,
    /// Files in the final folder, when it exists
    pub final_files: Option<usize>,
    /// Per-file failures that were reported and skipped
    pub errors: usize,
    /// Stages entered, in order
    pub stages: Vec<Stage>,
}

/// One organizer run over a configured folder layout
pub struct Pipeline<'a> {
    config: OrganizerConfig,
    fs: &'a dyn FileSystem,
    extractor: &'a dyn TextExtractor,
    console: &'a mut dyn Console,
    today: NaiveDate,
    summary: RunSummary,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: OrganizerConfig,
        fs: &'a dyn FileSystem,
        extractor: &'a dyn TextExtractor,
        console: &'a mut dyn Console,
    ) -> Self {
        Self {
            config,
            fs,
            extractor,
            console,
            today: chrono::Local::now().date_naive(),
            summary: RunSummary::default(),
        }
    }

    /// Date used to name archive folders
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run every stage in order
    pub fn run(mut self) -> Result<RunSummary> {
        self.console.report("Starting TS Organizer", Level::Heading);
        self.console.report(
            &format!("Working folder: {}", self.config.root.display()),
            Level::Info,
        );

        self.enter(Stage::Precheck);
        self.precheck()?;

        self.enter(Stage::Prepare);
        self.prepare()?;

        self.enter(Stage::Ingest);
        self.ingest();

        self.enter(Stage::Normalize);
        self.normalize();

        self.enter(Stage::Reconcile);
        self.reconcile();

        self.enter(Stage::Deduplicate);
        self.deduplicate();

        self.summary.staged_files = self.list_staging().len();
        self.console.report(
            &format!("Total files in the TS folder: {}", self.summary.staged_files),
            Level::Success,
        );

        self.enter(Stage::Promote);
        let promotion = self.promote();
        self.summary.promotion = Some(promotion);

        self.enter(Stage::Terminal);
        self.finish();

        Ok(self.summary)
    }

    fn enter(&mut self, stage: Stage) {
        tracing::info!(?stage, "entering stage");
        self.summary.stages.push(stage);
        if stage != Stage::Precheck {
            self.console.report("", Level::Info);
            self.console.report(stage.title(), Level::Heading);
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.summary.errors += 1;
        self.console.report(&message, Level::Error);
    }

    fn list_staging(&mut self) -> Vec<PathBuf> {
        let staging = self.config.staging_dir();
        self.list_or_report(&staging)
    }

    /// PDFs in `dir`; a listing failure is reported and yields no files
    fn list_or_report(&mut self, dir: &Path) -> Vec<PathBuf> {
        match list_pdfs(self.fs, dir) {
            Ok(files) => files,
            Err(e) => {
                self.fail(format!("Failed to read folder {}: {}", dir.display(), e));
                Vec::new()
            }
        }
    }

    /// Offer to clear a staging folder left over from an earlier run
    fn precheck(&mut self) -> Result<()> {
        let staging = self.config.staging_dir();
        if !self.fs.exists(&staging) {
            return Ok(());
        }

        self.console
            .report("The TS folder already exists in Data_in", Level::Warning);
        if self
            .console
            .confirm("The TS folder already exists in Data_in. Delete it before starting?")
        {
            if let Err(e) = self.fs.remove_dir_all(&staging) {
                self.console
                    .report(&format!("Failed to delete the TS folder: {}", e), Level::Error);
                return Err(e);
            }
            self.console.report("TS folder deleted", Level::Success);
        } else {
            self.console
                .report("TS folder left unchanged", Level::Info);
        }
        Ok(())
    }

    fn prepare(&mut self) -> Result<()> {
        let staging = self.config.staging_dir();
        if let Err(e) = self.fs.create_dir_all(&staging) {
            self.console
                .report(&format!("Failed to create the TS folder: {}", e), Level::Error);
            return Err(e);
        }
        self.console.report(
            &format!("TS folder ready: {}", staging.display()),
            Level::Info,
        );
        Ok(())
    }

    fn ingest(&mut self) {
        let data_in = self.config.data_in_dir();
        let staging = self.config.staging_dir();
        let files = self.list_or_report(&data_in);
        self.console.report(
            &format!("PDF files found in Data_in: {}", files.len()),
            Level::Info,
        );

        for file in files {
            match conflict::move_into(self.fs, &mut *self.console, &file, &staging) {
                Ok(MoveOutcome::Moved(_)) | Ok(MoveOutcome::MovedAside(_)) => self.summary.moved += 1,
                Ok(MoveOutcome::Deleted) => {}
                Err(e) => self.fail(format!("Failed to move {}: {}", file_name(&file), e)),
            }
        }

        self.console.report(
            &format!("Files moved: {}", self.summary.moved),
            Level::Success,
        );
    }

    fn normalize(&mut self) {
        for file in self.list_staging() {
            self.summary.normalized += 1;
            let name = file_name(&file);

            let Some(isin) = isin::from_path_name(&file) else {
                self.console.report(
                    &format!("Warning: no ISIN found in file name {}", name),
                    Level::Warning,
                );
                continue;
            };

            match conflict::rename_to_identifier(self.fs, &mut *self.console, &file, &isin) {
                Ok(RenameOutcome::Renamed(to)) | Ok(RenameOutcome::RenamedAside(to)) => {
                    self.console.report(
                        &format!("Renamed: {} -> {}", name, file_name(&to)),
                        Level::Success,
                    );
                }
                Ok(RenameOutcome::AlreadyNamed) | Ok(RenameOutcome::Deleted) => {}
                Err(e) => self.fail(format!("Failed to rename {}: {}", name, e)),
            }
        }

        self.console.report(
            &format!("Files processed: {}", self.summary.normalized),
            Level::Success,
        );
    }

    fn reconcile(&mut self) {
        for file in self.list_staging() {
            let name = file_name(&file);
            let name_isin = isin::from_path_name(&file);
            let content_isin = isin::from_document(&file, self.extractor, &mut *self.console);

            let target = match (&name_isin, content_isin) {
                (None, Some(content)) => {
                    self.console.report(
                        &format!(
                            "File {}: no ISIN in the name, the term sheet states {}",
                            name, content
                        ),
                        Level::Warning,
                    );
                    if !self.console.confirm(&format!("Rename to {}?", content.file_name())) {
                        self.left_unchanged(&name);
                        continue;
                    }
                    content
                }
                (Some(_), None) => {
                    self.console.report(
                        &format!("File {}: ISIN not found in the content", name),
                        Level::Warning,
                    );
                    continue;
                }
                (Some(in_name), Some(content)) if *in_name != content => {
                    self.console.report(
                        &format!(
                            "Mismatch: file name {}, the term sheet states {}",
                            display_or_undetermined(name_isin.as_ref()),
                            content
                        ),
                        Level::Warning,
                    );
                    if !self.console.confirm("Replace the name with the ISIN from the term sheet?") {
                        self.left_unchanged(&name);
                        continue;
                    }
                    content
                }
                _ => continue,
            };

            match conflict::rename_keeping_both(self.fs, &file, &target) {
                Ok(RenameOutcome::Renamed(to)) | Ok(RenameOutcome::RenamedAside(to)) => {
                    self.summary.reconciled += 1;
                    self.console.report(
                        &format!("Renamed: {} -> {}", name, file_name(&to)),
                        Level::Success,
                    );
                }
                Ok(_) => {}
                Err(e) => self.fail(format!("Failed to process file {}: {}", name, e)),
            }
        }
    }

    fn left_unchanged(&mut self, name: &str) {
        self.console
            .report(&format!("File {} left unchanged", name), Level::Info);
    }

    fn finish(&mut self) {
        let final_dir = self.config.final_dir();
        if !self.fs.is_dir(&final_dir) {
            self.console
                .report("The Data_work/TS folder is missing", Level::Warning);
        } else {
            match self.fs.list_files(&final_dir) {
                Ok(files) => {
                    if !files.is_empty() {
                        self.console.report("", Level::Info);
                        self.console.report("Contents of Data_work/TS:", Level::Info);
                        for file in &files {
                            self.console
                                .report(&format!("  {}", file_name(file)), Level::Info);
                        }
                    }
                    self.console.report(
                        &format!("Total files in Data_work/TS: {}", files.len()),
                        Level::Success,
                    );
                    self.summary.final_files = Some(files.len());
                }
                Err(e) => self.fail(format!("Failed to read Data_work/TS: {}", e)),
            }
        }

        let s = &self.summary;
        let counts = format!(
            "Moved: {}, processed: {}, renamed from content: {}, duplicates removed: {}, errors: {}",
            s.moved, s.normalized, s.reconciled, s.duplicates_removed, s.errors
        );
        match serde_json::to_string(s) {
            Ok(json) => tracing::info!(summary = %json, "run finished"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize summary"),
        }
        self.console.report("", Level::Info);
        self.console.report(&counts, Level::Info);
        self.console
            .report("Processing finished successfully!", Level::Success);
    }
}
