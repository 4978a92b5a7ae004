//! Destination conflict handling.
//!
//! When a target name is taken the operator either deletes the incoming file
//! or both are kept, the incoming one under the first free suffixed name.
//! Both identifiers are shown before any deletion is offered.

use crate::console::{Console, Level};
use crate::error::Result;
use crate::fs::{file_name, FileSystem};
use crate::isin::{display_or_undetermined, from_path_name, Isin};
use std::path::{Path, PathBuf};

/// Which suffix a kept-both file receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    /// `<stem>_conflict_N.pdf`, for files arriving in staging
    Conflict,
    /// `<stem>_N.pdf`, for renames inside staging
    Plain,
}

/// `<stem>_N.pdf` or `<stem>_conflict_N.pdf`
pub fn suffixed_name(stem: &str, kind: SuffixKind, n: u32) -> String {
    match kind {
        SuffixKind::Conflict => format!("{}_conflict_{}.pdf", stem, n),
        SuffixKind::Plain => format!("{}_{}.pdf", stem, n),
    }
}

/// First free suffixed path in `dir`, probing N = 1, 2, ...
pub fn unique_suffixed_path(fs: &dyn FileSystem, dir: &Path, stem: &str, kind: SuffixKind) -> PathBuf {
    first_free_slot(fs, dir, stem, kind, None)
}

/// Like [`unique_suffixed_path`], but the slot `current` occupies counts as free
fn first_free_slot(
    fs: &dyn FileSystem,
    dir: &Path,
    stem: &str,
    kind: SuffixKind,
    current: Option<&Path>,
) -> PathBuf {
    let mut n = 1;
    loop {
        let candidate = dir.join(suffixed_name(stem, kind, n));
        if current == Some(candidate.as_path()) || !fs.exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Result of moving a file into a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Moved under its own name
    Moved(PathBuf),
    /// Name was taken; moved under a `_conflict_N` name
    MovedAside(PathBuf),
    /// Name was taken and the operator deleted the incoming file
    Deleted,
}

/// Result of renaming a file to its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Already `<ISIN>.pdf`, ignoring case
    AlreadyNamed,
    Renamed(PathBuf),
    /// Target was taken; renamed to `<ISIN>_N.pdf`
    RenamedAside(PathBuf),
    /// Target was taken and the operator deleted this file
    Deleted,
}

/// Move `src` into `dst_dir`, asking what to do when the name is taken
pub fn move_into(
    fs: &dyn FileSystem,
    console: &mut dyn Console,
    src: &Path,
    dst_dir: &Path,
) -> Result<MoveOutcome> {
    let name = file_name(src);
    let dst = dst_dir.join(&name);

    if !fs.exists(&dst) {
        fs.move_path(src, &dst)?;
        tracing::debug!(from = %src.display(), to = %dst.display(), "moved");
        return Ok(MoveOutcome::Moved(dst));
    }

    let existing_isin = from_path_name(&dst);
    let new_isin = from_path_name(src);

    console.report(&format!("Name conflict for file: {}", name), Level::Warning);
    console.report(
        &format!("Existing file ISIN: {}", display_or_undetermined(existing_isin.as_ref())),
        Level::Warning,
    );
    console.report(
        &format!("New file ISIN: {}", display_or_undetermined(new_isin.as_ref())),
        Level::Warning,
    );

    if console.confirm("Delete the new conflicting file?") {
        fs.remove_file(src)?;
        console.report(&format!("New file {} deleted", name), Level::Success);
        return Ok(MoveOutcome::Deleted);
    }

    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.clone());
    let safe = unique_suffixed_path(fs, dst_dir, &stem, SuffixKind::Conflict);
    fs.move_path(src, &safe)?;
    console.report(
        &format!("File moved under a safe name: {}", file_name(&safe)),
        Level::Info,
    );
    Ok(MoveOutcome::MovedAside(safe))
}

fn is_named_for(file: &Path, isin: &Isin) -> bool {
    file_name(file).eq_ignore_ascii_case(&isin.file_name())
}

/// Rename `file` to `<ISIN>.pdf`, offering to delete it when the target is
/// already taken and otherwise falling back to `<ISIN>_N.pdf`
pub fn rename_to_identifier(
    fs: &dyn FileSystem,
    console: &mut dyn Console,
    file: &Path,
    isin: &Isin,
) -> Result<RenameOutcome> {
    if is_named_for(file, isin) {
        return Ok(RenameOutcome::AlreadyNamed);
    }

    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let target = dir.join(isin.file_name());
    let name = file_name(file);

    if fs.exists(&target) && target != file {
        let occupant_isin = from_path_name(&target);
        console.report(
            &format!("Conflict renaming {} -> {}", name, isin.file_name()),
            Level::Warning,
        );
        console.report(
            &format!(
                "File {} already exists (ISIN: {}); current file ISIN: {}",
                isin.file_name(),
                display_or_undetermined(occupant_isin.as_ref()),
                isin
            ),
            Level::Warning,
        );

        if console.confirm(&format!("Delete the current file {}?", name)) {
            fs.remove_file(file)?;
            console.report(&format!("File {} deleted", name), Level::Success);
            return Ok(RenameOutcome::Deleted);
        }

        return move_aside(fs, file, dir, isin);
    }

    fs.move_path(file, &target)?;
    Ok(RenameOutcome::Renamed(target))
}

/// Move `file` to the first free `<ISIN>_N.pdf`; a file already in that slot stays put
fn move_aside(fs: &dyn FileSystem, file: &Path, dir: &Path, isin: &Isin) -> Result<RenameOutcome> {
    let aside = first_free_slot(fs, dir, isin.as_str(), SuffixKind::Plain, Some(file));
    if aside == file {
        return Ok(RenameOutcome::AlreadyNamed);
    }
    fs.move_path(file, &aside)?;
    Ok(RenameOutcome::RenamedAside(aside))
}

/// Rename `file` to `<ISIN>.pdf`, or `<ISIN>_N.pdf` when that is taken
pub fn rename_keeping_both(fs: &dyn FileSystem, file: &Path, isin: &Isin) -> Result<RenameOutcome> {
    if is_named_for(file, isin) {
        return Ok(RenameOutcome::AlreadyNamed);
    }

    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let target = dir.join(isin.file_name());

    if fs.exists(&target) && target != file {
        return move_aside(fs, file, dir, isin);
    }

    fs.move_path(file, &target)?;
    Ok(RenameOutcome::Renamed(target))
}
