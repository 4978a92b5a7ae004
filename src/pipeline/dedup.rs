//! Duplicate detection by name ISIN.

use super::Pipeline;
use crate::checksum::{compare_files, ContentMatch};
use crate::console::Level;
use crate::fs::file_name;
use crate::isin::{from_path_name, Isin};
use std::collections::HashMap;
use std::path::PathBuf;

/// Files sharing one name ISIN, in listing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub isin: Isin,
    pub files: Vec<PathBuf>,
}

/// Groups of more than one file per ISIN, ordered by first appearance
pub fn find_duplicates(files: &[PathBuf]) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut index: HashMap<Isin, usize> = HashMap::new();

    for file in files {
        let Some(isin) = from_path_name(file) else {
            continue;
        };
        match index.get(&isin) {
            Some(&i) => groups[i].files.push(file.clone()),
            None => {
                index.insert(isin.clone(), groups.len());
                groups.push(DuplicateGroup {
                    isin,
                    files: vec![file.clone()],
                });
            }
        }
    }

    groups.retain(|g| g.files.len() > 1);
    groups
}

impl Pipeline<'_> {
    /// Keep the first file of every group, ask about each of the others
    pub(super) fn deduplicate(&mut self) {
        let files = self.list_staging();
        let groups = find_duplicates(&files);

        if groups.is_empty() {
            self.console.report("No duplicates found", Level::Success);
            return;
        }
        self.console.report(
            &format!("ISINs with duplicates: {}", groups.len()),
            Level::Warning,
        );

        for group in groups {
            self.console.report(
                &format!("Duplicates for ISIN: {}", group.isin),
                Level::Warning,
            );
            self.console.report(
                &format!("Files found: {}", group.files.len()),
                Level::Info,
            );

            let kept = &group.files[0];
            let kept_name = file_name(kept);
            self.console
                .report(&format!("File 1: {}", kept_name), Level::Info);
            self.console.report("Keeping the first file", Level::Success);

            for (i, file) in group.files.iter().enumerate().skip(1) {
                let name = file_name(file);
                self.console
                    .report(&format!("File {}: {}", i + 1, name), Level::Info);

                let relation = match compare_files(kept, file) {
                    ContentMatch::Identical => "identical content",
                    ContentMatch::Different => "different content",
                    ContentMatch::Unknown => "content could not be compared",
                };
                self.console.report(
                    &format!(
                        "{} and {} both carry ISIN {}: {}",
                        kept_name, name, group.isin, relation
                    ),
                    Level::Info,
                );

                if !self.console.confirm(&format!("Delete file {}?", name)) {
                    self.console
                        .report(&format!("File {} kept", name), Level::Info);
                    continue;
                }

                match self.fs.remove_file(file) {
                    Ok(()) => {
                        self.summary.duplicates_removed += 1;
                        self.console
                            .report(&format!("File {} deleted", name), Level::Success);
                    }
                    Err(e) => self.fail(format!("Failed to delete file {}: {}", name, e)),
                }
            }
        }
    }
}
