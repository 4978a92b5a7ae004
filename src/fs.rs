//! Filesystem operations used by the pipeline.
//!
//! Stages never cache a listing: each one calls [`list_pdfs`] again so it sees
//! whatever the previous stage left behind.

use crate::error::{OrganizerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem capability consumed by the pipeline
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, sorted by file name
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Move or rename a file or directory
    fn move_path(&self, source: &Path, destination: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// True for `*.pdf` in any case
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// PDF files directly inside `dir`
pub fn list_pdfs(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(fs
        .list_files(dir)?
        .into_iter()
        .filter(|p| has_pdf_extension(p))
        .collect())
}

/// Display name of a path
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let read_dir = fs::read_dir(dir).map_err(|e| OrganizerError::io("read directory", dir, e))?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| OrganizerError::io("read directory", dir, e))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| OrganizerError::io("create directory", path, e))
    }

    fn move_path(&self, source: &Path, destination: &Path) -> Result<()> {
        // Try rename first (same filesystem), fall back to copy+delete
        if fs::rename(source, destination).is_ok() {
            return Ok(());
        }

        if source.is_dir() {
            copy_dir_all(source, destination)?;
            fs::remove_dir_all(source).map_err(|e| OrganizerError::io("remove", source, e))
        } else {
            fs::copy(source, destination).map_err(|e| OrganizerError::io("copy", source, e))?;
            fs::remove_file(source).map_err(|e| OrganizerError::io("remove", source, e))
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| OrganizerError::io("delete file", path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).map_err(|e| OrganizerError::io("delete folder", path, e))
    }
}

/// Helper function to copy a directory recursively
fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| OrganizerError::io("create directory", dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| OrganizerError::io("read directory", src, e))? {
        let entry = entry.map_err(|e| OrganizerError::io("read directory", src, e))?;
        let ty = entry
            .file_type()
            .map_err(|e| OrganizerError::io("inspect", &entry.path(), e))?;

        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(|e| OrganizerError::io("copy", &src_path, e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_list_pdfs_is_flat_sorted_and_case_insensitive() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("b.pdf")).unwrap();
        File::create(dir.path().join("A.PDF")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        File::create(dir.path().join("sub.pdf").join("inner.pdf")).unwrap();

        let names: Vec<String> = list_pdfs(&LocalFs, dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf"]);
    }

    #[test]
    fn test_list_missing_dir_errors() {
        let dir = TempDir::new().unwrap();
        let err = LocalFs.list_files(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("read directory"));
    }

    #[test]
    fn test_move_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.pdf");
        fs::write(&src, b"pdf").unwrap();
        let dst = dir.path().join("b.pdf");

        LocalFs.move_path(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"pdf");

        let folder = dir.path().join("TS");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("x.pdf"), b"x").unwrap();
        let moved = dir.path().join("moved");
        LocalFs.move_path(&folder, &moved).unwrap();
        assert!(!folder.exists());
        assert!(moved.join("x.pdf").exists());
    }

    #[test]
    fn test_copy_dir_all() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested").join("a.pdf"), b"a").unwrap();

        copy_dir_all(&src, &dir.path().join("dst")).unwrap();
        assert!(dir.path().join("dst").join("nested").join("a.pdf").exists());
    }
}
