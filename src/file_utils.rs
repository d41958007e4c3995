use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Find files with one of the given extensions in a directory
    ///
    /// Extensions are matched without the dot, case-insensitively. Results
    /// are sorted so batch order is stable across platforms.
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, extensions) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand the paths given on the command line into a flat file list.
    ///
    /// Files are taken as-is when their extension is supported; directories
    /// are scanned recursively. The caller's ordering of arguments is
    /// preserved, with each directory's files sorted in place.
    pub fn collect_inputs(paths: &[PathBuf], extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if Self::has_extension(path, extensions) {
                    files.push(path.clone());
                } else {
                    log::warn!("Skipping unsupported file: {}", path.display());
                }
            } else if path.is_dir() {
                files.extend(Self::find_files(path, extensions)?);
            } else {
                return Err(anyhow!("Input path does not exist: {}", path.display()));
            }
        }

        Ok(files)
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            })
    }
}
