//! Expansion of feature file flags into the list sent to the daemon.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Feature files named by `-featuresDir` and `-featuresFiles`.
///
/// Blank values count as absent, matching how the daemon treats them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeatureFiles {
    dir: Option<PathBuf>,
    files: Option<String>,
}

/// Errors raised while listing a features directory.
#[derive(Debug, Error)]
pub(crate) enum FeatureFilesError {
    #[error("failed to read features directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FeatureFiles {
    pub(crate) fn new(dir: Option<PathBuf>, files: Option<String>) -> Self {
        Self {
            dir: dir.filter(|path| !path.as_os_str().is_empty()),
            files: files.filter(|list| !list.is_empty()),
        }
    }

    /// Whether neither a directory nor an explicit list was supplied.
    pub(crate) const fn is_empty(&self) -> bool {
        self.dir.is_none() && self.files.is_none()
    }

    /// Directory entries first, then the explicit list split on commas.
    ///
    /// Directory entries are not recursed into and are ordered by file name.
    /// Explicit entries are kept verbatim without existence checks.
    pub(crate) fn collect(&self) -> Result<Vec<String>, FeatureFilesError> {
        let mut collected = match &self.dir {
            Some(dir) => list_directory(dir)?,
            None => Vec::new(),
        };
        if let Some(files) = &self.files {
            collected.extend(files.split(',').map(str::to_owned));
        }
        Ok(collected)
    }

    /// The collected list rendered back into a comma-joined string.
    pub(crate) fn joined(&self) -> Result<String, FeatureFilesError> {
        self.collect().map(|files| files.join(","))
    }
}

fn list_directory(dir: &Path) -> Result<Vec<String>, FeatureFilesError> {
    let read_error = |source| FeatureFilesError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| dir.join(name).to_string_lossy().into_owned())
        .collect())
}
