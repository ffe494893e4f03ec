use std::{io, path::PathBuf};
use thiserror::Error;

/// Everything that can go wrong while merging directories.
///
/// Only [`MergeError::is_directory_error`] failures affect the outcome of a run; the rest are
/// scoped to a single file and are recorded, logged, and otherwise ignored.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Input directory is missing or cannot be listed.
    #[error("cannot read directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Input path exists but is not a directory.
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// A single entry of an input directory could not be listed.
    #[error("cannot list entry in {path}: {source}")]
    ListEntry {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No free name could be found for the copy of the file at `path`.
    #[error("cannot pick an output name for {path}: {source}")]
    OutputName {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read metadata of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot set modification time of {path}: {source}")]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),
}

impl MergeError {
    /// `true` for failures that cost a whole input directory.
    pub fn is_directory_error(&self) -> bool {
        matches!(
            self,
            MergeError::DirectoryAccess { .. } | MergeError::NotADirectory(_)
        )
    }
}
