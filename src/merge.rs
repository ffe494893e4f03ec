use crate::{
    error::MergeError,
    fingerprint::{self, Fingerprint},
};
use filetime::FileTime;
use log::{debug, error, info, warn};
use std::{
    collections::HashSet,
    ffi::{OsStr, OsString},
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Everything one merge run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Input directories, in order of precedence.
    pub input_dirs: Vec<PathBuf>,
    /// Directory the unique files are copied into. Must already exist.
    pub output_dir: PathBuf,
    /// Give each copy the modification time of its source.
    pub retain_modified_time: bool,
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Content was new and now lives at the contained path.
    Copied(PathBuf),
    /// Content had already been copied earlier in the run.
    Skipped,
}

/// Outcome of a merge run.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Files written to the output directory, in the order they were written.
    pub copied: Vec<PathBuf>,
    /// Number of files left out because their content was already copied.
    pub skipped: usize,
    /// Every failure of the run, in the order it happened.
    pub failures: Vec<MergeError>,
}

impl MergeReport {
    /// `Err` with the last directory failure if an input directory could not be merged, the report
    /// itself otherwise. File-scoped failures never fail the run.
    pub fn into_result(mut self) -> Result<MergeReport, MergeError> {
        match self.failures.iter().rposition(MergeError::is_directory_error) {
            Some(index) => Err(self.failures.remove(index)),
            None => Ok(self),
        }
    }
}

/// Merges input directories into one output directory, copying every distinct content once.
///
/// The set of fingerprints seen so far lives as long as the `Merger`, so files are compared
/// against everything merged before them, across directories.
pub struct Merger<'a> {
    config: &'a MergeConfig,
    seen: HashSet<Fingerprint>,
    report: MergeReport,
}

impl<'a> Merger<'a> {
    pub fn new(config: &'a MergeConfig) -> Merger<'a> {
        Merger {
            config,
            seen: HashSet::new(),
            report: MergeReport::default(),
        }
    }

    /// Merge every input directory, in order.
    pub fn run(mut self) -> MergeReport {
        let config = self.config;
        for dir in &config.input_dirs {
            info!(
                "Merging files from {} into {}",
                dir.display(),
                config.output_dir.display()
            );
            if let Err(err) = self.merge_dir(dir) {
                error!("{}", err);
                self.report.failures.push(err);
            }
        }
        info!(
            "Copied {} files, skipped {} duplicates, {} failures",
            self.report.copied.len(),
            self.report.skipped,
            self.report.failures.len()
        );
        self.report
    }

    /// Merge the top-level files of `dir`. Errors on single entries are recorded and do not stop
    /// the directory; only an unreadable `dir` itself is returned.
    fn merge_dir(&mut self, dir: &Path) -> Result<(), MergeError> {
        // Sorted so that which duplicate wins does not depend on the filesystem.
        let walker = WalkDir::new(dir)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(MergeError::DirectoryAccess {
                        path: dir.to_path_buf(),
                        source,
                    });
                }
                Err(source) => {
                    self.fail(MergeError::ListEntry {
                        path: dir.to_path_buf(),
                        source,
                    });
                    continue;
                }
            };

            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Err(MergeError::NotADirectory(dir.to_path_buf()));
                }
                continue;
            }

            if entry.file_type().is_dir() {
                debug!("Skipping sub-directory {}", entry.path().display());
                continue;
            }

            match self.merge_entry(&entry) {
                Ok(Decision::Copied(path)) => self.report.copied.push(path),
                Ok(Decision::Skipped) => self.report.skipped += 1,
                Err(err) => self.fail(err),
            }
        }

        Ok(())
    }

    /// Copy `entry` into the output directory unless its content has been seen already.
    fn merge_entry(&mut self, entry: &DirEntry) -> Result<Decision, MergeError> {
        let (fingerprint, bytes) = fingerprint::resolve(entry.path())?;

        if self.seen.contains(&fingerprint) {
            debug!(
                "{} (hash {}) was already copied, skipping",
                entry.path().display(),
                fingerprint
            );
            return Ok(Decision::Skipped);
        }

        let output_dir = &self.config.output_dir;
        let name = output_name(output_dir, entry.file_name()).map_err(|source| {
            MergeError::OutputName {
                path: entry.path().to_path_buf(),
                source,
            }
        })?;
        let output = output_dir.join(name);

        info!(
            "Copying {} (hash {}) to {}",
            entry.path().display(),
            fingerprint,
            output.display()
        );
        write_new(&output, &bytes)?;

        let timestamp = if self.config.retain_modified_time {
            retain_modified_time(entry, &output)
        } else {
            Ok(())
        };
        Ok(self.record_copy(fingerprint, output, timestamp))
    }

    /// Remember the content of a file written to `output`. A failed timestamp step is recorded but
    /// the copy stands.
    fn record_copy(
        &mut self,
        fingerprint: Fingerprint,
        output: PathBuf,
        timestamp: Result<(), MergeError>,
    ) -> Decision {
        self.seen.insert(fingerprint);
        if let Err(err) = timestamp {
            self.fail(err);
        }
        Decision::Copied(output)
    }

    fn fail(&mut self, err: MergeError) {
        warn!("{}", err);
        self.report.failures.push(err);
    }
}

/// Merge `config.input_dirs` into `config.output_dir`.
///
/// # Returns
///
/// The report of the run, or the last input directory that could not be read. Files copied before
/// or after a failing directory stay in place.
pub fn merge_directories(config: &MergeConfig) -> Result<MergeReport, MergeError> {
    Merger::new(config).run().into_result()
}

/// # Returns
///
/// `name` if nothing called `name` exists in `dir`. Otherwise `"<stem> (<n>)<extension>"` for the
/// smallest `n >= 1` that is free in `dir`, where the extension starts at the last `.` of `name`.
/// Fails if a candidate cannot be looked up, e.g. because it is too long.
pub fn output_name(dir: &Path, name: &OsStr) -> io::Result<OsString> {
    if !is_taken(&dir.join(name))? {
        return Ok(name.to_os_string());
    }

    let (stem, extension) = split_extension(name);
    let mut counter = 1usize;
    loop {
        let mut candidate = stem.clone();
        candidate.push(format!(" ({})", counter));
        candidate.push(&extension);
        if !is_taken(&dir.join(&candidate))? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

// Anything at `path`, dangling symlinks included, makes the name taken.
fn is_taken(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Split `name` at its last `.` into stem and extension, the extension keeping the dot.
#[cfg(unix)]
fn split_extension(name: &OsStr) -> (OsString, OsString) {
    use std::os::unix::ffi::OsStrExt;

    let bytes = name.as_bytes();
    match bytes.iter().rposition(|&b| b == b'.') {
        Some(dot) => (
            OsStr::from_bytes(&bytes[..dot]).to_os_string(),
            OsStr::from_bytes(&bytes[dot..]).to_os_string(),
        ),
        None => (name.to_os_string(), OsString::new()),
    }
}

#[cfg(not(unix))]
fn split_extension(name: &OsStr) -> (OsString, OsString) {
    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(dot) => (name[..dot].into(), name[dot..].into()),
        None => (name.as_ref().into(), OsString::new()),
    }
}

/// Write `bytes` to a new file at `path`, never replacing an existing one.
fn write_new(path: &Path, bytes: &[u8]) -> Result<(), MergeError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| MergeError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    write_or_discard(path, &mut file, bytes)
}

/// Write `bytes` into `writer`, which was just created at `path`. On failure the partial file is
/// removed so that no truncated copy stays behind.
fn write_or_discard(
    path: &Path,
    writer: &mut impl Write,
    bytes: &[u8],
) -> Result<(), MergeError> {
    if let Err(source) = writer.write_all(bytes).and_then(|()| writer.flush()) {
        if let Err(err) = fs::remove_file(path) {
            warn!("Cannot remove partial copy {}: {}", path.display(), err);
        }
        return Err(MergeError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Give `output` the modification time of the file described by `entry`.
fn retain_modified_time(entry: &DirEntry, output: &Path) -> Result<(), MergeError> {
    let metadata = entry.metadata().map_err(|source| MergeError::Metadata {
        path: entry.path().to_path_buf(),
        source,
    })?;

    filetime::set_file_mtime(output, FileTime::from_last_modification_time(&metadata)).map_err(
        |source| MergeError::Timestamp {
            path: output.to_path_buf(),
            source,
        },
    )
}

/// Create `dir` unless it already exists.
pub fn create_output_directory(dir: &Path) -> Result<(), MergeError> {
    match fs::create_dir(dir) {
        Ok(()) => {
            debug!("Created output directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if dir.is_dir() {
                Ok(())
            } else {
                Err(MergeError::OutputNotDirectory(dir.to_path_buf()))
            }
        }
        Err(source) => Err(MergeError::OutputDirectory {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
