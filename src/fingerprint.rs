use crate::error::MergeError;
use sha2::{Digest, Sha512};
use std::{fmt, fs, path::Path};

/// Lowercase hex SHA512 checksum of a file's contents. Two files with equal fingerprints are
/// duplicates of each other, whatever their names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// # Returns
    ///
    /// Fingerprint of `bytes`.
    pub fn of(bytes: &[u8]) -> Fingerprint {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        Fingerprint(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the file whose filepath is `path` in full.
///
/// # Returns
///
/// Fingerprint of the file together with its contents, which the caller needs to reproduce the
/// file elsewhere. Nothing is cached; every call reads the file again.
pub fn resolve(path: &Path) -> Result<(Fingerprint, Vec<u8>), MergeError> {
    let bytes = fs::read(path).map_err(|source| MergeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((Fingerprint::of(&bytes), bytes))
}
