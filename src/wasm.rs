use std::{
    fs, io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("reading file {filepath}: {error}. run 'make build-test-wasms' to generate .wasm files")]
    CannotReadContractFile { filepath: PathBuf, error: io::Error },
    #[error("cannot read current directory: {0}")]
    CurrentDir(io::Error),
}

/// A contract binary on disk. Relative paths are looked up from the current
/// directory and each of its ancestors, so tests can run from a member crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wasm<'a>(pub &'a Path);

fn find_in_ancestors(start: &Path, relative: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|parent| parent.join(relative))
        .find(|path| path.is_file())
}

impl Wasm<'_> {
    /// # Errors
    /// When the current directory is unreadable
    pub fn path(&self) -> Result<PathBuf, Error> {
        if self.0.is_absolute() {
            return Ok(self.0.to_path_buf());
        }
        let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
        // Missing files resolve against the current directory so the read
        // error names a sensible path.
        Ok(find_in_ancestors(&cwd, self.0).unwrap_or_else(|| cwd.join(self.0)))
    }

    /// # Errors
    /// May fail to find or read the wasm file
    pub fn bytes(&self) -> Result<Vec<u8>, Error> {
        let filepath = self.path()?;
        fs::read(&filepath).map_err(|error| Error::CannotReadContractFile { filepath, error })
    }

    /// Hex encoded SHA-256 of the file, the same value `contract install` prints.
    ///
    /// # Errors
    /// May fail to find or read the wasm file
    pub fn hash(&self) -> Result<String, Error> {
        Ok(hash_bytes(&self.bytes()?))
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
