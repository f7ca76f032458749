//! File-based cache implementation.
//!
//! [`FileCache`] stores each entry as a single file directly under the cache
//! root. The file name is the hex-encoded SHA-256 of the key, since keys embed
//! serialized attributes with characters that are not safe in paths. Each file
//! has a fixed header followed by the fragment:
//!
//! ```text
//! [expires_at: u64 LE, unix seconds][fragment bytes]
//! ```
//!
//! On read, only the header is read first to check expiry. The fragment is
//! read only on a live hit; expired files are removed.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated. This ensures stale fragments from previous builds are never used.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::{CacheError, FragmentCache};

/// Name of the file holding the cache format version.
const VERSION_FILE: &str = "VERSION";

/// File-based [`FragmentCache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- 3f2a...e9          # entry for sha256(key)
/// +-- ...
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the entire
    /// cache directory is removed and recreated with the new version. Errors
    /// during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.root.join(hex::encode(hasher.finalize()))
    }
}

impl FragmentCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut header = [0u8; 8];
        if let Err(e) = file.read_exact(&mut header) {
            // Truncated entry from an interrupted write
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(e.into());
        }
        let expires_at = u64::from_le_bytes(header);

        if unix_now() >= expires_at {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                tracing::debug!("failed to remove expired cache entry {}: {e}", path.display());
            }
            return Ok(None);
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        // Entries are always written from &str; anything else is corruption
        Ok(String::from_utf8(data).ok())
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root)?;

        let expires_at = unix_now().saturating_add(ttl.as_secs());
        let mut buf = Vec::with_capacity(8 + value.len());
        buf.extend_from_slice(&expires_at.to_le_bytes());
        buf.extend_from_slice(value.as_bytes());

        fs::write(self.entry_path(key), &buf)?;
        Ok(())
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join(VERSION_FILE);

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
