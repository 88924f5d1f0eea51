//! # Manifest - shard list resolution
//!
//! The manifest names the shard files that were merged into one output.
//!
//! ## File Format
//!
//! UTF-8 text, one shard filename per line, paths relative to the
//! manifest's own directory:
//!
//! ```text
//! data_1718000000_1.bin
//! data_1718000000_2.bin
//!
//! data_1718000000_3.bin
//! ```
//!
//! Surrounding whitespace is trimmed and blank lines are ignored. Every other
//! line must end in `.bin`.
//!
//! ## Resolution
//!
//! A bad entry never aborts resolution. Lines without the `.bin` extension
//! and entries whose file does not exist become [`ManifestWarning`]s and are
//! skipped, so one typo does not hide the remaining shards. The only hard
//! failure is a manifest that cannot be read at all.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Extension every shard filename must carry.
pub const SHARD_EXTENSION: &str = ".bin";

/// One shard listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardReference {
    /// The entry exactly as listed (trimmed).
    pub filename: String,
    /// Absolute path of the shard file.
    pub path: PathBuf,
}

/// Non-fatal problem with a single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
    /// The entry does not end in `.bin`.
    InvalidExtension { line_number: usize, line: String },
    /// The entry resolves to a file that does not exist.
    MissingShard { line_number: usize, path: PathBuf },
}

impl std::fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestWarning::InvalidExtension { line_number, line } => write!(
                f,
                "manifest line {}: '{}' does not end in {}",
                line_number, line, SHARD_EXTENSION
            ),
            ManifestWarning::MissingShard { line_number, path } => write!(
                f,
                "manifest line {}: shard {} does not exist",
                line_number,
                path.display()
            ),
        }
    }
}

/// Errors that prevent a manifest from being used at all.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened or read.
    #[error("manifest {} is unreadable: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors from [`write_manifest`].
#[derive(Debug, Error)]
pub enum ManifestWriteError {
    /// The manifest could not be written.
    #[error("failed to write manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Refused to write a filename that would not resolve back as a shard.
    #[error("invalid manifest entry '{0}'")]
    InvalidEntry(String),
}

/// Result of resolving a manifest: the usable shards plus every warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    /// Absolute directory the entries were resolved against.
    pub base_dir: PathBuf,
    /// Existing `.bin` shards, in manifest order. Duplicates are kept.
    pub shards: Vec<ShardReference>,
    pub warnings: Vec<ManifestWarning>,
}

impl ResolvedManifest {
    /// Returns `true` when every non-blank line resolved to a shard.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Reads and resolves the manifest at `manifest_path`.
///
/// # Errors
///
/// Returns [`ManifestError::Unreadable`] if the manifest cannot be opened,
/// read as UTF-8 text, or its directory cannot be made absolute.
pub fn resolve<P: AsRef<Path>>(manifest_path: P) -> Result<ResolvedManifest, ManifestError> {
    let manifest_path = manifest_path.as_ref();
    let unreadable = |source: io::Error| ManifestError::Unreadable {
        path: manifest_path.to_path_buf(),
        source,
    };

    let file = File::open(manifest_path).map_err(unreadable)?;
    let base_dir = base_dir_of(manifest_path).map_err(unreadable)?;
    let reader = BufReader::new(file);

    let mut shards = Vec::new();
    let mut warnings = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(unreadable)?;
        let line_number = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if !trimmed.ends_with(SHARD_EXTENSION) {
            warn!(line_number, entry = trimmed, "invalid shard extension, skipping");
            warnings.push(ManifestWarning::InvalidExtension {
                line_number,
                line: trimmed.to_string(),
            });
            continue;
        }

        let path = base_dir.join(trimmed);
        if !path.exists() {
            warn!(line_number, path = %path.display(), "shard does not exist, skipping");
            warnings.push(ManifestWarning::MissingShard { line_number, path });
            continue;
        }

        debug!(line_number, path = %path.display(), "resolved shard");
        shards.push(ShardReference {
            filename: trimmed.to_string(),
            path,
        });
    }

    Ok(ResolvedManifest {
        base_dir,
        shards,
        warnings,
    })
}

/// Absolute form of the manifest's parent directory.
///
/// A bare filename has an empty parent, which means the current directory.
fn base_dir_of(manifest_path: &Path) -> io::Result<PathBuf> {
    let parent = match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::canonicalize(parent)
}

/// Writes a manifest listing `filenames`, one per line.
///
/// Uses the same atomic pattern as any small metadata file: write to a
/// `.tmp` sibling, fsync, then rename over the target. If the rename fails
/// (Windows can refuse to replace a cached file) the target is truncated
/// and written directly instead.
///
/// # Errors
///
/// Returns [`ManifestWriteError::InvalidEntry`] for a name that is blank,
/// contains a line break, or lacks the `.bin` extension, and
/// [`ManifestWriteError::Io`] on I/O failure.
pub fn write_manifest<P, S>(path: P, filenames: &[S]) -> Result<(), ManifestWriteError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    for name in filenames {
        let name = name.as_ref();
        if name.trim().is_empty()
            || name.contains(['\n', '\r'])
            || !name.trim().ends_with(SHARD_EXTENSION)
        {
            return Err(ManifestWriteError::InvalidEntry(name.to_string()));
        }
    }

    let write_err = |source: io::Error| ManifestWriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    {
        let mut f = create_truncated(&tmp_path).map_err(write_err)?;
        write_entries(&mut f, filenames).map_err(write_err)?;
    }

    if fs::rename(&tmp_path, path).is_err() {
        let mut f = create_truncated(path).map_err(write_err)?;
        write_entries(&mut f, filenames).map_err(write_err)?;
        let _ = fs::remove_file(&tmp_path);
    }

    debug!(path = %path.display(), entries = filenames.len(), "manifest written");
    Ok(())
}

fn create_truncated(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

fn write_entries<S: AsRef<str>>(f: &mut File, filenames: &[S]) -> io::Result<()> {
    for name in filenames {
        writeln!(f, "{}", name.as_ref().trim())?;
    }
    f.flush()?;
    f.sync_all()
}

#[cfg(test)]
mod tests;
