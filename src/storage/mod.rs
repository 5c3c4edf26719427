//! The local filesystem adapter.
//!
//! Sessions never touch `std::fs`/`tokio::fs` directly; every file operation
//! goes through the functions in this module, which take absolute local paths
//! produced by the path mapper and return [`Error`]s that the session maps to
//! FTP replies. Reads and writes are chunked and offset-aware so STOR/RETR can
//! honor a preceding REST.

mod error;
pub use error::{Error, ErrorKind};

use std::fmt::Write as _;
use std::io::SeekFrom;
use std::path::Path;
use std::time::{Duration, SystemTime};

use cfg_if::cfg_if;
use chrono::{DateTime, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncSeekExt;

/// Result type used by the filesystem adapter.
pub type Result<T> = std::result::Result<T, Error>;

/// The transfer buffer size used when streaming files over the data channel.
pub(crate) const CHUNK_SIZE: usize = 64 * 1024;

/// How a directory entry is opened for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop any content at or beyond the write offset, then write.
    Truncate,
    /// Keep existing content and write past the end.
    Append,
}

/// What kind of entry a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// Anything else (device, socket, dangling symlink target, ...).
    Other,
}

/// A point-in-time snapshot of an entry's metadata.
#[derive(Debug, Clone)]
pub struct FileStatus {
    kind: FileKind,
    len: u64,
    modified: Option<SystemTime>,
    mode: u32,
    uid: u32,
    gid: u32,
}

impl FileStatus {
    fn from_std(meta: &std::fs::Metadata) -> Self {
        let kind = if meta.is_dir() {
            FileKind::Dir
        } else if meta.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };
        cfg_if! {
            if #[cfg(unix)] {
                use std::os::unix::fs::MetadataExt;
                let (mode, uid, gid) = (meta.mode() & 0o7777, meta.uid(), meta.gid());
            } else {
                let mode = if meta.is_dir() { 0o755 } else { 0o644 };
                let (uid, gid) = (0, 0);
            }
        }
        FileStatus {
            kind,
            len: meta.len(),
            modified: meta.modified().ok(),
            mode,
            uid,
            gid,
        }
    }

    /// The kind of entry.
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// True for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// True for regular files.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the entry is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Last modification time, when the host filesystem records one.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

/// Returns the metadata of the entry at `path`.
pub async fn stat<P: AsRef<Path>>(path: P) -> Result<FileStatus> {
    let meta = tokio::fs::metadata(path).await?;
    Ok(FileStatus::from_std(&meta))
}

/// Lists a directory as (name, status) pairs, sorted by name.
pub async fn list<P: AsRef<Path>>(path: P) -> Result<Vec<(String, FileStatus)>> {
    let mut dir = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata().await?;
        entries.push((name, FileStatus::from_std(&meta)));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Opens a file for reading, positioned at `offset`.
pub async fn open_read<P: AsRef<Path>>(path: P, offset: u64) -> Result<File> {
    let mut file = File::open(path).await?;
    if offset > 0 {
        file.seek(SeekFrom::Start(offset)).await?;
    }
    Ok(file)
}

/// Opens (creating if necessary) a file for writing.
///
/// `Truncate` cuts the file at `offset` and positions the writer there, so an
/// offset of zero replaces the file and a REST offset resumes it. `Append`
/// always writes past the current end and ignores the offset.
pub async fn open_write<P: AsRef<Path>>(path: P, mode: WriteMode, offset: u64) -> Result<File> {
    match mode {
        WriteMode::Truncate => {
            let mut file = OpenOptions::new().write(true).create(true).open(path).await?;
            file.set_len(offset).await?;
            file.seek(SeekFrom::Start(offset)).await?;
            Ok(file)
        }
        WriteMode::Append => {
            let file = OpenOptions::new().append(true).create(true).open(path).await?;
            Ok(file)
        }
    }
}

/// Removes a regular file.
pub async fn remove_file<P: AsRef<Path>>(path: P) -> Result<()> {
    tokio::fs::remove_file(path).await.map_err(Error::from)
}

/// Removes an empty directory.
pub async fn remove_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    tokio::fs::remove_dir(path).await.map_err(Error::from)
}

/// Creates a directory.
pub async fn make_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    tokio::fs::create_dir(path).await.map_err(Error::from)
}

/// Renames a file or directory.
pub async fn rename<P: AsRef<Path>>(from: P, to: P) -> Result<()> {
    tokio::fs::rename(from, to).await.map_err(Error::from)
}

const PERM_READ: u32 = 0o444;
const PERM_WRITE: u32 = 0o222;
const PERM_EXEC: u32 = 0o111;
const PERM_USER: u32 = 0o700;
const PERM_GROUP: u32 = 0o070;
const PERM_OTHERS: u32 = 0o007;

fn mode_string(kind: FileKind, mode: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(match kind {
        FileKind::Dir => 'd',
        FileKind::File => '-',
        FileKind::Other => '-',
    });
    for class in [PERM_USER, PERM_GROUP, PERM_OTHERS] {
        out.push(if mode & class & PERM_READ > 0 { 'r' } else { '-' });
        out.push(if mode & class & PERM_WRITE > 0 { 'w' } else { '-' });
        out.push(if mode & class & PERM_EXEC > 0 { 'x' } else { '-' });
    }
    out
}

// Entries modified within roughly half a year show the clock, older ones the
// year, as `ls -l` does. Months are always English.
const SIX_MONTHS: Duration = Duration::from_secs(182 * 24 * 60 * 60);

fn format_mtime(modified: Option<SystemTime>, now: SystemTime) -> String {
    let modified = match modified {
        Some(t) => t,
        None => return "--- -- --:--".to_string(),
    };
    let stamp: DateTime<Utc> = modified.into();
    let recent = match now.duration_since(modified) {
        Ok(age) => age < SIX_MONTHS,
        // Future mtimes count as recent.
        Err(_) => true,
    };
    if recent {
        stamp.format("%b %d %H:%M").to_string()
    } else {
        stamp.format("%b %d  %Y").to_string()
    }
}

/// Renders one UNIX-style `LIST` line (without the trailing CRLF) for a
/// directory entry. The link count is a fixed 1; clients only parse past it.
pub fn format_list_line(name: &str, status: &FileStatus, now: SystemTime) -> String {
    let mut line = String::new();
    // write! to a String cannot fail.
    let _ = write!(
        line,
        "{mode} {links:>3} {owner:>8} {group:>8} {size:>12} {modified} {name}",
        mode = mode_string(status.kind, status.mode),
        links = 1,
        owner = status.uid,
        group = status.gid,
        size = status.len,
        modified = format_mtime(status.modified, now),
        name = name,
    );
    line
}
