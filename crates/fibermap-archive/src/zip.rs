//! In-memory ZIP packaging of project documents.

use crate::error::{ArchiveError, Result};
use crate::naming::EntryNamer;
use fibermap_core::CollisionPolicy;
use std::io::{Cursor, Write};
use std::path::{Component, Path};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Directory auxiliary files are stored under
pub const ASSET_DIR: &str = "assets";

/// Sanitize an asset path to prevent path traversal (e.g. `../../etc/passwd`).
///
/// Keeps only normal components, joined with `/`. Returns `None` when
/// nothing is left.
fn sanitize_path(path: &str) -> Option<String> {
    let parts: Vec<String> = Path::new(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Information about a file in a ZIP archive (without extracting contents)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    /// Entry name within the archive
    pub name: String,
    /// Uncompressed file size
    pub size: u64,
    /// Compressed file size
    pub compressed_size: u64,
}

/// The single ZIP archive a job writes into.
///
/// Entries are appended in call order. Every entry carries the same fixed
/// timestamp (1980-01-01), so equal inputs give byte-identical archives.
pub struct OutputArchive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    namer: EntryNamer,
    options: SimpleFileOptions,
    entries: Vec<String>,
}

impl std::fmt::Debug for OutputArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputArchive")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl OutputArchive {
    /// An empty archive whose documents get `.{extension}` entries
    #[must_use]
    pub fn new(extension: &str, policy: CollisionPolicy) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            namer: EntryNamer::new(extension, policy),
            options,
            entries: Vec::new(),
        }
    }

    /// Append the serialized document of `project`; returns the entry name.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NameCollision`] under the reject policy when
    /// another project already maps to the same name, or
    /// [`ArchiveError::Zip`] if writing fails.
    pub fn add_document(&mut self, project: &str, bytes: &[u8]) -> Result<String> {
        let entry = self.namer.claim(project)?;
        self.write_entry(&entry, bytes)?;
        Ok(entry)
    }

    /// Append an auxiliary file under [`ASSET_DIR`]; returns the entry name.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidAsset`] if `name` has no usable path
    /// components or is already present.
    pub fn add_asset(&mut self, name: &str, bytes: &[u8]) -> Result<String> {
        let clean = sanitize_path(name).ok_or_else(|| ArchiveError::InvalidAsset(name.to_string()))?;
        let entry = format!("{ASSET_DIR}/{clean}");
        if self.entries.iter().any(|e| e.eq_ignore_ascii_case(&entry)) {
            return Err(ArchiveError::InvalidAsset(name.to_string()));
        }
        self.write_entry(&entry, bytes)?;
        Ok(entry)
    }

    fn write_entry(&mut self, entry: &str, bytes: &[u8]) -> Result<()> {
        self.writer.start_file(entry, self.options)?;
        self.writer.write_all(bytes)?;
        log::debug!("archived {entry} ({} bytes)", bytes.len());
        self.entries.push(entry.to_string());
        Ok(())
    }

    /// Entry names written so far, in order
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Finalize the archive and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Zip`] if the central directory cannot be written.
    pub fn finish(self) -> Result<Vec<u8>> {
        let count = self.entries.len();
        let bytes = self.writer.finish()?.into_inner();
        log::debug!("archive finished: {count} entries, {} bytes", bytes.len());
        Ok(bytes)
    }
}

/// List the files of a ZIP archive held in memory.
///
/// # Errors
///
/// Returns [`ArchiveError::Zip`] if the bytes are not a readable archive.
pub fn list_zip_contents(bytes: &[u8]) -> Result<Vec<FileInfo>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::new();

    for i in 0..archive.len() {
        let zip_file = archive.by_index(i)?;
        if zip_file.is_dir() {
            continue;
        }
        files.push(FileInfo {
            name: zip_file.name().to_string(),
            size: zip_file.size(),
            compressed_size: zip_file.compressed_size(),
        });
    }

    Ok(files)
}
