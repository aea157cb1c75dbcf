//! Zip extraction and re-creation of deployment archives.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::AppError;
use crate::utils::slash_path;

/// Extract `archive_path` into `dest_dir` and return the number of entries.
///
/// Entries whose names would escape `dest_dir` are rejected by the zip
/// reader.
pub fn extract(archive_path: &Path, dest_dir: &Path) -> Result<usize, AppError> {
    if !archive_path.is_file() {
        return Err(AppError::MissingArchive(archive_path.to_path_buf()));
    }

    fs::create_dir_all(dest_dir)?;
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let entries = archive.len();
    archive.extract(dest_dir)?;

    log::debug!("Extracted {} entries from {}", entries, archive_path.display());
    Ok(entries)
}

/// Zip the contents of `source_dir` into `archive_path`, replacing any
/// existing file, and return the size of the new archive.
///
/// The archive is written next to its destination and renamed into place
/// once complete, so a failure never leaves a truncated archive behind.
pub fn create(source_dir: &Path, archive_path: &Path) -> Result<u64, AppError> {
    let parent = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new().prefix(".slimzip-").suffix(".zip").tempfile_in(parent)?;
    let mut zip = ZipWriter::new(staging);
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    for entry in WalkDir::new(source_dir).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let name = slash_path(relative);
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            zip.add_symlink(name, target.to_string_lossy().into_owned(), base)?;
        } else if file_type.is_dir() {
            let options = base.unix_permissions(unix_mode(&entry.metadata()?));
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            let options = base.unix_permissions(unix_mode(&entry.metadata()?));
            zip.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut zip)?;
        }
        entries += 1;
    }

    let staging = zip.finish()?;
    // Staging files are created 0600; keep the mode the archive had before.
    if let Some(permissions) = archive_permissions(archive_path) {
        staging.as_file().set_permissions(permissions)?;
    }
    staging.persist(archive_path).map_err(|err| err.error)?;

    let size = fs::metadata(archive_path)?.len();
    log::debug!("Wrote {} entries to {}", entries, archive_path.display());
    Ok(size)
}

#[cfg(unix)]
fn archive_permissions(archive_path: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(archive_path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => Some(fs::Permissions::from_mode(0o644)),
    }
}

#[cfg(not(unix))]
fn archive_permissions(archive_path: &Path) -> Option<fs::Permissions> {
    fs::metadata(archive_path).ok().map(|metadata| metadata.permissions())
}

#[cfg(unix)]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() { 0o755 } else { 0o644 }
}
