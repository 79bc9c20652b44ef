use super::{ArchiveError, ArchiveResult, Manifest, MANIFEST_FILE_NAME};
use crate::storage::{path_to_slash, ScratchStore};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes every file under `scratch_root` into a Deflate-compressed zip archive
///
/// Entry names are paths relative to the root with `/` separators. Directories
/// are walked recursively in sorted order so repeated runs produce the same
/// entry order.
///
/// # Returns
///
/// The number of entries written.
pub fn create_archive(scratch_root: &Path, archive_path: &Path) -> ArchiveResult<u64> {
    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ArchiveError::Create {
                path: archive_path.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(archive_path).map_err(|source| ArchiveError::Create {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    collect_files(scratch_root, scratch_root, &mut files)?;

    for relative in &files {
        zip.start_file(path_to_slash(relative), options)?;
        let mut source = File::open(scratch_root.join(relative))?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;

    tracing::info!(
        "Archived {} files into {}",
        files.len(),
        archive_path.display()
    );

    Ok(files.len() as u64)
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    Ok(())
}

/// Location of the manifest copy written next to an archive
pub fn sidecar_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(MANIFEST_FILE_NAME);
    archive_path.with_file_name(name)
}

/// Embeds the manifest, writes the archive and removes the scratch tree
///
/// # Returns
///
/// The sidecar manifest path when `write_sidecar` is set.
pub fn package_scratch(
    store: ScratchStore,
    manifest: &Manifest,
    archive_path: &Path,
    write_sidecar: bool,
) -> ArchiveResult<Option<PathBuf>> {
    let json = manifest.to_json()?;
    store.overwrite(Path::new(MANIFEST_FILE_NAME), &json)?;

    create_archive(store.root(), archive_path)?;

    let sidecar = if write_sidecar {
        let path = sidecar_path(archive_path);
        fs::write(&path, &json)?;
        tracing::debug!("Wrote manifest sidecar {}", path.display());
        Some(path)
    } else {
        None
    };

    store.remove()?;
    Ok(sidecar)
}
