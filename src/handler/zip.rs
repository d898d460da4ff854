// Zip util

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::common::expand_globs;
use crate::pipes::Pipes;
use crate::util::PipableCliUtil;

#[derive(Parser, Debug)]
#[command(name = "zip", version, about = "Package files into a zip archive")]
pub struct Zip {
    /// Store only (no compression)
    #[arg(short = '0')]
    pub store: bool,

    /// Archive to create
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Files or directories to add
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,
}

impl Zip {
    pub fn new<I, S>(archive: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store: false,
            archive: archive.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    fn options(&self) -> SimpleFileOptions {
        let method = if self.store {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        SimpleFileOptions::default().compression_method(method)
    }
}

impl PipableCliUtil for Zip {
    const NAME: &'static str = "zip";

    fn exec(self, pipes: &mut Pipes<'_>) -> Result<()> {
        let inputs = expand_globs(&self.files);

        // Every input must exist before the old archive is touched
        let mut kinds = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let meta = fs::metadata(input)
                .with_context(|| format!("Cannot add '{}'", input.display()))?;
            kinds.push(meta.is_dir());
        }

        let target = Path::new(&self.archive);
        let archive_path = resolve_archive_path(target)?;
        let staging = NamedTempFile::new_in(archive_dir(target))
            .with_context(|| format!("Cannot create archive '{}'", self.archive))?;
        let staging_path = fs::canonicalize(staging.path())?;

        let mut archiver = Archiver {
            writer: ZipWriter::new(staging),
            options: self.options(),
            skip: [archive_path, staging_path],
            added: 0,
        };

        for (input, is_dir) in inputs.iter().zip(kinds) {
            if is_dir {
                archiver.add_tree(input, &mut *pipes.stdout)?;
            } else {
                archiver.add_file(input, &mut *pipes.stdout)?;
            }
        }

        let added = archiver.added;
        let staging = archiver
            .writer
            .finish()
            .with_context(|| format!("Failed to finalize archive '{}'", self.archive))?;
        set_archive_permissions(&staging, target)?;
        staging
            .persist(target)
            .with_context(|| format!("Cannot write archive '{}'", self.archive))?;
        info!("zip: wrote {} entries to {}", added, self.archive);
        Ok(())
    }
}

/// Directory the archive lives in; the staging file is created there so the
/// final rename stays on one filesystem.
fn archive_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Absolute path of the archive, which may not exist yet.
fn resolve_archive_path(target: &Path) -> Result<PathBuf> {
    let dir = archive_dir(target);
    let dir = fs::canonicalize(dir).with_context(|| format!("Cannot resolve archive directory '{}'", dir.display()))?;
    let name = target
        .file_name()
        .with_context(|| format!("Invalid archive name '{}'", target.display()))?;
    Ok(dir.join(name))
}

#[cfg(unix)]
fn set_archive_permissions(staging: &NamedTempFile, target: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    // Keep the mode of an archive being replaced; temp files start out 0600
    let perms = fs::metadata(target)
        .map(|m| m.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
    fs::set_permissions(staging.path(), perms)
        .with_context(|| format!("Cannot set permissions on '{}'", staging.path().display()))
}

#[cfg(not(unix))]
fn set_archive_permissions(_staging: &NamedTempFile, _target: &Path) -> Result<()> {
    Ok(())
}

struct Archiver {
    writer: ZipWriter<NamedTempFile>,
    options: SimpleFileOptions,
    // The archive being replaced and the file being written
    skip: [PathBuf; 2],
    added: usize,
}

impl Archiver {
    fn add_tree(&mut self, root: &Path, out: &mut dyn Write) -> Result<()> {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk '{}'", root.display()))?;
            let path = entry.path();
            let ft = entry.file_type();

            if ft.is_dir() {
                let name = entry_name(path);
                if name.is_empty() {
                    continue;
                }
                let options = with_permissions(self.options, path);
                self.writer.add_directory(format!("{}/", name), options)?;
                self.added += 1;
                writeln!(out, "  adding: {}/", name)?;
            } else if path.is_file() {
                self.add_file(path, out)?;
            } else {
                warn!("zip: skipping '{}': not a regular file", path.display());
            }
        }
        Ok(())
    }

    fn add_file(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        if fs::canonicalize(path).is_ok_and(|p| self.skip.contains(&p)) {
            debug!("zip: skipping archive output {}", path.display());
            return Ok(());
        }

        let name = entry_name(path);
        let mut src = File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
        let options = with_permissions(self.options, path);

        self.writer.start_file(name.as_str(), options)?;
        io::copy(&mut src, &mut self.writer).with_context(|| format!("Failed to add '{}'", path.display()))?;
        self.added += 1;
        writeln!(out, "  adding: {}", name)?;
        Ok(())
    }
}

/// Archive entry name for `path`: `/`-separated, with root, `.` and `..`
/// components dropped so nothing extracts outside the target directory.
pub fn entry_name(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, path: &Path) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(path) {
        Ok(meta) => options.unix_permissions(meta.permissions().mode() & 0o7777),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _path: &Path) -> SimpleFileOptions {
    options
}
