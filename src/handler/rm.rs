// Rm util

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use std::fs;
use std::path::Path;
use crate::common::expand_pattern;
use crate::pipes::Pipes;
use crate::util::PipableCliUtil;

/// Remove files or directories
#[derive(Parser, Debug, Default)]
#[command(name = "rm", version, about = "Remove files matching glob patterns")]
pub struct Rm {
    /// Recurse into directories
    #[arg(short = 'r')]
    pub recursive: bool,

    /// Glob patterns of files to remove
    #[arg(value_name = "FILES")]
    pub file_globs: Vec<String>,
}

impl Rm {
    pub fn new<I, S>(file_globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recursive: false,
            file_globs: file_globs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

impl PipableCliUtil for Rm {
    const NAME: &'static str = "rm";

    fn exec(self, _pipes: &mut Pipes<'_>) -> Result<()> {
        let mut removed = 0;
        for pattern in &self.file_globs {
            for path in expand_pattern(pattern)? {
                delete(&path, self.recursive)?;
                removed += 1;
            }
        }
        info!("rm: removed {} path(s)", removed);
        Ok(())
    }
}

/// Deletes a single path.
///
/// Directories are refused unless `recursive` is set, in which case every
/// child is deleted first, in name order. The first failure aborts the walk
/// and leaves the remaining siblings in place.
///
/// Symbolic links are never treated as directories: a link to a directory is
/// removed as a plain entry, with or without `recursive`, and its target is
/// left alone.
pub fn delete(path: &Path, recursive: bool) -> Result<()> {
    // Links are removed, never followed
    let meta = fs::symlink_metadata(path)
        .with_context(|| format!("Cannot stat '{}'", path.display()))?;

    if meta.is_dir() {
        if !recursive {
            bail!("'{}' is a directory. Use -r", path.display());
        }
        delete_children(path)?;
        debug!("rm: removing directory {}", path.display());
        fs::remove_dir(path).with_context(|| format!("Failed to remove directory: {}", path.display()))
    } else {
        debug!("rm: removing file {}", path.display());
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
    }
}

fn delete_children(dir: &Path) -> Result<()> {
    // Collect first so the directory handle is closed before recursing
    let mut children = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    children.sort();

    for child in children {
        delete(&child, true)?;
    }
    Ok(())
}
