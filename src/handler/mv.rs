// Mv util

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use crate::common::expand_globs;
use crate::pipes::Pipes;
use crate::util::PipableCliUtil;

#[derive(Parser, Debug, Default)]
#[command(name = "mv", version, about = "Move (rename) files")]
pub struct Mv {
    /// Sources followed by the destination
    #[arg(value_name = "PATHS")]
    pub args: Vec<String>,
}

impl Mv {
    pub fn new<I, S>(sources: I, dest: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = sources.into_iter().map(Into::into).collect();
        args.push(dest.into());
        Self { args }
    }
}

impl PipableCliUtil for Mv {
    const NAME: &'static str = "mv";

    fn exec(self, _pipes: &mut Pipes<'_>) -> Result<()> {
        let Some((dest, sources)) = self.args.split_last() else {
            bail!("mv requires at least source and destination");
        };
        if sources.is_empty() {
            bail!("mv requires at least source and destination");
        }

        let sources = expand_globs(sources);
        let dest_path = Path::new(dest);
        let dest_is_dir = dest_path.is_dir();

        if sources.len() > 1 && !dest_is_dir {
            bail!("Target '{}' is not a directory", dest);
        }

        for src in &sources {
            let target = target_path(src, dest_path, dest_is_dir)?;
            debug!("mv: {} -> {}", src.display(), target.display());
            fs::rename(src, &target)
                .with_context(|| format!("Failed to move {} to {}", src.display(), target.display()))?;
        }
        Ok(())
    }
}

fn target_path(src: &Path, dest: &Path, dest_is_dir: bool) -> Result<PathBuf> {
    if dest_is_dir {
        let name = src.file_name().ok_or_else(|| anyhow!("Invalid source filename: {}", src.display()))?;
        Ok(dest.join(name))
    } else {
        Ok(dest.to_path_buf())
    }
}
