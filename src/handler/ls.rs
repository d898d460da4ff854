// Ls util

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use std::fs::{self, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::common::expand_globs;
use crate::pipes::Pipes;
use crate::util::PipableCliUtil;

#[derive(Parser, Debug, Default)]
#[command(name = "ls", version, about = "List directory contents")]
pub struct Ls {
    /// Include entries starting with '.'
    #[arg(short = 'a')]
    pub all: bool,

    /// Long listing: mode, size, modification time
    #[arg(short = 'l')]
    pub long: bool,

    /// List subdirectories recursively
    #[arg(short = 'R')]
    pub recursive: bool,

    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,
}

impl Ls {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

impl PipableCliUtil for Ls {
    const NAME: &'static str = "ls";

    fn exec(self, pipes: &mut Pipes<'_>) -> Result<()> {
        let mut expanded_args = expand_globs(&self.paths);
        if expanded_args.is_empty() {
            expanded_args.push(PathBuf::from("."));
        }

        let show_header = expanded_args.len() > 1 || self.recursive;
        let mut first = true;
        let mut after_listing = false;

        for path in &expanded_args {
            let meta = fs::metadata(path)
                .with_context(|| format!("Cannot access '{}'", path.display()))?;

            if meta.is_dir() {
                self.list_dir(path, show_header, &mut first, &mut *pipes.stdout)?;
                after_listing = true;
            } else {
                if after_listing {
                    writeln!(pipes.stdout)?;
                }
                self.print_entry(&path.display().to_string(), &meta, &mut *pipes.stdout)?;
                first = false;
                after_listing = false;
            }
        }
        Ok(())
    }
}

impl Ls {
    fn list_dir(&self, dir: &Path, show_header: bool, first: &mut bool, out: &mut dyn Write) -> Result<()> {
        if show_header {
            if !*first {
                writeln!(out)?;
            }
            writeln!(out, "{}:", dir.display())?;
        }
        *first = false;

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.all && name.starts_with('.') {
                continue;
            }
            entries.push((name, entry.path()));
        }

        // Sort for consistent output
        entries.sort();

        let mut subdirs = Vec::new();
        for (name, path) in &entries {
            let meta = fs::symlink_metadata(path)
                .with_context(|| format!("Cannot stat '{}'", path.display()))?;
            self.print_entry(name, &meta, out)?;
            if meta.is_dir() {
                subdirs.push(path);
            }
        }

        if self.recursive {
            for sub in subdirs {
                self.list_dir(sub, true, first, out)?;
            }
        }
        Ok(())
    }

    fn print_entry(&self, name: &str, meta: &Metadata, out: &mut dyn Write) -> Result<()> {
        if self.long {
            let modified = meta
                .modified()
                .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|_| "-".repeat(16));
            writeln!(out, "{} {:>10} {} {}", mode_string(meta), meta.len(), modified, name)?;
        } else {
            writeln!(out, "{}", name)?;
        }
        Ok(())
    }
}

/// Ten-character type + permission string, e.g. `drwxr-xr-x`.
pub fn mode_string(meta: &Metadata) -> String {
    let ft = meta.file_type();
    let kind = if ft.is_dir() {
        'd'
    } else if ft.is_symlink() {
        'l'
    } else {
        '-'
    };

    let mut s = String::with_capacity(10);
    s.push(kind);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = meta.permissions().mode();
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
    }

    #[cfg(not(unix))]
    {
        let w = if meta.permissions().readonly() { '-' } else { 'w' };
        for _ in 0..3 {
            s.push('r');
            s.push(w);
            s.push('-');
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn run(ls: Ls) -> Result<String> {
        let mut inp = io::empty();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut pipes = Pipes::new(&mut inp, &mut out, &mut err);
        ls.exec(&mut pipes)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "bb").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join(".hidden"), "h").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        dir
    }

    #[test]
    fn test_ls_sorted_and_hides_dotfiles() {
        let dir = fixture();
        let out = run(Ls::new([dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(out, "a.txt\nb.txt\nsub\n");
    }

    #[test]
    fn test_ls_all() {
        let dir = fixture();
        let mut ls = Ls::new([dir.path().to_str().unwrap()]);
        ls.all = true;
        let out = run(ls).unwrap();
        assert_eq!(out, ".hidden\na.txt\nb.txt\nsub\n");
    }

    #[test]
    fn test_ls_recursive() {
        let dir = fixture();
        let root = dir.path().display().to_string();
        let mut ls = Ls::new([root.as_str()]);
        ls.recursive = true;
        let out = run(ls).unwrap();
        let expected = format!("{root}:\na.txt\nb.txt\nsub\n\n{root}/sub:\nc.txt\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_ls_file_argument() {
        let dir = fixture();
        let file = dir.path().join("a.txt");
        let out = run(Ls::new([file.to_str().unwrap()])).unwrap();
        assert_eq!(out, format!("{}\n", file.display()));
    }

    #[test]
    fn test_ls_long() {
        let dir = fixture();
        let mut ls = Ls::new([dir.path().join("b.txt").to_str().unwrap()]);
        ls.long = true;
        let out = run(ls).unwrap();
        assert!(out.starts_with('-'));
        assert!(out.contains(" 2 "));
        assert!(out.trim_end().ends_with("b.txt"));
    }

    #[test]
    fn test_ls_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = run(Ls::new([missing.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().starts_with("Cannot access"));
        let io_err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_ls_file_then_directory_separated() {
        let dir = fixture();
        let file = dir.path().join("a.txt").display().to_string();
        let sub = dir.path().join("sub").display().to_string();

        let out = run(Ls::new([file.as_str(), sub.as_str()])).unwrap();
        assert_eq!(out, format!("{file}\n\n{sub}:\nc.txt\n"));
    }

    #[test]
    fn test_ls_directory_then_files_separated() {
        let dir = fixture();
        let sub = dir.path().join("sub").display().to_string();
        let a = dir.path().join("a.txt").display().to_string();
        let b = dir.path().join("b.txt").display().to_string();

        let out = run(Ls::new([sub.as_str(), a.as_str(), b.as_str()])).unwrap();
        assert_eq!(out, format!("{sub}:\nc.txt\n\n{a}\n{b}\n"));
    }

    #[test]
    fn test_ls_two_directories_headers() {
        let dir = fixture();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let empty = dir.path().join("empty").display().to_string();
        let sub = dir.path().join("sub").display().to_string();

        let out = run(Ls::new([empty.as_str(), sub.as_str()])).unwrap();
        assert_eq!(out, format!("{empty}:\n\n{sub}:\nc.txt\n"));
    }

    #[test]
    fn test_mode_string_dir() {
        let dir = tempfile::tempdir().unwrap();
        let meta = fs::metadata(dir.path()).unwrap();
        let mode = mode_string(&meta);
        assert_eq!(mode.len(), 10);
        assert!(mode.starts_with('d'));
    }
}
