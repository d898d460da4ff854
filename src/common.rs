use anyhow::{Context, Result};
use glob::glob;
use log::warn;
use std::path::PathBuf;

fn has_glob_chars(arg: &str) -> bool {
    arg.contains('*') || arg.contains('?') || arg.contains('[')
}

/// Expands one pattern to the paths that exist on disk.
///
/// Zero matches is an empty list, not an error. A literal path that does not
/// exist also yields nothing. An invalid pattern is an error.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

    let mut matched = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => matched.push(path),
            Err(e) => warn!("glob: skipping unreadable path {}: {}", e.path().display(), e.error()),
        }
    }
    Ok(matched)
}

/// Expands every argument, keeping arguments that match nothing (shell
/// behavior) so the filesystem call that follows reports them as missing.
pub fn expand_globs(args: &[String]) -> Vec<PathBuf> {
    let mut expanded_args = Vec::new();

    for arg in args {
        if !has_glob_chars(arg) {
            expanded_args.push(PathBuf::from(arg));
            continue;
        }

        match expand_pattern(arg) {
            Ok(mut matched_paths) if !matched_paths.is_empty() => {
                matched_paths.sort();
                expanded_args.extend(matched_paths);
            }
            // No matches or invalid pattern: keep original argument
            _ => expanded_args.push(PathBuf::from(arg)),
        }
    }
    expanded_args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_expand_globs() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.tmp")).unwrap();
        File::create(dir.path().join("b.tmp")).unwrap();
        File::create(dir.path().join("c.txt")).unwrap();

        let pattern = format!("{}/*.tmp", dir.path().display());
        let expanded = expand_globs(&[pattern]);

        assert_eq!(expanded, vec![dir.path().join("a.tmp"), dir.path().join("b.tmp")]);
    }

    #[test]
    fn test_expand_globs_no_match() {
        let args = vec!["*.nomatch".to_string()];
        let expanded = expand_globs(&args);
        assert_eq!(expanded, vec![PathBuf::from("*.nomatch")]);
    }

    #[test]
    fn test_expand_globs_keeps_literals() {
        let args = vec!["does/not/exist.txt".to_string()];
        assert_eq!(expand_globs(&args), vec![PathBuf::from("does/not/exist.txt")]);
    }

    #[test]
    fn test_expand_pattern_no_match_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.nomatch", dir.path().display());
        assert!(expand_pattern(&pattern).unwrap().is_empty());

        let literal = dir.path().join("missing.txt");
        assert!(expand_pattern(literal.to_str().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_expand_pattern_invalid() {
        assert!(expand_pattern("[").is_err());
    }
}
