use crate::config::non_overlapping_paths;
use crate::error::Error;
use glob::Pattern;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

pub fn compile_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

fn is_ignored(path: &Path, ignore_patterns: &[Pattern]) -> bool {
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(path))
}

/// Expand root paths into a sorted, de-duplicated list of regular files.
///
/// Directories are walked recursively without following symlinks. Roots
/// that do not exist are skipped.
pub fn collect_files(roots: &[PathBuf], ignore_globs: &[String]) -> Result<Vec<PathBuf>, Error> {
    let ignore_patterns = compile_patterns(ignore_globs);
    let mut files = BTreeSet::new();

    for root in non_overlapping_paths(roots.to_vec()) {
        if is_ignored(&root, &ignore_patterns) {
            debug!("Ignoring root {}", root.display());
            continue;
        }

        if root.is_file() {
            files.insert(root);
            continue;
        }
        if !root.is_dir() {
            debug!("Skipping missing root {}", root.display());
            continue;
        }

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry.path(), &ignore_patterns));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.io_error().map(|e| e.kind()) == Some(io::ErrorKind::PermissionDenied) {
                        error!("Access denied: {}", err);
                        continue;
                    }
                    return Err(err.into());
                }
            };
            if entry.file_type().is_file() {
                files.insert(entry.into_path());
            }
        }
    }

    Ok(files.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn test_collects_files_recursively_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("src/b.cpp"));
        touch(&root.join("src/a.cpp"));
        touch(&root.join("src/ui/widget.h"));
        touch(&root.join("CMakeLists.txt"));

        let files = collect_files(
            &[root.join("src"), root.join("CMakeLists.txt"), root.join("missing")],
            &[],
        )
        .unwrap();

        assert_eq!(
            files,
            vec![
                root.join("CMakeLists.txt"),
                root.join("src/a.cpp"),
                root.join("src/b.cpp"),
                root.join("src/ui/widget.h"),
            ]
        );
    }

    #[test]
    fn test_overlapping_roots_yield_each_file_once() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("src/a.c"));

        let files = collect_files(&[root.join("src/a.c"), root.join("src")], &[]).unwrap();
        assert_eq!(files, vec![root.join("src/a.c")]);
    }

    #[test]
    fn test_ignore_patterns_prune_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(&root.join("src/keep.c"));
        touch(&root.join("src/third_party/lib.c"));
        touch(&root.join("src/gen.c"));

        let files = collect_files(
            &[root.join("src")],
            &["**/third_party".to_string(), "**/gen.c".to_string(), "[".to_string()],
        )
        .unwrap();
        assert_eq!(files, vec![root.join("src/keep.c")]);
    }
}
