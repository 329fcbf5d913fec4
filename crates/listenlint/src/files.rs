use std::fs;
use std::path::{Path, PathBuf};

use listenlint_common::LintManifest;

use crate::error::CliError;

/// Directory names never descended into.
const ALWAYS_SKIPPED: [&str; 2] = [".git", "node_modules"];

/// Expand the command-line paths into the sorted list of files to lint.
///
/// Files named explicitly are kept whatever their extension. Directories
/// are walked recursively for files with a configured extension.
pub fn discover(paths: &[PathBuf], manifest: &LintManifest) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            visit_dir(path, manifest, &mut files)?;
        } else {
            return Err(CliError::MissingPath(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered files");
    Ok(files)
}

fn visit_dir(dir: &Path, manifest: &LintManifest, files: &mut Vec<PathBuf>) -> Result<(), CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if ALWAYS_SKIPPED.contains(&name) || manifest.is_ignored(name) {
            tracing::trace!(path = %path.display(), "skipped");
            continue;
        }

        if path.is_dir() {
            visit_dir(&path, manifest, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| manifest.accepts_extension(ext))
        {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn defaults(root: &Path) -> LintManifest {
        LintManifest::defaults(root.to_path_buf())
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn walks_directories_recursively() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("components");
        fs::create_dir(&sub).unwrap();
        File::create(dir.path().join("main.js")).unwrap();
        File::create(dir.path().join("worker.mjs")).unwrap();
        File::create(dir.path().join("styles.css")).unwrap();
        File::create(sub.join("button.cjs")).unwrap();

        let files = discover(&[dir.path().to_path_buf()], &defaults(dir.path())).unwrap();
        assert_eq!(
            names(&files, dir.path()),
            vec!["components/button.cjs", "main.js", "worker.mjs"]
        );
    }

    #[test]
    fn skips_vcs_dependencies_and_ignored_names() {
        let dir = tempdir().unwrap();
        for skipped in [".git", "node_modules", "dist"] {
            let sub = dir.path().join(skipped);
            fs::create_dir(&sub).unwrap();
            File::create(sub.join("bundle.js")).unwrap();
        }
        File::create(dir.path().join("app.js")).unwrap();

        let mut manifest = defaults(dir.path());
        manifest.files.ignore.push("dist".to_string());
        let files = discover(&[dir.path().to_path_buf()], &manifest).unwrap();
        assert_eq!(names(&files, dir.path()), vec!["app.js"]);
    }

    #[test]
    fn explicit_files_are_always_linted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.jsx");
        File::create(&path).unwrap();

        let files = discover(&[path.clone()], &defaults(dir.path())).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn results_are_sorted_and_deduplicated() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        File::create(&a).unwrap();
        File::create(&b).unwrap();

        let files = discover(
            &[b.clone(), dir.path().to_path_buf(), a.clone()],
            &defaults(dir.path()),
        )
        .unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.js");
        let err = discover(&[missing], &defaults(dir.path())).unwrap_err();
        assert!(matches!(err, CliError::MissingPath(_)));
    }
}
