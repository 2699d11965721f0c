//! Which files a run reads.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

/// A file to optimize and the path its output takes beneath the output
/// directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub relative: PathBuf,
}

/// Collect the inputs of a run.
///
/// A file named directly keeps only its file name. Directories are walked
/// recursively for `.py` files, each keeping its path relative to the
/// directory it was found under.
pub fn discover(files: &[PathBuf], dirs: &[PathBuf]) -> Vec<InputFile> {
    let mut inputs = Vec::new();
    for path in files {
        match path.file_name() {
            Some(name) => inputs.push(InputFile {
                path: path.clone(),
                relative: PathBuf::from(name),
            }),
            None => warn!(path = %path.display(), "not a file, skipped"),
        }
    }
    for dir in dirs {
        walk(dir, &mut inputs);
    }
    inputs
}

fn walk(dir: &Path, inputs: &mut Vec<InputFile>) {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "cannot walk");
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_source(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            found.push(InputFile {
                path: entry.path().to_path_buf(),
                relative: relative.to_path_buf(),
            });
        }
    }
    found.sort_by(|a, b| a.relative.cmp(&b.relative));
    inputs.extend(found);
}

fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}
