use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_EXTENSION: &str = "xml";

/// Resolves base paths into the unique set of candidate report files.
///
/// A base path that is an existing file is taken as-is; a missing path is
/// dropped silently. A directory expands, non-recursively, to the `.xml`
/// files directly inside it. Duplicates among the inputs collapse to one
/// candidate.
pub fn resolve_report_paths(base_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for base in base_paths {
        if base.is_dir() {
            let Ok(entries) = fs::read_dir(base) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && has_report_extension(&path) && seen.insert(path.clone()) {
                    resolved.push(path);
                }
            }
        } else if base.is_file() && seen.insert(base.clone()) {
            resolved.push(base.clone());
        }
    }

    resolved
}

fn has_report_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(REPORT_EXTENSION))
        .unwrap_or(false)
}
