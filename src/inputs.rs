use anyhow::{bail, Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand command-line paths into the list of archives to read
///
/// Directories are replaced by every `.bsa` file below them (sorted by
/// path, symlinks followed); anything else is passed through as given, so
/// a missing file still fails when it is opened. A directory that cannot
/// be walked, or that holds no archives, is an error.
pub fn collect_archives(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();

    for path in paths {
        if path.is_dir() {
            let found = archives_in_dir(path)
                .with_context(|| format!("Failed to search directory: {:?}", path))?;
            if found.is_empty() {
                bail!("No BSA archives found in {:?}", path);
            }
            debug!("Found {} archives in {:?}", found.len(), path);
            archives.extend(found);
        } else {
            archives.push(path.clone());
        }
    }

    Ok(archives)
}

fn archives_in_dir(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        // With links followed, file_type() describes the link target
        if entry.file_type().is_file() && is_bsa(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn is_bsa(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("bsa"))
        .unwrap_or(false)
}
