use std::path::{Path, PathBuf};

#[derive(Debug, Clone, thiserror::Error)]
pub(crate) enum DedupError {
    #[error("'{}' and {limit} renamed copies of it already exist", .path.display())]
    Exhausted { path: PathBuf, limit: u32 },
}

/// Strip characters that are not allowed (or not wanted) in file names.
pub(crate) fn remove_illegal_characters(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '"' | '/' | '*' | '?' | '<' | '>' | '|' | '\'' | ':'))
        .collect()
}

/// Files directly inside `dir` whose name contains `needle`, ignoring case.
pub(crate) fn find_files(dir: &Path, needle: &str) -> Vec<PathBuf> {
    let contents = match std::fs::read_dir(dir) {
        Ok(contents) => contents,
        Err(_) => return vec![],
    };
    let needle = needle.to_lowercase();

    let mut found: Vec<PathBuf> = contents
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .map(|entry| entry.path())
        .collect();
    found.sort();
    found
}

/// `path` itself if free, otherwise the first free `<stem><key><n>.<ext>` for `n` in `1..=limit`.
pub(crate) fn dedup_path(path: &Path, limit: u32, key: &str) -> Result<PathBuf, DedupError> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    for n in 1..=limit {
        let candidate = path.with_file_name(format!("{stem}{key}{n}{extension}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(DedupError::Exhausted {
        path: path.to_path_buf(),
        limit,
    })
}

/// Rename, falling back to copy + delete when crossing file systems.
pub(crate) fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
