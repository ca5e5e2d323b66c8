//! Asset directory access: spreadsheet discovery and JSON files

use miette::Diagnostic;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Find the most recently created spreadsheet with `extension` in `dir`.
///
/// Falls back to modification time where the platform has no creation
/// time. Ties go to the lexically last file name so the choice is stable.
pub fn find_latest_spreadsheet(dir: &Path, extension: &str) -> Result<PathBuf, AssetError> {
    if !dir.is_dir() {
        return Err(AssetError::DirNotFound(dir.to_path_buf()));
    }

    let wanted = extension.trim_start_matches('.').to_lowercase();
    let mut best: Option<(SystemTime, PathBuf)> = None;

    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let matches = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase() == wanted)
            .unwrap_or(false);
        // Skip lock files left by spreadsheet editors
        let is_lock = entry.file_name().to_string_lossy().starts_with("~$");
        if !matches || is_lock {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| AssetError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &best {
            None => true,
            Some((time, best_path)) => {
                created > *time || (created == *time && path > best_path.as_path())
            }
        };
        if newer {
            best = Some((created, path.to_path_buf()));
        }
    }

    best.map(|(_, path)| path).ok_or_else(|| AssetError::NoSpreadsheet {
        dir: dir.to_path_buf(),
        extension: wanted,
    })
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let contents = fs::read_to_string(path).map_err(|e| AssetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| AssetError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `value` as indented JSON, returning the SHA256 of the content.
///
/// The file is written to a temporary sibling first and renamed into
/// place, so an interrupted run never leaves a partial file behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<String, AssetError> {
    let contents = serde_json::to_string_pretty(value).map_err(|e| AssetError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;

    let io_err = |source: std::io::Error| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, &contents).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;

    Ok(compute_hash(&contents))
}

/// Compute SHA256 hash of content
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Errors that can occur while reading or writing asset files
#[derive(Debug, Error, Diagnostic)]
pub enum AssetError {
    #[error("assets directory {0:?} does not exist")]
    #[diagnostic(code(rfqi::assets::missing_dir))]
    DirNotFound(PathBuf),

    #[error("no .{extension} files found in {dir:?}")]
    #[diagnostic(
        code(rfqi::assets::no_spreadsheet),
        help("copy the spreadsheet into the assets directory or pass --input")
    )]
    NoSpreadsheet { dir: PathBuf, extension: String },

    #[error("IO error on {path:?}: {source}")]
    #[diagnostic(code(rfqi::assets::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    #[diagnostic(code(rfqi::assets::json))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_find_latest_spreadsheet_picks_newest() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("old.xlsx"), "a").unwrap();
        sleep(Duration::from_millis(50));
        fs::write(tmp.path().join("new.xlsx"), "b").unwrap();
        fs::write(tmp.path().join("notes.txt"), "c").unwrap();

        let found = find_latest_spreadsheet(tmp.path(), "xlsx").unwrap();
        assert_eq!(found.file_name().unwrap(), "new.xlsx");
    }

    #[test]
    fn test_find_latest_spreadsheet_ignores_lock_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("data.xlsx"), "a").unwrap();
        sleep(Duration::from_millis(50));
        fs::write(tmp.path().join("~$data.xlsx"), "b").unwrap();

        let found = find_latest_spreadsheet(tmp.path(), ".xlsx").unwrap();
        assert_eq!(found.file_name().unwrap(), "data.xlsx");
    }

    #[test]
    fn test_find_latest_spreadsheet_errors() {
        let tmp = tempdir().unwrap();
        let err = find_latest_spreadsheet(tmp.path(), "xlsx").unwrap_err();
        assert!(matches!(err, AssetError::NoSpreadsheet { .. }));

        let err = find_latest_spreadsheet(&tmp.path().join("missing"), "xlsx").unwrap_err();
        assert!(matches!(err, AssetError::DirNotFound(_)));
    }

    #[test]
    fn test_write_json_is_pretty_and_hashed() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/out.json");

        let digest = write_json(&path, &vec!["ر.س"]).unwrap();
        let written = fs::read_to_string(&path).unwrap();

        assert_eq!(written, "[\n  \"ر.س\"\n]");
        assert_eq!(digest, compute_hash(&written));
        assert!(!tmp.path().join("nested/out.json.tmp").exists());

        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["ر.س"]);
    }

    #[test]
    fn test_read_json_reports_bad_content() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, AssetError::Json { .. }));
    }
}
