//! Data validation utilities.

use std::path::{Path, PathBuf};

use thiserror::Error;

use bchess_core::error::GameError;
use bchess_core::stats::StatTable;

/// Errors that stop validation before any file is checked.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The path or directory listing could not be read.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The directory holds no `.ron` files.
    #[error("No .ron data files found in {0}")]
    NoDataFiles(PathBuf),
}

/// Outcome for one data file.
#[derive(Debug)]
pub struct FileReport {
    /// File that was checked.
    pub path: PathBuf,
    /// Why the file was rejected, if it was.
    pub error: Option<GameError>,
}

impl FileReport {
    /// Whether the file holds a usable stat table.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome for a whole data directory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// One entry per file, in path order.
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Files that passed.
    pub fn valid_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_valid()).count()
    }

    /// Files that failed.
    pub fn invalid(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.is_valid())
    }

    /// Whether every file passed.
    pub fn is_ok(&self) -> bool {
        self.files.iter().all(FileReport::is_valid)
    }
}

/// Parse and validate one stat table file.
///
/// # Errors
///
/// Returns [`GameError::DataParseError`] for unreadable or malformed files
/// and [`GameError::InvalidState`] for tables no piece could play with.
pub fn validate_stat_file(path: &Path) -> Result<StatTable, GameError> {
    let name = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
        source_name: name.clone(),
        message: e.to_string(),
    })?;
    StatTable::from_ron_str(&text, &name)
}

/// Validate a single `.ron` file or every `.ron` file under a directory.
///
/// # Errors
///
/// Returns an error if the path cannot be listed or holds no data files.
/// Invalid files are reported in the [`ValidationReport`], not as errors.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport, ValidateError> {
    let mut paths = Vec::new();
    if path.is_file() {
        paths.push(path.to_path_buf());
    } else {
        collect_ron_files(path, &mut paths)?;
    }
    if paths.is_empty() {
        return Err(ValidateError::NoDataFiles(path.to_path_buf()));
    }
    paths.sort();

    let files = paths
        .into_iter()
        .map(|path| {
            let error = validate_stat_file(&path).err();
            match &error {
                Some(e) => tracing::warn!(path = %path.display(), error = %e, "Invalid data file"),
                None => tracing::debug!(path = %path.display(), "Data file ok"),
            }
            FileReport { path, error }
        })
        .collect();
    Ok(ValidationReport { files })
}

fn collect_ron_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ValidateError> {
    let io_err = |source| ValidateError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            collect_ron_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "ron") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_canonical_table_passes() {
        let dir = tempfile::tempdir().unwrap();
        let text = StatTable::default().to_ron_string().unwrap();
        let path = write(dir.path(), "piece_stats.ron", &text);

        assert_eq!(validate_stat_file(&path).unwrap(), StatTable::default());
        let report = validate_data_directory(dir.path()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.valid_count(), 1);
    }

    #[test]
    fn test_bad_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut zero_hp = StatTable::default();
        zero_hp.pawn.hp = 0;
        write(dir.path(), "a_good.ron", &StatTable::default().to_ron_string().unwrap());
        write(dir.path(), "b_zero_hp.ron", &zero_hp.to_ron_string().unwrap());
        write(dir.path(), "c_broken.ron", "(king: oops)");
        write(dir.path(), "notes.txt", "not data");

        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.valid_count(), 1);
        assert!(!report.is_ok());

        let invalid: Vec<_> = report.invalid().collect();
        assert!(matches!(invalid[0].error, Some(GameError::InvalidState(_))));
        assert!(matches!(
            invalid[1].error,
            Some(GameError::DataParseError { .. })
        ));
    }

    #[test]
    fn test_nested_directories_are_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("variants");
        fs::create_dir(&nested).unwrap();
        write(&nested, "heavy.ron", &StatTable::default().to_ron_string().unwrap());

        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].path.ends_with("variants/heavy.ron"));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(ValidateError::NoDataFiles(_))
        ));
        assert!(validate_data_directory(&dir.path().join("missing")).is_err());
    }
}
