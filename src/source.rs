//! Opening catalog documents.
//!
//! Every strategy goes through these helpers so that a missing or unreadable
//! path is reported as [`CatalogError::NotFound`] before any parsing begins,
//! whether the document is loaded whole or streamed.

use crate::error::{CatalogError, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Read the whole document into a string.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the file cannot be opened or read,
/// and [`CatalogError::MalformedInput`] if its content is not valid UTF-8.
pub fn load_text(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == ErrorKind::InvalidData => Err(CatalogError::MalformedInput(
            format!("{}: document is not valid UTF-8", path.display()),
        )),
        Err(err) => Err(CatalogError::not_found(path, err)),
    }
}

/// Open the document for buffered streaming.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the file cannot be opened.
pub fn open_stream(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|err| CatalogError::not_found(path, err))?;
    if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
        return Err(CatalogError::not_found(
            path,
            std::io::Error::new(ErrorKind::Other, "path is a directory"),
        ));
    }
    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_path_is_not_found() {
        let path = Path::new("definitely/not/here.xml");
        assert!(matches!(
            load_text(path),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            open_stream(path),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_text(dir.path()),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            open_stream(dir.path()),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<Library>\xff\xfe</Library>").unwrap();
        assert!(matches!(
            load_text(file.path()),
            Err(CatalogError::MalformedInput(_))
        ));
    }
}
