//! File lookup and script text loading

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("missing filepath")]
    EmptyName,

    #[error("can't find file {name}")]
    NotFound { name: String },

    #[error("could not open file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves a script name to a readable file.
pub trait FileLocator {
    fn locate(&self, name: &str) -> Result<PathBuf, FileError>;
}

/// Ordered list of directories searched for script files.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl FileLocator for SearchPath {
    fn locate(&self, name: &str) -> Result<PathBuf, FileError> {
        if name.is_empty() {
            return Err(FileError::EmptyName);
        }

        let direct = Path::new(name);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        if direct.is_relative() {
            if let Some(found) = self
                .roots
                .iter()
                .map(|root| root.join(direct))
                .find(|candidate| candidate.is_file())
            {
                return Ok(found);
            }
        }

        Err(FileError::NotFound {
            name: name.to_string(),
        })
    }
}

/// Read a text file, normalizing line breaks to `\n`.
pub fn read_text(path: &Path) -> Result<Vec<u8>, FileError> {
    let bytes = std::fs::read(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut text = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        if byte == b'\r' {
            if iter.peek() == Some(&b'\n') {
                iter.next();
            }
            text.push(b'\n');
        } else {
            text.push(byte);
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn locates_through_search_roots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("patch.js"), "x = 1").unwrap();

        let search = SearchPath::new(vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()]);
        assert_eq!(search.locate("patch.js").unwrap(), dir.path().join("patch.js"));
    }

    #[test]
    fn absolute_paths_bypass_roots() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("abs.js");
        fs::write(&script, "").unwrap();

        let search = SearchPath::default();
        assert_eq!(search.locate(script.to_str().unwrap()).unwrap(), script);
    }

    #[test]
    fn missing_files_are_reported() {
        let search = SearchPath::default();
        assert!(matches!(search.locate(""), Err(FileError::EmptyName)));
        assert!(matches!(
            search.locate("/nonexistent/path.js"),
            Err(FileError::NotFound { .. })
        ));
    }

    #[test]
    fn read_text_normalizes_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("crlf.js");
        fs::write(&script, b"a\r\nb\rc\n").unwrap();

        assert_eq!(read_text(&script).unwrap(), b"a\nb\nc\n");
        assert!(matches!(
            read_text(&dir.path().join("gone.js")),
            Err(FileError::Io { .. })
        ));
    }

    #[test]
    fn io_errors_name_the_cause() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.js");
        let err = read_text(&gone).unwrap_err();

        let rendered = err.to_string();
        assert!(rendered.starts_with(&format!("could not open file '{}': ", gone.display())));
        assert_eq!(rendered.matches("could not open file").count(), 1);
        assert!(!rendered.ends_with(": "));
    }
}
