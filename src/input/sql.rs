//! SQL file loading
//!
//! Reads `.sql` files from disk and splits each one into statements with the
//! statement splitter.

use crate::input::LoadError;
use crate::parser::StatementSplitter;
use std::path::{Path, PathBuf};

/// One SQL file split into statements.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlScript {
    pub path: PathBuf,
    pub statements: Vec<String>,
}

/// Loader for plain SQL files.
///
/// Reads `.sql` files from the given paths, sorted lexicographically by
/// filename. Each file becomes one `SqlScript`.
#[derive(Debug, Default)]
pub struct SqlLoader {
    splitter: StatementSplitter,
}

impl SqlLoader {
    pub fn new(strip_comments: bool) -> Self {
        Self {
            splitter: StatementSplitter::new(strip_comments),
        }
    }

    /// Load scripts from the given paths.
    ///
    /// A directory contributes the `.sql` files directly inside it; a file
    /// path is taken as is when it has a `.sql` extension and skipped
    /// otherwise. A path that does not exist is an error. Scripts come back
    /// ordered by file name, across all paths.
    pub fn load(&self, paths: &[PathBuf]) -> Result<Vec<SqlScript>, LoadError> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(sql_files_in(path)?);
            } else if !path.is_file() {
                return Err(LoadError::Io {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("no such file or directory: {}", path.display()),
                    ),
                });
            } else if is_sql_file(path) {
                files.push(path.clone());
            } else {
                tracing::debug!(path = %path.display(), "skipping non-SQL file");
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        files.iter().map(|file| self.load_file(file)).collect()
    }

    /// Read a single file and split it into statements.
    pub fn load_file(&self, path: &Path) -> Result<SqlScript, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let statements = self.splitter.split(&source);
        tracing::debug!(
            path = %path.display(),
            statements = statements.len(),
            "split SQL file"
        );

        Ok(SqlScript {
            path: path.to_path_buf(),
            statements,
        })
    }
}

/// The `.sql` files directly inside `dir`, in directory order.
fn sql_files_in(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_sql_file(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn is_sql_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}
