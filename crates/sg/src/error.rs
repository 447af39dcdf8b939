use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SgError {
    #[error("IO error while {action} {path}: {source}")]
    IoAt {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory walk error in {path}: {message}")]
    WalkDir { path: PathBuf, message: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Missing required field '{field}' in file: {path}")]
    MissingField { field: String, path: PathBuf },

    #[error("Invalid date '{value}' in file: {path}")]
    InvalidDate { value: String, path: PathBuf },

    #[error("Feed error: {0}")]
    Feed(#[from] atom_syndication::Error),

    #[error("Unknown syntax highlighting theme: {name}")]
    UnknownSyntaxTheme { name: String },
}

pub type Result<T> = std::result::Result<T, SgError>;

/// Attaches the attempted action and the offending path to an I/O error.
pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, action: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| SgError::IoAt {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_context_names_path_and_action() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let error = result
            .io_context("reading", "content/post.md")
            .unwrap_err();

        let message = error.to_string();
        assert!(message.contains("reading"));
        assert!(message.contains("content/post.md"));
        assert!(message.contains("no such file"));
    }
}
