use std::io;
use std::path::PathBuf;

/// Errors raised while reading, rewriting or reporting on the xrefs table,
/// or while talking to the grounding service.
#[derive(Debug, thiserror::Error)]
pub enum XrefError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("grounding request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("cannot write report output: {0}")]
    Output(#[source] io::Error),
}

impl XrefError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        XrefError::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        XrefError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, XrefError>;
