//! Errors raised while loading scenes, models and material libraries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by texture decoders.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal conditions that abort a load.
///
/// Every variant carries the path of the file being parsed when the error
/// occurred so that failures deep in a scene's dependency chain stay
/// attributable once they bubble up.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directive required a number or keyword and got something else.
    #[error("{}:{line}: expected {expected}, found {found:?}", .path.display())]
    MalformedToken {
        path: PathBuf,
        line: usize,
        expected: &'static str,
        found: String,
    },

    /// A face directive that cannot be read as a triangle.
    #[error("{}:{line}: malformed face: {reason}", .path.display())]
    MalformedFace {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A name that was used before it was declared, or a file that does not exist.
    #[error("{}:{line}: unresolved {kind} \"{name}\"", .path.display())]
    UnresolvedReference {
        path: PathBuf,
        line: usize,
        kind: &'static str,
        name: String,
    },

    /// A block ended without a field it cannot do without.
    #[error("{}:{line}: {block} block is missing `{field}`", .path.display())]
    MissingField {
        path: PathBuf,
        line: usize,
        block: &'static str,
        field: &'static str,
    },

    /// A texture referenced by a material could not be decoded.
    #[error("unable to decode texture {}: {source}", .path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the error means the file itself was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
