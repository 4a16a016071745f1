use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong inside the library layer.
///
/// Per-file failures (`UnsupportedMedia`, `TagRead`, and I/O errors while
/// probing a single entry) are local: the scanner/reconciler skips the file
/// and keeps going. `Store` failures abort the current pass so the caller
/// never ends up silently diverged from the real folder contents.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a supported media type: {path}")]
    UnsupportedMedia { path: PathBuf },

    #[error("failed to read tags from {path}: {source}")]
    TagRead {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("a playlist named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("\"{path}\" is already in playlist \"{playlist}\"")]
    AlreadyMember { playlist: String, path: String },

    #[error("catalog store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("catalog lock poisoned by a panicked thread")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, LibraryError>;
