//! Error types shared by the library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout songbase
pub type Result<T> = std::result::Result<T, SongbaseError>;

/// Everything that can go wrong while loading, changing or writing playlists
#[derive(Error, Debug)]
pub enum SongbaseError {
    /// A referenced song, playlist or folder is missing
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// File name does not follow `<interpret>--<title>.<ext>`
    #[error("Cannot detect interpret and title: {}", .0.display())]
    MalformedName(PathBuf),

    /// Playlist extension or `--type` value is not m3u/m3u8
    #[error("Playlist type not supported: {0}")]
    UnsupportedType(String),

    /// Song path cannot be expressed relative to a playlist base folder
    #[error("Song is outside of playlist base: {}", .0.display())]
    OutsideBase(PathBuf),

    /// Target of a song move is not an existing directory
    #[error("New folder not found: {}", .0.display())]
    DestinationNotADirectory(PathBuf),

    /// A playlist with the same file is already registered
    #[error("Playlist already registered: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Second playlist bound to the same standard stream
    #[error("Only one playlist can use {0}")]
    StreamAlreadyBound(&'static str),

    /// `--map` argument is not `FROM[=TO]`
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    /// Any underlying read, write, move or delete failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl SongbaseError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        SongbaseError::NotFound {
            what,
            path: path.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        SongbaseError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = SongbaseError::not_found("Song", "/music/Neu/A--B.mp3");
        assert_eq!(err.to_string(), "Song not found: /music/Neu/A--B.mp3");
    }

    #[test]
    fn test_io_keeps_source() {
        let err = SongbaseError::io(
            "Failed to write playlist",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to write playlist: denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
