//! Backing stores a playlist is read from and written to

use super::{read_entries, write_entries, Format};
use crate::error::{Result, SongbaseError};
use crate::paths;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Where playlist lines come from or go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Store {
    File(PathBuf),
    Stdin,
    Stdout,
    None,
}

/// A store together with the format used to encode it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistIo {
    store: Store,
    format: Format,
}

impl PlaylistIo {
    /// Playlist file, format taken from its extension
    pub fn file(path: &Path) -> Result<Self> {
        let format = Format::detect(path)?;
        let path = paths::absolutize(path)
            .map_err(|e| SongbaseError::io(format!("Failed to resolve {}", path.display()), e))?;
        Ok(Self {
            store: Store::File(path),
            format,
        })
    }

    pub fn stdin(format: Format) -> Self {
        Self {
            store: Store::Stdin,
            format,
        }
    }

    pub fn stdout(format: Format) -> Self {
        Self {
            store: Store::Stdout,
            format,
        }
    }

    /// Neither readable nor writable
    pub fn detached(format: Format) -> Self {
        Self {
            store: Store::None,
            format,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.store {
            Store::File(path) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Display name used in log lines
    pub fn name(&self) -> String {
        match &self.store {
            Store::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Store::Stdin => "<stdin>".to_string(),
            Store::Stdout => "<stdout>".to_string(),
            Store::None => "<none>".to_string(),
        }
    }

    pub fn has_input(&self) -> bool {
        matches!(self.store, Store::File(_) | Store::Stdin)
    }

    pub fn has_output(&self) -> bool {
        matches!(self.store, Store::File(_) | Store::Stdout)
    }

    pub fn is_stdin(&self) -> bool {
        self.store == Store::Stdin
    }

    pub fn is_stdout(&self) -> bool {
        self.store == Store::Stdout
    }

    /// Feed every entry line of the store to `on_entry`
    pub fn read<F>(&self, on_entry: F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        match &self.store {
            Store::File(path) => {
                let file = File::open(path).map_err(|e| {
                    SongbaseError::io(format!("Failed to open playlist {}", path.display()), e)
                })?;
                read_entries(self.format, BufReader::new(file), on_entry)
            }
            Store::Stdin => read_entries(self.format, io::stdin().lock(), on_entry),
            Store::Stdout | Store::None => Ok(()),
        }
    }

    /// Replace the store content with `lines`
    pub fn save<I>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match &self.store {
            Store::File(path) => {
                let file = File::create(path).map_err(|e| {
                    SongbaseError::io(format!("Failed to create playlist {}", path.display()), e)
                })?;
                write_entries(self.format, file, lines).map_err(|e| {
                    SongbaseError::io(format!("Failed to write playlist {}", path.display()), e)
                })
            }
            Store::Stdout => write_entries(self.format, io::stdout().lock(), lines)
                .map_err(|e| SongbaseError::io("Failed to write playlist to stdout", e)),
            Store::Stdin | Store::None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let io = PlaylistIo::file(&dir.path().join("Rock.m3u8")).unwrap();
        assert_eq!(io.format(), Format::MultiByte);
        assert_eq!(io.name(), "Rock.m3u8");
        assert!(io.has_input() && io.has_output());

        io.save(["Neu/Björk--Jóga.mp3", "A--B.mp3"]).unwrap();
        let mut lines = Vec::new();
        io.read(|path| {
            lines.push(path.to_path_buf());
            Ok(())
        })
        .unwrap();
        assert_eq!(lines, vec![PathBuf::from("Neu/Björk--Jóga.mp3"), PathBuf::from("A--B.mp3")]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let io = PlaylistIo::file(&dir.path().join("Missing.m3u")).unwrap();
        let err = io.read(|_| Ok(())).unwrap_err();
        assert!(matches!(err, SongbaseError::Io { .. }));
        assert!(!dir.path().join("Missing.m3u").exists());
        fs::write(dir.path().join("Missing.m3u"), b"").unwrap();
        assert!(io.read(|_| Ok(())).is_ok());
    }

    #[test]
    fn test_stream_stores() {
        let stdin = PlaylistIo::stdin(Format::SingleByte);
        assert!(stdin.has_input() && !stdin.has_output());
        assert!(stdin.is_stdin());

        let stdout = PlaylistIo::stdout(Format::MultiByte);
        assert!(!stdout.has_input() && stdout.has_output());
        assert_eq!(stdout.name(), "<stdout>");

        let detached = PlaylistIo::detached(Format::SingleByte);
        assert!(!detached.has_input() && !detached.has_output());
        assert!(detached.path().is_none());
    }
}
