use super::Song;
use crate::error::{Result, SongbaseError};
use crate::paths;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Song referenced by a playlist, at a position and relative to the
/// playlist's base folder
#[derive(Debug, Clone)]
pub struct Entry {
    song: Song,

    /// Base folder of the owning playlist (shared by all its entries)
    base: Arc<Path>,

    /// Folder of the song relative to `base`, empty when directly inside
    relative_folder: PathBuf,

    /// Position in the owning playlist (0-based)
    index: usize,
}

impl Entry {
    /// Parse an entry from a playlist line already resolved to a path
    pub fn parse(base: &Arc<Path>, relative_file: &Path, index: usize, verify: bool) -> Result<Entry> {
        let song = Song::parse(&base.join(relative_file), verify)?;
        Entry::from_song(base, song, index)
    }

    /// Bind an existing song to a playlist base
    pub fn from_song(base: &Arc<Path>, song: Song, index: usize) -> Result<Entry> {
        let relative_file = paths::relativize(base, song.path())
            .ok_or_else(|| SongbaseError::OutsideBase(song.path().to_path_buf()))?;
        let relative_folder = relative_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Entry {
            song,
            base: Arc::clone(base),
            relative_folder,
            index,
        })
    }

    /// The referenced song
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Absolute path of the song file
    pub fn path(&self) -> &Path {
        self.song.path()
    }

    /// File name of the song
    pub fn file_name(&self) -> &str {
        self.song.file_name()
    }

    /// Interpret of the song
    pub fn interpret(&self) -> &str {
        self.song.interpret()
    }

    /// Title of the song
    pub fn title(&self) -> &str {
        self.song.title()
    }

    /// Base folder of the owning playlist
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Song folder relative to the base
    pub fn relative_folder(&self) -> &Path {
        &self.relative_folder
    }

    /// Position in the owning playlist
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Relative folder with `/` separators
    pub fn folder_string(&self) -> String {
        paths::to_slash(&self.relative_folder)
    }

    /// Playlist line for this entry: `folder/file` or bare `file`
    pub fn entry_string(&self) -> String {
        let folder = self.folder_string();
        if folder.is_empty() {
            self.file_name().to_string()
        } else {
            format!("{}/{}", folder, self.file_name())
        }
    }

    /// Playlist line for this entry as seen from another folder
    pub fn rebased_string(&self, folder: &Path) -> Result<String> {
        paths::relativize(folder, self.path())
            .map(|relative| paths::to_slash(&relative))
            .ok_or_else(|| SongbaseError::OutsideBase(self.path().to_path_buf()))
    }

    /// Case-insensitive comparison of the absolute paths
    pub fn cmp_ignore_case(&self, other: &Entry) -> Ordering {
        let a = self.path().to_string_lossy();
        let b = other.path().to_string_lossy();
        a.chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
    }
}
