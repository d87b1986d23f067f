//! Folder mapping: move the songs of one folder and fix every playlist

use super::config::SyncConfig;
use super::mover::FileMover;
use crate::error::{Result, SongbaseError};
use crate::model::{PlaylistId, PlaylistList, Song};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source folder and destination of a mapping run, `FROM[=TO]` on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderMapping {
    /// Folder relative to the playlist base, `/` separated
    pub from: String,

    /// Fallback destination relative to the playlist base
    pub to: PathBuf,

    /// Prefer `base/<interpret>` when that folder exists
    pub interpret_folders: bool,
}

impl Default for FolderMapping {
    fn default() -> Self {
        Self {
            from: "Neu".to_string(),
            to: PathBuf::from("Rock"),
            interpret_folders: true,
        }
    }
}

impl FolderMapping {
    pub fn new(from: &str, to: impl Into<PathBuf>) -> Self {
        Self {
            from: clean_folder(from),
            to: to.into(),
            interpret_folders: false,
        }
    }

    pub fn with_interpret_folders(mut self, enabled: bool) -> Self {
        self.interpret_folders = enabled;
        self
    }

    /// Destination folder for `song` below `base`
    fn destination(&self, base: &Path, song: &Song) -> PathBuf {
        if self.interpret_folders && !song.interpret().is_empty() {
            let folder = base.join(song.interpret());
            if folder.is_dir() {
                return folder;
            }
        }
        base.join(&self.to)
    }
}

impl FromStr for FolderMapping {
    type Err = SongbaseError;

    /// `FROM` keeps the default destination and interpret folders,
    /// `FROM=TO` moves everything to `TO`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('=').collect();
        if parts.len() > 2 || parts[0].is_empty() {
            return Err(SongbaseError::InvalidMapping(s.to_string()));
        }

        match parts.get(1).filter(|to| !to.is_empty()) {
            Some(to) => Ok(FolderMapping::new(parts[0], *to)),
            None => Ok(FolderMapping {
                from: clean_folder(parts[0]),
                ..FolderMapping::default()
            }),
        }
    }
}

impl fmt::Display for FolderMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.from, self.to.to_string_lossy().replace('\\', "/"))
    }
}

fn clean_folder(folder: &str) -> String {
    folder.replace('\\', "/").trim_end_matches('/').to_string()
}

/// Counts of one mapping run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Songs moved (or consolidated onto an existing destination)
    pub moved: usize,

    /// Matching songs already in their destination folder
    pub unchanged: usize,
}

/// Move every song of `mapping.from` in playlist `id` and propagate the
/// moves to all registered playlists
///
/// Each file is moved before any playlist is touched, so a failed move
/// leaves the in-memory playlists consistent with the filesystem.
pub fn map_folder(
    registry: &mut PlaylistList,
    id: &PlaylistId,
    mapping: &FolderMapping,
    config: &SyncConfig,
    mover: &dyn FileMover,
) -> Result<MapReport> {
    let playlist = registry
        .get(id)
        .ok_or_else(|| SongbaseError::not_found("Playlist", id.to_string()))?;
    let base = playlist.base().to_path_buf();

    let to = base.join(&mapping.to);
    if !to.is_dir() {
        return Err(SongbaseError::DestinationNotADirectory(to));
    }
    log::info!("Mapping {}, {}", mapping, playlist.name());

    let candidates: Vec<Song> = playlist
        .entries()
        .iter()
        .filter(|entry| entry.folder_string() == mapping.from)
        .map(|entry| entry.song().clone())
        .collect();
    log::debug!("{} songs in {}", candidates.len(), mapping.from);

    let mut report = MapReport::default();
    for song in &candidates {
        let destination = mapping.destination(&base, song);
        match song.move_to(&destination, config.delete_source, mover)? {
            Some(now) => {
                registry.move_song(song, &now)?;
                report.moved += 1;
            }
            None => report.unchanged += 1,
        }
    }

    log::info!("Mapped {} songs, {} unchanged", report.moved, report.unchanged);
    Ok(report)
}
