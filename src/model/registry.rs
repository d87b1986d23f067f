use super::{Playlist, PlaylistId, Song};
use crate::error::{Result, SongbaseError};
use crate::m3u::Format;
use crate::sync::config::SyncConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every playlist taking part in one run, keyed by identity
///
/// At most one registered playlist reads from stdin and at most one
/// writes to stdout.
#[derive(Debug, Default)]
pub struct PlaylistList {
    base: Option<PathBuf>,
    lists: BTreeMap<PlaylistId, Playlist>,
}

impl PlaylistList {
    /// Create an empty registry without a base folder
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every playlist file below `base`
    ///
    /// Subfolders are searched too. Files with unsupported extensions are
    /// ignored.
    pub fn discover(base: &Path, config: &SyncConfig) -> Result<Self> {
        if !base.is_dir() {
            return Err(SongbaseError::not_found("Folder", base));
        }
        log::info!("Scanning playlists in {}", base.display());

        let mut registry = PlaylistList {
            base: Some(base.to_path_buf()),
            lists: BTreeMap::new(),
        };

        let walker = WalkDir::new(base).min_depth(1).sort_by_file_name();
        for dir_entry in walker {
            let dir_entry = dir_entry.map_err(|e| {
                let context = format!("Failed to scan {}", base.display());
                match e.into_io_error() {
                    Some(err) => SongbaseError::io(context, err),
                    None => SongbaseError::io(context, std::io::Error::other("filesystem loop")),
                }
            })?;
            let path = dir_entry.path();
            if !dir_entry.file_type().is_file() || !Format::is_supported(path) {
                continue;
            }
            registry.register(Playlist::open(path, config)?)?;
        }

        log::info!("Found {} playlists", registry.len());
        Ok(registry)
    }

    /// Folder the registry was discovered from, if any
    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Add a playlist, keyed by its input file or stream
    ///
    /// Only one playlist may read stdin and only one may write stdout.
    pub fn register(&mut self, playlist: Playlist) -> Result<PlaylistId> {
        if playlist.binds_stdin() && self.lists.values().any(Playlist::binds_stdin) {
            return Err(SongbaseError::StreamAlreadyBound("stdin"));
        }
        if playlist.binds_stdout() && self.lists.values().any(Playlist::binds_stdout) {
            return Err(SongbaseError::StreamAlreadyBound("stdout"));
        }

        let id = playlist.id();
        if self.lists.contains_key(&id) {
            let path = playlist.path().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(id.to_string()));
            return Err(SongbaseError::AlreadyExists(path));
        }
        self.lists.insert(id.clone(), playlist);
        Ok(id)
    }

    /// Remove a playlist
    pub fn unregister(&mut self, id: &PlaylistId) -> Option<Playlist> {
        self.lists.remove(id)
    }

    /// Get a playlist by key
    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.lists.get(id)
    }

    /// Get a playlist by key for changing it
    pub fn get_mut(&mut self, id: &PlaylistId) -> Option<&mut Playlist> {
        self.lists.get_mut(id)
    }

    /// Whether a playlist with this key is registered
    pub fn contains(&self, id: &PlaylistId) -> bool {
        self.lists.contains_key(id)
    }

    /// Get all playlists, ordered by key
    pub fn iter(&self) -> impl Iterator<Item = &Playlist> + '_ {
        self.lists.values()
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether no playlist is registered
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Replace `prev` by `now` in every playlist
    ///
    /// Returns the number of playlists that referenced `prev`.
    pub fn move_song(&mut self, prev: &Song, now: &Song) -> Result<usize> {
        let mut touched = 0;
        for list in self.lists.values_mut() {
            if list.move_song(prev, now)? {
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Write every changed playlist
    pub fn update(&mut self, sorted: bool, config: &SyncConfig) -> Result<()> {
        for list in self.lists.values_mut() {
            list.update(sorted, config)?;
        }
        Ok(())
    }
}
