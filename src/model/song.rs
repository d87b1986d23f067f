use crate::error::{Result, SongbaseError};
use crate::paths;
use crate::sync::mover::{FileMover, MoveOutcome};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A song file named `<interpret>--<title>.<ext>`
///
/// Identity is the absolute, normalized path. Interpret and title are
/// derived from the file name and never take part in comparisons.
#[derive(Debug, Clone)]
pub struct Song {
    /// Absolute normalized path to the audio file
    path: PathBuf,

    /// File name including extension
    file_name: String,

    /// Artist part of the file name
    interpret: String,

    /// Title part of the file name (without extension)
    title: String,

    /// Whether the file was present when this song was parsed
    exists: bool,
}

impl Song {
    /// Parse a song from its path
    ///
    /// With `verify` set the file must exist and its name must contain an
    /// interpret/title separator and an extension. Without `verify` both
    /// checks are relaxed: a malformed name keeps the file stem as interpret
    /// and an empty title.
    pub fn parse(path: &Path, verify: bool) -> Result<Song> {
        let path = paths::absolutize(path).map_err(|e| {
            SongbaseError::io(format!("Failed to resolve {}", path.display()), e)
        })?;

        let exists = path.is_file();
        if verify && !exists {
            return Err(SongbaseError::not_found("Song", path));
        }

        let file_name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(SongbaseError::MalformedName(path)),
        };

        let (interpret, title) = match split_file_name(&file_name) {
            Some(parts) => parts,
            None if verify => return Err(SongbaseError::MalformedName(path)),
            None => {
                log::debug!("Cannot detect interpret and title: {}", path.display());
                let stem = Path::new(&file_name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (stem, String::new())
            }
        };

        Ok(Song {
            path,
            file_name,
            interpret,
            title,
            exists,
        })
    }

    /// Absolute path of the song file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Interpret part of the file name
    pub fn interpret(&self) -> &str {
        &self.interpret
    }

    /// Title part of the file name
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the file existed when the song was parsed
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Folder containing the song file
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Move the song file into `new_folder`
    ///
    /// Returns `Ok(None)` when the song already lives there. Otherwise the
    /// file is handed to `mover` and a new `Song` for the destination is
    /// returned; `self` is stale afterwards. When the destination is already
    /// occupied nothing is moved, the source is deleted if
    /// `delete_source_on_conflict` is set, and the destination song is still
    /// returned.
    pub fn move_to(
        &self,
        new_folder: &Path,
        delete_source_on_conflict: bool,
        mover: &dyn FileMover,
    ) -> Result<Option<Song>> {
        let new_folder = paths::absolutize(new_folder).map_err(|e| {
            SongbaseError::io(format!("Failed to resolve {}", new_folder.display()), e)
        })?;
        if new_folder == self.folder() {
            return Ok(None);
        }
        if !new_folder.is_dir() {
            return Err(SongbaseError::DestinationNotADirectory(new_folder));
        }

        let target = new_folder.join(&self.file_name);

        // Only log the part of both folders that differs
        let old = paths::to_slash(self.folder());
        let new = paths::to_slash(&new_folder);
        let diff = paths::common_prefix_len(&old, &new);
        let (old_short, new_short) = (&old[diff..], &new[diff..]);

        log::info!("Moving {} -> {}, {}", old_short, new_short, self.file_name);
        let outcome = mover.move_file(&self.path, &target).map_err(|e| {
            SongbaseError::io(format!("Failed to move {}", self.path.display()), e)
        })?;

        if outcome == MoveOutcome::AlreadyExists {
            log::info!("Exists {}, {}", new_short, self.file_name);
            if delete_source_on_conflict {
                log::info!("Delete {}, {}", old_short, self.file_name);
                mover.delete_file(&self.path).map_err(|e| {
                    SongbaseError::io(format!("Failed to delete {}", self.path.display()), e)
                })?;
            }
        }

        Ok(Some(self.relocated(target)))
    }

    /// Same song at `path`, keeping the name parts parsed from `self`
    fn relocated(&self, path: PathBuf) -> Song {
        Song {
            exists: path.is_file(),
            path,
            file_name: self.file_name.clone(),
            interpret: self.interpret.clone(),
            title: self.title.clone(),
        }
    }
}

/// Split `<interpret>--<title>.<ext>` into interpret and title
///
/// `A---B.mp3` splits after the third dash, so hyphenated interprets keep
/// their trailing dash.
fn split_file_name(name: &str) -> Option<(String, String)> {
    let end = name.rfind('.')?;
    let mut pos = name.find("--")?;
    if name[pos + 2..].starts_with('-') {
        pos += 1;
    }
    if pos + 2 > end {
        return None;
    }
    Some((name[..pos].to_string(), name[pos + 2..end].to_string()))
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Song {}

impl Hash for Song {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for Song {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Song {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}
