//! songbase - keeps m3u playlists in sync with a song folder tree
//!
//! Songs are files named `<interpret>--<title>.<ext>`. When songs are moved,
//! added, removed, reordered or shuffled, every playlist referencing them is
//! updated and written back.

pub mod error;
pub mod m3u;
pub mod model;
pub mod paths;
pub mod shuffle;
pub mod sync;

pub use error::{Result, SongbaseError};
pub use model::{Entry, Playlist, PlaylistId, PlaylistList, Song};
pub use sync::config::SyncConfig;
pub use sync::pipeline::SyncPipeline;
