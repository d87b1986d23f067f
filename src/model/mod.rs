//! Data model for songs and the playlists referencing them
//!
//! A [`Song`] is identified by its absolute path. A [`Playlist`] holds
//! [`Entry`] values pointing at songs relative to the playlist's base
//! folder, and a [`PlaylistList`] groups all playlists of one run so a
//! moved song can be updated everywhere.

mod entry;
mod playlist;
mod registry;
mod song;

pub use entry::Entry;
pub use playlist::{Playlist, PlaylistId};
pub use registry::PlaylistList;
pub use song::Song;
