//! m3u / m3u8 playlist files
//!
//! Line-oriented text: one song path per line, relative to the playlist's
//! folder. `#` lines (including `#EXT...` metadata) are ignored on read and
//! never written.

mod format;
mod reader;
mod store;
mod writer;

pub use format::Format;
pub use reader::read_entries;
pub use store::{PlaylistIo, Store};
pub use writer::write_entries;
