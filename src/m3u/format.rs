//! Playlist charset variants

use crate::error::{Result, SongbaseError};
use std::path::Path;

/// Supported playlist formats
///
/// Both share the same line framing; they differ only in charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// `.m3u` - ISO-8859-1, code points 0-255 map 1:1 to bytes
    #[default]
    SingleByte,

    /// `.m3u8` - UTF-8, a leading byte-order mark is dropped on read
    MultiByte,
}

impl Format {
    /// Resolve a type name such as `m3u` or `m3u8`
    pub fn from_type(kind: &str) -> Result<Format> {
        match kind.to_ascii_lowercase().as_str() {
            "m3u" => Ok(Format::SingleByte),
            "m3u8" => Ok(Format::MultiByte),
            _ => Err(SongbaseError::UnsupportedType(kind.to_string())),
        }
    }

    /// Resolve the format from a playlist file extension
    pub fn detect(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Format::from_type(&extension)
    }

    pub fn is_supported(path: &Path) -> bool {
        Format::detect(path).is_ok()
    }

    /// Playlist file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::SingleByte => "m3u",
            Format::MultiByte => "m3u8",
        }
    }

    pub fn strips_bom(&self) -> bool {
        matches!(self, Format::MultiByte)
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Format::SingleByte => bytes.iter().map(|&b| char::from(b)).collect(),
            Format::MultiByte => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Encode a line; characters outside Latin-1 become `?` in `.m3u`
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Format::SingleByte => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Format::MultiByte => text.as_bytes().to_vec(),
        }
    }
}
