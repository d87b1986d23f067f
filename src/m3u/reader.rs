//! Line reader shared by both formats

use super::Format;
use crate::error::{Result, SongbaseError};
use std::io::BufRead;
use std::path::Path;

/// Read playlist lines and hand every entry path to `on_entry`
///
/// Blank lines and `#` lines are skipped, `\` becomes `/` and the legacy
/// `%20` escape becomes a space. Errors returned by `on_entry` stop the read.
pub fn read_entries<R, F>(format: Format, mut reader: R, mut on_entry: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(&Path) -> Result<()>,
{
    let mut buf = Vec::new();
    let mut first = true;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| SongbaseError::io("Failed to read playlist", e))?;
        if read == 0 {
            break;
        }

        let mut line = format.decode(strip_line_end(&buf));
        if first {
            first = false;
            if format.strips_bom() {
                if let Some(rest) = line.strip_prefix('\u{feff}') {
                    line = rest.to_string();
                }
            }
        }

        if let Some(entry) = clean_line(&line) {
            on_entry(Path::new(&entry))?;
        }
    }

    Ok(())
}

fn strip_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

fn clean_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.replace('\\', "/").replace("%20", " "))
}
