//! Line writer shared by both formats

use super::Format;
use std::io::{self, BufWriter, Write};

/// Write one line per entry, each terminated by `\n`
pub fn write_entries<W, I>(format: Format, writer: W, lines: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut writer = BufWriter::new(writer);
    for line in lines {
        writer.write_all(&format.encode(line.as_ref()))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
