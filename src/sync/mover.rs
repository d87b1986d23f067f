//! File moves behind a trait so dry runs can swap in a no-op

use std::fs;
use std::io;
use std::path::Path;

/// Result of a move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,

    /// Destination was occupied, nothing was moved
    AlreadyExists,
}

/// Filesystem side effects of song moves - allows swapping between real and dry-run
pub trait FileMover {
    /// Move `from` to `to` unless `to` already exists
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<MoveOutcome>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;

    /// Whether files stay untouched
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Mover working on the real filesystem
pub struct FsMover;

impl FileMover for FsMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<MoveOutcome> {
        if to.exists() {
            return Ok(MoveOutcome::AlreadyExists);
        }

        // rename fails across filesystems, fall back to copy and delete
        if let Err(err) = fs::rename(from, to) {
            log::debug!("Rename of {:?} failed ({}), copying instead", from, err);
            fs::copy(from, to)?;
            fs::remove_file(from)?;
        }
        Ok(MoveOutcome::Moved)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Mover that only reports what would happen
pub struct DryRunMover;

impl FileMover for DryRunMover {
    fn move_file(&self, _from: &Path, to: &Path) -> io::Result<MoveOutcome> {
        if to.exists() {
            Ok(MoveOutcome::AlreadyExists)
        } else {
            Ok(MoveOutcome::Moved)
        }
    }

    fn delete_file(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
