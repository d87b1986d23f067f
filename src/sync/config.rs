//! Run configuration

use super::mover::{DryRunMover, FileMover, FsMover};
use crate::m3u::Format;

/// Default number of other songs between two songs of one interpret
pub const DEFAULT_GAP: usize = 3;

/// How strictly song references are checked while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Accept references to missing files
    Skip,

    /// Every referenced song must exist
    #[default]
    Verify,

    /// Verify, but report problems instead of failing
    Only,
}

/// Configuration shared by every operation of a run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Log moves and playlist changes without touching any file
    pub dry_run: bool,

    pub check: CheckMode,

    /// Delete a moved song's source when the destination already exists
    pub delete_source: bool,

    /// Format for stdin/stdout playlists (None = format of the input)
    pub stream_format: Option<Format>,

    /// Requested shuffle gap
    pub gap: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            check: CheckMode::default(),
            delete_source: false,
            stream_format: None,
            gap: DEFAULT_GAP,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_check(mut self, check: CheckMode) -> Self {
        self.check = check;
        self
    }

    pub fn with_delete_source(mut self, delete_source: bool) -> Self {
        self.delete_source = delete_source;
        self
    }

    pub fn with_stream_format(mut self, format: Format) -> Self {
        self.stream_format = Some(format);
        self
    }

    pub fn with_gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    /// Whether songs must exist when loaded
    pub fn verify_songs(&self) -> bool {
        self.check != CheckMode::Skip
    }

    /// Whether bad playlist lines are reported and skipped
    pub fn lenient(&self) -> bool {
        self.check == CheckMode::Only
    }

    /// File mover matching the dry-run setting
    pub fn mover(&self) -> Box<dyn FileMover> {
        if self.dry_run {
            Box::new(DryRunMover)
        } else {
            Box::new(FsMover)
        }
    }
}
