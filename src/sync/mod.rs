//! Sync orchestration: configuration, file moves and playlist operations

pub mod config;
pub mod mapper;
pub mod mover;
pub mod pipeline;

pub use config::{CheckMode, SyncConfig, DEFAULT_GAP};
pub use mapper::{map_folder, FolderMapping, MapReport};
pub use mover::{DryRunMover, FileMover, FsMover, MoveOutcome};
pub use pipeline::{CheckReport, Combine, Source, SyncPipeline, Target};
