//! Sync pipeline orchestration

use super::config::{CheckMode, SyncConfig};
use super::mapper::{map_folder, FolderMapping, MapReport};
use super::mover::FileMover;
use crate::m3u::{Format, PlaylistIo};
use crate::model::{Entry, Playlist, PlaylistId, PlaylistList};
use crate::paths;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where a playlist is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

/// Where a result playlist is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Stdout,
}

impl Target {
    /// Write back where the playlist came from, stdin results go to stdout
    pub fn same_as(source: &Source) -> Target {
        match source {
            Source::File(path) => Target::File(path.clone()),
            Source::Stdin => Target::Stdout,
        }
    }
}

/// How a second playlist is combined with the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Input followed by every song of the other list not already present
    Add,

    /// Input songs missing from the other list
    Remove,

    /// Input songs also in the other list
    Intersect,
}

/// Summary of a check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub playlists: usize,
    pub entries: usize,

    /// Playlist lines that could not be resolved to a song
    pub problems: usize,
}

/// Main sync pipeline
pub struct SyncPipeline {
    config: SyncConfig,
    mover: Box<dyn FileMover>,
}

impl SyncPipeline {
    /// Create a pipeline moving files according to `config.dry_run`
    pub fn new(config: SyncConfig) -> Self {
        let mover = config.mover();
        Self { config, mover }
    }

    /// Create a pipeline handing file moves to `mover`
    pub fn with_mover(config: SyncConfig, mover: Box<dyn FileMover>) -> Self {
        Self { config, mover }
    }

    /// Get the sync configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Load every playlist below `base` and report unresolved songs
    pub fn check(&self, base: &Path) -> Result<CheckReport> {
        log::info!("Checking playlists in {:?}", base);
        let config = self.config.clone().with_check(CheckMode::Only);
        let registry = PlaylistList::discover(base, &config)
            .with_context(|| format!("Failed to check playlists in {:?}", base))?;

        let mut report = CheckReport::default();
        for list in registry.iter() {
            report.playlists += 1;
            report.entries += list.len();
            report.problems += list.skipped_lines();
        }

        log::info!(
            "Checked {} playlists, {} entries, {} problems",
            report.playlists,
            report.entries,
            report.problems
        );
        Ok(report)
    }

    /// Move the songs of `mapping.from` and update every affected playlist
    ///
    /// With a `base` all playlists below it are kept in sync, otherwise only
    /// the input playlist is.
    pub fn map(&self, source: &Source, mapping: &FolderMapping, base: Option<&Path>) -> Result<MapReport> {
        let mut registry = match base {
            Some(base) => PlaylistList::discover(base, &self.config)
                .with_context(|| format!("Failed to load playlists in {:?}", base))?,
            None => PlaylistList::new(),
        };

        let id = match source {
            Source::File(path) => {
                let path = paths::absolutize(path).with_context(|| format!("Failed to resolve {:?}", path))?;
                PlaylistId::File(path)
            }
            Source::Stdin => PlaylistId::Stdin,
        };
        if !registry.contains(&id) {
            let list = self.load(source, &Target::same_as(source), base)?;
            registry.register(list)?;
        }

        let report = map_folder(&mut registry, &id, mapping, &self.config, self.mover.as_ref())?;
        registry.update(false, &self.config).context("Failed to write playlists")?;
        Ok(report)
    }

    /// Combine the input with `other` into `target`
    pub fn combine(&self, source: &Source, op: Combine, other: &Path, target: &Target, base: Option<&Path>) -> Result<usize> {
        let input = self.load(source, target, base)?;
        let other = Playlist::open(other, &self.config)
            .with_context(|| format!("Failed to load playlist {:?}", other))?;
        let mut result = self.result_for(&input, target)?;

        match op {
            Combine::Add => {
                log::info!("Combine {}, {}", input.name(), other.name());
                result.add(input.songs())?;
                result.add(other.songs())?;
            }
            Combine::Remove => {
                log::info!("Complement {}, {}", input.name(), other.name());
                result.add(other.complement(&input).map(Entry::song))?;
            }
            Combine::Intersect => {
                log::info!("Intersect {}, {}", input.name(), other.name());
                result.add(other.intersect(&input).map(Entry::song))?;
            }
        }

        result.write(false, &self.config)?;
        Ok(result.len())
    }

    /// Write the entries matching `needle` to `target`
    pub fn select(&self, source: &Source, needle: &str, target: &Target, base: Option<&Path>) -> Result<usize> {
        let input = self.load(source, target, base)?;
        log::info!("Filter for '{}', {}", needle, input.name());

        let mut result = self.result_for(&input, target)?;
        result.add(input.select(needle).map(Entry::song))?;
        result.write(false, &self.config)?;
        Ok(result.len())
    }

    /// Shuffle the input keeping `config.gap` songs between one interpret
    pub fn shuffle(&self, source: &Source, target: &Target, base: Option<&Path>) -> Result<()> {
        let mut list = self.load(source, target, base)?;
        log::info!("Shuffle {}, gap {}", list.name(), self.config.gap);
        list.shuffle(self.config.gap);
        list.write(false, &self.config)?;
        Ok(())
    }

    /// Sort the input case-insensitively by path
    pub fn sort(&self, source: &Source, target: &Target, base: Option<&Path>) -> Result<()> {
        let mut list = self.load(source, target, base)?;
        log::info!("Sort {}", list.name());
        list.write(true, &self.config)?;
        Ok(())
    }

    /// Rewrite the input to `target`, switching format and folder as needed
    pub fn convert(&self, source: &Source, target: &Target, base: Option<&Path>) -> Result<()> {
        let mut list = self.load(source, target, base)?;
        log::info!("Convert {} -> {}", list.name(), list.output().name());
        list.write(false, &self.config)?;
        Ok(())
    }

    /// Load `source` with its output bound to `target`
    fn load(&self, source: &Source, target: &Target, base: Option<&Path>) -> Result<Playlist> {
        let input = match source {
            Source::File(path) => PlaylistIo::file(path)?,
            Source::Stdin => PlaylistIo::stdin(self.stream_format(None)),
        };
        let output = self.output_io(target, input.format())?;

        // File lines are relative to their own folder, `base` only anchors stdin
        let base = match (input.path().and_then(Path::parent), base) {
            (Some(folder), _) => folder.to_path_buf(),
            (None, Some(base)) => base.to_path_buf(),
            (None, None) => std::env::current_dir().context("Failed to read working directory")?,
        };

        let list = Playlist::load(input, output, &base, &self.config)
            .with_context(|| format!("Failed to load playlist {:?}", source))?;
        Ok(list)
    }

    /// Empty playlist sharing the base of `input`, written to `target`
    fn result_for(&self, input: &Playlist, target: &Target) -> Result<Playlist> {
        let output = self.output_io(target, input.input().format())?;
        Ok(Playlist::empty(output, input.base())?)
    }

    fn output_io(&self, target: &Target, input_format: Format) -> Result<PlaylistIo> {
        Ok(match target {
            Target::File(path) => PlaylistIo::file(path)?,
            Target::Stdout => PlaylistIo::stdout(self.stream_format(Some(input_format))),
        })
    }

    fn stream_format(&self, fallback: Option<Format>) -> Format {
        self.config
            .stream_format
            .or(fallback)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::mover::DryRunMover;
    use std::fs;
    use tempfile::TempDir;

    struct Library {
        dir: TempDir,
    }

    impl Library {
        fn new(songs: &[&str]) -> Self {
            let dir = TempDir::new().unwrap();
            for song in songs {
                let path = dir.path().join(song);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, b"audio").unwrap();
            }
            Self { dir }
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        fn playlist(&self, name: &str, lines: &[&str]) -> PathBuf {
            let path = self.path(name);
            fs::write(&path, lines.join("\n")).unwrap();
            path
        }

        fn read(&self, name: &str) -> Vec<String> {
            fs::read_to_string(self.path(name))
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn pipeline() -> SyncPipeline {
        SyncPipeline::new(SyncConfig::new())
    }

    #[test]
    fn test_combine_into_file() {
        let lib = Library::new(&["Neu/A--1.mp3", "Neu/B--2.mp3", "Neu/C--3.mp3"]);
        let a = lib.playlist("a.m3u", &["Neu/A--1.mp3", "Neu/B--2.mp3"]);
        let b = lib.playlist("b.m3u", &["Neu/B--2.mp3", "Neu/C--3.mp3"]);
        let source = Source::File(a);
        let out = Target::File(lib.path("out.m3u"));

        assert_eq!(pipeline().combine(&source, Combine::Add, &b, &out, None).unwrap(), 3);
        assert_eq!(lib.read("out.m3u"), vec!["Neu/A--1.mp3", "Neu/B--2.mp3", "Neu/C--3.mp3"]);

        assert_eq!(pipeline().combine(&source, Combine::Remove, &b, &out, None).unwrap(), 1);
        assert_eq!(lib.read("out.m3u"), vec!["Neu/A--1.mp3"]);

        assert_eq!(pipeline().combine(&source, Combine::Intersect, &b, &out, None).unwrap(), 1);
        assert_eq!(lib.read("out.m3u"), vec!["Neu/B--2.mp3"]);
    }

    #[test]
    fn test_select_into_file() {
        let lib = Library::new(&["Neu/Abba--Waterloo.mp3", "Rock/Queen--Innuendo.mp3"]);
        let list = lib.playlist("all.m3u8", &["Neu/Abba--Waterloo.mp3", "Rock/Queen--Innuendo.mp3"]);

        let n = pipeline()
            .select(&Source::File(list), "Queen", &Target::File(lib.path("queen.m3u8")), None)
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(lib.read("queen.m3u8"), vec!["Rock/Queen--Innuendo.mp3"]);
    }

    #[test]
    fn test_sort_in_place() {
        let lib = Library::new(&["b/X--1.mp3", "A/Y--2.mp3"]);
        let list = lib.playlist("list.m3u", &["b/X--1.mp3", "A/Y--2.mp3"]);
        let source = Source::File(list);

        pipeline().sort(&source, &Target::same_as(&source), None).unwrap();
        assert_eq!(lib.read("list.m3u"), vec!["A/Y--2.mp3", "b/X--1.mp3"]);
    }

    #[test]
    fn test_shuffle_in_place_keeps_songs() {
        let lib = Library::new(&["N/A--1.mp3", "N/A--2.mp3", "N/B--1.mp3", "N/B--2.mp3"]);
        let lines = ["N/A--1.mp3", "N/A--2.mp3", "N/B--1.mp3", "N/B--2.mp3"];
        let list = lib.playlist("list.m3u", &lines);
        let source = Source::File(list);

        pipeline().shuffle(&source, &Target::same_as(&source), None).unwrap();
        let mut after = lib.read("list.m3u");
        after.sort();
        assert_eq!(after, lines.to_vec());
    }

    #[test]
    fn test_convert_rebases_into_other_folder() {
        let lib = Library::new(&["Neu/A--1.mp3"]);
        let list = lib.playlist("list.m3u", &["Neu/A--1.mp3"]);
        fs::create_dir_all(lib.path("lists")).unwrap();

        pipeline()
            .convert(&Source::File(list), &Target::File(lib.path("lists/list.m3u8")), None)
            .unwrap();
        assert_eq!(lib.read("lists/list.m3u8"), vec!["../Neu/A--1.mp3"]);
    }

    #[test]
    fn test_check_counts_problems() {
        let lib = Library::new(&["Neu/A--1.mp3"]);
        lib.playlist("good.m3u", &["Neu/A--1.mp3"]);
        lib.playlist("bad.m3u", &["Neu/A--1.mp3", "Neu/Missing--9.mp3", "NoSeparator.mp3"]);

        let report = pipeline().check(lib.dir.path()).unwrap();
        assert_eq!(report, CheckReport { playlists: 2, entries: 2, problems: 2 });
    }

    #[test]
    fn test_map_with_base_updates_siblings() {
        let lib = Library::new(&["Neu/A--1.mp3", "Neu/B--2.mp3"]);
        fs::create_dir_all(lib.path("Rock")).unwrap();
        let target = lib.playlist("new.m3u", &["Neu/A--1.mp3"]);
        lib.playlist("all.m3u", &["Neu/B--2.mp3", "Neu/A--1.mp3"]);

        let report = pipeline()
            .map(&Source::File(target), &FolderMapping::default(), Some(lib.dir.path()))
            .unwrap();
        assert_eq!(report.moved, 1);
        assert_eq!(lib.read("new.m3u"), vec!["Rock/A--1.mp3"]);
        assert_eq!(lib.read("all.m3u"), vec!["Neu/B--2.mp3", "Rock/A--1.mp3"]);
        assert!(lib.path("Neu/B--2.mp3").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let lib = Library::new(&["Neu/A--1.mp3"]);
        fs::create_dir_all(lib.path("Rock")).unwrap();
        let list = lib.playlist("new.m3u", &["Neu/A--1.mp3"]);

        let pipeline = SyncPipeline::new(SyncConfig::new().with_dry_run(true));
        pipeline
            .map(&Source::File(list), &FolderMapping::default(), None)
            .unwrap();
        assert_eq!(lib.read("new.m3u"), vec!["Neu/A--1.mp3"]);
        assert!(lib.path("Neu/A--1.mp3").exists());
        assert!(!lib.path("Rock/A--1.mp3").exists());
    }

    #[test]
    fn test_base_does_not_rebase_file_playlist() {
        let lib = Library::new(&["Neu/A--1.mp3", "Neu/B--2.mp3"]);
        fs::create_dir_all(lib.path("lists")).unwrap();
        let list = lib.playlist("lists/l.m3u", &["../Neu/B--2.mp3", "../Neu/A--1.mp3"]);
        let source = Source::File(list);
        let base = Some(lib.dir.path());

        pipeline().sort(&source, &Target::same_as(&source), base).unwrap();
        assert_eq!(lib.read("lists/l.m3u"), vec!["../Neu/A--1.mp3", "../Neu/B--2.mp3"]);

        let out = Target::File(lib.path("lists/a.m3u"));
        assert_eq!(pipeline().select(&source, "A", &out, base).unwrap(), 1);
        assert_eq!(lib.read("lists/a.m3u"), vec!["../Neu/A--1.mp3"]);
    }

    #[test]
    fn test_injected_mover_leaves_files() {
        let lib = Library::new(&["Neu/A--1.mp3"]);
        fs::create_dir_all(lib.path("Rock")).unwrap();
        let list = lib.playlist("new.m3u", &["Neu/A--1.mp3"]);

        let pipeline = SyncPipeline::with_mover(SyncConfig::new(), Box::new(DryRunMover));
        assert!(!pipeline.config().dry_run);

        let report = pipeline
            .map(&Source::File(list), &FolderMapping::default(), None)
            .unwrap();
        assert_eq!(report.moved, 1);
        assert_eq!(lib.read("new.m3u"), vec!["Rock/A--1.mp3"]);
        assert!(lib.path("Neu/A--1.mp3").exists());
        assert!(!lib.path("Rock/A--1.mp3").exists());
    }
}
