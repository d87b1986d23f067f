use super::{Entry, Song};
use crate::error::{Result, SongbaseError};
use crate::m3u::{PlaylistIo, Store};
use crate::paths;
use crate::shuffle::ShuffleScheduler;
use crate::sync::config::SyncConfig;
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of a playlist, derived from where it was read from
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlaylistId {
    File(PathBuf),
    Stdin,
    Stdout,
    Detached,
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistId::File(path) => write!(f, "{}", path.display()),
            PlaylistId::Stdin => write!(f, "<stdin>"),
            PlaylistId::Stdout => write!(f, "<stdout>"),
            PlaylistId::Detached => write!(f, "<none>"),
        }
    }
}

/// Ordered set of entries sharing one base folder
///
/// Entries are unique by song identity and `entries[i].index() == i` after
/// every public operation. Any change sets the `changed` flag, which a
/// successful write clears again.
#[derive(Debug)]
pub struct Playlist {
    input: PlaylistIo,
    output: PlaylistIo,
    base: Arc<Path>,
    entries: Vec<Entry>,
    changed: bool,

    /// Lines rejected by a lenient load
    skipped: usize,
}

impl Playlist {
    /// Load a playlist file that is written back to the same file
    pub fn open(path: &Path, config: &SyncConfig) -> Result<Playlist> {
        let io = PlaylistIo::file(path)?;
        let base = io
            .path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Playlist::load(io.clone(), io, &base, config)
    }

    /// Load a playlist from `input`; changes go to `output`
    ///
    /// Entry lines that fail to parse abort the load unless the
    /// configuration is in check-only mode, where they are logged and
    /// counted instead.
    pub fn load(input: PlaylistIo, output: PlaylistIo, base: &Path, config: &SyncConfig) -> Result<Playlist> {
        if let Some(path) = input.path() {
            if !path.is_file() {
                return Err(SongbaseError::not_found("Playlist", path));
            }
        }

        let mut list = Playlist::with_stores(input.clone(), output, base)?;
        if !input.has_input() {
            return Ok(list);
        }

        log::info!("Reading playlist {}", input.name());
        let verify = config.verify_songs();
        let lenient = config.lenient();
        let name = input.name();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        input.read(|relative| {
            match list.create_entry(relative, verify) {
                Ok(entry) => {
                    if seen.insert(entry.path().to_path_buf()) {
                        list.entries.push(entry);
                    } else {
                        log::warn!("{}: duplicate {}", name, entry.entry_string());
                        list.changed = true;
                    }
                    Ok(())
                }
                Err(err) if lenient => {
                    log::warn!("{}: {}", name, err);
                    list.skipped += 1;
                    Ok(())
                }
                Err(err) => Err(err),
            }
        })?;

        log::debug!("{}: {} entries", name, list.len());
        Ok(list)
    }

    /// Empty playlist that is only written
    pub fn empty(output: PlaylistIo, base: &Path) -> Result<Playlist> {
        let input = PlaylistIo::detached(output.format());
        Playlist::with_stores(input, output, base)
    }

    fn with_stores(input: PlaylistIo, output: PlaylistIo, base: &Path) -> Result<Playlist> {
        let base = paths::absolutize(base)
            .map_err(|e| SongbaseError::io(format!("Failed to resolve {}", base.display()), e))?;
        Ok(Playlist {
            input,
            output,
            base: Arc::from(base),
            entries: Vec::new(),
            changed: false,
            skipped: 0,
        })
    }

    /// Registry key: the input file or the bound stream
    pub fn id(&self) -> PlaylistId {
        match self.input.store() {
            Store::File(path) => PlaylistId::File(path.clone()),
            Store::Stdin => PlaylistId::Stdin,
            _ if self.output.is_stdout() => PlaylistId::Stdout,
            _ => PlaylistId::Detached,
        }
    }

    /// Display name used in log lines
    pub fn name(&self) -> String {
        if self.input.has_input() {
            self.input.name()
        } else {
            self.output.name()
        }
    }

    /// Input file, if the playlist is read from one
    pub fn path(&self) -> Option<&Path> {
        self.input.path()
    }

    /// Folder the playlist lines are relative to
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Where the playlist is read from
    pub fn input(&self) -> &PlaylistIo {
        &self.input
    }

    /// Where the playlist is written to
    pub fn output(&self) -> &PlaylistIo {
        &self.output
    }

    /// Whether the playlist reads stdin
    pub fn binds_stdin(&self) -> bool {
        self.input.is_stdin()
    }

    /// Whether the playlist writes stdout
    pub fn binds_stdout(&self) -> bool {
        self.output.is_stdout()
    }

    /// Get all entries
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Songs of all entries, in playlist order
    pub fn songs(&self) -> impl Iterator<Item = &Song> + '_ {
        self.entries.iter().map(Entry::song)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the playlist has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the playlist needs to be written
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Lines dropped by lenient loading
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Whether `song` is in the playlist
    pub fn contains(&self, song: &Song) -> bool {
        self.entries.par_iter().any(|entry| entry.song() == song)
    }

    /// Build the entry for one playlist line, positioned at the end
    pub fn create_entry(&self, relative_path: &Path, verify: bool) -> Result<Entry> {
        Entry::parse(&self.base, relative_path, self.entries.len(), verify)
    }

    /// Visit every entry in playlist order
    pub fn for_each_entry<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&Entry) -> Result<()>,
    {
        for entry in &self.entries {
            visitor(entry)?;
        }
        Ok(())
    }

    fn identity_index(&self) -> HashSet<&Path> {
        self.entries.par_iter().map(Entry::path).collect()
    }

    /// Append every song not yet present, in input order
    ///
    /// Nothing is appended when one of the songs lies outside the base
    /// folder. Returns the number of appended entries.
    pub fn add<'s, I>(&mut self, songs: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'s Song>,
    {
        let mut present: HashSet<PathBuf> = self
            .identity_index()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();

        let mut fresh = Vec::new();
        for song in songs {
            if !present.insert(song.path().to_path_buf()) {
                continue;
            }
            let index = self.entries.len() + fresh.len();
            fresh.push(Entry::from_song(&self.base, song.clone(), index)?);
        }

        let name = self.name();
        for entry in &fresh {
            log::info!("{}: + {}, {}", name, entry.folder_string(), entry.file_name());
        }

        let added = fresh.len();
        if added > 0 {
            self.entries.extend(fresh);
            self.changed = true;
        }
        Ok(added)
    }

    /// Remove every entry matching one of `songs`
    ///
    /// Returns the number of removed entries.
    pub fn remove<'s, I>(&mut self, songs: I) -> usize
    where
        I: IntoIterator<Item = &'s Song>,
    {
        let targets: HashSet<&Path> = songs.into_iter().map(Song::path).collect();
        if targets.is_empty() {
            return 0;
        }

        let name = self.name();
        let mut lowest = None;
        let mut removed = 0;
        let mut position = 0;
        self.entries.retain(|entry| {
            let keep = !targets.contains(entry.path());
            if !keep {
                log::info!("{}: - {}, {}", name, entry.folder_string(), entry.file_name());
                lowest.get_or_insert(position);
                removed += 1;
            }
            position += 1;
            keep
        });

        if let Some(lowest) = lowest {
            self.renumber(lowest);
            self.changed = true;
        }
        removed
    }

    /// Point the entry of `prev` at `now`, keeping its position
    ///
    /// When `now` is already part of the playlist the entry of `prev` is
    /// dropped instead, so the destination is never listed twice.
    pub fn move_song(&mut self, prev: &Song, now: &Song) -> Result<bool> {
        if prev == now {
            return Ok(false);
        }
        let Some(position) = self.entries.iter().position(|entry| entry.song() == prev) else {
            return Ok(false);
        };

        let name = self.name();
        if self.contains(now) {
            let entry = self.entries.remove(position);
            log::info!("{}: - {}, {}", name, entry.folder_string(), entry.file_name());
            self.renumber(position);
        } else {
            let entry = Entry::from_song(&self.base, now.clone(), position)?;
            log::info!("{}: = {}, {}", name, entry.folder_string(), entry.file_name());
            self.entries[position] = entry;
        }
        self.changed = true;
        Ok(true)
    }

    /// Entries whose folder, interpret or title contains `needle`
    pub fn select<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |entry| {
            entry.folder_string().contains(needle)
                || entry.interpret().contains(needle)
                || entry.title().contains(needle)
        })
    }

    /// Entries of `other` that are also in this playlist
    pub fn intersect<'a>(&'a self, other: &'a Playlist) -> impl Iterator<Item = &'a Entry> + 'a {
        let present = self.identity_index();
        other.entries.iter().filter(move |entry| present.contains(entry.path()))
    }

    /// Entries of `other` missing from this playlist
    pub fn complement<'a>(&'a self, other: &'a Playlist) -> impl Iterator<Item = &'a Entry> + 'a {
        let present = self.identity_index();
        other.entries.iter().filter(move |entry| !present.contains(entry.path()))
    }

    /// Sort case-insensitively by path
    ///
    /// Only marks the playlist changed if an entry actually moved.
    pub fn sort(&mut self) -> bool {
        self.entries.sort_by(|a, b| a.cmp_ignore_case(b));
        let moved = self.renumber(0);
        if moved {
            self.changed = true;
        }
        moved
    }

    /// Shuffle keeping `gap` other songs between songs of one interpret
    pub fn shuffle(&mut self, gap: usize) {
        self.shuffle_with_rng(gap, &mut rand::thread_rng());
    }

    pub fn shuffle_with_rng<R: Rng + ?Sized>(&mut self, gap: usize, rng: &mut R) {
        let mut scheduler = ShuffleScheduler::new(gap);
        for entry in self.entries.drain(..) {
            let interpret = entry.interpret().to_string();
            scheduler.push(&interpret, entry);
        }
        log::debug!("{}: shuffling with gap {}", self.name(), scheduler.effective_gap());

        self.entries = scheduler.drain_with(rng);
        self.renumber(0);
        self.changed = true;
    }

    /// Persist the playlist to its output store
    ///
    /// In dry-run mode nothing is written, except to stdout. When the
    /// output file lives in another folder, lines are made relative to that
    /// folder.
    pub fn write(&mut self, sorted: bool, config: &SyncConfig) -> Result<()> {
        if !self.output.has_output() {
            return Ok(());
        }
        log::info!("Writing playlist {}", self.output.name());
        if sorted {
            self.sort();
        }

        if !config.dry_run || self.output.is_stdout() {
            let lines = self.output_lines()?;
            self.output.save(lines)?;
        }
        self.changed = false;
        Ok(())
    }

    /// Write only if something changed
    pub fn update(&mut self, sorted: bool, config: &SyncConfig) -> Result<()> {
        if self.changed {
            self.write(sorted, config)?;
        }
        Ok(())
    }

    fn output_lines(&self) -> Result<Vec<String>> {
        let target = self
            .output
            .path()
            .and_then(Path::parent)
            .filter(|folder| *folder != &*self.base);

        let mut lines = Vec::with_capacity(self.entries.len());
        self.for_each_entry(|entry| {
            let line = match target {
                Some(folder) => entry.rebased_string(folder)?,
                None => entry.entry_string(),
            };
            lines.push(line);
            Ok(())
        })?;
        Ok(lines)
    }

    /// Reassign indices from `from` on; true if any index changed
    fn renumber(&mut self, from: usize) -> bool {
        let mut moved = false;
        for (i, entry) in self.entries.iter_mut().enumerate().skip(from) {
            if entry.index() != i {
                entry.set_index(i);
                moved = true;
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::m3u::Format;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn song(path: &str) -> Song {
        Song::parse(Path::new(path), false).unwrap()
    }

    fn playlist(paths: &[&str]) -> Playlist {
        let mut list = Playlist::empty(PlaylistIo::detached(Format::SingleByte), Path::new("/music")).unwrap();
        let songs: Vec<Song> = paths.iter().map(|p| song(p)).collect();
        list.add(&songs).unwrap();
        list.changed = false;
        list
    }

    fn lines(list: &Playlist) -> Vec<String> {
        list.entries().iter().map(Entry::entry_string).collect()
    }

    fn assert_contiguous(list: &Playlist) {
        for (i, entry) in list.entries().iter().enumerate() {
            assert_eq!(entry.index(), i);
        }
    }

    #[test]
    fn test_add_skips_duplicates() {
        let mut list = playlist(&["/music/Neu/A--1.mp3"]);
        let songs = vec![
            song("/music/Neu/B--2.mp3"),
            song("/music/Neu/A--1.mp3"),
            song("/music/Neu/B--2.mp3"),
            song("/music/Rock/C--3.mp3"),
        ];

        assert_eq!(list.add(&songs).unwrap(), 2);
        assert_eq!(lines(&list), vec!["Neu/A--1.mp3", "Neu/B--2.mp3", "Rock/C--3.mp3"]);
        assert!(list.is_changed());
        assert_contiguous(&list);

        list.changed = false;
        assert_eq!(list.add(&songs).unwrap(), 0);
        assert!(!list.is_changed());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_add_outside_base_appends_nothing() {
        // a relative base shares no root with absolute song paths
        let mut list = Playlist {
            base: Arc::from(Path::new("music")),
            ..playlist(&[])
        };
        let songs = vec![song("/music/Neu/A--1.mp3"), song("/music/Neu/B--2.mp3")];

        let err = list.add(&songs).unwrap_err();
        assert!(matches!(err, SongbaseError::OutsideBase(_)));
        assert!(list.is_empty());
        assert!(!list.is_changed());
    }

    #[test]
    fn test_remove_renumbers() {
        let mut list = playlist(&[
            "/music/Neu/A--1.mp3",
            "/music/Neu/B--2.mp3",
            "/music/Neu/C--3.mp3",
            "/music/Neu/D--4.mp3",
        ]);
        let doomed = vec![song("/music/Neu/B--2.mp3"), song("/music/Neu/X--9.mp3"), song("/music/Neu/D--4.mp3")];

        assert_eq!(list.remove(&doomed), 2);
        assert_eq!(lines(&list), vec!["Neu/A--1.mp3", "Neu/C--3.mp3"]);
        assert!(list.is_changed());
        assert_contiguous(&list);
    }

    #[test]
    fn test_remove_unknown_keeps_flag() {
        let mut list = playlist(&["/music/Neu/A--1.mp3"]);
        assert_eq!(list.remove(&[song("/music/Neu/X--9.mp3")]), 0);
        assert!(!list.is_changed());
    }

    #[test]
    fn test_move_song_replaces_in_place() {
        let mut list = playlist(&["/music/Neu/A--1.mp3", "/music/Neu/B--2.mp3", "/music/Neu/C--3.mp3"]);
        let moved = list
            .move_song(&song("/music/Neu/B--2.mp3"), &song("/music/Rock/B--2.mp3"))
            .unwrap();

        assert!(moved);
        assert_eq!(lines(&list), vec!["Neu/A--1.mp3", "Rock/B--2.mp3", "Neu/C--3.mp3"]);
        assert_eq!(list.entries()[1].index(), 1);
        assert!(list.is_changed());
    }

    #[test]
    fn test_move_song_onto_present_song_drops_source() {
        let mut list = playlist(&["/music/Neu/A--1.mp3", "/music/Rock/A--1.mp3", "/music/Neu/C--3.mp3"]);
        list.move_song(&song("/music/Neu/A--1.mp3"), &song("/music/Rock/A--1.mp3"))
            .unwrap();

        assert_eq!(lines(&list), vec!["Rock/A--1.mp3", "Neu/C--3.mp3"]);
        assert_contiguous(&list);
    }

    #[test]
    fn test_move_song_unknown_is_noop() {
        let mut list = playlist(&["/music/Neu/A--1.mp3"]);
        let moved = list
            .move_song(&song("/music/Neu/X--9.mp3"), &song("/music/Rock/X--9.mp3"))
            .unwrap();
        assert!(!moved);
        assert!(!list.is_changed());
    }

    #[test]
    fn test_sort_is_case_insensitive_and_idempotent() {
        let mut list = playlist(&["/music/rock/b--2.mp3", "/music/Neu/Z--1.mp3", "/music/Rock/A--3.mp3"]);

        assert!(list.sort());
        assert_eq!(lines(&list), vec!["Neu/Z--1.mp3", "Rock/A--3.mp3", "rock/b--2.mp3"]);
        assert_contiguous(&list);

        list.changed = false;
        assert!(!list.sort());
        assert!(!list.is_changed());
    }

    #[test]
    fn test_select_matches_folder_interpret_title() {
        let list = playlist(&["/music/Neu/Abba--Waterloo.mp3", "/music/Rock/Queen--Innuendo.mp3", "/music/Rock/Abba--SOS.mp3"]);

        let by_folder: Vec<String> = list.select("Neu").map(Entry::entry_string).collect();
        assert_eq!(by_folder, vec!["Neu/Abba--Waterloo.mp3"]);

        assert_eq!(list.select("Abba").count(), 2);
        assert_eq!(list.select("Innu").count(), 1);
        assert_eq!(list.select("abba").count(), 0);
        // restartable
        assert_eq!(list.select("Abba").count(), 2);
    }

    #[test]
    fn test_set_algebra() {
        let a = playlist(&["/music/Neu/A--1.mp3", "/music/Neu/B--2.mp3"]);
        let b = playlist(&["/music/Neu/B--2.mp3", "/music/Neu/C--3.mp3"]);

        let same: Vec<&Song> = a.intersect(&a).map(Entry::song).collect();
        assert_eq!(same, a.songs().collect::<Vec<_>>());
        assert_eq!(a.complement(&a).count(), 0);

        let common: Vec<String> = a.intersect(&b).map(Entry::entry_string).collect();
        assert_eq!(common, vec!["Neu/B--2.mp3"]);
        let only_b: Vec<String> = a.complement(&b).map(Entry::entry_string).collect();
        assert_eq!(only_b, vec!["Neu/C--3.mp3"]);
    }

    #[test]
    fn test_union_of_disjoint_lists() {
        let a = playlist(&["/music/Neu/A--1.mp3", "/music/Neu/B--2.mp3"]);
        let b = playlist(&["/music/Rock/C--3.mp3"]);
        let mut union = playlist(&[]);

        union.add(a.songs()).unwrap();
        union.add(b.songs()).unwrap();
        assert_eq!(union.len(), a.len() + b.len());
    }

    #[test]
    fn test_shuffle_keeps_entries() {
        let mut list = playlist(&[
            "/music/Neu/A--1.mp3",
            "/music/Neu/A--2.mp3",
            "/music/Neu/B--1.mp3",
            "/music/Neu/B--2.mp3",
            "/music/Neu/C--1.mp3",
        ]);
        let mut before: Vec<Song> = list.songs().cloned().collect();

        list.shuffle_with_rng(1, &mut StdRng::seed_from_u64(42));
        assert!(list.is_changed());
        assert_contiguous(&list);

        let mut after: Vec<Song> = list.songs().cloned().collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_id_follows_input_store() {
        let list = playlist(&[]);
        assert_eq!(list.id(), PlaylistId::Detached);

        let out = Playlist::empty(PlaylistIo::stdout(Format::MultiByte), Path::new("/music")).unwrap();
        assert_eq!(out.id(), PlaylistId::Stdout);
        assert!(out.binds_stdout());
        assert_eq!(out.name(), "<stdout>");
    }
}
