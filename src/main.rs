use anyhow::{bail, Result};
use clap::{ArgGroup, Parser};
use songbase::m3u::Format;
use songbase::sync::{CheckMode, Combine, FolderMapping, Source, Target, DEFAULT_GAP};
use songbase::{SongbaseError, SyncConfig, SyncPipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "songbase")]
#[command(about = "Keep m3u playlists in sync with a song folder tree", long_about = None)]
#[command(group(
    ArgGroup::new("operation")
        .args(["check", "map", "add", "remove", "intersect", "select", "shuffle", "sort"])
        .multiple(false)
))]
struct Args {
    /// Input playlist, `-` for stdin
    playlist: Option<String>,

    /// Base folder whose playlists are kept in sync
    #[arg(short, long)]
    base: Option<String>,

    /// Only report what would be done
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Only check that every song of every playlist below the base exists
    #[arg(long)]
    check: bool,

    /// Don't check that songs exist when loading playlists
    #[arg(long, conflicts_with = "check")]
    no_check: bool,

    /// Never move songs into interpret folders
    #[arg(long)]
    no_interpret: bool,

    /// Delete a moved song if the destination already exists
    #[arg(long)]
    rm_source: bool,

    /// Move songs of folder FROM to TO (default: Neu=Rock with interpret folders)
    #[arg(short, long, value_name = "FROM[=TO]")]
    map: Option<FolderMapping>,

    /// Playlist type of stdin/stdout (m3u or m3u8)
    #[arg(short = 't', long = "type", value_parser = parse_type)]
    kind: Option<Format>,

    /// Write the input followed by the songs of LIST
    #[arg(long, value_name = "LIST")]
    add: Option<String>,

    /// Write the input without the songs of LIST
    #[arg(long, value_name = "LIST")]
    remove: Option<String>,

    /// Write the input songs that are also in LIST
    #[arg(long, value_name = "LIST")]
    intersect: Option<String>,

    /// Write the songs whose folder, interpret or title contains TEXT
    #[arg(long, value_name = "TEXT")]
    select: Option<String>,

    /// Shuffle keeping songs of one interpret apart
    #[arg(long)]
    shuffle: bool,

    /// Songs between two songs of the same interpret when shuffling
    #[arg(long, default_value_t = DEFAULT_GAP)]
    gap: usize,

    /// Sort the playlist by path
    #[arg(long)]
    sort: bool,

    /// Output playlist, `-` for stdout
    #[arg(short, long)]
    out: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn parse_type(kind: &str) -> Result<Format, SongbaseError> {
    Format::from_type(kind)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = SyncConfig::new()
        .with_dry_run(args.dry_run)
        .with_check(if args.no_check { CheckMode::Skip } else { CheckMode::Verify })
        .with_delete_source(args.rm_source)
        .with_gap(args.gap);
    if let Some(kind) = args.kind {
        config = config.with_stream_format(kind);
    }
    if args.dry_run {
        log::info!("Dry run - no file will be changed");
    }

    let pipeline = SyncPipeline::new(config);
    let base = args.base.as_deref().map(expand);
    if let Some(base) = &base {
        if !base.is_dir() {
            bail!("Base folder not found: {:?}", base);
        }
    }

    if args.check {
        let root = match &base {
            Some(base) => base.clone(),
            None => std::env::current_dir()?,
        };
        let report = pipeline.check(&root)?;
        if report.problems > 0 {
            bail!("{} problems in {} playlists", report.problems, report.playlists);
        }
        return Ok(());
    }

    let source = match args.playlist.as_deref() {
        Some("-") => Source::Stdin,
        Some(path) => Source::File(expand(path)),
        None => bail!("Please supply input playlist or specify - for stdin"),
    };
    let out = args.out.as_deref().map(|out| match out {
        "-" => Target::Stdout,
        path => Target::File(expand(path)),
    });
    let base = base.as_deref();

    // Derived playlists go to stdout unless --out says otherwise
    let derived = out.clone().unwrap_or(Target::Stdout);
    let in_place = out.clone().unwrap_or_else(|| Target::same_as(&source));
    // --out alone only rewrites the playlist
    let convert_to = if args.map.is_none() { out } else { None };

    let combine = [
        (Combine::Add, &args.add),
        (Combine::Remove, &args.remove),
        (Combine::Intersect, &args.intersect),
    ]
    .into_iter()
    .find_map(|(op, other)| other.as_deref().map(|other| (op, expand(other))));

    if let Some((op, other)) = combine {
        pipeline.combine(&source, op, &other, &derived, base)?;
    } else if let Some(needle) = &args.select {
        pipeline.select(&source, needle, &derived, base)?;
    } else if args.shuffle {
        pipeline.shuffle(&source, &in_place, base)?;
    } else if args.sort {
        pipeline.sort(&source, &in_place, base)?;
    } else if let Some(out) = &convert_to {
        pipeline.convert(&source, out, base)?;
    } else {
        let mapping = mapping(args.map, args.no_interpret);
        pipeline.map(&source, &mapping, base)?;
    }

    log::info!("Done");
    Ok(())
}

fn mapping(mapping: Option<FolderMapping>, no_interpret: bool) -> FolderMapping {
    let mapping = mapping.unwrap_or_default();
    let interpret_folders = mapping.interpret_folders && !no_interpret;
    mapping.with_interpret_folders(interpret_folders)
}
