use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use listening_insights::analytics::{
    build_report, DashboardReport, Granularity, RankedItem, ReportOptions, Season, SkipThreshold,
};
use listening_insights::catalog_client::{Credentials, SpotifyCatalogClient};
use listening_insights::checkpoint::{
    merge_to_file, read_enriched_table, ChunkKind, ChunkStore, CsvChunkStore,
};
use listening_insights::config::{AppConfig, CliConfig, FileConfig};
use listening_insights::enrichment::{EnrichmentPipeline, RunSummary};
use listening_insights::history::{load_streaming_history, read_library, LIBRARY_FILE_NAME};

mod cli_style;
use cli_style::{
    bar, get_styles, print_empty_list, print_key_value, print_section_header,
    print_success, print_warning, TableBuilder,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles = get_styles(), version, about)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the StreamingHistory<N>.json partitions and YourLibrary.json.
    #[clap(long, global = true, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Where checkpoint chunks and the final table are written.
    /// Defaults to <data-dir>/audio_features.
    #[clap(long, global = true, value_parser = parse_path)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enriches the listening history with catalog attributes and genres.
    Enrich(EnrichArgs),

    /// Merges every checkpoint chunk into the final table.
    Merge,

    /// Lists checkpoint chunks and the offset a resumed run should start from.
    Checkpoints,

    /// Prints the dashboard aggregates.
    Report(ReportArgs),
}

/// Where an enrichment run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResumeFrom {
    Offset(usize),
    /// The furthest input index recorded by the existing chunks.
    Auto,
}

impl FromStr for ResumeFrom {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ResumeFrom::Auto);
        }
        s.parse::<usize>()
            .map(ResumeFrom::Offset)
            .map_err(|_| format!("expected a row index or \"auto\", got {:?}", s))
    }
}

#[derive(Args, Debug)]
struct EnrichArgs {
    /// Input row to start from: a number, or "auto" to continue after the
    /// last checkpoint chunk.
    #[clap(long, default_value = "0")]
    pub resume: ResumeFrom,

    /// Input rows per checkpoint chunk.
    #[clap(long)]
    pub chunk_size: Option<usize>,

    /// JSON file with Client-ID and Client-Secret. Defaults to <data-dir>/credentials.json.
    #[clap(long, value_parser = parse_path)]
    pub credentials: Option<PathBuf>,

    /// Small run: smaller chunks, frequent progress lines, stops after --limit rows.
    #[clap(long)]
    pub test_mode: bool,

    /// Rows processed in test mode.
    #[clap(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[clap(long, value_enum, default_value_t = Season::All)]
    pub season: Season,

    /// Entries in the top songs and top artists tables.
    #[clap(long)]
    pub top: Option<usize>,

    /// Entries in the top genres table.
    #[clap(long)]
    pub genres: Option<usize>,

    /// Entries in the liked-but-skipped table.
    #[clap(long)]
    pub liked: Option<usize>,

    #[clap(long, value_enum, default_value_t = SkipThreshold::Instant)]
    pub skip_threshold: SkipThreshold,

    #[clap(long, value_enum, default_value_t = Granularity::Daily)]
    pub granularity: Granularity,

    /// Hours added to the UTC export timestamps for the listening pattern.
    #[clap(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Print the report as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let mut cli_config = CliConfig {
        data_dir: cli_args.data_dir.clone(),
        output_dir: cli_args.output_dir.clone(),
        ..Default::default()
    };
    if let Command::Enrich(args) = &cli_args.command {
        cli_config.credentials_path = args.credentials.clone();
        cli_config.chunk_size = args.chunk_size;
        cli_config.test_mode = args.test_mode;
        cli_config.test_mode_limit = args.limit;
    }

    let config = AppConfig::resolve(&cli_config, file_config)?;

    match cli_args.command {
        Command::Enrich(args) => run_enrich(&config, args.resume),
        Command::Merge => run_merge(&config),
        Command::Checkpoints => run_checkpoints(&config),
        Command::Report(args) => run_report(&config, &args),
    }
}

fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        warn!("Interrupt received, stopping after the current track (Ctrl+C again to abort)");
    })
    .context("Failed to install the Ctrl+C handler")?;
    Ok(cancelled)
}

fn run_enrich(config: &AppConfig, resume: ResumeFrom) -> Result<()> {
    let events = load_streaming_history(&config.data_dir)?;
    let store = CsvChunkStore::open(config.chunk_dir())?;

    let offset = match resume {
        ResumeFrom::Offset(offset) => offset,
        ResumeFrom::Auto => {
            let offset = store.resume_offset()?;
            info!("Resuming from input row {} (last checkpoint)", offset);
            offset
        }
    };

    let credentials = Credentials::load(&config.credentials_path)?;
    let client = SpotifyCatalogClient::connect(&config.catalog, credentials)?;
    let cancelled = install_interrupt_handler()?;

    let settings = config.enrich.pipeline_settings(offset);
    let summary = EnrichmentPipeline::new(&client, &store, settings)
        .with_cancel_flag(cancelled)
        .run(&events, offset, &config.final_output_path())?;

    print_run_summary(&summary, &config.final_output_path());
    Ok(())
}

fn print_run_summary(summary: &RunSummary, output_path: &Path) {
    print_section_header("Enrichment");
    print_key_value(
        "Input rows",
        &format!(
            "{}..{} of {}",
            summary.offset, summary.next_offset, summary.total_input
        ),
    );
    print_key_value("Resolved", &summary.resolved.to_string());
    print_key_value("Skipped", &summary.skipped.len().to_string());
    print_key_value("Output rows", &summary.rows_emitted.to_string());
    print_key_value("Chunks written", &summary.chunks_written.len().to_string());
    print_key_value(
        "Track cache",
        &format!(
            "{} hits, {} misses",
            summary.cache.track_hits, summary.cache.track_misses
        ),
    );
    print_key_value(
        "Artist cache",
        &format!(
            "{} hits, {} misses",
            summary.cache.artist_hits, summary.cache.artist_misses
        ),
    );
    println!();

    match summary.merged_rows {
        Some(rows) => print_success(&format!("Wrote {} rows to {}", rows, output_path.display())),
        None if summary.interrupted => print_warning(&format!(
            "Interrupted. Continue with: enrich --resume {}",
            summary.next_offset
        )),
        None => {}
    }
}

fn run_merge(config: &AppConfig) -> Result<()> {
    let store = CsvChunkStore::open_existing(config.chunk_dir())?;
    let output_path = config.final_output_path();
    let rows = merge_to_file(&store, &output_path)?;
    print_success(&format!("Wrote {} rows to {}", rows, output_path.display()));
    Ok(())
}

fn run_checkpoints(config: &AppConfig) -> Result<()> {
    let chunk_dir = config.chunk_dir();
    print_section_header("Checkpoints");
    print_key_value("Directory", &chunk_dir.display().to_string());

    if !chunk_dir.is_dir() {
        print_empty_list("No checkpoint directory yet");
        return Ok(());
    }
    let store = CsvChunkStore::open_existing(&chunk_dir)?;
    let chunks = store.list_chunks()?;

    if chunks.is_empty() {
        print_empty_list("No checkpoint chunks yet");
        return Ok(());
    }

    let mut table = TableBuilder::new(vec!["End row", "Kind", "Rows", "File"]);
    let mut total_rows = 0;
    for id in &chunks {
        let rows = store.read_chunk(*id)?.len();
        total_rows += rows;
        let kind = match id.kind {
            ChunkKind::Batch => "batch",
            ChunkKind::Leftover => "leftover",
        };
        table.add_row(vec![
            id.end_index.to_string(),
            kind.to_string(),
            rows.to_string(),
            id.file_name(),
        ]);
    }
    table.print();

    print_key_value("Total rows", &total_rows.to_string());
    print_key_value("Resume from", &store.resume_offset()?.to_string());
    Ok(())
}

fn run_report(config: &AppConfig, args: &ReportArgs) -> Result<()> {
    let events = load_streaming_history(&config.data_dir)?;

    let library_path = config.data_dir.join(LIBRARY_FILE_NAME);
    let library = if library_path.exists() {
        read_library(&library_path)?
    } else {
        warn!("No library export at {:?}, liked-but-skipped will be empty", library_path);
        Vec::new()
    };

    let table_path = config.final_output_path();
    let rows = if table_path.exists() {
        read_enriched_table(&table_path)?
    } else {
        warn!(
            "No enriched table at {:?}, run enrich first for genres and trends",
            table_path
        );
        Vec::new()
    };

    let options = ReportOptions {
        season: args.season,
        top_n: args.top.unwrap_or(config.report.top_n),
        genre_slices: args.genres.unwrap_or(config.report.genre_slices),
        liked_limit: args.liked.unwrap_or(config.report.liked_limit),
        skip_threshold: args.skip_threshold,
        granularity: args.granularity,
        utc_offset_hours: args.utc_offset.unwrap_or(config.report.utc_offset_hours),
        current_year: chrono::Local::now().year(),
    };
    let report = build_report(&events, &library, &rows, &options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_ranking(title: &str, label: &str, items: &[RankedItem]) {
    print_section_header(title);
    if items.is_empty() {
        print_empty_list("Nothing played");
        return;
    }
    let max = items.first().map(|i| i.count).unwrap_or(0) as f64;
    let mut table = TableBuilder::new(vec!["#", label, "Plays", ""]);
    for (rank, item) in items.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            item.name.clone(),
            item.count.to_string(),
            bar(item.count as f64, max, 20),
        ]);
    }
    table.print();
}

fn print_report(report: &DashboardReport) {
    print_section_header(report.season.label());
    print_key_value("Streams", &report.streams.to_string());
    print_key_value("Enriched rows", &report.enriched_rows.to_string());

    print_ranking("Favorite Songs", "Song", &report.top_songs);
    print_ranking("Favorite Artists", "Artist", &report.top_artists);
    print_ranking("Top Genres", "Genre", &report.top_genres);

    print_section_header("Daily Listening Pattern");
    let max = report
        .listening_pattern
        .iter()
        .map(|slot| slot.plays)
        .max()
        .unwrap_or(0) as f64;
    let mut pattern = TableBuilder::new(vec!["Time", "Songs Played", ""]);
    for slot in &report.listening_pattern {
        pattern.add_row(vec![
            slot.label.clone(),
            slot.plays.to_string(),
            bar(slot.plays as f64, max, 30),
        ]);
    }
    pattern.print();

    print_section_header("Attributes Over Time");
    if report.trends.is_empty() {
        print_empty_list("No enriched rows for this season");
    } else {
        let mut trends = TableBuilder::new(vec![
            "Period",
            "Rows",
            "Energy",
            "Loudness",
            "Danceability",
        ]);
        for point in &report.trends {
            trends.add_row(vec![
                point.period.clone(),
                point.rows.to_string(),
                format!("{:.2}", point.energy),
                format!("{:.2}", point.loudness),
                format!("{:.2}", point.danceability),
            ]);
        }
        trends.print();
    }

    print_section_header("Songs You Thought You Liked");
    let mut liked = TableBuilder::new(vec!["Song", "Plays", "Mean ms played"]);
    for track in &report.liked_but_skipped {
        liked.add_row(vec![
            track.key.clone(),
            track.plays.to_string(),
            format!("{:.0}", track.mean_ms_played),
        ]);
    }
    if liked.is_empty() {
        print_empty_list("No saved tracks above the skip threshold");
    } else {
        liked.print();
    }
}
