use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::archive::LogDiagnostics;
use crate::cache::{FileCache, RecordCache};
use crate::filters::{apply_filters, parse_filter};
use crate::ingest::{ChatLoader, LoadOptions, LoadedChat};
use crate::models::MessageRecord;
use crate::parsers::timestamp::canonical_timestamp;
use crate::scheduler::{DEFAULT_CHUNK_LINES, DEFAULT_FLUSH_EVERY, ParseOptions, ProgressSink};
use crate::utils::{format_path_with_tilde, sanitize_for_terminal};

#[derive(Parser)]
#[command(name = "chat-export-explorer")]
#[command(version = "0.1.0")]
#[command(about = "Parse and browse exported chat transcripts", long_about = None)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse an export and print its messages
    Parse {
        #[command(flatten)]
        source: SourceArgs,

        /// Filter query, e.g. 'sender:alice since:2023-05-01 has:media'
        #[arg(long)]
        filter: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show statistics about an export
    Stats {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    /// Transcript file (.txt) or unpacked export directory
    pub path: PathBuf,

    /// Non-empty lines parsed per slice
    #[arg(long, default_value_t = DEFAULT_CHUNK_LINES)]
    pub chunk_lines: usize,

    /// Records per progress batch
    #[arg(long, default_value_t = DEFAULT_FLUSH_EVERY)]
    pub flush_every: usize,

    /// Neither read nor write the record cache
    #[arg(long)]
    pub no_cache: bool,
}

impl SourceArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            parse: ParseOptions { chunk_lines: self.chunk_lines, flush_every: self.flush_every },
            use_cache: !self.no_cache,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Logs each delivered batch at debug level
struct BatchLogger {
    delivered: usize,
}

impl ProgressSink for BatchLogger {
    fn on_batch(&mut self, batch: &[MessageRecord]) {
        self.delivered += batch.len();
        debug!(batch = batch.len(), delivered = self.delivered, "Records delivered");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Parse { source, filter, format }) => {
            parse_command(source, filter.as_deref(), *format)?;
        }
        Some(Commands::Stats { source }) => {
            show_stats(source)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "chat_export_explorer=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when run() is called more than once in-process
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn load(source: &SourceArgs) -> Result<LoadedChat> {
    let options = source.load_options();
    let file_cache = if options.use_cache { Some(FileCache::from_env()?) } else { None };
    let cache = file_cache.as_ref().map(|cache| cache as &dyn RecordCache);

    let mut loader = ChatLoader::new(options, cache);
    let mut progress = BatchLogger { delivered: 0 };
    loader
        .load_path(&source.path, &LogDiagnostics, &mut progress)
        .with_context(|| format!("Failed to load {}", format_path_with_tilde(&source.path)))
}

fn parse_command(source: &SourceArgs, filter: Option<&str>, format: OutputFormat) -> Result<()> {
    let expr = parse_filter(filter.unwrap_or_default()).context("Invalid --filter")?;
    let chat = load(source)?;
    let records = apply_filters(chat.records, &expr);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &records)
                .context("Failed to write JSON output")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for record in &records {
                write_record(&mut out, record)?;
            }
        }
    }

    Ok(())
}

fn write_record(out: &mut impl Write, record: &MessageRecord) -> Result<()> {
    let mut flags = String::new();
    if record.has_media() {
        flags.push_str(" [media]");
    }
    if record.is_ephemeral {
        flags.push_str(" [view once]");
    }

    writeln!(
        out,
        "[{}] {}:{}",
        canonical_timestamp(&record.timestamp),
        sanitize_for_terminal(&record.sender),
        flags
    )?;
    for line in record.text.lines() {
        writeln!(out, "    {}", sanitize_for_terminal(line))?;
    }
    Ok(())
}

fn show_stats(source: &SourceArgs) -> Result<()> {
    let chat = load(source)?;
    let records = &chat.records;

    let mut senders: Vec<&str> = records.iter().map(|r| r.sender.as_str()).collect();
    senders.sort_unstable();
    senders.dedup();

    let with_media = records.iter().filter(|r| r.has_media()).count();
    let ephemeral = records.iter().filter(|r| r.is_ephemeral).count();
    let mut dated: Vec<_> = records.iter().filter_map(|r| r.normalized_timestamp()).collect();
    dated.sort_unstable();

    println!("Chat Export Statistics");
    println!("======================");
    println!("Total messages: {}", records.len());
    println!("  With media: {}", with_media);
    println!("  View once: {}", ephemeral);
    println!("Senders: {}", senders.len());
    for sender in &senders {
        println!("  {}", sanitize_for_terminal(sender));
    }
    println!("Media files: {}", chat.store.len());
    println!();
    println!("Source: {}", format_path_with_tilde(&source.path));
    println!("Transcript: {}", sanitize_for_terminal(&chat.transcript_name));

    if let Some(oldest) = dated.first() {
        println!("Oldest message: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = dated.last() {
        println!("Newest message: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }

    match chat.stats {
        Some(stats) => {
            println!("Lines parsed: {}", stats.lines);
            println!("  Skipped before first message: {}", stats.dropped);
        }
        None => println!("Loaded from cache"),
    }

    Ok(())
}
