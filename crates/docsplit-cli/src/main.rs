//! docsplit CLI - Split documents into bounded, overlapping chunks.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use docsplit_chunk::{AdaptiveSplitter, RecursiveSplitter};
use docsplit_core::{
    ContentType, DocsplitConfig, DocsplitError, IngestReport, KeepSeparator, Result, SplitConfig,
    Splitter,
};
use docsplit_ingest::{IngestPipeline, MemoryStore, MockEmbedder};

/// docsplit - Recursive separator-hierarchy document splitter
#[derive(Parser)]
#[command(name = "docsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/docsplit/config.toml, then ./docsplit.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a document and print its chunks
    Split {
        /// File to split ("-" reads stdin)
        input: PathBuf,

        #[command(flatten)]
        overrides: SplitOverrides,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Dry-run the ingestion pipeline with a mock embedder and in-memory store
    Ingest {
        /// File to ingest ("-" reads stdin)
        input: PathBuf,

        #[command(flatten)]
        overrides: SplitOverrides,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        overrides: SplitOverrides,
    },
}

/// Command-line overrides for the `[splitter]` config section.
#[derive(Args, Debug, Default)]
struct SplitOverrides {
    /// Maximum chunk size in characters
    #[arg(short, long)]
    max_chunk_size: Option<usize>,

    /// Overlap between adjacent chunks in characters
    #[arg(short, long)]
    overlap: Option<usize>,

    /// Separator, highest priority first; repeatable. Understands \n, \t, \r
    #[arg(short, long = "separator")]
    separators: Vec<String>,

    /// Where matched separators are kept: discard, start or end
    #[arg(long)]
    keep_separator: Option<KeepSeparator>,

    /// Keep leading and trailing whitespace of chunks
    #[arg(long)]
    no_strip: bool,

    /// Separator preset; "auto" detects it from the file extension
    #[arg(long, value_enum)]
    content_type: Option<ContentTypeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ContentTypeArg {
    Auto,
    Plain,
    Markdown,
    Code,
    Data,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ChunkOutput<'a> {
    chunk_index: usize,
    length: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct IngestOutput {
    #[serde(flatten)]
    report: IngestReport,
    stored_rows: usize,
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Split {
            input,
            overrides,
            format,
        } => {
            apply_overrides(&mut config.splitter, &overrides)?;
            let splitter = build_splitter(&overrides, &input);
            let text = read_input(&input)?;
            let chunks = splitter.split(&text, &config.splitter)?;
            debug!(chunks = chunks.len(), "Split document");
            print_chunks(&chunks, splitter.as_ref(), format)?;
        }
        Commands::Ingest { input, overrides } => {
            apply_overrides(&mut config.splitter, &overrides)?;
            let report = ingest(&config, &overrides, &input).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config { overrides } => {
            resolve_config(&mut config, &overrides)?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DocsplitConfig> {
    match path {
        Some(path) => DocsplitConfig::load(path),
        None => DocsplitConfig::load_default(),
    }
}

/// Apply command-line overrides and re-validate.
fn apply_overrides(config: &mut SplitConfig, overrides: &SplitOverrides) -> Result<()> {
    if let Some(max) = overrides.max_chunk_size {
        config.max_chunk_size = max;
    }
    if let Some(overlap) = overrides.overlap {
        config.chunk_overlap = overlap;
    }
    if !overrides.separators.is_empty() {
        let mut separators: Vec<String> =
            overrides.separators.iter().map(|s| unescape(s)).collect();
        if separators.last().map_or(true, |s| !s.is_empty()) {
            separators.push(String::new());
        }
        config.separators = separators;
    }
    if let Some(keep) = overrides.keep_separator {
        config.keep_separator = keep;
    }
    if overrides.no_strip {
        config.strip_whitespace = false;
    }

    config.validate()
}

/// Apply overrides, then the separator preset of the selected content type.
fn resolve_config(config: &mut DocsplitConfig, overrides: &SplitOverrides) -> Result<()> {
    apply_overrides(&mut config.splitter, overrides)?;
    if let Some(content_type) = preset_content_type(overrides, Path::new("")) {
        config.splitter = AdaptiveSplitter::new(content_type).effective_config(&config.splitter);
    }
    Ok(())
}

/// Content type whose separator preset applies, if any.
///
/// Explicit separators always win over presets. "auto" with no file name
/// resolves to `Unknown`.
fn preset_content_type(overrides: &SplitOverrides, input: &Path) -> Option<ContentType> {
    if !overrides.separators.is_empty() {
        return None;
    }

    let content_type = match overrides.content_type? {
        ContentTypeArg::Auto => ContentType::from_path(&input.to_string_lossy()),
        ContentTypeArg::Plain => ContentType::PlainText,
        ContentTypeArg::Markdown => ContentType::Markdown,
        ContentTypeArg::Code => ContentType::Code,
        ContentTypeArg::Data => ContentType::Data,
    };
    Some(content_type)
}

fn build_splitter(overrides: &SplitOverrides, input: &Path) -> Box<dyn Splitter> {
    match preset_content_type(overrides, input) {
        Some(content_type) => {
            debug!(%content_type, "Using separator preset");
            Box::new(AdaptiveSplitter::new(content_type))
        }
        None => Box::new(RecursiveSplitter::new()),
    }
}

async fn ingest(
    config: &DocsplitConfig,
    overrides: &SplitOverrides,
    input: &Path,
) -> Result<IngestOutput> {
    let text = read_input(input)?;

    let embedder = Arc::new(MockEmbedder::with_dimension(config.ingest.embedding_dimension));
    let store = Arc::new(MemoryStore::new());
    let mut pipeline = IngestPipeline::new(embedder, store.clone(), config)?;
    if preset_content_type(overrides, input).is_some() {
        let splitter = build_splitter(overrides, input);
        pipeline = pipeline.with_splitter(BoxedSplitter(splitter));
    }

    let report = pipeline.ingest(&text).await?;
    Ok(IngestOutput {
        report,
        stored_rows: store.len().await,
    })
}

/// Lets a boxed splitter be handed to APIs taking `impl Splitter`.
struct BoxedSplitter(Box<dyn Splitter>);

impl Splitter for BoxedSplitter {
    fn split(&self, text: &str, config: &SplitConfig) -> Result<Vec<String>> {
        self.0.split(text, config)
    }

    fn length(&self, text: &str) -> usize {
        self.0.length(text)
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    fs::read_to_string(input).map_err(|e| {
        DocsplitError::invalid_argument(format!("cannot read {}: {}", input.display(), e))
    })
}

fn print_chunks(chunks: &[String], splitter: &dyn Splitter, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output: Vec<ChunkOutput> = chunks
                .iter()
                .enumerate()
                .map(|(chunk_index, text)| ChunkOutput {
                    chunk_index,
                    length: splitter.length(text),
                    text,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for (idx, chunk) in chunks.iter().enumerate() {
                println!("--- chunk {} ({} chars) ---", idx, splitter.length(chunk));
                println!("{}", chunk);
            }
        }
    }
    Ok(())
}

/// Expand `\n`, `\t`, `\r` and `\\` escapes.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
