use book_analysis::types::{
    BackendConfig, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHAPTER_LENGTH, EMBEDDING_CHUNK_SIZE_BOUNDS,
    FALLBACK_GROUP_SIZE_BOUNDS, MAX_CHARS_BOUNDS, MIN_CHAPTER_LENGTH_BOUNDS,
};
use clap::{Args, Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "book-analyze")]
#[command(about = "Split novels into chapters and run book analysis against a remote backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output directory for exported reports
    #[arg(short, long, global = true, default_value = "./output")]
    pub output: PathBuf,

    /// Base URL of the book analysis backend
    #[arg(
        long,
        global = true,
        env = "BOOK_ANALYSIS_API_URL",
        default_value = "http://localhost:8000/api/"
    )]
    pub api_url: String,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "BOOK_ANALYSIS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "300")]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a text file and print the resolved text
    Decode(DecodeArgs),

    /// Split text files into chapters without analyzing them
    Split(SplitArgs),

    /// Run the full split-and-analyze workflow on one text file
    Analyze(AnalyzeArgs),

    /// List projects available as embedding targets
    Projects,
}

fn bounded(bounds: RangeInclusive<usize>) -> impl Fn(&str) -> Result<usize, String> + Clone {
    move |value: &str| {
        let parsed: usize = value
            .parse()
            .map_err(|_| format!("'{}' is not a number", value))?;
        if bounds.contains(&parsed) {
            Ok(parsed)
        } else {
            Err(format!(
                "must be between {} and {}",
                bounds.start(),
                bounds.end()
            ))
        }
    }
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Input source (.txt path, URL, or - for stdin)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Write the decoded text to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct SplitArgs {
    /// Input sources (.txt paths, directories, URLs, or - for stdin)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Minimum chapter length in characters
    #[arg(long, default_value_t = DEFAULT_MIN_CHAPTER_LENGTH, value_parser = bounded(MIN_CHAPTER_LENGTH_BOUNDS))]
    pub min_chapter_length: usize,

    /// Paragraphs per group when no chapter headings are found
    #[arg(long, value_parser = bounded(FALLBACK_GROUP_SIZE_BOUNDS))]
    pub fallback_group_size: Option<usize>,

    /// Output split results to JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Show chapter previews
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input source (.txt path, URL, or - for stdin)
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Minimum chapter length in characters
    #[arg(long, default_value_t = DEFAULT_MIN_CHAPTER_LENGTH, value_parser = bounded(MIN_CHAPTER_LENGTH_BOUNDS))]
    pub min_chapter_length: usize,

    /// Paragraphs per group when no chapter headings are found
    #[arg(long, value_parser = bounded(FALLBACK_GROUP_SIZE_BOUNDS))]
    pub fallback_group_size: Option<usize>,

    /// First chapter to analyze (inclusive)
    #[arg(long)]
    pub start: Option<usize>,

    /// Last chapter to analyze (inclusive)
    #[arg(long)]
    pub end: Option<usize>,

    /// Maximum characters sent to the model
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS, value_parser = bounded(MAX_CHARS_BOUNDS))]
    pub max_chars: usize,

    /// Project to write embeddings into
    #[arg(long, value_name = "PROJECT_ID")]
    pub project: Option<String>,

    /// Write the analysis into the project's vector store
    #[arg(long)]
    pub embed: bool,

    /// Embedding chunk size in characters
    #[arg(long, value_parser = bounded(EMBEDDING_CHUNK_SIZE_BOUNDS))]
    pub embedding_chunk_size: Option<usize>,

    /// Analyze without splitting first (range defaults to 1-1)
    #[arg(long)]
    pub skip_split: bool,

    /// Print the report to stdout
    #[arg(long)]
    pub print: bool,

    /// Output analysis result to JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,
}
