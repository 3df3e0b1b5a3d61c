//! CLI argument definitions for the MML extraction tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use mml_model::ExtractFormat;

#[derive(Parser)]
#[command(
    name = "mml-extract",
    version,
    about = "Extract and normalize MetaMapLite / cTAKES output",
    long_about = "Extract concept mentions from MetaMapLite (json, mmi) or cTAKES (xmi)\n\
                  output files and write three tables: per-note statistics, normalized\n\
                  concept records, and a CUI-by-document pivot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract engine output into note, concept, and pivot tables.
    Extract(ExtractArgs),

    /// Split long note files on line boundaries.
    Split(SplitArgs),
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Directories containing notes processed by the NLP engine.
    #[arg(value_name = "NOTE_DIR", required = true)]
    pub note_directories: Vec<PathBuf>,

    /// Output directory for the result tables.
    #[arg(long = "outdir", value_name = "DIR")]
    pub outdir: PathBuf,

    /// CUI allow-list file; FROM_CUI,TO_CUI lines enable mapping.
    #[arg(long = "cui-file", value_name = "FILE")]
    pub cui_file: Option<PathBuf>,

    /// Engine output format to look for.
    #[arg(long = "extract-format", value_enum, default_value = "json")]
    pub extract_format: ExtractFormatArg,

    /// Engine output directories when separate from the note directories
    /// (e.g., for cTAKES). Order must mirror NOTE_DIR.
    #[arg(long = "extract-directory", value_name = "DIR")]
    pub extract_directories: Vec<PathBuf>,

    /// Force extra columns into the concept table.
    #[arg(long = "add-fieldname", value_name = "NAME")]
    pub add_fieldnames: Vec<String>,

    /// Number of files per directory to scan for column discovery.
    #[arg(long = "max-search", default_value_t = 1000)]
    pub max_search: usize,

    /// Exclude results the engine marked as negated.
    #[arg(long = "exclude-negated")]
    pub exclude_negated: bool,

    /// Skip notes with no engine output instead of failing. Useful for
    /// generating sample data.
    #[arg(long = "skip-missing")]
    pub skip_missing: bool,

    /// Encoding of the engine output files.
    #[arg(long = "extract-encoding", default_value = "windows-1252")]
    pub extract_encoding: String,

    /// Encoding of the note text files.
    #[arg(long = "file-encoding", default_value = "utf-8")]
    pub file_encoding: String,

    /// Note filename suffix, including the period.
    #[arg(long = "note-suffix", default_value = ".txt")]
    pub note_suffix: String,

    /// Engine-output suffix when different from the default for the
    /// format. Include the period.
    #[arg(long = "extract-suffix", value_name = "SUFFIX")]
    pub extract_suffix: Option<String>,
}

#[derive(Parser)]
pub struct SplitArgs {
    /// Files, or directories of files, to split.
    #[arg(value_name = "PATH", required = true)]
    pub files: Vec<PathBuf>,

    /// Number of lines after which to start a new file.
    #[arg(long = "n-lines", default_value_t = 200)]
    pub n_lines: usize,

    /// Append produced file names to this filelist.
    #[arg(long = "filelist", value_name = "FILE")]
    pub filelist: Option<PathBuf>,

    /// Encoding of the input files.
    #[arg(long = "encoding", default_value = "windows-1252")]
    pub encoding: String,
}

/// CLI extract format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ExtractFormatArg {
    Json,
    Mmi,
    Xmi,
}

impl From<ExtractFormatArg> for ExtractFormat {
    fn from(arg: ExtractFormatArg) -> Self {
        match arg {
            ExtractFormatArg::Json => Self::Json,
            ExtractFormatArg::Mmi => Self::Mmi,
            ExtractFormatArg::Xmi => Self::Xmi,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
