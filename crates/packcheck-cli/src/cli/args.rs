use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "packcheck",
    version,
    about = "Validate a resource pack archive before it is trusted or distributed"
)]
pub struct Cli {
    /// Pack archive (.zip)
    pub archive: PathBuf,

    /// Policy file (YAML or JSON); built-in rules when omitted
    #[arg(long, env = "PACKCHECK_POLICY")]
    pub policy: Option<PathBuf>,

    /// Stop at the first violation
    #[arg(long)]
    pub fail_fast: bool,

    /// Override the archive size ceiling (bytes)
    #[arg(long)]
    pub max_archive_bytes: Option<u64>,

    /// Override the per-file size ceiling (bytes)
    #[arg(long)]
    pub max_file_bytes: Option<u64>,

    /// Flag images that also carry another container signature
    #[arg(long)]
    pub detect_polyglots: bool,

    /// Append a timestamped trace of every check to this file
    #[arg(long, env = "PACKCHECK_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
