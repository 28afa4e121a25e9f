use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-fixr",
    about = "Repair dependency license records and emit a consolidated license appendix",
    version
)]
pub struct Cli {
    /// Package inspector output to read: a JSON mapping of name@version keys
    /// to license metadata
    pub input: PathBuf,

    /// Appendix output file path (parent directory must exist)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Appendix format
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: AppendixFormat,

    /// GitHub personal access token; enables the repository lookup stage
    #[arg(short, long, value_name = "TOKEN")]
    pub auth: Option<String>,

    /// Config file [default: ./.license-fixr/config.toml, fallback ~/.config/license-fixr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a repair summary log; use without value to default to license-fix.log
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "license-fix.log")]
    pub log: Option<PathBuf>,

    /// List every repaired package with its repair source
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum AppendixFormat {
    Text,
    Json,
}
