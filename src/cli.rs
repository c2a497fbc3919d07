use clap::{Parser, ValueEnum};

/// sketchlog: replay a repository's history and capture its canvas output
/// one commit at a time
#[derive(Parser, Debug)]
#[command(name = "sketchlog", about, long_about = None)]
pub struct Cli {
    /// remote repository to clone and replay
    pub url: String,

    /// branch to walk
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// seconds to wait for the page to render before sampling the canvas
    #[arg(long, default_value_t = 5)]
    pub wait: u64,

    /// independent page loads to capture per commit
    #[arg(long = "generate", default_value_t = 1)]
    pub generations: u32,

    /// frames to sample within each page load
    #[arg(long, default_value_t = 1)]
    pub slides: u32,

    /// report format written to the log directory
    #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
    pub format: ReportFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Markdown,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
