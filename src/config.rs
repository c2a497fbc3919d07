use crate::cli::{Cli, ReportFormat};
use crate::constants::{LOG_DIR, PORT, REPO_DIR, TEMPLATE_DIR};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// resolved settings for a single run, passed through every pipeline stage
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub branch: String,

    /// maximum time to wait for a page to render before sampling
    pub wait: Duration,
    pub generations: u32,
    pub slides: u32,
    pub format: ReportFormat,

    pub port: u16,
    pub repo_dir: PathBuf,
    pub log_dir: PathBuf,
    pub template_dir: PathBuf,
}

impl Config {
    /// resolve cli arguments against the invocation directory
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let base = std::env::current_dir().context("failed to resolve current directory")?;
        Ok(Self {
            url: cli.url.clone(),
            branch: cli.branch.clone(),
            wait: Duration::from_secs(cli.wait),
            generations: cli.generations.max(1),
            slides: cli.slides.max(1),
            format: cli.format,
            port: PORT,
            repo_dir: base.join(REPO_DIR),
            log_dir: base.join(LOG_DIR),
            template_dir: base.join(TEMPLATE_DIR),
        })
    }

    /// single captures are written flat as `{hash}.png`, nested otherwise
    pub fn flat_layout(&self) -> bool {
        self.generations == 1 && self.slides == 1
    }
}
