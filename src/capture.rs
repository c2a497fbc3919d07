use crate::browser::Capturer;
use crate::config::Config;
use crate::history::CommitRecord;
use crate::report::{CaptureResult, CommitEntry, Generation};
use crate::stage::Staging;
use crate::warning;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;

/// drive the browser over every commit, writing captures into the log
/// directory and accumulating the report model in commit order
pub fn capture_all(
    config: &Config,
    staging: &Staging,
    commits: &[CommitRecord],
    capturer: &Capturer,
    base_url: &str,
) -> Result<Vec<CommitEntry>> {
    let bar = ProgressBar::new(commits.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40} {pos}/{len} {msg}")
            .expect("invalid progress template"),
    );

    let mut entries = Vec::with_capacity(commits.len());
    for commit in commits {
        bar.set_message(commit.short_hash.clone());

        // the served directory mutates in place, so the checkout must finish
        // before the browser navigates
        staging.checkout(&commit.hash)?;

        let entry = build_entry(
            config,
            commit,
            || capturer.load(base_url),
            || capturer.sample_canvas(),
        )?;
        entries.push(entry);
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(entries)
}

/// assemble one commit's capture tree: `load` starts a fresh page load per
/// generation, `sample` waits and returns png bytes when a canvas was found
fn build_entry(
    config: &Config,
    commit: &CommitRecord,
    mut load: impl FnMut() -> Result<()>,
    mut sample: impl FnMut() -> Result<Option<Vec<u8>>>,
) -> Result<CommitEntry> {
    let mut generations = Vec::with_capacity(config.generations as usize);
    for generation in 1..=config.generations {
        load()?;

        let mut slides = Vec::with_capacity(config.slides as usize);
        for slide in 1..=config.slides {
            let image_path = match sample()? {
                Some(png) => Some(write_capture(config, &commit.hash, generation, slide, &png)?),
                None => {
                    warning!("no canvas element found for commit {}", commit.short_hash);
                    None
                }
            };
            slides.push(CaptureResult {
                generation,
                slide,
                image_path,
            });
        }
        generations.push(Generation {
            number: generation,
            slides,
        });
    }

    Ok(CommitEntry {
        commit: commit.clone(),
        generations,
    })
}

/// write one capture and return its path relative to the log directory
fn write_capture(
    config: &Config,
    hash: &str,
    generation: u32,
    slide: u32,
    png: &[u8],
) -> Result<String> {
    let relative = image_path(hash, generation, slide, config.flat_layout());
    let path = config.log_dir.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(relative)
}

/// single captures are written flat as `{hash}.png`, multi-capture runs are
/// namespaced as `{hash}/{generation}_{slide}.png`
pub fn image_path(hash: &str, generation: u32, slide: u32, flat: bool) -> String {
    if flat {
        format!("{hash}.png")
    } else {
        format!("{hash}/{generation}_{slide}.png")
    }
}
