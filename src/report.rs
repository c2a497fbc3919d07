use crate::cli::ReportFormat;
use crate::config::Config;
use crate::constants::{HTML_REPORT, MARKDOWN_REPORT, TEMPLATE_NAME};
use crate::history::CommitRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::Tera;

const DEFAULT_TEMPLATE: &str = include_str!("report/main_template.html");

/// one capture attempt; `image_path` is set iff a canvas was found, relative
/// to the log directory
#[derive(Debug, Clone, Serialize)]
pub struct CaptureResult {
    pub generation: u32,
    pub slide: u32,
    pub image_path: Option<String>,
}

/// one page load's worth of slides
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub number: u32,
    pub slides: Vec<CaptureResult>,
}

/// a commit with its capture tree, ordered oldest-first in the report model
#[derive(Debug, Clone, Serialize)]
pub struct CommitEntry {
    pub commit: CommitRecord,
    pub generations: Vec<Generation>,
}

/// render the accumulated history into the log directory, returning the
/// report path
pub fn write_report(config: &Config, entries: &[CommitEntry]) -> Result<PathBuf> {
    let (name, contents) = match config.format {
        ReportFormat::Html => (HTML_REPORT, render_html(config, entries)?),
        ReportFormat::Markdown => (MARKDOWN_REPORT, render_markdown(entries)),
    };
    let path = config.log_dir.join(name);
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// render through the tera template; a `template/main_template.html` next to
/// the invocation directory overrides the built-in one
fn render_html(config: &Config, entries: &[CommitEntry]) -> Result<String> {
    let template = fs::read_to_string(config.template_dir.join(TEMPLATE_NAME))
        .unwrap_or_else(|_| DEFAULT_TEMPLATE.to_string());

    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, &template)
        .context("report template failed to parse")?;

    let mut context = tera::Context::new();
    context.insert("commits", entries);
    tera.render(TEMPLATE_NAME, &context)
        .context("report template failed to render")
}

/// flat markdown variant: one section per commit, a placeholder line where
/// no canvas was captured
fn render_markdown(entries: &[CommitEntry]) -> String {
    use std::fmt::Write;

    let mut out = String::from("# process history\n");
    for entry in entries {
        let commit = &entry.commit;
        let _ = write!(
            out,
            "\n## [{}]({})\n\n{}\n\n*{}*\n\n",
            commit.short_hash,
            commit.url,
            commit.message.trim(),
            commit.author
        );
        for generation in &entry.generations {
            for slide in &generation.slides {
                match &slide.image_path {
                    Some(path) => {
                        let _ = writeln!(
                            out,
                            "![{} {}_{}]({})",
                            commit.short_hash, generation.number, slide.slide, path
                        );
                    }
                    None => {
                        let _ = writeln!(out, "_no visualization available_");
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> CommitRecord {
        let hash = format!("{n:040x}");
        CommitRecord {
            short_hash: hash.chars().take(7).collect(),
            url: format!("https://example.com/art/commit/{hash}"),
            hash,
            message: format!("commit {n}\n"),
            author: "Test User".to_string(),
            timestamp: 1_700_000_000 + i64::from(n),
        }
    }

    fn entry(n: u32, image_path: Option<&str>) -> CommitEntry {
        CommitEntry {
            commit: record(n),
            generations: vec![Generation {
                number: 1,
                slides: vec![CaptureResult {
                    generation: 1,
                    slide: 1,
                    image_path: image_path.map(str::to_string),
                }],
            }],
        }
    }

    fn html_config(format: ReportFormat) -> Config {
        Config {
            url: "https://example.com/art.git".to_string(),
            branch: "main".to_string(),
            wait: std::time::Duration::from_secs(0),
            generations: 1,
            slides: 1,
            format,
            port: 0,
            repo_dir: "repo".into(),
            log_dir: "log".into(),
            // points nowhere so the built-in template is used
            template_dir: "does-not-exist".into(),
        }
    }

    #[test]
    fn test_markdown_preserves_commit_order() {
        let entries = vec![
            entry(1, Some("a.png")),
            entry(2, Some("b.png")),
            entry(3, None),
        ];
        let markdown = render_markdown(&entries);

        let first = markdown.find(&entries[0].commit.short_hash).unwrap();
        let second = markdown.find(&entries[1].commit.short_hash).unwrap();
        let third = markdown.find(&entries[2].commit.short_hash).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_markdown_placeholder_for_absent_capture() {
        let markdown = render_markdown(&[entry(1, None)]);
        assert!(markdown.contains("_no visualization available_"));
        assert!(!markdown.contains("!["), "no broken image reference");
    }

    #[test]
    fn test_markdown_links_present_capture() {
        let markdown = render_markdown(&[entry(1, Some("0000001.png"))]);
        assert!(markdown.contains("](0000001.png)"));
        assert!(!markdown.contains("no visualization"));
    }

    #[test]
    fn test_html_renders_entry_per_commit() {
        let entries = vec![
            entry(1, Some("a.png")),
            entry(2, None),
            entry(3, Some("c.png")),
        ];
        let html = render_html(&html_config(ReportFormat::Html), &entries).unwrap();

        for e in &entries {
            assert!(html.contains(&e.commit.short_hash));
            assert!(html.contains(&e.commit.url));
        }
        // present captures render an image, absent ones are omitted
        assert!(html.contains(r#"src="a.png""#));
        assert!(html.contains(r#"src="c.png""#));
        assert_eq!(html.matches("<img").count(), 2);
    }

    #[test]
    fn test_html_orders_commits_oldest_first() {
        let entries = vec![entry(1, None), entry(2, None)];
        let html = render_html(&html_config(ReportFormat::Html), &entries).unwrap();

        let first = html.find(&entries[0].commit.short_hash).unwrap();
        let second = html.find(&entries[1].commit.short_hash).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_multi_generation_entries_render_every_slide() {
        let mut e = entry(1, None);
        e.generations = (1..=2)
            .map(|g| Generation {
                number: g,
                slides: (1..=3)
                    .map(|s| CaptureResult {
                        generation: g,
                        slide: s,
                        image_path: Some(format!("{}/{g}_{s}.png", e.commit.hash)),
                    })
                    .collect(),
            })
            .collect();

        let html = render_html(&html_config(ReportFormat::Html), &[e.clone()]).unwrap();
        assert_eq!(html.matches("<img").count(), 6);

        let markdown = render_markdown(&[e]);
        assert_eq!(markdown.matches("![").count(), 6);
    }
}
