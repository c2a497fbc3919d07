use crate::constants::{SHORT_HASH_LEN, SKIP_MARKER};
use anyhow::{Context, Result};
use git2::Repository;
use serde::Serialize;

/// metadata for one qualifying commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
    pub url: String,
}

/// list commits reachable from HEAD, oldest first, excluding any whose
/// message contains the skip marker
pub fn commits(repo: &Repository, remote_base_url: &str) -> Result<Vec<CommitRecord>> {
    let mut walk = repo.revwalk().context("failed to start revision walk")?;
    walk.push_head().context("failed to push HEAD onto revision walk")?;

    let mut records = Vec::new();
    for oid in walk {
        let oid = oid.context("revision walk failed")?;
        let commit = repo
            .find_commit(oid)
            .with_context(|| format!("failed to load commit {oid}"))?;

        let message = commit.message().unwrap_or_default().to_string();
        if message.contains(SKIP_MARKER) {
            continue;
        }

        let hash = oid.to_string();
        records.push(CommitRecord {
            short_hash: hash.chars().take(SHORT_HASH_LEN).collect(),
            url: format!("{remote_base_url}/commit/{hash}"),
            message,
            author: commit.author().name().unwrap_or("unknown").to_string(),
            timestamp: commit.time().seconds(),
            hash,
        });
    }

    // the walk yields newest first, the report wants oldest first
    records.reverse();
    Ok(records)
}
