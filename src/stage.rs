use crate::config::Config;
use anyhow::{Context, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Oid, Repository};
use std::fs;
use std::path::PathBuf;

/// remove leftovers from a previous run and create a fresh log directory
pub fn prepare_dirs(config: &Config) -> Result<()> {
    for dir in [&config.repo_dir, &config.log_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("failed to remove {}", dir.display()))?;
        }
    }
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("failed to create {}", config.log_dir.display()))?;
    Ok(())
}

/// a cloned working copy; the directory is deleted when this is dropped
pub struct Staging {
    repo: Repository,
    repo_dir: PathBuf,
}

impl Staging {
    /// clone the remote and check out the requested branch
    pub fn clone(config: &Config) -> Result<Self> {
        let repo = RepoBuilder::new()
            .branch(&config.branch)
            .clone(&config.url, &config.repo_dir)
            .with_context(|| {
                format!("failed to clone {} (branch {})", config.url, config.branch)
            })?;
        Ok(Self {
            repo,
            repo_dir: config.repo_dir.clone(),
        })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// base web url of the remote, with any trailing ".git" removed
    pub fn remote_base_url(&self) -> Result<String> {
        let remote = self
            .repo
            .find_remote("origin")
            .context("repository has no origin remote")?;
        let url = remote.url().context("origin remote url is not valid utf-8")?;
        Ok(url.trim_end_matches(".git").to_string())
    }

    /// force-checkout a commit, leaving the working tree at exactly that
    /// revision with HEAD detached
    pub fn checkout(&self, hash: &str) -> Result<()> {
        let oid = Oid::from_str(hash).with_context(|| format!("invalid commit hash {hash}"))?;
        let object = self
            .repo
            .find_object(oid, None)
            .with_context(|| format!("commit {hash} not found"))?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true);
        self.repo
            .checkout_tree(&object, Some(&mut checkout))
            .with_context(|| format!("failed to check out {hash}"))?;
        self.repo
            .set_head_detached(oid)
            .with_context(|| format!("failed to detach HEAD at {hash}"))?;
        Ok(())
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        // best effort, the directory may already be gone
        let _ = fs::remove_dir_all(&self.repo_dir);
    }
}
