// src/services/publish.rs

//! Publishes the dataset to the remote git repository.

use std::path::PathBuf;
use std::process::Stdio;

use chrono::Local;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::{Config, PublishConfig};
use crate::utils::with_token;

/// Stages, commits and pushes the published files.
#[derive(Clone)]
pub struct GitPublisher {
    workdir: PathBuf,
    files: Vec<String>,
    publish: PublishConfig,
    /// Push target including credentials. Never logged.
    authenticated_remote: String,
}

impl std::fmt::Debug for GitPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitPublisher")
            .field("workdir", &self.workdir)
            .field("files", &self.files)
            .field("remote", &self.publish.remote)
            .finish()
    }
}

impl GitPublisher {
    /// Build a publisher from configuration, reading the token from the
    /// configured environment variable.
    ///
    /// Returns `None` when publishing is disabled.
    pub fn from_env(config: &Config) -> Result<Option<Self>> {
        if !config.publish.enabled {
            return Ok(None);
        }
        let token = std::env::var(&config.publish.token_env).ok();
        Self::new(config, token.as_deref()).map(Some)
    }

    /// Build a publisher with an explicit token.
    pub fn new(config: &Config, token: Option<&str>) -> Result<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::MissingToken(config.publish.token_env.clone()))?;

        let authenticated_remote = with_token(&config.publish.remote, token).ok_or_else(|| {
            AppError::config(format!("publish.remote is not a valid URL: {}", config.publish.remote))
        })?;

        Ok(Self {
            workdir: config.paths.root.clone(),
            files: vec![
                config.paths.dataset_file.clone(),
                config.paths.counter_file.clone(),
            ],
            publish: config.publish.clone(),
            authenticated_remote,
        })
    }

    /// Commit message for a run with `count` records.
    pub fn commit_message(&self, count: usize) -> String {
        let timestamp = Local::now().format("%c").to_string();
        self.publish.render_message(count, &timestamp)
    }

    /// Stage the dataset and counter, commit, and push.
    pub async fn publish(&self, record_count: usize) -> Result<()> {
        for file in &self.files {
            self.git(&["add", file.as_str()], &format!("git add {file}")).await?;
        }

        let message = self.commit_message(record_count);
        self.git(&["commit", "-m", message.as_str()], "git commit").await?;

        let display = format!("git push {}", self.publish.remote);
        self.git(&["push", self.authenticated_remote.as_str()], &display).await?;

        log::info!("Changes committed and pushed: {}", message);
        Ok(())
    }

    /// Run one git command in the working tree. `display` is what appears in
    /// logs and errors in place of the real arguments.
    async fn git(&self, args: &[&str], display: &str) -> Result<()> {
        log::debug!("Running {}", display);

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::git(display, "git is not installed or not found in PATH")
                } else {
                    AppError::git(display, e)
                }
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr)
            .replace(&self.authenticated_remote, &self.publish.remote);
        Err(AppError::git(
            display,
            format!("{} {}", output.status, stderr.trim()),
        ))
    }
}
