//! Version-control side effect: commit and push the channel directory.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use tubedigest_shared::{Result, TubedigestError};

/// Capability interface for recording newly written summaries in history.
pub trait CommitService: Send + Sync {
    /// Stage `dir`, commit with `message`, and push.
    fn commit_and_push(&self, dir: &Path, message: &str) -> Result<()>;
}

/// [`CommitService`] shelling out to the `git` binary.
///
/// Commands run with the channel directory as working directory, so the
/// summaries must live inside a checked-out repository with a configured
/// remote. Failures carry git's stderr; the orchestrator downgrades them to
/// a warning since summaries and the notification are already durable.
pub struct GitCommitService;

impl GitCommitService {
    fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
        debug!(?args, dir = %dir.display(), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| TubedigestError::Commit(format!("git {}: {e}", args.join(" "))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubedigestError::Commit(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl CommitService for GitCommitService {
    fn commit_and_push(&self, dir: &Path, message: &str) -> Result<()> {
        Self::run_git(dir, &["add", "."])?;
        Self::run_git(dir, &["commit", "-m", message])?;
        Self::run_git(dir, &["push"])?;

        info!(dir = %dir.display(), "summaries committed and pushed");
        Ok(())
    }
}
