use crate::contrib::parse::LOG_FORMAT;
use crate::error::{ContribError, Result};
use crate::model::{DateWindow, DATE_KEY_FORMAT};
use chrono::Days;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, Stdio};
use std::thread;
use tracing::{debug, warn};

/// True if `path` holds a `.git` entry or lies inside a work tree.
pub fn is_git_directory(path: &Path) -> bool {
    if path.join(".git").exists() {
        return true;
    }
    Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["rev-parse", "--git-dir"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };
        if !is_git_directory(&path) {
            return Err(ContribError::NotARepository(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arguments for a `git log` that covers `window` across every local and
    /// remote branch, one header line per commit plus `--numstat` lines.
    pub fn log_args(window: &DateWindow) -> Vec<String> {
        // one day of slack so author timezones east of the committer are not cut off
        let since = window
            .start()
            .checked_sub_days(Days::new(1))
            .unwrap_or(window.start());

        vec![
            "--no-pager".to_string(),
            "log".to_string(),
            "--branches".to_string(),
            "--remotes".to_string(),
            "--summary".to_string(),
            "--numstat".to_string(),
            "--mailmap".to_string(),
            "--no-merges".to_string(),
            "--since".to_string(),
            since.format(DATE_KEY_FORMAT).to_string(),
            "--until".to_string(),
            window.end().format(DATE_KEY_FORMAT).to_string(),
            LOG_FORMAT.to_string(),
        ]
    }

    /// Run `git log` for `window` and hand its stdout to `consume`.
    ///
    /// The child is always reaped. A non-zero exit turns into
    /// [`ContribError::GitCommand`] unless `consume` already failed.
    pub fn stream_log<T, F>(&self, window: &DateWindow, consume: F) -> Result<T>
    where
        F: FnOnce(BufReader<ChildStdout>) -> Result<T>,
    {
        let args = Self::log_args(window);
        debug!(?args, repo = %self.path.display(), "running git");

        let mut command = Command::new("git");
        command.args(&args).current_dir(&self.path);
        stream_stdout(command, consume)
    }
}

/// Spawn `command` and feed its stdout to `consume` while stderr is drained
/// on a separate thread, so a chatty child cannot block on a full pipe.
fn stream_stdout<T, F>(mut command: Command, consume: F) -> Result<T>
where
    F: FnOnce(BufReader<ChildStdout>) -> Result<T>,
{
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ContribError::GitCommand(format!("failed to start git: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ContribError::GitCommand("git stdout was not captured".to_string()))?;
    let stderr = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = pipe.read_to_string(&mut text);
            text
        })
    });

    let result = consume(BufReader::new(stdout));
    if result.is_err() {
        if let Err(e) = child.kill() {
            warn!(error = %e, "failed to stop git after a parse error");
        }
    }

    let status = child.wait()?;
    let stderr = stderr
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    let value = result?;
    if !status.success() {
        return Err(ContribError::GitCommand(format!("{} ({status})", stderr.trim())));
    }
    Ok(value)
}
