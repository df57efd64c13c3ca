use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::GitResult;
use crate::git::executor::{GitExecutor, summarize};
use crate::git::parser::{
    self, BranchRecord, CommitRecord, FIELD_SEP, GraphEntry, Remote, RepoStatus,
};
use crate::git::resolver::{RepoHandle, resolve_repo};
use crate::security::{
    sanitize_commit_message, validate_file_path, validate_ref_name, validate_remote_name,
};
use std::path::PathBuf;

/// Marker appended when a staged diff is cut at the configured byte limit.
const DIFF_TRUNCATED_MARKER: &str = "\n\n[diff truncated - too large]";

/// Most entries a single log request may return.
const MAX_LOG_LIMIT: usize = 200;

/// Entries fetched for the simplified commit graph.
const GRAPH_LIMIT: usize = 100;

/// The operation surface consumed by the routing layer.
///
/// A `Repository` is opened fresh for every request: `open` re-resolves and
/// re-validates the path each time, and nothing is cached across requests,
/// so a repository that moves or disappears between calls is noticed
/// immediately. Every caller-supplied string is validated here even though
/// the transport schema already checked it; the core never trusts upstream
/// validation alone.
#[derive(Debug)]
pub struct Repository {
    handle: RepoHandle,
    executor: GitExecutor,
    max_diff_bytes: usize,
    audit: Option<AuditLogger>,
}

impl Repository {
    /// Resolve `repo_path` (falling back to the configured default) and open
    /// the repository for one request.
    pub fn open(repo_path: Option<&str>, config: &Config) -> GitResult<Self> {
        let handle = resolve_repo(repo_path, &config.git)?;
        let executor = GitExecutor::new(&config.git);

        // Command logging is best effort: an unwritable log directory must
        // not take git operations down with it.
        let audit = if config.behavior.log_commands {
            AuditLogger::new().ok()
        } else {
            None
        };

        Ok(Self {
            handle,
            executor,
            max_diff_bytes: config.git.max_diff_bytes,
            audit,
        })
    }

    pub fn handle(&self) -> &RepoHandle {
        &self.handle
    }

    /// Run one git command and return its stdout. All operations funnel
    /// through here so every invocation hits the audit log.
    fn run(&self, args: &[&str]) -> GitResult<String> {
        let outcome = self.executor.run(&self.handle, args);

        if let Some(audit) = &self.audit {
            let exit_code = match &outcome {
                Ok(result) => result.exit_code,
                Err(_) => -1,
            };
            let _ = audit.log_command(&summarize(args), self.handle.path(), exit_code);
        }

        outcome.map(|result| result.stdout)
    }

    /// Structured working-tree status.
    pub fn status(&self) -> GitResult<RepoStatus> {
        let raw = self.run(&["status", "--porcelain=v1", "--branch"])?;
        Ok(parser::parse_status(&raw))
    }

    /// Stage a single file, path fenced behind `--`.
    pub fn stage_file(&self, file_path: &str) -> GitResult<()> {
        validate_file_path(file_path)?;
        self.run(&["add", "--", file_path])?;
        Ok(())
    }

    /// Remove a single file from the index, path fenced behind `--`.
    pub fn unstage_file(&self, file_path: &str) -> GitResult<()> {
        validate_file_path(file_path)?;
        self.run(&["restore", "--staged", "--", file_path])?;
        Ok(())
    }

    /// Stage all changes, including deletions and untracked files.
    pub fn stage_all(&self) -> GitResult<()> {
        self.run(&["add", "-A"])?;
        Ok(())
    }

    /// Diff of staged changes, capped at the configured byte budget so a
    /// huge diff cannot be shipped wholesale to the LLM.
    pub fn staged_diff(&self) -> GitResult<String> {
        let mut diff = self.run(&["diff", "--cached"])?;
        if diff.len() > self.max_diff_bytes {
            let mut cut = self.max_diff_bytes;
            while !diff.is_char_boundary(cut) {
                cut -= 1;
            }
            diff.truncate(cut);
            diff.push_str(DIFF_TRUNCATED_MARKER);
        }
        Ok(diff)
    }

    /// Create a commit and return its abbreviated hash.
    ///
    /// The message is sanitized first; AI-generated text gets no special
    /// trust. It reaches git as a single argv entry via `-m`, so no shell
    /// expansion can occur.
    pub fn commit(&self, message: &str) -> GitResult<String> {
        let clean = sanitize_commit_message(message)?;
        self.run(&["commit", "-m", &clean])?;

        let sha = self.run(&["rev-parse", "--short", "HEAD"])?;
        Ok(sha.trim().to_string())
    }

    /// Commit log, newest first. `limit` is clamped to 1..=200; `branch` is
    /// validated before it becomes an argument.
    pub fn log(&self, limit: usize, branch: Option<&str>) -> GitResult<Vec<CommitRecord>> {
        let limit = limit.clamp(1, MAX_LOG_LIMIT);

        let format = log_format(&["%H", "%h", "%an", "%ae", "%ci", "%s"]);
        let count = format!("-{limit}");
        let mut args = vec!["log", format.as_str(), count.as_str()];

        if let Some(branch) = branch {
            validate_ref_name(branch)?;
            args.push(branch);
        }

        let raw = self.run(&args)?;
        Ok(parser::parse_log(&raw))
    }

    /// All local branches with their tip commit info.
    pub fn branches(&self) -> GitResult<Vec<BranchRecord>> {
        let fields = ["%(refname:short)", "%(HEAD)", "%(objectname:short)", "%(subject)"]
            .join(&FIELD_SEP.to_string());
        let format = format!("--format={fields}");

        let raw = self.run(&["for-each-ref", format.as_str(), "refs/heads/"])?;
        Ok(parser::parse_branches(&raw))
    }

    /// Create a new branch, optionally checking it out.
    pub fn create_branch(&self, name: &str, checkout: bool) -> GitResult<()> {
        validate_ref_name(name)?;
        if checkout {
            self.run(&["checkout", "-b", name])?;
        } else {
            self.run(&["branch", name])?;
        }
        Ok(())
    }

    /// Switch to an existing branch.
    pub fn checkout_branch(&self, name: &str) -> GitResult<()> {
        validate_ref_name(name)?;
        self.run(&["checkout", name])?;
        Ok(())
    }

    /// Delete a local branch (`-D` when forced).
    pub fn delete_branch(&self, name: &str, force: bool) -> GitResult<()> {
        validate_ref_name(name)?;
        let flag = if force { "-D" } else { "-d" };
        self.run(&["branch", flag, name])?;
        Ok(())
    }

    /// Merge `source` into the current branch. Returns git's output so the
    /// caller can surface conflict details.
    pub fn merge_branch(&self, source: &str) -> GitResult<String> {
        validate_ref_name(source)?;
        self.run(&["merge", "--no-ff", source])
    }

    /// Simplified commit graph across all refs, for UI rendering.
    pub fn graph(&self) -> GitResult<Vec<GraphEntry>> {
        let format = log_format(&["%h", "%s", "%an", "%ci", "%D"]);
        let count = format!("--max-count={GRAPH_LIMIT}");

        let raw = self.run(&["log", "--all", "--decorate=short", format.as_str(), count.as_str()])?;
        Ok(parser::parse_graph(&raw))
    }

    /// Configured remotes with fetch/push URLs.
    pub fn remotes(&self) -> GitResult<Vec<Remote>> {
        let raw = self.run(&["remote", "-v"])?;
        Ok(parser::parse_remotes(&raw))
    }

    /// Fetch from a remote, pruning deleted refs.
    pub fn fetch(&self, remote: &str) -> GitResult<String> {
        validate_remote_name(remote)?;
        self.run(&["fetch", "--prune", remote])
    }

    /// Pull from a remote, optionally naming the branch.
    pub fn pull(&self, remote: &str, branch: Option<&str>) -> GitResult<String> {
        validate_remote_name(remote)?;
        let mut args = vec!["pull", remote];
        if let Some(branch) = branch {
            validate_ref_name(branch)?;
            args.push(branch);
        }
        self.run(&args)
    }

    /// Push to a remote, optionally naming the branch.
    pub fn push(&self, remote: &str, branch: Option<&str>) -> GitResult<String> {
        validate_remote_name(remote)?;
        let mut args = vec!["push", remote];
        if let Some(branch) = branch {
            validate_ref_name(branch)?;
            args.push(branch);
        }
        self.run(&args)
    }

    /// Absolute toplevel directory of the repository.
    pub fn root(&self) -> GitResult<PathBuf> {
        let raw = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(raw.trim()))
    }
}

fn log_format(fields: &[&str]) -> String {
    format!("--format={}", fields.join(&FIELD_SEP.to_string()))
}
