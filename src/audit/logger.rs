use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only log of executed command summaries and rejected auto-fix
/// candidates.
///
/// Entries carry the redacted argument summary, never full commit-message
/// bodies, environment variables, or credential material.
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        Self::with_path(Self::default_log_path()?)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Default log path: ~/.config/gitmedic/commands.log
    fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            )
        })?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gitmedic")
            .join("commands.log"))
    }

    /// Record one git invocation: redacted argument summary plus exit code.
    pub fn log_command(
        &self,
        summary: &str,
        repo_path: &Path,
        exit_code: i32,
    ) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let entry = format!(
            "[{}] [{}] [exit:{}] git {}\n",
            Utc::now().to_rfc3339(),
            repo_path.display(),
            exit_code,
            summary
        );

        self.append(&entry)
    }

    /// Record an auto-fix candidate the whitelist refused.
    ///
    /// Kept for forensics: a pattern of rejections points at LLM
    /// misbehavior or prompt manipulation.
    pub fn log_rejected_candidate(&self, candidate: &str, reason: &str) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let entry = format!(
            "[{}] [AUTOFIX-REJECTED] candidate={:?} reason={:?}\n",
            Utc::now().to_rfc3339(),
            candidate,
            reason
        );

        self.append(&entry)
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // commands.log -> commands.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_logger() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        assert_eq!(logger.log_path(), log_path);
    }

    #[test]
    fn test_log_command() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        logger
            .log_command("commit -m", Path::new("/test/repo"), 0)
            .unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("git commit -m"));
        assert!(content.contains("/test/repo"));
        assert!(content.contains("exit:0"));
    }

    #[test]
    fn test_multiple_entries_append() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo = Path::new("/test/repo");

        logger.log_command("status --porcelain=v1", repo, 0).unwrap();
        logger.log_command("fetch --prune", repo, 0).unwrap();
        logger.log_command("checkout no-such-branch", repo, 1).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("exit:1"));
    }

    #[test]
    fn test_log_rejected_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        logger
            .log_rejected_candidate("rm -rf /", "not on the remediation allowlist")
            .unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("AUTOFIX-REJECTED"));
        assert!(content.contains("rm -rf /"));
        assert!(content.contains("allowlist"));
    }

    #[test]
    fn test_log_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let logger = AuditLogger::with_path(&log_path).unwrap();
        let repo = Path::new("/test/repo");

        let huge = "x".repeat(MAX_LOG_SIZE as usize + 1);
        logger.log_command(&huge, repo, 0).unwrap();
        logger.log_command("status", repo, 0).unwrap();

        let backup_path = log_path.with_extension("log.1");
        assert!(backup_path.exists());
        assert!(log_path.exists());
        assert!(fs::metadata(&log_path).unwrap().len() < MAX_LOG_SIZE);
    }
}
