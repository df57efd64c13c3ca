use crate::config::GitConfig;
use crate::error::{GitError, GitResult};
use crate::git::resolver::RepoHandle;
use std::env;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Poll interval while waiting for the child to exit.
const WAIT_POLL: Duration = Duration::from_millis(25);

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Executes git commands against a resolved repository.
///
/// Arguments are passed to the child as a discrete vector; nothing is ever
/// concatenated into a shell string. The child runs with a minimal explicit
/// environment (PATH and HOME forwarded, credential prompts disabled) and a
/// hard wall-clock timeout: on expiry the process is killed and reaped, not
/// abandoned.
#[derive(Debug)]
pub struct GitExecutor {
    program: String,
    timeout: Duration,
}

impl GitExecutor {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            program: "git".to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Test-only constructor that swaps the program, so timeout and
    /// missing-executable handling can be exercised without git.
    #[cfg(test)]
    fn with_program(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }

    /// Run a git command in the repository and return its captured output.
    ///
    /// The first two child arguments are always `-C <repo>`, fixing the
    /// working directory; `args` is the operation-specific vector. Returns
    /// `Ok` only for exit code 0 — stderr is surfaced exclusively inside the
    /// failure record.
    pub fn run(&self, repo: &RepoHandle, args: &[&str]) -> GitResult<CommandResult> {
        let mut command = Command::new(&self.program);
        command
            .arg("-C")
            .arg(repo.path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_clear()
            .env("PATH", env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string()))
            .env("HOME", env::var("HOME").unwrap_or_else(|_| "/".to_string()))
            // Never fall into an interactive credential prompt; auth is the
            // host credential store's problem.
            .env("GIT_TERMINAL_PROMPT", "0");

        let started = Instant::now();
        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::CommandUnavailable
            } else {
                GitError::CommandFailed {
                    summary: summarize(args),
                    stderr: e.to_string(),
                }
            }
        })?;

        // Drain both pipes on their own threads so a chatty child can never
        // fill a pipe buffer and deadlock against the wait loop.
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = match self.wait_with_deadline(&mut child, started) {
            Ok(status) => status,
            Err(e) => {
                let _ = stdout_reader.join();
                let _ = stderr_reader.join();
                return Err(e);
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        let result = CommandResult {
            exit_code: status,
            stdout,
            stderr: stderr.clone(),
            duration: started.elapsed(),
        };

        if result.exit_code != 0 {
            return Err(GitError::CommandFailed {
                summary: summarize(args),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(result)
    }

    /// Poll the child until it exits or the deadline passes. On timeout the
    /// child is killed and reaped so no process is leaked.
    fn wait_with_deadline(&self, child: &mut Child, started: Instant) -> GitResult<i32> {
        loop {
            if let Some(status) = child.try_wait().map_err(|e| GitError::CommandFailed {
                summary: String::new(),
                stderr: e.to_string(),
            })? {
                return Ok(status.code().unwrap_or(-1));
            }

            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::CommandTimeout);
            }

            thread::sleep(WAIT_POLL);
        }
    }
}

/// Redacted summary of a command for errors and the audit log: at most the
/// first two arguments, so payloads such as full commit messages are never
/// echoed.
pub fn summarize(args: &[&str]) -> String {
    args.iter().take(2).copied().collect::<Vec<_>>().join(" ")
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}
