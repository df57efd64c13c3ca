//! Pure parsers for git's machine-readable text formats.
//!
//! List-oriented parsers skip malformed lines instead of failing the whole
//! parse: partial results are preferred over total failure for
//! display-oriented data. That leniency is deliberate, not error hiding.

/// Field separator for log/branch/graph format strings. The ASCII unit
/// separator is vanishingly unlikely to appear in commit subjects or author
/// names.
pub const FIELD_SEP: char = '\u{001F}';

/// Branch name used when the porcelain header is absent or malformed.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// One path from a status snapshot. `index_status`/`work_status` are the two
/// porcelain state codes (X and Y in `XY path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub index_status: char,
    pub work_status: char,
}

impl FileStatus {
    pub fn is_staged(&self) -> bool {
        !matches!(self.index_status, '?' | ' ' | '!')
    }

    pub fn is_unstaged(&self) -> bool {
        !matches!(self.work_status, ' ' | '!')
    }
}

/// Structured working-tree status.
///
/// `staged` and `unstaged` are independent projections, not a partition: a
/// file with both codes set (partially staged) appears once in each list.
/// UI consumers depend on that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    pub branch: String,
    pub ahead: u32,
    pub behind: u32,
    pub staged: Vec<FileStatus>,
    pub unstaged: Vec<FileStatus>,
    pub untracked: Vec<FileStatus>,
}

/// One commit from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub short_sha: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub subject: String,
}

/// One local branch with its tip commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
    pub last_commit_sha: String,
    pub last_commit_subject: String,
}

/// One node of the simplified commit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEntry {
    pub sha: String,
    pub subject: String,
    pub author: String,
    pub date: String,
    pub refs: Vec<String>,
}

/// A configured remote. Fetch and push URLs are tracked separately since
/// they may differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
    pub push_url: String,
}

/// Parse `git status --porcelain=v1 --branch` output.
///
/// A missing or malformed `## ` header degrades to branch `"unknown"` with
/// zero ahead/behind counts; parsing continues with the file lines.
pub fn parse_status(output: &str) -> RepoStatus {
    let mut lines = output.lines().peekable();

    let mut branch = UNKNOWN_BRANCH.to_string();
    let mut ahead = 0;
    let mut behind = 0;

    if let Some(first) = lines.peek() {
        if let Some(header) = first.strip_prefix("## ") {
            // Format: "main...origin/main [ahead N, behind M]"
            let name = header.split("...").next().unwrap_or(header);
            // A header with no branch text stays at the sentinel.
            if !name.is_empty() {
                branch = name.to_string();
            }
            (ahead, behind) = parse_ahead_behind(header);
            lines.next();
        }
    }

    let mut staged = Vec::new();
    let mut unstaged = Vec::new();
    let mut untracked = Vec::new();

    for line in lines {
        let Some(file) = parse_status_line(line) else {
            continue;
        };

        if file.is_staged() {
            staged.push(file.clone());
        }
        if file.is_unstaged() && file.index_status != '?' {
            unstaged.push(file.clone());
        }
        if file.index_status == '?' && file.work_status == '?' {
            untracked.push(file);
        }
    }

    RepoStatus {
        branch,
        ahead,
        behind,
        staged,
        unstaged,
        untracked,
    }
}

fn parse_ahead_behind(header: &str) -> (u32, u32) {
    let Some(open) = header.find('[') else {
        return (0, 0);
    };
    let Some(close) = header[open..].find(']') else {
        return (0, 0);
    };

    let mut ahead = 0;
    let mut behind = 0;
    for segment in header[open + 1..open + close].split(',') {
        let segment = segment.trim();
        let count = segment
            .split_whitespace()
            .next_back()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        if segment.starts_with("ahead") {
            ahead = count;
        } else if segment.starts_with("behind") {
            behind = count;
        }
    }
    (ahead, behind)
}

fn parse_status_line(line: &str) -> Option<FileStatus> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 || !line.is_char_boundary(3) {
        return None;
    }

    // First two characters are the index and work-tree codes; the path
    // starts at offset 3. Rename notation is "old -> new": the path is the
    // text after the arrow.
    let path_part = &line[3..];
    let path = path_part.rsplit(" -> ").next().unwrap_or(path_part);

    Some(FileStatus {
        path: path.to_string(),
        index_status: bytes[0] as char,
        work_status: bytes[1] as char,
    })
}

/// Parse log output formatted as six unit-separated fields per line:
/// `%H %h %an %ae %ci %s`.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_SEP).collect();
            if parts.len() != 6 {
                return None;
            }
            Some(CommitRecord {
                sha: parts[0].to_string(),
                short_sha: parts[1].to_string(),
                author: parts[2].to_string(),
                email: parts[3].to_string(),
                date: parts[4].to_string(),
                subject: parts[5].to_string(),
            })
        })
        .collect()
}

/// Parse `for-each-ref` output formatted as four unit-separated fields:
/// `%(refname:short) %(HEAD) %(objectname:short) %(subject)`.
pub fn parse_branches(output: &str) -> Vec<BranchRecord> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_SEP).collect();
            if parts.len() != 4 {
                return None;
            }
            Some(BranchRecord {
                name: parts[0].to_string(),
                is_current: parts[1] == "*",
                is_remote: false,
                last_commit_sha: parts[2].to_string(),
                last_commit_subject: parts[3].to_string(),
            })
        })
        .collect()
}

/// Parse decorated log output formatted as five unit-separated fields:
/// `%h %s %an %ci %D`.
pub fn parse_graph(output: &str) -> Vec<GraphEntry> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(FIELD_SEP).collect();
            if parts.len() != 5 {
                return None;
            }
            let refs = parts[4]
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
            Some(GraphEntry {
                sha: parts[0].to_string(),
                subject: parts[1].to_string(),
                author: parts[2].to_string(),
                date: parts[3].to_string(),
                refs,
            })
        })
        .collect()
}

/// Parse `git remote -v` output: `name url (direction)` triples, one record
/// per unique remote name.
pub fn parse_remotes(output: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }
        let (name, url) = (parts[0], parts[1]);
        let direction = parts[2].trim_matches(|c| c == '(' || c == ')');

        let remote = match remotes.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing,
            None => {
                remotes.push(Remote {
                    name: name.to_string(),
                    fetch_url: String::new(),
                    push_url: String::new(),
                });
                remotes.last_mut().unwrap()
            }
        };

        match direction {
            "fetch" => remote.fetch_url = url.to_string(),
            "push" => remote.push_url = url.to_string(),
            _ => {}
        }
    }

    remotes
}
