use once_cell::sync::Lazy;
use regex::Regex;

/// Allow-list of remediation commands an LLM may propose for one-click
/// execution. Patterns are matched against the FULL candidate string, never
/// a substring, and every parameter slot is a single non-whitespace token.
///
/// Everything here is non-destructive: fetching, un-stashing, aborting an
/// in-progress operation, or undoing the last commit while keeping its
/// changes. Adding a pattern requires a security review. Wildcard program
/// names must never be introduced.
const SAFE_REMEDIATIONS: &[&str] = &[
    r"git fetch( \S+)?",
    r"git pull( --rebase)?( \S+ \S+)?",
    r"git stash( pop)?",
    r"git checkout -- \.",
    r"git merge --abort",
    r"git rebase --abort",
    r"git cherry-pick --abort",
    r"git reset HEAD~1",
    r"git restore --staged \.",
];

static COMPILED_REMEDIATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    SAFE_REMEDIATIONS
        .iter()
        .map(|p| Regex::new(&format!("^(?:{p})$")).expect("invalid allowlist pattern"))
        .collect()
});

/// Shell metacharacters that chain, redirect, or substitute commands.
/// Screened before pattern matching so a parameter slot can never smuggle
/// a second command.
const SHELL_METACHARACTERS: &[char] = &[';', '|', '&', '`', '$', '>', '<', '\n', '\r'];

/// Decide whether a single-line command extracted from AI output is safe to
/// present as a one-click remediation.
///
/// Pure and side-effect free. This is the last line of defense against an
/// LLM hallucinating or being manipulated into suggesting destructive or
/// unrelated shell commands; anything that does not match the allow-list
/// exactly is rejected.
pub fn is_safe_auto_fix(candidate: &str) -> bool {
    let candidate = candidate.trim();

    if candidate.is_empty() {
        return false;
    }
    if candidate.chars().any(|c| SHELL_METACHARACTERS.contains(&c)) {
        return false;
    }

    COMPILED_REMEDIATIONS.iter().any(|re| re.is_match(candidate))
}
