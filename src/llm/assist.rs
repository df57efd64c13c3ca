use crate::audit::AuditLogger;
use crate::llm::client::{LLMClient, LLMError};
use crate::security::is_safe_auto_fix;

/// Prefix the model is told to use when proposing a remediation command.
const AUTO_FIX_PREFIX: &str = "AUTO_FIX:";

/// Cap on error text shipped to the model.
const MAX_ERROR_CHARS: usize = 3000;

/// Cap on caller-supplied context shipped to the model.
const MAX_CONTEXT_CHARS: usize = 500;

const COMMIT_SYSTEM_PROMPT: &str = "\
You are an expert developer assistant.
Given a git diff, write a concise, professional commit message following Conventional Commits:
  <type>(<scope>): <short description>

  [optional body explaining why and what changed, not how]

Types: feat, fix, docs, style, refactor, perf, test, chore, ci, build.
Rules:
- Subject line: max 72 chars, imperative mood, no period.
- Body: wrap at 72 chars, explain motivation.
- Output ONLY the commit message, no explanation, no markdown fences.
";

const MEDIC_SYSTEM_PROMPT: &str = "\
You are a senior developer and Git expert.
Given a git error message and context, provide:
1. A plain-language explanation of what went wrong.
2. Step-by-step instructions to fix it (numbered list).
3. If a safe, non-destructive command can fix it automatically, output it on a line starting with: AUTO_FIX:

Keep your response concise and practical. Never suggest force-pushing to shared branches without a clear warning.
";

/// Result of diagnosing a git error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub explanation: String,
    pub steps: Vec<String>,
    /// Only ever populated with a command the whitelist accepted; never
    /// executed automatically, only offered.
    pub auto_fix: Option<String>,
}

/// The two AI-assisted features, built on any [`LLMClient`].
///
/// Model output is fully untrusted text: commit messages go through the
/// sanitizer downstream, and remediation commands go through the
/// command-safety whitelist here.
pub struct Assistant {
    client: Box<dyn LLMClient>,
    audit: Option<AuditLogger>,
}

impl Assistant {
    pub fn new(client: Box<dyn LLMClient>) -> Self {
        Self {
            client,
            audit: None,
        }
    }

    /// Attach an audit logger so whitelist rejections leave a trace.
    pub fn with_audit(client: Box<dyn LLMClient>, audit: AuditLogger) -> Self {
        Self {
            client,
            audit: Some(audit),
        }
    }

    /// Generate a commit message for a staged diff.
    pub async fn commit_message(&self, diff: &str) -> Result<String, LLMError> {
        if diff.trim().is_empty() {
            return Err(LLMError::EmptyDiff);
        }

        let prompt = format!("Git diff to summarize:\n\n```diff\n{diff}\n```");
        let raw = self.client.complete(COMMIT_SYSTEM_PROMPT, &prompt).await?;

        Ok(strip_code_fences(&raw))
    }

    /// Diagnose a git error: explanation, remediation steps, and an
    /// optional auto-fix command that survived the whitelist.
    pub async fn diagnose(
        &self,
        error_output: &str,
        context: Option<&str>,
    ) -> Result<Diagnosis, LLMError> {
        if error_output.trim().is_empty() {
            return Err(LLMError::EmptyErrorOutput);
        }

        let capped_error: String = error_output.chars().take(MAX_ERROR_CHARS).collect();
        let mut prompt = format!("Git error output:\n\n{capped_error}");
        if let Some(context) = context {
            let capped: String = context.chars().take(MAX_CONTEXT_CHARS).collect();
            prompt.push_str(&format!("\n\nAdditional context: {capped}"));
        }

        let raw = self.client.complete(MEDIC_SYSTEM_PROMPT, &prompt).await?;

        let (diagnosis, rejected) = parse_diagnosis(&raw);
        if let Some(audit) = &self.audit {
            for candidate in &rejected {
                let _ = audit.log_rejected_candidate(candidate, "not on the remediation allowlist");
            }
        }

        Ok(diagnosis)
    }
}

/// Split model output into a diagnosis plus any auto-fix candidates the
/// whitelist refused. Pure: auditing is the caller's business.
fn parse_diagnosis(raw: &str) -> (Diagnosis, Vec<String>) {
    let mut auto_fix = None;
    let mut rejected = Vec::new();
    let mut clean_lines = Vec::new();

    for line in raw.lines() {
        if let Some(candidate) = line.strip_prefix(AUTO_FIX_PREFIX) {
            let candidate = candidate.trim();
            if is_safe_auto_fix(candidate) {
                auto_fix = Some(candidate.to_string());
            } else {
                rejected.push(candidate.to_string());
            }
        } else {
            clean_lines.push(line);
        }
    }

    let text = clean_lines.join("\n").trim().to_string();
    let (explanation, steps_raw) = match text.split_once("\n\n") {
        Some((head, tail)) => (head.trim().to_string(), tail),
        None => (text.clone(), ""),
    };

    let steps = steps_raw.lines().filter_map(numbered_step).collect();

    (
        Diagnosis {
            explanation,
            steps,
            auto_fix,
        },
        rejected,
    )
}

/// Extract the body of a `N. do the thing` list item.
fn numbered_step(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    trimmed[digits..]
        .strip_prefix('.')
        .map(|rest| rest.trim().to_string())
}

/// Strip a surrounding markdown code fence from a model reply, keeping the
/// inner text intact. Multi-line bodies survive; commit messages often have
/// them.
fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the opening fence line, language tag included.
        text = rest.split_once('\n').map_or("", |(_, body)| body);
        if let Some(closing) = text.rfind("```") {
            text = &text[..closing];
        }
    }

    text.trim().to_string()
}
