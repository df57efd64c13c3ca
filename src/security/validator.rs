use thiserror::Error;

/// Longest ref name we will pass to git as an argument.
pub const MAX_REF_LEN: usize = 250;

/// Longest commit message accepted after sanitizing.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Characters that are either meaningful to git's argument parser or
/// produce ambiguous/unsafe refs.
const FORBIDDEN_REF_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\', '\0'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ref name is empty")]
    EmptyRefName,

    #[error("ref name exceeds {MAX_REF_LEN} characters")]
    RefNameTooLong,

    #[error("ref name contains forbidden sequence: {0}")]
    UnsafeRefName(String),

    #[error("file path is empty")]
    EmptyPath,

    #[error("file path contains a NUL byte")]
    NulInPath,

    #[error("argument may not start with '-': {0}")]
    FlagInjection(String),

    #[error("remote name is invalid: {0:?}")]
    UnsafeRemoteName(String),

    #[error("commit message is empty")]
    EmptyMessage,

    #[error("commit message exceeds {MAX_MESSAGE_LEN} characters")]
    MessageTooLong,
}

/// Check that a branch/tag name is safe to pass to git as an argument.
///
/// Rejects names that would be parsed as flags, names containing shell- or
/// revision-syntax characters, and the `..` range notation.
pub fn validate_ref_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyRefName);
    }
    if name.len() > MAX_REF_LEN {
        return Err(ValidationError::RefNameTooLong);
    }
    if name.starts_with('-') {
        return Err(ValidationError::FlagInjection(name.to_string()));
    }
    if name.contains("..") {
        return Err(ValidationError::UnsafeRefName("..".to_string()));
    }
    for c in name.chars() {
        if c.is_whitespace() || FORBIDDEN_REF_CHARS.contains(&c) {
            return Err(ValidationError::UnsafeRefName(c.to_string()));
        }
    }
    Ok(())
}

/// Check that a file path is safe to pass to git after a `--` fence.
///
/// Traversal strings are rejected at the transport-schema layer before they
/// reach this crate; this check is a second line of defense only.
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if path.starts_with('-') {
        return Err(ValidationError::FlagInjection(path.to_string()));
    }
    if path.contains('\0') {
        return Err(ValidationError::NulInPath);
    }
    Ok(())
}

/// Check that a remote name is safe to pass to git as an argument.
pub fn validate_remote_name(name: &str) -> Result<(), ValidationError> {
    if name.starts_with('-') {
        return Err(ValidationError::FlagInjection(name.to_string()));
    }
    if name.is_empty() || name.contains(' ') {
        return Err(ValidationError::UnsafeRemoteName(name.to_string()));
    }
    Ok(())
}

/// Strip control characters from a commit message and bound its length.
///
/// Newlines and tabs survive; everything else in the control range is
/// dropped. Runs on AI-generated text too, which is fully untrusted.
/// Idempotent: sanitizing twice yields the same result as sanitizing once.
pub fn sanitize_commit_message(message: &str) -> Result<String, ValidationError> {
    let cleaned: String = message
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if cleaned.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::MessageTooLong);
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_ref_name_valid() {
        assert!(validate_ref_name("main").is_ok());
    }

    #[test]
    fn test_feature_branch_valid() {
        assert!(validate_ref_name("feature/my-feature").is_ok());
        assert!(validate_ref_name("release_2.0").is_ok());
    }

    #[test]
    fn test_empty_ref_invalid() {
        assert_eq!(validate_ref_name(""), Err(ValidationError::EmptyRefName));
    }

    #[test]
    fn test_ref_starting_with_dash_invalid() {
        assert!(matches!(
            validate_ref_name("-d"),
            Err(ValidationError::FlagInjection(_))
        ));
    }

    #[test]
    fn test_double_dot_invalid() {
        assert!(matches!(
            validate_ref_name("branch..name"),
            Err(ValidationError::UnsafeRefName(_))
        ));
    }

    #[test]
    fn test_whitespace_invalid() {
        assert!(validate_ref_name("branch name").is_err());
        assert!(validate_ref_name("branch\tname").is_err());
        assert!(validate_ref_name("branch\nname").is_err());
    }

    #[test]
    fn test_revision_syntax_chars_invalid() {
        for name in ["branch~1", "branch^2", "a:b", "what?", "glob*", "set[1]", "back\\slash"] {
            assert!(validate_ref_name(name).is_err(), "should reject {name:?}");
        }
    }

    #[test]
    fn test_nul_byte_invalid() {
        assert!(validate_ref_name("branch\0name").is_err());
    }

    #[test]
    fn test_very_long_ref_invalid() {
        assert!(validate_ref_name(&"a".repeat(250)).is_ok());
        assert_eq!(
            validate_ref_name(&"a".repeat(251)),
            Err(ValidationError::RefNameTooLong)
        );
    }

    #[test]
    fn test_file_path_rules() {
        assert!(validate_file_path("src/lib.rs").is_ok());
        assert_eq!(validate_file_path(""), Err(ValidationError::EmptyPath));
        assert!(matches!(
            validate_file_path("--force"),
            Err(ValidationError::FlagInjection(_))
        ));
        assert_eq!(
            validate_file_path("file\0name"),
            Err(ValidationError::NulInPath)
        );
    }

    #[test]
    fn test_remote_name_rules() {
        assert!(validate_remote_name("origin").is_ok());
        assert!(validate_remote_name("").is_err());
        assert!(validate_remote_name("bad remote").is_err());
        assert!(matches!(
            validate_remote_name("--mirror"),
            Err(ValidationError::FlagInjection(_))
        ));
    }

    #[test]
    fn test_sanitize_strips_null_bytes() {
        let result = sanitize_commit_message("fix: bug\0 fix").unwrap();
        assert!(!result.contains('\0'));
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        let result = sanitize_commit_message("fix\u{1}\u{2}: bug").unwrap();
        assert_eq!(result, "fix: bug");
    }

    #[test]
    fn test_sanitize_preserves_newlines_and_tabs() {
        let msg = "feat: add feature\n\n\tLonger description.";
        let result = sanitize_commit_message(msg).unwrap();
        assert!(result.contains('\n'));
        assert!(result.contains('\t'));
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(sanitize_commit_message("  fix: bug  ").unwrap(), "fix: bug");
    }

    #[test]
    fn test_sanitize_normal_message_unchanged() {
        let msg = "feat(api): add endpoint for status";
        assert_eq!(sanitize_commit_message(msg).unwrap(), msg);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_commit_message(" fix:\u{7f} bug \r\n").unwrap();
        let twice = sanitize_commit_message(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize_commit_message("   "), Err(ValidationError::EmptyMessage));
        assert_eq!(sanitize_commit_message("\u{1}\u{2}"), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn test_sanitize_rejects_oversized() {
        let msg = "m".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(sanitize_commit_message(&msg), Err(ValidationError::MessageTooLong));
    }
}
