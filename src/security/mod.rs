pub mod autofix;
pub mod validator;

pub use autofix::is_safe_auto_fix;
pub use validator::{
    ValidationError, sanitize_commit_message, validate_file_path, validate_ref_name,
    validate_remote_name,
};
