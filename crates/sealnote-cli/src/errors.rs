//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes. Core errors are classified
//! here so every command reports failures the same way.

use std::fmt;

use sealnote_core::SealnoteError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (store, note, credential, session)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase, rejected assertion)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// A note failed to decrypt
    Integrity(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                if hint.is_empty() {
                    write!(f, "{}", message)
                } else {
                    write!(f, "{}\n{}", message, hint)
                }
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::Integrity(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and optional hint.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Integrity(_) => exit_codes::INTEGRITY_FAILED,
        }
    }

    /// Classify a core error, or `None` if it has no dedicated exit code.
    pub fn from_core(err: &SealnoteError) -> Option<Self> {
        match err {
            SealnoteError::NotFound(what) => {
                Some(CliError::not_found(format!("Not found: {}", what), ""))
            }
            SealnoteError::Expired(what) => {
                Some(CliError::not_found(format!("Expired: {}", what), ""))
            }
            SealnoteError::Validation(msg) => Some(CliError::invalid_input(msg.clone())),
            SealnoteError::Authentication => Some(CliError::auth_failed("Incorrect passphrase.")),
            SealnoteError::Integrity => Some(CliError::Integrity(
                "Cannot decrypt note. The store may be damaged or belong to another key."
                    .to_string(),
            )),
            _ => None,
        }
    }
}

/// Exit code for any error that reaches `main`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    if let Some(core) = err.downcast_ref::<SealnoteError>() {
        if let Some(cli) = CliError::from_core(core) {
            return cli.exit_code();
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_for_core_errors() {
        let cases = [
            (SealnoteError::NotFound("note x".into()), 3),
            (SealnoteError::Validation("bad".into()), 4),
            (SealnoteError::Authentication, 5),
            (SealnoteError::Integrity, 6),
            (SealnoteError::Storage("disk".into()), 1),
        ];
        for (err, code) in cases {
            assert_eq!(exit_code_for(&anyhow::Error::new(err)), code);
        }
    }

    #[test]
    fn test_exit_code_for_cli_error() {
        let err = anyhow::Error::new(CliError::auth_failed("Assertion rejected"));
        assert_eq!(exit_code_for(&err), 5);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
