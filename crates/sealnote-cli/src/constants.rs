//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (store, note, credential, session).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, rejected assertion).
    pub const AUTH_FAILED: i32 = 5;

    /// Note ciphertext failed authentication.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Registration challenges older than this are refused.
pub const REGISTRATION_CHALLENGE_TTL_SECONDS: i64 = 300;

/// Relay requests give up after this many seconds.
pub const RELAY_REQUEST_TIMEOUT_SECONDS: u64 = 10;
