//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use dialoguer::Password;
use secrecy::SecretString;
use uuid::Uuid;

use crate::errors::CliError;

/// Read SEALNOTE_PASSPHRASE if it is set and non-blank.
pub fn passphrase_from_env() -> Option<SecretString> {
    secret_from_env("SEALNOTE_PASSPHRASE")
}

fn secret_from_env(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// Prompt for the current passphrase.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = passphrase_from_env() {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::invalid_input(
            "No passphrase provided and no TTY available. Set SEALNOTE_PASSPHRASE.",
        )
        .into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read it from `env_var`.
pub fn prompt_new_passphrase(env_var: &str, interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(value) = secret_from_env(env_var) {
        return Ok(value);
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_var
        ))
        .into());
    }
    Password::new()
        .with_prompt("New passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Parse a full note UUID.
pub fn parse_note_id(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| CliError::invalid_input(format!("Invalid note ID: {}", e)).into())
}

/// Format unix milliseconds as RFC 3339 (UTC).
pub fn format_timestamp(unix_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(unix_ms)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| unix_ms.to_string())
}

/// Read a file, or stdin when `path` is "-".
pub fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        return Ok(buffer);
    }
    std::fs::read_to_string(Path::new(path))
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))
}

/// Read note text from the --text flag or stdin.
///
/// Note text never touches the filesystem in plaintext, so there is no
/// $EDITOR round trip. On a terminal the text is typed and ended with EOF.
pub fn read_note_text(no_input: bool, text: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = text {
        if value.trim().is_empty() {
            return Err(CliError::invalid_input("--text cannot be empty").into());
        }
        return Ok(value);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        if no_input {
            return Err(CliError::invalid_input("--no-input requires --text or piped stdin").into());
        }
        eprintln!("Enter note text, then press Ctrl+D:");
    }

    let mut buffer = zeroize::Zeroizing::new(String::new());
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    let trimmed = buffer.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(CliError::invalid_input("Note text is empty").into());
    }
    Ok(trimmed)
}
