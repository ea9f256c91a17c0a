//! Files that hold secrets on this device.

use std::path::Path;

use sealnote_core::webauthn::{AuthenticatorState, SoftwareAuthenticator};

use crate::errors::CliError;

/// Load the software authenticator kept at `path`.
pub fn read_authenticator(path: &Path) -> anyhow::Result<SoftwareAuthenticator> {
    if !path.exists() {
        return Err(CliError::not_found(
            format!("No authenticator key at {}", path.display()),
            "Run:\n  sealnote authenticator init",
        )
        .into());
    }
    check_file_permissions(path)?;
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read authenticator {}: {}", path.display(), e))?;
    let state: AuthenticatorState = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse authenticator {}: {}", path.display(), e))?;
    Ok(SoftwareAuthenticator::restore(&state)?)
}

/// Persist the authenticator atomically with owner-only permissions.
pub fn write_authenticator(path: &Path, authenticator: &SoftwareAuthenticator) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let state = authenticator.state();
    let contents = zeroize::Zeroizing::new(serde_json::to_vec_pretty(&state)?);
    sealnote_core::fs::write_atomic(path, &contents)
        .map_err(|e| anyhow::anyhow!("Failed to write authenticator {}: {}", path.display(), e))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    Ok(())
}

/// Refuse key files that other users can read.
fn check_file_permissions(path: &Path) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path)?.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(anyhow::anyhow!(
                "Authenticator key {} is accessible by other users (mode {:o}); run chmod 600",
                path.display(),
                mode & 0o777
            ));
        }
    }
    Ok(())
}
