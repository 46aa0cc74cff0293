//! Secure storage for the OpenRouter API key
//!
//! Tries the OS keyring first and falls back to a 0600 file under the
//! config directory. The `OPENROUTER_API_KEY` environment variable
//! overrides both. Absence of a key is a normal degraded mode, not an
//! error — enrichment simply returns placeholders.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const SERVICE_NAME: &str = "vocab-trainer";
const API_KEY_USERNAME: &str = "openrouter-api-key";
const API_KEY_FILE: &str = "api_key.txt";
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

fn api_key_file_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "vocab-trainer", "vocab-trainer")
        .context("Failed to get project directories")?;
    let dir = base.config_dir();
    fs::create_dir_all(dir).context("Failed to create config directory")?;
    Ok(dir.join(API_KEY_FILE))
}

/// Store the API key - keyring first, file fallback
pub fn set_api_key(key: &str) -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if entry.set_password(key).is_ok() {
            // Keep a file backup in case keyring retrieval fails later
            let _ = save_to_file(key);
            return Ok(());
        }
    }

    save_to_file(key)?;
    println!("Note: Using file-based storage (keyring unavailable)");
    Ok(())
}

fn save_to_file(key: &str) -> Result<()> {
    let path = api_key_file_path()?;
    fs::write(&path, key).context("Failed to write API key file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set file permissions")?;
    }

    Ok(())
}

/// Fetch the API key: environment override, then keyring, then file.
/// Returns `None` when no key is configured anywhere.
pub fn get_api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        if let Ok(key) = entry.get_password() {
            return Some(key);
        }
    }

    let path = api_key_file_path().ok()?;
    let key = fs::read_to_string(path).ok()?;
    let key = key.trim().to_string();
    (!key.is_empty()).then_some(key)
}

/// Remove the API key from both keyring and file
pub fn delete_api_key() -> Result<()> {
    if let Ok(entry) = keyring::Entry::new(SERVICE_NAME, API_KEY_USERNAME) {
        let _ = entry.delete_credential();
    }

    let path = api_key_file_path()?;
    if path.exists() {
        fs::remove_file(&path).context("Failed to delete API key file")?;
    }

    Ok(())
}

/// Whether any API key is configured
pub fn has_api_key() -> bool {
    get_api_key().is_some()
}
