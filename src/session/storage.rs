//! File I/O for session persistence.
//!
//! Sessions are stored as `last_session.yaml` inside the profile directory.

use super::SessionState;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Path of the session state file inside a profile directory.
pub fn session_path(profile_dir: &Path) -> PathBuf {
    profile_dir.join("last_session.yaml")
}

/// Save session state into a profile directory.
pub fn save_session(state: &SessionState, profile_dir: &Path) -> Result<()> {
    save_session_to(state, session_path(profile_dir))
}

/// Save session state to a specific file.
pub fn save_session_to(state: &SessionState, path: PathBuf) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create profile directory {:?}", parent))?;
    }

    let contents = serde_yaml::to_string(state).context("Failed to serialize session state")?;

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write session state to {:?}", path))?;

    log::info!(
        "Saved session state ({} windows) to {:?}",
        state.windows.len(),
        path
    );
    Ok(())
}

/// Load session state from a profile directory.
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load_session(profile_dir: &Path) -> Result<Option<SessionState>> {
    load_session_from(session_path(profile_dir))
}

/// Load session state from a specific file.
pub fn load_session_from(path: PathBuf) -> Result<Option<SessionState>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read session state from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let state: SessionState = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse session state from {:?}", path))?;

    log::info!(
        "Loaded session state ({} windows) from {:?}",
        state.windows.len(),
        path
    );
    Ok(Some(state))
}

/// Remove the session state file (e.g. after a successful restore).
pub fn clear_session(profile_dir: &Path) -> Result<()> {
    let path = session_path(profile_dir);
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove session state file {:?}", path))?;
    }
    Ok(())
}
