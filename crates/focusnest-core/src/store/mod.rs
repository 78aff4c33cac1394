mod client;
mod migrations;
mod models;

pub use client::{StoreClient, TaskUpdate};
pub use models::{Achievement, FocusSession, Priority, Profile, Task, TaskColor};

use std::path::PathBuf;

/// Returns `~/.config/focusnest[-dev]/` based on FOCUSNEST_ENV.
///
/// Set FOCUSNEST_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSNEST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusnest-dev")
    } else {
        base_dir.join("focusnest")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
