use crate::error::Result;
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// Write `data` as pretty-printed JSON, creating parent directories as needed.
///
/// Returns the confirmation line handed back to the agent.
pub async fn save_json(data: &Value, path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let body = serde_json::to_string_pretty(data)?;
    fs::write(path, body).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to save data");
    })?;

    tracing::info!(path = %path.display(), "Saved data");
    Ok(format!("Data saved to {}", path.display()))
}
