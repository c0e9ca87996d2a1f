use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Resolve a path against the working directory and check it is a file.
pub fn resolve_path(path: impl AsRef<Path>) -> Result<PathBuf, String> {
    let p = path.as_ref();
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("Cannot read working directory: {}", e))?
            .join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()));
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()));
    }

    Ok(canonical)
}
