use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a piped JSON request from stdin.
///
/// `None` when stdin is an interactive terminal or nothing was piped, so the
/// caller can fall back to command-line flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let request: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse request from stdin: {}", e))?;
    Ok(Some(request))
}
