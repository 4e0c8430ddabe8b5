//! JSON I/O handling for CLI
//!
//! - Input: experiences file, a JSON array
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::experience::Experience;

/// Read the experiences file
pub fn read_experiences(path: &Path) -> CliResult<Vec<Experience>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::invalid_experiences(format!("{}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CliError::invalid_experiences(format!("{}: {}", path.display(), e))
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
