//! Temporary files for loader tests.

use std::io::Write;

use map_common::Station;
use tempfile::NamedTempFile;

/// Writes `stations` as a JSON catalog into a temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_catalog_file(stations: &[Station]) -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    let json = serde_json::to_string_pretty(stations)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Writes arbitrary text into a temporary file with the given extension.
pub fn write_temp_file(contents: &str, suffix: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
