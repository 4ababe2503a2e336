//! Preset serialization and file output

use super::parser::{BLOCK_SEPARATOR, COMMENT_MARKER};
use super::PresetData;
use crate::error::{Error, Result};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::{NamedTempFile, PersistError};
use tracing::{debug, error, info, warn};

/// Backoff policy for replacing a preset that another process holds open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceRetry {
    /// Number of replace attempts before falling back to a direct write
    pub attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for ReplaceRetry {
    fn default() -> Self {
        Self {
            attempts: 15,
            initial_delay: Duration::from_millis(30),
            max_delay: Duration::from_millis(200),
        }
    }
}

impl ReplaceRetry {
    /// Delay to wait after the given (zero-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// Render a preset document
///
/// With `include_header`, a stored header is written verbatim; an empty one
/// is synthesized from the name and active preset.
pub fn generate_preset_content(data: &PresetData, include_header: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    if include_header {
        if data.raw_header.is_empty() {
            lines.extend(synthesized_header(&data.name, data.active_preset.as_deref()));
            lines.push(String::new());
        } else {
            lines.extend(data.raw_header.lines().map(str::to_string));
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push(String::new());
            }
        }
    }

    let base: Vec<&str> = non_blank_lines(&data.base_args).collect();
    if !base.is_empty() {
        lines.extend(base.into_iter().map(str::to_string));
        lines.push(String::new());
    }

    let last = data.categories.len().saturating_sub(1);
    for (idx, block) in data.categories.iter().enumerate() {
        lines.extend(non_blank_lines(&block.args).map(str::to_string));
        if idx < last {
            lines.push(String::new());
            lines.push(BLOCK_SEPARATOR.to_string());
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// Header lines written for a preset with no stored header
pub(crate) fn synthesized_header(name: &str, active_preset: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("{COMMENT_MARKER} Preset: {name}")];
    if let Some(active) = active_preset {
        lines.push(format!("{COMMENT_MARKER} ActivePreset: {active}"));
    }
    lines
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Write a preset to disk, reporting success as a flag
///
/// Failures are logged; see [`save_preset_file`] for the fallible form.
pub fn generate_preset_file<P: AsRef<Path>>(data: &PresetData, path: P, atomic: bool) -> bool {
    let path = path.as_ref();
    match save_preset_file(data, path, atomic) {
        Ok(()) => true,
        Err(e) => {
            error!(path = %path.display(), "Failed to save preset: {e}");
            false
        }
    }
}

/// Write a preset to disk
///
/// In atomic mode the content goes to a sibling temporary file that then
/// replaces the target. A replace blocked by another process is retried with
/// backoff; once retries run out the content is written directly.
pub fn save_preset_file<P: AsRef<Path>>(data: &PresetData, path: P, atomic: bool) -> Result<()> {
    let path = path.as_ref();
    let content = generate_preset_content(data, true);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    if atomic {
        write_replacing(path, &content, ReplaceRetry::default(), persist_temp)?;
    } else {
        write_direct(path, &content)?;
    }
    info!(path = %path.display(), blocks = data.categories.len(), "Saved preset");
    Ok(())
}

/// Replace `path` through a temporary file, writing directly if that fails
fn write_replacing<F>(path: &Path, content: &str, retry: ReplaceRetry, persist: F) -> Result<()>
where
    F: FnMut(NamedTempFile, &Path) -> std::result::Result<(), PersistError>,
{
    if let Err(e) = replace_atomically(path, content, retry, persist) {
        warn!(path = %path.display(), "Atomic replace failed, writing directly: {e}");
        write_direct(path, content)?;
    }
    Ok(())
}

fn write_direct(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::PresetWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn persist_temp(tmp: NamedTempFile, path: &Path) -> std::result::Result<(), PersistError> {
    tmp.persist(path).map(drop)
}

fn replace_atomically<F>(path: &Path, content: &str, retry: ReplaceRetry, mut persist: F) -> io::Result<()>
where
    F: FnMut(NamedTempFile, &Path) -> std::result::Result<(), PersistError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    let mut attempt = 0;
    loop {
        match persist(tmp, path) {
            Ok(()) => return Ok(()),
            Err(e) if is_transient(&e.error) && attempt + 1 < retry.attempts => {
                let delay = retry.delay_for(attempt);
                debug!(
                    path = %path.display(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Preset is busy, retrying replace"
                );
                tmp = e.file;
                attempt += 1;
                thread::sleep(delay);
            }
            // Dropping the returned handle removes the temporary file
            Err(e) => return Err(e.error),
        }
    }
}

/// Errors another process holding the target open may cause
fn is_transient(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    // ERROR_ACCESS_DENIED, ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    #[cfg(windows)]
    let busy_codes: &[i32] = &[5, 32, 33];
    // EBUSY, ETXTBSY
    #[cfg(not(windows))]
    let busy_codes: &[i32] = &[16, 26];

    err.raw_os_error().is_some_and(|code| busy_codes.contains(&code))
}
