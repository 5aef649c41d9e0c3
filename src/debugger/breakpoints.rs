use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::DebugError;

/// Normalize a source path so that controller- and engine-side spellings of
/// the same file compare equal regardless of separator style.
pub fn normalize_source(source: &str) -> String {
    let unified = source.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Breakpoint definitions read from the controller-owned JSON file.
///
/// The file maps source path -> array of line numbers. A load failure keeps
/// the previous in-memory set so a half-written file cannot wipe breakpoints
/// mid-session.
pub struct BreakpointStore {
    file: PathBuf,
    points: HashMap<String, HashSet<u32>>,
}

impl BreakpointStore {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            points: HashMap::new(),
        }
    }

    /// Replace the in-memory set from the definition file.
    ///
    /// A missing file is an empty definition (the controller cleared or never
    /// wrote it); malformed content is an error and leaves the set untouched.
    pub fn load(&mut self) -> Result<usize, DebugError> {
        if !self.file.exists() {
            self.points.clear();
            return Ok(0);
        }

        let raw = fs::read_to_string(&self.file).map_err(|e| DebugError::io(&self.file, e))?;
        let parsed: HashMap<String, Vec<u32>> =
            serde_json::from_str(&raw).map_err(|e| DebugError::json(&self.file, e))?;

        self.points = parsed
            .into_iter()
            .map(|(path, lines)| (normalize_source(&path), lines.into_iter().collect()))
            .collect();
        Ok(self.count())
    }

    /// `load()` with failures logged instead of returned; safe on a timer.
    pub fn reload(&mut self) {
        match self.load() {
            Ok(count) => debug!(count, "breakpoints reloaded"),
            Err(e) => warn!(error = %e, "failed to reload breakpoints, keeping previous set"),
        }
    }

    /// Exact (normalized path, line) match; no range or nearest-line matching.
    pub fn matches(&self, source: &str, line: u32) -> bool {
        self.points
            .get(&normalize_source(source))
            .is_some_and(|lines| lines.contains(&line))
    }

    pub fn count(&self) -> usize {
        self.points.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
