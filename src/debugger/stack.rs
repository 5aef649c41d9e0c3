use serde::{Deserialize, Serialize};

use crate::events::{KeywordAttrs, KeywordKind};

/// One in-progress keyword invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordFrame {
    pub name: String,
    pub kwname: String,
    pub libname: String,
    pub source: String,
    pub lineno: u32,
    pub args: Vec<String>,
    pub depth: usize,
    #[serde(rename = "type")]
    pub kind: KeywordKind,
}

impl KeywordFrame {
    pub fn from_start(name: &str, attrs: &KeywordAttrs) -> Self {
        Self {
            name: name.to_string(),
            kwname: attrs.display_name(name).to_string(),
            libname: attrs.libname.clone(),
            source: attrs.source.clone(),
            lineno: attrs.lineno,
            args: attrs.args.clone(),
            depth: 0, // assigned on push
            kind: attrs.kind,
        }
    }
}

/// Live nesting of keyword frames, outermost first.
///
/// Depth is the frame count; push/pop must stay balanced with the engine's
/// start/end notifications, so pop is unconditional on keyword-end.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<KeywordFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame, assigning its depth. Returns the new depth.
    pub fn push(&mut self, mut frame: KeywordFrame) -> usize {
        let depth = self.frames.len() + 1;
        frame.depth = depth;
        self.frames.push(frame);
        depth
    }

    pub fn pop(&mut self) -> Option<KeywordFrame> {
        self.frames.pop()
    }

    /// Clear at test start so a prior test's frames cannot leak across.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// A copy of the live frames, safe to hold across a pause.
    pub fn snapshot(&self) -> Vec<KeywordFrame> {
        self.frames.clone()
    }
}
