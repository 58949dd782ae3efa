//! Caller chains — explicit attribution tags for metered calls.
//!
//! A chain is an ordered list of logical call-site labels (`Type.method` or a
//! bare function name), innermost first, rendered as `a->b->c`. Callers build
//! it themselves; nothing here inspects the runtime stack.

use std::fmt;

/// Maximum number of frames kept in a chain.
pub const MAX_FRAMES: usize = 5;

/// Separator used when rendering a chain.
pub const SEPARATOR: &str = "->";

/// Frame labels containing any of these are plumbing, not call-site context.
const PLUMBING_MARKERS: &[&str] = &["RetryPolicy", "ChatClient"];

/// An attribution tag: up to [`MAX_FRAMES`] call-site labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CallerChain {
    frames: Vec<String>,
}

impl CallerChain {
    /// A chain with a single frame.
    pub fn new(frame: impl Into<String>) -> Self {
        let mut chain = CallerChain::default();
        chain.push(frame);
        chain
    }

    /// Append an outer frame. Plumbing frames, blank labels, and frames past
    /// [`MAX_FRAMES`] are dropped.
    pub fn push(&mut self, frame: impl Into<String>) {
        let frame = frame.into();
        let frame = frame.trim();
        if frame.is_empty() || self.frames.len() >= MAX_FRAMES || is_plumbing(frame) {
            return;
        }
        self.frames.push(frame.to_string());
    }

    /// Builder form of [`push`](Self::push).
    pub fn then(mut self, frame: impl Into<String>) -> Self {
        self.push(frame);
        self
    }

    /// Frame labels, innermost first.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Rendered label, e.g. `Node.execute->Graph.run`.
    pub fn label(&self) -> String {
        self.frames.join(SEPARATOR)
    }
}

fn is_plumbing(frame: &str) -> bool {
    PLUMBING_MARKERS.iter().any(|m| frame.contains(m))
}

impl fmt::Display for CallerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Parse a rendered label (`a->b`) or a single frame.
impl From<&str> for CallerChain {
    fn from(label: &str) -> Self {
        label
            .split(SEPARATOR)
            .fold(CallerChain::default(), |chain, frame| chain.then(frame))
    }
}

impl From<String> for CallerChain {
    fn from(label: String) -> Self {
        CallerChain::from(label.as_str())
    }
}
