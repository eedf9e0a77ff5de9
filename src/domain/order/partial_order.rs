use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::OrderLine;

// ============================================================================
// Partial Order - the per-session accumulation state machine
// ============================================================================
//
// An ordered multiset of (quantity, item name) lines. Merging appends, so
// items added across several conversational turns keep their order; removal
// matches names case-insensitively and takes out at most one line per
// requested name.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PartialOrder {
    lines: Vec<OrderLine>,
}

impl PartialOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<OrderLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<OrderLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Merge-not-replace: appends the new lines after the existing ones.
    pub fn merge(&mut self, lines: Vec<OrderLine>) {
        self.lines.extend(lines);
    }

    /// Puts lines back in front of anything accumulated since they were
    /// drained. Used when a finalization attempt fails and the drained
    /// order is restored.
    pub fn prepend(&mut self, mut lines: Vec<OrderLine>) {
        lines.extend(self.lines.drain(..));
        self.lines = lines;
    }

    /// Removes at most one line per requested name, matching item names
    /// case-insensitively. First match wins.
    ///
    /// Returns the canonical names of the removed lines and the requested
    /// names that matched nothing; a miss never mutates the order.
    pub fn remove_by_names(&mut self, names: &[String]) -> (Vec<String>, Vec<String>) {
        let mut removed = Vec::new();
        let mut not_found = Vec::new();

        for name in names {
            let requested = name.to_lowercase();
            match self
                .lines
                .iter()
                .position(|line| line.name.to_lowercase() == requested)
            {
                Some(index) => removed.push(self.lines.remove(index).name),
                None => not_found.push(name.clone()),
            }
        }

        (removed, not_found)
    }
}

impl fmt::Display for PartialOrder {
    /// Human-readable "2 Pizza, 1 Coke" rendering for fulfillment messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in &self.lines {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{line}")?;
            first = false;
        }
        Ok(())
    }
}

/// Outcome of a removal request against a session's partial order.
#[derive(Debug, Clone)]
pub struct RemovalReport {
    pub removed: Vec<String>,
    pub not_found: Vec<String>,
    pub remaining: PartialOrder,
}

// ============================================================================
// Unit Tests
// ============================================================================
