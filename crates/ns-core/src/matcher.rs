//! Rule compilation.
//!
//! Each raw selector is probed against the injected query engine; the
//! supported ones are OR-combined into a single selector so a sweep costs
//! one traversal instead of one per rule. Unsupported selectors are
//! dropped silently — the host's selector dialect shifts across versions
//! and a partially working rule set beats a crashed engine.

use log::debug;

use crate::dom::SelectorProbe;
use crate::rules::RuleSet;

/// The compiled matcher: one combined selector covering every supported
/// rule. An empty matcher turns every engine operation into a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    combined: String,
    supported: usize,
    dropped: usize,
}

impl Matcher {
    /// Compile `rules` against `probe`.
    ///
    /// Never fails: a rule the probe rejects is excluded, and a rule set
    /// with nothing supported compiles to the empty matcher.
    pub fn compile<P: SelectorProbe + ?Sized>(rules: &RuleSet, probe: &P) -> Self {
        let mut kept: Vec<&str> = Vec::with_capacity(rules.len());
        let mut dropped = 0usize;

        for rule in rules.iter() {
            if probe.selector_supported(rule) {
                kept.push(rule);
            } else {
                dropped += 1;
                debug!("dropping unsupported selector: {rule}");
            }
        }

        Self {
            combined: kept.join(","),
            supported: kept.len(),
            dropped,
        }
    }

    /// True when no rule survived probing. Sweeps check this first.
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    /// The combined selector, empty when nothing is supported.
    pub fn selector(&self) -> &str {
        &self.combined
    }

    pub fn supported_count(&self) -> usize {
        self.supported
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped
    }
}
