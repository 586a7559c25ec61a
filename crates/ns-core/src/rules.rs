//! Rule data for the suppression engine.
//!
//! Selectors are opaque strings here; whether the host's query engine
//! accepts a given one is decided at startup by probing (see `matcher`).
//! The snapshot below is the built-in rule set; deployments that ship a
//! rule manifest override it (see the `ns-compiler` crate).

// =============================================================================
// Marking / observer contract
// =============================================================================

/// Attribute written onto matched elements.
///
/// The external style layer hides any element bearing it; its presence is
/// also the guard that keeps re-sweeps from writing twice.
pub const MARK_ATTR: &str = "is-hidden-short";

/// Attributes whose changes can flip whether an element matches a rule:
/// link targets, labeling attributes, and the rule-relevant boolean flags.
/// The observer restricts attribute notifications to this list.
pub const WATCHED_ATTRIBUTES: &[&str] = &["href", "is-shorts", "tab-title", "title", "aria-label"];

// =============================================================================
// Built-in rule snapshot
// =============================================================================

/// Every DOM location where short-form content surfaces in the host page.
pub const BUILTIN_RULES: &[&str] = &[
    // Home feed shelves
    "ytd-rich-shelf-renderer[is-shorts]",
    "ytd-reel-shelf-renderer",
    "grid-shelf-view-model:has(a[href*=\"/shorts/\"])",
    "yt-horizontal-list-renderer:has(a[href*=\"/shorts/\"])",
    // Link-based items
    "ytd-rich-item-renderer:has(a[href*=\"/shorts/\"])",
    "ytd-grid-video-renderer:has(a[href*=\"/shorts/\"])",
    "ytd-video-renderer:has(a[href*=\"/shorts/\"])",
    "ytd-compact-video-renderer:has(a[href*=\"/shorts/\"])",
    "ytm-shorts-lockup-view-model-v2",
    "ytm-shorts-lockup-view-model",
    // Sidebar entries
    "ytd-guide-entry-renderer:has(a[href^=\"/shorts\"])",
    "ytd-guide-entry-renderer:has(path[d^=\"m13.467 1.19-8 4.7\"])",
    "ytd-mini-guide-entry-renderer:has(a[href^=\"/shorts\"])",
    // Channel tabs
    "tp-yt-paper-tab:has(a[href*=\"/shorts/\"])",
    "yt-tab-shape:has(a[href*=\"/shorts/\"])",
    // Channel sections
    "ytd-shelf-renderer:has(a[href*=\"/shorts/\"])",
    // Notifications
    "ytd-notification-renderer:has(a[href*=\"/shorts/\"])",
    // Player page containers
    "ytd-shorts",
    "#shorts-container",
];

/// Version tag of the built-in snapshot.
pub const BUILTIN_VERSION: u32 = 1;

// =============================================================================
// Rule set
// =============================================================================

/// An ordered, versioned set of raw selector rules.
///
/// Immutable once constructed; compiled into a [`crate::Matcher`] exactly
/// once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    version: u32,
    rules: Vec<String>,
}

impl RuleSet {
    /// Build a rule set from raw selector strings. Empty entries are
    /// dropped here so they never reach the combined selector.
    pub fn new(version: u32, rules: Vec<String>) -> Self {
        let rules = rules.into_iter().filter(|r| !r.trim().is_empty()).collect();
        Self { version, rules }
    }

    /// The built-in snapshot.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_VERSION,
            BUILTIN_RULES.iter().map(|r| r.to_string()).collect(),
        )
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.as_str())
    }
}
