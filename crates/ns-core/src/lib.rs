//! noshorts Core Engine
//!
//! This crate provides the suppression engine for the noshorts content
//! filter: it decides which elements of the host page identify short-form
//! content and tags them for an external style layer to hide.
//!
//! # Architecture
//!
//! The host page surface is injected behind small traits (`SelectorProbe`,
//! `DomBackend`), so the whole engine runs and tests natively; the wasm
//! runtime crate supplies the real `web-sys` backend. The engine itself is
//! single-threaded and callback-driven, matching the host's event loop.
//!
//! # Modules
//!
//! - `rules`: rule data — selector snapshot, observer allow-list, marking attribute
//! - `dom`: injected host-page traits
//! - `matcher`: rule compilation with per-selector syntax probing
//! - `sweep`: idempotent marking and subtree sweeps
//! - `watch`: mutation-batch significance and the debounced sweep slot
//! - `url`: direct-navigation detection and redirect targets

pub mod dom;
pub mod matcher;
pub mod rules;
pub mod sweep;
pub mod url;
pub mod watch;

// Re-export commonly used types
pub use dom::{DomBackend, SelectorProbe, SweepRoot};
pub use matcher::Matcher;
pub use rules::{RuleSet, BUILTIN_RULES, MARK_ATTR, WATCHED_ATTRIBUTES};
pub use sweep::Sweeper;
pub use url::{redirect_target, shorts_video_id};
pub use watch::{batch_is_significant, BatchDisposition, ChangeKind, SweepCoordinator, DEBOUNCE_MS};
