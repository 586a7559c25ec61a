//! Injected host-page surface.
//!
//! The engine never talks to a concrete DOM. The wasm runtime implements
//! these traits over `web-sys`; tests implement them over plain data.

/// Syntax probing against the host's query engine.
pub trait SelectorProbe {
    /// Whether the engine accepts `selector` at all.
    ///
    /// Must be a pure syntax probe against a detached fragment; it must
    /// not read or mutate the live tree.
    fn selector_supported(&self, selector: &str) -> bool;
}

/// Everything the sweep path needs from the host DOM.
pub trait DomBackend: SelectorProbe {
    type Element: Clone;

    /// Does `el` itself satisfy `selector`?
    fn element_matches(&self, el: &Self::Element, selector: &str) -> bool;

    /// All descendants of `root` satisfying `selector`. The root element
    /// itself is checked separately by the sweep.
    fn select_descendants(&self, root: &SweepRoot<Self::Element>, selector: &str)
        -> Vec<Self::Element>;

    fn has_attribute(&self, el: &Self::Element, name: &str) -> bool;

    fn set_attribute(&self, el: &Self::Element, name: &str, value: &str);
}

/// Where a sweep starts.
#[derive(Debug, Clone)]
pub enum SweepRoot<E> {
    /// The whole live document.
    Document,
    /// A subtree rooted at one element, e.g. a freshly inserted node.
    Element(E),
}
