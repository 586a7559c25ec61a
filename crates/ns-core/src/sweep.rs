//! Marking and sweeping.
//!
//! A sweep finds everything under a root that the matcher accepts and
//! tags it with [`MARK_ATTR`]. Sweeping the whole document and sweeping a
//! small inserted subtree are the same operation with different roots.

use log::debug;

use crate::dom::{DomBackend, SweepRoot};
use crate::matcher::Matcher;
use crate::rules::MARK_ATTR;

/// Applies the compiled matcher to the injected DOM.
pub struct Sweeper<'a, B: DomBackend> {
    dom: &'a B,
    matcher: &'a Matcher,
}

impl<'a, B: DomBackend> Sweeper<'a, B> {
    pub fn new(dom: &'a B, matcher: &'a Matcher) -> Self {
        Self { dom, matcher }
    }

    /// Tag one element. Returns whether the attribute was written.
    ///
    /// The presence check is load-bearing: attribute writes are mutation
    /// events themselves, and an unguarded write on every sweep would
    /// feed straight back into the observer.
    pub fn mark(&self, el: &B::Element) -> bool {
        if self.dom.has_attribute(el, MARK_ATTR) {
            return false;
        }
        self.dom.set_attribute(el, MARK_ATTR, "");
        true
    }

    /// Mark the root (when it is an element and matches) and every
    /// matching descendant. Returns the number of newly marked elements.
    ///
    /// No-op on an empty matcher.
    pub fn sweep(&self, root: &SweepRoot<B::Element>) -> usize {
        if self.matcher.is_empty() {
            return 0;
        }

        let selector = self.matcher.selector();
        let mut marked = 0usize;

        if let SweepRoot::Element(el) = root {
            if self.dom.element_matches(el, selector) && self.mark(el) {
                marked += 1;
            }
        }

        for el in self.dom.select_descendants(root, selector) {
            if self.mark(&el) {
                marked += 1;
            }
        }

        if marked > 0 {
            debug!("sweep marked {marked} element(s)");
        }
        marked
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::dom::SelectorProbe;
    use crate::rules::RuleSet;
    use crate::watch::{BatchDisposition, ChangeKind, SweepCoordinator};

    /// Flat fake document: element N matches the selectors listed for it,
    /// and "descendants of element N" are the elements after it.
    struct FakeDom {
        matching: RefCell<Vec<HashSet<&'static str>>>,
        attrs: RefCell<Vec<HashMap<String, String>>>,
        writes: Cell<usize>,
    }

    impl FakeDom {
        fn new(matching: Vec<&'static [&'static str]>) -> Self {
            let attrs = vec![HashMap::new(); matching.len()];
            Self {
                matching: RefCell::new(
                    matching
                        .into_iter()
                        .map(|sels| sels.iter().copied().collect())
                        .collect(),
                ),
                attrs: RefCell::new(attrs),
                writes: Cell::new(0),
            }
        }

        /// Host-side insertion of a new element.
        fn attach(&self, selectors: &'static [&'static str]) -> usize {
            self.matching
                .borrow_mut()
                .push(selectors.iter().copied().collect());
            self.attrs.borrow_mut().push(HashMap::new());
            self.matching.borrow().len() - 1
        }

        fn is_marked(&self, el: usize) -> bool {
            self.attrs.borrow()[el].contains_key(MARK_ATTR)
        }
    }

    impl SelectorProbe for FakeDom {
        fn selector_supported(&self, _selector: &str) -> bool {
            true
        }
    }

    impl DomBackend for FakeDom {
        type Element = usize;

        fn element_matches(&self, el: &usize, selector: &str) -> bool {
            let matching = self.matching.borrow();
            selector.split(',').any(|s| matching[*el].contains(s))
        }

        fn select_descendants(&self, root: &SweepRoot<usize>, selector: &str) -> Vec<usize> {
            let first = match root {
                SweepRoot::Document => 0,
                SweepRoot::Element(el) => *el + 1,
            };
            let len = self.matching.borrow().len();
            (first..len)
                .filter(|el| self.element_matches(el, selector))
                .collect()
        }

        fn has_attribute(&self, el: &usize, name: &str) -> bool {
            self.attrs.borrow()[*el].contains_key(name)
        }

        fn set_attribute(&self, el: &usize, name: &str, value: &str) {
            self.writes.set(self.writes.get() + 1);
            self.attrs.borrow_mut()[*el].insert(name.to_string(), value.to_string());
        }
    }

    fn rules(raw: &[&str]) -> RuleSet {
        RuleSet::new(1, raw.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn marks_every_matching_element_and_nothing_else() {
        let dom = FakeDom::new(vec![&["shelf"], &[], &["reel"], &[]]);
        let matcher = Matcher::compile(&rules(&["shelf", "reel"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);

        assert_eq!(sweeper.sweep(&SweepRoot::Document), 2);
        assert!(dom.is_marked(0));
        assert!(!dom.is_marked(1));
        assert!(dom.is_marked(2));
        assert!(!dom.is_marked(3));
    }

    #[test]
    fn repeated_sweeps_write_nothing_new() {
        let dom = FakeDom::new(vec![&["shelf"], &["shelf"]]);
        let matcher = Matcher::compile(&rules(&["shelf"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);

        assert_eq!(sweeper.sweep(&SweepRoot::Document), 2);
        let writes_after_first = dom.writes.get();

        assert_eq!(sweeper.sweep(&SweepRoot::Document), 0);
        assert_eq!(dom.writes.get(), writes_after_first);
    }

    #[test]
    fn marking_twice_is_a_single_write() {
        let dom = FakeDom::new(vec![&["shelf"]]);
        let matcher = Matcher::compile(&rules(&["shelf"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);

        assert!(sweeper.mark(&0));
        assert!(!sweeper.mark(&0));
        assert_eq!(dom.writes.get(), 1);
        assert!(dom.is_marked(0));
    }

    #[test]
    fn subtree_root_is_itself_checked() {
        // Element 1 is the inserted subtree root and matches directly.
        let dom = FakeDom::new(vec![&[], &["shelf"], &["reel"]]);
        let matcher = Matcher::compile(&rules(&["shelf", "reel"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);

        assert_eq!(sweeper.sweep(&SweepRoot::Element(1)), 2);
        assert!(!dom.is_marked(0));
        assert!(dom.is_marked(1));
        assert!(dom.is_marked(2));
    }

    #[test]
    fn incremental_sweep_after_full_sweep_adds_nothing() {
        let dom = FakeDom::new(vec![&["shelf"], &["shelf"]]);
        let matcher = Matcher::compile(&rules(&["shelf"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);

        sweeper.sweep(&SweepRoot::Document);
        assert_eq!(sweeper.sweep(&SweepRoot::Element(0)), 0);
    }

    #[test]
    fn element_attached_after_initial_sweep_is_marked_by_the_resweep() {
        let dom = FakeDom::new(vec![&[]]);
        let matcher = Matcher::compile(&rules(&["shelf"]), &dom);
        let sweeper = Sweeper::new(&dom, &matcher);
        let mut coordinator = SweepCoordinator::new();

        assert_eq!(sweeper.sweep(&SweepRoot::Document), 0);

        // The host attaches a matching subtree; the observer reports it.
        let new_el = dom.attach(&["shelf"]);
        assert!(matches!(
            coordinator.on_batch([ChangeKind::ADDED_ELEMENT]),
            BatchDisposition::Schedule { .. }
        ));

        // Debounce timer fires: full-document sweep.
        assert!(coordinator.timer_fired());
        assert_eq!(sweeper.sweep(&SweepRoot::Document), 1);
        assert!(dom.is_marked(new_el));
    }

    #[test]
    fn empty_matcher_never_touches_the_dom() {
        struct RejectAll;
        impl SelectorProbe for RejectAll {
            fn selector_supported(&self, _selector: &str) -> bool {
                false
            }
        }

        let dom = FakeDom::new(vec![&["shelf"]]);
        let matcher = Matcher::compile(&rules(&["shelf"]), &RejectAll);
        let sweeper = Sweeper::new(&dom, &matcher);

        assert_eq!(sweeper.sweep(&SweepRoot::Document), 0);
        assert_eq!(dom.writes.get(), 0);
        assert!(!dom.is_marked(0));
    }
}
