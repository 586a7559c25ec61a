//! `web-sys` backend for the core engine.

use ns_core::{DomBackend, SelectorProbe, SweepRoot};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

/// The live page, seen through the core's injected-DOM traits.
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SelectorProbe for WebDom {
    fn selector_supported(&self, selector: &str) -> bool {
        // Query an empty detached fragment: a syntax error throws, a
        // supported selector just finds nothing. The live tree is never
        // touched.
        self.document
            .create_document_fragment()
            .query_selector(selector)
            .is_ok()
    }
}

impl DomBackend for WebDom {
    type Element = Element;

    fn element_matches(&self, el: &Element, selector: &str) -> bool {
        el.matches(selector).unwrap_or(false)
    }

    fn select_descendants(&self, root: &SweepRoot<Element>, selector: &str) -> Vec<Element> {
        let list = match root {
            SweepRoot::Document => self.document.query_selector_all(selector),
            SweepRoot::Element(el) => el.query_selector_all(selector),
        };
        let list = match list {
            Ok(list) => list,
            Err(_) => return Vec::new(),
        };

        let mut out = Vec::with_capacity(list.length() as usize);
        for i in 0..list.length() {
            if let Some(node) = list.item(i) {
                if let Ok(el) = node.dyn_into::<Element>() {
                    out.push(el);
                }
            }
        }
        out
    }

    fn has_attribute(&self, el: &Element, name: &str) -> bool {
        el.has_attribute(name)
    }

    fn set_attribute(&self, el: &Element, name: &str, value: &str) {
        // Only fails on invalid attribute names; ours are constants.
        let _ = el.set_attribute(name, value);
    }
}
