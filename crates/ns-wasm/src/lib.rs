//! WebAssembly content-script runtime for noshorts
//!
//! Wires the core engine to the live page: compiles the rule set against
//! the real query engine, runs the redirect check and the initial sweep,
//! observes mutations with a bounded attribute filter, and re-sweeps on
//! the host's SPA navigation events. The JS glue calls [`boot`] exactly
//! once at content-script load.

mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    MutationObserver, MutationObserverInit, MutationRecord, Window,
};

use ns_compiler::{dedup_rules, lint_selector, parse_rule_manifest};
use ns_core::{
    redirect_target, BatchDisposition, ChangeKind, Matcher, RuleSet, SweepCoordinator, SweepRoot,
    Sweeper, WATCHED_ATTRIBUTES,
};

use dom::WebDom;

/// Host SPA lifecycle events.
const NAVIGATE_START: &str = "yt-navigate-start";
const NAVIGATE_FINISH: &str = "yt-navigate-finish";

struct Runtime {
    dom: WebDom,
    matcher: Matcher,
    coordinator: RefCell<SweepCoordinator>,
}

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = RefCell::new(None);
}

impl Runtime {
    fn sweep_document(&self) -> usize {
        Sweeper::new(&self.dom, &self.matcher).sweep(&SweepRoot::Document)
    }

    fn redirect_if_deep_link(&self, window: &Window) {
        let location = window.location();
        let (path, search) = match (location.pathname(), location.search()) {
            (Ok(path), Ok(search)) => (path, search),
            _ => return,
        };
        if let Some(target) = redirect_target(&path, &search) {
            // replace(): the deep link must not stay in back-history.
            let _ = location.replace(&target);
        }
    }
}

/// Start the runtime. `manifest` overrides the built-in rule snapshot;
/// pass `None` (or `undefined` from JS) for the zero-config default.
#[wasm_bindgen]
pub fn boot(manifest: Option<String>) -> Result<(), JsValue> {
    if RUNTIME.with(|r| r.borrow().is_some()) {
        return Err(JsValue::from_str("Already booted. Reload the page to reboot."));
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let rules = match manifest {
        Some(text) => {
            let parsed = parse_rule_manifest(&text)
                .map_err(|e| JsValue::from_str(&format!("bad manifest: {e}")))?;
            let mut raw = parsed.rules;
            dedup_rules(&mut raw);
            RuleSet::new(parsed.version, raw)
        }
        None => RuleSet::builtin(),
    };

    let dom = WebDom::new(document.clone());
    let matcher = Matcher::compile(&rules, &dom);
    let runtime = Rc::new(Runtime {
        dom,
        matcher,
        coordinator: RefCell::new(SweepCoordinator::new()),
    });
    RUNTIME.with(|r| *r.borrow_mut() = Some(runtime.clone()));

    // Redirect check first: a deep link should never render at all.
    runtime.redirect_if_deep_link(&window);

    // Immediate sweep, plus a deferred one while the document is still
    // streaming in.
    runtime.sweep_document();
    if document.ready_state() == "loading" {
        let rt = runtime.clone();
        let on_ready = Closure::wrap(Box::new(move || {
            rt.sweep_document();
        }) as Box<dyn FnMut()>);
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
        on_ready.forget();
    }

    start_observer(&window, &runtime)?;

    // SPA lifecycle: sweep as the old view unloads, redirect + sweep once
    // the new one is in place.
    {
        let rt = runtime.clone();
        let on_start = Closure::wrap(Box::new(move || {
            rt.sweep_document();
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback(NAVIGATE_START, on_start.as_ref().unchecked_ref())?;
        on_start.forget();
    }
    {
        let rt = runtime.clone();
        let win = window.clone();
        let on_finish = Closure::wrap(Box::new(move || {
            rt.redirect_if_deep_link(&win);
            rt.sweep_document();
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback(NAVIGATE_FINISH, on_finish.as_ref().unchecked_ref())?;
        on_finish.forget();
    }

    Ok(())
}

fn start_observer(window: &Window, runtime: &Rc<Runtime>) -> Result<(), JsValue> {
    let rt = runtime.clone();
    let on_mutations = Closure::wrap(Box::new(
        move |records: js_sys::Array, _observer: MutationObserver| {
            let batch = summarize_batch(&records);
            let disposition = rt.coordinator.borrow_mut().on_batch(batch);
            if let BatchDisposition::Schedule { delay_ms } = disposition {
                schedule_sweep(&rt, delay_ms);
            }
        },
    ) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(on_mutations.as_ref().unchecked_ref())?;
    on_mutations.forget();

    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    options.set_attributes(true);
    // Bounded allow-list; MARK_ATTR is deliberately absent so our own
    // writes never come back as records.
    let filter = js_sys::Array::new();
    for name in WATCHED_ATTRIBUTES {
        filter.push(&JsValue::from_str(name));
    }
    options.set_attribute_filter(&filter);

    observe_when_body_exists(window.clone(), observer, options);
    Ok(())
}

/// Boundary translation: one [`ChangeKind`] per observer record.
fn summarize_batch(records: &js_sys::Array) -> Vec<ChangeKind> {
    let mut batch = Vec::with_capacity(records.length() as usize);

    for record in records.iter() {
        let record: MutationRecord = record.unchecked_into();
        let mut kind = ChangeKind::empty();

        match record.type_().as_str() {
            "attributes" => kind |= ChangeKind::ATTRIBUTE,
            "childList" => {
                let added = record.added_nodes();
                for i in 0..added.length() {
                    if let Some(node) = added.item(i) {
                        if node.node_type() == web_sys::Node::ELEMENT_NODE {
                            kind |= ChangeKind::ADDED_ELEMENT;
                            break;
                        }
                        kind |= ChangeKind::ADDED_TEXT;
                    }
                }
                if record.removed_nodes().length() > 0 {
                    kind |= ChangeKind::REMOVED;
                }
            }
            _ => {}
        }

        batch.push(kind);
    }

    batch
}

fn schedule_sweep(runtime: &Rc<Runtime>, delay_ms: u32) {
    let rt = runtime.clone();
    let on_timer = Closure::once_into_js(move || {
        // Clear the slot before sweeping so churn arriving mid-sweep can
        // schedule the next one.
        rt.coordinator.borrow_mut().timer_fired();
        rt.sweep_document();
    });

    let window = match web_sys::window() {
        Some(window) => window,
        None => return,
    };
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        on_timer.unchecked_ref(),
        delay_ms as i32,
    );
}

/// The observer can only attach once `document.body` exists, and content
/// scripts can run before it is created. Poll via rAF until it is.
fn observe_when_body_exists(
    window: Window,
    observer: MutationObserver,
    options: MutationObserverInit,
) {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let starter = callback.clone();
    let win = window.clone();

    *starter.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        match win.document().and_then(|d| d.body()) {
            Some(body) => {
                let _ = observer.observe_with_options(&body, &options);
            }
            None => {
                if let Some(cb) = callback.borrow().as_ref() {
                    let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
                }
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = starter.borrow().as_ref() {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    };
}

// =============================================================================
// Introspection / helpers for the JS glue
// =============================================================================

#[wasm_bindgen]
pub fn is_booted() -> bool {
    RUNTIME.with(|r| r.borrow().is_some())
}

/// Combined selector in use; `None` before boot.
#[wasm_bindgen]
pub fn combined_selector() -> Option<String> {
    RUNTIME.with(|r| {
        r.borrow()
            .as_ref()
            .map(|rt| rt.matcher.selector().to_string())
    })
}

/// Pure redirect computation, exposed for the glue and its tests.
#[wasm_bindgen]
pub fn redirect_target_js(path: &str, search: &str) -> Option<String> {
    redirect_target(path, search)
}

/// Run a full sweep immediately; returns the number of newly marked
/// elements. No-op (0) before boot.
#[wasm_bindgen]
pub fn sweep_now() -> u32 {
    RUNTIME.with(|r| {
        r.borrow()
            .as_ref()
            .map(|rt| rt.sweep_document() as u32)
            .unwrap_or(0)
    })
}

/// Parse and dedup a manifest, reporting its stats without booting.
#[wasm_bindgen]
pub fn manifest_stats(text: &str) -> Result<JsValue, JsValue> {
    let parsed = parse_rule_manifest(text)
        .map_err(|e| JsValue::from_str(&format!("bad manifest: {e}")))?;
    let mut rules = parsed.rules;
    let stats = dedup_rules(&mut rules);
    let lint_issues: usize = rules.iter().map(|r| lint_selector(r).len()).sum();

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"version".into(), &JsValue::from(parsed.version));
    let _ = js_sys::Reflect::set(&result, &"rulesBefore".into(), &JsValue::from(stats.before as u32));
    let _ = js_sys::Reflect::set(&result, &"rulesAfter".into(), &JsValue::from(stats.after as u32));
    let _ = js_sys::Reflect::set(&result, &"rulesDeduped".into(), &JsValue::from(stats.deduped as u32));
    let _ = js_sys::Reflect::set(&result, &"lintIssues".into(), &JsValue::from(lint_issues as u32));
    Ok(result.into())
}
