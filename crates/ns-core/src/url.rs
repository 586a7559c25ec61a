//! Direct-navigation handling for short-form content URLs.
//!
//! A deep link of the form `/shorts/<id>` is redirected to the canonical
//! watch page with the same query string and `v` set to the id. Query
//! editing follows `URLSearchParams.set` semantics so the target is
//! byte-identical to what the host's own navigation would produce.

/// Canonical full-page view for a video id.
pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Path prefix identifying direct short-form access.
const SHORTS_PREFIX: &str = "/shorts/";

/// Length of a video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Extract the video id from a direct short-form path.
///
/// Accepts exactly `/shorts/<id>`, optionally with a single trailing
/// slash, where `<id>` is [`VIDEO_ID_LEN`] chars from `[A-Za-z0-9_-]`.
/// Anything else is not a deep link and stays untouched.
pub fn shorts_video_id(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(SHORTS_PREFIX)?;
    let id = rest.strip_suffix('/').unwrap_or(rest);
    if id.len() == VIDEO_ID_LEN && id.bytes().all(is_id_byte) {
        Some(id)
    } else {
        None
    }
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Compute the redirect target for a location, if it is a deep link.
///
/// `query` is the raw query string, with or without its leading `?`.
pub fn redirect_target(path: &str, query: &str) -> Option<String> {
    let id = shorts_video_id(path)?;
    Some(format!("{}?{}", WATCH_URL, set_query_param(query, "v", id)))
}

/// Set `key=value` in a raw query string: the first occurrence is replaced
/// in place, later occurrences are dropped, and the pair is appended when
/// absent. Values are treated as opaque (already-encoded) text.
pub fn set_query_param(query: &str, key: &str, value: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut pairs: Vec<(String, String)> = Vec::new();
    for piece in query.split('&') {
        if piece.is_empty() {
            continue;
        }
        match piece.split_once('=') {
            Some((k, v)) => pairs.push((k.to_string(), v.to_string())),
            None => pairs.push((piece.to_string(), String::new())),
        }
    }

    let mut replaced = false;
    pairs.retain_mut(|(k, v)| {
        if k == key {
            if replaced {
                return false;
            }
            replaced = true;
            *v = value.to_string();
        }
        true
    });
    if !replaced {
        pairs.push((key.to_string(), value.to_string()));
    }

    let mut out = String::with_capacity(query.len() + key.len() + value.len() + 2);
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out
}
