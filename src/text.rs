// src/text.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Turn an HTML fragment into display text: decode entities, strip tags,
/// fold whitespace (including NBSP) and trim.
pub fn normalize_text(s: &str) -> String {
    // 1) Strip tags before decoding so `&lt;b&gt;` survives as literal text
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    let out = re_tags.replace_all(s, "");

    // 2) HTML entity decode
    let out = html_escape::decode_html_entities(&out);

    // 3) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}
