//! Template tag clean-up and placeholder discovery.
//!
//! Word freely splits what the author typed as `{{ name }}` into several
//! runs, and may turn quotes into typographic ones. Both are undone here
//! before the XML is handed to tera.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::xml;

static SPLIT_OPEN_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?:<[^>]*>)+\{").expect("static regex"));
static SPLIT_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?:<[^>]*>)+%").expect("static regex"));
static SPLIT_CLOSE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}(?:<[^>]*>)+\}").expect("static regex"));
static SPLIT_CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(?:<[^>]*>)+\}").expect("static regex"));
static TAG_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("static regex"));
static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)").expect("static regex")
});
static FOR_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*for\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*,\s*([A-Za-z_][A-Za-z0-9_]*))?\s+in\s")
        .expect("static regex")
});
static SET_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*set(?:_global)?\s+([A-Za-z_][A-Za-z0-9_]*)\s*=")
        .expect("static regex")
});

/// Names tera provides inside templates without a context entry.
const BUILTIN_NAMES: &[&str] = &["loop", "true", "false", "True", "False", "none", "None"];

/// Merge template tags split across runs and normalise their contents.
pub fn normalize_tags(xml_text: &str) -> String {
    let merged = SPLIT_OPEN_VAR.replace_all(xml_text, "{{");
    let merged = SPLIT_OPEN_TAG.replace_all(&merged, "{%");
    let merged = SPLIT_CLOSE_VAR.replace_all(&merged, "}}");
    let merged = SPLIT_CLOSE_TAG.replace_all(&merged, "%}");

    TAG_SPAN
        .replace_all(&merged, |caps: &Captures| {
            let inner = XML_TAG.replace_all(&caps[0], "");
            straighten_quotes(&xml::unescape(&inner))
        })
        .into_owned()
}

fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            _ => c,
        })
        .collect()
}

/// Context names a normalised template needs: the leading identifier of
/// every `{{ }}` expression, minus loop and `set` bindings.
pub fn required_placeholders(normalized: &str) -> BTreeSet<String> {
    let mut bound: BTreeSet<&str> = BUILTIN_NAMES.iter().copied().collect();
    for caps in FOR_BINDING.captures_iter(normalized) {
        bound.extend(caps.iter().skip(1).flatten().map(|m| m.as_str()));
    }
    for caps in SET_BINDING.captures_iter(normalized) {
        if let Some(m) = caps.get(1) {
            bound.insert(m.as_str());
        }
    }

    VARIABLE
        .captures_iter(normalized)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !bound.contains(name))
        .map(str::to_string)
        .collect()
}
