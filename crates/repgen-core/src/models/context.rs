use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A figure ready for insertion: encoded PNG bytes plus the size it should
/// occupy on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRef {
    /// The file the figure was read from (before any overlay).
    pub source: PathBuf,
    #[serde(skip)]
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    /// Rendered width on the page; height follows the aspect ratio.
    pub width_mm: f64,
}

impl FigureRef {
    pub fn height_mm(&self) -> f64 {
        if self.width_px == 0 {
            return 0.0;
        }
        self.width_mm * f64::from(self.height_px) / f64::from(self.width_px)
    }
}

/// A single value a template placeholder can resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContextValue {
    Text(String),
    Number { value: f64, decimals: usize },
    Image(FigureRef),
}

impl ContextValue {
    /// Text form of the value. Images have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ContextValue::Text(s) => Some(s.clone()),
            ContextValue::Number { value, decimals } => Some(format!("{value:.decimals$}")),
            ContextValue::Image(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContextValue::Image(_))
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

/// Flat placeholder → value mapping used to fill one template.
///
/// Backed by a `BTreeMap` so iteration order, and everything rendered from
/// it, is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextMap {
    entries: BTreeMap<String, ContextValue>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn insert_number(&mut self, key: impl Into<String>, value: f64, decimals: usize) {
        self.entries
            .insert(key.into(), ContextValue::Number { value, decimals });
    }

    pub fn insert_image(&mut self, key: impl Into<String>, figure: FigureRef) {
        self.entries.insert(key.into(), ContextValue::Image(figure));
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.entries.get(key).and_then(ContextValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &FigureRef)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            ContextValue::Image(figure) => Some((k.as_str(), figure)),
            _ => None,
        })
    }

    pub fn extend(&mut self, other: ContextMap) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
