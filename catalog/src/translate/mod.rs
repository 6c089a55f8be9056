//! Per-source translation of raw records into canonical form.
//!
//! Each supported catalog source ships one strategy object implementing
//! [`Translator`]. The strategy is selected by [`SourceId`] at configuration
//! time; nothing inspects record shapes at runtime to guess the source.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::CanonicalRecord;

mod autocor;
mod patiotuerca;

pub use autocor::AutocorTranslator;
pub use patiotuerca::PatioTuercaTranslator;

/// Identifies a supported catalog source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    #[serde(rename = "patiotuerca")]
    PatioTuerca,
    Autocor,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::PatioTuerca => f.write_str("patiotuerca"),
            SourceId::Autocor => f.write_str("autocor"),
        }
    }
}

/// Maps one raw source record to one [`CanonicalRecord`].
///
/// Translation is a pure function over the raw mapping and never fails:
/// every field that cannot be resolved or parsed becomes `None` and shows up
/// in the record's gap report. The raw payload is retained on the record and
/// a capture timestamp is stamped at translation time.
pub trait Translator: Send + Sync {
    fn translate(&self, raw: &Value) -> CanonicalRecord;
}

/// A [`Translator`] dispatching statically over the configured source.
#[derive(Debug, Clone, Copy)]
pub enum SourceTranslator {
    PatioTuerca(PatioTuercaTranslator),
    Autocor(AutocorTranslator),
}

impl SourceTranslator {
    pub fn for_source(source: SourceId) -> SourceTranslator {
        match source {
            SourceId::PatioTuerca => SourceTranslator::PatioTuerca(PatioTuercaTranslator),
            SourceId::Autocor => SourceTranslator::Autocor(AutocorTranslator),
        }
    }
}

impl Translator for SourceTranslator {
    fn translate(&self, raw: &Value) -> CanonicalRecord {
        match self {
            SourceTranslator::PatioTuerca(translator) => translator.translate(raw),
            SourceTranslator::Autocor(translator) => translator.translate(raw),
        }
    }
}

/// Reads a value as display text, accepting strings and numbers.
///
/// Source feeds are inconsistent about quoting numerics, so `2020` and
/// `"2020"` resolve identically. Objects, arrays, booleans and nulls yield
/// `None`.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
