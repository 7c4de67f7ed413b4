//! Read-only export views over the raw value store.
//!
//! All three views show post-extraction raw values — directives are gone,
//! conversion is not applied. The default section appears under its own name
//! when it has entries; concrete sections do not repeat inherited defaults.

use std::collections::BTreeMap;

use crate::builder::ConfigFetch;
use crate::error::FetchError;

/// Section → option → raw value, sorted for stable output.
pub(crate) fn to_map(conf: &ConfigFetch) -> BTreeMap<String, BTreeMap<String, String>> {
    let store = conf.raw_store();
    let mut map = BTreeMap::new();
    if !store.defaults().is_empty() {
        map.insert(
            store.default_section().to_string(),
            entries_to_map(store.defaults()),
        );
    }
    for section in store.sections() {
        map.insert(section.name.clone(), entries_to_map(&section.entries));
    }
    map
}

fn entries_to_map(entries: &[(String, String)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Serialize back to INI text, in read order. Multi-line values are written
/// on indented continuation lines.
pub(crate) fn to_ini_string(conf: &ConfigFetch) -> String {
    let store = conf.raw_store();
    let mut out = String::new();
    let mut write_section = |name: &str, entries: &[(String, String)]| {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("[{name}]\n"));
        for (key, value) in entries {
            let mut lines = value.split('\n');
            let first = lines.next().unwrap_or("");
            if first.is_empty() {
                out.push_str(&format!("{key} =\n"));
            } else {
                out.push_str(&format!("{key} = {first}\n"));
            }
            for line in lines {
                out.push_str(&format!("    {line}\n"));
            }
        }
    };
    if !store.defaults().is_empty() {
        write_section(store.default_section(), store.defaults());
    }
    for section in store.sections() {
        write_section(&section.name, &section.entries);
    }
    out
}

/// Pretty JSON rendering of [`to_map`].
pub(crate) fn to_json(conf: &ConfigFetch) -> Result<String, FetchError> {
    serde_json::to_string_pretty(&to_map(conf))
        .map_err(|e| FetchError::InvalidValue(format!("JSON export failed: {e}")))
}
