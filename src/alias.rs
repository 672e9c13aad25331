//! Path alias resolution for component references.
//!
//! Route entries refer to their views through specifiers such as
//! `@/views/ChatView.vue`. An alias maps the leading key (`@`) onto a
//! directory (`/src`), so the specifier above resolves to
//! `/src/views/ChatView.vue`.

use std::collections::HashMap;

use tracing::debug;

/// A set of alias keys and the directories they stand for.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    // Sorted by key length, longest first, so the most specific alias wins.
    entries: Vec<(String, String)>,
}

impl AliasMap {
    /// Builds an alias map from the configured `key -> target` pairs.
    pub fn new(aliases: &HashMap<String, String>) -> Self {
        let mut entries: Vec<(String, String)> = aliases
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, target)| (key.clone(), target.trim_end_matches('/').to_string()))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        AliasMap { entries }
    }

    /// Resolves `specifier` against the alias table.
    ///
    /// A key applies when the specifier equals it or continues with `/`
    /// after it. Specifiers without a matching alias come back unchanged.
    pub fn resolve(&self, specifier: &str) -> String {
        for (key, target) in &self.entries {
            if specifier == key {
                return target.clone();
            }
            if let Some(rest) = specifier.strip_prefix(key.as_str()) {
                if rest.starts_with('/') {
                    let resolved = format!("{}{}", target, rest);
                    debug!("Alias '{}' resolved '{}' to '{}'", key, specifier, resolved);
                    return resolved;
                }
            }
        }
        specifier.to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
