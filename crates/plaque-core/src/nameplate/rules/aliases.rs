//! Alias table mapping OCR label variants to canonical fields.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::field::CanonicalField;

/// Built-in label variants, including frequent OCR misreads (`l` for `I`).
pub const BUILTIN_ALIASES: &[(&str, CanonicalField)] = &[
    ("voc", CanonicalField::Voc),
    ("v_oc", CanonicalField::Voc),
    ("isc", CanonicalField::Isc),
    ("lsc", CanonicalField::Isc),
    ("i_sc", CanonicalField::Isc),
    ("isci", CanonicalField::Isc),
    ("pmax", CanonicalField::Pmax),
    ("p_max", CanonicalField::Pmax),
    ("vpm", CanonicalField::Vpm),
    ("v_pm", CanonicalField::Vpm),
    ("ipm", CanonicalField::Ipm),
    ("i_pm", CanonicalField::Ipm),
    ("lpm", CanonicalField::Ipm),
    ("iom", CanonicalField::Ipm),
];

/// Reduce a line or alias to its lookup key: ASCII letters only, lowercased.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Many-to-one mapping from normalized alias keys to canonical fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTable {
    entries: BTreeMap<String, CanonicalField>,
}

impl AliasTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Table holding [`BUILTIN_ALIASES`].
    pub fn builtin() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|(alias, field)| (normalize_key(alias), *field))
            .collect();
        Self { entries }
    }

    /// Build a table from `(alias, field)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ExtractionError>
    where
        I: IntoIterator<Item = (S, CanonicalField)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        table.extend(pairs)?;
        Ok(table)
    }

    /// Map an alias to a field, returning the field it previously mapped to.
    pub fn insert(
        &mut self,
        alias: &str,
        field: CanonicalField,
    ) -> Result<Option<CanonicalField>, ExtractionError> {
        let key = normalize_key(alias);
        if key.is_empty() {
            return Err(ExtractionError::InvalidAlias(alias.to_string()));
        }

        let previous = self.entries.insert(key.clone(), field);
        if let Some(old) = previous.filter(|old| *old != field) {
            debug!("Alias {:?} remapped from {} to {}", key, old, field);
        }
        Ok(previous)
    }

    /// Builder form of [`AliasTable::insert`].
    pub fn with_alias(mut self, alias: &str, field: CanonicalField) -> Result<Self, ExtractionError> {
        self.insert(alias, field)?;
        Ok(self)
    }

    pub fn extend<I, S>(&mut self, pairs: I) -> Result<(), ExtractionError>
    where
        I: IntoIterator<Item = (S, CanonicalField)>,
        S: AsRef<str>,
    {
        for (alias, field) in pairs {
            self.insert(alias.as_ref(), field)?;
        }
        Ok(())
    }

    /// Look up a raw line or alias; it is normalized first.
    ///
    /// Only an exact match of the whole normalized text counts.
    pub fn lookup(&self, text: &str) -> Option<CanonicalField> {
        self.get(&normalize_key(text))
    }

    /// Look up an already normalized key.
    pub fn get(&self, key: &str) -> Option<CanonicalField> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, field)` sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalField)> {
        self.entries.iter().map(|(key, field)| (key.as_str(), *field))
    }

    /// Keys that map to `field`.
    pub fn aliases_for(&self, field: CanonicalField) -> Vec<&str> {
        self.iter()
            .filter(|(_, f)| *f == field)
            .map(|(key, _)| key)
            .collect()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}
