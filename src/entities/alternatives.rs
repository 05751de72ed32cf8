use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DrugInfoError;

/// Fixed brand-name substitutes keyed by exact drug name.
///
/// Placeholder data only; nothing here is clinically reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlternativesTable {
    entries: HashMap<String, Vec<String>>,
}

impl Default for AlternativesTable {
    fn default() -> Self {
        Self::new([
            ("Metformin", &["Glucophage", "Fortamet"][..]),
            ("Ibuprofen", &["Advil", "Motrin"][..]),
            ("Omeprazole", &["Prilosec", "Zegerid"][..]),
        ])
    }
}

impl AlternativesTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, alts)| {
                    (
                        name.to_string(),
                        alts.iter().map(|a| (*a).to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Loads a JSON object of `{"Name": ["Alt", ...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, DrugInfoError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Case-sensitive exact match; unknown names yield an empty list.
    pub fn lookup(&self, name: &str) -> Vec<String> {
        self.entries.get(name).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
