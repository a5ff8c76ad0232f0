//! Phrase overrides applied to decoder output
//!
//! The table is read-only after construction. Targets may share only
//! whitespace with the source alphabet, must start and end outside it, and
//! may not contain a source phrase. Any source phrase left after a pass
//! therefore sits in text no replacement touched, so a second pass is a no-op.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};

/// Proper names and technical terms the model tends to mangle
const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("عبدالوہاب", "Abdul Wahab"),
    ("ڈیٹا سائنس", "Data Science"),
];

/// Single source → target override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    entries: Vec<DictionaryEntry>,
}

/// Ordered substitution table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryTable {
    entries: Vec<DictionaryEntry>,
}

impl Default for DictionaryTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .map(|(source, target)| DictionaryEntry {
                    source: source.to_string(),
                    target: target.to_string(),
                })
                .collect(),
        }
    }
}

impl DictionaryTable {
    /// Build a table, keeping the given order
    pub fn new(entries: Vec<DictionaryEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.source.is_empty() {
                return Err(TranslationError::ConfigError {
                    message: "dictionary source phrase cannot be empty".to_string(),
                });
            }
        }

        let alphabet: HashSet<char> = entries.iter().flat_map(|e| e.source.chars()).collect();

        for entry in &entries {
            let reject = |reason: String| TranslationError::ConfigError {
                message: format!("dictionary target '{}' {}", entry.target, reason),
            };

            if entry.target.is_empty() {
                return Err(TranslationError::ConfigError {
                    message: format!("dictionary target for '{}' cannot be empty", entry.source),
                });
            }
            if let Some(clash) = entries.iter().find(|e| entry.target.contains(&e.source)) {
                return Err(reject(format!("contains source phrase '{}'", clash.source)));
            }
            if let Some(c) = entry
                .target
                .chars()
                .find(|c| !c.is_whitespace() && alphabet.contains(c))
            {
                return Err(reject(format!("reuses source character '{}'", c)));
            }
            let edges = [entry.target.chars().next(), entry.target.chars().last()];
            if edges.iter().flatten().any(|c| alphabet.contains(c)) {
                return Err(reject("must start and end with a non-source character".to_string()));
            }
        }

        Ok(Self { entries })
    }

    /// Load `entries: [{source, target}]` from a `.json`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let file: DictionaryFile = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => {
                return Err(TranslationError::ConfigError {
                    message: format!("unsupported dictionary format: {}", path.display()),
                })
            }
        };

        let table = Self::new(file.entries)?;
        info!("Loaded {} dictionary entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Replace every occurrence of each source phrase, in table order
    pub fn apply(&self, text: &str) -> String {
        let mut output = text.to_string();
        for entry in &self.entries {
            if output.contains(&entry.source) {
                debug!("Dictionary override: {} -> {}", entry.source, entry.target);
                output = output.replace(&entry.source, &entry.target);
            }
        }
        output
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(source: &str, target: &str) -> DictionaryEntry {
        DictionaryEntry {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_default_replaces_known_phrase() {
        let table = DictionaryTable::default();
        assert_eq!(
            table.apply("I study ڈیٹا سائنس at university"),
            "I study Data Science at university"
        );
        assert_eq!(table.apply("ڈیٹا سائنس"), "Data Science");
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let table = DictionaryTable::default();
        assert_eq!(
            table.apply("عبدالوہاب met عبدالوہاب"),
            "Abdul Wahab met Abdul Wahab"
        );
    }

    #[test]
    fn test_untouched_when_no_key_present() {
        let table = DictionaryTable::default();
        assert_eq!(table.apply("Hello, how are you?"), "Hello, how are you?");
        assert_eq!(table.apply(""), "");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let table = DictionaryTable::default();
        for text in [
            "ڈیٹا سائنس and عبدالوہاب",
            "Data Science",
            "plain english",
            "عبدالوہابعبدالوہاب",
        ] {
            let once = table.apply(text);
            assert_eq!(table.apply(&once), once);
        }
    }

    #[test]
    fn test_rejects_target_containing_source() {
        let result = DictionaryTable::new(vec![entry("ab", "xaby")]);
        assert!(matches!(result, Err(TranslationError::ConfigError { .. })));

        let result = DictionaryTable::new(vec![entry("a", "b"), entry("c", "bad")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_self_overlapping_source() {
        // "aaaa" -> "aa" -> "a"
        let result = DictionaryTable::new(vec![entry("aa", "a")]);
        assert!(matches!(result, Err(TranslationError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_target_forming_earlier_source() {
        // "cb" -> "ab" -> "Z"
        let result = DictionaryTable::new(vec![entry("ab", "Z"), entry("c", "a")]);
        assert!(matches!(result, Err(TranslationError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_target_edge_in_source_alphabet() {
        assert!(DictionaryTable::new(vec![entry("کر اچی", " Karachi")]).is_err());
        assert!(DictionaryTable::new(vec![entry("کر اچی", "Karachi ")]).is_err());
        assert!(DictionaryTable::new(vec![entry("کر اچی", "Kara chi")]).is_ok());
    }

    #[test]
    fn test_rejects_empty_target() {
        assert!(DictionaryTable::new(vec![entry("ab", "")]).is_err());
    }

    #[test]
    fn test_accepted_tables_are_idempotent() {
        let table = DictionaryTable::new(vec![
            entry("ڈیٹا سائنس", "Data Science"),
            entry("سائنس", "science"),
            entry("ڈیٹا", "data"),
        ])
        .unwrap();
        for text in ["ڈیٹا ڈیٹا سائنس سائنس", "سائنسڈیٹا", "ڈیٹاسائنس ڈیٹا"] {
            let once = table.apply(text);
            assert_eq!(table.apply(&once), once);
        }
    }

    #[test]
    fn test_rejects_empty_source() {
        assert!(DictionaryTable::new(vec![entry("", "x")]).is_err());
    }

    #[test]
    fn test_order_is_preserved() {
        let table = DictionaryTable::new(vec![entry("لاہور", "Lahore"), entry("کراچی", "Karachi")])
            .unwrap();
        let sources: Vec<_> = table.entries().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["لاہور", "کراچی"]);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "entries:\n  - source: لاہور\n    target: Lahore\n  - source: پاکستان\n    target: Pakistan"
        )
        .unwrap();

        let table = DictionaryTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.apply("لاہور, پاکستان"), "Lahore, Pakistan");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"entries": [{{"source": "اردو", "target": "Urdu"}}]}}"#).unwrap();

        let table = DictionaryTable::from_file(file.path()).unwrap();
        assert_eq!(table.entries(), &[entry("اردو", "Urdu")]);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(DictionaryTable::from_file(file.path()).is_err());
    }
}
