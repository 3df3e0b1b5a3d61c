//! Target-CUI remapping and filtering policy.
//!
//! The policy is loaded once per run and read-only afterwards. Its defining
//! behavior is the asymmetry between the empty and non-empty states: an empty
//! policy passes every CUI through unchanged, a non-empty policy acts as a
//! strict allow-list (unknown CUIs map to nothing and their records are
//! dropped). Mappings are multi-valued, so several source CUIs can collapse
//! onto one canonical CUI and one source CUI can fan out to several targets.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{ModelError, Result};

/// Multi-valued source-CUI to target-CUI mapping.
#[derive(Debug, Clone, Default)]
pub struct TargetCuis {
    map: BTreeMap<String, Vec<String>>,
}

impl TargetCuis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping from `source` to `targets`.
    ///
    /// With no targets, `source` maps to itself. Repeated calls with the same
    /// source append rather than overwrite.
    pub fn add<I, S>(&mut self, source: &str, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.map.entry(source.to_string()).or_default();
        let before = entry.len();
        entry.extend(targets.into_iter().map(Into::into));
        if entry.len() == before {
            entry.push(source.to_string());
        }
    }

    /// Load a policy from a file of `FROM_CUI[,TO_CUI...]` lines.
    ///
    /// Blank lines are skipped; a line with only a source CUI retains that
    /// CUI unmapped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cuis = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split(',').map(str::trim);
            let source = parts.next().unwrap_or_default();
            cuis.add(source, parts.filter(|p| !p.is_empty()));
        }
        Ok(cuis)
    }

    /// Map a source CUI to its target CUIs.
    ///
    /// Empty policy: `[source]`, unchanged. Non-empty policy: the mapped
    /// values, or nothing when the source is absent (filtering semantics).
    pub fn get_target_cuis(&self, source: &str) -> Vec<String> {
        if self.map.is_empty() {
            return vec![source.to_string()];
        }
        self.map.get(source).cloned().unwrap_or_default()
    }

    /// Membership over the mapped-to values, not the source keys.
    pub fn contains(&self, cui: &str) -> bool {
        self.map.values().any(|targets| targets.iter().any(|t| t == cui))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of source CUIs.
    pub fn n_keys(&self) -> usize {
        self.map.len()
    }

    /// Number of distinct target CUIs.
    pub fn n_values(&self) -> usize {
        self.value_set().len()
    }

    /// Distinct target CUIs, sorted.
    pub fn values(&self) -> Vec<String> {
        self.value_set().into_iter().map(ToString::to_string).collect()
    }

    fn value_set(&self) -> BTreeSet<&str> {
        self.map
            .values()
            .flat_map(|targets| targets.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_policy_passes_through() {
        let cuis = TargetCuis::new();
        assert_eq!(cuis.get_target_cuis("C0035647"), vec!["C0035647"]);
        assert!(!cuis.contains("C0035647"));
    }

    #[test]
    fn absent_key_filters_when_nonempty() {
        let mut cuis = TargetCuis::new();
        cuis.add("C0000001", ["C0000002"]);
        assert!(cuis.get_target_cuis("C0035647").is_empty());
    }

    #[test]
    fn bare_key_maps_to_itself() {
        let mut cuis = TargetCuis::new();
        cuis.add("C0000001", Vec::<String>::new());
        assert_eq!(cuis.get_target_cuis("C0000001"), vec!["C0000001"]);
        assert!(cuis.contains("C0000001"));
    }

    #[test]
    fn repeated_adds_append() {
        let mut cuis = TargetCuis::new();
        cuis.add("C0000001", ["C0000002"]);
        cuis.add("C0000001", ["C0000003"]);
        assert_eq!(
            cuis.get_target_cuis("C0000001"),
            vec!["C0000002", "C0000003"]
        );
        assert_eq!(cuis.n_keys(), 1);
        assert_eq!(cuis.n_values(), 2);
    }

    #[test]
    fn membership_is_over_values_not_keys() {
        let mut cuis = TargetCuis::new();
        cuis.add("C0000001", ["C0000002"]);
        assert!(!cuis.contains("C0000001"));
        assert!(cuis.contains("C0000002"));
    }
}
