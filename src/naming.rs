//! Naming conventions for dataset variables and axes
//!
//! Input datasets label the same quantity under several common names, e.g.
//! `t`, `Time` or `year` instead of `time`. [`NameNormalizer`] is a closed
//! mapping from each canonical name to a finite set of accepted aliases,
//! validated at construction so that no alias can resolve to two canonical
//! names. Applying it is idempotent: a dataset already using canonical names
//! is left untouched.

use crate::dataset::Dataset;
use crate::errors::{SlcError, SlcResult};

/// A closed canonical-name to alias mapping, applied to whole datasets.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    rules: Vec<(String, Vec<String>)>,
}

impl Default for NameNormalizer {
    /// The conventions the ensemble driver relies on: `time` and `basin`.
    fn default() -> Self {
        Self::new(vec![
            ("time", vec!["t", "Time", "year", "Year"]),
            ("basin", vec!["basins", "Basin", "Basins"]),
        ])
        .expect("default alias table has no overlaps")
    }
}

impl NameNormalizer {
    /// Build a normalizer from `(canonical, aliases)` rules.
    ///
    /// Fails if an alias is claimed by two canonical names, or if an alias
    /// collides with another rule's canonical name; either would make
    /// resolution ambiguous.
    pub fn new(rules: Vec<(&str, Vec<&str>)>) -> SlcResult<Self> {
        let rules: Vec<(String, Vec<String>)> = rules
            .into_iter()
            .map(|(canonical, aliases)| {
                (
                    canonical.to_string(),
                    aliases.into_iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();

        for (i, (canonical, aliases)) in rules.iter().enumerate() {
            for alias in aliases {
                // an alias equal to any canonical name cannot be resolved
                if let Some((other, _)) = rules.iter().find(|(c, _)| c == alias) {
                    return Err(SlcError::AmbiguousAlias {
                        alias: alias.clone(),
                        first: other.clone(),
                        second: canonical.clone(),
                    });
                }
                for (other_canonical, other_aliases) in &rules[..i] {
                    if other_aliases.contains(alias) {
                        return Err(SlcError::AmbiguousAlias {
                            alias: alias.clone(),
                            first: other_canonical.clone(),
                            second: canonical.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { rules })
    }

    /// Rename known aliases to their canonical names, in place.
    ///
    /// For each canonical target, a dataset already containing the canonical
    /// name is left untouched; otherwise the first present alias (in
    /// declaration order) is renamed. Applying twice equals applying once.
    pub fn normalize(&self, dataset: &mut Dataset) {
        for (canonical, aliases) in &self.rules {
            if dataset.contains_name(canonical) {
                continue;
            }
            if let Some(alias) = aliases.iter().find(|a| dataset.contains_name(a)) {
                dataset.rename(alias, canonical);
            }
        }
    }
}
