use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formula::Formula;

/// Application domain of a spectral index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Vegetation,
    Burn,
    Water,
    Snow,
    Urban,
    Soil,
    Radar,
    Kernel,
}

impl IndexType {
    pub const ALL: [IndexType; 8] = [
        IndexType::Vegetation,
        IndexType::Burn,
        IndexType::Water,
        IndexType::Snow,
        IndexType::Urban,
        IndexType::Soil,
        IndexType::Radar,
        IndexType::Kernel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Vegetation => "vegetation",
            IndexType::Burn => "burn",
            IndexType::Water => "water",
            IndexType::Snow => "snow",
            IndexType::Urban => "urban",
            IndexType::Soil => "soil",
            IndexType::Radar => "radar",
            IndexType::Kernel => "kernel",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IndexType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown index type {s:?}"))
    }
}

/// One catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDefinition {
    pub short_name: String,
    pub long_name: String,
    #[serde(rename = "type")]
    pub index_type: IndexType,
    pub formula: Formula,
    /// Variables the formula needs, as listed by the record.
    pub required_variables: Vec<String>,
    pub reference: String,
    pub contributor: String,
    /// Sensor families the index is defined for.
    pub platforms: Vec<String>,
    pub date_of_addition: String,
}

impl IndexDefinition {
    /// Parse `formula` and check that `required_variables` names exactly its
    /// free variables.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        short_name: impl Into<String>,
        long_name: impl Into<String>,
        index_type: IndexType,
        formula: &str,
        required_variables: Vec<String>,
        reference: impl Into<String>,
        contributor: impl Into<String>,
        platforms: Vec<String>,
        date_of_addition: impl Into<String>,
    ) -> Result<Self> {
        let short_name = short_name.into();
        let formula = Formula::parse(formula).map_err(|e| Error::InvalidCatalog {
            name: short_name.clone(),
            reason: e.to_string(),
        })?;
        let def = Self {
            short_name,
            long_name: long_name.into(),
            index_type,
            formula,
            required_variables,
            reference: reference.into(),
            contributor: contributor.into(),
            platforms,
            date_of_addition: date_of_addition.into(),
        };
        def.check_variables()?;
        Ok(def)
    }

    fn check_variables(&self) -> Result<()> {
        let free = self.formula.variables();
        let missing: Vec<&str> = free
            .iter()
            .filter(|v| !self.required_variables.contains(v))
            .map(String::as_str)
            .collect();
        let unused: Vec<&str> = self
            .required_variables
            .iter()
            .filter(|v| !free.contains(v))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() || !unused.is_empty() {
            return Err(Error::InvalidCatalog {
                name: self.short_name.clone(),
                reason: format!(
                    "required variables do not match formula (unlisted: {missing:?}, unused: {unused:?})"
                ),
            });
        }
        let mut seen = Vec::with_capacity(self.required_variables.len());
        for v in &self.required_variables {
            if seen.contains(&v) {
                return Err(Error::InvalidCatalog {
                    name: self.short_name.clone(),
                    reason: format!("variable {v} listed twice"),
                });
            }
            seen.push(v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn make(formula: &str, required: &[&str]) -> Result<IndexDefinition> {
        IndexDefinition::new(
            "T",
            "Test",
            IndexType::Vegetation,
            formula,
            vars(required),
            "ref",
            "me",
            vec![],
            "2024-01-01",
        )
    }

    #[test]
    fn required_variables_may_be_listed_in_any_order() {
        assert!(make("(N - R) / (N + R)", &["R", "N"]).is_ok());
    }

    #[test]
    fn unlisted_or_unused_variables_are_rejected() {
        assert!(matches!(make("(N - R) / (N + R)", &["N"]), Err(Error::InvalidCatalog { .. })));
        assert!(matches!(make("N / R", &["N", "R", "G"]), Err(Error::InvalidCatalog { .. })));
        assert!(matches!(make("N / R", &["N", "R", "R"]), Err(Error::InvalidCatalog { .. })));
    }

    #[test]
    fn bad_formula_is_reported_against_the_record() {
        match make("(N - R", &["N", "R"]) {
            Err(Error::InvalidCatalog { name, .. }) => assert_eq!(name, "T"),
            other => panic!("expected invalid catalog, got {other:?}"),
        }
    }

    #[test]
    fn index_type_parses_case_insensitively() {
        assert_eq!("Burn".parse::<IndexType>(), Ok(IndexType::Burn));
        assert!("forest".parse::<IndexType>().is_err());
    }
}
