//! Department classification and per-department price floors.
//!
//! A query is bucketed into a coarse marketplace department by a
//! case-insensitive substring match against an ordered keyword table; the
//! first matching keyword wins and unmatched queries fall back to
//! [`Department::All`]. The department drives the minimum-price eligibility
//! floor that excludes accessory listings (cables, cases) sharing search
//! results with the primary product.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Minimum eligible price for electronics queries, in marketplace currency
/// units. Listings below this are presumed accessories.
pub const ELECTRONICS_PRICE_FLOOR: f64 = 5000.0;

/// Minimum eligible price for computers queries.
pub const COMPUTERS_PRICE_FLOOR: f64 = 20000.0;

/// Built-in keyword table, checked in order; first match wins.
const BUILTIN_KEYWORDS: &[(&str, Department)] = &[
    ("iphone", Department::Electronics),
    ("samsung", Department::Electronics),
    ("macbook", Department::Computers),
    ("laptop", Department::Computers),
    ("ipad", Department::Electronics),
];

/// Coarse marketplace category bucket driving search refinement and the
/// minimum-price eligibility floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Electronics,
    Computers,
    All,
}

impl Department {
    /// Returns the minimum price a candidate must reach to be eligible for
    /// this department. [`Department::All`] applies no floor.
    #[must_use]
    pub fn price_floor(self) -> f64 {
        match self {
            Department::Electronics => ELECTRONICS_PRICE_FLOOR,
            Department::Computers => COMPUTERS_PRICE_FLOOR,
            Department::All => 0.0,
        }
    }

    /// Search refinement value for the marketplace's department query
    /// parameter, or `None` for an unrefined search.
    #[must_use]
    pub fn refinement(self) -> Option<&'static str> {
        match self {
            Department::Electronics => Some("electronics"),
            Department::Computers => Some("computers"),
            Department::All => None,
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Department::Electronics => write!(f, "electronics"),
            Department::Computers => write!(f, "computers"),
            Department::All => write!(f, "all"),
        }
    }
}

/// One keyword→department rule from a departments config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub department: Department,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentsFile {
    pub keywords: Vec<KeywordRule>,
}

/// Ordered keyword table mapping query substrings to departments.
#[derive(Debug, Clone)]
pub struct DepartmentClassifier {
    rules: Vec<(String, Department)>,
}

impl Default for DepartmentClassifier {
    fn default() -> Self {
        Self {
            rules: BUILTIN_KEYWORDS
                .iter()
                .map(|&(k, d)| (k.to_owned(), d))
                .collect(),
        }
    }
}

impl DepartmentClassifier {
    /// Load a classifier from a YAML keyword file, replacing the built-in
    /// table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails
    /// validation (empty or duplicate keywords).
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::DepartmentsFileIo {
                path: path.display().to_string(),
                source: e,
            })?;

        let file: DepartmentsFile = serde_yaml::from_str(&content)?;
        validate_keywords(&file)?;

        Ok(Self {
            rules: file
                .keywords
                .into_iter()
                .map(|rule| (rule.keyword.to_lowercase(), rule.department))
                .collect(),
        })
    }

    /// Classify a query by case-insensitive substring match, first rule wins.
    /// Unmatched queries classify as [`Department::All`].
    #[must_use]
    pub fn classify(&self, query: &str) -> Department {
        let query_lower = query.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| query_lower.contains(keyword.as_str()))
            .map_or(Department::All, |&(_, department)| department)
    }
}

/// Classify a query against the built-in keyword table.
#[must_use]
pub fn classify_department(query: &str) -> Department {
    DepartmentClassifier::default().classify(query)
}

fn validate_keywords(file: &DepartmentsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for rule in &file.keywords {
        if rule.keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "department keyword must be non-empty".to_string(),
            ));
        }

        if !seen.insert(rule.keyword.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate department keyword: '{}'",
                rule.keyword
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_iphone_query_as_electronics() {
        assert_eq!(classify_department("iPhone 14 Pro"), Department::Electronics);
    }

    #[test]
    fn classify_laptop_query_as_computers() {
        assert_eq!(classify_department("Dell Laptop"), Department::Computers);
    }

    #[test]
    fn classify_unmatched_query_as_all() {
        assert_eq!(classify_department("Banana"), Department::All);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify_department("SAMSUNG galaxy"), Department::Electronics);
        assert_eq!(classify_department("MacBook Air"), Department::Computers);
    }

    #[test]
    fn classify_matches_substring_anywhere() {
        assert_eq!(
            classify_department("refurbished ipad mini 6"),
            Department::Electronics
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        // "iphone laptop" hits the iphone rule before the laptop rule.
        assert_eq!(
            classify_department("iphone laptop stand"),
            Department::Electronics
        );
    }

    #[test]
    fn price_floor_per_department() {
        assert!((Department::Electronics.price_floor() - 5000.0).abs() < f64::EPSILON);
        assert!((Department::Computers.price_floor() - 20000.0).abs() < f64::EPSILON);
        assert!(Department::All.price_floor().abs() < f64::EPSILON);
    }

    #[test]
    fn refinement_absent_for_all() {
        assert_eq!(Department::Electronics.refinement(), Some("electronics"));
        assert_eq!(Department::All.refinement(), None);
    }

    #[test]
    fn display_matches_wire_values() {
        assert_eq!(Department::Electronics.to_string(), "electronics");
        assert_eq!(Department::Computers.to_string(), "computers");
        assert_eq!(Department::All.to_string(), "all");
    }

    #[test]
    fn custom_classifier_replaces_builtin_rules() {
        let classifier = DepartmentClassifier {
            rules: vec![("banana".to_string(), Department::Electronics)],
        };
        assert_eq!(classifier.classify("Banana phone"), Department::Electronics);
        assert_eq!(classifier.classify("iphone"), Department::All);
    }

    #[test]
    fn validate_rejects_empty_keyword() {
        let file = DepartmentsFile {
            keywords: vec![KeywordRule {
                keyword: "  ".to_string(),
                department: Department::All,
            }],
        };
        assert!(matches!(
            validate_keywords(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_keyword() {
        let file = DepartmentsFile {
            keywords: vec![
                KeywordRule {
                    keyword: "iphone".to_string(),
                    department: Department::Electronics,
                },
                KeywordRule {
                    keyword: "IPHONE".to_string(),
                    department: Department::All,
                },
            ],
        };
        assert!(matches!(
            validate_keywords(&file),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn department_serde_uses_lowercase() {
        let json = serde_json::to_string(&Department::Electronics).expect("serialize");
        assert_eq!(json, "\"electronics\"");
        let decoded: Department = serde_json::from_str("\"computers\"").expect("deserialize");
        assert_eq!(decoded, Department::Computers);
    }
}
