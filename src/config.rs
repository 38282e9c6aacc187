//! Settings snapshot read once per report generation.
//!
//! Settings are stored as JSON. Category order in the file is significant:
//! it is the keyword-matching priority used by [`crate::classify`].

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ToolError};

/// Display name of the synthetic category holding unmatched columns.
pub const OTHER_CATEGORY: &str = "Other";

const DEFAULT_MAX_POINTS: f64 = 100.0;

/// One user-defined category: its matching keywords plus scoring defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_max_points")]
    pub max_points: f64,
    #[serde(default)]
    pub weight: f64,
}

/// Scoring defaults of a category, independent of its keywords.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "default_max_points")]
    pub max_points: f64,
    #[serde(default)]
    pub weight: f64,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            weight: 0.0,
        }
    }
}

fn default_max_points() -> f64 {
    DEFAULT_MAX_POINTS
}

/// Ordered (category, keywords) pairs. The first category with a matching
/// keyword claims a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryKeywordMap {
    groups: Vec<(String, Vec<String>)>,
}

impl CategoryKeywordMap {
    /// Iterates the categories from highest to lowest priority.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, keywords)| (name.as_str(), keywords.as_slice()))
    }
}

impl<N, K> FromIterator<(N, Vec<K>)> for CategoryKeywordMap
where
    N: Into<String>,
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<K>)>>(iter: I) -> Self {
        let groups = iter
            .into_iter()
            .map(|(name, keywords)| (name.into(), keywords.into_iter().map(Into::into).collect()))
            .collect();
        Self { groups }
    }
}

/// How the configured weights relate to 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "total", rename_all = "snake_case")]
pub enum WeightTotal {
    Balanced(f64),
    Under(f64),
    Over(f64),
}

/// Complete settings snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Falls back to the built-in categories when the file omits the list.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategorySettings>,
    #[serde(default)]
    pub other: CategoryConfig,
    /// Per-column max-points overrides keyed by exact column name.
    #[serde(default)]
    pub item_overrides: BTreeMap<String, f64>,
    #[serde(default)]
    pub show_category_averages: bool,
}

fn default_categories() -> Vec<CategorySettings> {
    let category = |name: &str, keywords: &[&str], max_points: f64, weight: f64| CategorySettings {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        max_points,
        weight,
    };
    vec![
        category("Exams", &["exam", "test", "midterm", "final"], 100.0, 25.0),
        category("Assignments", &["assignment", "homework", "hw"], 100.0, 25.0),
        category("Participation", &["participation", "attendance"], 1.0, 30.0),
        category("El Civics", &["el civics", "civics", "elcivics"], 100.0, 20.0),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            other: CategoryConfig::default(),
            item_overrides: BTreeMap::new(),
            show_category_averages: false,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file and validates them.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&data)?;
        let settings = settings.normalized();
        settings.validate()?;
        debug!(
            categories = settings.categories.len(),
            overrides = settings.item_overrides.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Trims category names and keywords and drops blank keywords.
    pub fn normalized(mut self) -> Self {
        for category in &mut self.categories {
            category.name = category.name.trim().to_string();
            category.keywords = category
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_string())
                .filter(|keyword| !keyword.is_empty())
                .collect();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.is_empty() {
                return Err(ToolError::InvalidConfig("category name is empty".into()));
            }
            if category.name.eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(ToolError::InvalidConfig(format!(
                    "'{}' is reserved for uncategorized columns",
                    category.name
                )));
            }
            if !seen.insert(category.name.to_lowercase()) {
                return Err(ToolError::InvalidConfig(format!(
                    "duplicate category '{}'",
                    category.name
                )));
            }
            check_scoring(&category.name, category.max_points, category.weight)?;
        }
        check_scoring(OTHER_CATEGORY, self.other.max_points, self.other.weight)?;

        for (column, max_points) in &self.item_overrides {
            if !(max_points.is_finite() && *max_points > 0.0) {
                return Err(ToolError::InvalidConfig(format!(
                    "override for '{column}' must be a positive number"
                )));
            }
        }
        Ok(())
    }

    pub fn keyword_map(&self) -> CategoryKeywordMap {
        self.categories
            .iter()
            .map(|category| (category.name.clone(), category.keywords.clone()))
            .collect()
    }

    /// Scoring defaults for `category`, where [`OTHER_CATEGORY`] resolves to
    /// the uncategorized settings. Unknown categories get the global defaults.
    pub fn category_config(&self, category: &str) -> CategoryConfig {
        if category == OTHER_CATEGORY {
            return self.other;
        }
        self.categories
            .iter()
            .find(|candidate| candidate.name == category)
            .map(|candidate| CategoryConfig {
                max_points: candidate.max_points,
                weight: candidate.weight,
            })
            .unwrap_or_default()
    }

    /// True when any category, including "Other", carries a non-zero weight.
    pub fn has_weights(&self) -> bool {
        self.other.weight > 0.0 || self.categories.iter().any(|category| category.weight > 0.0)
    }

    pub fn weight_total(&self) -> WeightTotal {
        let total: f64 = self.other.weight
            + self
                .categories
                .iter()
                .map(|category| category.weight)
                .sum::<f64>();
        if (total - 100.0).abs() < 1e-9 {
            WeightTotal::Balanced(total)
        } else if total < 100.0 {
            WeightTotal::Under(total)
        } else {
            WeightTotal::Over(total)
        }
    }

    /// Logs a warning when the weights do not add up to 100%.
    pub fn report_weight_total(&self) -> WeightTotal {
        let total = self.weight_total();
        match total {
            WeightTotal::Balanced(_) => {}
            WeightTotal::Under(value) => warn!(total = value, "category weights sum below 100%"),
            WeightTotal::Over(value) => warn!(total = value, "category weights exceed 100%"),
        }
        total
    }
}

fn check_scoring(name: &str, max_points: f64, weight: f64) -> Result<()> {
    if !(max_points.is_finite() && max_points > 0.0) {
        return Err(ToolError::InvalidConfig(format!(
            "max points for '{name}' must be a positive number"
        )));
    }
    if !(0.0..=100.0).contains(&weight) {
        return Err(ToolError::InvalidConfig(format!(
            "weight for '{name}' must be between 0 and 100"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_balanced() {
        let settings = Settings::default();
        settings.validate().expect("defaults are valid");
        assert_eq!(settings.weight_total(), WeightTotal::Balanced(100.0));
        assert_eq!(settings.category_config("Participation").max_points, 1.0);
        assert_eq!(settings.category_config(OTHER_CATEGORY).weight, 0.0);
    }

    #[test]
    fn keyword_map_preserves_file_order() {
        let json = r#"{
            "categories": [
                {"name": " Quizzes ", "keywords": ["quiz", "  ", " pop "]},
                {"name": "Exams", "keywords": ["exam"], "max_points": 50, "weight": 60}
            ],
            "other": {"weight": 40}
        }"#;
        let settings: Settings = serde_json::from_str(json).expect("parse");
        let settings = settings.normalized();
        settings.validate().expect("valid");

        let map = settings.keyword_map();
        let names: Vec<&str> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Quizzes", "Exams"]);
        assert_eq!(settings.categories[0].keywords, vec!["quiz", "pop"]);
        assert_eq!(settings.categories[0].max_points, 100.0);
        assert_eq!(settings.other.max_points, 100.0);
        assert_eq!(settings.weight_total(), WeightTotal::Balanced(100.0));
    }

    #[test]
    fn file_without_categories_keeps_builtin_ones() {
        let temp_dir = tempfile::tempdir().expect("temporary directory");
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{"item_overrides": {"Exam 1": 50}}"#).expect("settings written");

        let settings = Settings::load(&path).expect("settings load");
        assert_eq!(settings.categories, Settings::default().categories);
        assert_eq!(settings.item_overrides.get("Exam 1"), Some(&50.0));
        assert_eq!(settings.weight_total(), WeightTotal::Balanced(100.0));
    }

    #[test]
    fn rejects_reserved_and_out_of_range_values() {
        let mut settings = Settings::default();
        settings.categories[0].name = "other".into();
        assert!(matches!(settings.validate(), Err(ToolError::InvalidConfig(_))));

        let mut settings = Settings::default();
        settings.categories[1].weight = 120.0;
        assert!(matches!(settings.validate(), Err(ToolError::InvalidConfig(_))));

        let mut settings = Settings::default();
        settings.item_overrides.insert("Final Exam".into(), 0.0);
        assert!(matches!(settings.validate(), Err(ToolError::InvalidConfig(_))));
    }

    #[test]
    fn weight_total_reports_direction() {
        let mut settings = Settings::default();
        settings.other.weight = 10.0;
        assert_eq!(settings.weight_total(), WeightTotal::Over(110.0));
        settings.other.weight = 0.0;
        settings.categories[0].weight = 0.0;
        assert_eq!(settings.weight_total(), WeightTotal::Under(75.0));
    }
}
