use indexmap::IndexMap;
use serde::Serialize;

use crate::classify::Classification;
use crate::config::Settings;
use crate::model::Dataset;
use crate::score::{NormalizedScore, normalize};

/// One graded item of a student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    pub column: String,
    pub score: NormalizedScore,
}

/// Totals of one category for one student. Excused items are listed in
/// `items` but count toward neither `earned` nor `possible`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub items: Vec<ItemScore>,
    pub earned: f64,
    pub possible: f64,
    /// `earned / possible * 100`, or 0 when nothing is possible.
    pub percentage: f64,
    /// Number of non-excused items.
    pub scored: usize,
    pub excused: usize,
}

impl CategoryResult {
    /// Sums the non-excused items of a category.
    pub fn from_items(items: Vec<ItemScore>) -> Self {
        let mut earned = 0.0;
        let mut possible = 0.0;
        let mut scored = 0;
        let mut excused = 0;

        for item in &items {
            match item.score.points() {
                Some(points) => {
                    earned += points;
                    possible += item.score.max_points;
                    scored += 1;
                }
                None => excused += 1,
            }
        }

        let percentage = if possible > 0.0 {
            earned / possible * 100.0
        } else {
            0.0
        };

        Self {
            items,
            earned,
            possible,
            percentage,
            scored,
            excused,
        }
    }

    /// A category feeds averages and weighting only when at least one item
    /// was actually scored.
    pub fn has_percentage(&self) -> bool {
        self.scored > 0
    }
}

/// Contribution of one category to the final grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedComponent {
    pub category: String,
    pub percentage: f64,
    pub weight: f64,
    pub weighted: f64,
}

/// Weighted final grade plus the total weight that was actually applied, so a
/// caller can spot configurations that do not add up to 100%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalGrade {
    pub components: Vec<WeightedComponent>,
    pub weighted_total: f64,
    pub weight_used: f64,
}

/// Per-category results in report order plus the final grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentGrades {
    pub categories: IndexMap<String, CategoryResult>,
    pub final_grade: FinalGrade,
}

impl StudentGrades {
    pub fn excused_count(&self) -> usize {
        self.categories.values().map(|result| result.excused).sum()
    }
}

/// Scores every classified column for the student at `row` and derives the
/// category totals and the weighted final grade.
pub fn aggregate(
    dataset: &Dataset,
    row: usize,
    classification: &Classification,
    settings: &Settings,
) -> StudentGrades {
    let mut categories = IndexMap::new();

    for (category, columns) in classification.groups() {
        if columns.is_empty() {
            continue;
        }
        let category_max = settings.category_config(category).max_points;
        let items = columns
            .iter()
            .map(|column| ItemScore {
                column: column.clone(),
                score: normalize(
                    dataset.cell(row, column),
                    column,
                    category_max,
                    &settings.item_overrides,
                ),
            })
            .collect();
        categories.insert(category.to_string(), CategoryResult::from_items(items));
    }

    let final_grade = final_grade(&categories, settings);
    StudentGrades {
        categories,
        final_grade,
    }
}

/// Combines category percentages using the configured weights.
pub fn final_grade(categories: &IndexMap<String, CategoryResult>, settings: &Settings) -> FinalGrade {
    let mut components = Vec::new();
    let mut weighted_total = 0.0;
    let mut weight_used = 0.0;

    for (category, result) in categories {
        if !result.has_percentage() {
            continue;
        }
        let weight = settings.category_config(category).weight;
        let weighted = if weight > 0.0 {
            result.percentage * weight / 100.0
        } else {
            0.0
        };
        weighted_total += weighted;
        weight_used += weight;
        components.push(WeightedComponent {
            category: category.clone(),
            percentage: result.percentage,
            weight,
            weighted,
        });
    }

    FinalGrade {
        components,
        weighted_total,
        weight_used,
    }
}
