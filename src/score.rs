use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::CellValue;

/// Marker an instructor types in place of a grade to excuse the item.
pub const EXCUSED_MARKER: &str = "e";

/// Earned value of one gradebook item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum ScoreValue {
    /// Points earned. Malformed and empty cells normalise to `Points(0.0)`.
    Points(f64),
    /// Shown on the report but left out of every sum.
    Excused,
}

/// Normalised score of a (student, column) pair together with its max points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedScore {
    pub value: ScoreValue,
    pub max_points: f64,
}

impl NormalizedScore {
    pub fn is_excused(&self) -> bool {
        matches!(self.value, ScoreValue::Excused)
    }

    /// Earned points, or `None` for excused items.
    pub fn points(&self) -> Option<f64> {
        match self.value {
            ScoreValue::Points(points) => Some(points),
            ScoreValue::Excused => None,
        }
    }
}

/// Resolves the max points of `column`: its override when present, otherwise
/// the category default.
pub fn max_points_for(column: &str, category_max: f64, overrides: &BTreeMap<String, f64>) -> f64 {
    overrides.get(column).copied().unwrap_or(category_max)
}

/// Converts a raw grade cell into a [`NormalizedScore`].
///
/// An `E`/`e` cell is excused. Anything that does not read as a finite
/// number, including an empty cell, counts as zero points rather than an
/// error.
pub fn normalize(
    cell: &CellValue,
    column: &str,
    category_max: f64,
    overrides: &BTreeMap<String, f64>,
) -> NormalizedScore {
    let max_points = max_points_for(column, category_max, overrides);
    let value = if is_excused(cell) {
        ScoreValue::Excused
    } else {
        ScoreValue::Points(numeric_or_zero(cell))
    };
    NormalizedScore { value, max_points }
}

/// Converts a raw attendance cell into a number. Values are expected to be
/// `0` or `1`; other numbers pass through unchanged and non-numeric cells
/// count as `0`.
pub fn normalize_attendance(cell: &CellValue) -> f64 {
    numeric_or_zero(cell)
}

fn is_excused(cell: &CellValue) -> bool {
    match cell {
        CellValue::Text(text) => text.trim().to_lowercase() == EXCUSED_MARKER,
        _ => false,
    }
}

fn numeric_or_zero(cell: &CellValue) -> f64 {
    let parsed = match cell {
        CellValue::Number(value) => Some(*value),
        CellValue::Text(text) => text.trim().parse::<f64>().ok(),
        CellValue::Empty => None,
    };
    parsed.filter(|value| value.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(raw: &str) -> CellValue {
        CellValue::from_text(raw)
    }

    #[test]
    fn excused_marker_is_case_insensitive() {
        let none = BTreeMap::new();
        for raw in ["E", "e", "  E "] {
            let score = normalize(&cell(raw), "Quiz 1", 10.0, &none);
            assert!(score.is_excused());
            assert_eq!(score.points(), None);
            assert_eq!(score.max_points, 10.0);
        }
    }

    #[test]
    fn malformed_and_empty_cells_count_as_zero() {
        let none = BTreeMap::new();
        for raw in ["", "abc", "NaN", "inf", "8 5"] {
            let score = normalize(&cell(raw), "Quiz 1", 100.0, &none);
            assert_eq!(score.value, ScoreValue::Points(0.0), "{raw:?}");
        }
        let score = normalize(&CellValue::Empty, "Quiz 1", 100.0, &none);
        assert_eq!(score.value, ScoreValue::Points(0.0));
    }

    #[test]
    fn numbers_parse_from_text_and_numeric_cells() {
        let none = BTreeMap::new();
        let score = normalize(&cell("85"), "Exam 1", 100.0, &none);
        assert_eq!(score.value, ScoreValue::Points(85.0));
        assert_eq!(score.max_points, 100.0);

        let score = normalize(&CellValue::Number(7.5), "Exam 1", 100.0, &none);
        assert_eq!(score.points(), Some(7.5));
    }

    #[test]
    fn override_beats_category_default() {
        let overrides: BTreeMap<String, f64> = [("Final Exam".to_string(), 200.0)].into();
        let score = normalize(&cell("150"), "Final Exam", 100.0, &overrides);
        assert_eq!(score.max_points, 200.0);
        let excused = normalize(&cell("E"), "Final Exam", 100.0, &overrides);
        assert_eq!(excused.max_points, 200.0);
    }

    #[test]
    fn attendance_values_pass_through() {
        assert_eq!(normalize_attendance(&cell("1")), 1.0);
        assert_eq!(normalize_attendance(&CellValue::Number(0.0)), 0.0);
        assert_eq!(normalize_attendance(&cell("0.5")), 0.5);
        assert_eq!(normalize_attendance(&cell("2")), 2.0);
        assert_eq!(normalize_attendance(&cell("absent")), 0.0);
        assert_eq!(normalize_attendance(&CellValue::Empty), 0.0);
    }
}
