use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{CategoryKeywordMap, OTHER_CATEGORY};

/// Outcome of keyword classification. Every input column lands in exactly
/// one category list or in `uncategorized`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Categories that matched at least one column, in keyword-map order.
    pub categorized: IndexMap<String, Vec<String>>,
    pub uncategorized: Vec<String>,
}

impl Classification {
    /// Iterates the column groups in report order: matched categories first,
    /// then [`OTHER_CATEGORY`] when anything is left unmatched.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        let other = (!self.uncategorized.is_empty())
            .then_some((OTHER_CATEGORY, self.uncategorized.as_slice()));
        self.categorized
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
            .chain(other)
    }

    pub fn column_count(&self) -> usize {
        self.categorized.values().map(Vec::len).sum::<usize>() + self.uncategorized.len()
    }
}

/// Assigns each column to the first category owning a keyword that occurs in
/// the column name, ignoring case.
pub fn classify<S: AsRef<str>>(columns: &[S], keywords: &CategoryKeywordMap) -> Classification {
    let mut classification = Classification::default();

    for column in columns {
        let column = column.as_ref();
        match match_category(column, keywords) {
            Some(category) => classification
                .categorized
                .entry(category.to_string())
                .or_default()
                .push(column.to_string()),
            None => classification.uncategorized.push(column.to_string()),
        }
    }

    classification
}

fn match_category<'a>(column: &str, keywords: &'a CategoryKeywordMap) -> Option<&'a str> {
    let lowered = column.to_lowercase();
    keywords
        .iter()
        .find(|(_, candidates)| {
            candidates
                .iter()
                .filter(|keyword| !keyword.is_empty())
                .any(|keyword| lowered.contains(&keyword.to_lowercase()))
        })
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(groups: Vec<(&str, Vec<&str>)>) -> CategoryKeywordMap {
        groups.into_iter().collect()
    }

    #[test]
    fn earlier_category_wins_ambiguous_names() {
        let columns = ["Final Exam Quiz"];

        let exams_first = map(vec![("Exams", vec!["exam"]), ("Quizzes", vec!["quiz"])]);
        let result = classify(&columns, &exams_first);
        assert_eq!(result.categorized["Exams"], vec!["Final Exam Quiz"]);

        let quizzes_first = map(vec![("Quizzes", vec!["quiz"]), ("Exams", vec!["exam"])]);
        let result = classify(&columns, &quizzes_first);
        assert_eq!(result.categorized["Quizzes"], vec!["Final Exam Quiz"]);
    }

    #[test]
    fn keyword_order_within_category_does_not_matter() {
        let columns = ["HW 1", "Homework 2", "Essay"];
        let forward = classify(&columns, &map(vec![("Assignments", vec!["hw", "homework"])]));
        let backward = classify(&columns, &map(vec![("Assignments", vec!["homework", "hw"])]));
        assert_eq!(forward, backward);
        assert_eq!(forward.uncategorized, vec!["Essay"]);
    }

    #[test]
    fn every_column_is_assigned_once() {
        let columns = [
            "Midterm", "Quiz 1", "quiz 2", "Lab", "", "EXAM final", "Participation 3/4",
        ];
        let keywords = map(vec![
            ("Exams", vec!["exam", "midterm"]),
            ("Quizzes", vec!["QUIZ"]),
            ("Blank", vec![""]),
        ]);
        let result = classify(&columns, &keywords);

        assert_eq!(result.column_count(), columns.len());
        for column in columns {
            let hits = result
                .groups()
                .filter(|(_, members)| members.iter().any(|member| member == column))
                .count();
            assert_eq!(hits, 1, "{column} assigned {hits} times");
        }
        assert!(!result.categorized.contains_key("Blank"));
        assert_eq!(result.categorized["Quizzes"], vec!["Quiz 1", "quiz 2"]);
    }

    #[test]
    fn groups_put_other_last() {
        let result = classify(&["Lab", "Exam 1"], &map(vec![("Exams", vec!["exam"])]));
        let names: Vec<&str> = result.groups().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Exams", OTHER_CATEGORY]);
    }
}
