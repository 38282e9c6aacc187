use crate::aggregate::StudentGrades;
use crate::config::Settings;
use crate::model::StudentRecord;
use crate::score::{NormalizedScore, ScoreValue};

use super::{
    BODY_STYLE, CATEGORY_FILL, CellContent, CellStyle, EXCUSED_FILL, FINAL_FILL, Grid, HEADER_STYLE,
    POSITIVE_FILL, SheetLayout, VALUE_STYLE, WEIGHT_FILL, ZERO_FILL, format_percent,
    format_weight, round2,
};

/// Column widths: label column first, then the value columns.
pub const GRADE_COLUMN_WIDTHS: [f64; 4] = [35.0, 15.0, 15.0, 15.0];

const EXCUSED_LABEL: &str = "Excused";
const CATEGORY_BANNER_STYLE: CellStyle = CellStyle::PLAIN.bold(11.0).fill(CATEGORY_FILL).bordered();
const WEIGHT_HEADER_STYLE: CellStyle = CellStyle::PLAIN
    .bold(11.0)
    .fill(WEIGHT_FILL)
    .bordered()
    .centered();
const FINAL_LABEL_STYLE: CellStyle = CellStyle::PLAIN.bold(12.0).fill(FINAL_FILL).bordered();

/// Optional sections of a grade sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOptions {
    pub show_category_averages: bool,
    pub show_weighted_grades: bool,
}

impl LayoutOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            show_category_averages: settings.show_category_averages,
            show_weighted_grades: settings.has_weights(),
        }
    }
}

/// Lays out one student's grade sheet.
pub fn grade_sheet(
    name: String,
    student: &StudentRecord,
    grades: &StudentGrades,
    options: LayoutOptions,
) -> SheetLayout {
    let mut grid = Grid::default();
    grid.identity_block(student);

    for (col, title) in ["Assignment", "Score", "Max Points"].into_iter().enumerate() {
        grid.put(col as u16, title, HEADER_STYLE.centered());
    }
    grid.next_row();

    for (category, result) in &grades.categories {
        grid.banner(2, category.to_uppercase(), CATEGORY_BANNER_STYLE);
        grid.next_row();

        for item in &result.items {
            grid.put(0, item.column.as_str(), BODY_STYLE);
            write_score(&mut grid, &item.score);
            grid.next_row();
        }
    }
    grid.next_row();

    let averaged: Vec<_> = grades
        .categories
        .iter()
        .filter(|(_, result)| result.has_percentage())
        .collect();

    if options.show_category_averages && !averaged.is_empty() {
        grid.banner(2, "CATEGORY AVERAGES (%)", HEADER_STYLE);
        grid.next_row();
        for (category, result) in &averaged {
            grid.put(0, category.as_str(), BODY_STYLE);
            grid.put(1, format_percent(result.percentage), VALUE_STYLE);
            grid.put(2, CellContent::Blank, BODY_STYLE);
            grid.next_row();
        }
        grid.next_row();
    }

    let final_grade = &grades.final_grade;
    if options.show_weighted_grades && !final_grade.components.is_empty() {
        grid.banner(3, "WEIGHTED GRADES", HEADER_STYLE);
        grid.next_row();

        for (col, title) in ["Category", "Score (%)", "Weight (%)", "Weighted Score"]
            .into_iter()
            .enumerate()
        {
            grid.put(col as u16, title, WEIGHT_HEADER_STYLE);
        }
        grid.next_row();

        for component in &final_grade.components {
            grid.put(0, component.category.as_str(), BODY_STYLE);
            grid.put(1, format_percent(component.percentage), VALUE_STYLE);
            grid.put(2, format_weight(component.weight), VALUE_STYLE);
            grid.put(3, round2(component.weighted), VALUE_STYLE);
            grid.next_row();
        }
        grid.next_row();

        grid.put(0, "FINAL WEIGHTED GRADE", FINAL_LABEL_STYLE);
        grid.put(
            1,
            format_percent(final_grade.weighted_total),
            FINAL_LABEL_STYLE.centered(),
        );
        grid.put(
            2,
            format!("(of {})", format_weight(final_grade.weight_used)),
            FINAL_LABEL_STYLE.centered(),
        );
        grid.put(3, CellContent::Blank, FINAL_LABEL_STYLE);
        grid.next_row();
        grid.next_row();
    }

    let excused = grades.excused_count();
    if excused > 0 {
        let style = CellStyle::PLAIN.bold(11.0).fill(EXCUSED_FILL).bordered();
        grid.put(0, "EXCUSED ASSIGNMENTS", style);
        grid.put(1, excused as f64, style.centered());
    }

    grid.finish(name, &GRADE_COLUMN_WIDTHS)
}

/// Score and max-points cells of an item row. The score cell is filled
/// amber when excused, red when zero or below, green otherwise.
fn write_score(grid: &mut Grid, score: &NormalizedScore) {
    match score.value {
        ScoreValue::Excused => {
            grid.put(1, EXCUSED_LABEL, VALUE_STYLE.fill(EXCUSED_FILL));
            grid.put(2, EXCUSED_LABEL, VALUE_STYLE);
        }
        ScoreValue::Points(points) => {
            let fill = if points > 0.0 { POSITIVE_FILL } else { ZERO_FILL };
            grid.put(1, points, VALUE_STYLE.fill(fill));
            grid.put(2, score.max_points, VALUE_STYLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::classify::classify;
    use crate::config::CategorySettings;
    use crate::layout::CellInstruction;
    use crate::model::{CellValue, Dataset, IdentityColumns};

    fn fixture() -> (Dataset, Settings) {
        let dataset = Dataset::new(
            vec![
                "ID".into(),
                "First".into(),
                "Last".into(),
                "Exam 1".into(),
                "Exam 2".into(),
                "Lab".into(),
            ],
            vec![vec![
                CellValue::Number(7.0),
                CellValue::from_text("Ana"),
                CellValue::from_text("Lopez"),
                CellValue::Number(90.0),
                CellValue::from_text("E"),
                CellValue::from_text(""),
            ]],
        )
        .expect("dataset");
        let settings = Settings {
            categories: vec![CategorySettings {
                name: "Exams".into(),
                keywords: vec!["exam".into()],
                max_points: 100.0,
                weight: 60.0,
            }],
            show_category_averages: true,
            ..Settings::default()
        };
        (dataset, settings)
    }

    fn render(dataset: &Dataset, settings: &Settings) -> SheetLayout {
        let identity = IdentityColumns::leading(dataset);
        let student = StudentRecord::from_row(dataset, &identity, 0);
        let classification = classify(&identity.remaining(dataset), &settings.keyword_map());
        let grades = aggregate(dataset, 0, &classification, settings);
        grade_sheet(
            "Lopez, Ana".into(),
            &student,
            &grades,
            LayoutOptions::from_settings(settings),
        )
    }

    fn find<'a>(sheet: &'a SheetLayout, text: &str) -> &'a CellInstruction {
        sheet
            .cells
            .iter()
            .find(|cell| cell.content == CellContent::Text(text.to_string()))
            .unwrap_or_else(|| panic!("no cell with {text:?}"))
    }

    fn at(sheet: &SheetLayout, row: u32, col: u16) -> &CellInstruction {
        sheet
            .cells
            .iter()
            .find(|cell| cell.row == row && cell.col == col)
            .unwrap_or_else(|| panic!("no cell at {row},{col}"))
    }

    #[test]
    fn sections_follow_fixed_order() {
        let (dataset, settings) = fixture();
        let sheet = render(&dataset, &settings);

        assert_eq!(at(&sheet, 0, 1).content, CellContent::Text("7".into()));
        assert_eq!(at(&sheet, 2, 0).content, CellContent::Text("Last Name:".into()));
        assert_eq!(at(&sheet, 4, 0).content, CellContent::Text("Assignment".into()));

        let exams = find(&sheet, "EXAMS");
        assert_eq!((exams.row, exams.merge_through), (5, Some(2)));
        assert_eq!(find(&sheet, "OTHER").row, 8);

        let averages = find(&sheet, "CATEGORY AVERAGES (%)").row;
        let weighted = find(&sheet, "WEIGHTED GRADES").row;
        let final_row = find(&sheet, "FINAL WEIGHTED GRADE").row;
        let excused = find(&sheet, "EXCUSED ASSIGNMENTS").row;
        assert!(averages > 9 && averages < weighted && weighted < final_row && final_row < excused);

        assert_eq!(sheet.column_widths, GRADE_COLUMN_WIDTHS.to_vec());
    }

    #[test]
    fn item_rows_use_tri_state_fill() {
        let (dataset, settings) = fixture();
        let sheet = render(&dataset, &settings);

        let positive = at(&sheet, 6, 1);
        assert_eq!(positive.content, CellContent::Number(90.0));
        assert_eq!(positive.style.fill, Some(POSITIVE_FILL));

        let excused = at(&sheet, 7, 1);
        assert_eq!(excused.content, CellContent::Text("Excused".into()));
        assert_eq!(excused.style.fill, Some(EXCUSED_FILL));
        assert_eq!(at(&sheet, 7, 2).content, CellContent::Text("Excused".into()));

        let zero = at(&sheet, 9, 1);
        assert_eq!(zero.content, CellContent::Number(0.0));
        assert_eq!(zero.style.fill, Some(ZERO_FILL));
    }

    #[test]
    fn final_row_reports_weight_used() {
        let (dataset, settings) = fixture();
        let sheet = render(&dataset, &settings);

        let final_row = find(&sheet, "FINAL WEIGHTED GRADE").row;
        assert_eq!(at(&sheet, final_row, 1).content, CellContent::Text("54.0%".into()));
        assert_eq!(at(&sheet, final_row, 2).content, CellContent::Text("(of 60%)".into()));
        assert_eq!(at(&sheet, final_row, 0).style.fill, Some(FINAL_FILL));
    }

    #[test]
    fn optional_sections_can_be_hidden() {
        let (dataset, mut settings) = fixture();
        settings.show_category_averages = false;
        settings.categories[0].weight = 0.0;
        let sheet = render(&dataset, &settings);

        for hidden in ["CATEGORY AVERAGES (%)", "WEIGHTED GRADES", "FINAL WEIGHTED GRADE"] {
            assert!(
                !sheet
                    .cells
                    .iter()
                    .any(|cell| cell.content == CellContent::Text(hidden.into())),
                "{hidden} should be hidden"
            );
        }
        assert_eq!(find(&sheet, "EXCUSED ASSIGNMENTS").row, 11);
    }
}
