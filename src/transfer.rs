use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::aggregate;
use crate::classify::{Classification, classify};
use crate::config::{Settings, WeightTotal};
use crate::dates::detect_dates;
use crate::error::{Result, ToolError};
use crate::io::{excel_write, table_read};
use crate::layout::{LayoutOptions, ReportWorkbook, attendance_sheet, grade_sheet};
use crate::model::{Dataset, IdentityColumns, IdentitySelection, StudentRecord, students};
use crate::naming::SheetNameAllocator;
use crate::score::normalize_attendance;

/// Counts reported after a workbook has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub sheets: usize,
    pub skipped_rows: usize,
}

/// What the tool would do with a source file, without writing anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub rows: usize,
    pub columns: usize,
    pub identity: IdentityColumns,
    pub valid_students: usize,
    pub classification: Classification,
    pub date_columns: Vec<String>,
    pub weight_total: WeightTotal,
}

/// Builds one grade sheet per valid student row.
pub fn build_grade_report(
    dataset: &Dataset,
    identity: &IdentityColumns,
    settings: &Settings,
) -> Result<ReportWorkbook> {
    let students = students(dataset, identity)?;
    let classification = classify(&identity.remaining(dataset), &settings.keyword_map());
    let options = LayoutOptions::from_settings(settings);
    let mut names = SheetNameAllocator::new();

    let sheets = students
        .iter()
        .map(|student| {
            let grades = aggregate(dataset, student.row_index, &classification, settings);
            let name = allocate_name(&mut names, student);
            debug!(
                sheet = %name,
                final_grade = grades.final_grade.weighted_total,
                "laid out grade sheet"
            );
            grade_sheet(name, student, &grades, options)
        })
        .collect();

    Ok(ReportWorkbook { sheets })
}

/// Builds one attendance sheet per valid student row over `columns`.
pub fn build_attendance_report(
    dataset: &Dataset,
    identity: &IdentityColumns,
    columns: &[String],
) -> Result<ReportWorkbook> {
    if columns.is_empty() {
        return Err(ToolError::EmptyDataset("no attendance columns selected".into()));
    }
    if let Some(missing) = columns.iter().find(|column| dataset.column_index(column).is_none()) {
        return Err(ToolError::MissingColumn(missing.clone()));
    }

    let students = students(dataset, identity)?;
    let mut names = SheetNameAllocator::new();

    let sheets = students
        .iter()
        .map(|student| {
            let records: Vec<(String, f64)> = columns
                .iter()
                .map(|column| {
                    let value = normalize_attendance(dataset.cell(student.row_index, column));
                    (column.clone(), value)
                })
                .collect();
            let name = allocate_name(&mut names, student);
            debug!(sheet = %name, days = records.len(), "laid out attendance sheet");
            attendance_sheet(name, student, &records)
        })
        .collect();

    Ok(ReportWorkbook { sheets })
}

/// Columns pre-selected for attendance: detected date headers, or every
/// non-identity column when none is detected.
pub fn default_attendance_columns(dataset: &Dataset, identity: &IdentityColumns) -> Vec<String> {
    let exclude: HashSet<String> = [&identity.id, &identity.first_name, &identity.last_name]
        .into_iter()
        .cloned()
        .collect();
    let detected = detect_dates(dataset.columns(), &exclude);
    if !detected.is_empty() {
        return detected;
    }
    warn!("no date columns detected, using every non-identity column");
    identity
        .remaining(dataset)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Converts a gradebook export into a workbook with one grade sheet per student.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn grades_to_excel(
    input: &Path,
    output: &Path,
    selection: &IdentitySelection,
    settings: &Settings,
) -> Result<RunSummary> {
    let dataset = table_read::read_dataset(input)?;
    info!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "read source table"
    );
    let identity = selection.resolve(&dataset)?;
    settings.report_weight_total();

    let report = build_grade_report(&dataset, &identity, settings)?;
    let summary = summarize(&dataset, &report);
    info!(sheets = summary.sheets, skipped = summary.skipped_rows, "grade report built");
    excel_write::write_workbook(output, &report)?;
    Ok(summary)
}

/// Converts an attendance export into a workbook with one attendance sheet per student.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn attendance_to_excel(
    input: &Path,
    output: &Path,
    selection: &IdentitySelection,
    columns: Option<&[String]>,
) -> Result<RunSummary> {
    let dataset = table_read::read_dataset(input)?;
    info!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "read source table"
    );
    let identity = selection.resolve(&dataset)?;

    let columns = match columns {
        Some(columns) => columns.to_vec(),
        None => default_attendance_columns(&dataset, &identity),
    };
    info!(days = columns.len(), "attendance columns selected");

    let report = build_attendance_report(&dataset, &identity, &columns)?;
    let summary = summarize(&dataset, &report);
    info!(sheets = summary.sheets, skipped = summary.skipped_rows, "attendance report built");
    excel_write::write_workbook(output, &report)?;
    Ok(summary)
}

/// Reports how a source file would be processed.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn inspect(input: &Path, selection: &IdentitySelection, settings: &Settings) -> Result<Inspection> {
    let dataset = table_read::read_dataset(input)?;
    let identity = selection.resolve(&dataset)?;
    let valid_students = students(&dataset, &identity)?.len();
    let classification = classify(&identity.remaining(&dataset), &settings.keyword_map());
    let exclude: HashSet<String> = [&identity.id, &identity.first_name, &identity.last_name]
        .into_iter()
        .cloned()
        .collect();
    let date_columns = detect_dates(dataset.columns(), &exclude);

    Ok(Inspection {
        rows: dataset.row_count(),
        columns: dataset.columns().len(),
        identity,
        valid_students,
        classification,
        date_columns,
        weight_total: settings.weight_total(),
    })
}

fn allocate_name(names: &mut SheetNameAllocator, student: &StudentRecord) -> String {
    names.allocate(&student.last_name, &student.first_name, student.row_index)
}

fn summarize(dataset: &Dataset, report: &ReportWorkbook) -> RunSummary {
    let sheets = report.sheets.len();
    let skipped_rows = dataset.row_count() - sheets;
    if skipped_rows > 0 {
        warn!(skipped_rows, "rows without ID or name were skipped");
    }
    RunSummary {
        sheets,
        skipped_rows,
    }
}
