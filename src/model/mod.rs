use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Raw value of a single source cell as produced by the decoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Missing or blank cell.
    Empty,
    /// Textual cell content, kept verbatim.
    Text(String),
    /// Numeric cell content.
    Number(f64),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Builds a cell from decoded text, mapping blank strings to [`CellValue::Empty`].
    pub fn from_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw)
        }
    }

    /// Renders the cell as trimmed display text. Whole numbers lose their
    /// fractional part so that an ID of `1042.0` prints as `1042`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(value) => value.trim().to_string(),
            CellValue::Number(value) => format_number(*value),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// Formats a number without a trailing `.0` when it is integral.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One rectangular table with a header row.
///
/// Column names are unique and non-empty; every row holds exactly one cell per
/// column. The decoders in [`crate::io`] establish these invariants before a
/// dataset reaches the report engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Creates a dataset, padding or truncating rows to the header width.
    ///
    /// Fails when there are no columns or no data rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ToolError::EmptyDataset("no header columns".into()));
        }
        if rows.is_empty() {
            return Err(ToolError::EmptyDataset("no data rows".into()));
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the cell at `row` for the named column, or an empty cell when
    /// either is out of range.
    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.column_index(column)
            .and_then(|col| self.rows.get(row).and_then(|cells| cells.get(col)))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Names of the columns that identify a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityColumns {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl IdentityColumns {
    /// Picks the first three dataset columns (or the first column repeated
    /// when fewer exist), which is how exports are usually laid out.
    pub fn leading(dataset: &Dataset) -> Self {
        let columns = dataset.columns();
        let pick = |idx: usize| {
            columns
                .get(idx)
                .or_else(|| columns.first())
                .cloned()
                .unwrap_or_default()
        };
        Self {
            id: pick(0),
            first_name: pick(1),
            last_name: pick(2),
        }
    }

    /// Verifies every identity column exists in the dataset.
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        for name in [&self.id, &self.first_name, &self.last_name] {
            if dataset.column_index(name).is_none() {
                return Err(ToolError::MissingColumn(name.clone()));
            }
        }
        Ok(())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.id == column || self.first_name == column || self.last_name == column
    }

    /// Columns left over once the identity columns are removed, in dataset order.
    pub fn remaining<'a>(&self, dataset: &'a Dataset) -> Vec<&'a str> {
        dataset
            .columns()
            .iter()
            .filter(|column| !self.contains(column))
            .map(String::as_str)
            .collect()
    }
}

/// Identity columns requested by the user; unset entries fall back to
/// [`IdentityColumns::leading`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySelection {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl IdentitySelection {
    pub fn resolve(&self, dataset: &Dataset) -> Result<IdentityColumns> {
        let leading = IdentityColumns::leading(dataset);
        let identity = IdentityColumns {
            id: self.id.clone().unwrap_or(leading.id),
            first_name: self.first_name.clone().unwrap_or(leading.first_name),
            last_name: self.last_name.clone().unwrap_or(leading.last_name),
        };
        identity.validate(dataset)?;
        Ok(identity)
    }
}

/// A dataset row viewed through its identity columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
    /// Zero-based data row index (the header row is not counted).
    pub row_index: usize,
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl StudentRecord {
    pub fn from_row(dataset: &Dataset, identity: &IdentityColumns, row_index: usize) -> Self {
        Self {
            row_index,
            id: dataset.cell(row_index, &identity.id).to_text(),
            first_name: dataset.cell(row_index, &identity.first_name).to_text(),
            last_name: dataset.cell(row_index, &identity.last_name).to_text(),
        }
    }

    /// A row is a student when at least one identity value is present.
    pub fn is_valid(&self) -> bool {
        !(self.id.is_empty() && self.first_name.is_empty() && self.last_name.is_empty())
    }
}

/// Collects the valid student rows of a dataset in source order.
pub fn students(dataset: &Dataset, identity: &IdentityColumns) -> Result<Vec<StudentRecord>> {
    identity.validate(dataset)?;
    Ok((0..dataset.row_count())
        .map(|row| StudentRecord::from_row(dataset, identity, row))
        .filter(StudentRecord::is_valid)
        .collect())
}
