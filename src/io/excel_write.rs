use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::layout::{CellContent, CellInstruction, CellStyle, ReportWorkbook, SheetLayout};

/// Writes the provided report to the given path, one worksheet per sheet layout.
pub fn write_workbook(path: &Path, report: &ReportWorkbook) -> Result<()> {
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    Ok(())
}

/// Renders the report into an in-memory `.xlsx` file.
pub fn workbook_bytes(report: &ReportWorkbook) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(report)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(report: &ReportWorkbook) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        write_sheet(worksheet, sheet)?;
    }
    Ok(workbook)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetLayout) -> Result<()> {
    worksheet.set_name(&sheet.name)?;

    for (col, width) in sheet.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for cell in &sheet.cells {
        write_cell(worksheet, cell)?;
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, cell: &CellInstruction) -> Result<()> {
    let format = to_format(&cell.style);

    if let Some(last_col) = cell.merge_through {
        let text = match &cell.content {
            CellContent::Text(text) => text.clone(),
            CellContent::Number(value) => value.to_string(),
            CellContent::Blank => String::new(),
        };
        worksheet.merge_range(cell.row, cell.col, cell.row, last_col, &text, &format)?;
        return Ok(());
    }

    match &cell.content {
        CellContent::Text(text) => {
            worksheet.write_string_with_format(cell.row, cell.col, text, &format)?;
        }
        CellContent::Number(value) => {
            worksheet.write_number_with_format(cell.row, cell.col, *value, &format)?;
        }
        CellContent::Blank => {
            worksheet.write_blank(cell.row, cell.col, &format)?;
        }
    }
    Ok(())
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color));
    }
    if let Some(fill) = style.fill {
        format = format.set_background_color(Color::RGB(fill));
    }
    if style.border {
        format = format.set_border(FormatBorder::Thin);
    }
    if style.centered {
        format = format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    format
}
