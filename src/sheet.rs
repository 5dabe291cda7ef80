use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{Result, WonbookError};

/// A single cell as the pipeline sees it, independent of whether the source
/// was a workbook or a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed display text, None when blank. Numbers render without a
    /// trailing `.0` so digit scans see `20251105`, not `20251105.0`.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let t = s.trim().trim_start_matches('\u{feff}').trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            Cell::Number(f) => Some(format_number(*f)),
        }
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            // Issuer exports carry dates as text; when a cell does arrive
            // typed, render it the way the text cells look.
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => Cell::Text(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Cell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// One sheet's worth of raw cells. CSV input becomes a single unnamed sheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Concatenate a row's non-blank cells into one text blob, the unit the
/// classifier and header locator scan.
pub fn row_text(row: &[Cell]) -> String {
    row.iter()
        .filter_map(|c| c.text())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn load_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| WonbookError::Workbook(e.to_string()))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| WonbookError::Workbook(e.to_string()))?;
        let rows = range
            .rows()
            .map(|r| r.iter().map(Cell::from).collect())
            .collect();
        sheets.push(Sheet { name, rows });
    }
    Ok(sheets)
}

pub fn load_csv(path: &Path) -> Result<Sheet> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }
    Ok(Sheet {
        name: String::new(),
        rows,
    })
}
