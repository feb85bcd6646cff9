//! Record loader for CSV and spreadsheet input.
//!
//! Both formats are reduced to a header row plus string cells, then mapped
//! onto [`ProspectRecord`]s by column name.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::types::record::{ProspectRecord, REQUIRED_COLUMNS};

/// Spreadsheet extensions handed to calamine.
const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

/// Header row plus stringified cells, independent of the source format.
#[derive(Debug, Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Load prospect records from a `.csv` or spreadsheet file.
pub fn load_records(path: &Path) -> Result<Vec<ProspectRecord>, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let table = if extension == "csv" {
        let file = std::fs::File::open(path)?;
        read_csv(file)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path)?
    } else {
        return Err(LoadError::UnsupportedFormat { extension });
    };

    let records = records_from_table(table)?;
    info!(path = %path.display(), count = records.len(), "Loaded prospect records");
    Ok(records)
}

/// Load prospect records from CSV text.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Vec<ProspectRecord>, LoadError> {
    records_from_table(read_csv(reader)?)
}

/// Names of required columns absent from `headers`, in canonical order.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref().trim() == **required))
        .map(|c| c.to_string())
        .collect()
}

fn read_csv<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        rows.push(row.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn read_workbook(path: &Path) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)??;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows
        .next()
        .map(|h| h.into_iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();

    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        // Integral floats (phone numbers, ids) lose the trailing ".0"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn is_blank(record: &ProspectRecord) -> bool {
    [
        &record.company_name,
        &record.head_name,
        &record.head_email,
        &record.website,
        &record.linkedin_url,
    ]
    .iter()
    .all(|v| v.trim().is_empty())
}

fn records_from_table(table: Table) -> Result<Vec<ProspectRecord>, LoadError> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    // Every required column is present, so each position lookup succeeds.
    let positions: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|column| table.headers.iter().position(|h| h.trim() == *column))
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let cell = |col: usize| row.get(positions[col]).cloned().unwrap_or_default();
        let record = ProspectRecord {
            company_name: cell(0),
            head_name: cell(1),
            head_email: cell(2),
            website: cell(3),
            linkedin_url: cell(4),
        };

        if is_blank(&record) {
            debug!(row = idx + 1, "Skipping blank row");
            continue;
        }
        if record.company_name.trim().is_empty() {
            warn!(
                row = idx + 1,
                head_name = %record.head_name,
                "Skipping row with empty company_name"
            );
            continue;
        }

        records.push(record);
    }

    Ok(records)
}
