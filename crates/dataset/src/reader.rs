use crate::cell::RawCell;
use crate::error::DatasetError;
use calamine::{Reader, open_workbook_auto};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

/// A header row plus untyped data rows, as read from one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Index of the header matching `name`, ignoring surrounding whitespace.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// The cell at (`row`, `col`); short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// The file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self, DatasetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(DatasetError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Reads any supported file into a [`RawTable`].
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::FileNotFound(path.to_path_buf()));
    }
    match SourceFormat::detect(path)? {
        SourceFormat::Csv => read_csv(path),
        SourceFormat::Spreadsheet => read_spreadsheet(path, sheet),
    }
}

/// Reads a comma-separated file. Rows may be ragged; blank lines are skipped.
pub fn read_csv(path: &Path) -> Result<RawTable, DatasetError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(RawCell::from_text).collect());
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

/// Reads one worksheet of a workbook; the first row is the header row.
pub fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<RawTable, DatasetError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s.as_str() == name) {
                return Err(DatasetError::SheetNotFound {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DatasetError::Empty(path.to_path_buf()))??,
    };

    let mut iter = range.rows();
    let headers = match iter.next() {
        Some(row) => row
            .iter()
            .map(|c| RawCell::from(c).to_label().unwrap_or_default())
            .collect(),
        None => return Err(DatasetError::Empty(path.to_path_buf())),
    };

    let rows = iter
        .map(|r| r.iter().map(RawCell::from).collect::<Vec<_>>())
        .filter(|r: &Vec<RawCell>| !r.iter().all(RawCell::is_empty))
        .collect();

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(SourceFormat::detect(Path::new("a.CSV")).unwrap(), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::detect(Path::new("book.xlsx")).unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::detect(Path::new("data.json")),
            Err(DatasetError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn csv_rows_are_trimmed_and_blank_lines_skipped() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "\u{feff}Data, Produto ,x").unwrap();
        writeln!(file, "2024-01-01, Urea ,").unwrap();
        writeln!(file, ",,").unwrap();
        writeln!(file, "2024-01-02,NPK").unwrap();

        let table = read_csv(file.path()).unwrap();
        assert_eq!(table.headers, vec!["Data", "Produto", "x"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), &RawCell::Text("Urea".into()));
        assert_eq!(table.cell(0, 2), &RawCell::Empty);
        // Ragged row: the missing third field reads as empty.
        assert_eq!(table.cell(1, 2), &RawCell::Empty);
        assert_eq!(table.position("Produto"), Some(1));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_table(Path::new("nope/missing.xlsx"), None).unwrap_err();
        assert!(matches!(err, DatasetError::FileNotFound(_)));
    }
}
