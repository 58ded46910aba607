//! Column-keyed CSV tables.
//!
//! Cells are kept as text and parsed on access so the importers can tell a
//! blank cell (`None`) from a zero. Headers are trimmed; lookups are exact.

use std::fs::File;
use std::path::Path;

use gridstore_core::{GridError, GridResult};

/// Cell spellings read as "no value".
const BLANK: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "None"];

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a comma-separated file with a header row.
    pub fn read(path: &Path) -> GridResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        Self::from_reader(name, file)
    }

    pub fn from_reader<R: std::io::Read>(name: impl Into<String>, reader: R) -> GridResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.into(),
            headers,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn column_index(&self, column: &str) -> GridResult<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| GridError::missing_column(&self.name, column))
    }

    /// Fail on the first of `columns` the table does not have.
    pub fn require_columns(&self, columns: &[&str]) -> GridResult<()> {
        columns.iter().try_for_each(|c| self.column_index(c).map(|_| ()))
    }

    /// Headers after `marker`, with their indices.
    pub fn columns_after(&self, marker: &str) -> GridResult<Vec<(usize, &str)>> {
        let start = self.column_index(marker)? + 1;
        Ok(self.headers[start..]
            .iter()
            .enumerate()
            .map(|(offset, header)| (start + offset, header.as_str()))
            .collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(move |(index, cells)| Row {
            table: self,
            index,
            cells,
        })
    }

    /// Every value of the column at `index`, as numbers.
    pub fn numeric_column(&self, index: usize) -> GridResult<Vec<f64>> {
        self.rows().map(|row| row.f64_at(index)).collect()
    }

    /// Every value of the named column, as raw text.
    pub fn text_column(&self, column: &str) -> GridResult<Vec<&str>> {
        let index = self.column_index(column)?;
        Ok(self.rows().map(|row| row.cell(index)).collect())
    }
}

/// One data row of a [`CsvTable`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a CsvTable,
    index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Zero-based position among the data rows.
    pub fn index(&self) -> usize {
        self.index
    }

    fn cell(&self, index: usize) -> &'a str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    fn parse_error(&self, column: &str, raw: &str, what: &str) -> GridError {
        GridError::Parse(format!(
            "{} row {}: '{}' in column '{}' is not {}",
            self.table.name,
            self.index + 1,
            raw,
            column,
            what
        ))
    }

    pub fn text(&self, column: &str) -> GridResult<&'a str> {
        Ok(self.cell(self.table.column_index(column)?))
    }

    /// Text of an optional column; blank cells and absent columns are `None`.
    pub fn opt_text(&self, column: &str) -> Option<&'a str> {
        let index = self.table.headers.iter().position(|h| h == column)?;
        let raw = self.cell(index);
        (!BLANK.contains(&raw)).then_some(raw)
    }

    pub fn f64(&self, column: &str) -> GridResult<f64> {
        self.opt_f64(column)?
            .ok_or_else(|| self.parse_error(column, "", "a number"))
    }

    /// Number in `column`, `None` when the cell is blank.
    pub fn opt_f64(&self, column: &str) -> GridResult<Option<f64>> {
        let raw = self.cell(self.table.column_index(column)?);
        if BLANK.contains(&raw) {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| self.parse_error(column, raw, "a number"))
    }

    /// Like [`opt_f64`](Self::opt_f64), with an absent column read as blank.
    pub fn maybe_f64(&self, column: &str) -> GridResult<Option<f64>> {
        if self.table.has_column(column) {
            self.opt_f64(column)
        } else {
            Ok(None)
        }
    }

    fn f64_at(&self, index: usize) -> GridResult<f64> {
        let raw = self.cell(index);
        raw.parse::<f64>().map_err(|_| {
            let column = self.table.headers.get(index).map(String::as_str).unwrap_or("?");
            self.parse_error(column, raw, "a number")
        })
    }

    /// Integer in `column`; integral floats such as `101.0` are accepted.
    pub fn i64(&self, column: &str) -> GridResult<i64> {
        let raw = self.text(column)?;
        if let Ok(value) = raw.parse::<i64>() {
            return Ok(value);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.is_finite() => Ok(value as i64),
            _ => Err(self.parse_error(column, raw, "an integer")),
        }
    }
}
