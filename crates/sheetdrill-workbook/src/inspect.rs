//! Reading uploaded workbooks.
//!
//! Uploads are held fully in memory and inspected through `calamine`; the
//! raw cell types are narrowed to the text/number surface the validators
//! actually compare against.

use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx};

/// A workbook cell, narrowed to what validators compare against.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A sheet's header row plus its data rows.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetTable {
    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First data row whose cell in `column` holds exactly `text`.
    pub fn find_row(&self, column: usize, text: &str) -> Option<&[CellValue]> {
        self.rows
            .iter()
            .find(|row| row.get(column).and_then(CellValue::as_text) == Some(text))
            .map(Vec::as_slice)
    }
}

/// An uploaded workbook, opened from in-memory bytes.
pub struct WorkbookFile {
    inner: Xlsx<Cursor<Vec<u8>>>,
}

impl WorkbookFile {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Xlsx::new(Cursor::new(bytes.to_vec()))
            .context("not a readable .xlsx workbook")?;
        Ok(Self { inner })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    /// Read a sheet as a header row plus data rows. The first row is taken
    /// as the header, matching how the questions describe the tables.
    pub fn sheet_table(&mut self, name: &str) -> Result<SheetTable> {
        let range = self
            .inner
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet '{name}'"))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        Ok(SheetTable { headers, rows })
    }
}
