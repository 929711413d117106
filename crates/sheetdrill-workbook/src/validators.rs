//! Named structural validators for file questions.
//!
//! A validator never fails: any read or parse problem with the upload is an
//! incorrect answer with an explanatory message. Question sets reference
//! validators by name through the registry.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use sheetdrill_core::traits::FileValidator;

use crate::dataset;
use crate::inspect::WorkbookFile;

/// All validators the default question sets can reference.
pub fn registry() -> HashMap<String, Arc<dyn FileValidator>> {
    let mut map: HashMap<String, Arc<dyn FileValidator>> = HashMap::new();
    let pivot = Arc::new(SummaryPivotValidator);
    map.insert(pivot.name().to_string(), pivot);
    map
}

/// Checks the pivot-table task: a `Summary` sheet averaging `Sales` by
/// `Region`, with the North average matching the reference data.
pub struct SummaryPivotValidator;

impl SummaryPivotValidator {
    fn check(&self, bytes: &[u8]) -> Result<(bool, String)> {
        let mut workbook = WorkbookFile::from_bytes(bytes)?;

        if !workbook.sheet_names().iter().any(|s| s == "Summary") {
            return Ok((
                false,
                "The 'Summary' sheet was not found. Please ensure the sheet is named correctly."
                    .to_string(),
            ));
        }

        let table = workbook.sheet_table("Summary")?;
        let Some(region_col) = table.column_index("Region") else {
            return Ok((
                false,
                "The structure in the 'Summary' sheet doesn't look like the requested pivot \
                 table. It should have 'Region' as a row."
                    .to_string(),
            ));
        };
        if table.headers.len() < 2 {
            return Ok((
                false,
                "The structure in the 'Summary' sheet doesn't look like the requested pivot \
                 table. It should have 'Region' as a row."
                    .to_string(),
            ));
        }

        let avg_col = table
            .column_index("Average of Sales")
            .or_else(|| table.column_index("Avg of Sales"));
        let Some(avg_col) = avg_col else {
            return Ok((
                false,
                "The pivot table seems to be calculating something other than the Average of \
                 Sales. Please check the value field settings."
                    .to_string(),
            ));
        };

        // Sanity-check one aggregate against the reference data: the North
        // average must round to the value the source rows imply.
        let expected = dataset::average_sales_by_region("North").unwrap_or(0.0).round();
        let north_ok = table
            .find_row(region_col, "North")
            .and_then(|row| row.get(avg_col))
            .and_then(|cell| cell.as_number())
            .is_some_and(|v| v.round() == expected);
        if !north_ok {
            return Ok((
                false,
                "The averages in the pivot table don't match the source data. Check the \
                 Average of Sales for the North region."
                    .to_string(),
            ));
        }

        Ok((
            true,
            "File received. The pivot table structure in the 'Summary' sheet appears correct."
                .to_string(),
        ))
    }
}

impl FileValidator for SummaryPivotValidator {
    fn name(&self) -> &str {
        "summary_pivot"
    }

    fn validate(&self, bytes: &[u8]) -> (bool, String) {
        match self.check(bytes) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("rejecting unreadable upload: {e:#}");
                (
                    false,
                    format!(
                        "An error occurred while reading your file. Please ensure it's a valid \
                         .xlsx workbook. Error: {e}"
                    ),
                )
            }
        }
    }
}
