//! sheetdrill-workbook — the spreadsheet side of the interview.
//!
//! Generates the reference dataset candidates work against, reads uploaded
//! workbooks, and implements the named structural validators that grade
//! file questions.

pub mod dataset;
pub mod inspect;
pub mod validators;

pub use validators::registry;
