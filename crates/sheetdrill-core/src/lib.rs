//! sheetdrill-core — Interview state machine, evaluation, and transcripts.
//!
//! This crate defines the fundamental data model, the session state machine,
//! and the answer-grading logic that the entire sheetdrill system builds on.

pub mod engine;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod traits;
pub mod transcript;
