//! The `sheetdrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(questions_path: PathBuf) -> Result<()> {
    let sets = if questions_path.is_dir() {
        sheetdrill_core::parser::load_question_directory(&questions_path)?
    } else {
        vec![sheetdrill_core::parser::parse_question_set(&questions_path)?]
    };

    let known_validators: Vec<String> = sheetdrill_workbook::registry().keys().cloned().collect();

    let mut total_warnings = 0;

    for set in &sets {
        println!("Question set: {} ({} questions)", set.name, set.questions.len());

        let warnings = sheetdrill_core::parser::validate_question_set(set, &known_validators);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
