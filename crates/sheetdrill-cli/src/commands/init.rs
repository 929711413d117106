//! The `sheetdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create sheetdrill.toml
    if std::path::Path::new("sheetdrill.toml").exists() {
        println!("sheetdrill.toml already exists, skipping.");
    } else {
        std::fs::write("sheetdrill.toml", SAMPLE_CONFIG)?;
        println!("Created sheetdrill.toml");
    }

    // Create example question set
    std::fs::create_dir_all("questions")?;
    let example_path = std::path::Path::new("questions/excel-core.toml");
    if example_path.exists() {
        println!("questions/excel-core.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created questions/excel-core.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit sheetdrill.toml with your API keys");
    println!("  2. Run: sheetdrill dataset --output sales_dataset.xlsx");
    println!("  3. Run: sheetdrill validate --questions questions/excel-core.toml");
    println!("  4. Run: sheetdrill run --questions questions/excel-core.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# sheetdrill configuration

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

default_provider = "gemini"
default_model = "gemini-1.5-flash"
default_temperature = 0.2
pacing_delay_ms = 1000
output_dir = "./sheetdrill-reports"
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "excel-core"
name = "Core Excel Assessment"
description = "A mock Excel interview: one conceptual question and three practical tasks against the sales dataset (run `sheetdrill dataset` to generate it)."

[[questions]]
id = "1"
difficulty = "easy"
type = "conceptual"
prompt = "Let's start with a conceptual question: Can you explain the primary purpose of the IF function in Excel and give an example of its syntax?"
evaluation_prompt = """
You are grading a candidate's answer in a mock Excel interview.
Question: Explain the primary purpose of the IF function in Excel and give an example of its syntax.
Candidate's answer: "{user_answer}"

Judge whether the answer explains conditional logic (a test with one value
when true and another when false) and whether the syntax example is
plausible. Be fair to paraphrasing.

Respond in exactly this format: Evaluation: [one or two sentences] | Score: [score]/10
"""

[[questions]]
id = "2"
difficulty = "medium"
type = "practical_value"
prompt = "Now a practical one. Using the sales dataset, what is the total sales amount for the 'North' region?"
answer = 2000
retries = 1
hint = "Try SUMIF over the Region column on the SalesData sheet."

[[questions]]
id = "3"
difficulty = "medium"
type = "practical_value"
prompt = "Using both sheets, what is the total profit for the 'Electronics' category? (Profit = Sales - Unit_Cost, matched by Product_ID.)"
answer = 1350
retries = 1
hint = "VLOOKUP the Unit_Cost from the Products sheet, subtract it from Sales, then SUMIF by Category."

[[questions]]
id = "4"
difficulty = "hard"
type = "practical_file"
prompt = "Final task: create a pivot table showing the average sales per region, place it on a new sheet named 'Summary', and upload the workbook."
validator = "summary_pivot"
"#;
