//! The `sheetdrill run` command: an interactive interview at the terminal.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use sheetdrill_core::engine::{EngineConfig, EvalOutcome, InterviewEngine};
use sheetdrill_core::model::{Question, QuestionKind, QuestionSet};
use sheetdrill_core::parser;
use sheetdrill_core::report::InterviewReport;
use sheetdrill_core::session::{Resolution, Stage, Submission};
use sheetdrill_core::traits::LlmProvider;
use sheetdrill_providers::{create_provider, load_config_from, require_provider};

pub async fn execute(
    questions_path: PathBuf,
    set_id: Option<String>,
    provider_name: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    pacing: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let question_set = load_question_set(&questions_path, set_id.as_deref())?;

    let provider_name = provider_name.unwrap_or_else(|| config.default_provider.clone());
    let provider_config = require_provider(&config, &provider_name)?;
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(provider_config)?);

    let engine_config = EngineConfig {
        model: model.unwrap_or_else(|| config.default_model.clone()),
        temperature: config.default_temperature,
        max_tokens: config.max_tokens,
    };
    let pacing_delay = Duration::from_millis(pacing.unwrap_or(config.pacing_delay_ms));
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let mut engine = InterviewEngine::new(
        question_set,
        provider,
        sheetdrill_workbook::registry(),
        engine_config,
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    print_intro(engine.session().question_set());
    engine.start()?;

    loop {
        match engine.session().stage() {
            Stage::Question => {
                print_question(&engine);

                let Some(line) = read_line(&mut lines)? else {
                    println!("\nInput closed. Ending the interview.");
                    return Ok(());
                };
                let input = line.trim();

                match input {
                    "" => continue,
                    ":quit" => {
                        println!("Goodbye.");
                        return Ok(());
                    }
                    ":restart" => {
                        engine.restart();
                        println!("\nStarting over from the top.\n");
                        print_intro(engine.session().question_set());
                        engine.start()?;
                        continue;
                    }
                    ":hint" => {
                        match engine.hint()? {
                            Some(hint) => println!("Hint: {hint}"),
                            None => println!("No hint is available for this question."),
                        }
                        continue;
                    }
                    ":skip" => {
                        let resolution = engine.skip()?;
                        println!("Skipped.");
                        announce_advance(&resolution);
                        continue;
                    }
                    _ => {}
                }

                let submission = match make_submission(&engine, input) {
                    Ok(s) => s,
                    Err(e) => {
                        println!("{e:#}");
                        continue;
                    }
                };

                let outcome = engine.submit(submission).await?;
                print_outcome(&outcome);
                tokio::time::sleep(pacing_delay).await;
            }
            Stage::Report => {
                println!("\nThe interview is over. Generating your performance report...\n");
                let report = engine.finish().await?;
                print_report(&report);
                save_report(&report, &output_dir)?;
                return Ok(());
            }
            // start() and the loop above keep the session out of these.
            Stage::Intro | Stage::Evaluation | Stage::Complete => {
                anyhow::bail!("session ended in an unexpected stage");
            }
        }
    }
}

fn load_question_set(path: &PathBuf, set_id: Option<&str>) -> Result<QuestionSet> {
    if path.is_dir() {
        let mut sets = parser::load_question_directory(path)?;
        match set_id {
            Some(id) => sets
                .into_iter()
                .find(|s| s.id == id)
                .with_context(|| format!("no question set with id '{id}' in {}", path.display())),
            None if sets.len() == 1 => Ok(sets.swap_remove(0)),
            None => {
                let ids: Vec<&str> = sets.iter().map(|s| s.id.as_str()).collect();
                anyhow::bail!(
                    "multiple question sets found; pick one with --set. Available: {ids:?}"
                );
            }
        }
    } else {
        parser::parse_question_set(path)
    }
}

fn print_intro(set: &QuestionSet) {
    println!("=== {} ===", set.name);
    if !set.description.is_empty() {
        println!("{}", set.description);
    }
    println!(
        "\n{} questions, {} points total. Commands: :hint :skip :restart :quit\n",
        set.questions.len(),
        set.max_score(),
    );
}

fn print_question(engine: &InterviewEngine) {
    let session = engine.session();
    let Some(question) = session.current_question() else {
        return;
    };
    let total = session.question_set().questions.len();
    println!(
        "\nQuestion {} of {} ({})",
        session.question_index() + 1,
        total,
        question.difficulty,
    );
    println!("{}", question.prompt);
    if matches!(question.kind, QuestionKind::PracticalFile { .. }) {
        print!("Path to your .xlsx file> ");
    } else {
        print!("> ");
    }
    let _ = std::io::stdout().flush();
}

fn read_line(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<Option<String>> {
    match lines.next() {
        Some(line) => Ok(Some(line.context("failed to read input")?)),
        None => Ok(None),
    }
}

/// File questions take a filesystem path; everything else is free text.
fn make_submission(engine: &InterviewEngine, input: &str) -> Result<Submission> {
    let is_file = engine
        .session()
        .current_question()
        .map(|q: &Question| matches!(q.kind, QuestionKind::PracticalFile { .. }))
        .unwrap_or(false);

    if is_file {
        let path = PathBuf::from(input);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("could not read '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.xlsx".to_string());
        Ok(Submission::File { name, bytes })
    } else {
        Ok(Submission::Text(input.to_string()))
    }
}

fn print_outcome(outcome: &EvalOutcome) {
    println!("{}", outcome.verdict.feedback);
    match &outcome.resolution {
        Resolution::Retry { attempts_left } => {
            println!("Please try that again. You have {attempts_left} attempt(s) left.");
        }
        resolution => announce_advance(resolution),
    }
}

fn announce_advance(resolution: &Resolution) {
    match resolution {
        Resolution::Advanced { correct, points } if *correct => {
            println!("(+{points} points)");
        }
        Resolution::Finished { correct, points } if *correct => {
            println!("(+{points} points)");
        }
        _ => {}
    }
}

fn print_report(report: &InterviewReport) {
    use comfy_table::{Cell, Table};

    println!("{}\n", report.narrative);

    let mut table = Table::new();
    table.set_header(vec!["Question", "Difficulty", "Result"]);
    for entry in &report.transcript {
        table.add_row(vec![
            Cell::new(&entry.question_id),
            Cell::new(entry.difficulty.to_string()),
            Cell::new(entry.result.to_string()),
        ]);
    }
    println!("{table}");
    println!("\nFinal score: {}/{}", report.score, report.max_score);
    if !report.hints_used.is_empty() {
        println!("Hints used on: {}", report.hints_used.join(", "));
    }
}

fn save_report(report: &InterviewReport, output_dir: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = output_dir.join(format!("interview-{timestamp}.json"));
    report.save_json(&path)?;
    tracing::info!(session = %report.id, "report written");
    println!("Report saved to: {}", path.display());
    Ok(())
}
