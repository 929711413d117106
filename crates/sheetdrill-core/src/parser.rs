//! TOML question-set parser.
//!
//! Loads question sets from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Difficulty, ExpectedAnswer, Question, QuestionKind, QuestionSet};

/// Intermediate TOML structure for parsing question-set files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    question_set: TomlQuestionSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(rename = "type")]
    kind: String,
    prompt: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    retries: u32,
    #[serde(default)]
    evaluation_prompt: Option<String>,
    #[serde(default)]
    answer: Option<toml::Value>,
    #[serde(default)]
    validator: Option<String>,
}

fn default_difficulty() -> String {
    "easy".to_string()
}

/// Parse a single TOML file into a `QuestionSet`.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse a TOML string into a `QuestionSet` (useful for testing).
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let difficulty: Difficulty = q
                .difficulty
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;

            let kind = match q.kind.as_str() {
                "conceptual" => QuestionKind::Conceptual {
                    evaluation_prompt: q.evaluation_prompt.ok_or_else(|| {
                        anyhow::anyhow!(
                            "conceptual question '{}' is missing evaluation_prompt",
                            q.id
                        )
                    })?,
                },
                "practical_value" => {
                    let expected = match q.answer {
                        Some(toml::Value::Integer(n)) => ExpectedAnswer::Number(n as f64),
                        Some(toml::Value::Float(n)) => ExpectedAnswer::Number(n),
                        Some(toml::Value::String(s)) => ExpectedAnswer::Text(s),
                        Some(other) => anyhow::bail!(
                            "practical_value question '{}' has unsupported answer type: {}",
                            q.id,
                            other.type_str()
                        ),
                        None => anyhow::bail!(
                            "practical_value question '{}' is missing answer",
                            q.id
                        ),
                    };
                    QuestionKind::PracticalValue { expected }
                }
                "practical_file" => QuestionKind::PracticalFile {
                    validator: q.validator.ok_or_else(|| {
                        anyhow::anyhow!(
                            "practical_file question '{}' is missing validator",
                            q.id
                        )
                    })?,
                },
                other => anyhow::bail!("question '{}' has unknown type: {}", q.id, other),
            };

            Ok(Question {
                id: q.id,
                difficulty,
                prompt: q.prompt,
                hint: q.hint,
                retries: q.retries,
                kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        id: parsed.question_set.id,
        name: parsed.question_set.name,
        description: parsed.question_set.description,
        questions,
    })
}

/// Recursively load all `.toml` question-set files from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question set for common issues.
///
/// `known_validators` lists the registered workbook-validator names so
/// file questions referencing unknown ones are flagged before a session.
pub fn validate_question_set(set: &QuestionSet, known_validators: &[String]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &set.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        match &q.kind {
            QuestionKind::Conceptual { evaluation_prompt } => {
                if !evaluation_prompt.contains("{user_answer}") {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: "evaluation_prompt has no {user_answer} placeholder".into(),
                    });
                }
                if !evaluation_prompt.contains("Score:") {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: "evaluation_prompt does not ask for the Score: <n>/10 format"
                            .into(),
                    });
                }
            }
            QuestionKind::PracticalValue { expected } => {
                if let ExpectedAnswer::Text(t) = expected {
                    if t.trim().is_empty() {
                        warnings.push(ValidationWarning {
                            question_id: Some(q.id.clone()),
                            message: "expected text answer is empty after normalization".into(),
                        });
                    }
                }
            }
            QuestionKind::PracticalFile { validator } => {
                if !known_validators.iter().any(|v| v == validator) {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: format!("unknown validator: {validator}"),
                    });
                }
            }
        }
    }

    warnings
}
