//! Core data model types for sheetdrill.
//!
//! These are the fundamental types the entire sheetdrill system uses to
//! represent interview questions and question sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points awarded for a fully correct answer.
pub const POINTS_PER_QUESTION: u32 = 10;

/// Difficulty rating of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// The one exact answer a practical-value question accepts.
///
/// The variant declares how submissions are normalized before comparison:
/// numbers get currency/separator stripping, text gets trim + lowercase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedAnswer {
    Number(f64),
    Text(String),
}

/// How a question is graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free-text question graded by the LLM against a rubric prompt.
    /// The template must contain a `{user_answer}` placeholder.
    Conceptual { evaluation_prompt: String },
    /// Question with one exact expected answer, graded by normalization
    /// and equality. No model call.
    PracticalValue { expected: ExpectedAnswer },
    /// Question requiring an uploaded workbook, graded by the named
    /// structural validator.
    PracticalFile { validator: String },
}

impl QuestionKind {
    /// Short label for logs and transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Conceptual { .. } => "conceptual",
            QuestionKind::PracticalValue { .. } => "practical_value",
            QuestionKind::PracticalFile { .. } => "practical_file",
        }
    }
}

/// A single interview question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier; doubles as the ordering key within a set.
    pub id: String,
    /// Difficulty rating shown to the candidate and the report model.
    pub difficulty: Difficulty,
    /// The question text presented to the candidate.
    pub prompt: String,
    /// Optional hint revealed on request, at most once per question.
    #[serde(default)]
    pub hint: Option<String>,
    /// Additional attempts permitted after an incorrect submission.
    #[serde(default)]
    pub retries: u32,
    /// How this question is graded.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// An ordered collection of interview questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Unique identifier for this question set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of what this set assesses.
    #[serde(default)]
    pub description: String,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionSet {
    /// Maximum attainable score: 10 points per question.
    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * POINTS_PER_QUESTION
    }
}
