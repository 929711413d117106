//! Append-only interview transcript and report-prompt construction.
//!
//! The transcript is the ordered log of every evaluation round. Its rendered
//! text form is what the report model reads, so the line format is part of
//! the grading contract, not just display sugar.

use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Question};

/// Outcome of one evaluation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    /// Submitted but not yet graded.
    Pending,
    /// Final correct answer with the points awarded.
    Correct { points: u32 },
    /// Final incorrect answer (retry budget exhausted or zero).
    Incorrect,
    /// Incorrect with retries remaining; the question repeats.
    Retrying,
    /// The candidate skipped the question without submitting.
    Skipped,
}

impl std::fmt::Display for RoundResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundResult::Pending => write!(f, "Pending"),
            RoundResult::Correct { points } => write!(f, "Correct ({points}/10)"),
            RoundResult::Incorrect => write!(f, "Incorrect"),
            RoundResult::Retrying => write!(f, "Retrying"),
            RoundResult::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One evaluation round: a question, the submitted answer, and the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question_id: String,
    pub prompt: String,
    pub difficulty: Difficulty,
    /// Display form of the submission ("(skipped)" or an uploaded-file
    /// marker when there is no literal text answer).
    pub answer: String,
    pub feedback: String,
    pub result: RoundResult,
}

/// The ordered, append-only log of the full interview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a round for a freshly submitted answer. Feedback and result are
    /// filled in by `resolve_last` once the evaluator has run.
    pub fn begin_round(&mut self, question: &Question, answer: String) {
        self.entries.push(TranscriptEntry {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            difficulty: question.difficulty,
            answer,
            feedback: String::new(),
            result: RoundResult::Pending,
        });
    }

    /// Record a skipped question as a complete round.
    pub fn record_skip(&mut self, question: &Question) {
        self.entries.push(TranscriptEntry {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            difficulty: question.difficulty,
            answer: "(skipped)".to_string(),
            feedback: String::new(),
            result: RoundResult::Skipped,
        });
    }

    /// Close the most recent round with the evaluator's feedback and result.
    pub fn resolve_last(&mut self, feedback: String, result: RoundResult) {
        if let Some(entry) = self.entries.last_mut() {
            entry.feedback = feedback;
            entry.result = result;
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the transcript as the text log the report model consumes.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                "Q ({}): {}\nA: {}\n",
                entry.difficulty, entry.prompt, entry.answer
            ));
            if !entry.feedback.is_empty() {
                out.push_str(&format!("Feedback: {}\n", entry.feedback));
            }
            match &entry.result {
                RoundResult::Pending => {}
                RoundResult::Correct { points } => {
                    out.push_str(&format!("Result: Correct (Score: {points}/10)\n---\n"));
                }
                RoundResult::Incorrect => {
                    out.push_str("Result: Incorrect (Score: 0/10)\n---\n");
                }
                RoundResult::Retrying => {
                    out.push_str("Result: Incorrect. Retrying...\n");
                }
                RoundResult::Skipped => {
                    out.push_str("Result: Skipped (Score: 0/10)\n---\n");
                }
            }
        }
        out
    }

    /// Build the final-report prompt around the rendered transcript.
    pub fn report_prompt(&self) -> String {
        format!(
            "As an expert hiring manager, analyze this mock Excel interview transcript. \
             Provide a professional, constructive feedback report with a short 'Summary', \
             'Strengths', 'Areas for Improvement', and a final 'Recommendation'.\n\
             The transcript includes scores and retries, use them to inform your feedback. \
             For example, if a candidate got a question right after a retry, mention their \
             persistence but also the need for initial accuracy.\n\n\
             Transcript:\n---\n{}---\nGenerate the report.",
            self.to_text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpectedAnswer, QuestionKind};

    fn question() -> Question {
        Question {
            id: "2".into(),
            difficulty: Difficulty::Easy,
            prompt: "Total sales for the North region?".into(),
            hint: None,
            retries: 1,
            kind: QuestionKind::PracticalValue {
                expected: ExpectedAnswer::Number(2000.0),
            },
        }
    }

    #[test]
    fn correct_round_renders_score_line() {
        let mut t = Transcript::new();
        t.begin_round(&question(), "2000".into());
        t.resolve_last(
            "That is correct. Well done.".into(),
            RoundResult::Correct { points: 10 },
        );

        let text = t.to_text();
        assert!(text.contains("Q (easy): Total sales for the North region?"));
        assert!(text.contains("A: 2000"));
        assert!(text.contains("Feedback: That is correct. Well done."));
        assert!(text.contains("Result: Correct (Score: 10/10)"));
        assert!(text.ends_with("---\n"));
    }

    #[test]
    fn retry_round_has_no_separator() {
        let mut t = Transcript::new();
        t.begin_round(&question(), "1500".into());
        t.resolve_last(
            "That's not the value I was expecting.".into(),
            RoundResult::Retrying,
        );

        let text = t.to_text();
        assert!(text.contains("Result: Incorrect. Retrying...\n"));
        assert!(!text.contains("---"));
    }

    #[test]
    fn skip_is_a_complete_round() {
        let mut t = Transcript::new();
        t.record_skip(&question());

        let text = t.to_text();
        assert!(text.contains("A: (skipped)"));
        assert!(text.contains("Result: Skipped (Score: 0/10)"));
        assert_eq!(t.entries().len(), 1);
    }

    #[test]
    fn report_prompt_embeds_transcript() {
        let mut t = Transcript::new();
        t.begin_round(&question(), "2000".into());
        t.resolve_last("ok".into(), RoundResult::Correct { points: 10 });

        let prompt = t.report_prompt();
        assert!(prompt.starts_with("As an expert hiring manager"));
        assert!(prompt.contains("Total sales for the North region?"));
        assert!(prompt.ends_with("Generate the report."));
    }
}
