//! Answer grading: normalization, model-graded rubrics, and file checks.
//!
//! The evaluator never returns an error. Transport failures, unparsable
//! numbers, and unreadable uploads all become ordinary incorrect verdicts
//! with explanatory feedback, so the session flow is never interrupted.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{ExpectedAnswer, Question, QuestionKind, POINTS_PER_QUESTION};
use crate::session::Submission;
use crate::traits::{FileValidator, GenerateRequest, LlmProvider};

/// Threshold at which a model-graded answer counts as correct.
pub const CONCEPTUAL_PASS_SCORE: u32 = 7;

/// Reply substituted when the grading model cannot be reached.
pub const MODEL_ERROR_REPLY: &str = "Error from model.";

/// The evaluator's judgment of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    /// Points in 0..=10. Awarded to the session only when `correct`.
    pub points: u32,
    pub feedback: String,
}

/// Normalize a numeric answer: strip currency symbols, thousands separators,
/// and whitespace, then parse as a float. `None` means unparsable.
pub fn normalize_numeric(answer: &str) -> Option<f64> {
    let cleaned: String = answer
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Normalize a text answer: trim and lowercase.
pub fn normalize_text(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Extract the integer from a `Score: <int>/10` line in a model reply.
///
/// Fragile by contract: this reproduces the original substring split
/// (everything between the first `Score:` and the next `/`), so a reply
/// that drifts from the requested format scores 0. Values above 10 clamp
/// to the per-question maximum.
pub fn parse_score_reply(reply: &str) -> Option<u32> {
    let after = reply.split("Score:").nth(1)?;
    let score_str = after.trim().split('/').next()?.trim();
    score_str
        .parse::<u32>()
        .ok()
        .map(|s| s.min(POINTS_PER_QUESTION))
}

/// Grades submissions against questions. Owns the grading provider and the
/// registry of named workbook validators.
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    validators: HashMap<String, Arc<dyn FileValidator>>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl Evaluator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        validators: HashMap<String, Arc<dyn FileValidator>>,
        model: String,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            validators,
            model,
            temperature,
            max_tokens,
        }
    }

    /// Names of the registered workbook validators.
    pub fn validator_names(&self) -> Vec<String> {
        self.validators.keys().cloned().collect()
    }

    /// Grade one submission. Infallible: every failure mode is a verdict.
    pub async fn evaluate(&self, question: &Question, submission: &Submission) -> Verdict {
        match &question.kind {
            QuestionKind::Conceptual { evaluation_prompt } => {
                self.evaluate_conceptual(evaluation_prompt, &submission.display())
                    .await
            }
            QuestionKind::PracticalValue { expected } => {
                evaluate_value(expected, &submission.display())
            }
            QuestionKind::PracticalFile { validator } => self.evaluate_file(validator, submission),
        }
    }

    async fn evaluate_conceptual(&self, template: &str, answer: &str) -> Verdict {
        let prompt = template.replace("{user_answer}", answer);
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            system_prompt: None,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let reply = match self.provider.generate(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("grading call failed: {e:#}");
                MODEL_ERROR_REPLY.to_string()
            }
        };

        let score = parse_score_reply(&reply).unwrap_or(0);
        Verdict {
            correct: score >= CONCEPTUAL_PASS_SCORE,
            points: score,
            feedback: format!("AI evaluation: {reply}"),
        }
    }

    fn evaluate_file(&self, validator_name: &str, submission: &Submission) -> Verdict {
        let Submission::File { bytes, .. } = submission else {
            return Verdict {
                correct: false,
                points: 0,
                feedback: "This question requires an uploaded workbook file.".to_string(),
            };
        };
        let Some(validator) = self.validators.get(validator_name) else {
            warn!("question references unknown validator '{validator_name}'");
            return Verdict {
                correct: false,
                points: 0,
                feedback: format!("No validator named '{validator_name}' is registered."),
            };
        };

        let (passed, message) = validator.validate(bytes);
        Verdict {
            correct: passed,
            points: if passed { POINTS_PER_QUESTION } else { 0 },
            feedback: message,
        }
    }
}

fn evaluate_value(expected: &ExpectedAnswer, answer: &str) -> Verdict {
    let correct = match expected {
        ExpectedAnswer::Number(n) => normalize_numeric(answer) == Some(*n),
        ExpectedAnswer::Text(t) => normalize_text(answer) == normalize_text(t),
    };
    if correct {
        Verdict {
            correct: true,
            points: POINTS_PER_QUESTION,
            feedback: "That is correct. Well done.".to_string(),
        }
    } else {
        Verdict {
            correct: false,
            points: 0,
            feedback: "That's not the value I was expecting.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::traits::{GenerateResponse, ModelInfo, TokenUsage};
    use async_trait::async_trait;

    struct CannedProvider {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            match &self.reply {
                Some(reply) => Ok(GenerateResponse {
                    content: reply.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                None => anyhow::bail!("network error: connection refused"),
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    struct AlwaysFails;

    impl FileValidator for AlwaysFails {
        fn name(&self) -> &str {
            "always_fails"
        }

        fn validate(&self, _bytes: &[u8]) -> (bool, String) {
            (false, "The 'Summary' sheet was not found.".to_string())
        }
    }

    fn evaluator(reply: Option<&str>) -> Evaluator {
        let mut validators: HashMap<String, Arc<dyn FileValidator>> = HashMap::new();
        validators.insert("always_fails".into(), Arc::new(AlwaysFails));
        Evaluator::new(
            Arc::new(CannedProvider {
                reply: reply.map(str::to_string),
            }),
            validators,
            "test-model".into(),
            0.0,
            512,
        )
    }

    fn conceptual_question() -> Question {
        Question {
            id: "1".into(),
            difficulty: Difficulty::Easy,
            prompt: "What does IF do?".into(),
            hint: None,
            retries: 0,
            kind: QuestionKind::Conceptual {
                evaluation_prompt: "Evaluate: \"{user_answer}\". Format: Evaluation: ... | Score: [Score]/10".into(),
            },
        }
    }

    fn value_question(expected: ExpectedAnswer) -> Question {
        Question {
            id: "2".into(),
            difficulty: Difficulty::Easy,
            prompt: "Value?".into(),
            hint: None,
            retries: 0,
            kind: QuestionKind::PracticalValue { expected },
        }
    }

    fn file_question(validator: &str) -> Question {
        Question {
            id: "4".into(),
            difficulty: Difficulty::Hard,
            prompt: "Upload the file.".into(),
            hint: None,
            retries: 0,
            kind: QuestionKind::PracticalFile {
                validator: validator.into(),
            },
        }
    }

    #[test]
    fn numeric_normalization_ignores_currency_and_separators() {
        assert_eq!(normalize_numeric("$26,500"), Some(26500.0));
        assert_eq!(normalize_numeric("26500"), Some(26500.0));
        assert_eq!(normalize_numeric(" 26500 "), Some(26500.0));
        assert_eq!(normalize_numeric("1,350"), Some(1350.0));
        assert_eq!(normalize_numeric("twenty"), None);
        assert_eq!(normalize_numeric(""), None);
    }

    #[test]
    fn text_normalization_is_case_insensitive() {
        let expected = ExpectedAnswer::Text("Service".into());
        for answer in ["service", "SERVICE", "Service", "  service "] {
            let v = evaluate_value(&expected, answer);
            assert!(v.correct, "{answer:?} should match");
            assert_eq!(v.points, 10);
        }
        assert!(!evaluate_value(&expected, "services").correct);
    }

    #[test]
    fn score_reply_parsing() {
        assert_eq!(
            parse_score_reply("Evaluation: Good answer. | Score: 8/10"),
            Some(8)
        );
        assert_eq!(parse_score_reply("Score: 10/10"), Some(10));
        assert_eq!(parse_score_reply("Score:3/10"), Some(3));
        // Over-scale replies clamp to the 0-10 contract.
        assert_eq!(parse_score_reply("Score: 12/10"), Some(10));
        // Drifted formats score nothing.
        assert_eq!(parse_score_reply("I'd give this an 8 out of 10"), None);
        assert_eq!(parse_score_reply("Score: eight/10"), None);
        assert_eq!(parse_score_reply("Error from model."), None);
    }

    #[tokio::test]
    async fn conceptual_pass_at_seven_or_above() {
        let eval = evaluator(Some("Evaluation: Solid. | Score: 7/10"));
        let v = eval
            .evaluate(&conceptual_question(), &Submission::Text("branching".into()))
            .await;
        assert!(v.correct);
        assert_eq!(v.points, 7);
        assert!(v.feedback.starts_with("AI evaluation: "));
    }

    #[tokio::test]
    async fn conceptual_below_seven_is_incorrect_but_keeps_points() {
        let eval = evaluator(Some("Evaluation: Vague. | Score: 5/10"));
        let v = eval
            .evaluate(&conceptual_question(), &Submission::Text("idk".into()))
            .await;
        assert!(!v.correct);
        assert_eq!(v.points, 5);
    }

    #[tokio::test]
    async fn conceptual_transport_failure_scores_zero() {
        let eval = evaluator(None);
        let v = eval
            .evaluate(&conceptual_question(), &Submission::Text("anything".into()))
            .await;
        assert!(!v.correct);
        assert_eq!(v.points, 0);
        assert_eq!(v.feedback, "AI evaluation: Error from model.");
    }

    #[tokio::test]
    async fn numeric_value_question_accepts_formatted_submissions() {
        let eval = evaluator(None);
        let q = value_question(ExpectedAnswer::Number(100.0));
        for answer in ["$100", "100", " 100 "] {
            let v = eval.evaluate(&q, &Submission::Text(answer.into())).await;
            assert!(v.correct, "{answer:?} should be correct");
            assert_eq!(v.points, 10);
            assert_eq!(v.feedback, "That is correct. Well done.");
        }
        let v = eval.evaluate(&q, &Submission::Text("101".into())).await;
        assert!(!v.correct);
        assert_eq!(v.feedback, "That's not the value I was expecting.");
    }

    #[tokio::test]
    async fn file_question_runs_the_named_validator() {
        let eval = evaluator(None);
        let v = eval
            .evaluate(
                &file_question("always_fails"),
                &Submission::File {
                    name: "a.xlsx".into(),
                    bytes: vec![1, 2, 3],
                },
            )
            .await;
        assert!(!v.correct);
        assert!(v.feedback.contains("Summary"));
    }

    #[tokio::test]
    async fn file_question_rejects_text_submissions() {
        let eval = evaluator(None);
        let v = eval
            .evaluate(
                &file_question("always_fails"),
                &Submission::Text("here you go".into()),
            )
            .await;
        assert!(!v.correct);
        assert!(v.feedback.contains("requires an uploaded workbook"));
    }

    #[tokio::test]
    async fn unknown_validator_is_incorrect_not_fatal() {
        let eval = evaluator(None);
        let v = eval
            .evaluate(
                &file_question("missing"),
                &Submission::File {
                    name: "a.xlsx".into(),
                    bytes: vec![],
                },
            )
            .await;
        assert!(!v.correct);
        assert!(v.feedback.contains("missing"));
    }
}
