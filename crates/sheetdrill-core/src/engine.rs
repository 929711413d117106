//! Interview engine: wires the pure session to the evaluator and the
//! report model.
//!
//! One engine drives one session. Every external stimulus (submission,
//! skip, hint, restart) is processed synchronously; the two model calls
//! (conceptual grading, final report) are blocking round-trips with no
//! engine-side retry, matching the per-question retry budget being a
//! domain feature rather than fault recovery.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::evaluator::{Evaluator, Verdict, MODEL_ERROR_REPLY};
use crate::model::QuestionSet;
use crate::report::{InterviewReport, QuestionSetSummary};
use crate::session::{Resolution, Session, SessionError, Submission};
use crate::traits::{FileValidator, GenerateRequest, LlmProvider};

/// Generation settings for the grading and report calls.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Max tokens per generation.
    pub max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// The result of grading one submission: the verdict plus what the state
/// machine did with it.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub verdict: Verdict,
    pub resolution: Resolution,
}

/// Drives one interview session end to end.
pub struct InterviewEngine {
    session: Session,
    evaluator: Evaluator,
    provider: Arc<dyn LlmProvider>,
    config: EngineConfig,
}

impl InterviewEngine {
    pub fn new(
        questions: QuestionSet,
        provider: Arc<dyn LlmProvider>,
        validators: HashMap<String, Arc<dyn FileValidator>>,
        config: EngineConfig,
    ) -> Self {
        let evaluator = Evaluator::new(
            Arc::clone(&provider),
            validators,
            config.model.clone(),
            config.temperature,
            config.max_tokens,
        );
        Self {
            session: Session::new(questions),
            evaluator,
            provider,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.session.start()
    }

    /// Grade a submission and apply the verdict to the session.
    pub async fn submit(&mut self, submission: Submission) -> Result<EvalOutcome, SessionError> {
        let question =
            self.session
                .current_question()
                .cloned()
                .ok_or(SessionError::InvalidTransition {
                    stage: self.session.stage(),
                    action: "submit",
                })?;
        self.session.submit(submission)?;

        let pending = self
            .session
            .pending_submission()
            .ok_or(SessionError::NoPendingSubmission)?;
        let verdict = self.evaluator.evaluate(&question, pending).await;
        let resolution = self.session.resolve(&verdict)?;

        info!(
            question = %question.id,
            correct = verdict.correct,
            points = verdict.points,
            "evaluated submission"
        );

        Ok(EvalOutcome {
            verdict,
            resolution,
        })
    }

    pub fn skip(&mut self) -> Result<Resolution, SessionError> {
        self.session.skip()
    }

    pub fn hint(&mut self) -> Result<Option<String>, SessionError> {
        self.session.use_hint()
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    /// Generate the narrative report from the transcript and complete the
    /// session. A transport failure yields the literal placeholder text in
    /// place of the report; it never aborts the session.
    pub async fn finish(&mut self) -> Result<InterviewReport, SessionError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: self.session.transcript().report_prompt(),
            system_prompt: None,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let narrative = match self.provider.generate(&request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("report generation failed: {e:#}");
                MODEL_ERROR_REPLY.to_string()
            }
        };

        self.session.record_report(narrative.clone())?;

        let set = self.session.question_set();
        let mut hints_used: Vec<String> = self.session.hints_used().iter().cloned().collect();
        hints_used.sort();

        Ok(InterviewReport {
            id: self.session.id(),
            created_at: chrono::Utc::now(),
            question_set: QuestionSetSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                question_count: set.questions.len(),
            },
            score: self.session.score(),
            max_score: self.session.max_score(),
            hints_used,
            transcript: self.session.transcript().entries().to_vec(),
            narrative,
        })
    }
}
