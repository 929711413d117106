//! Interview session state machine.
//!
//! A `Session` is pure state: it owns the stage cursor, retry budget, score,
//! transcript, and chat log, and advances one external stimulus at a time.
//! All IO (model calls, file validation) happens in the engine, which feeds
//! verdicts back through `resolve`. That split keeps every transition
//! unit-testable without a network or a terminal.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::evaluator::Verdict;
use crate::model::{Question, QuestionSet, POINTS_PER_QUESTION};
use crate::transcript::{RoundResult, Transcript};

/// The five interview stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Intro,
    Question,
    Evaluation,
    Report,
    Complete,
}

/// A submitted answer: free text or an uploaded workbook.
#[derive(Debug, Clone)]
pub enum Submission {
    Text(String),
    File { name: String, bytes: Vec<u8> },
}

impl Submission {
    /// Display form used in the transcript and chat log.
    pub fn display(&self) -> String {
        match self {
            Submission::Text(text) => text.clone(),
            Submission::File { name, .. } => format!("(uploaded file: {name})"),
        }
    }
}

/// Who said what in the session's chat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Interviewer,
    Candidate,
}

/// One display message in the session's ordered chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// What happened when a verdict (or skip) was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Incorrect with budget remaining; the same question repeats.
    Retry { attempts_left: u32 },
    /// Moved on to the next question.
    Advanced { correct: bool, points: u32 },
    /// That was the last question; the session entered the report stage.
    Finished { correct: bool, points: u32 },
}

/// A stimulus arrived in a stage that does not accept it.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while in the {stage:?} stage")]
    InvalidTransition { stage: Stage, action: &'static str },
    #[error("no pending submission to resolve")]
    NoPendingSubmission,
}

/// Mutable per-interview state. Created once per attempt, reset wholesale.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    questions: QuestionSet,
    stage: Stage,
    question_index: usize,
    retries_remaining: u32,
    score: u32,
    max_score: u32,
    transcript: Transcript,
    messages: Vec<ChatMessage>,
    hints_used: HashSet<String>,
    pending: Option<Submission>,
    narrative: Option<String>,
}

impl Session {
    pub fn new(questions: QuestionSet) -> Self {
        let max_score = questions.max_score();
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            questions,
            stage: Stage::Intro,
            question_index: 0,
            retries_remaining: 0,
            score: 0,
            max_score,
            transcript: Transcript::new(),
            messages: Vec::new(),
            hints_used: HashSet::new(),
            pending: None,
            narrative: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn hints_used(&self) -> &HashSet<String> {
        &self.hints_used
    }

    pub fn narrative(&self) -> Option<&str> {
        self.narrative.as_deref()
    }

    /// The question the cursor points at, while one remains.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.questions.get(self.question_index)
    }

    /// The submission awaiting a verdict, if any.
    pub fn pending_submission(&self) -> Option<&Submission> {
        self.pending.as_ref()
    }

    /// Intro → Question. Enters the first question and arms its retry budget.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.stage != Stage::Intro {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "start",
            });
        }
        self.stage = Stage::Question;
        self.retries_remaining = self.current_question().map(|q| q.retries).unwrap_or(0);
        if self.current_question().is_none() {
            // Empty question set: nothing to ask, go straight to the report.
            self.stage = Stage::Report;
        }
        Ok(())
    }

    /// Question → Evaluation. Stores the raw submission and opens a
    /// transcript round.
    pub fn submit(&mut self, submission: Submission) -> Result<(), SessionError> {
        if self.stage != Stage::Question {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "submit",
            });
        }
        let question = self
            .current_question()
            .cloned()
            .ok_or(SessionError::InvalidTransition {
                stage: self.stage,
                action: "submit",
            })?;

        let display = submission.display();
        self.transcript.begin_round(&question, display.clone());
        self.messages.push(ChatMessage {
            role: ChatRole::Candidate,
            content: display,
        });
        self.pending = Some(submission);
        self.stage = Stage::Evaluation;
        Ok(())
    }

    /// Apply the evaluator's verdict to the pending submission.
    ///
    /// Correct, or incorrect with an exhausted budget, advances the cursor;
    /// incorrect with budget remaining decrements it and repeats the same
    /// question.
    pub fn resolve(&mut self, verdict: &Verdict) -> Result<Resolution, SessionError> {
        if self.stage != Stage::Evaluation {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "resolve",
            });
        }
        if self.pending.take().is_none() {
            return Err(SessionError::NoPendingSubmission);
        }

        self.messages.push(ChatMessage {
            role: ChatRole::Interviewer,
            content: verdict.feedback.clone(),
        });

        if verdict.correct {
            let points = verdict.points.min(POINTS_PER_QUESTION);
            self.transcript
                .resolve_last(verdict.feedback.clone(), RoundResult::Correct { points });
            Ok(self.advance(true, points))
        } else if self.retries_remaining > 0 {
            self.retries_remaining -= 1;
            let attempts_left = self.retries_remaining + 1;
            self.transcript
                .resolve_last(verdict.feedback.clone(), RoundResult::Retrying);
            self.messages.push(ChatMessage {
                role: ChatRole::Interviewer,
                content: format!(
                    "Please try that again. You have {attempts_left} attempt(s) left."
                ),
            });
            self.stage = Stage::Question;
            Ok(Resolution::Retry { attempts_left })
        } else {
            self.transcript
                .resolve_last(verdict.feedback.clone(), RoundResult::Incorrect);
            Ok(self.advance(false, 0))
        }
    }

    /// Skip the current question: advances with zero points and a skipped
    /// transcript round. The evaluator is never consulted.
    pub fn skip(&mut self) -> Result<Resolution, SessionError> {
        if self.stage != Stage::Question {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "skip",
            });
        }
        let question = self
            .current_question()
            .cloned()
            .ok_or(SessionError::InvalidTransition {
                stage: self.stage,
                action: "skip",
            })?;
        self.transcript.record_skip(&question);
        self.messages.push(ChatMessage {
            role: ChatRole::Candidate,
            content: "(skipped)".to_string(),
        });
        Ok(self.advance(false, 0))
    }

    /// Reveal the current question's hint, recording first use per question.
    /// Returns `None` when the question has no hint. Stage is unchanged.
    pub fn use_hint(&mut self) -> Result<Option<String>, SessionError> {
        if self.stage != Stage::Question {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "request a hint",
            });
        }
        let Some(question) = self.current_question() else {
            return Ok(None);
        };
        let hint = question.hint.clone();
        if hint.is_some() {
            self.hints_used.insert(question.id.clone());
        }
        Ok(hint)
    }

    /// Report → Complete. Stores the narrative report, whatever it says:
    /// a transport-failure placeholder is accepted as-is.
    pub fn record_report(&mut self, narrative: String) -> Result<(), SessionError> {
        if self.stage != Stage::Report {
            return Err(SessionError::InvalidTransition {
                stage: self.stage,
                action: "record the report",
            });
        }
        self.messages.push(ChatMessage {
            role: ChatRole::Interviewer,
            content: narrative.clone(),
        });
        self.narrative = Some(narrative);
        self.stage = Stage::Complete;
        Ok(())
    }

    /// Discard all session state and re-enter the intro stage. Allowed from
    /// any stage.
    pub fn restart(&mut self) {
        *self = Session::new(self.questions.clone());
    }

    fn advance(&mut self, correct: bool, points: u32) -> Resolution {
        if correct {
            self.score = (self.score + points).min(self.max_score);
        }
        self.question_index += 1;
        if self.question_index >= self.questions.questions.len() {
            self.stage = Stage::Report;
            Resolution::Finished { correct, points }
        } else {
            self.stage = Stage::Question;
            self.retries_remaining = self.current_question().map(|q| q.retries).unwrap_or(0);
            Resolution::Advanced { correct, points }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, ExpectedAnswer, QuestionKind};

    fn verdict(correct: bool, points: u32) -> Verdict {
        Verdict {
            correct,
            points,
            feedback: if correct {
                "That is correct. Well done.".into()
            } else {
                "That's not the value I was expecting.".into()
            },
        }
    }

    fn value_question(id: &str, retries: u32) -> Question {
        Question {
            id: id.into(),
            difficulty: Difficulty::Easy,
            prompt: format!("Question {id}?"),
            hint: Some(format!("Hint for {id}.")),
            retries,
            kind: QuestionKind::PracticalValue {
                expected: ExpectedAnswer::Number(1.0),
            },
        }
    }

    fn set(questions: Vec<Question>) -> QuestionSet {
        QuestionSet {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            questions,
        }
    }

    fn started(questions: Vec<Question>) -> Session {
        let mut session = Session::new(set(questions));
        session.start().unwrap();
        session
    }

    #[test]
    fn start_only_from_intro() {
        let mut session = started(vec![value_question("1", 0)]);
        assert_eq!(session.stage(), Stage::Question);
        assert!(matches!(
            session.start(),
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn retry_budget_of_one_allows_exactly_two_submissions() {
        let mut session = started(vec![value_question("1", 1), value_question("2", 0)]);

        session.submit(Submission::Text("wrong".into())).unwrap();
        let r = session.resolve(&verdict(false, 0)).unwrap();
        assert_eq!(r, Resolution::Retry { attempts_left: 1 });
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.retries_remaining(), 0);

        // Second submission advances regardless of correctness.
        session.submit(Submission::Text("still wrong".into())).unwrap();
        let r = session.resolve(&verdict(false, 0)).unwrap();
        assert_eq!(
            r,
            Resolution::Advanced {
                correct: false,
                points: 0
            }
        );
        assert_eq!(session.question_index(), 1);
    }

    #[test]
    fn zero_retries_advances_after_one_submission() {
        let mut session = started(vec![value_question("1", 0), value_question("2", 0)]);

        session.submit(Submission::Text("wrong".into())).unwrap();
        let r = session.resolve(&verdict(false, 0)).unwrap();
        assert!(matches!(r, Resolution::Advanced { correct: false, .. }));
        assert_eq!(session.question_index(), 1);
    }

    #[test]
    fn retry_budget_rearms_on_each_new_question() {
        let mut session = started(vec![value_question("1", 0), value_question("2", 2)]);

        session.submit(Submission::Text("wrong".into())).unwrap();
        session.resolve(&verdict(false, 0)).unwrap();
        assert_eq!(session.retries_remaining(), 2);
    }

    #[test]
    fn correct_after_retry_awards_points() {
        let mut session = started(vec![value_question("1", 1)]);

        session.submit(Submission::Text("wrong".into())).unwrap();
        session.resolve(&verdict(false, 0)).unwrap();
        session.submit(Submission::Text("right".into())).unwrap();
        let r = session.resolve(&verdict(true, 10)).unwrap();
        assert_eq!(
            r,
            Resolution::Finished {
                correct: true,
                points: 10
            }
        );
        assert_eq!(session.score(), 10);
        assert_eq!(session.stage(), Stage::Report);
    }

    #[test]
    fn skip_advances_without_points_and_marks_transcript() {
        let mut session = started(vec![value_question("1", 1), value_question("2", 0)]);

        let r = session.skip().unwrap();
        assert!(matches!(r, Resolution::Advanced { correct: false, points: 0 }));
        assert_eq!(session.score(), 0);
        assert!(session.transcript().to_text().contains("(skipped)"));
    }

    #[test]
    fn skipping_the_last_question_reaches_report() {
        let mut session = started(vec![value_question("1", 0)]);
        let r = session.skip().unwrap();
        assert!(matches!(r, Resolution::Finished { .. }));
        assert_eq!(session.stage(), Stage::Report);
    }

    #[test]
    fn hint_is_recorded_once_per_question() {
        let mut session = started(vec![value_question("1", 0)]);

        let hint = session.use_hint().unwrap();
        assert_eq!(hint.as_deref(), Some("Hint for 1."));
        assert!(session.hints_used().contains("1"));

        // Asking again reveals the same hint without growing the set.
        session.use_hint().unwrap();
        assert_eq!(session.hints_used().len(), 1);
        assert_eq!(session.stage(), Stage::Question);
    }

    #[test]
    fn score_never_exceeds_max() {
        let mut session = started(vec![value_question("1", 0)]);
        session.submit(Submission::Text("right".into())).unwrap();
        // An over-generous verdict is clamped to the per-question maximum.
        session.resolve(&verdict(true, 99)).unwrap();
        assert_eq!(session.score(), 10);
        assert!(session.score() <= session.max_score());
    }

    #[test]
    fn report_then_complete() {
        let mut session = started(vec![value_question("1", 0)]);
        session.submit(Submission::Text("right".into())).unwrap();
        session.resolve(&verdict(true, 10)).unwrap();
        assert_eq!(session.stage(), Stage::Report);

        session.record_report("Strong candidate.".into()).unwrap();
        assert_eq!(session.stage(), Stage::Complete);
        assert_eq!(session.narrative(), Some("Strong candidate."));
    }

    #[test]
    fn restart_resets_everything_from_any_stage() {
        let mut session = started(vec![value_question("1", 0), value_question("2", 0)]);
        session.submit(Submission::Text("right".into())).unwrap();
        session.resolve(&verdict(true, 10)).unwrap();
        let old_id = session.id();

        session.restart();
        assert_eq!(session.stage(), Stage::Intro);
        assert_eq!(session.question_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(session.transcript().is_empty());
        assert!(session.messages().is_empty());
        assert_ne!(session.id(), old_id);
    }

    #[test]
    fn file_submission_uses_upload_marker() {
        let mut session = started(vec![value_question("1", 0)]);
        session
            .submit(Submission::File {
                name: "solution.xlsx".into(),
                bytes: vec![0x50, 0x4b],
            })
            .unwrap();
        assert!(session
            .transcript()
            .to_text()
            .contains("A: (uploaded file: solution.xlsx)"));
    }

    #[test]
    fn submit_rejected_outside_question_stage() {
        let mut session = Session::new(set(vec![value_question("1", 0)]));
        let err = session.submit(Submission::Text("early".into())).unwrap_err();
        assert!(err.to_string().contains("Intro"));
    }
}
