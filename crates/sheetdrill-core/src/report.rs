//! Interview report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcript::TranscriptEntry;

/// The complete record of one finished interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewReport {
    /// Session identifier this report was produced for.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question set used.
    pub question_set: QuestionSetSummary,
    /// Final accumulated score.
    pub score: u32,
    /// Maximum attainable score.
    pub max_score: u32,
    /// Ids of questions whose hint was revealed.
    pub hints_used: Vec<String>,
    /// Every evaluation round, in order.
    pub transcript: Vec<TranscriptEntry>,
    /// The model-written narrative (or the transport-failure placeholder).
    pub narrative: String,
}

/// Summary of a question set (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl InterviewReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: InterviewReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::transcript::RoundResult;

    fn sample_report() -> InterviewReport {
        InterviewReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            question_set: QuestionSetSummary {
                id: "excel-core".into(),
                name: "Core Excel Assessment".into(),
                question_count: 2,
            },
            score: 18,
            max_score: 20,
            hints_used: vec!["2".into()],
            transcript: vec![TranscriptEntry {
                question_id: "2".into(),
                prompt: "Total sales for the North region?".into(),
                difficulty: Difficulty::Easy,
                answer: "2000".into(),
                feedback: "That is correct. Well done.".into(),
                result: RoundResult::Correct { points: 10 },
            }],
            narrative: "Summary: strong practical skills.".into(),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("interview.json");

        let report = sample_report();
        report.save_json(&path).unwrap();

        let loaded = InterviewReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.score, 18);
        assert_eq!(loaded.transcript.len(), 1);
        assert_eq!(loaded.hints_used, vec!["2".to_string()]);
    }

    #[test]
    fn load_missing_file_errors_with_path() {
        let err = InterviewReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/report.json"));
    }
}
