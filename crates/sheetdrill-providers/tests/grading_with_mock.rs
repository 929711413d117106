//! Grading round-trips driven through the mock provider.

use std::collections::HashMap;
use std::sync::Arc;

use sheetdrill_core::evaluator::Evaluator;
use sheetdrill_core::model::{Difficulty, Question, QuestionKind};
use sheetdrill_core::session::Submission;
use sheetdrill_providers::mock::MockProvider;

fn if_function_question() -> Question {
    Question {
        id: "1".into(),
        difficulty: Difficulty::Easy,
        prompt: "Explain the IF function.".into(),
        hint: None,
        retries: 0,
        kind: QuestionKind::Conceptual {
            evaluation_prompt: "Grade this answer about the IF function: \"{user_answer}\". \
                                Format: Evaluation: [text] | Score: [score]/10"
                .into(),
        },
    }
}

fn evaluator(provider: Arc<MockProvider>) -> Evaluator {
    Evaluator::new(provider, HashMap::new(), "mock-model".into(), 0.2, 512)
}

#[tokio::test]
async fn matched_reply_grades_a_conceptual_answer() {
    let mut replies = HashMap::new();
    replies.insert(
        "IF function".to_string(),
        "Evaluation: Covers conditional logic. | Score: 9/10".to_string(),
    );
    let provider = Arc::new(MockProvider::new(replies));
    let eval = evaluator(Arc::clone(&provider));

    let verdict = eval
        .evaluate(
            &if_function_question(),
            &Submission::Text("It branches on a condition.".into()),
        )
        .await;

    assert!(verdict.correct);
    assert_eq!(verdict.points, 9);
    assert_eq!(provider.call_count(), 1);

    // The template was formatted with the candidate's answer before the call.
    let last = provider.last_request().unwrap();
    assert!(last.prompt.contains("It branches on a condition."));
    assert!(!last.prompt.contains("{user_answer}"));
}

#[tokio::test]
async fn unmatched_prompt_falls_back_to_the_zero_rubric() {
    let provider = Arc::new(MockProvider::new(HashMap::new()));
    let eval = evaluator(provider);

    let verdict = eval
        .evaluate(
            &if_function_question(),
            &Submission::Text("no idea".into()),
        )
        .await;

    assert!(!verdict.correct);
    assert_eq!(verdict.points, 0);
    assert!(verdict.feedback.contains("No rubric matched"));
}
