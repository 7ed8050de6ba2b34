use async_trait::async_trait;

use mentor_core::model::QuestionKind;

use super::{GeneratedQuestion, GenerationRequest, QuestionGenerator};
use crate::error::GenerationError;

/// Deterministic generator for tests and offline development.
///
/// Questions are built from the requested weak concepts (or the course
/// topic when none were identified), alternating multiple choice and
/// true/false. No network, no randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let count = usize::try_from(request.max_questions).unwrap_or(usize::MAX);
        let mut questions = Vec::new();

        for i in 0..count {
            let (concept, chapter) = request
                .concepts
                .get(i % request.concepts.len().max(1))
                .map_or((request.course_topic.as_str(), 0), |target| {
                    (target.concept.as_str(), target.chapter_number)
                });
            let number = i + 1;

            let question = if i % 2 == 0 {
                GeneratedQuestion {
                    id: format!("extra_mcq_{number}"),
                    kind: QuestionKind::Mcq,
                    question_text: format!(
                        "Which statement best describes {concept} in {topic}? (Extra {number})",
                        topic = request.course_topic,
                    ),
                    options: Some(vec![
                        format!("A) A core part of {concept}"),
                        "B) An unrelated idea".to_owned(),
                        "C) A common misconception".to_owned(),
                        "D) None of the above".to_owned(),
                    ]),
                    correct_answer: "A".to_owned(),
                    explanation: format!("Option A is correct because it relates to {concept}."),
                    hint: request
                        .include_hints
                        .then(|| format!("Think about how {concept} was introduced.")),
                    difficulty: Some(request.difficulty.clone()),
                    source_chapter: chapter,
                    target_concept: Some(concept.to_owned()),
                }
            } else {
                GeneratedQuestion {
                    id: format!("extra_tf_{number}"),
                    kind: QuestionKind::TrueFalse,
                    question_text: format!(
                        "{concept} plays a central role in {topic}. (Extra {number})",
                        topic = request.course_topic,
                    ),
                    options: None,
                    correct_answer: "true".to_owned(),
                    explanation: format!("True: {concept} is fundamental here."),
                    hint: request
                        .include_hints
                        .then(|| format!("Recall where {concept} showed up.")),
                    difficulty: Some(request.difficulty.clone()),
                    source_chapter: chapter,
                    target_concept: Some(concept.to_owned()),
                }
            };
            questions.push(question);
        }

        Ok(questions)
    }
}
