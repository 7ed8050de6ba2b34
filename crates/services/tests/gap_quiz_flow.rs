use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use mentor_core::analyzer::AnalyzerConfig;
use mentor_core::model::{
    ChapterAnswer, ChapterOutline, CourseOutline, ProgressRecord, QuestionKind, QuestionSource,
};
use mentor_core::results::BandPolicy;
use mentor_core::time::fixed_clock;
use services::ai::MockGenerator;
use services::{GapQuizComposer, MentorService, QuizSession};
use storage::repository::{CourseRepository, InMemoryRepository, ProgressRepository, Storage};

fn answer(id: &str, text: &str, is_correct: bool) -> ChapterAnswer {
    ChapterAnswer {
        question_id: id.into(),
        kind: QuestionKind::Mcq,
        question_text: text.into(),
        options: Some(vec!["A) right".into(), "B) wrong".into()]),
        user_answer: if is_correct { "A".into() } else { "B".into() },
        correct_answer: "A".into(),
        explanation: "Option A matches the chapter material.".into(),
        is_correct,
    }
}

async fn seed(repo: &InMemoryRepository) {
    repo.upsert_course(&CourseOutline {
        slug: "pm-beginner".into(),
        topic: "project management".into(),
        difficulty: "beginner".into(),
        chapters: vec![
            ChapterOutline {
                number: 1,
                title: "Planning".into(),
                key_concepts: vec!["planning".into(), "scope".into()],
            },
            ChapterOutline {
                number: 2,
                title: "Execution".into(),
                key_concepts: vec!["execution".into()],
            },
        ],
    })
    .await
    .unwrap();

    repo.upsert_progress(
        "u1",
        "pm-beginner",
        &ProgressRecord {
            chapter_number: 1,
            chapter_title: "Planning".into(),
            score: 0.5,
            answers: vec![
                answer("mcq_1", "What is planning about?", false),
                answer("mcq_2", "Who owns the scope baseline?", false),
                answer("mcq_3", "An easy warmup", true),
            ],
        },
    )
    .await
    .unwrap();
    repo.upsert_progress(
        "u1",
        "pm-beginner",
        &ProgressRecord {
            chapter_number: 2,
            chapter_title: "Execution".into(),
            score: 0.9,
            answers: vec![answer("mcq_4", "Execution basics", true)],
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn full_flow_from_history_to_results() {
    let repo = InMemoryRepository::new();
    seed(&repo).await;

    let composer = GapQuizComposer::new(Arc::new(repo.clone()), Arc::new(MockGenerator::new()))
        .with_clock(fixed_clock());
    let mentor = MentorService::new(
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        AnalyzerConfig::new(2, 0.7).unwrap(),
        composer,
    );

    // analysis: chapter 1 is weak, mentor unlocked
    let analysis = mentor.analyze("u1", "pm-beginner").await.unwrap();
    assert!(analysis.mentor_available);
    assert_eq!(analysis.total_chapters_completed, 2);
    assert_eq!(analysis.weak_areas.len(), 1);
    assert_eq!(analysis.weak_areas[0].chapter_number, 1);

    // first compose generates, second is a pure cache hit
    let first = mentor.gap_quiz("u1", "pm-beginner", true, 3).await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.quiz.weak_areas_key, "1");
    assert_eq!(first.quiz.review_count(), 2);
    assert!(first.quiz.extra_count() <= 3);

    // storage order: review items lead, extras follow
    let sources: Vec<QuestionSource> = first.quiz.questions.iter().map(|q| q.source).collect();
    let first_extra = sources
        .iter()
        .position(|s| *s == QuestionSource::Extra)
        .unwrap();
    assert!(
        sources[..first_extra]
            .iter()
            .all(|s| *s == QuestionSource::WrongAnswer)
    );
    assert!(
        sources[first_extra..]
            .iter()
            .all(|s| *s == QuestionSource::Extra)
    );

    let second = mentor.gap_quiz("u1", "pm-beginner", true, 3).await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.quiz.questions, first.quiz.questions);

    // drive a session to completion under a fixed seed
    let mut rng = StdRng::seed_from_u64(42);
    let mut session = QuizSession::start(first.quiz.clone(), &mut rng).unwrap();
    while !session.is_complete() {
        let correct = session.current_question().unwrap().correct_answer.clone();
        session.submit(&correct).unwrap();
        session.advance().unwrap();
    }

    let results = session.results(BandPolicy::default()).unwrap();
    assert_eq!(results.total() as usize, first.quiz.len());
    assert_eq!(results.correct_count(), results.total());
    assert_eq!(results.percent(), 100);
    assert_eq!(
        results.review().total as usize + results.extra().total as usize,
        first.quiz.len()
    );

    // abandoning a second session has no effect on the stored quiz
    let abandoned = QuizSession::start(second.quiz.clone(), &mut rng).unwrap();
    drop(abandoned);
    let third = mentor.gap_quiz("u1", "pm-beginner", true, 3).await.unwrap();
    assert!(third.cache_hit);
    assert_eq!(third.quiz.questions, first.quiz.questions);
}

#[tokio::test]
async fn extra_only_flow_when_nothing_is_weak() {
    let storage = Storage::in_memory();

    storage
        .courses
        .upsert_course(&CourseOutline {
            slug: "pm-beginner".into(),
            topic: "project management".into(),
            difficulty: "beginner".into(),
            chapters: vec![ChapterOutline {
                number: 1,
                title: "Planning".into(),
                key_concepts: vec!["planning".into()],
            }],
        })
        .await
        .unwrap();

    // every score sits above the weakness threshold
    for (chapter_number, title) in [(1, "Planning"), (2, "Execution")] {
        storage
            .progress
            .upsert_progress(
                "u1",
                "pm-beginner",
                &ProgressRecord {
                    chapter_number,
                    chapter_title: title.into(),
                    score: 0.85,
                    answers: vec![answer("mcq_1", "A solid answer", true)],
                },
            )
            .await
            .unwrap();
    }

    let composer = GapQuizComposer::new(storage.quizzes.clone(), Arc::new(MockGenerator::new()))
        .with_clock(fixed_clock());
    let mentor = MentorService::new(
        storage.progress.clone(),
        storage.courses.clone(),
        AnalyzerConfig::new(2, 0.7).unwrap(),
        composer,
    );

    let composed = mentor.gap_quiz("u1", "pm-beginner", false, 3).await.unwrap();
    assert!(!composed.cache_hit);
    assert_eq!(composed.quiz.weak_areas_key, "");
    assert_eq!(composed.quiz.review_count(), 0);
    assert!(composed.quiz.extra_count() > 0);
    assert!(composed.quiz.extra_count() <= 3);
}
