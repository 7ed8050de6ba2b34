mod analysis;
mod course;
mod ids;
mod progress;
mod quiz;

pub use analysis::{MentorAnalysis, MentorStatus, WeakArea, WeakConcept};
pub use course::{ChapterOutline, CourseOutline};
pub use ids::GapQuizId;
pub use progress::{ChapterAnswer, ProgressError, ProgressRecord};
pub use quiz::{
    GapQuiz, GapQuizQuestion, QuestionError, QuestionKind, QuestionSource, canonical_answer,
};
