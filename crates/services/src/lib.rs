#![forbid(unsafe_code)]

pub mod ai;
pub mod composer;
pub mod error;
pub mod mentor_service;
pub mod quiz_session;

pub use mentor_core::Clock;

pub use ai::{GeneratedQuestion, GenerationRequest, GeneratorRegistry, QuestionGenerator};
pub use composer::{ComposedQuiz, GapQuizComposer};
pub use error::{ComposeError, GenerationError, MentorError, SessionError};
pub use mentor_service::MentorService;
pub use quiz_session::{QuizSession, SessionState, shuffled_order};
