//! Shared error types for the services crate.

use thiserror::Error;

use mentor_core::analyzer::AnalyzerError;
use storage::repository::StorageError;

/// Errors emitted by question generators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("generator returned no questions")]
    Empty,
    #[error("generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unusable generator response: {0}")]
    InvalidResponse(String),
    #[error("unknown generation provider: {0}")]
    UnknownProvider(String),
}

/// Errors emitted by `GapQuizComposer`.
///
/// A recovered store conflict never shows up here; it resolves into a
/// cache hit inside the composer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposeError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Protocol errors emitted by `QuizSession`.
///
/// Every variant leaves the session state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz has no questions")]
    Empty,
    #[error("submitted answer is empty")]
    EmptyAnswer,
    #[error("question {index} already has a submitted answer")]
    AlreadyAnswered { index: usize },
    #[error("question {index} is still awaiting an answer")]
    AwaitingAnswer { index: usize },
    #[error("session is already completed")]
    Completed,
    #[error("session is not completed yet")]
    NotCompleted,
}

/// Errors emitted by `MentorService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MentorError {
    #[error("mentor locked: {completed} of {required} chapters completed")]
    MentorUnavailable { completed: u32, required: u32 },
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
