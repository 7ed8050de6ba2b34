use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use mentor_core::model::{GapQuiz, GapQuizQuestion};
use mentor_core::results::{AnswerRecord, BandPolicy, QuizResults};

use crate::error::SessionError;

//
// ─── SESSION STATE ────────────────────────────────────────────────────────────
//

/// Where a session currently stands. Indices are presentation positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question `i` is on screen, awaiting an answer.
    Presenting(usize),
    /// Question `i` was answered; feedback is on screen.
    Feedback(usize),
    Completed,
}

/// Fresh random permutation of `0..len`.
///
/// Pure in the random source: a fixed seed gives a fixed order, which is
/// what session tests assert against; production passes a fresh rng.
#[must_use]
pub fn shuffled_order<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Client-side quiz walkthrough: one question at a time, strict
/// submit-then-advance protocol, no way back to earlier questions.
///
/// Purely ephemeral. Dropping the session before completion persists
/// nothing and leaves the stored quiz untouched; there is no timeout, a
/// learner may sit on a question indefinitely.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: GapQuiz,
    /// Permutation of quiz question indices, computed once at start.
    order: Vec<usize>,
    /// Presentation position -> submitted answer.
    answers: BTreeMap<usize, AnswerRecord>,
    state: SessionState,
}

impl QuizSession {
    /// Starts a session with the given random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for a quiz without questions.
    pub fn start<R: Rng + ?Sized>(quiz: GapQuiz, rng: &mut R) -> Result<Self, SessionError> {
        if quiz.is_empty() {
            return Err(SessionError::Empty);
        }
        let order = shuffled_order(quiz.len(), rng);
        Ok(Self {
            quiz,
            order,
            answers: BTreeMap::new(),
            state: SessionState::Presenting(0),
        })
    }

    /// Starts a session with a fresh thread-local random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for a quiz without questions.
    pub fn start_shuffled(quiz: GapQuiz) -> Result<Self, SessionError> {
        Self::start(quiz, &mut rand::rng())
    }

    #[must_use]
    pub fn quiz(&self) -> &GapQuiz {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// The question currently presented or under feedback.
    #[must_use]
    pub fn current_question(&self) -> Option<&GapQuizQuestion> {
        match self.state {
            SessionState::Presenting(i) | SessionState::Feedback(i) => {
                Some(&self.quiz.questions[self.order[i]])
            }
            SessionState::Completed => None,
        }
    }

    /// Answer recorded for presentation position `index`, if any.
    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.answers.get(&index)
    }

    /// Submits an answer for the question being presented.
    ///
    /// Correctness is evaluated once, here, by canonical exact equality
    /// against the question's stored answer; the record never changes
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyAnswer` for a blank submission,
    /// `SessionError::AlreadyAnswered` while feedback is showing, and
    /// `SessionError::Completed` after the session finished. State is
    /// unchanged on every error.
    pub fn submit(&mut self, selected: &str) -> Result<&AnswerRecord, SessionError> {
        let index = match self.state {
            SessionState::Presenting(i) => i,
            SessionState::Feedback(i) => return Err(SessionError::AlreadyAnswered { index: i }),
            SessionState::Completed => return Err(SessionError::Completed),
        };

        let selected = selected.trim();
        if selected.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }

        let question = &self.quiz.questions[self.order[index]];
        let record = AnswerRecord {
            selected: selected.to_owned(),
            correct: question.correct_answer.clone(),
            is_correct: question.is_correct(selected),
        };

        self.state = SessionState::Feedback(index);
        Ok(self.answers.entry(index).or_insert(record))
    }

    /// Moves past feedback to the next question, or to completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AwaitingAnswer` while a question is still
    /// presented and `SessionError::Completed` after the session
    /// finished. State is unchanged on every error.
    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        let index = match self.state {
            SessionState::Feedback(i) => i,
            SessionState::Presenting(i) => return Err(SessionError::AwaitingAnswer { index: i }),
            SessionState::Completed => return Err(SessionError::Completed),
        };

        self.state = if index + 1 < self.order.len() {
            SessionState::Presenting(index + 1)
        } else {
            SessionState::Completed
        };
        Ok(self.state)
    }

    /// Aggregates a completed session into score breakdowns.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before completion.
    pub fn results(&self, policy: BandPolicy) -> Result<QuizResults, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotCompleted);
        }
        Ok(QuizResults::from_answers(
            self.order.iter().enumerate().map(|(position, &qi)| {
                let source = self.quiz.questions[qi].source;
                let is_correct = self
                    .answers
                    .get(&position)
                    .is_some_and(|record| record.is_correct);
                (source, is_correct)
            }),
            policy,
        ))
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
