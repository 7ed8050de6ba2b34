use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a stored gap quiz.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GapQuizId(Uuid);

impl GapQuizId {
    /// Creates a fresh random `GapQuizId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one read back from storage.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID value
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for GapQuizId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GapQuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GapQuizId({})", self.0)
    }
}

impl fmt::Display for GapQuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct() {
        assert_ne!(GapQuizId::new(), GapQuizId::new());
    }

    #[test]
    fn round_trips_through_uuid() {
        let id = GapQuizId::new();
        assert_eq!(GapQuizId::from_uuid(id.value()), id);
    }
}
