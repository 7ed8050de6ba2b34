use serde::{Deserialize, Serialize};

/// Per-chapter outline data from the course collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub number: u32,
    pub title: String,
    /// Concepts the chapter teaches; used for weak-concept matching.
    pub key_concepts: Vec<String>,
}

/// Course context consumed for concept matching and generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub slug: String,
    pub topic: String,
    pub difficulty: String,
    pub chapters: Vec<ChapterOutline>,
}

impl CourseOutline {
    /// Looks up a chapter outline by number.
    #[must_use]
    pub fn chapter(&self, number: u32) -> Option<&ChapterOutline> {
        self.chapters.iter().find(|c| c.number == number)
    }
}
