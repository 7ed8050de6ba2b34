use std::collections::BTreeSet;

use crate::model::WeakArea;

/// Key for an "extra questions only" quiz (no weak chapters).
pub const EMPTY_WEAK_AREAS_KEY: &str = "";

/// Deterministic fingerprint of a weak-area set: the distinct chapter
/// numbers, ascending, joined with `-`.
///
/// Invariant under input permutation and duplicate chapter numbers.
/// `include_hints` is a separate discriminator in the storage triple and
/// must never be folded into this string (chapter `"1"` with hints on has
/// to stay distinguishable from a hypothetical chapter `"1h"`).
#[must_use]
pub fn weak_areas_key(weak_areas: &[WeakArea]) -> String {
    let chapters: BTreeSet<u32> = weak_areas.iter().map(|area| area.chapter_number).collect();
    chapters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}
