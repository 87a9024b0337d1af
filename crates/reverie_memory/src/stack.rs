//! Memory stack: a bounded, newest-first buffer of fragments.
//!
//! Every insert weakens what is already there (three-layer forgetting is
//! collapsed into one multiplicative decay with a floor), and the oldest
//! fragments fall off the end once capacity is exceeded.

use reverie_core::model::{MAX_STRENGTH, MIN_STRENGTH};
use reverie_core::MemoryFragment;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const CAPACITY: usize = 10;

/// How many of the newest fragments the similarity gate looks at.
pub const SIMILARITY_WINDOW: usize = 3;

/// Fraction of the shorter string a shared leading substring must cover.
const OVERLAP_RATIO: f32 = 0.6;

/// Comparisons where the shorter side is below this many chars are skipped.
const MIN_COMPARABLE_LEN: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MemoryFragment>", into = "Vec<MemoryFragment>")]
pub struct MemoryStack {
    fragments: VecDeque<MemoryFragment>,
}

impl From<Vec<MemoryFragment>> for MemoryStack {
    fn from(fragments: Vec<MemoryFragment>) -> Self {
        Self::from_fragments(fragments)
    }
}

impl From<MemoryStack> for Vec<MemoryFragment> {
    fn from(stack: MemoryStack) -> Self {
        stack.fragments.into()
    }
}

impl MemoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a newest-first list, enforcing capacity and strength bounds.
    pub fn from_fragments(fragments: Vec<MemoryFragment>) -> Self {
        let mut fragments: VecDeque<MemoryFragment> = fragments.into();
        fragments.truncate(CAPACITY);
        for f in fragments.iter_mut() {
            f.strength = reverie_core::model::sanitize(f.strength, MIN_STRENGTH, MAX_STRENGTH, 0.5);
        }
        Self { fragments }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryFragment> {
        self.fragments.iter()
    }

    pub fn newest(&self) -> Option<&MemoryFragment> {
        self.fragments.front()
    }

    pub fn get(&self, index: usize) -> Option<&MemoryFragment> {
        self.fragments.get(index)
    }

    /// Texts of the `n` newest fragments.
    pub fn recent_texts(&self, n: usize) -> Vec<&str> {
        self.fragments.iter().take(n).map(|f| f.text.as_str()).collect()
    }

    pub fn push(&mut self, fragment: MemoryFragment, decay: f32) {
        self.push_with(fragment, decay, |_| {});
    }

    /// Decay every existing fragment by `decay` (floored at the minimum
    /// strength), handing each one to `visit` during the sweep, then prepend
    /// `fragment` and truncate to capacity.
    pub fn push_with<F>(&mut self, mut fragment: MemoryFragment, decay: f32, mut visit: F)
    where
        F: FnMut(&MemoryFragment),
    {
        let decay = if decay.is_finite() { decay.clamp(0.0, 1.0) } else { 1.0 };
        for existing in self.fragments.iter_mut() {
            existing.strength = (existing.strength * decay).max(MIN_STRENGTH);
            visit(existing);
        }
        fragment.strength =
            reverie_core::model::sanitize(fragment.strength, MIN_STRENGTH, MAX_STRENGTH, MAX_STRENGTH);
        self.fragments.push_front(fragment);
        self.fragments.truncate(CAPACITY);
    }

    /// Whether `candidate` repeats one of the newest fragments.
    pub fn is_too_similar(&self, candidate: &str) -> bool {
        is_too_similar(candidate, self.recent_texts(SIMILARITY_WINDOW))
    }
}

/// Case-folded, trimmed comparison against each of `recent` (only the first
/// [`SIMILARITY_WINDOW`] are considered). Two strings are similar when a
/// leading substring of either one, covering at least 60% of the shorter
/// string, appears inside the other.
pub fn is_too_similar<'a, I>(candidate: &str, recent: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = candidate.trim().to_lowercase();
    recent
        .into_iter()
        .take(SIMILARITY_WINDOW)
        .any(|prev| overlaps(&candidate, &prev.trim().to_lowercase()))
}

fn overlaps(a: &str, b: &str) -> bool {
    let shorter = a.chars().count().min(b.chars().count());
    if shorter < MIN_COMPARABLE_LEN {
        return false;
    }
    let span = (shorter as f32 * OVERLAP_RATIO).ceil() as usize;
    let head = |s: &str| s.chars().take(span).collect::<String>();
    b.contains(&head(a)) || a.contains(&head(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::Emotion;

    fn frag(text: &str) -> MemoryFragment {
        MemoryFragment::new(text, Emotion::Calm, 1.0)
    }

    #[test]
    fn test_similar_prefix_is_flagged() {
        assert!(is_too_similar(
            "I keep cycling back to memory",
            ["I keep cycling back to memory again"]
        ));
    }

    #[test]
    fn test_different_text_is_not_flagged() {
        assert!(!is_too_similar("a totally different idea", ["memory and perception"]));
    }

    #[test]
    fn test_case_and_whitespace_ignored() {
        assert!(is_too_similar("  THE LIGHT FLICKERS ", ["the light flickers and fades"]));
    }

    #[test]
    fn test_short_strings_skipped() {
        assert!(!is_too_similar("abc", ["abc"]));
    }

    #[test]
    fn test_only_three_newest_checked() {
        let mut stack = MemoryStack::new();
        stack.push(frag("the oldest repeated thought"), 0.9);
        stack.push(frag("second unrelated memory"), 0.9);
        stack.push(frag("third distinct fragment"), 0.9);
        stack.push(frag("fourth new observation"), 0.9);
        assert!(!stack.is_too_similar("the oldest repeated thought"));
        assert!(stack.is_too_similar("fourth new observation!"));
    }

    #[test]
    fn test_push_decays_and_truncates() {
        let mut stack = MemoryStack::new();
        for i in 0..15 {
            stack.push(frag(&format!("fragment number {}", i)), 0.5);
        }
        assert_eq!(stack.len(), CAPACITY);
        assert_eq!(stack.newest().unwrap().text, "fragment number 14");
        assert_eq!(stack.newest().unwrap().strength, 1.0);
        for f in stack.iter().skip(1) {
            assert!(f.strength >= MIN_STRENGTH && f.strength < 1.0);
        }
        assert_eq!(stack.get(CAPACITY - 1).unwrap().strength, MIN_STRENGTH);
    }

    #[test]
    fn test_push_keeps_low_strength() {
        let mut stack = MemoryStack::new();
        stack.push(frag("an ordinary thought"), 0.9);
        stack.push(MemoryFragment::new("a faint observation", Emotion::Calm, 0.3), 0.9);
        assert!((stack.newest().unwrap().strength - 0.3).abs() < 1e-6);
        assert!((stack.get(1).unwrap().strength - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_push_with_visits_existing() {
        let mut stack = MemoryStack::new();
        stack.push(frag("one"), 0.9);
        stack.push(frag("two"), 0.9);
        let mut seen = Vec::new();
        stack.push_with(frag("three"), 0.9, |f| seen.push(f.text.clone()));
        assert_eq!(seen, vec!["two", "one"]);
    }

    #[test]
    fn test_from_fragments_enforces_bounds() {
        let mut many: Vec<MemoryFragment> = (0..12).map(|i| frag(&format!("f{}", i))).collect();
        many[0].strength = 9.0;
        let stack = MemoryStack::from_fragments(many);
        assert_eq!(stack.len(), CAPACITY);
        assert_eq!(stack.newest().unwrap().strength, 1.0);
    }
}
