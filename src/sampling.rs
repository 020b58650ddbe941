//! Random idea selection over an island's text.
use std::collections::HashSet;

use rand::{seq::index, Rng};

/// Default number of ideas returned by a sample
pub const DEFAULT_IDEA_COUNT: usize = 3;

/// Every non-blank line of `text`, trimmed, in original order
pub fn all_ideas(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct ideas of `text`, keeping the first occurrence of each
fn distinct_ideas(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    all_ideas(text)
        .into_iter()
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

/// Picks up to `count` distinct ideas uniformly at random, without replacement.
///
/// Returns fewer when the text has fewer distinct ideas, and nothing for
/// blank text. The result is in random order.
pub fn sample_ideas<R: Rng + ?Sized>(text: &str, count: usize, rng: &mut R) -> Vec<String> {
    let mut ideas = distinct_ideas(text);
    let amount = count.min(ideas.len());
    if amount == 0 {
        return Vec::new();
    }

    index::sample(rng, ideas.len(), amount)
        .into_iter()
        .map(|i| std::mem::take(&mut ideas[i]))
        .collect()
}

/// [`sample_ideas`] using the thread-local generator
pub fn random_ideas(text: &str, count: usize) -> Vec<String> {
    sample_ideas(text, count, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn as_set(ideas: Vec<String>) -> HashSet<String> {
        ideas.into_iter().collect()
    }

    fn set(lines: &[&str]) -> HashSet<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_lines_are_skipped_and_ideas_trimmed() {
        let mut rng = StdRng::seed_from_u64(7);
        let ideas = sample_ideas("a\nb\n\nc\n  \n", 3, &mut rng);
        assert_eq!(ideas.len(), 3);
        assert_eq!(as_set(ideas), set(&["a", "b", "c"]));

        let ideas = sample_ideas("  padded  \n\t\n", 3, &mut rng);
        assert_eq!(ideas, vec!["padded"]);
    }

    #[test]
    fn asking_for_more_than_available_returns_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let ideas = sample_ideas("x\ny", 5, &mut rng);
        assert_eq!(ideas.len(), 2);
        assert_eq!(as_set(ideas), set(&["x", "y"]));
    }

    #[test]
    fn duplicate_lines_count_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let ideas = sample_ideas("x\nx\n x \ny", 5, &mut rng);
        assert_eq!(ideas.len(), 2);
        assert_eq!(as_set(ideas), set(&["x", "y"]));
    }

    #[test]
    fn empty_text_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        for count in [0, 1, 3, 100] {
            assert!(sample_ideas("", count, &mut rng).is_empty());
            assert!(sample_ideas(" \n\t\n   ", count, &mut rng).is_empty());
        }
        assert!(sample_ideas("a\nb", 0, &mut rng).is_empty());
    }

    #[test]
    fn all_ideas_keeps_file_order() {
        assert_eq!(
            all_ideas("  one\n\ntwo  \nthree\n"),
            vec!["one", "two", "three"]
        );
        assert!(all_ideas("\n\n").is_empty());
    }

    #[test]
    fn same_seed_same_sample() {
        let text = "a\nb\nc\nd\ne\nf";
        let first = sample_ideas(text, 3, &mut StdRng::seed_from_u64(42));
        let second = sample_ideas(text, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn sample_is_a_distinct_subset(
            lines in proptest::collection::vec("[ab ]{0,3}", 0..12),
            count in 0usize..10,
            seed in any::<u64>(),
        ) {
            let text = lines.join("\n");
            let pool = as_set(all_ideas(&text));
            let ideas = sample_ideas(&text, count, &mut StdRng::seed_from_u64(seed));

            prop_assert_eq!(ideas.len(), count.min(pool.len()));
            let picked = as_set(ideas.clone());
            prop_assert_eq!(picked.len(), ideas.len());
            prop_assert!(picked.is_subset(&pool));
            for idea in &ideas {
                prop_assert!(!idea.is_empty());
                prop_assert_eq!(idea.trim(), idea.as_str());
            }
        }
    }
}
