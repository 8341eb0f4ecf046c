//! Name similarity for duplicate detection
//!
//! Names are compared after normalization. Identical names score 1.0, a name contained in the
//! other scores the ratio of their lengths, and all other names score the overlap of their
//! significant words.

use std::{collections::BTreeSet, ops::RangeInclusive};

use unicode_normalization::UnicodeNormalization;

/// Minimum score (inclusive) for two exercises to be considered duplicates.
pub const DUPLICATE_THRESHOLD: f64 = 0.90;

/// Minimum score (inclusive) for two duplicates to be considered identical.
pub const EXACT_THRESHOLD: f64 = 0.99;

const COMBINING_DIACRITICS: RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Words of this length or shorter are ignored when comparing words.
const MIN_TOKEN_LEN: usize = 2;

/// Normalize an exercise name for comparison
///
/// - Converts to lowercase
/// - Removes diacritics
/// - Collapses whitespace and trims
/// - Removes punctuation and symbols
///
/// Punctuation is removed last, so a separated symbol leaves its surrounding spaces behind.
#[must_use]
pub fn normalize(name: &str) -> String {
    let unaccented: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_DIACRITICS.contains(c))
        .collect();

    unaccented
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ' ')
        .collect()
}

/// Similarity of two exercise names in the range 0.0 to 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(name_a: &str, name_b: &str) -> f64 {
    let a = normalize(name_a);
    let b = normalize(name_b);

    if a == b {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        let shorter = a.len().min(b.len());
        let longer = a.len().max(b.len());
        return shorter as f64 / longer as f64;
    }

    let tokens_a = tokens(&a);
    let tokens_b = tokens(&b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common = tokens_a.intersection(&tokens_b).count();

    common as f64 / tokens_a.len().max(tokens_b.len()) as f64
}

#[must_use]
pub fn is_duplicate(score: f64) -> bool {
    score >= DUPLICATE_THRESHOLD
}

#[must_use]
pub fn is_exact_duplicate(score: f64) -> bool {
    score >= EXACT_THRESHOLD
}

fn tokens(normalized: &str) -> BTreeSet<&str> {
    normalized
        .split(' ')
        .filter(|t| t.len() > MIN_TOKEN_LEN)
        .collect()
}
