//! Fuzzy matching algorithms.
//!
//! Both functions work on extended grapheme clusters, so a precomposed
//! Hangul syllable and its decomposed jamo sequence each count as one unit.

use unicode_segmentation::UnicodeSegmentation;

/// Levenshtein edit distance between two strings.
///
/// Insert, delete and substitute each cost 1. The full dynamic-programming
/// table is evaluated (two rows at a time); there is no early exit.
///
/// ```
/// use tablemate_search::edit_distance;
///
/// assert_eq!(edit_distance("버거", "바거"), 1);
/// assert_eq!(edit_distance("kitten", "sitting"), 3);
/// ```
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_units: Vec<&str> = a.graphemes(true).collect();
    let b_units: Vec<&str> = b.graphemes(true).collect();

    let m = a_units.len();
    let n = b_units.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a_units[i - 1] == b_units[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Case-insensitive similarity in `[0, 1]`.
///
/// `1 - edit_distance / max(len(a), len(b))`, with two empty strings being
/// identical.
///
/// ```
/// use tablemate_search::similarity;
///
/// assert_eq!(similarity("버거", "바거"), 0.5);
/// assert_eq!(similarity("BBQ", "bbq"), 1.0);
/// assert_eq!(similarity("", ""), 1.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let longer = a.graphemes(true).count().max(b.graphemes(true).count());
    if longer == 0 {
        return 1.0;
    }

    (longer - edit_distance(&a, &b)) as f64 / longer as f64
}
