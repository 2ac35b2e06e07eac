//! Fuzzy matching of free-text input against controlled vocabularies.
//!
//! Scores are token-sort ratios in `[0, 1]`: both strings are split on
//! whitespace, the tokens sorted and re-joined with single spaces, and the
//! results compared with a normalized Indel similarity
//! (`2 * LCS / (len_a + len_b)`, counted in chars).
//!
//! Matching is case-sensitive. "toyota" still scores well against "Toyota",
//! it just doesn't score 1.0.

/// Best candidate found in a vocabulary scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub candidate: &'a str,
    pub score: f64,
}

/// Token-order-insensitive similarity between two strings
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    indel_similarity(&a, &b)
}

/// Find the highest-scoring candidate.
///
/// On ties the earliest candidate in vocabulary order wins. Returns `None`
/// only for an empty vocabulary.
pub fn best_match<'a, S: AsRef<str>>(value: &str, vocabulary: &'a [S]) -> Option<Match<'a>> {
    let query = sorted_tokens(value);
    let mut best: Option<Match<'a>> = None;

    for candidate in vocabulary {
        let candidate = candidate.as_ref();
        let score = indel_similarity(&query, &sorted_tokens(candidate));
        match best {
            Some(ref current) if score <= current.score => {}
            _ => best = Some(Match { candidate, score }),
        }
    }

    best
}

/// Map `value` onto a vocabulary member.
///
/// Exact members are returned unchanged. Otherwise the best fuzzy candidate
/// is returned if its score reaches `threshold`, else `None`.
pub fn normalize<'a, S: AsRef<str>>(
    value: &str,
    vocabulary: &'a [S],
    threshold: f64,
) -> Option<&'a str> {
    if let Some(exact) = vocabulary.iter().map(AsRef::as_ref).find(|c| *c == value) {
        return Some(exact);
    }

    let found = best_match(value, vocabulary)?;
    tracing::trace!(
        value = %value,
        candidate = %found.candidate,
        score = found.score,
        threshold,
        "Fuzzy candidate"
    );

    (found.score >= threshold).then_some(found.candidate)
}

/// Like [`normalize`], falling back to `default` when nothing clears the threshold
pub fn normalize_or<'a, S: AsRef<str>>(
    value: &str,
    vocabulary: &'a [S],
    threshold: f64,
    default: &'a str,
) -> &'a str {
    normalize(value, vocabulary, threshold).unwrap_or(default)
}

fn sorted_tokens(s: &str) -> Vec<char> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ").chars().collect()
}

fn indel_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

// Two-row DP; memory is O(len(b)).
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
