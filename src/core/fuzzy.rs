//! Approximate substring matching for file names and paths.
//!
//! A query matches a haystack when some substring of the haystack can be turned
//! into the query with few edits (insertions, deletions, substitutions and
//! adjacent transpositions). The edit count divided by the query length is the
//! dissimilarity; the position of the matching substring is ignored.
//!
//! All comparisons are case-insensitive. Callers pre-lowercase haystacks once
//! (see [`FuzzyKey`]) so a search only pays for the query.

/// Default dissimilarity cutoff: 30% of the query may be edited.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Exact matches still need a non-zero score so products stay ordered.
const EXACT_SCORE: f64 = f64::EPSILON;

/// One pre-processed haystack.
#[derive(Debug, Clone)]
pub struct FuzzyKey {
    lower: String,
    chars: Vec<char>,
    norm: f64,
}

impl FuzzyKey {
    pub fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let chars = lower.chars().collect();
        let norm = field_length_norm(&lower);
        Self { lower, chars, norm }
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }
}

/// `1 / sqrt(tokens)` over whitespace separated tokens, rounded to three
/// decimals. Longer fields weigh their matches less.
fn field_length_norm(text: &str) -> f64 {
    let tokens = text.split_whitespace().count().max(1) as f64;
    (1000.0 / tokens.sqrt()).round() / 1000.0
}

/// A lowercased query ready to be scored against many keys.
#[derive(Debug, Clone)]
pub struct FuzzyPattern {
    lower: String,
    chars: Vec<char>,
    threshold: f64,
}

impl FuzzyPattern {
    pub fn new(query: &str, threshold: f64) -> Self {
        let lower = query.trim().to_lowercase();
        let chars = lower.chars().collect();
        Self {
            lower,
            chars,
            threshold,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Dissimilarity in `[0, 1]` of the best-matching substring of `key`.
    pub fn dissimilarity(&self, key: &FuzzyKey) -> f64 {
        if self.chars.is_empty() {
            return 0.0;
        }
        if key.lower.contains(self.lower.as_str()) {
            return 0.0;
        }
        let distance = approximate_distance(&self.chars, &key.chars);
        (distance as f64 / self.chars.len() as f64).min(1.0)
    }

    /// Score for one key, or `None` when it is above the cutoff.
    /// Lower is better.
    pub fn score(&self, key: &FuzzyKey) -> Option<f64> {
        let d = self.dissimilarity(key);
        if d > self.threshold {
            None
        } else if d == 0.0 {
            Some(EXACT_SCORE)
        } else {
            Some(d)
        }
    }

    /// Combined score over several keys: the product of every matching key's
    /// score raised to that key's field length norm. `None` if no key matches.
    pub fn score_keys<'a, I>(&self, keys: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a FuzzyKey>,
    {
        let mut total: Option<f64> = None;
        for key in keys {
            if let Some(score) = self.score(key) {
                let weighted = score.powf(key.norm);
                total = Some(total.map_or(weighted, |t| t * weighted));
            }
        }
        total
    }
}

/// Minimum number of edits turning `pattern` into any substring of `text`.
///
/// Semi-global edit distance (free leading and trailing text) with adjacent
/// transpositions counted as a single edit.
pub fn approximate_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    if m == 0 {
        return 0;
    }
    if text.is_empty() {
        return m;
    }

    // rows indexed by text position; column 0 of each row is the pattern prefix cost
    let n = text.len();
    let mut before_prev: Vec<usize> = vec![0; n + 1];
    let mut prev: Vec<usize> = vec![0; n + 1];
    let mut curr: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(pattern[i - 1] != text[j - 1]);
            let mut best = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1
                && j > 1
                && pattern[i - 1] == text[j - 2]
                && pattern[i - 2] == text[j - 1]
            {
                best = best.min(before_prev[j - 2] + 1);
            }
            curr[j] = best;
        }
        std::mem::swap(&mut before_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev.iter().copied().min().unwrap_or(m)
}
