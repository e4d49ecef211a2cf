//! Deterministic confidence scoring for answered queries.

use vidhi_common::RetrievedChunk;

/// Keywords whose presence in both question and chunk raises confidence.
pub const COMPLIANCE_KEYWORDS: &[&str] = &[
    "gst", "tax", "return", "filing", "deadline", "penalty", "rate",
];

/// Chunk count at which the base score saturates.
const BASE_SATURATION: f64 = 3.0;

/// Bonus per (chunk, keyword) pair matched in both texts.
const KEYWORD_BONUS: f64 = 0.1;

/// Confidence in `[0.0, 1.0]`, rounded to two decimals.
///
/// Base is the chunk count over three, capped at 1.0. Every (chunk, keyword)
/// pair where the keyword appears in both the question and that chunk's text
/// adds 0.1; the accumulated bonus is uncapped, only the final sum is
/// clamped. Matching is case-insensitive substring containment, so "rate"
/// matches inside "corporate". No chunks scores 0.0.
pub fn score_confidence(chunks: &[RetrievedChunk], question: &str) -> f64 {
    if chunks.is_empty() {
        return 0.0;
    }
    let base = (chunks.len() as f64 / BASE_SATURATION).min(1.0);
    let question = question.to_lowercase();
    let mut bonus = 0.0;
    for chunk in chunks {
        let text = chunk.text.to_lowercase();
        for keyword in COMPLIANCE_KEYWORDS {
            if question.contains(keyword) && text.contains(keyword) {
                bonus += KEYWORD_BONUS;
            }
        }
    }
    round2((base + bonus).min(1.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
