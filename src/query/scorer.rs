//! Relevance weighting.
//!
//! Scoring is term-frequency times inverse document frequency, summed over
//! the leaf terms a document matches. The idf weight is computed against the
//! snapshot a query is bound to, so it reflects deletions without any stored
//! statistics.

/// Inverse document frequency for a term.
///
/// Returns `1 + ln(live_count / doc_frequency)`, or zero when the term
/// matches no live document. Every matching term contributes at least 1,
/// common terms contribute little more.
pub fn idf(live_count: u64, doc_frequency: u64) -> f32 {
    if doc_frequency == 0 || live_count == 0 {
        return 0.0;
    }
    1.0 + (live_count as f32 / doc_frequency as f32).ln()
}
