use crate::result::MatchResult;
use std::cmp::Ordering;

/// Order results for presentation.
///
/// Scored results come first, highest score first; failed results follow.
/// The sort is stable, so equal scores and all failures keep their
/// incoming order.
#[must_use]
pub fn rank(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(rank_order);
    results
}

/// True if `results` is already in ranked order.
#[must_use]
pub fn is_ranked(results: &[MatchResult]) -> bool {
    results
        .windows(2)
        .all(|pair| rank_order(&pair[0], &pair[1]) != Ordering::Greater)
}

fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    match (a.is_scored(), b.is_scored()) {
        (true, true) => b.score.cmp(&a.score),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
