//! Result selection for ensemble strategies.
//!
//! After an ensemble call settles, the orchestrator hands the successful
//! results (in stable provider order) to a [`ResultSelector`], which picks
//! the one returned to the caller.

use tracing::debug;

use crate::types::GenerationResult;

/// Picks the winning result of an ensemble call.
///
/// `candidates` is never empty and is ordered by provider declaration
/// order. Return the index of the winner; an out-of-range index falls back
/// to the first candidate.
///
/// Any `Fn(&[GenerationResult]) -> usize` closure is a selector:
///
/// ```ignore
/// let cheapest = |candidates: &[GenerationResult]| {
///     candidates
///         .iter()
///         .enumerate()
///         .min_by(|(_, a), (_, b)| a.cost.unwrap_or(f64::MAX).total_cmp(&b.cost.unwrap_or(f64::MAX)))
///         .map(|(i, _)| i)
///         .unwrap_or(0)
/// };
/// ```
pub trait ResultSelector: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str {
        "custom"
    }

    fn select(&self, candidates: &[GenerationResult]) -> usize;
}

impl<F> ResultSelector for F
where
    F: Fn(&[GenerationResult]) -> usize + Send + Sync,
{
    fn select(&self, candidates: &[GenerationResult]) -> usize {
        self(candidates)
    }
}

/// Picks the result with the longest content (by character count); ties go
/// to the earliest candidate.
///
/// Length is a placeholder quality proxy, not a correctness signal. Swap in
/// a scoring selector via
/// [`PappusBuilder::selector`](crate::PappusBuilder::selector) once one exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestContent;

impl ResultSelector for LongestContent {
    fn name(&self) -> &str {
        "longest_content"
    }

    fn select(&self, candidates: &[GenerationResult]) -> usize {
        candidates
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, r)| r.content.chars().count())
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Picks the answer most providers agree on.
///
/// Contents are compared after normalization (trimmed, inner whitespace
/// collapsed, lowercased). The largest agreeing group wins; ties between
/// groups go to the group whose first member comes earliest. The winner is
/// that group's first member, returned unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVote;

impl MajorityVote {
    fn normalize(content: &str) -> String {
        content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

impl ResultSelector for MajorityVote {
    fn name(&self) -> &str {
        "majority_vote"
    }

    fn select(&self, candidates: &[GenerationResult]) -> usize {
        // (normalized content, votes, first index), in first-seen order
        let mut groups: Vec<(String, usize, usize)> = Vec::new();
        for (i, candidate) in candidates.iter().enumerate() {
            let key = Self::normalize(&candidate.content);
            match groups.iter_mut().find(|(k, _, _)| *k == key) {
                Some((_, votes, _)) => *votes += 1,
                None => groups.push((key, 1, i)),
            }
        }

        let mut winner: Option<(usize, usize)> = None;
        for (_, votes, first) in &groups {
            if winner.is_none_or(|(best, _)| *votes > best) {
                winner = Some((*votes, *first));
            }
        }
        let (votes, index) = winner.unwrap_or((0, 0));
        debug!(votes, groups = groups.len(), "majority vote");
        index
    }
}
