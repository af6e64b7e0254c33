use crate::libs::chaining::policy::ScoringPolicy;
use crate::libs::error::ChainError;
use crate::libs::hsp::Hsp;

/// Anything with query/subject ranges and a score can be chained.
///
/// Coordinates are non-negative; link gaps are computed in `i64`.
pub trait ChainItem {
    fn q_start(&self) -> i64;
    fn q_end(&self) -> i64;
    fn s_start(&self) -> i64;
    fn s_end(&self) -> i64;
    fn score(&self) -> f64;
}

impl ChainItem for Hsp {
    fn q_start(&self) -> i64 { self.q_start }
    fn q_end(&self) -> i64 { self.q_end }
    fn s_start(&self) -> i64 { self.s_start }
    fn s_end(&self) -> i64 { self.s_end }
    fn score(&self) -> f64 { self.score }
}

impl<T: ChainItem + ?Sized> ChainItem for &T {
    fn q_start(&self) -> i64 { (**self).q_start() }
    fn q_end(&self) -> i64 { (**self).q_end() }
    fn s_start(&self) -> i64 { (**self).s_start() }
    fn s_end(&self) -> i64 { (**self).s_end() }
    fn score(&self) -> f64 { (**self).score() }
}

/// Geometry and score adjustments of one link `a -> b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkTerms {
    /// `b.q_start - a.q_end`
    pub q_gap: i64,
    /// `b.s_start - a.s_end`
    pub s_gap: i64,
    /// Amount subtracted for the larger positive gap
    pub distance_cost: f64,
    /// Amount subtracted for the overlap
    pub overlap_cost: f64,
}

impl LinkTerms {
    pub fn new<T: ChainItem>(a: &T, b: &T, policy: &ScoringPolicy) -> Self {
        let q_gap = b.q_start() - a.q_end();
        let s_gap = b.s_start() - a.s_end();

        let distance = q_gap.max(s_gap);
        let distance_cost = if distance > 0 {
            policy.distance_penalty * distance as f64
        } else {
            0.0
        };

        // overlap is negative here, so the product is a reduction
        let overlap = q_gap.min(s_gap);
        let overlap_cost = if overlap < 0 {
            -(policy.overlap_reward * overlap as f64)
        } else {
            0.0
        };

        LinkTerms {
            q_gap,
            s_gap,
            distance_cost,
            overlap_cost,
        }
    }

    /// Net contribution of this link, connect reward included.
    pub fn delta(&self, policy: &ScoringPolicy) -> f64 {
        policy.connect_reward - self.distance_cost - self.overlap_cost
    }
}

/// Scores fragments taken in iteration order.
///
/// Σ score, minus `distance_penalty × max(q_gap, s_gap)` for each positive gap,
/// plus `overlap_reward × min(q_gap, s_gap)` for each overlap,
/// plus `connect_reward` per link.
pub fn score_iter<I, T>(items: I, policy: &ScoringPolicy) -> Result<f64, ChainError>
where
    I: IntoIterator<Item = T>,
    T: ChainItem,
{
    let mut total = 0.0;
    let mut prev: Option<T> = None;

    for item in items {
        total += item.score();
        if let Some(p) = &prev {
            total += LinkTerms::new(p, &item, policy).delta(policy);
        }
        prev = Some(item);
    }

    if !total.is_finite() {
        return Err(ChainError::Scoring(format!("chain score is {}", total)));
    }
    Ok(total)
}

/// Scores an ordered slice of fragments. An empty chain scores 0.
///
/// ```
/// use hspchain::libs::chaining::{score_chain, ScoringPolicy};
/// use hspchain::libs::hsp::{Hsp, Strand};
///
/// let a = Hsp::new("III", 0, 100, 0, 100, Strand::Forward, 50.0).unwrap();
/// let b = Hsp::new("III", 100, 200, 100, 200, Strand::Forward, 60.0).unwrap();
/// let score = score_chain(&[a, b], &ScoringPolicy::default()).unwrap();
/// assert_eq!(score, 50.0 + 60.0 + 20.0);
/// ```
pub fn score_chain<T: ChainItem>(chain: &[T], policy: &ScoringPolicy) -> Result<f64, ChainError> {
    score_iter(chain.iter(), policy)
}

/// Scores the chain `indices` drawn from `items`.
pub fn score_indices<T: ChainItem>(
    items: &[T],
    indices: &[usize],
    policy: &ScoringPolicy,
) -> Result<f64, ChainError> {
    score_iter(indices.iter().map(|&i| &items[i]), policy)
}

/// Per-link breakdown of an ordered chain.
pub fn link_terms<T: ChainItem>(chain: &[T], policy: &ScoringPolicy) -> Vec<LinkTerms> {
    chain
        .windows(2)
        .map(|w| LinkTerms::new(&w[0], &w[1], policy))
        .collect()
}
