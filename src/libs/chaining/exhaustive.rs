use crate::libs::chaining::policy::ScoringPolicy;
use crate::libs::chaining::record::IndexChain;
use crate::libs::chaining::score::{score_indices, ChainItem};
use crate::libs::error::ChainError;
use itertools::Itertools;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_FRAGMENTS: usize = 12;

/// Bounds on the exhaustive search. Hitting any of them is a `ResourceLimit` error.
#[derive(Clone, Debug)]
pub struct ExhaustiveLimits {
    /// Groups larger than this are refused up front
    pub max_fragments: usize,
    /// Maximum number of complete partitions to score
    pub max_partitions: Option<u64>,
    /// Wall-clock budget per group
    pub time_budget: Option<Duration>,
    /// Set from another thread to abandon the search
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ExhaustiveLimits {
    fn default() -> Self {
        ExhaustiveLimits {
            max_fragments: DEFAULT_MAX_FRAGMENTS,
            max_partitions: None,
            time_budget: None,
            cancel: None,
        }
    }
}

/// Answer of [`PartitionVisitor::admit`] for a partial partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admit {
    /// Enumerate the completions
    Expand,
    /// Skip every completion
    Skip,
    /// Stop the whole enumeration
    Stop,
}

/// Callbacks driven by [`enumerate_partitions`].
pub trait PartitionVisitor {
    /// Called before expanding `partial`, whose chains are final; `remaining` holds the
    /// indices still unassigned.
    fn admit(&mut self, _partial: &[Vec<usize>], _remaining: &[usize]) -> Admit {
        Admit::Expand
    }

    /// Called once per complete partition. `Break` stops the enumeration.
    fn visit(&mut self, partition: &[Vec<usize>]) -> ControlFlow<()>;
}

/// Lazily walks every partition of `0..n` into index-ascending chains.
///
/// The chain holding the lowest unassigned index is fixed first; its other members are
/// each subset of the later unassigned indices, largest subsets first. The rest is
/// partitioned recursively. Each partition is visited exactly once, and the first one
/// visited is the single chain `0..n`.
///
/// ```
/// use hspchain::libs::chaining::exhaustive::{enumerate_partitions, PartitionVisitor};
/// use std::ops::ControlFlow;
///
/// struct Count(usize);
/// impl PartitionVisitor for Count {
///     fn visit(&mut self, _: &[Vec<usize>]) -> ControlFlow<()> {
///         self.0 += 1;
///         ControlFlow::Continue(())
///     }
/// }
///
/// let mut count = Count(0);
/// let _ = enumerate_partitions(4, &mut count);
/// assert_eq!(count.0, 15); // Bell number B(4)
/// ```
pub fn enumerate_partitions<V: PartitionVisitor>(n: usize, visitor: &mut V) -> ControlFlow<()> {
    let remaining: Vec<usize> = (0..n).collect();
    let mut partial: Vec<Vec<usize>> = Vec::new();
    descend(&mut partial, &remaining, visitor)
}

fn descend<V: PartitionVisitor>(
    partial: &mut Vec<Vec<usize>>,
    remaining: &[usize],
    visitor: &mut V,
) -> ControlFlow<()> {
    if remaining.is_empty() {
        return visitor.visit(partial);
    }
    match visitor.admit(partial, remaining) {
        Admit::Expand => {}
        Admit::Skip => return ControlFlow::Continue(()),
        Admit::Stop => return ControlFlow::Break(()),
    }

    let first = remaining[0];
    let rest = &remaining[1..];

    for size in (0..=rest.len()).rev() {
        for picked in rest.iter().copied().combinations(size) {
            let left: Vec<usize> = rest
                .iter()
                .copied()
                .filter(|i| picked.binary_search(i).is_err())
                .collect();

            let mut chain = Vec::with_capacity(size + 1);
            chain.push(first);
            chain.extend(picked);

            partial.push(chain);
            let flow = descend(partial, &left, visitor);
            partial.pop();

            if flow.is_break() {
                return flow;
            }
        }
    }

    ControlFlow::Continue(())
}

/// Scores every partition and keeps the best one.
struct BestPartition<'a, T> {
    items: &'a [T],
    policy: &'a ScoringPolicy,
    limits: &'a ExhaustiveLimits,
    started: Instant,
    prune: bool,
    steps: u64,
    visited: u64,
    best: Option<(f64, Vec<IndexChain>)>,
    failure: Option<ChainError>,
}

impl<'a, T: ChainItem> BestPartition<'a, T> {
    /// Polls the cancel flag and the clock; counts bound checks and visits alike.
    fn check_interrupt(&mut self) -> Result<(), ChainError> {
        let step = self.steps;
        self.steps += 1;

        if let Some(cancel) = &self.limits.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(ChainError::ResourceLimit(
                    "exhaustive search cancelled".to_string(),
                ));
            }
        }
        // clock reads are not free
        if step % 1024 == 0 {
            if let Some(budget) = self.limits.time_budget {
                if self.started.elapsed() > budget {
                    return Err(ChainError::ResourceLimit(format!(
                        "time budget of {:?} exhausted",
                        budget
                    )));
                }
            }
        }
        Ok(())
    }

    fn score_partition(&self, partition: &[Vec<usize>]) -> Result<Vec<IndexChain>, ChainError> {
        partition
            .iter()
            .map(|indices| {
                Ok(IndexChain {
                    indices: indices.clone(),
                    score: score_indices(self.items, indices, self.policy)?,
                })
            })
            .collect()
    }
}

impl<'a, T: ChainItem> PartitionVisitor for BestPartition<'a, T> {
    fn admit(&mut self, partial: &[Vec<usize>], remaining: &[usize]) -> Admit {
        if let Err(e) = self.check_interrupt() {
            self.failure = Some(e);
            return Admit::Stop;
        }
        if !self.prune {
            return Admit::Expand;
        }
        let Some((best, _)) = &self.best else {
            return Admit::Expand;
        };

        // Chains in `partial` are final and the rest can at best be joined gap-free
        let mut bound = 0.0;
        for indices in partial {
            match score_indices(self.items, indices, self.policy) {
                Ok(s) => bound += s,
                Err(_) => return Admit::Expand,
            }
        }
        bound += remaining.iter().map(|&i| self.items[i].score()).sum::<f64>();
        bound += self.policy.connect_reward.max(0.0) * (remaining.len() - 1) as f64;

        if bound > *best {
            Admit::Expand
        } else {
            Admit::Skip
        }
    }

    fn visit(&mut self, partition: &[Vec<usize>]) -> ControlFlow<()> {
        self.visited += 1;
        if let Some(max) = self.limits.max_partitions {
            if self.visited > max {
                self.failure = Some(ChainError::ResourceLimit(format!(
                    "more than {} partitions evaluated",
                    max
                )));
                return ControlFlow::Break(());
            }
        }
        if let Err(e) = self.check_interrupt() {
            self.failure = Some(e);
            return ControlFlow::Break(());
        }

        let chains = match self.score_partition(partition) {
            Ok(chains) => chains,
            Err(e) => {
                self.failure = Some(e);
                return ControlFlow::Break(());
            }
        };
        let total: f64 = chains.iter().map(|c| c.score).sum();

        let improved = match &self.best {
            Some((best, _)) => total > *best,
            None => true,
        };
        if improved {
            self.best = Some((total, chains));
        }
        ControlFlow::Continue(())
    }
}

/// Finds the highest-scoring partition of one group into index-ascending chains.
///
/// `items` must be sorted by the group key. The search is exponential in `items.len()`
/// and is refused above `limits.max_fragments`. With a policy whose gap and overlap
/// terms never add score, branches that cannot beat the incumbent are pruned.
/// Ties keep the first partition found.
pub fn exhaustive_chains<T: ChainItem>(
    items: &[T],
    policy: &ScoringPolicy,
    limits: &ExhaustiveLimits,
) -> Result<Vec<IndexChain>, ChainError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    if items.len() > limits.max_fragments {
        return Err(ChainError::ResourceLimit(format!(
            "{} fragments exceed the exhaustive ceiling of {}",
            items.len(),
            limits.max_fragments
        )));
    }
    policy.validate()?;

    let mut search = BestPartition {
        items,
        policy,
        limits,
        started: Instant::now(),
        prune: policy.geometry_never_rewards(),
        steps: 0,
        visited: 0,
        best: None,
        failure: None,
    };
    let _ = enumerate_partitions(items.len(), &mut search);

    if let Some(e) = search.failure {
        return Err(e);
    }
    match search.best {
        Some((_, chains)) => Ok(chains),
        None => Err(ChainError::Scoring("no partition was scored".to_string())),
    }
}
