use crate::libs::chaining::exhaustive::{exhaustive_chains, ExhaustiveLimits};
use crate::libs::chaining::greedy::greedy_chains;
use crate::libs::chaining::group::{group_hsps, GroupKey};
use crate::libs::chaining::policy::ScoringPolicy;
use crate::libs::chaining::record::{Chain, ChainSet, GroupOutcome, IndexChain};
use crate::libs::error::ChainError;
use crate::libs::hsp::Hsp;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Which chainer handles each group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Greedy,
    Exhaustive,
    /// Exhaustive, falling back to greedy when a limit is hit
    Auto,
}

impl FromStr for Method {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(Method::Greedy),
            "exhaustive" => Ok(Method::Exhaustive),
            "auto" => Ok(Method::Auto),
            _ => Err(ChainError::input(format!("Unknown chaining method: {}", s))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Greedy => "greedy",
            Method::Exhaustive => "exhaustive",
            Method::Auto => "auto",
        };
        write!(f, "{}", s)
    }
}

/// Everything the orchestrator needs, gathered in one place.
#[derive(Clone, Debug, Default)]
pub struct ChainOptions {
    pub policy: ScoringPolicy,
    pub method: Method,
    pub limits: ExhaustiveLimits,
}

/// Chains one sorted group. Returns the chains and the method that produced them.
pub fn chain_group(
    key: &GroupKey,
    hsps: &[Hsp],
    opts: &ChainOptions,
) -> (Method, Result<Vec<IndexChain>, ChainError>) {
    match opts.method {
        Method::Greedy => (Method::Greedy, greedy_chains(hsps, &opts.policy)),
        Method::Exhaustive => (
            Method::Exhaustive,
            exhaustive_chains(hsps, &opts.policy, &opts.limits),
        ),
        Method::Auto => match exhaustive_chains(hsps, &opts.policy, &opts.limits) {
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{}: {}; falling back to greedy", key, e);
                (Method::Greedy, greedy_chains(hsps, &opts.policy))
            }
            other => (Method::Exhaustive, other),
        },
    }
}

/// Groups the fragments and chains every group.
///
/// Groups run in parallel on the current rayon pool; each owns its working state, and a
/// failure stays inside its own group's outcome.
pub fn chain_all(hsps: Vec<Hsp>, opts: &ChainOptions) -> ChainSet {
    let groups: Vec<(GroupKey, Vec<Hsp>)> = group_hsps(hsps).into_iter().collect();
    tracing::debug!("{} groups", groups.len());

    let outcomes: Vec<(GroupKey, GroupOutcome)> = groups
        .into_par_iter()
        .map(|(key, hsps)| {
            let (method, result) = chain_group(&key, &hsps, opts);
            let chains = result.map(|chains| {
                chains
                    .iter()
                    .map(|c| Chain::from_indices(&hsps, c))
                    .collect::<Vec<_>>()
            });

            match &chains {
                Ok(c) => tracing::debug!(
                    "{}: {} fragments -> {} chains ({})",
                    key,
                    hsps.len(),
                    c.len(),
                    method
                ),
                Err(e) => tracing::warn!("{}: {}", key, e),
            }

            (
                key,
                GroupOutcome {
                    hsps,
                    method,
                    chains,
                },
            )
        })
        .collect();

    ChainSet {
        groups: outcomes.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::hsp::Strand;
    use approx::assert_relative_eq;

    fn hsp(source_id: &str, q_start: i64, s_start: i64, strand: Strand, score: f64) -> Hsp {
        Hsp::new(
            source_id,
            q_start,
            q_start + 100,
            s_start,
            s_start + 100,
            strand,
            score,
        )
        .unwrap()
    }

    fn sample() -> Vec<Hsp> {
        vec![
            hsp("chr1", 0, 0, Strand::Forward, 50.0),
            hsp("chr2", 0, 0, Strand::Forward, 70.0),
            hsp("chr1", 100, 100, Strand::Forward, 60.0),
            hsp("chr1", 100, 100, Strand::Reverse, 30.0),
            hsp("chr1", 5000, 90_000, Strand::Forward, 40.0),
        ]
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("auto".parse::<Method>().unwrap(), Method::Auto);
        assert!("dp".parse::<Method>().is_err());
        assert_eq!(Method::Exhaustive.to_string(), "exhaustive");
    }

    #[test]
    fn test_chain_all_greedy() {
        let set = chain_all(sample(), &ChainOptions::default());
        assert_eq!(set.groups.len(), 3);

        let chr1 = &set.groups[0];
        let chains = chr1.chains.as_ref().unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].indices(), vec![0, 1]);
        assert_relative_eq!(chains[0].score, 130.0);
        assert_eq!(chains[1].indices(), vec![2]);

        // no chain crosses groups
        for (key, outcome) in &set.groups {
            for chain in outcome.chains.as_ref().unwrap() {
                for member in &chain.hsps {
                    assert_eq!(member.hsp.source_id, key.source_id);
                    assert_eq!(member.hsp.strand, key.strand);
                }
            }
        }
        assert_eq!(set.chain_count(), 4);
    }

    #[test]
    fn test_chain_all_auto_fallback() {
        let opts = ChainOptions {
            method: Method::Auto,
            limits: ExhaustiveLimits {
                max_fragments: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let set = chain_all(sample(), &opts);

        assert_eq!(set.groups[0].method, Method::Greedy);
        assert_eq!(set.groups[1].method, Method::Exhaustive);
        assert!(set.failures().is_empty());
    }

    #[test]
    fn test_chain_all_exhaustive_limit_is_local() {
        let opts = ChainOptions {
            method: Method::Exhaustive,
            limits: ExhaustiveLimits {
                max_fragments: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let set = chain_all(sample(), &opts);

        let failures = set.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.source_id, "chr1");
        assert_eq!(failures[0].0.strand, Strand::Forward);
        assert!(set.groups[1].chains.is_ok());
        assert!(set.groups[2].chains.is_ok());
    }

    #[test]
    fn test_chain_all_bad_policy() {
        let opts = ChainOptions {
            policy: ScoringPolicy {
                distance_penalty: f64::NAN,
                overlap_reward: 2.0,
                connect_reward: 20.0,
            },
            ..Default::default()
        };
        let set = chain_all(sample(), &opts);

        // a lone fragment never touches the weights
        assert!(set.groups[1].chains.is_ok());
        assert!(matches!(
            set.groups[0].chains,
            Err(ChainError::Scoring(_))
        ));
    }

    #[test]
    fn test_chain_all_deterministic() {
        let opts = ChainOptions::default();
        let a = chain_all(sample(), &opts);
        let b = chain_all(sample(), &opts);
        for (ga, gb) in a.groups.values().zip(b.groups.values()) {
            assert_eq!(ga.chains.as_ref().unwrap(), gb.chains.as_ref().unwrap());
        }
    }

    #[test]
    fn test_chain_all_partitions_random() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(42);
        let hsps: Vec<Hsp> = (0..200)
            .map(|_| {
                let source_id = ["chr1", "chr2", "chr3"][rng.gen_range(0..3)];
                let strand = if rng.gen_bool(0.5) {
                    Strand::Forward
                } else {
                    Strand::Reverse
                };
                let q = rng.gen_range(0..5_000);
                let s = rng.gen_range(0..5_000);
                let len = rng.gen_range(10..300);
                Hsp::new(source_id, q, q + len, s, s + len, strand, rng.gen_range(1.0..100.0))
                    .unwrap()
            })
            .collect();

        let set = chain_all(hsps, &ChainOptions::default());
        let mut total = 0;
        for outcome in set.groups.values() {
            let chains = outcome.chains.as_ref().unwrap();

            let mut seen: Vec<usize> = chains.iter().flat_map(|c| c.indices()).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..outcome.hsps.len()).collect::<Vec<_>>());

            for chain in chains {
                assert!(!chain.is_empty());
                assert!(chain
                    .hsps
                    .windows(2)
                    .all(|w| w[0].hsp.sort_key() <= w[1].hsp.sort_key()));
            }
            total += outcome.hsps.len();
        }
        assert_eq!(total, 200);
    }
}
