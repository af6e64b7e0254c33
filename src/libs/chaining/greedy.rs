use crate::libs::chaining::policy::ScoringPolicy;
use crate::libs::chaining::record::IndexChain;
use crate::libs::chaining::score::{score_indices, ChainItem};
use crate::libs::error::ChainError;
use std::cmp::Ordering;

/// Partitions one group into chains by greedy extension.
///
/// `items` must be sorted by the group key. Repeatedly:
///
/// 1. The highest-scoring unconsumed fragment seeds a chain (ties go to the lower index).
/// 2. Unconsumed fragments after the chain's end are appended one by one while each
///    append strictly raises the chain score; the first one that does not stops the walk.
/// 3. The same walk runs backwards from the chain's start, prepending.
/// 4. The chain's fragments are marked consumed and the chain is emitted.
///
/// Every round consumes its seed, so the loop ends after at most `items.len()` rounds.
/// Chains come out in seed order, not coordinate order.
pub fn greedy_chains<T: ChainItem>(
    items: &[T],
    policy: &ScoringPolicy,
) -> Result<Vec<IndexChain>, ChainError> {
    let n = items.len();
    let mut consumed = vec![false; n];
    let mut chains = Vec::new();

    // Consumption only removes fragments, so one ranking serves every round
    let mut seeds: Vec<usize> = (0..n).collect();
    seeds.sort_by(|&a, &b| {
        items[b]
            .score()
            .partial_cmp(&items[a].score())
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    for seed in seeds {
        if consumed[seed] {
            continue;
        }

        let mut chain = vec![seed];
        let mut score = score_indices(items, &chain, policy)?;

        // forward
        for next in (seed + 1..n).filter(|&j| !consumed[j]) {
            chain.push(next);
            let new_score = score_indices(items, &chain, policy)?;
            if new_score > score {
                score = new_score;
            } else {
                chain.pop();
                break;
            }
        }

        // backward
        for prev in (0..seed).rev().filter(|&j| !consumed[j]) {
            chain.insert(0, prev);
            let new_score = score_indices(items, &chain, policy)?;
            if new_score > score {
                score = new_score;
            } else {
                chain.remove(0);
                break;
            }
        }

        for &i in &chain {
            consumed[i] = true;
        }
        chains.push(IndexChain {
            indices: chain,
            score,
        });
    }

    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::chaining::group::group_hsps;
    use crate::libs::hsp::{Hsp, Strand};
    use approx::assert_relative_eq;

    fn hsp(q_start: i64, q_end: i64, s_start: i64, s_end: i64, score: f64) -> Hsp {
        Hsp::new("III", q_start, q_end, s_start, s_end, Strand::Forward, score).unwrap()
    }

    fn assert_partition(chains: &[IndexChain], n: usize) {
        let mut seen: Vec<usize> = chains.iter().flat_map(|c| c.indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_greedy_empty() {
        let items: Vec<Hsp> = vec![];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn test_greedy_singleton() {
        let items = vec![hsp(625, 802, 789, 999, 95.0)];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].indices, vec![0]);
        assert_relative_eq!(chains[0].score, 95.0);
    }

    #[test]
    fn test_greedy_collinear() {
        // three adjacent blocks, then one far away on the subject axis
        let items = vec![
            hsp(0, 100, 0, 100, 50.0),
            hsp(110, 200, 110, 200, 80.0),
            hsp(210, 300, 210, 300, 40.0),
            hsp(310, 400, 90_000, 90_100, 60.0),
        ];
        let policy = ScoringPolicy::default();
        let chains = greedy_chains(&items, &policy).unwrap();

        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].indices, vec![0, 1, 2]);
        // 50 + 80 + 40 + 2 * (20 - 0.5 * 10)
        assert_relative_eq!(chains[0].score, 200.0);
        assert_eq!(chains[1].indices, vec![3]);
        assert_partition(&chains, items.len());
    }

    #[test]
    fn test_greedy_stops_at_first_rejection() {
        // index 1 is far away on the subject axis; index 2 would extend the chain but is never reached
        let items = vec![
            hsp(0, 100, 0, 100, 90.0),
            hsp(50, 150, 50_000, 50_100, 10.0),
            hsp(100, 200, 100, 200, 10.0),
        ];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();

        let indices: Vec<Vec<usize>> = chains.iter().map(|c| c.indices.clone()).collect();
        assert_eq!(indices, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_greedy_backward() {
        let items = vec![
            hsp(0, 100, 0, 100, 30.0),
            hsp(100, 200, 100, 200, 90.0),
        ];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].indices, vec![0, 1]);
        assert_relative_eq!(chains[0].score, 140.0);
    }

    #[test]
    fn test_greedy_equal_score_rejected() {
        // gap of 60 costs 30, so the link adds 20 - 30 and cancels the second score
        let items = vec![hsp(0, 100, 0, 100, 50.0), hsp(160, 260, 160, 260, 10.0)];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn test_greedy_identical_fragments() {
        let items = vec![hsp(0, 100, 0, 100, 10.0), hsp(0, 100, 0, 100, 10.0)];
        let chains = greedy_chains(&items, &ScoringPolicy::default()).unwrap();
        assert_partition(&chains, items.len());
    }

    #[test]
    fn test_greedy_scattered_alignments() {
        let hsps: Vec<Hsp> = [
            "III\t1573\t1729\t110912\t111079\t+\t102",
            "III\t625\t802\t789\t999\t+\t95",
            "III\t100923\t101001\t19995\t20077\t+\t127",
            "III\t625\t802\t110022\t110222\t+\t71",
            "III\t973\t1105\t110439\t110578\t+\t68",
            "III\t100923\t101001\t589\t661\t+\t119",
            "III\t100425\t100573\t154\t307\t+\t134",
            "III\t625\t802\t120022\t120222\t+\t75",
            "III\t973\t1105\t120439\t120578\t+\t63",
        ]
        .iter()
        .map(|l| l.parse().unwrap())
        .collect();

        let groups = group_hsps(hsps);
        let items = &groups[0];
        let policy = ScoringPolicy::default();
        let chains = greedy_chains(items, &policy).unwrap();
        assert_partition(&chains, items.len());

        for chain in &chains {
            assert!(chain.indices.windows(2).all(|w| w[0] < w[1]));
            let rescored = score_indices(items, &chain.indices, &policy).unwrap();
            assert_relative_eq!(rescored, chain.score);
        }

        // every gap in this set outweighs the connect reward
        assert_eq!(chains.len(), items.len());
        let seeds: Vec<usize> = chains.iter().map(|c| c.indices[0]).collect();
        assert_eq!(seeds, vec![6, 8, 7, 5, 0, 2, 1, 3, 4]);
    }
}
