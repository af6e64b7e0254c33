//! Chaining of HSPs (high-scoring pairs) into ordered, non-overlapping paths.
//!
//! # Core Components
//!
//! * [`group`] - Partition fragments by `(source_id, strand)`.
//! * [`policy`] - Weights of the scoring function.
//! * [`score`] - Score of an ordered chain.
//! * [`greedy`] - Seed-and-extend chain builder.
//! * [`exhaustive`] - Best partition by enumeration, for small groups.
//! * [`run`] - Grouping, per-group chaining and result assembly.
//! * [`record`] - Chains and their TSV/JSON output.
//!
//! # Algorithm Overview
//!
//! 1. **Grouping**: fragments on the same source and strand form a group, sorted by
//!    `(q_start, q_end, s_start, s_end)`. Groups never interact.
//! 2. **Scoring**: `Score = Σ fragment scores - distance_penalty × Σ gaps
//!    + overlap_reward × Σ overlaps + connect_reward × links`, where the gap of a link is
//!    the larger of its query and subject gaps and the overlap is the smaller one when
//!    negative.
//! 3. **Greedy**: the best remaining fragment seeds a chain, which grows forwards then
//!    backwards while each step strictly improves the score.
//! 4. **Exhaustive**: every partition of a group into index-ascending chains is scored;
//!    the best total wins. Bounded by fragment count, partition count and time.

pub mod exhaustive;
pub mod greedy;
pub mod group;
pub mod policy;
pub mod record;
pub mod run;
pub mod score;

pub use exhaustive::{
    enumerate_partitions, exhaustive_chains, Admit, ExhaustiveLimits, PartitionVisitor,
};
pub use greedy::greedy_chains;
pub use group::{group_hsps, GroupKey};
pub use policy::ScoringPolicy;
pub use record::{total_score, Chain, ChainSet, ChainedHsp, GroupOutcome, IndexChain};
pub use run::{chain_all, chain_group, ChainOptions, Method};
pub use score::{link_terms, score_chain, score_indices, ChainItem, LinkTerms};
