use crate::libs::chaining::group::GroupKey;
use crate::libs::chaining::run::Method;
use crate::libs::error::ChainError;
use crate::libs::hsp::Hsp;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;

/// A chain as positions into its group's sorted fragment list.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexChain {
    pub indices: Vec<usize>,
    pub score: f64,
}

/// Sum of chain scores, the quantity both chainers are compared on.
pub fn total_score(chains: &[IndexChain]) -> f64 {
    chains.iter().map(|c| c.score).sum()
}

/// One fragment of a chain, with its position in the group.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainedHsp {
    pub index: usize,
    #[serde(flatten)]
    pub hsp: Hsp,
}

/// An emitted chain: ordered fragments plus the aggregate score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chain {
    pub score: f64,
    pub hsps: Vec<ChainedHsp>,
}

impl Chain {
    pub fn from_indices(group: &[Hsp], chain: &IndexChain) -> Self {
        Chain {
            score: chain.score,
            hsps: chain
                .indices
                .iter()
                .map(|&i| ChainedHsp {
                    index: i,
                    hsp: group[i].clone(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.hsps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hsps.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.hsps.iter().map(|h| h.index).collect()
    }
}

/// Chaining result of a single group.
#[derive(Debug)]
pub struct GroupOutcome {
    /// The group's fragments in sort order; chain indices point here
    pub hsps: Vec<Hsp>,
    /// The chainer that produced `chains`
    pub method: Method,
    pub chains: Result<Vec<Chain>, ChainError>,
}

/// Chains of every group, in first-seen group order.
#[derive(Debug, Default)]
pub struct ChainSet {
    pub groups: IndexMap<GroupKey, GroupOutcome>,
}

impl ChainSet {
    /// Groups whose chaining failed.
    pub fn failures(&self) -> Vec<(&GroupKey, &ChainError)> {
        self.groups
            .iter()
            .filter_map(|(key, outcome)| outcome.chains.as_ref().err().map(|e| (key, e)))
            .collect()
    }

    /// Number of chains over all successful groups.
    pub fn chain_count(&self) -> usize {
        self.groups
            .values()
            .filter_map(|o| o.chains.as_ref().ok())
            .map(|c| c.len())
            .sum()
    }

    /// Writes one row per chained fragment.
    ///
    /// sourceId strand chainId chainScore groupIndex qStart qEnd sStart sEnd score
    ///
    /// Chain ids run from 1 over the whole set. Failed groups are left out, and so are
    /// chains scoring below `min_score` when one is given.
    pub fn write_tsv<W: Write>(
        &self,
        writer: &mut W,
        min_score: Option<f64>,
    ) -> std::io::Result<()> {
        writer.write_fmt(format_args!(
            "#sourceId\tstrand\tchainId\tchainScore\tgroupIndex\tqStart\tqEnd\tsStart\tsEnd\tscore\n"
        ))?;

        let mut chain_id = 0;
        for (key, outcome) in &self.groups {
            let Ok(chains) = &outcome.chains else {
                continue;
            };
            for chain in chains.iter().filter(|c| passes(c, min_score)) {
                chain_id += 1;
                for member in &chain.hsps {
                    let h = &member.hsp;
                    writer.write_fmt(format_args!(
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                        key.source_id,
                        key.strand,
                        chain_id,
                        chain.score,
                        member.index,
                        h.q_start,
                        h.q_end,
                        h.s_start,
                        h.s_end,
                        h.score
                    ))?;
                }
            }
        }

        Ok(())
    }

    /// Writes the set as a JSON array of groups. Failed groups carry an `error` string.
    pub fn write_json<W: Write>(
        &self,
        writer: &mut W,
        min_score: Option<f64>,
    ) -> anyhow::Result<()> {
        let groups: Vec<JsonGroup> = self
            .groups
            .iter()
            .map(|(key, outcome)| {
                let (chains, error) = match &outcome.chains {
                    Ok(chains) => (
                        chains.iter().filter(|c| passes(c, min_score)).collect(),
                        None,
                    ),
                    Err(e) => (Vec::new(), Some(e.to_string())),
                };
                JsonGroup {
                    source_id: &key.source_id,
                    strand: key.strand.to_string(),
                    method: outcome.method.to_string(),
                    fragments: outcome.hsps.len(),
                    chains,
                    error,
                }
            })
            .collect();

        serde_json::to_writer_pretty(&mut *writer, &groups)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn passes(chain: &Chain, min_score: Option<f64>) -> bool {
    min_score.map_or(true, |min| chain.score >= min)
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    source_id: &'a str,
    strand: String,
    method: String,
    fragments: usize,
    chains: Vec<&'a Chain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
