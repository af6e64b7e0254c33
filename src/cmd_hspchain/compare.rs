use crate::cmd_hspchain::utils;
use clap::{ArgMatches, Command};
use hspchain::libs::chaining::{
    exhaustive_chains, greedy_chains, group_hsps, total_score, ExhaustiveLimits, GroupKey,
    ScoringPolicy,
};
use hspchain::libs::error::ChainError;
use hspchain::libs::hsp::Hsp;
use rayon::prelude::*;
use std::io::Write;

pub fn make_subcommand() -> Command {
    let cmd = Command::new("compare")
        .about("Compare greedy and exhaustive chaining per group")
        .after_help(
            r###"
Both chainers run on every group with the same scoring weights. The greedy total
never exceeds the exhaustive one; groups where it falls short are marked `improved`.
Groups beyond the exhaustive limits are marked `limit`, and groups that cannot be
scored at all are marked `failed`.

Output:
  sourceId strand fragments greedyChains greedyScore exhaustiveChains exhaustiveScore status

Examples:
  hspchain compare hsps.tsv
  hspchain compare hsps.tsv --max-fragments 8 --time-limit 5

"###,
        );

    let cmd = utils::io_args(cmd);
    let cmd = utils::policy_args(cmd);
    let cmd = utils::limit_args(cmd);
    utils::parallel_arg(cmd)
}

struct Totals {
    greedy: (usize, f64),
    exhaustive: Option<(usize, f64)>,
}

struct Row {
    key: GroupKey,
    fragments: usize,
    totals: Result<Totals, ChainError>,
}

fn compare_group(
    key: &GroupKey,
    hsps: &[Hsp],
    policy: &ScoringPolicy,
    limits: &ExhaustiveLimits,
) -> Result<Totals, ChainError> {
    let greedy = greedy_chains(hsps, policy)?;
    let exhaustive = match exhaustive_chains(hsps, policy, limits) {
        Ok(chains) => Some((chains.len(), total_score(&chains))),
        Err(e) if e.is_recoverable() => {
            tracing::debug!("{}: {}", key, e);
            None
        }
        Err(e) => return Err(e),
    };

    Ok(Totals {
        greedy: (greedy.len(), total_score(&greedy)),
        exhaustive,
    })
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let outfile = args.get_one::<String>("outfile").unwrap();
    let policy = utils::policy_from(args)?;
    let limits = utils::limits_from(args)?;

    //----------------------------
    // Ops
    //----------------------------
    let hsps = utils::read_input(args)?;
    let groups: Vec<(GroupKey, Vec<Hsp>)> = group_hsps(hsps).into_iter().collect();

    let pool = utils::thread_pool(args)?;
    let rows: Vec<Row> = pool.install(|| {
        groups
            .into_par_iter()
            .map(|(key, hsps)| {
                let totals = compare_group(&key, &hsps, &policy, &limits);
                Row {
                    key,
                    fragments: hsps.len(),
                    totals,
                }
            })
            .collect()
    });

    //----------------------------
    // Output
    //----------------------------
    let mut writer = intspan::writer(outfile);
    writer.write_fmt(format_args!(
        "#sourceId\tstrand\tfragments\tgreedyChains\tgreedyScore\texhaustiveChains\texhaustiveScore\tstatus\n"
    ))?;

    for row in rows {
        let fields = match &row.totals {
            Ok(totals) => {
                let (g_chains, g_score) = totals.greedy;
                match totals.exhaustive {
                    Some((n, score)) => {
                        let status = if score > g_score + 1e-9 {
                            "improved"
                        } else {
                            "agree"
                        };
                        [
                            g_chains.to_string(),
                            g_score.to_string(),
                            n.to_string(),
                            score.to_string(),
                            status.to_string(),
                        ]
                    }
                    None => [
                        g_chains.to_string(),
                        g_score.to_string(),
                        "NA".to_string(),
                        "NA".to_string(),
                        "limit".to_string(),
                    ],
                }
            }
            Err(e) => {
                tracing::warn!("{}: {}", row.key, e);
                [
                    "NA".to_string(),
                    "NA".to_string(),
                    "NA".to_string(),
                    "NA".to_string(),
                    "failed".to_string(),
                ]
            }
        };

        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            row.key.source_id,
            row.key.strand,
            row.fragments,
            fields.join("\t")
        ))?;
    }
    writer.flush()?;

    Ok(())
}
