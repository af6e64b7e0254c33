use crate::cmd_hspchain::utils;
use clap::{Arg, ArgAction, ArgMatches, Command};
use hspchain::libs::chaining::{group_hsps, link_terms, score_chain};
use std::io::Write;

pub fn make_subcommand() -> Command {
    let cmd = Command::new("score")
        .about("Score each group as one chain")
        .after_help(
            r###"
Every group is taken whole, in sorted order, as a single chain. Useful for
checking scoring weights against a known path.

Output:
  sourceId strand fragments score

With --detail, each link follows its group:
  sourceId strand link from to qGap sGap distanceCost overlapCost

Examples:
  hspchain score exons.tsv
  hspchain score exons.tsv --detail --connect-reward 50

"###,
        )
        .arg(
            Arg::new("detail")
                .long("detail")
                .action(ArgAction::SetTrue)
                .help("Print the gap and overlap terms of every link"),
        );

    let cmd = utils::io_args(cmd);
    utils::policy_args(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();
    let is_detail = args.get_flag("detail");
    let policy = utils::policy_from(args)?;

    let hsps = utils::read_input(args)?;
    let groups = group_hsps(hsps);

    let mut writer = intspan::writer(outfile);
    for (key, members) in &groups {
        let score = score_chain(members, &policy)?;
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\n",
            key.source_id,
            key.strand,
            members.len(),
            score
        ))?;

        if is_detail {
            for (i, terms) in link_terms(members, &policy).iter().enumerate() {
                writer.write_fmt(format_args!(
                    "{}\t{}\tlink\t{}\t{}\t{}\t{}\t{}\t{}\n",
                    key.source_id,
                    key.strand,
                    i,
                    i + 1,
                    terms.q_gap,
                    terms.s_gap,
                    terms.distance_cost,
                    terms.overlap_cost
                ))?;
            }
        }
    }
    writer.flush()?;

    Ok(())
}
