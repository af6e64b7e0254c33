use crate::cmd_hspchain::utils;
use clap::{ArgMatches, Command};
use hspchain::libs::chaining::group_hsps;
use std::io::Write;

pub fn make_subcommand() -> Command {
    let cmd = Command::new("group")
        .about("Summarize HSP groups")
        .after_help(
            r###"
One line per (source, strand) group, in order of first appearance.

Output:
  sourceId strand fragments qStart qEnd sStart sEnd sumScore

Examples:
  hspchain group hsps.tsv
  hspchain group hits.blast --format blast

"###,
        );

    utils::io_args(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();

    let hsps = utils::read_input(args)?;
    let groups = group_hsps(hsps);

    let mut writer = intspan::writer(outfile);
    writer.write_fmt(format_args!(
        "#sourceId\tstrand\tfragments\tqStart\tqEnd\tsStart\tsEnd\tsumScore\n"
    ))?;

    for (key, members) in &groups {
        let q_start = members.iter().map(|h| h.q_start).min().unwrap_or(0);
        let q_end = members.iter().map(|h| h.q_end).max().unwrap_or(0);
        let s_start = members.iter().map(|h| h.s_start).min().unwrap_or(0);
        let s_end = members.iter().map(|h| h.s_end).max().unwrap_or(0);
        let sum: f64 = members.iter().map(|h| h.score).sum();

        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            key.source_id,
            key.strand,
            members.len(),
            q_start,
            q_end,
            s_start,
            s_end,
            sum
        ))?;
    }
    writer.flush()?;

    Ok(())
}
