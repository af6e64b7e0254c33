use crate::cmd_hspchain::utils;
use clap::{Arg, ArgAction, ArgMatches, Command};
use hspchain::libs::chaining::{chain_all, ChainOptions, Method};
use std::io::Write;

pub fn make_subcommand() -> Command {
    let cmd = Command::new("chain")
        .about("Chain HSPs within each (source, strand) group")
        .after_help(
            r###"
Processing:
  1. Group HSPs by source id and strand; sort each group by
     (qStart, qEnd, sStart, sEnd).
  2. Chain each group:
     * greedy: the best remaining HSP seeds a chain, which is extended forwards,
       then backwards, while each step strictly raises the chain score.
     * exhaustive: the best partition of the group into chains. Groups larger
       than --max-fragments are refused.
     * auto: exhaustive, or greedy when a limit is hit.
  3. Score = sum of HSP scores
             - distance-penalty * max(qGap, sGap) for each positive gap
             + overlap-reward * min(qGap, sGap) for each overlap
             + connect-reward * links

Output (tsv):
  sourceId strand chainId chainScore groupIndex qStart qEnd sStart sEnd score

Examples:
  hspchain chain hsps.tsv -o chains.tsv
  hspchain chain hits.blast --format blast --outfmt json
  hspchain chain hsps.tsv --method auto --max-fragments 10 --parallel 4

"###,
        )
        .arg(
            Arg::new("method")
                .long("method")
                .value_parser(["greedy", "exhaustive", "auto"])
                .default_value("greedy")
                .help("Chaining method"),
        )
        .arg(
            Arg::new("outfmt")
                .long("outfmt")
                .value_parser(["tsv", "json"])
                .default_value("tsv")
                .help("Output format"),
        )
        .arg(
            Arg::new("min_score")
                .long("min-score")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .help("Leave out chains scoring below this. Every chain is written by default"),
        )
        .arg(
            Arg::new("keep_going")
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Exit successfully even when some groups fail"),
        );

    let cmd = utils::io_args(cmd);
    let cmd = utils::policy_args(cmd);
    let cmd = utils::limit_args(cmd);
    utils::parallel_arg(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let outfile = args.get_one::<String>("outfile").unwrap();
    let outfmt = args.get_one::<String>("outfmt").unwrap();
    let min_score = args.get_one::<f64>("min_score").copied();
    let keep_going = args.get_flag("keep_going");

    let opts = ChainOptions {
        policy: utils::policy_from(args)?,
        method: args.get_one::<String>("method").unwrap().parse::<Method>()?,
        limits: utils::limits_from(args)?,
    };

    //----------------------------
    // Ops
    //----------------------------
    let hsps = utils::read_input(args)?;
    let pool = utils::thread_pool(args)?;
    let set = pool.install(|| chain_all(hsps, &opts));

    //----------------------------
    // Output
    //----------------------------
    let mut writer = intspan::writer(outfile);
    match outfmt.as_str() {
        "json" => set.write_json(&mut writer, min_score)?,
        _ => set.write_tsv(&mut writer, min_score)?,
    }
    writer.flush()?;

    let failures = set.failures();
    if !failures.is_empty() && !keep_going {
        let (key, err) = failures[0];
        anyhow::bail!(
            "{} of {} groups failed; first: {}: {}",
            failures.len(),
            set.groups.len(),
            key,
            err
        );
    }

    Ok(())
}
