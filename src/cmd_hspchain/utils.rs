use clap::{Arg, ArgMatches, Command};
use hspchain::libs::chaining::{ExhaustiveLimits, ScoringPolicy};
use hspchain::libs::hsp::{read_hsps, Hsp, InputFormat};
use std::time::Duration;

// infile, --format, --outfile
pub fn io_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .help("Input HSP file, `stdin` for standard input")
            .default_value("stdin")
            .index(1),
    )
    .arg(
        Arg::new("format")
            .long("format")
            .value_parser(["tsv", "blast"])
            .default_value("tsv")
            .help("Input layout: 7-field records or BLAST -outfmt 6"),
    )
    .arg(
        Arg::new("outfile")
            .short('o')
            .long("outfile")
            .default_value("stdout")
            .help("Output filename. [stdout] for screen"),
    )
}

// --distance-penalty, --overlap-reward, --connect-reward
pub fn policy_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("distance_penalty")
            .long("distance-penalty")
            .value_parser(clap::value_parser!(f64))
            .default_value("0.5")
            .allow_negative_numbers(true)
            .help("Cost per unit of the larger gap between linked HSPs"),
    )
    .arg(
        Arg::new("overlap_reward")
            .long("overlap-reward")
            .value_parser(clap::value_parser!(f64))
            .default_value("2")
            .allow_negative_numbers(true)
            .help("Weight of the overlap (a negative gap) between linked HSPs"),
    )
    .arg(
        Arg::new("connect_reward")
            .long("connect-reward")
            .value_parser(clap::value_parser!(f64))
            .default_value("20")
            .allow_negative_numbers(true)
            .help("Bonus per link"),
    )
}

// --max-fragments, --max-partitions, --time-limit
pub fn limit_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("max_fragments")
            .long("max-fragments")
            .value_parser(clap::value_parser!(usize))
            .default_value("12")
            .help("Largest group the exhaustive chainer accepts"),
    )
    .arg(
        Arg::new("max_partitions")
            .long("max-partitions")
            .value_parser(clap::value_parser!(u64))
            .help("Stop the exhaustive chainer after scoring this many partitions"),
    )
    .arg(
        Arg::new("time_limit")
            .long("time-limit")
            .value_parser(clap::value_parser!(f64))
            .help("Seconds the exhaustive chainer may spend on one group"),
    )
}

// --parallel
pub fn parallel_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("parallel")
            .long("parallel")
            .short('p')
            .value_parser(clap::value_parser!(usize))
            .default_value("1")
            .help("Number of threads"),
    )
}

pub fn read_input(args: &ArgMatches) -> anyhow::Result<Vec<Hsp>> {
    let infile = args.get_one::<String>("infile").unwrap();
    let format: InputFormat = args.get_one::<String>("format").unwrap().parse()?;

    let reader = intspan::reader(infile);
    let hsps = read_hsps(reader, format)?;
    tracing::debug!("{} HSPs read from {}", hsps.len(), infile);

    Ok(hsps)
}

pub fn policy_from(args: &ArgMatches) -> anyhow::Result<ScoringPolicy> {
    let policy = ScoringPolicy::new(
        *args.get_one::<f64>("distance_penalty").unwrap(),
        *args.get_one::<f64>("overlap_reward").unwrap(),
        *args.get_one::<f64>("connect_reward").unwrap(),
    )?;
    Ok(policy)
}

pub fn limits_from(args: &ArgMatches) -> anyhow::Result<ExhaustiveLimits> {
    let time_budget = match args.get_one::<f64>("time_limit") {
        Some(&secs) => Some(Duration::try_from_secs_f64(secs)?),
        None => None,
    };

    Ok(ExhaustiveLimits {
        max_fragments: *args.get_one::<usize>("max_fragments").unwrap(),
        max_partitions: args.get_one::<u64>("max_partitions").copied(),
        time_budget,
        cancel: None,
    })
}

pub fn thread_pool(args: &ArgMatches) -> anyhow::Result<rayon::ThreadPool> {
    let parallel = *args.get_one::<usize>("parallel").unwrap();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel)
        .build()?;
    Ok(pool)
}
