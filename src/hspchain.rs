extern crate clap;
use clap::*;

mod cmd_hspchain;

fn main() -> anyhow::Result<()> {
    let app = Command::new("hspchain")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`hspchain` - Group and chain HSPs")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-group progress to stderr"),
        )
        .subcommand(cmd_hspchain::chain::make_subcommand())
        .subcommand(cmd_hspchain::compare::make_subcommand())
        .subcommand(cmd_hspchain::group::make_subcommand())
        .subcommand(cmd_hspchain::score::make_subcommand())
        .after_help(
            r###"Subcommands:

* chain   - Chain HSPs with the greedy or the exhaustive chainer
* compare - Greedy vs exhaustive totals per group
* group   - Summarize the (source, strand) groups
* score   - Score each group taken as a single chain

Input records: sourceId qStart qEnd sStart sEnd strand score
BLAST tabular (-outfmt 6) is accepted with `--format blast`.

Logging honours RUST_LOG; `--verbose` sets the default level to debug.

"###,
        );

    let matches = app.get_matches();
    init_logging(matches.get_flag("verbose"));

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("chain", sub_matches)) => cmd_hspchain::chain::execute(sub_matches),
        Some(("compare", sub_matches)) => cmd_hspchain::compare::execute(sub_matches),
        Some(("group", sub_matches)) => cmd_hspchain::group::execute(sub_matches),
        Some(("score", sub_matches)) => cmd_hspchain::score::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
